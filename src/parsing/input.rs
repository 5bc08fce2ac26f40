use std::path::Path;

/// Base64 of a gzip header, which every session file starts with
const SESSION_MAGIC: &str = "H4sI";

/// What an input file holds, and therefore which ingestion path it takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Encoded directory snapshot
    Session,
    /// Exported custom tags
    TagExport,
    /// Record key to person name rows
    Occupants,
    /// Room extract rows
    Rooms,
}

impl InputKind {
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::TagExport => "tag export",
            Self::Occupants => "occupant table",
            Self::Rooms => "room table",
        }
    }
}

/// Classify an input by file name, falling back to its first bytes.
///
/// `.umsess` is a session and `.json` a tag export. Delimited files whose
/// names mention occupants or staff hold occupant rows; other delimited files
/// hold rooms.
#[must_use]
pub fn detect_input_kind(path: &Path, content: &str) -> InputKind {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_lowercase();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();

    match extension.as_str() {
        "umsess" => return InputKind::Session,
        "json" => return InputKind::TagExport,
        _ => {}
    }

    let head = content.trim_start();
    if head.starts_with(SESSION_MAGIC) {
        InputKind::Session
    } else if head.starts_with('{') {
        InputKind::TagExport
    } else if name.contains("occupant") || name.contains("staff") {
        InputKind::Occupants
    } else {
        InputKind::Rooms
    }
}
