use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::cli::{read_input, OutputFormat, SessionOptions, Workspace};
use crate::core::room::{OccupantRow, RoomRow};
use crate::directory::reconcile::{IngestReport, OccupantReport, ReconcileConfig, Reconciler};
use crate::directory::session::SessionSnapshot;
use crate::directory::transfer::{ImportReport, TagExport};
use crate::parsing::input::{detect_input_kind, InputKind};
use crate::parsing::rows::parse_rows_file;

#[derive(Args)]
pub struct IngestArgs {
    /// Input files: room tables (.csv/.tsv/.txt), occupant tables (name
    /// contains "occupant" or "staff"), tag exports (.json), sessions (.umsess)
    #[arg(required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Skip the duplicate cleanup pass after ingestion
    #[arg(long)]
    pub no_cleanup: bool,

    /// Map link template; `{record_key}` is replaced by the room's record key
    #[arg(long)]
    pub map_link_template: Option<String>,

    /// Do not attach map links
    #[arg(long, conflicts_with = "map_link_template")]
    pub no_map_links: bool,

    /// Ingest without writing the session back
    #[arg(long)]
    pub dry_run: bool,
}

/// Everything one `ingest` run did
#[derive(Debug, Default, Serialize)]
struct RunSummary {
    sessions: usize,
    rooms: Vec<FileReport<IngestReport>>,
    occupants: Vec<FileReport<OccupantReport>>,
    tags: Vec<FileReport<ImportReport>>,
    removed_duplicates: usize,
    total_rooms: usize,
}

#[derive(Debug, Serialize)]
struct FileReport<T> {
    file: String,
    #[serde(flatten)]
    report: T,
}

/// Sessions replace the directory, so they go first; tags attach to rooms,
/// so they go last.
fn priority(kind: InputKind) -> u8 {
    match kind {
        InputKind::Session => 0,
        InputKind::Rooms => 1,
        InputKind::Occupants => 2,
        InputKind::TagExport => 3,
    }
}

/// Execute ingest subcommand
///
/// # Errors
///
/// Returns an error if an input cannot be read or parsed, or the session
/// cannot be saved.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(
    args: IngestArgs,
    options: &SessionOptions,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let mut workspace = Workspace::open(options)?;

    let mut inputs = Vec::new();
    for path in &args.files {
        let content = read_input(path)?;
        let kind = detect_input_kind(path, &content);
        if verbose {
            eprintln!("{}: {}", path.display(), kind.display_name());
        }
        inputs.push((path, kind, content));
    }
    inputs.sort_by_key(|(_, kind, _)| priority(*kind));

    let config = ReconcileConfig {
        map_link_template: if args.no_map_links {
            None
        } else {
            args.map_link_template
                .clone()
                .or_else(|| ReconcileConfig::default().map_link_template)
        },
    };

    let mut summary = RunSummary::default();
    for (path, kind, content) in inputs {
        let file = path.display().to_string();
        match kind {
            InputKind::Session => {
                let snapshot = SessionSnapshot::decode(&content)?;
                workspace.view = snapshot.restore(&mut workspace.store);
                summary.sessions += 1;
            }
            InputKind::Rooms => {
                let rows: Vec<RoomRow> = parse_rows_file(path)?
                    .iter()
                    .map(RoomRow::from_fields)
                    .collect();
                let report = Reconciler::with_config(
                    &mut workspace.store,
                    &workspace.vocab,
                    config.clone(),
                )
                .ingest(&rows);
                summary.rooms.push(FileReport { file, report });
            }
            InputKind::Occupants => {
                let rows: Vec<OccupantRow> = parse_rows_file(path)?
                    .iter()
                    .map(OccupantRow::from_fields)
                    .collect();
                let report = Reconciler::new(&mut workspace.store, &workspace.vocab)
                    .ingest_occupants(&rows);
                summary.occupants.push(FileReport { file, report });
            }
            InputKind::TagExport => {
                let report = TagExport::from_json(&content)?.apply(&mut workspace.store);
                summary.tags.push(FileReport { file, report });
            }
        }
    }

    if !args.no_cleanup {
        summary.removed_duplicates =
            Reconciler::new(&mut workspace.store, &workspace.vocab).reconcile_all();
    }
    summary.total_rooms = workspace.store.len();

    if !args.dry_run {
        workspace.save()?;
    }

    match format {
        OutputFormat::Text => print_text_summary(&summary, &workspace, args.dry_run),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Tsv => print_tsv_summary(&summary),
    }

    Ok(())
}

fn print_text_summary(summary: &RunSummary, workspace: &Workspace, dry_run: bool) {
    if summary.sessions > 0 {
        println!("Restored {} session file(s)", summary.sessions);
    }
    for FileReport { file, report } in &summary.rooms {
        println!(
            "{file}: {} created, {} updated, {} duplicate rows skipped, {} malformed rows skipped",
            report.created, report.updated, report.skipped_duplicates, report.skipped_malformed
        );
        if !report.unresolved.is_empty() {
            println!(
                "   {} code(s) could not be expanded (see `room-finder unmapped`)",
                report.unresolved.len()
            );
        }
    }
    for FileReport { file, report } in &summary.occupants {
        println!(
            "{file}: {} staff names attached, {} already present, {} unmatched, {} malformed",
            report.attached, report.already_present, report.unmatched, report.skipped_malformed
        );
    }
    for FileReport { file, report } in &summary.tags {
        println!(
            "{file}: {} tags imported, {} duplicates skipped, {} rooms not found",
            report.imported, report.duplicates, report.unmatched_rooms
        );
    }
    if summary.removed_duplicates > 0 {
        println!("Cleanup removed {} duplicate rooms", summary.removed_duplicates);
    }

    if dry_run {
        println!("\nDirectory would hold {} rooms (dry run, nothing saved)", summary.total_rooms);
    } else {
        println!(
            "\nDirectory holds {} rooms, saved to {}",
            summary.total_rooms,
            workspace.path.display()
        );
    }
}

fn print_tsv_summary(summary: &RunSummary) {
    println!("file\tkind\tcreated\tupdated\tskipped\tunmatched");
    for FileReport { file, report } in &summary.rooms {
        println!(
            "{file}\trooms\t{}\t{}\t{}\t0",
            report.created,
            report.updated,
            report.skipped_duplicates + report.skipped_malformed
        );
    }
    for FileReport { file, report } in &summary.occupants {
        println!(
            "{file}\toccupants\t{}\t0\t{}\t{}",
            report.attached,
            report.already_present + report.skipped_malformed,
            report.unmatched
        );
    }
    for FileReport { file, report } in &summary.tags {
        println!(
            "{file}\ttags\t{}\t0\t{}\t{}",
            report.imported, report.duplicates, report.unmatched_rooms
        );
    }
}
