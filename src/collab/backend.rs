use thiserror::Error;

use crate::core::annotation::CustomTag;

/// Transport-level failure talking to the collaboration backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Collaboration backend unavailable: {0}")]
    Unavailable(String),

    #[error("Collaboration backend returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Result of persisting a tag remotely
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// A tag with this name already exists on the room remotely
    Duplicate,
    Failed(String),
}

/// Result of deleting a tag remotely
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    /// Only the creator may remove a shared tag
    PermissionDenied,
    NotFound,
}

/// A shared tag as stored remotely
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTag {
    /// Room identity: record key when known, else the room id
    pub room: String,
    pub tag: CustomTag,
}

/// Remote store for tags shared across a workspace.
///
/// Rooms are identified by [`Room::shared_identifier`](crate::core::room::Room::shared_identifier).
pub trait CollaborationBackend {
    /// Persist `tag` for `room`
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the backend could not be reached.
    fn save_tag(&mut self, room: &str, tag: &CustomTag) -> Result<SaveOutcome, BackendError>;

    /// Delete the tag named `name` from `room` on behalf of `requester`
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the backend could not be reached.
    fn remove_tag(
        &mut self,
        room: &str,
        name: &str,
        requester: &str,
    ) -> Result<RemoveOutcome, BackendError>;

    /// Every shared tag in `workspace`
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the backend could not be reached.
    fn sync_tags(&mut self, workspace: &str) -> Result<Vec<RemoteTag>, BackendError>;
}
