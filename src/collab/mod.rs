//! Tags shared through an external collaboration backend.
//!
//! The backend itself lives outside this crate; it is reached through the
//! [`CollaborationBackend`] trait. Every remote failure is recoverable: a tag
//! is never marked shared unless the backend confirmed the save, and a
//! rejected removal leaves the local tag in place.

pub mod backend;
pub mod sharing;

pub use backend::{BackendError, CollaborationBackend, RemoteTag, RemoveOutcome, SaveOutcome};
pub use sharing::{
    share_tag, sync_shared_tags, unshare_tag, ShareError, ShareStatus, SyncReport, UnshareStatus,
};
