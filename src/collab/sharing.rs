use thiserror::Error;

use crate::collab::backend::{BackendError, CollaborationBackend, RemoveOutcome, SaveOutcome};
use crate::core::annotation::CustomTag;
use crate::core::types::RoomId;
use crate::directory::store::{DirectoryStore, TagError};

/// Rejections surfaced to the user. None of them leave local state half-changed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShareError {
    #[error(transparent)]
    Tag(#[from] TagError),

    #[error("Tag '{0}' is already shared on this room")]
    DuplicateRemote(String),

    #[error("Only the creator can remove shared tag '{0}'")]
    PermissionDenied(String),

    #[error("Shared tag '{0}' no longer exists remotely")]
    RemoteNotFound(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Where a tag ended up after [`share_tag`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareStatus {
    Shared,
    /// Saved locally; the remote save failed for `reason`
    LocalOnly { reason: String },
}

/// What [`unshare_tag`] removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnshareStatus {
    /// A local-only tag, or a shared one removed without a backend
    RemovedLocal,
    RemovedShared,
}

/// Summary of [`sync_shared_tags`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub fetched: usize,
    pub applied: usize,
    /// Local-only tags superseded by a remote tag of the same name
    pub superseded: usize,
    pub unmatched_rooms: usize,
}

/// Add `tag` to `room` locally, then persist it remotely.
///
/// The tag is only marked shared once the backend confirms the save.
///
/// # Errors
///
/// Returns `ShareError::Tag` if the local add is rejected and
/// `ShareError::DuplicateRemote` if the backend already has the tag, in which
/// case the local add is withdrawn.
pub fn share_tag(
    store: &mut DirectoryStore,
    backend: &mut dyn CollaborationBackend,
    room: RoomId,
    tag: CustomTag,
    user: &str,
) -> Result<ShareStatus, ShareError> {
    let identity = store
        .get(room)
        .map(|r| r.shared_identifier())
        .ok_or(TagError::UnknownRoom(room))?;
    let name = tag.name.trim().to_string();

    let mut remote = tag.clone();
    remote.shared = true;
    remote.created_by = Some(user.to_string());

    store.add_custom_tag(room, tag)?;

    let failure = match backend.save_tag(&identity, &remote) {
        Ok(SaveOutcome::Saved) => {
            if let Some(local) = store.custom_tag_mut(room, &name) {
                local.shared = true;
                local.created_by = Some(user.to_string());
            }
            tracing::info!("Shared tag '{}' on room {}", name, identity);
            return Ok(ShareStatus::Shared);
        }
        Ok(SaveOutcome::Duplicate) => {
            store.remove_custom_tag(room, &name)?;
            return Err(ShareError::DuplicateRemote(name));
        }
        Ok(SaveOutcome::Failed(reason)) => reason,
        Err(e) => e.to_string(),
    };

    tracing::warn!(
        "Tag '{}' saved locally only; remote save failed: {}",
        name,
        failure
    );
    Ok(ShareStatus::LocalOnly { reason: failure })
}

/// Remove the tag named `name` from `room`.
///
/// Shared tags are removed locally only after the backend confirms; without
/// a backend they are removed locally with a warning.
///
/// # Errors
///
/// Returns `ShareError::Tag` if the room has no such tag, or the backend's
/// rejection. Local state is untouched on error.
pub fn unshare_tag(
    store: &mut DirectoryStore,
    backend: Option<&mut dyn CollaborationBackend>,
    room: RoomId,
    name: &str,
    requester: &str,
) -> Result<UnshareStatus, ShareError> {
    let shared = store
        .custom_tags(room)
        .iter()
        .find(|t| t.same_name(name))
        .map(|t| t.shared)
        .ok_or_else(|| TagError::NotFound {
            room,
            name: name.trim().to_string(),
        })?;

    if !shared {
        store.remove_custom_tag(room, name)?;
        return Ok(UnshareStatus::RemovedLocal);
    }

    let Some(backend) = backend else {
        tracing::warn!(
            "No collaboration backend; removing shared tag '{}' locally only",
            name.trim()
        );
        store.remove_custom_tag(room, name)?;
        return Ok(UnshareStatus::RemovedLocal);
    };

    let identity = store
        .get(room)
        .map(|r| r.shared_identifier())
        .ok_or(TagError::UnknownRoom(room))?;

    match backend.remove_tag(&identity, name.trim(), requester)? {
        RemoveOutcome::Removed => {
            store.remove_custom_tag(room, name)?;
            Ok(UnshareStatus::RemovedShared)
        }
        RemoveOutcome::PermissionDenied => {
            Err(ShareError::PermissionDenied(name.trim().to_string()))
        }
        RemoveOutcome::NotFound => Err(ShareError::RemoteNotFound(name.trim().to_string())),
    }
}

/// Replace every shared tag in `store` with the backend's current set.
///
/// # Errors
///
/// Returns `BackendError` if the fetch fails; local state is unchanged.
pub fn sync_shared_tags(
    store: &mut DirectoryStore,
    backend: &mut dyn CollaborationBackend,
    workspace: &str,
) -> Result<SyncReport, BackendError> {
    let remote = backend.sync_tags(workspace)?;
    let mut report = SyncReport {
        fetched: remote.len(),
        ..SyncReport::default()
    };

    let dropped = store.retain_custom_tags(|t| !t.shared);
    tracing::debug!("Dropped {} stale shared tags before sync", dropped);

    for entry in remote {
        let Some(room) = store.find_by_identifier(&entry.room).map(|r| r.id) else {
            report.unmatched_rooms += 1;
            tracing::debug!("Shared tag '{}' targets unknown room {}", entry.tag.name, entry.room);
            continue;
        };

        let mut tag = entry.tag;
        tag.shared = true;

        if store.remove_custom_tag(room, &tag.name).is_ok() {
            report.superseded += 1;
        }
        match store.add_custom_tag(room, tag) {
            Ok(()) => report.applied += 1,
            Err(e) => tracing::warn!("Skipping shared tag: {}", e),
        }
    }

    tracing::info!(
        "Synced {} shared tags ({} applied, {} unmatched rooms)",
        report.fetched,
        report.applied,
        report.unmatched_rooms
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::backend::RemoteTag;
    use crate::core::room::Room;

    /// Remote store kept in memory; `offline` makes every call fail
    #[derive(Default)]
    struct MemoryBackend {
        tags: Vec<RemoteTag>,
        offline: bool,
        reject_saves: bool,
    }

    impl CollaborationBackend for MemoryBackend {
        fn save_tag(&mut self, room: &str, tag: &CustomTag) -> Result<SaveOutcome, BackendError> {
            if self.offline {
                return Err(BackendError::Unavailable("offline".to_string()));
            }
            if self.reject_saves {
                return Ok(SaveOutcome::Failed("quota exceeded".to_string()));
            }
            if self
                .tags
                .iter()
                .any(|t| t.room == room && t.tag.same_name(&tag.name))
            {
                return Ok(SaveOutcome::Duplicate);
            }
            self.tags.push(RemoteTag {
                room: room.to_string(),
                tag: tag.clone(),
            });
            Ok(SaveOutcome::Saved)
        }

        fn remove_tag(
            &mut self,
            room: &str,
            name: &str,
            requester: &str,
        ) -> Result<RemoveOutcome, BackendError> {
            if self.offline {
                return Err(BackendError::Unavailable("offline".to_string()));
            }
            let Some(position) = self
                .tags
                .iter()
                .position(|t| t.room == room && t.tag.same_name(name))
            else {
                return Ok(RemoveOutcome::NotFound);
            };
            if self.tags[position].tag.created_by.as_deref() != Some(requester) {
                return Ok(RemoveOutcome::PermissionDenied);
            }
            self.tags.remove(position);
            Ok(RemoveOutcome::Removed)
        }

        fn sync_tags(&mut self, _workspace: &str) -> Result<Vec<RemoteTag>, BackendError> {
            if self.offline {
                return Err(BackendError::Unavailable("offline".to_string()));
            }
            Ok(self.tags.clone())
        }
    }

    fn store() -> DirectoryStore {
        DirectoryStore::from_rooms(vec![
            Room::new(RoomId(0), "204", "2", "Mott").with_record_key("R1"),
            Room::new(RoomId(1), "310", "3", "Mott"),
        ])
    }

    #[test]
    fn test_share_marks_tag_shared() {
        let mut store = store();
        let mut backend = MemoryBackend::default();

        let status = share_tag(&mut store, &mut backend, RoomId(0), CustomTag::new("Scope"), "ana")
            .unwrap();
        assert_eq!(status, ShareStatus::Shared);

        let tag = &store.custom_tags(RoomId(0))[0];
        assert!(tag.shared);
        assert_eq!(tag.created_by.as_deref(), Some("ana"));
        assert_eq!(backend.tags[0].room, "R1");
    }

    #[test]
    fn test_room_without_record_key_uses_id() {
        let mut store = store();
        let mut backend = MemoryBackend::default();
        share_tag(&mut store, &mut backend, RoomId(1), CustomTag::new("Scope"), "ana").unwrap();
        assert_eq!(backend.tags[0].room, "1");
    }

    #[test]
    fn test_remote_duplicate_withdraws_local_add() {
        let mut store = store();
        let mut backend = MemoryBackend::default();
        backend.tags.push(RemoteTag {
            room: "R1".to_string(),
            tag: CustomTag::new("scope"),
        });

        let result = share_tag(&mut store, &mut backend, RoomId(0), CustomTag::new("Scope"), "ana");
        assert_eq!(result, Err(ShareError::DuplicateRemote("Scope".to_string())));
        assert!(store.custom_tags(RoomId(0)).is_empty());
    }

    #[test]
    fn test_failed_save_stays_local() {
        let mut store = store();
        for mut backend in [
            MemoryBackend {
                offline: true,
                ..MemoryBackend::default()
            },
            MemoryBackend {
                reject_saves: true,
                ..MemoryBackend::default()
            },
        ] {
            let status = share_tag(
                &mut store,
                &mut backend,
                RoomId(0),
                CustomTag::new("Scope"),
                "ana",
            )
            .unwrap();
            assert!(matches!(status, ShareStatus::LocalOnly { .. }));
            assert!(!store.custom_tags(RoomId(0))[0].shared);
            store.remove_custom_tag(RoomId(0), "Scope").unwrap();
        }
    }

    #[test]
    fn test_local_add_rejection_is_reported() {
        let mut store = store();
        let mut backend = MemoryBackend::default();
        store.add_custom_tag(RoomId(0), CustomTag::new("Scope")).unwrap();

        let result = share_tag(&mut store, &mut backend, RoomId(0), CustomTag::new("scope"), "ana");
        assert!(matches!(result, Err(ShareError::Tag(TagError::Duplicate { .. }))));
        assert!(backend.tags.is_empty());
    }

    #[test]
    fn test_unshare_requires_creator() {
        let mut store = store();
        let mut backend = MemoryBackend::default();
        share_tag(&mut store, &mut backend, RoomId(0), CustomTag::new("Scope"), "ana").unwrap();

        let denied = unshare_tag(&mut store, Some(&mut backend), RoomId(0), "scope", "bob");
        assert_eq!(denied, Err(ShareError::PermissionDenied("scope".to_string())));
        assert_eq!(store.custom_tags(RoomId(0)).len(), 1);

        let removed = unshare_tag(&mut store, Some(&mut backend), RoomId(0), "scope", "ana");
        assert_eq!(removed, Ok(UnshareStatus::RemovedShared));
        assert!(store.custom_tags(RoomId(0)).is_empty());
        assert!(backend.tags.is_empty());
    }

    #[test]
    fn test_unshare_backend_failure_keeps_tag() {
        let mut store = store();
        let mut backend = MemoryBackend::default();
        share_tag(&mut store, &mut backend, RoomId(0), CustomTag::new("Scope"), "ana").unwrap();
        backend.offline = true;

        let result = unshare_tag(&mut store, Some(&mut backend), RoomId(0), "Scope", "ana");
        assert!(matches!(result, Err(ShareError::Backend(_))));
        assert_eq!(store.custom_tags(RoomId(0)).len(), 1);
    }

    #[test]
    fn test_unshare_local_and_without_backend() {
        let mut store = store();
        store.add_custom_tag(RoomId(0), CustomTag::new("Local")).unwrap();
        assert_eq!(
            unshare_tag(&mut store, None, RoomId(0), "local", "ana"),
            Ok(UnshareStatus::RemovedLocal)
        );

        let mut backend = MemoryBackend::default();
        share_tag(&mut store, &mut backend, RoomId(0), CustomTag::new("Scope"), "ana").unwrap();
        assert_eq!(
            unshare_tag(&mut store, None, RoomId(0), "Scope", "bob"),
            Ok(UnshareStatus::RemovedLocal)
        );
        assert!(store.custom_tags(RoomId(0)).is_empty());

        assert!(matches!(
            unshare_tag(&mut store, None, RoomId(0), "Missing", "ana"),
            Err(ShareError::Tag(TagError::NotFound { .. }))
        ));
    }

    #[test]
    fn test_sync_replaces_shared_tags() {
        let mut store = store();
        let mut stale = CustomTag::new("Stale");
        stale.shared = true;
        store.add_custom_tag(RoomId(1), stale).unwrap();
        store.add_custom_tag(RoomId(0), CustomTag::new("Scope")).unwrap();
        store.add_custom_tag(RoomId(0), CustomTag::new("Mine")).unwrap();

        let mut backend = MemoryBackend::default();
        for (room, name) in [("R1", "Scope"), ("310", "Cart"), ("R9", "Lost")] {
            backend.tags.push(RemoteTag {
                room: room.to_string(),
                tag: CustomTag::new(name),
            });
        }

        let report = sync_shared_tags(&mut store, &mut backend, "default").unwrap();
        assert_eq!(
            report,
            SyncReport {
                fetched: 3,
                applied: 2,
                superseded: 1,
                unmatched_rooms: 1,
            }
        );

        let room0: Vec<(&str, bool)> = store
            .custom_tags(RoomId(0))
            .iter()
            .map(|t| (t.name.as_str(), t.shared))
            .collect();
        assert_eq!(room0, vec![("Mine", false), ("Scope", true)]);

        let room1: Vec<&str> = store
            .custom_tags(RoomId(1))
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(room1, vec!["Cart"]);
    }

    #[test]
    fn test_sync_failure_leaves_state() {
        let mut store = store();
        let mut shared = CustomTag::new("Scope");
        shared.shared = true;
        store.add_custom_tag(RoomId(0), shared).unwrap();

        let mut backend = MemoryBackend {
            offline: true,
            ..MemoryBackend::default()
        };
        assert!(sync_shared_tags(&mut store, &mut backend, "default").is_err());
        assert_eq!(store.custom_tags(RoomId(0)).len(), 1);
    }
}
