//! Core data types for the room directory.
//!
//! - [`Room`]: a canonical room record, identified by [`RoomId`]
//! - [`RoomRow`] / [`OccupantRow`]: raw extract rows before reconciliation
//! - [`CustomTag`] / [`Annotation`]: user annotations attached to rooms
//! - [`IdentityKey`]: the key two rows are matched on
//!
//! ## Identity
//!
//! | Key       | Built from                          | Used when            |
//! |-----------|-------------------------------------|----------------------|
//! | Record    | facilities record number            | row carries one      |
//! | Composite | `roomNumber|floor|building` (lower) | no record number     |
//!
//! [`Room`]: room::Room
//! [`RoomRow`]: room::RoomRow
//! [`OccupantRow`]: room::OccupantRow
//! [`CustomTag`]: annotation::CustomTag
//! [`Annotation`]: annotation::Annotation
//! [`RoomId`]: types::RoomId
//! [`IdentityKey`]: types::IdentityKey

pub mod annotation;
pub mod room;
pub mod types;
