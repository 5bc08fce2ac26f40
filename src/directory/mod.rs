//! The room directory and everything that writes to it.
//!
//! - [`store`]: [`DirectoryStore`](store::DirectoryStore), rooms plus annotations
//! - [`index`]: identity lookups and filter facets derived from the rooms
//! - [`reconcile`]: incremental ingestion and duplicate cleanup
//! - [`transfer`]: custom tag export/import
//! - [`session`]: whole-directory snapshots
//!
//! All mutation happens through one `&mut DirectoryStore` at a time; search
//! only ever borrows the store immutably.

pub mod index;
pub mod reconcile;
pub mod session;
pub mod store;
pub mod transfer;
