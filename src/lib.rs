//! # room-finder
//!
//! A library for merging hospital room extracts into one searchable directory.
//!
//! Facilities systems export room tables full of abbreviated codes
//! ("CARDIO", "PT RM"), inconsistent floors and repeated rows. Each new
//! extract overlaps the last one, and users annotate rooms in between.
//!
//! `room-finder` reconciles every extract into a single de-duplicated
//! directory, keeps annotations attached to their rooms across re-imports,
//! and answers plain-language queries with a ranked list of rooms.
//!
//! ## Features
//!
//! - **Incremental reconciliation**: Rows are matched on record number, or on
//!   room number, floor and building when there is none
//! - **Abbreviation expansion**: Facilities codes become display names; codes
//!   no table knows are counted for review
//! - **Spelling correction**: Query words are corrected against the domain
//!   vocabulary
//! - **Typed search**: Floors, buildings, room numbers, staff and departments
//!   are recognized and scored differently
//! - **Annotations**: Custom tags and staff names survive ingestion, cleanup,
//!   export/import and session snapshots
//! - **Collaboration**: Tags can be shared through a pluggable backend
//!
//! ## Example
//!
//! ```rust
//! use room_finder::{DirectoryStore, Reconciler, RoomRow, SearchEngine, Vocabulary};
//!
//! let vocab = Vocabulary::load_embedded().unwrap();
//! let mut store = DirectoryStore::new();
//!
//! Reconciler::new(&mut store, &vocab).ingest(&[RoomRow::new("3120", "3")
//!     .with_record_key("1001")
//!     .with_building("Mott")
//!     .with_department("CARDIO")]);
//!
//! let engine = SearchEngine::new(&store, &vocab);
//! for hit in engine.search("3rd floor cardiology") {
//!     println!("{} ({:.1})", hit.room.room_number, hit.score);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Rooms, raw rows, annotations and identity keys
//! - [`vocab`]: Abbreviation, spelling and category tables
//! - [`directory`]: The room store, reconciliation, tag transfer and sessions
//! - [`matching`]: Query parsing and ranked search
//! - [`collab`]: Tag sharing through a collaboration backend
//! - [`parsing`]: Delimited extract parsing and input detection
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod collab;
pub mod core;
pub mod directory;
pub mod matching;
pub mod parsing;
pub mod utils;
pub mod vocab;

// Re-export commonly used types for convenience
pub use crate::core::annotation::{Annotation, CustomTag};
pub use crate::core::room::{OccupantRow, Room, RoomRow};
pub use crate::core::types::*;
pub use crate::directory::reconcile::{IngestReport, Reconciler};
pub use crate::directory::session::{SessionSnapshot, ViewState};
pub use crate::directory::store::{DirectoryStore, TagError};
pub use crate::directory::transfer::TagExport;
pub use crate::matching::engine::{SearchEngine, SearchFilters, SearchHit};
pub use crate::vocab::Vocabulary;
