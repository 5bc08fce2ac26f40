//! Query parsing, tag unification and ranked search.
//!
//! - [`query`]: turns free text into typed, weighted [`ParsedTerm`]s
//! - [`tags`]: derives the [`UnifiedTags`] a room is matched against
//! - [`scoring`]: per-term match scores
//! - [`engine`]: [`SearchEngine`], ranking plus filters
//! - [`suggest`]: autocomplete vocabulary and prefix lookup
//!
//! ## Ranking
//!
//! Each term scores a room by kind (an exact room number is worth the most),
//! and the room's total is the weighted sum over the terms that matched. A
//! single-term query must match; longer queries need 70% of their terms
//! (rounded up). An exact room-number hit doubles the total.
//!
//! ## Example
//!
//! ```rust
//! use room_finder::core::room::RoomRow;
//! use room_finder::directory::reconcile::Reconciler;
//! use room_finder::directory::store::DirectoryStore;
//! use room_finder::matching::SearchEngine;
//! use room_finder::vocab::Vocabulary;
//!
//! let vocab = Vocabulary::load_embedded().unwrap();
//! let mut store = DirectoryStore::new();
//! Reconciler::new(&mut store, &vocab).ingest(&[
//!     RoomRow::new("204", "2").with_building("Mott").with_department("CARDIO"),
//!     RoomRow::new("2204", "2").with_building("Mott"),
//! ]);
//!
//! let engine = SearchEngine::new(&store, &vocab);
//! let hits = engine.search("204");
//! assert_eq!(hits[0].room.room_number, "204");
//! ```

pub mod engine;
pub mod query;
pub mod scoring;
pub mod suggest;
pub mod tags;

pub use engine::{SearchConfig, SearchEngine, SearchFilters, SearchHit};
pub use query::{ParsedTerm, QueryProcessor, TermKind};
pub use tags::UnifiedTags;
