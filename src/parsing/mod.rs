//! Readers for the files fed into the directory.
//!
//! - [`rows`]: delimited tables (CSV, TSV, pipe) with a header row, turned
//!   into field maps for [`RoomRow::from_fields`](crate::core::room::RoomRow::from_fields)
//!   and [`OccupantRow::from_fields`](crate::core::room::OccupantRow::from_fields)
//! - [`input`]: decides whether a file is a room table, an occupant table, a
//!   tag export or a session
//!
//! ## Example
//!
//! ```rust
//! use room_finder::core::room::RoomRow;
//! use room_finder::parsing::rows::parse_rows_text;
//!
//! let rows = parse_rows_text("RMRECNBR,RMNBR,FLOOR,BLD_DESCR\n1001,204,02,Mott\n", ',').unwrap();
//! let room = RoomRow::from_fields(&rows[0]);
//! assert_eq!(room.room_number.as_deref(), Some("204"));
//! ```
//!
//! ## Recognized columns
//!
//! | Column | Field |
//! |--------|-------|
//! | RMRECNBR | record key |
//! | RMNBR | room number |
//! | FLOOR | floor |
//! | BLD_DESCR | building |
//! | BLD_DESCRSHORT | short building name |
//! | RMTYP_DESCRSHORT | room type code |
//! | RMSUBTYP_DESCRSHORT | room subtype code |
//! | DEPT_DESCR | department code |

pub mod input;
pub mod rows;
