//! Command-line interface for room-finder.
//!
//! The directory lives in a session file (`--session`, default
//! `directory.umsess`) that every command loads and the mutating commands
//! save back. Available commands:
//!
//! - **ingest**: Merge room tables, occupant tables, tag exports and sessions
//! - **search**: Ranked natural-language search
//! - **suggest**: Autocomplete a partial query
//! - **show**: Details and annotations of one room
//! - **tag**: Add, remove, export and import annotations
//! - **cleanup**: Merge duplicate rooms and renumber ids
//! - **unmapped**: Codes no vocabulary table could expand
//! - **facets**: Buildings, floors and categories available for filtering
//!
//! ## Usage
//!
//! ```text
//! # Build a directory from an extract and an occupant roster
//! room-finder ingest rooms.csv occupants.csv
//!
//! # Search it
//! room-finder search "3rd floor mott cardiology"
//! room-finder search 2204 --format json
//!
//! # Annotate a room by record key, id or room number
//! room-finder tag add 1001 "Crash Cart" --type equipment --color red
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::core::types::RoomId;
use crate::directory::session::{SessionSnapshot, ViewState};
use crate::directory::store::DirectoryStore;
use crate::vocab::Vocabulary;

pub mod directory;
pub mod ingest;
pub mod search;
pub mod show;
pub mod tag;

/// Session file used when `--session` is not given
pub const DEFAULT_SESSION_FILE: &str = "directory.umsess";

#[derive(Parser)]
#[command(name = "room-finder")]
#[command(version)]
#[command(about = "Reconcile hospital room extracts and search them in plain language")]
#[command(
    long_about = "room-finder merges room extracts from a facilities system into one de-duplicated directory.\n\nIt keeps user annotations attached to rooms across re-imports and answers queries such as \"3rd floor mott cardiology\" or \"dr smith\" with a ranked list of rooms.\n\nAbbreviated codes are expanded and common misspellings corrected along the way."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Session file holding the directory
    #[arg(long, global = true, default_value = DEFAULT_SESSION_FILE)]
    pub session: PathBuf,

    /// JSON object of extra abbreviation expansions (code -> name)
    #[arg(long, global = true)]
    pub abbreviations: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge room tables, occupant tables, tag exports or sessions into the directory
    Ingest(ingest::IngestArgs),

    /// Search rooms with a natural-language query
    Search(search::SearchArgs),

    /// Autocomplete a partial query
    Suggest(search::SuggestArgs),

    /// Show one room with its annotations
    Show(show::ShowArgs),

    /// Manage custom and staff tags
    Tag(tag::TagArgs),

    /// Merge duplicate rooms and renumber ids
    Cleanup,

    /// List codes that no vocabulary table could expand
    Unmapped,

    /// List buildings, floors and categories available for filtering
    Facets,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Where the directory lives and how to read it
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub path: PathBuf,
    pub abbreviations: Option<PathBuf>,
}

impl SessionOptions {
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            path: cli.session.clone(),
            abbreviations: cli.abbreviations.clone(),
        }
    }
}

/// A loaded directory with its vocabulary and view state
pub struct Workspace {
    pub path: PathBuf,
    pub store: DirectoryStore,
    pub view: ViewState,
    pub vocab: Vocabulary,
}

impl Workspace {
    /// Load the session file if it exists, otherwise start empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the session or override file cannot be read.
    pub fn open(options: &SessionOptions) -> anyhow::Result<Self> {
        let mut vocab = Vocabulary::load_embedded()?;
        if let Some(path) = &options.abbreviations {
            let overrides = Vocabulary::load_overrides(path)
                .with_context(|| format!("reading abbreviations from {}", path.display()))?;
            tracing::info!("Loaded {} abbreviation overrides", overrides.len());
            vocab = vocab.with_overrides(overrides);
        }

        let mut store = DirectoryStore::new();
        let view = if options.path.exists() {
            SessionSnapshot::load(&options.path)
                .with_context(|| format!("loading session {}", options.path.display()))?
                .restore(&mut store)
        } else {
            ViewState::default()
        };

        Ok(Self {
            path: options.path.clone(),
            store,
            view,
            vocab,
        })
    }

    /// Write the directory back to its session file
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub fn save(&self) -> anyhow::Result<()> {
        SessionSnapshot::capture(&self.store, self.view.clone())
            .save(&self.path)
            .with_context(|| format!("saving session {}", self.path.display()))?;
        tracing::debug!("Saved {} rooms to {}", self.store.len(), self.path.display());
        Ok(())
    }

    /// Resolve a room given as record key, id or room number
    ///
    /// # Errors
    ///
    /// Returns an error if no room matches.
    pub fn resolve_room(&self, identifier: &str) -> anyhow::Result<RoomId> {
        self.store
            .find_by_identifier(identifier)
            .map(|room| room.id)
            .ok_or_else(|| anyhow::anyhow!("Room '{}' not found", identifier))
    }
}

/// Read a whole input file, naming it in the error. Invalid UTF-8 is
/// replaced rather than rejected; extracts are often Latin-1.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn read_input(path: &Path) -> anyhow::Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
