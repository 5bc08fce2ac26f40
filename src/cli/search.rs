use clap::Args;

use crate::cli::{OutputFormat, SessionOptions, Workspace};
use crate::matching::engine::{SearchConfig, SearchEngine, SearchFilters, SearchHit};
use crate::matching::suggest::{build_suggestions, suggest};

#[derive(Args)]
pub struct SearchArgs {
    /// Query, e.g. "3rd floor mott cardiology" or "dr smith"
    #[arg(num_args = 0..)]
    pub query: Vec<String>,

    /// Only rooms in this building (full or short name)
    #[arg(long)]
    pub building: Option<String>,

    /// Only rooms on this floor
    #[arg(long)]
    pub floor: Option<String>,

    /// Only rooms carrying this tag; may be repeated
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Number of results to show (0 shows all)
    #[arg(short = 'n', long, default_value = "10")]
    pub max_results: usize,

    /// Fraction of terms a multi-term query must match
    #[arg(long, default_value = "0.7")]
    pub min_match_ratio: f64,

    /// Do not correct spelling in the query
    #[arg(long)]
    pub no_spelling: bool,

    /// Do not expand abbreviations in the query
    #[arg(long)]
    pub no_abbreviations: bool,

    /// Remember the query and filters in the session
    #[arg(long)]
    pub save_view: bool,
}

#[derive(Args)]
pub struct SuggestArgs {
    /// Partial query to complete
    #[arg(required = true)]
    pub prefix: String,
}

/// Execute search subcommand
///
/// # Errors
///
/// Returns an error if the session cannot be loaded or saved.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(
    args: SearchArgs,
    options: &SessionOptions,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let mut workspace = Workspace::open(options)?;
    let query = args.query.join(" ");

    if workspace.store.is_empty() {
        eprintln!("Warning: The directory is empty; run `room-finder ingest` first.");
        return Ok(());
    }

    let config = SearchConfig {
        min_match_ratio: args.min_match_ratio,
        correct_spelling: !args.no_spelling,
        expand_abbreviations: !args.no_abbreviations,
        ..SearchConfig::default()
    };
    let filters = SearchFilters {
        building: args.building.clone(),
        floor: args.floor.clone(),
        tags: args.tags.clone(),
    };

    let engine = SearchEngine::with_config(&workspace.store, &workspace.vocab, config);
    let terms = engine.parse(&query);
    if verbose {
        for term in &terms {
            eprintln!(
                "Term: {} '{}' (weight {:.1}){}",
                term.kind,
                term.value,
                term.weight,
                if term.expansions.is_empty() {
                    String::new()
                } else {
                    format!(", also {}", term.expansions.join(", "))
                }
            );
        }
    }

    let hits = engine.search_terms(&terms, &filters);
    let total = hits.len();
    let shown = if args.max_results == 0 {
        &hits[..]
    } else {
        &hits[..total.min(args.max_results)]
    };

    match format {
        OutputFormat::Text => print_text_results(&workspace, shown, total),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(shown)?),
        OutputFormat::Tsv => print_tsv_results(shown),
    }

    if args.save_view {
        workspace.view.search_query = query;
        workspace.view.active_filters.building = args.building.unwrap_or_default();
        workspace.view.active_filters.floor = args.floor.unwrap_or_default();
        workspace.view.active_filters.tags = args.tags;
        workspace.save()?;
    }

    Ok(())
}

fn print_text_results(workspace: &Workspace, hits: &[SearchHit<'_>], total: usize) {
    if hits.is_empty() {
        println!("No rooms found.");
        return;
    }

    for (i, hit) in hits.iter().enumerate() {
        let room = hit.room;
        println!(
            "\n#{} Room {} ({}, floor {})",
            i + 1,
            room.room_number,
            room.building,
            room.floor
        );
        println!("   ID: {}", room.id);
        if let Some(key) = &room.record_key {
            println!("   Record: {key}");
        }
        if !room.department.is_empty() {
            println!("   Department: {}", room.department);
        }
        if !room.type_full.is_empty() {
            println!("   Type: {}", room.type_full);
        }
        if hit.total_terms > 0 {
            println!(
                "   Score: {:.1} ({} of {} terms matched)",
                hit.score, hit.matched_terms, hit.total_terms
            );
        }

        let staff = workspace.store.staff_tags(room.id);
        if !staff.is_empty() {
            println!("   Staff: {}", staff.join(", "));
        }
        let custom: Vec<&str> = workspace
            .store
            .custom_tags(room.id)
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        if !custom.is_empty() {
            println!("   Tags: {}", custom.join(", "));
        }
    }

    if total > hits.len() {
        println!("\n... and {} more (use -n 0 to show all)", total - hits.len());
    }
}

fn print_tsv_results(hits: &[SearchHit<'_>]) {
    println!("id\trecord_key\troom_number\tfloor\tbuilding\tdepartment\ttype\tscore\tmatched_terms");
    for hit in hits {
        let room = hit.room;
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.2}\t{}",
            room.id,
            room.record_key.as_deref().unwrap_or(""),
            room.room_number,
            room.floor,
            room.building,
            room.department,
            room.type_full,
            hit.score,
            hit.matched_terms
        );
    }
}

/// Execute suggest subcommand
///
/// # Errors
///
/// Returns an error if the session cannot be loaded.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run_suggest(
    args: SuggestArgs,
    options: &SessionOptions,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let workspace = Workspace::open(options)?;
    let items = build_suggestions(&workspace.store, SearchConfig::default().suggestion_limit);
    let completions = suggest(&items, &args.prefix);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&completions)?),
        OutputFormat::Text | OutputFormat::Tsv => {
            for completion in completions {
                println!("{completion}");
            }
        }
    }

    Ok(())
}
