use crate::cli::{OutputFormat, SessionOptions, Workspace};
use crate::directory::reconcile::Reconciler;

/// Execute cleanup subcommand
///
/// # Errors
///
/// Returns an error if the session cannot be loaded or saved.
pub fn run_cleanup(options: &SessionOptions, format: OutputFormat) -> anyhow::Result<()> {
    let mut workspace = Workspace::open(options)?;
    let removed = Reconciler::new(&mut workspace.store, &workspace.vocab).reconcile_all();
    workspace.save()?;

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "removed": removed, "rooms": workspace.store.len() })
        ),
        OutputFormat::Tsv => println!("removed\trooms\n{removed}\t{}", workspace.store.len()),
        OutputFormat::Text => println!(
            "Removed {removed} duplicate rooms; {} rooms remain",
            workspace.store.len()
        ),
    }
    Ok(())
}

/// Execute unmapped subcommand
///
/// # Errors
///
/// Returns an error if the session cannot be loaded.
pub fn run_unmapped(options: &SessionOptions, format: OutputFormat) -> anyhow::Result<()> {
    let workspace = Workspace::open(options)?;
    let mut codes: Vec<(&String, &usize)> = workspace.store.unresolved().iter().collect();
    codes.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(workspace.store.unresolved())?);
        }
        OutputFormat::Tsv => {
            println!("code\tcount");
            for (code, count) in codes {
                println!("{code}\t{count}");
            }
        }
        OutputFormat::Text => {
            if codes.is_empty() {
                println!("Every code was expanded.");
            } else {
                println!("{:<30} {:>8}", "Code", "Count");
                println!("{}", "-".repeat(39));
                for (code, count) in codes {
                    println!("{code:<30} {count:>8}");
                }
            }
        }
    }
    Ok(())
}

/// Execute facets subcommand
///
/// # Errors
///
/// Returns an error if the session cannot be loaded.
pub fn run_facets(options: &SessionOptions, format: OutputFormat) -> anyhow::Result<()> {
    let workspace = Workspace::open(options)?;
    let facets = workspace.store.facets();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(facets)?),
        OutputFormat::Tsv => {
            println!("facet\tvalue");
            for (facet, values) in [
                ("building", &facets.buildings),
                ("floor", &facets.floors),
                ("category", &facets.categories),
            ] {
                for value in values {
                    println!("{facet}\t{value}");
                }
            }
        }
        OutputFormat::Text => {
            println!("Buildings ({}):", facets.buildings.len());
            for building in &facets.buildings {
                println!("  {building}");
            }
            println!("\nFloors: {}", facets.floors.join(", "));
            println!("\nCategories: {}", facets.categories.join(", "));
        }
    }
    Ok(())
}
