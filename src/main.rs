use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod collab;
mod core;
mod directory;
mod matching;
mod parsing;
mod utils;
mod vocab;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("room_finder=debug,info")
    } else {
        EnvFilter::new("room_finder=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let options = cli::SessionOptions::from_cli(&cli);

    match cli.command {
        cli::Commands::Ingest(args) => {
            cli::ingest::run(args, &options, cli.format, cli.verbose)?;
        }
        cli::Commands::Search(args) => {
            cli::search::run(args, &options, cli.format, cli.verbose)?;
        }
        cli::Commands::Suggest(args) => {
            cli::search::run_suggest(args, &options, cli.format)?;
        }
        cli::Commands::Show(args) => {
            cli::show::run(args, &options, cli.format)?;
        }
        cli::Commands::Tag(args) => {
            cli::tag::run(args, &options, cli.format)?;
        }
        cli::Commands::Cleanup => {
            cli::directory::run_cleanup(&options, cli.format)?;
        }
        cli::Commands::Unmapped => {
            cli::directory::run_unmapped(&options, cli.format)?;
        }
        cli::Commands::Facets => {
            cli::directory::run_facets(&options, cli.format)?;
        }
    }

    Ok(())
}
