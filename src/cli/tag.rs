use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::cli::{read_input, OutputFormat, SessionOptions, Workspace};
use crate::core::annotation::{CustomTag, DEFAULT_TAG_COLOR, DEFAULT_TAG_KIND};
use crate::directory::transfer::{TagExport, TransferError};

#[derive(Args)]
pub struct TagArgs {
    #[command(subcommand)]
    pub command: TagCommands,
}

#[derive(Subcommand)]
pub enum TagCommands {
    /// Add a custom tag to a room
    Add {
        /// Room record key, id or room number
        #[arg(required = true)]
        room: String,

        /// Tag name
        #[arg(required = true)]
        name: String,

        /// Tag type (e.g. "equipment")
        #[arg(long = "type", default_value = DEFAULT_TAG_KIND)]
        kind: String,

        #[arg(long, default_value = DEFAULT_TAG_COLOR)]
        color: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        link: Option<String>,

        #[arg(long)]
        contact: Option<String>,

        #[arg(long)]
        image_url: Option<String>,
    },

    /// Remove a custom tag from a room
    Remove {
        #[arg(required = true)]
        room: String,

        #[arg(required = true)]
        name: String,
    },

    /// Attach a staff name to a room
    AddStaff {
        #[arg(required = true)]
        room: String,

        #[arg(required = true)]
        name: String,
    },

    /// Detach a staff name from a room
    RemoveStaff {
        #[arg(required = true)]
        room: String,

        #[arg(required = true)]
        name: String,
    },

    /// Export every custom tag to a JSON file ("-" for stdout)
    Export {
        #[arg(required = true)]
        output: PathBuf,
    },

    /// Import custom tags from an export file
    Import {
        #[arg(required = true)]
        input: PathBuf,
    },
}

/// Execute tag subcommand
///
/// # Errors
///
/// Returns an error if the room is unknown, the tag change is rejected, or a
/// file cannot be read or written.
pub fn run(args: TagArgs, options: &SessionOptions, format: OutputFormat) -> anyhow::Result<()> {
    let mut workspace = Workspace::open(options)?;

    match args.command {
        TagCommands::Add {
            room,
            name,
            kind,
            color,
            description,
            link,
            contact,
            image_url,
        } => {
            let id = workspace.resolve_room(&room)?;
            let tag = CustomTag::new(name)
                .with_kind(kind)
                .with_color(color)
                .with_description(description)
                .with_link(link)
                .with_contact(contact)
                .with_image_url(image_url);
            let name = tag.name.clone();
            workspace.store.add_custom_tag(id, tag)?;
            workspace.save()?;
            println!("Added tag '{name}' to room {id}");
        }
        TagCommands::Remove { room, name } => {
            let id = workspace.resolve_room(&room)?;
            let removed = workspace.store.remove_custom_tag(id, &name)?;
            workspace.save()?;
            println!("Removed tag '{}' from room {id}", removed.name);
        }
        TagCommands::AddStaff { room, name } => {
            let id = workspace.resolve_room(&room)?;
            workspace.store.add_staff_tag(id, &name)?;
            workspace.save()?;
            println!("Added staff '{}' to room {id}", name.trim());
        }
        TagCommands::RemoveStaff { room, name } => {
            let id = workspace.resolve_room(&room)?;
            workspace.store.remove_staff_tag(id, &name)?;
            workspace.save()?;
            println!("Removed staff '{}' from room {id}", name.trim());
        }
        TagCommands::Export { output } => {
            let export = match TagExport::from_store(&workspace.store) {
                Ok(export) => export,
                Err(TransferError::NothingToExport) => {
                    eprintln!("No custom tags to export.");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };
            let json = export.to_json()?;
            if output.to_string_lossy() == "-" {
                println!("{json}");
            } else {
                std::fs::write(&output, json)?;
                eprintln!(
                    "Exported tags for {} rooms to {}",
                    export.custom_tags.len(),
                    output.display()
                );
            }
        }
        TagCommands::Import { input } => {
            let export = TagExport::from_json(&read_input(&input)?)?;
            let report = export.apply(&mut workspace.store);
            workspace.save()?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Tsv => {
                    println!("imported\tduplicates\tunmatched_rooms");
                    println!(
                        "{}\t{}\t{}",
                        report.imported, report.duplicates, report.unmatched_rooms
                    );
                }
                OutputFormat::Text => println!(
                    "Imported {} tags ({} duplicates skipped, {} rooms not found)",
                    report.imported, report.duplicates, report.unmatched_rooms
                ),
            }
        }
    }

    Ok(())
}
