use clap::Args;
use serde::Serialize;

use crate::cli::{OutputFormat, SessionOptions, Workspace};
use crate::core::annotation::Annotation;
use crate::core::room::Room;
use crate::matching::tags::UnifiedTags;

#[derive(Args)]
pub struct ShowArgs {
    /// Room record key, id or room number
    #[arg(required = true)]
    pub room: String,

    /// Also list the room's search tags
    #[arg(long)]
    pub search_tags: bool,
}

#[derive(Serialize)]
struct RoomDetails<'a> {
    #[serde(flatten)]
    room: &'a Room,
    annotations: Vec<Annotation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_tags: Option<Vec<String>>,
}

/// Execute show subcommand
///
/// # Errors
///
/// Returns an error if the session cannot be loaded or the room is unknown.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ShowArgs, options: &SessionOptions, format: OutputFormat) -> anyhow::Result<()> {
    let workspace = Workspace::open(options)?;
    let store = &workspace.store;
    let id = workspace.resolve_room(&args.room)?;
    let room = store
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("Room '{}' not found", args.room))?;

    let search_tags = args.search_tags.then(|| {
        UnifiedTags::unify(room, store.custom_tags(id), store.staff_tags(id)).into_vec()
    });

    match format {
        OutputFormat::Text => {
            println!("Room {}\n", room.room_number);
            println!("ID:         {}", room.id);
            println!(
                "Record:     {}",
                room.record_key.as_deref().unwrap_or("-")
            );
            println!("Floor:      {}", room.floor);
            if room.building_short == room.building {
                println!("Building:   {}", room.building);
            } else {
                println!("Building:   {} ({})", room.building, room.building_short);
            }
            println!("Type:       {}", display_or_dash(&room.type_full));
            println!("Department: {}", display_or_dash(&room.department));
            if !room.category_tags.is_empty() {
                println!("Categories: {}", room.category_tags.join(", "));
            }
            if let Some(link) = &room.map_link {
                println!("Map:        {link}");
            }

            let staff = store.staff_tags(id);
            if !staff.is_empty() {
                println!("\nStaff:");
                for name in staff {
                    println!("  {name}");
                }
            }

            let custom = store.custom_tags(id);
            if !custom.is_empty() {
                println!("\nTags:");
                for tag in custom {
                    let shared = if tag.shared { " [shared]" } else { "" };
                    println!("  {} ({}, {}){}", tag.name, tag.kind, tag.color, shared);
                    if let Some(description) = &tag.description {
                        println!("      {description}");
                    }
                    for (label, value) in [
                        ("link", &tag.link),
                        ("contact", &tag.contact),
                        ("image", &tag.image_url),
                    ] {
                        if let Some(value) = value {
                            println!("      {label}: {value}");
                        }
                    }
                }
            }

            if let Some(tags) = &search_tags {
                println!("\nSearch tags ({}):", tags.len());
                println!("  {}", tags.join(", "));
            }
        }
        OutputFormat::Json => {
            let details = RoomDetails {
                room,
                annotations: store.annotations(id),
                search_tags,
            };
            println!("{}", serde_json::to_string_pretty(&details)?);
        }
        OutputFormat::Tsv => {
            println!("kind\tname");
            for annotation in store.annotations(id) {
                let kind = match annotation {
                    Annotation::Staff { .. } => "staff",
                    Annotation::Custom(_) => "custom",
                };
                println!("{kind}\t{}", annotation.name());
            }
        }
    }

    Ok(())
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
