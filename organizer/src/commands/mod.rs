use anyhow::{bail, Result};
use organizer_core::{HierarchyEntry, ViewMode};
use tracing::info;

use crate::app::{App, ShowOutcome};
use crate::cli::{BrowseArgs, HierarchyArgs, HierarchyCommands, ModeArgs, ShowArgs};
use crate::display;

// --- Handler Functions ---

pub async fn handle_hierarchy(args: HierarchyArgs, mut app: App) -> Result<()> {
    match args.command {
        HierarchyCommands::Show {} => {}
        HierarchyCommands::Add { category_id } => {
            let entry = resolve(&app, &category_id)?;
            if !app.organizer.add_to_hierarchy(entry) {
                println!("'{}' is already part of the hierarchy", category_id);
            }
        }
        HierarchyCommands::Remove { category_id } => {
            if !app.organizer.remove_from_hierarchy(&category_id) {
                println!("'{}' is not part of the hierarchy", category_id);
            }
        }
        HierarchyCommands::Set { category_ids } => {
            let entries = category_ids
                .iter()
                .map(|id| resolve(&app, id))
                .collect::<Result<Vec<_>>>()?;
            app.organizer.set_hierarchy(entries);
        }
        HierarchyCommands::Move { from, to } => {
            if !app.organizer.move_in_hierarchy(from, to) {
                bail!("Cannot move level {} to {} in a hierarchy of {} levels", from, to, app.organizer.folder_hierarchy().len());
            }
        }
        HierarchyCommands::Clear {} => app.organizer.clear_hierarchy(),
    }

    print_hierarchy(&app);
    app.save().await
}

pub async fn handle_mode(args: ModeArgs, mut app: App) -> Result<()> {
    if let Some(mode) = args.mode {
        app.organizer.set_view_mode(mode);
        app.save().await?;
        info!(%mode, "View mode set");
    }
    println!("{}", app.organizer.view_mode());
    Ok(())
}

pub async fn handle_browse(args: BrowseArgs, mut app: App) -> Result<()> {
    app.enter_path(&args.path);
    if let Some(depth) = args.depth {
        app.organizer.navigate_to_depth(depth);
    }
    print_listing(&mut app, args.breadcrumb_width, args.json)
}

pub async fn handle_show(args: ShowArgs, mut app: App) -> Result<()> {
    match app.show_in_folders(&args.category_id, &args.tag_name) {
        ShowOutcome::Entered { added_level: true } => {
            println!("Added '{}' to the hierarchy", args.category_id);
        }
        ShowOutcome::Entered { added_level: false } => {}
        ShowOutcome::NotReachable { added_level } => {
            if added_level {
                println!("Added '{}' to the hierarchy", args.category_id);
            }
            println!(
                "'{}' is not the next folder level from here; browse with --path to reach it",
                args.category_id
            );
        }
        ShowOutcome::UnknownCategory => {
            println!("Unknown category '{}'", args.category_id);
        }
    }
    app.save().await?;
    print_listing(&mut app, 4, false)
}

// --- Helpers ---

fn resolve(app: &App, category_id: &str) -> Result<HierarchyEntry> {
    match app.category(category_id) {
        Some(category) => Ok(HierarchyEntry::from(category)),
        None => bail!("Unknown category '{}'", category_id),
    }
}

fn print_hierarchy(app: &App) {
    let hierarchy = app.organizer.folder_hierarchy();
    if hierarchy.is_empty() {
        println!("(empty hierarchy)");
        return;
    }
    for (depth, entry) in hierarchy.iter().enumerate() {
        println!("{}. {} ({})", depth + 1, entry.category_name, entry.category_id);
    }
}

fn print_listing(app: &mut App, breadcrumb_width: usize, json: bool) -> Result<()> {
    let evidence = app.evidence.clone();

    if app.organizer.view_mode() == ViewMode::Flat {
        let documents = app.organizer.visible_evidence(&evidence);
        if json {
            println!("{}", serde_json::to_string_pretty(&documents)?);
        } else {
            display::render_documents(&documents).iter().for_each(|l| println!("{l}"));
        }
        return Ok(());
    }

    let folders = app.organizer.generate_folder_structure(&evidence);
    if json {
        println!("{}", serde_json::to_string_pretty(&*folders)?);
        return Ok(());
    }

    println!("{}", display::render_breadcrumb(&app.organizer.breadcrumb_path(), breadcrumb_width));
    match app.organizer.next_category() {
        Some(next) => {
            let unfoldered = app.organizer.unfoldered_count(&evidence);
            display::render_folders(next, &folders, unfoldered).iter().for_each(|l| println!("{l}"));
        }
        None => {
            let documents = app.organizer.visible_evidence(&evidence);
            display::render_documents(&documents).iter().for_each(|l| println!("{l}"));
        }
    }
    Ok(())
}
