use clap::{Args, Parser, Subcommand};
use organizer_core::ViewMode;
use std::path::PathBuf;

/// Organizer: browse tagged documents as virtual folders.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file holding the folder hierarchy and view mode.
    #[arg(long, global = true, env = "ORGANIZER_SETTINGS", default_value = ".organizer/settings.json")]
    pub settings: PathBuf,

    /// JSON array of categories (`categoryId`, `categoryName`, `color`).
    /// If omitted, categories are derived from the tags found in the evidence.
    #[arg(long, global = true, env = "ORGANIZER_CATEGORIES")]
    pub categories: Option<PathBuf>,

    /// JSON array of documents (`id`, `tags`: map of category id to tag values).
    #[arg(long, global = true, env = "ORGANIZER_EVIDENCE")]
    pub evidence: Option<PathBuf>,

    /// Maximum number of cached folder structures.
    #[arg(long, global = true, env = "ORGANIZER_CACHE_CAPACITY")]
    pub cache_capacity: Option<usize>,

    /// Clear the navigation path when switching to the flat view.
    #[arg(long, global = true, env = "ORGANIZER_CLEAR_PATH_ON_FLAT")]
    pub clear_path_on_flat: bool,

    /// Increase verbosity (use multiple times for more).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show or edit the folder hierarchy.
    Hierarchy(HierarchyArgs),
    /// Show or set the view mode.
    Mode(ModeArgs),
    /// List folders and documents at a path.
    Browse(BrowseArgs),
    /// Reveal a tag as a folder, adding its category to the hierarchy if needed.
    Show(ShowArgs),
}

#[derive(Args, Debug)]
pub struct HierarchyArgs {
    #[command(subcommand)]
    pub command: HierarchyCommands,
}

#[derive(Subcommand, Debug)]
pub enum HierarchyCommands {
    /// Print the hierarchy levels in order.
    Show {},
    /// Append a category as the deepest level.
    Add {
        category_id: String,
    },
    /// Remove a category from the hierarchy.
    Remove {
        category_id: String,
    },
    /// Replace the hierarchy with the given categories, in order.
    Set {
        #[arg(required = true)]
        category_ids: Vec<String>,
    },
    /// Move the level at index FROM to index TO (zero-based).
    Move {
        from: usize,
        to: usize,
    },
    /// Remove every level.
    Clear {},
}

#[derive(Args, Debug)]
pub struct ModeArgs {
    /// New view mode. If omitted, prints the current one.
    #[arg(value_parser = parse_view_mode)]
    pub mode: Option<ViewMode>,
}

#[derive(Args, Debug)]
pub struct BrowseArgs {
    /// Folder to enter, as CATEGORY=TAG. Repeat to go deeper, in hierarchy order.
    #[arg(long = "path", short = 'p', value_parser = parse_path_segment)]
    pub path: Vec<(String, String)>,

    /// After entering the path, go back up until DEPTH selections remain.
    #[arg(long)]
    pub depth: Option<usize>,

    /// Collapse the breadcrumb when it has more than this many items.
    #[arg(long, default_value = "4")]
    pub breadcrumb_width: usize,

    /// Print folders as JSON instead of a listing.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    pub category_id: String,
    pub tag_name: String,
}

pub fn parse_view_mode(s: &str) -> Result<ViewMode, String> {
    s.parse::<ViewMode>().map_err(|e| e.to_string())
}

/// Parses `CATEGORY=TAG`. Only the first `=` separates; tags may contain more.
pub fn parse_path_segment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((category, tag)) if !category.trim().is_empty() && !tag.is_empty() => {
            Ok((category.trim().to_string(), tag.to_string()))
        }
        _ => Err(format!("expected CATEGORY=TAG, got '{}'", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segments_split_on_first_equals() {
        assert_eq!(parse_path_segment("type=Invoice"), Ok(("type".into(), "Invoice".into())));
        assert_eq!(parse_path_segment("note=a=b"), Ok(("note".into(), "a=b".into())));
        assert!(parse_path_segment("type").is_err());
        assert!(parse_path_segment("=Invoice").is_err());
        assert!(parse_path_segment("type=").is_err());
    }

    #[test]
    fn parses_browse_invocation() {
        let cli = Cli::try_parse_from([
            "organizer", "--evidence", "docs.json", "browse", "-p", "type=Invoice", "-p", "year=2024", "--depth", "1",
        ])
        .unwrap();
        match cli.command {
            Commands::Browse(args) => {
                assert_eq!(args.path.len(), 2);
                assert_eq!(args.depth, Some(1));
                assert_eq!(args.breadcrumb_width, 4);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["organizer", "mode", "grid"]).is_err());
        assert!(Cli::try_parse_from(["organizer", "mode", "folders"]).is_ok());
    }
}
