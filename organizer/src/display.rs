use console::style;
use organizer_core::{BreadcrumbItem, Evidence, FolderNode, HierarchyEntry};

/// A breadcrumb as rendered: either a real item or the ellipsis standing in
/// for collapsed middle items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Crumb<'a> {
    Item(&'a BreadcrumbItem),
    Ellipsis { hidden: usize },
}

/// Keeps the first and last items and collapses the middle when there are
/// more than `max_visible` items. Does not touch the underlying path.
pub fn collapse_breadcrumbs(items: &[BreadcrumbItem], max_visible: usize) -> Vec<Crumb<'_>> {
    match items {
        [first, middle @ .., last] if items.len() > max_visible.max(2) => {
            vec![Crumb::Item(first), Crumb::Ellipsis { hidden: middle.len() }, Crumb::Item(last)]
        }
        _ => items.iter().map(Crumb::Item).collect(),
    }
}

pub fn render_breadcrumb(items: &[BreadcrumbItem], max_visible: usize) -> String {
    let mut parts = vec![style("Root").dim().to_string()];
    for crumb in collapse_breadcrumbs(items, max_visible) {
        parts.push(match crumb {
            Crumb::Item(item) if item.is_last => style(&item.title).bold().to_string(),
            Crumb::Item(item) => format!("{} {}", style(format!("[{}]", item.depth + 1)).dim(), item.title),
            Crumb::Ellipsis { hidden } => style(format!("…({hidden})")).dim().to_string(),
        });
    }
    parts.join(" / ")
}

pub fn render_folders(category: &HierarchyEntry, folders: &[FolderNode], unfoldered: usize) -> Vec<String> {
    let mut lines = vec![format!("{}", style(&category.category_name).underlined())];
    if folders.is_empty() {
        lines.push(format!("  {}", style("(no folders)").dim()));
    }
    let width = folders.iter().map(|f| f.tag_name.chars().count()).max().unwrap_or(0);
    for folder in folders {
        lines.push(format!(
            "  {} {:<width$}  {}",
            style("▸").cyan(),
            folder.tag_name,
            style(folder.file_count).yellow(),
            width = width
        ));
    }
    if unfoldered > 0 {
        lines.push(format!(
            "  {}",
            style(format!("{unfoldered} document(s) without a {} value", category.category_name)).dim()
        ));
    }
    lines
}

pub fn render_documents(documents: &[&Evidence]) -> Vec<String> {
    let mut lines = vec![format!("{}", style(format!("Documents ({})", documents.len())).underlined())];
    for doc in documents {
        let tags: Vec<String> = doc
            .tags
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(category, values)| {
                let values: Vec<&str> = values.iter().map(String::as_str).collect();
                format!("{}: {}", category, values.join(", "))
            })
            .collect();
        lines.push(format!("  {}  {}", doc.id, style(tags.join("; ")).dim()));
    }
    lines
}
