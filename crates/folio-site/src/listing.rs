//! Directory listings of content areas.

use folio_content::{ContentError, ContentSource};
use serde::{Deserialize, Serialize};

/// Entry excluded from listings.
const README: &str = "README.md";

/// One content unit of an area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirListItem {
    /// Entry name as listed by the source.
    pub name: String,
    /// Slug within the area.
    pub slug: String,
}

/// Repository directory of a content area.
#[must_use]
pub fn area_dir(area: &str) -> String {
    format!("content/{area}")
}

/// List the content units of `area`.
///
/// Order follows the source's listing.
///
/// # Errors
///
/// Returns [`ContentError`] if the area directory cannot be listed.
pub fn list_dir(source: &dyn ContentSource, area: &str) -> Result<Vec<DirListItem>, ContentError> {
    let dir = area_dir(area);
    let prefix = format!("{dir}/");

    let items = source
        .list_dir(&dir)?
        .into_iter()
        .filter(|entry| entry.name != README)
        .map(|entry| {
            let relative = entry.path.strip_prefix(&prefix).unwrap_or(&entry.path);
            let slug = relative.strip_suffix(".mdx").unwrap_or(relative).to_owned();
            DirListItem {
                name: entry.name,
                slug,
            }
        })
        .collect();

    Ok(items)
}
