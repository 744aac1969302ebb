//! Utility functions for the search indexer repository.

use crate::config::IndexLayout;
use crate::errors::SearchIndexError;

/// Characters OpenSearch rejects in index names.
const FORBIDDEN_INDEX_CHARS: &[char] = &['\\', '/', '*', '?', '"', '<', '>', '|', ',', '#', ':'];

/// Maximum index name length in bytes.
const MAX_INDEX_NAME_BYTES: usize = 255;

/// Derive the index name for a site.
///
/// Sites are lowercased because OpenSearch index names must be lowercase.
///
/// # Arguments
///
/// * `site` - The site (tenant) key from the change event
/// * `layout` - The configured index layout
/// * `bucket` - The content bucket, used only by `IndexLayout::SiteAndBucket`
///
/// # Returns
///
/// * `Ok(String)` - The index name
/// * `Err(SearchIndexError)` - If the site cannot form a valid index name
///
/// # Example
///
/// ```
/// use search_indexer_repository::{index_name, IndexLayout};
///
/// assert_eq!(index_name("Acme", IndexLayout::SitePerIndex, "videos").unwrap(), "acme");
/// assert_eq!(index_name("acme", IndexLayout::SiteAndBucket, "videos").unwrap(), "acme-videos");
/// ```
pub fn index_name(site: &str, layout: IndexLayout, bucket: &str) -> Result<String, SearchIndexError> {
    let site = site.trim().to_lowercase();
    let name = match layout {
        IndexLayout::SitePerIndex => site,
        IndexLayout::SiteAndBucket => format!("{}-{}", site, bucket),
    };
    validate_index_name(&name)?;
    Ok(name)
}

/// Validate an index name against OpenSearch naming rules.
pub fn validate_index_name(name: &str) -> Result<(), SearchIndexError> {
    if name.is_empty() {
        return Err(SearchIndexError::validation("Index name cannot be empty"));
    }
    if name == "." || name == ".." {
        return Err(SearchIndexError::validation(format!(
            "Index name '{}' is reserved",
            name
        )));
    }
    if name.starts_with(['-', '_', '+']) {
        return Err(SearchIndexError::validation(format!(
            "Index name '{}' cannot start with '-', '_' or '+'",
            name
        )));
    }
    if name.len() > MAX_INDEX_NAME_BYTES {
        return Err(SearchIndexError::validation(format!(
            "Index name exceeds {} bytes",
            MAX_INDEX_NAME_BYTES
        )));
    }
    if name.chars().any(|c| c.is_whitespace() || FORBIDDEN_INDEX_CHARS.contains(&c)) {
        return Err(SearchIndexError::validation(format!(
            "Index name '{}' contains invalid characters",
            name
        )));
    }
    if name.chars().any(|c| c.is_uppercase()) {
        return Err(SearchIndexError::validation(format!(
            "Index name '{}' must be lowercase",
            name
        )));
    }
    Ok(())
}
