//! Field extraction helpers shared by the content transformers.
//!
//! Content records are loosely shaped: a field may be absent, `null`, an empty
//! object, or populated. Every helper here maps "nothing useful" to `None` so
//! that documents get an explicit `null` rather than an empty value.

use search_indexer_shared::NamedTerm;
use serde_json::Value;

/// Read a non-empty string at a JSON pointer.
pub fn text(record: &Value, pointer: &str) -> Option<String> {
    record.pointer(pointer).and_then(scalar_string)
}

/// Read the first non-empty string among several JSON pointers.
pub fn first_text(record: &Value, pointers: &[&str]) -> Option<String> {
    pointers.iter().find_map(|pointer| text(record, pointer))
}

/// Render a string or number as a non-empty string.
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read a boolean at a JSON pointer; `"true"`/`"false"` strings are accepted.
pub fn flag(record: &Value, pointer: &str) -> Option<bool> {
    match record.pointer(pointer)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read an integer at a JSON pointer; numeric strings are accepted.
pub fn integer(record: &Value, pointer: &str) -> Option<i64> {
    match record.pointer(pointer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Display title of an optional `{title}` field.
///
/// Returns `None` for an absent key, `null`, `false`, an empty object, or an
/// empty title. A bare string is taken as the title itself.
pub fn extract_optional_title(field: Option<&Value>) -> Option<String> {
    match field? {
        Value::Object(map) => map
            .get("title")
            .or_else(|| map.get("name"))
            .and_then(scalar_string),
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Flatten a list of `{title}` objects into `{name}` terms.
fn flatten_titles(items: Option<&Value>) -> Option<Vec<NamedTerm>> {
    let terms: Vec<NamedTerm> = items?
        .as_array()?
        .iter()
        .filter_map(|item| extract_optional_title(Some(item)))
        .map(NamedTerm::new)
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms)
    }
}

/// Categories as `{name}` terms; empty or absent input yields `None`.
pub fn flatten_categories(categories: Option<&Value>) -> Option<Vec<NamedTerm>> {
    flatten_titles(categories)
}

/// Tags as `{name}` terms; empty or absent input yields `None`.
pub fn flatten_tags(tags: Option<&Value>) -> Option<Vec<NamedTerm>> {
    flatten_titles(tags)
}

/// Every credit of every credit block, in order, as `{name}` terms.
///
/// Blocks without a `credits` list contribute nothing.
pub fn flatten_people(credit_blocks: Option<&Value>) -> Option<Vec<NamedTerm>> {
    let people: Vec<NamedTerm> = credit_blocks?
        .as_array()?
        .iter()
        .filter_map(|block| block.get("credits").and_then(Value::as_array))
        .flatten()
        .filter_map(|credit| extract_optional_title(Some(credit)))
        .map(NamedTerm::new)
        .collect();

    if people.is_empty() {
        None
    } else {
        Some(people)
    }
}

/// Suggestion inputs for a title.
///
/// The lowercased title, followed by every suffix of its word sequence that
/// doesn't start with a skip word (so "the last of us" also suggests on
/// "last of us" and "us" when "the" and "of" are skipped).
pub fn suggestions(title: Option<&str>, skip_words: &[String]) -> Option<Vec<String>> {
    let title = title?.trim().to_lowercase();
    let words: Vec<&str> = title.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }

    let mut inputs = vec![words.join(" ")];
    for start in 1..words.len() {
        if skip_words.iter().any(|skip| skip == words[start]) {
            continue;
        }
        inputs.push(words[start..].join(" "));
    }
    Some(inputs)
}

/// Parse a comma-separated skip word list.
pub fn parse_skip_words(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|word| word.trim().to_lowercase())
        .filter(|word| !word.is_empty())
        .collect()
}
