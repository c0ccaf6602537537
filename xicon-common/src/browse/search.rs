//! Case-insensitive substring search and relevance ordering

use crate::models::GlossaryEntry;
use std::cmp::Ordering;

/// True when `query` appears in the name, definition, tags or aliases
///
/// A blank query matches everything.
pub fn matches_query(entry: &GlossaryEntry, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    matches_lowered(entry, &needle)
}

fn matches_lowered(entry: &GlossaryEntry, needle: &str) -> bool {
    entry.name.to_lowercase().contains(needle)
        || entry.definition.to_lowercase().contains(needle)
        || entry
            .tags()
            .map(|tags| tags.joined().to_lowercase().contains(needle))
            .unwrap_or(false)
        || entry.aliases.joined().to_lowercase().contains(needle)
}

/// Entries matching `query`, in input order
pub fn search<'a>(entries: &'a [GlossaryEntry], query: &str) -> Vec<&'a GlossaryEntry> {
    let needle = query.trim().to_lowercase();
    entries
        .iter()
        .filter(|entry| needle.is_empty() || matches_lowered(entry, &needle))
        .collect()
}

/// Order results: name hits first, then definition hits, then the rest
///
/// Ties fall back to case-insensitive name order.
pub fn rank_by_relevance(results: &mut [&GlossaryEntry], query: &str) {
    let needle = query.trim().to_lowercase();
    results.sort_by(|a, b| compare_relevance(a, b, &needle));
}

fn compare_relevance(a: &GlossaryEntry, b: &GlossaryEntry, needle: &str) -> Ordering {
    let rank = |entry: &GlossaryEntry| -> u8 {
        if needle.is_empty() {
            0
        } else if entry.name.to_lowercase().contains(needle) {
            0
        } else if entry.definition.to_lowercase().contains(needle) {
            1
        } else {
            2
        }
    };

    rank(a)
        .cmp(&rank(b))
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}
