//! Tag catalog and AND/OR tag filtering

use crate::models::GlossaryEntry;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Labels stored in the exercise `tags` column
pub const EXERCISE_TAGS: [&str; 11] = [
    "Arms", "Cardio", "Core", "Coupon", "Full Body", "Legs", "Mary", "Music", "Run", "Routine",
    "Warmup",
];

/// Synthetic tag: entry has a video link
pub const VIDEO_TAG: &str = "Video";

/// Synthetic tag: entry is in the device-local starred set
pub const STARRED_TAG: &str = "⭐ Starred";

/// Every selectable tag, synthetic ones last
pub fn catalog() -> Vec<&'static str> {
    EXERCISE_TAGS
        .iter()
        .copied()
        .chain([VIDEO_TAG, STARRED_TAG])
        .collect()
}

/// Multi-tag combination policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagOperator {
    /// Entry must match every selected tag
    #[default]
    And,
    /// Entry must match at least one selected tag
    Or,
}

impl TagOperator {
    pub fn toggled(self) -> Self {
        match self {
            TagOperator::And => TagOperator::Or,
            TagOperator::Or => TagOperator::And,
        }
    }
}

impl fmt::Display for TagOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagOperator::And => f.write_str("AND"),
            TagOperator::Or => f.write_str("OR"),
        }
    }
}

impl FromStr for TagOperator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "and" => Ok(TagOperator::And),
            "or" => Ok(TagOperator::Or),
            other => Err(Error::Validation(format!(
                "Invalid tag operator {:?} (expected AND or OR)",
                other
            ))),
        }
    }
}

/// One selected tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagSelector {
    Label(String),
    Video,
    Starred,
}

impl TagSelector {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(match raw {
            VIDEO_TAG => TagSelector::Video,
            STARRED_TAG | "Starred" => TagSelector::Starred,
            label => TagSelector::Label(label.to_string()),
        })
    }

    pub fn label(&self) -> &str {
        match self {
            TagSelector::Label(label) => label,
            TagSelector::Video => VIDEO_TAG,
            TagSelector::Starred => STARRED_TAG,
        }
    }

    fn matches(&self, entry: &GlossaryEntry, starred: &BTreeSet<String>) -> bool {
        match self {
            TagSelector::Label(label) => entry
                .tags()
                .map(|tags| tags.contains(label))
                .unwrap_or(false),
            TagSelector::Video => entry.video_url().is_some(),
            TagSelector::Starred => starred.contains(&entry.slug),
        }
    }
}

/// Selected tags plus the combination policy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    selected: Vec<TagSelector>,
    operator: TagOperator,
}

impl TagFilter {
    pub fn new(operator: TagOperator) -> Self {
        Self {
            selected: Vec::new(),
            operator,
        }
    }

    /// Build from tag names, skipping blanks and duplicates
    pub fn from_tags<I, S>(tags: I, operator: TagOperator) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = Self::new(operator);
        for selector in tags.into_iter().filter_map(|t| TagSelector::parse(t.as_ref())) {
            if !filter.selected.contains(&selector) {
                filter.selected.push(selector);
            }
        }
        filter
    }

    /// Select the tag if unselected, otherwise deselect it
    pub fn toggle(&mut self, tag: &str) {
        let Some(selector) = TagSelector::parse(tag) else {
            return;
        };
        if let Some(pos) = self.selected.iter().position(|s| *s == selector) {
            self.selected.remove(pos);
        } else {
            self.selected.push(selector);
        }
    }

    pub fn toggle_operator(&mut self) {
        self.operator = self.operator.toggled();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn operator(&self) -> TagOperator {
        self.operator
    }

    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(TagSelector::label)
    }

    /// Apply the filter; an empty selection matches everything
    pub fn matches(&self, entry: &GlossaryEntry, starred: &BTreeSet<String>) -> bool {
        if self.selected.is_empty() {
            return true;
        }
        match self.operator {
            TagOperator::And => self.selected.iter().all(|s| s.matches(entry, starred)),
            TagOperator::Or => self.selected.iter().any(|s| s.matches(entry, starred)),
        }
    }
}
