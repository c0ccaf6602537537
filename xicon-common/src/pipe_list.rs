//! Pipe-delimited label lists (`tags`, `aliases`)
//!
//! Storage and wire format is a single `|`-joined string; in memory the list
//! is a vector of trimmed, non-empty, de-duplicated items. Items can never
//! contain the separator: text input is split on it, and array input holding
//! it is rejected.

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Field separator used at the storage boundary
pub const SEPARATOR: char = '|';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipeList(Vec<String>);

impl PipeList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Parse a `|`-joined string
    pub fn parse(raw: &str) -> Self {
        let mut list = Self::new();
        for item in raw.split(SEPARATOR) {
            list.push_trimmed(item);
        }
        list
    }

    /// Build from individual items, rejecting any item containing `|`
    pub fn from_items<I, S>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        for item in items {
            let item = item.as_ref();
            if item.contains(SEPARATOR) {
                return Err(Error::Validation(format!(
                    "List item {:?} must not contain '{}'",
                    item, SEPARATOR
                )));
            }
            list.push_trimmed(item);
        }
        Ok(list)
    }

    /// Read a nullable storage column
    pub fn from_storage(raw: Option<String>) -> Self {
        raw.as_deref().map(Self::parse).unwrap_or_default()
    }

    /// Value to store; empty lists are stored as NULL
    pub fn to_storage(&self) -> Option<String> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.joined())
        }
    }

    pub fn joined(&self) -> String {
        self.0.join(&SEPARATOR.to_string())
    }

    pub fn contains(&self, item: &str) -> bool {
        self.0.iter().any(|i| i == item)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn push_trimmed(&mut self, item: &str) {
        let item = item.trim();
        if !item.is_empty() && !self.contains(item) {
            self.0.push(item.to_string());
        }
    }
}

impl Serialize for PipeList {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.to_storage() {
            Some(joined) => serializer.serialize_str(&joined),
            None => serializer.serialize_none(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawList {
    Text(String),
    Items(Vec<String>),
}

impl<'de> Deserialize<'de> for PipeList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match Option::<RawList>::deserialize(deserializer)? {
            None => Ok(PipeList::new()),
            Some(RawList::Text(raw)) => Ok(PipeList::parse(&raw)),
            Some(RawList::Items(items)) => {
                PipeList::from_items(items).map_err(serde::de::Error::custom)
            }
        }
    }
}
