//! `@(Name)` cross-references inside definitions
//!
//! A definition in either glossary may mention an exercise by exact name,
//! written `@(Name)`. Rendering resolves mentions against the exercise list,
//! turning known names into links and leaving unknown ones as literal text. [`LookupStack`] models the nested
//! lookup dialog a reader walks through by following links.

use crate::models::GlossaryEntry;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@\(([^)]+)\)").expect("reference pattern is valid"));

/// Raw piece of a definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    /// `name` is the text between the parentheses, `raw` the whole `@(...)`
    Reference { name: &'a str, raw: &'a str },
}

/// Split a definition into text and reference segments
pub fn parse_definition(definition: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in REFERENCE.captures_iter(definition) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            segments.push(Segment::Text(&definition[last..whole.start()]));
        }
        segments.push(Segment::Reference {
            name: name.as_str(),
            raw: whole.as_str(),
        });
        last = whole.end();
    }
    if last < definition.len() {
        segments.push(Segment::Text(&definition[last..]));
    }
    segments
}

/// Definition piece ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderedSegment {
    Text { text: String },
    Link { name: String, slug: String },
}

/// Resolve references against `entries` by exact name
///
/// Unknown names stay as literal `@(Name)` text. Adjacent text is merged.
pub fn render_definition(definition: &str, entries: &[GlossaryEntry]) -> Vec<RenderedSegment> {
    let by_name: HashMap<&str, &str> = entries
        .iter()
        .map(|e| (e.name.as_str(), e.slug.as_str()))
        .collect();

    let mut rendered: Vec<RenderedSegment> = Vec::new();
    for segment in parse_definition(definition) {
        match segment {
            Segment::Reference { name, .. } if by_name.contains_key(name) => {
                rendered.push(RenderedSegment::Link {
                    name: name.to_string(),
                    slug: by_name[name].to_string(),
                });
            }
            Segment::Reference { raw: text, .. } | Segment::Text(text) => {
                if let Some(RenderedSegment::Text { text: prev }) = rendered.last_mut() {
                    prev.push_str(text);
                } else {
                    rendered.push(RenderedSegment::Text {
                        text: text.to_string(),
                    });
                }
            }
        }
    }
    rendered
}

/// Find the entry a reference points at
pub fn lookup<'a>(name: &str, entries: &'a [GlossaryEntry]) -> Option<&'a GlossaryEntry> {
    entries.iter().find(|e| e.name == name)
}

/// Stack of entries opened by following references
#[derive(Debug, Clone, Default)]
pub struct LookupStack {
    stack: Vec<GlossaryEntry>,
}

impl LookupStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, entry: GlossaryEntry) {
        self.stack.push(entry);
    }

    /// Follow a reference by name; false when nothing matches
    pub fn follow(&mut self, name: &str, entries: &[GlossaryEntry]) -> bool {
        match lookup(name, entries) {
            Some(entry) => {
                self.stack.push(entry.clone());
                true
            }
            None => false,
        }
    }

    /// Return to the previous entry
    pub fn back(&mut self) -> Option<GlossaryEntry> {
        self.stack.pop()
    }

    pub fn close_all(&mut self) {
        self.stack.clear();
    }

    pub fn current(&self) -> Option<&GlossaryEntry> {
        self.stack.last()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn can_go_back(&self) -> bool {
        self.stack.len() > 1
    }
}
