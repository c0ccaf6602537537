//! Glossary data model and per-family payload schemas
//!
//! Payloads arrive as [`ExerciseDraft`] or [`TermDraft`] depending on the
//! route family and are validated into [`EntryFields`] before anything
//! reaches the access layer.

use crate::pipe_list::PipeList;
use crate::slug::{is_reserved, slugify};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Entry family: exercise glossary or terminology glossary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Exicon,
    Lexicon,
}

impl Family {
    pub const ALL: [Family; 2] = [Family::Exicon, Family::Lexicon];

    pub fn as_str(self) -> &'static str {
        match self {
            Family::Exicon => "exicon",
            Family::Lexicon => "lexicon",
        }
    }

    /// Canonical table
    pub fn table(self) -> &'static str {
        match self {
            Family::Exicon => "exicon",
            Family::Lexicon => "lexicon",
        }
    }

    /// Pending submission table
    pub fn submissions_table(self) -> &'static str {
        match self {
            Family::Exicon => "exicon_submissions",
            Family::Lexicon => "lexicon_submissions",
        }
    }

    /// Singular noun used in user-facing messages
    pub fn noun(self) -> &'static str {
        match self {
            Family::Exicon => "exercise",
            Family::Lexicon => "term",
        }
    }

    /// Whether entries carry tags and a video link
    pub fn has_exercise_detail(self) -> bool {
        matches!(self, Family::Exicon)
    }

    pub fn not_found_message(self) -> String {
        format!("{} not found", capitalize(self.noun()))
    }

    pub fn conflict_message(self) -> String {
        let article = match self {
            Family::Exicon => "An",
            Family::Lexicon => "A",
        };
        format!("{} {} with this name already exists", article, self.noun())
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Family {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exicon" => Ok(Family::Exicon),
            "lexicon" => Ok(Family::Lexicon),
            other => Err(Error::NotFound(format!("Unknown glossary: {}", other))),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Exercise-only columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDetail {
    #[serde(default)]
    pub tags: PipeList,
    #[serde(default)]
    pub video_url: Option<String>,
}

/// Canonical glossary entry (row of `exicon` or `lexicon`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub definition: String,
    #[serde(default)]
    pub aliases: PipeList,
    /// Present for exercises only
    #[serde(flatten)]
    pub exercise: Option<ExerciseDetail>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GlossaryEntry {
    pub fn tags(&self) -> Option<&PipeList> {
        self.exercise.as_ref().map(|d| &d.tags)
    }

    /// Non-empty video link, if any
    pub fn video_url(&self) -> Option<&str> {
        self.exercise
            .as_ref()
            .and_then(|d| d.video_url.as_deref())
            .filter(|url| !url.trim().is_empty())
    }
}

/// Visitor-supplied attribution on a submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    pub f3name: Option<String>,
    pub region: Option<String>,
}

impl Attribution {
    pub fn new(f3name: Option<String>, region: Option<String>) -> Self {
        Self {
            f3name: non_blank(f3name),
            region: non_blank(region),
        }
    }
}

/// Pending submission (row of `*_submissions`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub family: Family,
    pub name: String,
    pub definition: String,
    #[serde(default)]
    pub aliases: PipeList,
    #[serde(flatten)]
    pub exercise: Option<ExerciseDetail>,
    pub f3name: Option<String>,
    pub region: Option<String>,
    pub submitted_on: DateTime<Utc>,
}

impl Submission {
    /// Content fields as they would be promoted into the canonical table
    pub fn fields(&self) -> EntryFields {
        EntryFields {
            family: self.family,
            name: self.name.clone(),
            definition: self.definition.clone(),
            aliases: self.aliases.clone(),
            exercise: self.exercise.clone(),
        }
    }
}

/// Pending submissions of both families, newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSubmissions {
    pub exicon_submissions: Vec<Submission>,
    pub lexicon_submissions: Vec<Submission>,
}

/// Pending submission counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCounts {
    pub exicon_count: i64,
    pub lexicon_count: i64,
    pub total_count: i64,
}

impl PendingCounts {
    pub fn new(exicon_count: i64, lexicon_count: i64) -> Self {
        Self {
            exicon_count,
            lexicon_count,
            total_count: exicon_count + lexicon_count,
        }
    }
}

/// Validated content fields, ready for the access layer
#[derive(Debug, Clone, PartialEq)]
pub struct EntryFields {
    pub family: Family,
    pub name: String,
    pub definition: String,
    pub aliases: PipeList,
    /// `Some` exactly when `family` is [`Family::Exicon`]
    pub exercise: Option<ExerciseDetail>,
}

impl EntryFields {
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }

    pub fn tags(&self) -> Option<&PipeList> {
        self.exercise.as_ref().map(|d| &d.tags)
    }

    pub fn video_url(&self) -> Option<&str> {
        self.exercise.as_ref().and_then(|d| d.video_url.as_deref())
    }
}

/// Exercise payload (`/api/exicon/...`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExerciseDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub tags: PipeList,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub aliases: PipeList,
    #[serde(default)]
    pub f3name: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

/// Term payload (`/api/lexicon/...`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TermDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub aliases: PipeList,
    #[serde(default)]
    pub f3name: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

/// A payload schema bound to one family
pub trait Draft {
    const FAMILY: Family;

    /// Validate into access-layer fields
    fn into_fields(self) -> Result<EntryFields>;

    fn attribution(&self) -> Attribution;
}

impl Draft for ExerciseDraft {
    const FAMILY: Family = Family::Exicon;

    fn into_fields(self) -> Result<EntryFields> {
        let (name, definition) = validate_required(&self.name, &self.definition)?;
        let video_url = validate_video_url(self.video_url)?;

        Ok(EntryFields {
            family: Self::FAMILY,
            name,
            definition,
            aliases: self.aliases,
            exercise: Some(ExerciseDetail {
                tags: self.tags,
                video_url,
            }),
        })
    }

    fn attribution(&self) -> Attribution {
        Attribution::new(self.f3name.clone(), self.region.clone())
    }
}

impl Draft for TermDraft {
    const FAMILY: Family = Family::Lexicon;

    fn into_fields(self) -> Result<EntryFields> {
        let (name, definition) = validate_required(&self.name, &self.definition)?;

        Ok(EntryFields {
            family: Self::FAMILY,
            name,
            definition,
            aliases: self.aliases,
            exercise: None,
        })
    }

    fn attribution(&self) -> Attribution {
        Attribution::new(self.f3name.clone(), self.region.clone())
    }
}

/// Parse and validate a JSON payload for the given family
pub fn parse_draft(family: Family, payload: serde_json::Value) -> Result<(EntryFields, Attribution)> {
    fn finish<D: Draft>(draft: D) -> Result<(EntryFields, Attribution)> {
        let attribution = draft.attribution();
        Ok((draft.into_fields()?, attribution))
    }

    let invalid = |e: serde_json::Error| Error::Validation(format!("Invalid payload: {}", e));
    match family {
        Family::Exicon => finish(serde_json::from_value::<ExerciseDraft>(payload).map_err(invalid)?),
        Family::Lexicon => finish(serde_json::from_value::<TermDraft>(payload).map_err(invalid)?),
    }
}

fn validate_required(name: &str, definition: &str) -> Result<(String, String)> {
    let name = name.trim();
    if name.is_empty() || definition.trim().is_empty() {
        return Err(Error::Validation(
            "Name and definition are required".to_string(),
        ));
    }
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(Error::Validation(
            "Name must contain at least one letter or digit".to_string(),
        ));
    }
    if is_reserved(&slug) {
        return Err(Error::Validation(format!(
            "Name '{}' is reserved",
            name
        )));
    }
    Ok((name.to_string(), definition.to_string()))
}

fn validate_video_url(raw: Option<String>) -> Result<Option<String>> {
    let Some(raw) = non_blank(raw) else {
        return Ok(None);
    };

    match url::Url::parse(&raw) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(Some(raw)),
        _ => Err(Error::Validation(format!("Invalid video URL: {}", raw))),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
