//! CSV export of the entries a reader is currently looking at

use crate::models::GlossaryEntry;
use crate::{Error, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};

pub const EXPORT_HEADERS: [&str; 5] = ["Name", "Definition", "Tags", "Aliases", "Video URL"];

/// Suggested download name
pub const EXPORT_FILENAME: &str = "f3-exicon-export.csv";

/// Render entries as CSV, one row per entry under [`EXPORT_HEADERS`]
///
/// Every field is quoted and embedded quotes are doubled (RFC 4180). Tags and
/// aliases keep their pipe-joined form; missing values export as empty fields.
pub fn export_csv<'a, I>(entries: I) -> Result<String>
where
    I: IntoIterator<Item = &'a GlossaryEntry>,
{
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(EXPORT_HEADERS).map_err(csv_error)?;
    for entry in entries {
        let tags = entry.tags().map(|t| t.joined()).unwrap_or_default();
        let aliases = entry.aliases.joined();
        writer
            .write_record([
                entry.name.as_str(),
                entry.definition.as_str(),
                tags.as_str(),
                aliases.as_str(),
                entry.video_url().unwrap_or_default(),
            ])
            .map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Internal(format!("CSV flush failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::Internal(format!("CSV is not UTF-8: {}", e)))
}

fn csv_error(err: csv::Error) -> Error {
    Error::Internal(format!("CSV write failed: {}", err))
}
