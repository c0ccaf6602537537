//! Video link helpers

use url::Url;

/// Embeddable form of a video link
///
/// YouTube watch, short and shorts links become `/embed/<id>` URLs. Anything
/// else, including unparseable input, is returned unchanged.
///
/// # Examples
///
/// ```
/// use xicon_common::browse::video::embed_url;
///
/// assert_eq!(
///     embed_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
///     "https://www.youtube.com/embed/dQw4w9WgXcQ"
/// );
/// assert_eq!(embed_url("https://vimeo.com/1"), "https://vimeo.com/1");
/// ```
pub fn embed_url(raw: &str) -> String {
    youtube_id(raw)
        .map(|id| format!("https://www.youtube.com/embed/{}", id))
        .unwrap_or_else(|| raw.to_string())
}

fn youtube_id(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let host = url.host_str()?.trim_start_matches("www.").trim_start_matches("m.");

    let id = match host {
        "youtu.be" => url.path_segments()?.next()?.to_string(),
        "youtube.com" | "youtube-nocookie.com" => {
            let mut segments = url.path_segments()?;
            match segments.next()? {
                "watch" => url
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned())?,
                "embed" | "shorts" | "live" => segments.next()?.to_string(),
                _ => return None,
            }
        }
        _ => return None,
    };

    (!id.is_empty()).then_some(id)
}
