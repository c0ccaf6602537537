//! Reader routes: search/filter/paginate, tag catalog, resolved references

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::header,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;
use xicon_common::browse::{
    self, export_csv, tags, video::embed_url, xref, BrowseQuery, RenderedSegment, TagFilter,
    TagOperator, DEFAULT_PAGE_SIZE, EXPORT_FILENAME,
};
use xicon_common::models::{Family, GlossaryEntry};

use super::FamilyScope;
use crate::db::entries;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Largest page a client may ask for
pub const MAX_PAGE_SIZE: usize = 100;

/// Query string of `GET /api/{family}/browse`
///
/// `tags` and `starred` are comma-separated.
#[derive(Debug, Default, Deserialize)]
pub struct BrowseParams {
    pub q: Option<String>,
    pub tags: Option<String>,
    pub op: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub starred: Option<String>,
}

fn split_csv(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

impl BrowseParams {
    fn to_request(&self) -> ApiResult<(BrowseQuery, BTreeSet<String>)> {
        let operator = match self.op.as_deref().map(str::trim) {
            None | Some("") => TagOperator::default(),
            Some(raw) => raw.parse::<TagOperator>()?,
        };
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ApiError::BadRequest(format!(
                "page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        let request = BrowseQuery {
            query: self.q.clone().unwrap_or_default(),
            filter: TagFilter::from_tags(split_csv(self.tags.as_deref()), operator),
            page: self.page.unwrap_or(1),
            page_size,
        };
        let starred = split_csv(self.starred.as_deref())
            .map(str::to_string)
            .collect();
        Ok((request, starred))
    }
}

/// One browse hit
#[derive(Debug, Serialize)]
pub struct BrowseItem {
    #[serde(flatten)]
    pub entry: GlossaryEntry,
    pub starred: bool,
    /// Embeddable player URL for the entry's video
    pub embed_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BrowseResponse {
    pub items: Vec<BrowseItem>,
    pub total_results: usize,
    pub page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub tags: Vec<String>,
    pub op: TagOperator,
}

/// GET /api/{family}/browse
pub async fn browse_entries<F: FamilyScope>(
    State(state): State<AppState>,
    params: Result<Query<BrowseParams>, QueryRejection>,
) -> ApiResult<Json<BrowseResponse>> {
    let Query(params) = params?;
    let (request, starred) = params.to_request()?;

    let all = entries::list(&state.db, F::FAMILY).await?;
    let page = browse::browse(&all, &request, &starred);
    debug!(
        "Browse {} q={:?}: {} results, page {}/{}",
        F::FAMILY,
        request.query,
        page.total_results,
        page.page,
        page.total_pages
    );

    let items = page
        .items
        .iter()
        .map(|entry| BrowseItem {
            starred: starred.contains(&entry.slug),
            embed_url: entry.video_url().map(embed_url),
            entry: (*entry).clone(),
        })
        .collect();

    Ok(Json(BrowseResponse {
        items,
        total_results: page.total_results,
        page: page.page,
        total_pages: page.total_pages,
        page_size: page.page_size,
        tags: request.filter.selected().map(str::to_string).collect(),
        op: request.filter.operator(),
    }))
}

/// GET /api/exicon/export
///
/// Every exercise matching `q`, `tags`, `op` and `starred` as a CSV
/// download; paging parameters are ignored.
pub async fn export_entries(
    State(state): State<AppState>,
    params: Result<Query<BrowseParams>, QueryRejection>,
) -> ApiResult<([(header::HeaderName, String); 2], String)> {
    let Query(params) = params?;
    let (request, starred) = params.to_request()?;

    let all = entries::list(&state.db, Family::Exicon).await?;
    let selected = browse::matching(&all, &request.query, &request.filter, &starred);
    debug!("Exporting {} of {} exercises", selected.len(), all.len());
    let body = export_csv(selected)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILENAME),
            ),
        ],
        body,
    ))
}

#[derive(Debug, Serialize)]
pub struct TagCatalog {
    pub tags: Vec<&'static str>,
}

/// GET /api/exicon/tags
pub async fn tag_catalog() -> Json<TagCatalog> {
    Json(TagCatalog {
        tags: tags::catalog(),
    })
}

#[derive(Debug, Serialize)]
pub struct ReferencesResponse {
    pub name: String,
    pub slug: String,
    pub segments: Vec<RenderedSegment>,
}

/// GET /api/{family}/{slug}/references
///
/// The definition split into text and links. Links always point into the
/// exercise glossary; `@(Name)` mentions of unknown exercises stay as text.
pub async fn references<F: FamilyScope>(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ReferencesResponse>> {
    let entry = entries::get_by_slug(&state.db, F::FAMILY, &slug).await?;
    let exercises = entries::list(&state.db, Family::Exicon).await?;

    Ok(Json(ReferencesResponse {
        segments: xref::render_definition(&entry.definition, &exercises),
        name: entry.name,
        slug: entry.slug,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_defaults() {
        let (request, starred) = BrowseParams::default().to_request().unwrap();
        assert_eq!(request.page, 1);
        assert_eq!(request.page_size, DEFAULT_PAGE_SIZE);
        assert!(request.filter.is_empty());
        assert_eq!(request.filter.operator(), TagOperator::And);
        assert!(starred.is_empty());
    }

    #[test]
    fn test_params_parse_lists() {
        let params = BrowseParams {
            tags: Some("Core, Video,,".to_string()),
            op: Some("OR".to_string()),
            starred: Some("merkin,burpee".to_string()),
            ..Default::default()
        };
        let (request, starred) = params.to_request().unwrap();
        assert_eq!(request.filter.selected().collect::<Vec<_>>(), vec!["Core", "Video"]);
        assert_eq!(request.filter.operator(), TagOperator::Or);
        assert_eq!(starred.len(), 2);
    }

    #[test]
    fn test_params_reject_bad_values() {
        let bad_op = BrowseParams {
            op: Some("xor".to_string()),
            ..Default::default()
        };
        assert!(matches!(bad_op.to_request(), Err(ApiError::BadRequest(_))));

        let huge = BrowseParams {
            page_size: Some(MAX_PAGE_SIZE + 1),
            ..Default::default()
        };
        assert!(matches!(huge.to_request(), Err(ApiError::BadRequest(_))));
    }
}
