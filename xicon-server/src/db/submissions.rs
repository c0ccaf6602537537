//! Pending submissions and the moderation workflow
//!
//! Visitors add rows to `*_submissions`. An admin either approves one, which
//! promotes it into the canonical table and removes it in one transaction,
//! or rejects it, which only removes it.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::{info, warn};
use xicon_common::models::{
    Attribution, EntryFields, ExerciseDetail, Family, GlossaryEntry, PendingCounts,
    PendingSubmissions, Submission,
};
use xicon_common::pipe_list::PipeList;
use xicon_common::{Error, Result};

use super::{entries, map_unique_violation};

fn not_found() -> Error {
    Error::NotFound("Submission not found".to_string())
}

fn columns(family: Family) -> &'static str {
    match family {
        Family::Exicon => {
            "id, name, definition, tags, video_url, aliases, f3name, region, submitted_on"
        }
        Family::Lexicon => "id, name, definition, aliases, f3name, region, submitted_on",
    }
}

fn submission_from_row(family: Family, row: &SqliteRow) -> Result<Submission> {
    let exercise = if family.has_exercise_detail() {
        Some(ExerciseDetail {
            tags: PipeList::from_storage(row.try_get("tags")?),
            video_url: row.try_get("video_url")?,
        })
    } else {
        None
    };

    Ok(Submission {
        id: row.try_get("id")?,
        family,
        name: row.try_get("name")?,
        definition: row.try_get("definition")?,
        aliases: PipeList::from_storage(row.try_get("aliases")?),
        exercise,
        f3name: row.try_get("f3name")?,
        region: row.try_get("region")?,
        submitted_on: row.try_get("submitted_on")?,
    })
}

/// Queue a visitor submission; returns its id
///
/// The name must be free in both the pending queue and the published
/// glossary.
pub async fn submit(pool: &SqlitePool, fields: &EntryFields, attribution: &Attribution) -> Result<i64> {
    let family = fields.family;
    let mut conn = pool.acquire().await?;

    let pending_sql = format!(
        "SELECT COUNT(*) FROM {} WHERE name = ?",
        family.submissions_table()
    );
    let pending: i64 = sqlx::query_scalar(&pending_sql)
        .bind(&fields.name)
        .fetch_one(&mut *conn)
        .await?;
    if pending > 0 {
        return Err(Error::Conflict(family.conflict_message()));
    }
    entries::ensure_available(&mut conn, fields, None).await?;

    let now = Utc::now();
    let result = match family {
        Family::Exicon => {
            sqlx::query(
                r#"
                INSERT INTO exicon_submissions (name, definition, tags, video_url, aliases, f3name, region, submitted_on)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&fields.name)
            .bind(&fields.definition)
            .bind(fields.tags().and_then(PipeList::to_storage))
            .bind(fields.video_url())
            .bind(fields.aliases.to_storage())
            .bind(&attribution.f3name)
            .bind(&attribution.region)
            .bind(now)
            .execute(&mut *conn)
            .await
        }
        Family::Lexicon => {
            sqlx::query(
                r#"
                INSERT INTO lexicon_submissions (name, definition, aliases, f3name, region, submitted_on)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&fields.name)
            .bind(&fields.definition)
            .bind(fields.aliases.to_storage())
            .bind(&attribution.f3name)
            .bind(&attribution.region)
            .bind(now)
            .execute(&mut *conn)
            .await
        }
    }
    .map_err(map_unique_violation(family))?;

    let id = result.last_insert_rowid();
    info!("New {} submission #{}: {:?}", family, id, fields.name);
    Ok(id)
}

/// Pending submissions of one family, newest first
pub async fn list_family(pool: &SqlitePool, family: Family) -> Result<Vec<Submission>> {
    let sql = format!(
        "SELECT {} FROM {} ORDER BY submitted_on DESC, id DESC",
        columns(family),
        family.submissions_table()
    );
    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    rows.iter().map(|row| submission_from_row(family, row)).collect()
}

pub async fn list_pending(pool: &SqlitePool) -> Result<PendingSubmissions> {
    Ok(PendingSubmissions {
        exicon_submissions: list_family(pool, Family::Exicon).await?,
        lexicon_submissions: list_family(pool, Family::Lexicon).await?,
    })
}

pub async fn count(pool: &SqlitePool, family: Family) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", family.submissions_table());
    Ok(sqlx::query_scalar(&sql).fetch_one(pool).await?)
}

pub async fn count_pending(pool: &SqlitePool) -> Result<PendingCounts> {
    Ok(PendingCounts::new(
        count(pool, Family::Exicon).await?,
        count(pool, Family::Lexicon).await?,
    ))
}

async fn fetch(conn: &mut SqliteConnection, family: Family, id: i64) -> Result<Submission> {
    let sql = format!(
        "SELECT {} FROM {} WHERE id = ?",
        columns(family),
        family.submissions_table()
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(not_found)?;

    submission_from_row(family, &row)
}

pub async fn get(pool: &SqlitePool, family: Family, id: i64) -> Result<Submission> {
    let mut conn = pool.acquire().await?;
    fetch(&mut conn, family, id).await
}

async fn remove(conn: &mut SqliteConnection, family: Family, id: i64) -> Result<()> {
    let sql = format!("DELETE FROM {} WHERE id = ?", family.submissions_table());
    let result = sqlx::query(&sql).bind(id).execute(&mut *conn).await?;
    if result.rows_affected() == 0 {
        return Err(not_found());
    }
    Ok(())
}

/// Discard a submission without publishing it
pub async fn reject(pool: &SqlitePool, family: Family, id: i64) -> Result<()> {
    let mut conn = pool.acquire().await?;
    remove(&mut conn, family, id).await?;
    info!("Rejected {} submission #{}", family, id);
    Ok(())
}

/// Publish a submission
///
/// `edited` replaces the submitted content when the admin changed it during
/// review. Entry creation and submission removal commit together; on any
/// error the transaction rolls back and the submission stays queued.
pub async fn approve(
    pool: &SqlitePool,
    family: Family,
    id: i64,
    edited: Option<EntryFields>,
) -> Result<GlossaryEntry> {
    if let Some(fields) = &edited {
        if fields.family != family {
            return Err(Error::Validation(format!(
                "Edited content is for {}, submission is {}",
                fields.family, family
            )));
        }
    }

    let mut tx = pool.begin().await?;

    let submission = fetch(&mut tx, family, id).await?;
    let fields = edited.unwrap_or_else(|| submission.fields());

    let entry = match entries::insert(&mut tx, &fields).await {
        Ok(entry) => entry,
        Err(e) => {
            warn!("Approval of {} submission #{} failed: {}", family, id, e);
            return Err(e);
        }
    };
    remove(&mut tx, family, id).await?;

    tx.commit().await?;

    info!(
        "Approved {} submission #{} as {:?} ({})",
        family, id, entry.name, entry.slug
    );
    Ok(entry)
}
