//! Canonical glossary entries (`exicon`, `lexicon`)
//!
//! Table names come only from [`Family`]; every value is bound.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::{debug, info};
use xicon_common::models::{EntryFields, ExerciseDetail, Family, GlossaryEntry};
use xicon_common::pipe_list::PipeList;
use xicon_common::{Error, Result};

use super::map_unique_violation;

fn columns(family: Family) -> &'static str {
    match family {
        Family::Exicon => {
            "id, name, slug, definition, tags, video_url, aliases, created_at, updated_at"
        }
        Family::Lexicon => "id, name, slug, definition, aliases, created_at, updated_at",
    }
}

fn entry_from_row(family: Family, row: &SqliteRow) -> Result<GlossaryEntry> {
    let exercise = if family.has_exercise_detail() {
        Some(ExerciseDetail {
            tags: PipeList::from_storage(row.try_get("tags")?),
            video_url: row.try_get("video_url")?,
        })
    } else {
        None
    };

    Ok(GlossaryEntry {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        definition: row.try_get("definition")?,
        aliases: PipeList::from_storage(row.try_get("aliases")?),
        exercise,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// All entries, ordered by name
pub async fn list(pool: &SqlitePool, family: Family) -> Result<Vec<GlossaryEntry>> {
    let sql = format!(
        "SELECT {} FROM {} ORDER BY name COLLATE NOCASE ASC, name ASC",
        columns(family),
        family.table()
    );
    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    rows.iter().map(|row| entry_from_row(family, row)).collect()
}

pub async fn get_by_slug(pool: &SqlitePool, family: Family, slug: &str) -> Result<GlossaryEntry> {
    let mut conn = pool.acquire().await?;
    fetch_by_slug(&mut conn, family, slug)
        .await?
        .ok_or_else(|| Error::NotFound(family.not_found_message()))
}

async fn fetch_by_slug(
    conn: &mut SqliteConnection,
    family: Family,
    slug: &str,
) -> Result<Option<GlossaryEntry>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE slug = ?",
        columns(family),
        family.table()
    );
    let row = sqlx::query(&sql).bind(slug).fetch_optional(&mut *conn).await?;

    row.map(|row| entry_from_row(family, &row)).transpose()
}

async fn fetch_by_id(conn: &mut SqliteConnection, family: Family, id: i64) -> Result<GlossaryEntry> {
    let sql = format!(
        "SELECT {} FROM {} WHERE id = ?",
        columns(family),
        family.table()
    );
    let row = sqlx::query(&sql).bind(id).fetch_optional(&mut *conn).await?;

    match row {
        Some(row) => entry_from_row(family, &row),
        None => Err(Error::NotFound(family.not_found_message())),
    }
}

/// Fail with Conflict when another entry already has this name or slug
pub(crate) async fn ensure_available(
    conn: &mut SqliteConnection,
    fields: &EntryFields,
    exclude_id: Option<i64>,
) -> Result<()> {
    let family = fields.family;
    let sql = format!(
        "SELECT COUNT(*) FROM {} WHERE (name = ? OR slug = ?) AND id != ?",
        family.table()
    );
    let taken: i64 = sqlx::query_scalar(&sql)
        .bind(&fields.name)
        .bind(fields.slug())
        .bind(exclude_id.unwrap_or(-1))
        .fetch_one(&mut *conn)
        .await?;

    if taken > 0 {
        debug!("{} name {:?} already taken", family, fields.name);
        return Err(Error::Conflict(family.conflict_message()));
    }
    Ok(())
}

/// Insert a new entry on an open connection or transaction
pub(crate) async fn insert(conn: &mut SqliteConnection, fields: &EntryFields) -> Result<GlossaryEntry> {
    let family = fields.family;
    ensure_available(conn, fields, None).await?;

    let now = Utc::now();
    let result = match family {
        Family::Exicon => {
            sqlx::query(
                r#"
                INSERT INTO exicon (name, slug, definition, tags, video_url, aliases, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&fields.name)
            .bind(fields.slug())
            .bind(&fields.definition)
            .bind(fields.tags().and_then(PipeList::to_storage))
            .bind(fields.video_url())
            .bind(fields.aliases.to_storage())
            .bind(now)
            .bind(now)
            .execute(&mut *conn)
            .await
        }
        Family::Lexicon => {
            sqlx::query(
                r#"
                INSERT INTO lexicon (name, slug, definition, aliases, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&fields.name)
            .bind(fields.slug())
            .bind(&fields.definition)
            .bind(fields.aliases.to_storage())
            .bind(now)
            .bind(now)
            .execute(&mut *conn)
            .await
        }
    }
    .map_err(map_unique_violation(family))?;

    fetch_by_id(conn, family, result.last_insert_rowid()).await
}

/// Admin create
pub async fn create(pool: &SqlitePool, fields: &EntryFields) -> Result<GlossaryEntry> {
    let mut conn = pool.acquire().await?;
    let entry = insert(&mut conn, fields).await?;
    info!("Created {} {:?} ({})", fields.family, entry.name, entry.slug);
    Ok(entry)
}

/// Replace the content of the entry at `slug`
///
/// The slug is re-derived from the new name and `updated_at` is refreshed.
pub async fn update(pool: &SqlitePool, slug: &str, fields: &EntryFields) -> Result<GlossaryEntry> {
    let family = fields.family;
    let mut tx = pool.begin().await?;

    let existing = fetch_by_slug(&mut tx, family, slug)
        .await?
        .ok_or_else(|| Error::NotFound(family.not_found_message()))?;
    ensure_available(&mut tx, fields, Some(existing.id)).await?;

    let now = Utc::now();
    let outcome = match family {
        Family::Exicon => {
            sqlx::query(
                r#"
                UPDATE exicon
                SET name = ?, slug = ?, definition = ?, tags = ?, video_url = ?, aliases = ?, updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(&fields.name)
            .bind(fields.slug())
            .bind(&fields.definition)
            .bind(fields.tags().and_then(PipeList::to_storage))
            .bind(fields.video_url())
            .bind(fields.aliases.to_storage())
            .bind(now)
            .bind(existing.id)
            .execute(&mut *tx)
            .await
        }
        Family::Lexicon => {
            sqlx::query(
                r#"
                UPDATE lexicon
                SET name = ?, slug = ?, definition = ?, aliases = ?, updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(&fields.name)
            .bind(fields.slug())
            .bind(&fields.definition)
            .bind(fields.aliases.to_storage())
            .bind(now)
            .bind(existing.id)
            .execute(&mut *tx)
            .await
        }
    };
    outcome.map_err(map_unique_violation(family))?;

    let entry = fetch_by_id(&mut tx, family, existing.id).await?;
    tx.commit().await?;

    info!("Updated {} {:?} ({} -> {})", family, entry.name, slug, entry.slug);
    Ok(entry)
}

pub async fn delete(pool: &SqlitePool, family: Family, slug: &str) -> Result<()> {
    let sql = format!("DELETE FROM {} WHERE slug = ?", family.table());
    let result = sqlx::query(&sql).bind(slug).execute(pool).await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(family.not_found_message()));
    }
    info!("Deleted {} {}", family, slug);
    Ok(())
}

pub async fn count(pool: &SqlitePool, family: Family) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", family.table());
    Ok(sqlx::query_scalar(&sql).fetch_one(pool).await?)
}

/// Every entry name, for `@(Name)` lookups
pub async fn names(pool: &SqlitePool, family: Family) -> Result<Vec<String>> {
    let sql = format!(
        "SELECT name FROM {} ORDER BY name COLLATE NOCASE ASC",
        family.table()
    );
    Ok(sqlx::query_scalar(&sql).fetch_all(pool).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use xicon_common::db::init_memory_database;
    use xicon_common::models::parse_draft;

    fn fields(family: Family, payload: serde_json::Value) -> EntryFields {
        parse_draft(family, payload).unwrap().0
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let pool = init_memory_database().await.unwrap();
        let created = create(
            &pool,
            &fields(
                Family::Exicon,
                json!({"name": "Merkin", "definition": "Pushup", "tags": "Core|Arms", "aliases": "Pushup"}),
            ),
        )
        .await
        .unwrap();

        assert_eq!(created.slug, "merkin");
        let fetched = get_by_slug(&pool, Family::Exicon, "merkin").await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.tags().unwrap().joined(), "Core|Arms");
        assert_eq!(fetched.aliases.joined(), "Pushup");
    }

    #[tokio::test]
    async fn test_duplicate_name_or_slug_conflicts() {
        let pool = init_memory_database().await.unwrap();
        let merkin = fields(Family::Exicon, json!({"name": "Merkin", "definition": "Pushup"}));
        create(&pool, &merkin).await.unwrap();

        let err = create(&pool, &merkin).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        let same_slug = fields(Family::Exicon, json!({"name": "MERKIN!", "definition": "Loud"}));
        let err = create(&pool, &same_slug).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(count(&pool, Family::Exicon).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_families_are_independent() {
        let pool = init_memory_database().await.unwrap();
        create(&pool, &fields(Family::Exicon, json!({"name": "Q", "definition": "x"})))
            .await
            .unwrap();
        create(&pool, &fields(Family::Lexicon, json!({"name": "Q", "definition": "Leader"})))
            .await
            .unwrap();

        let term = get_by_slug(&pool, Family::Lexicon, "q").await.unwrap();
        assert!(term.exercise.is_none());
    }

    #[tokio::test]
    async fn test_update_rederives_slug() {
        let pool = init_memory_database().await.unwrap();
        let created = create(&pool, &fields(Family::Lexicon, json!({"name": "Q", "definition": "Leader"})))
            .await
            .unwrap();

        let updated = update(
            &pool,
            "q",
            &fields(Family::Lexicon, json!({"name": "The Q", "definition": "Workout leader"})),
        )
        .await
        .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.slug, "the-q");
        assert!(updated.updated_at >= created.updated_at);
        assert!(matches!(
            get_by_slug(&pool, Family::Lexicon, "q").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_may_keep_own_name_but_not_take_another() {
        let pool = init_memory_database().await.unwrap();
        create(&pool, &fields(Family::Lexicon, json!({"name": "Q", "definition": "Leader"})))
            .await
            .unwrap();
        create(&pool, &fields(Family::Lexicon, json!({"name": "PAX", "definition": "People"})))
            .await
            .unwrap();

        update(&pool, "q", &fields(Family::Lexicon, json!({"name": "Q", "definition": "Leads"})))
            .await
            .unwrap();

        let err = update(&pool, "q", &fields(Family::Lexicon, json!({"name": "PAX", "definition": "x"})))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let pool = init_memory_database().await.unwrap();
        let f = fields(Family::Exicon, json!({"name": "Ghost", "definition": "x"}));
        assert!(matches!(update(&pool, "ghost", &f).await, Err(Error::NotFound(_))));
        assert!(matches!(
            delete(&pool, Family::Exicon, "ghost").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_and_names_sorted() {
        let pool = init_memory_database().await.unwrap();
        for name in ["burpee", "Abyss", "Crab Walk"] {
            create(&pool, &fields(Family::Exicon, json!({"name": name, "definition": "x"})))
                .await
                .unwrap();
        }

        let listed: Vec<_> = list(&pool, Family::Exicon)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(listed, vec!["Abyss", "burpee", "Crab Walk"]);
        assert_eq!(names(&pool, Family::Exicon).await.unwrap().len(), 3);
    }
}
