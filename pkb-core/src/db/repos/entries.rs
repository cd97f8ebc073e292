//! Entry repository
//!
//! Handles entries with:
//! - Atomic creation with tag association (transaction)
//! - Listing and search composed from optional filters (QueryBuilder)
//! - Tags loaded in the same statement as their entries (no N+1)

use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{Entry, EntryFilter, NewEntry, Page, SearchQuery};

use super::tags::upsert_tag;

/// Row columns aliased to match [`Entry`].
///
/// Databases created by earlier versions of the tool have `TIMESTAMP`
/// columns and a nullable `type`; the casts read both layouts the same way.
macro_rules! row_columns {
    () => {
        "e.id, e.title, e.content, \
         COALESCE(e.type, 'note') AS type, \
         COALESCE(e.created_at::timestamptz, 'epoch') AS created_at, \
         COALESCE(e.updated_at::timestamptz, 'epoch') AS updated_at, \
         e.created_by"
    };
}

/// Row columns plus the sorted tag names.
const ENTRY_COLUMNS: &str = concat!(
    row_columns!(),
    ", ARRAY(\
        SELECT t.name FROM entry_tags et \
        JOIN tags t ON t.id = et.tag_id \
        WHERE et.entry_id = e.id \
        ORDER BY t.name\
    ) AS tags"
);

/// Insert returning the new row; tags are attached afterwards.
const INSERT_ENTRY: &str = concat!(
    "INSERT INTO entries AS e (title, content, type, created_by) \
     VALUES ($1, $2, $3, $4) \
     RETURNING ",
    row_columns!(),
    ", '{}'::text[] AS tags"
);

/// Entry repository
pub struct EntryRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> EntryRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an entry and associate its tags (atomic).
    ///
    /// Missing tags are created; existing ones are reused. Either the entry
    /// and all of its associations are stored, or nothing is.
    pub async fn add(&self, new: &NewEntry) -> Result<Entry> {
        let mut tx = self.pool.begin().await?;

        let mut entry: Entry = sqlx::query_as(INSERT_ENTRY)
        .bind(new.title())
        .bind(new.content())
        .bind(new.entry_type().as_str())
        .bind(new.created_by())
        .fetch_one(&mut *tx)
        .await?;

        for tag in new.tags() {
            let tag_id = upsert_tag(&mut *tx, tag).await?;

            sqlx::query(
                r#"
                INSERT INTO entry_tags (entry_id, tag_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(entry.id)
            .bind(tag_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        entry.tags = new.tags().iter().map(|t| t.as_str().to_owned()).collect();
        entry.tags.sort();

        info!(id = %entry.id, title = %entry.title, tags = entry.tags.len(), "entry created");
        Ok(entry)
    }

    /// List entries, most recent first, restricted by `filter`.
    pub async fn list(&self, filter: &EntryFilter) -> Result<Vec<Entry>> {
        let mut query = list_query(filter);
        debug!(sql = query.sql(), "list entries");

        let entries = query.build_query_as::<Entry>().fetch_all(self.pool).await?;
        Ok(entries)
    }

    /// Case-insensitive substring search over title and/or content.
    ///
    /// Returns nothing, without querying, when neither column is selected.
    pub async fn search(&self, search: &SearchQuery, filter: &EntryFilter) -> Result<Vec<Entry>> {
        if !search.has_targets() {
            debug!("search with no target columns; skipping query");
            return Ok(Vec::new());
        }

        let mut query = search_query(search, filter);
        debug!(sql = query.sql(), "search entries");

        let entries = query.build_query_as::<Entry>().fetch_all(self.pool).await?;
        Ok(entries)
    }

    /// Find the most recent entry whose title equals `title` exactly.
    ///
    /// Surrounding whitespace is ignored, matching how titles are stored.
    pub async fn find_by_title(&self, title: &str) -> Result<Option<Entry>> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM entries e \
             WHERE e.title = $1 \
             ORDER BY e.created_at DESC NULLS LAST, e.id DESC \
             LIMIT 1"
        );

        let entry = sqlx::query_as::<_, Entry>(&sql)
            .bind(title.trim())
            .fetch_optional(self.pool)
            .await?;
        Ok(entry)
    }

    /// Like [`find_by_title`](Self::find_by_title), but absence is an error.
    pub async fn get_by_title(&self, title: &str) -> Result<Entry> {
        self.find_by_title(title)
            .await?
            .ok_or_else(|| Error::not_found("entry", title))
    }
}

fn select_entries() -> QueryBuilder<'static, Postgres> {
    QueryBuilder::new(format!("SELECT {ENTRY_COLUMNS} FROM entries e WHERE TRUE"))
}

/// Tag (AND) and type restrictions.
fn push_filter(builder: &mut QueryBuilder<'static, Postgres>, filter: &EntryFilter) {
    for tag in &filter.tags {
        builder.push(
            " AND EXISTS (SELECT 1 FROM entry_tags et JOIN tags t ON t.id = et.tag_id \
             WHERE et.entry_id = e.id AND t.name = ",
        );
        builder.push_bind(tag.as_str().to_owned());
        builder.push(")");
    }

    if let Some(entry_type) = &filter.entry_type {
        builder.push(" AND COALESCE(e.type, 'note') = ");
        builder.push_bind(entry_type.as_str().to_owned());
    }
}

/// Newest first; `id` breaks ties so pages don't overlap.
fn push_order_and_page(builder: &mut QueryBuilder<'static, Postgres>, page: Page) {
    builder.push(" ORDER BY e.created_at DESC NULLS LAST, e.id DESC");

    if let Some(limit) = page.limit {
        builder.push(" LIMIT ");
        builder.push_bind(i64::from(limit));
    }
    if page.offset > 0 {
        builder.push(" OFFSET ");
        builder.push_bind(i64::from(page.offset));
    }
}

pub(crate) fn list_query(filter: &EntryFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = select_entries();
    push_filter(&mut builder, filter);
    push_order_and_page(&mut builder, filter.page);
    builder
}

pub(crate) fn search_query(
    search: &SearchQuery,
    filter: &EntryFilter,
) -> QueryBuilder<'static, Postgres> {
    let pattern = search.like_pattern();
    let mut builder = select_entries();

    builder.push(" AND (");
    let mut targets = builder.separated(" OR ");
    if search.in_title {
        targets.push("e.title ILIKE ");
        targets.push_bind_unseparated(pattern.clone());
    }
    if search.in_content {
        targets.push("e.content ILIKE ");
        targets.push_bind_unseparated(pattern);
    }
    builder.push(")");

    push_filter(&mut builder, filter);
    push_order_and_page(&mut builder, filter.page);
    builder
}
