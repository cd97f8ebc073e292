//! Tag repository
//!
//! - upsert: INSERT with ON CONFLICT (idempotent, no check-then-insert)
//! - list: LEFT JOIN with usage count (single query)

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{TagName, TagOrder, TagUsage};

const LIST_TAGS: &str = r#"
    SELECT t.name, COUNT(et.entry_id) AS usage_count
    FROM tags t
    LEFT JOIN entry_tags et ON et.tag_id = t.id
    GROUP BY t.id, t.name
"#;

/// Tag repository
pub struct TagRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> TagRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every tag with the number of entries using it.
    pub async fn list(&self, order: TagOrder) -> Result<Vec<TagUsage>> {
        let sql = list_sql(order);
        let tags = sqlx::query_as::<_, TagUsage>(&sql)
            .fetch_all(self.pool)
            .await?;
        Ok(tags)
    }
}

fn list_sql(order: TagOrder) -> String {
    let order_by = match order {
        TagOrder::Usage => "usage_count DESC, t.name",
        TagOrder::Name => "t.name",
    };
    format!("{LIST_TAGS} ORDER BY {order_by}")
}

/// Return the id of tag `name`, creating it when absent.
///
/// Runs on the caller's connection so it can join an open transaction.
/// The no-op update makes RETURNING yield the existing row on conflict.
pub(crate) async fn upsert_tag(conn: &mut PgConnection, name: &TagName) -> Result<Uuid> {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO tags (name) VALUES ($1)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(name.as_str())
    .fetch_one(conn)
    .await?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_order_breaks_ties_by_name() {
        let sql = list_sql(TagOrder::Usage);
        assert!(sql.trim_end().ends_with("ORDER BY usage_count DESC, t.name"));
    }

    #[test]
    fn name_order() {
        let sql = list_sql(TagOrder::Name);
        assert!(sql.trim_end().ends_with("ORDER BY t.name"));
        assert!(sql.contains("LEFT JOIN entry_tags"));
    }
}
