//! Idempotent schema creation for entries, tags, and their junction table

use sqlx::PgPool;
use tracing::info;

use crate::error::Result;

/// Schema statements, run in order inside one transaction.
///
/// Every statement uses IF NOT EXISTS so initialization can be repeated
/// without touching existing data. There is no migration versioning.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS entries (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        type TEXT NOT NULL DEFAULT 'note',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        created_by TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tags (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        name TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS entry_tags (
        entry_id UUID NOT NULL REFERENCES entries(id) ON DELETE CASCADE,
        tag_id UUID NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
        PRIMARY KEY (entry_id, tag_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_entries_created_at ON entries(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_entries_type ON entries(type)",
    // Exact-title lookup for `show`. Older databases may already hold a
    // full-text index named idx_entries_title, hence the distinct name.
    "CREATE INDEX IF NOT EXISTS idx_entries_title_exact ON entries(title)",
    // entry_tags' primary key already covers lookups by entry_id
    "CREATE INDEX IF NOT EXISTS idx_entry_tags_tag ON entry_tags(tag_id)",
];

/// Create tables and indexes if they are absent.
pub async fn initialize(pool: &PgPool) -> Result<()> {
    info!("Initializing database schema...");

    let mut tx = pool.begin().await?;
    for statement in SCHEMA_STATEMENTS {
        sqlx::query(*statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    info!("Database schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_statement_is_idempotent() {
        for statement in SCHEMA_STATEMENTS {
            assert!(
                statement.contains("IF NOT EXISTS"),
                "not idempotent: {statement}"
            );
        }
    }

    #[test]
    fn one_statement_per_query() {
        // Prepared statements reject multiple commands
        for statement in SCHEMA_STATEMENTS {
            assert!(!statement.trim().trim_end_matches(';').contains(';'));
        }
    }

    #[test]
    fn index_set() {
        let names: Vec<&str> = SCHEMA_STATEMENTS
            .iter()
            .filter_map(|s| s.strip_prefix("CREATE INDEX IF NOT EXISTS "))
            .filter_map(|s| s.split_whitespace().next())
            .collect();
        assert_eq!(
            names,
            [
                "idx_entries_created_at",
                "idx_entries_type",
                "idx_entries_title_exact",
                "idx_entry_tags_tag",
            ]
        );
    }

    #[test]
    fn parents_are_created_before_the_junction() {
        let position = |needle: &str| {
            SCHEMA_STATEMENTS
                .iter()
                .position(|s| s.contains(needle))
                .unwrap()
        };
        assert!(position("TABLE IF NOT EXISTS entries") < position("TABLE IF NOT EXISTS entry_tags"));
        assert!(position("TABLE IF NOT EXISTS tags") < position("TABLE IF NOT EXISTS entry_tags"));
    }
}
