//! Database schema bootstrap for `melbourne-forecast-accuracy`.
//!
//! The forecast table is normally owned by the scraper that fills it. For
//! local development, `CREATE_SCHEMA=true` makes startup create an empty
//! table with the expected columns.

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create the forecast table and its index if they do not exist (idempotent).
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool, quoted_table: &str) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    for statement in schema_statements(quoted_table) {
        sqlx::query(&statement).execute(&mut *tx).await?;
    }

    tx.commit().await?;
    tracing::info!("Schema ready for {}", quoted_table);
    Ok(())
}

/// DDL for the forecast table and its `(issue, forecast)` index.
///
/// `date` and `issue` are stored as the scraper writes them, ISO text in
/// Melbourne local time. A `TIMESTAMPTZ` issue would be rendered in the
/// session time zone on read and could move a morning issue to the
/// previous day.
fn schema_statements(quoted_table: &str) -> [String; 2] {
    // ---
    let index_name = format!(
        "\"idx_{}_issue_forecast\"",
        quoted_table.trim_matches('"').replace('"', "")
    );

    [
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {quoted_table} (
                id            SERIAL PRIMARY KEY,
                date          TEXT    NOT NULL,
                forecast      INTEGER NOT NULL CHECK (forecast BETWEEN 0 AND 6),
                temp_max      REAL,
                issue         TEXT    NOT NULL,
                extended_text TEXT
            );
            "#
        ),
        format!(
            r#"
            CREATE INDEX IF NOT EXISTS {index_name}
                ON {quoted_table} (issue, forecast);
            "#
        ),
    ]
}
