//! ClickHouse schema bootstrap.
//!
//! Tables are created at startup if absent. Posts use a
//! `ReplacingMergeTree(updated_at)` so every write produces a new row
//! version and reads collapse to the latest with `FINAL`; nothing is ever
//! deleted by the application.

use clickhouse::Client;

/// DDL statements, executed in order at startup.
const DDL: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS blogs (
        id String,
        name String,
        description String,
        owner_id String,
        owner_name String,
        created_at DateTime
    ) ENGINE = MergeTree
    ORDER BY (created_at, id)",
    "CREATE TABLE IF NOT EXISTS posts (
        id String,
        blog_id String,
        title String,
        content String,
        tag_ids Array(String),
        created_at DateTime,
        updated_at DateTime
    ) ENGINE = ReplacingMergeTree(updated_at)
    ORDER BY id",
    "CREATE TABLE IF NOT EXISTS tags (
        id String,
        label String,
        created_at DateTime
    ) ENGINE = MergeTree
    ORDER BY (label, created_at)",
    "CREATE TABLE IF NOT EXISTS comments (
        id String,
        post_id String,
        author String,
        body String,
        created_at DateTime
    ) ENGINE = MergeTree
    ORDER BY (post_id, created_at, id)",
    "CREATE TABLE IF NOT EXISTS images (
        id String,
        post_id String,
        content_type String,
        data String
    ) ENGINE = MergeTree
    ORDER BY id",
];

/// Create all tables that do not exist yet.
pub async fn ensure_schema(client: &Client) -> Result<(), clickhouse::error::Error> {
    for ddl in DDL {
        client.query(ddl).execute().await?;
    }
    tracing::info!(tables = DDL.len(), "schema ensured");
    Ok(())
}
