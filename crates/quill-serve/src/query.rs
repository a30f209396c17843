//! ClickHouse query layer for all entity reads and writes.
//!
//! Every write is a single best-effort insert; there are no transactions
//! spanning entities and nothing is ever deleted. Post updates insert a new
//! row version (see [`crate::schema`]) so reads use `FINAL`.

use clickhouse::{Client, Row};
use serde::{Deserialize, Serialize};

use quill_core::{Cursor, PAGE_SIZE};

use crate::error::SiteError;

/// Generate a fresh row id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Current time in unix seconds, as stored in DateTime columns.
pub fn now() -> u32 {
    chrono::Utc::now().timestamp() as u32
}

// ═══════════════════════════════════════════════════════════════════════════
// Rows
// ═══════════════════════════════════════════════════════════════════════════

/// A row from the `blogs` table.
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct BlogRow {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Identity-provider user id of the owner.
    pub owner_id: String,
    pub owner_name: String,
    /// Unix timestamp (DateTime column).
    pub created_at: u32,
}

/// A row from the `posts` table (latest version after `FINAL`).
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct PostRow {
    pub id: String,
    /// Owning blog (explicit foreign key).
    pub blog_id: String,
    pub title: String,
    /// Raw text; run through the content filter at render time.
    pub content: String,
    /// Ordered tag references.
    pub tag_ids: Vec<String>,
    pub created_at: u32,
    /// Bumped on every write; the ReplacingMergeTree version column.
    pub updated_at: u32,
}

/// A row from the `tags` table.
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct TagRow {
    pub id: String,
    pub label: String,
    pub created_at: u32,
}

/// A row from the `comments` table.
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct CommentRow {
    pub id: String,
    pub post_id: String,
    pub author: String,
    pub body: String,
    pub created_at: u32,
}

/// A row from the `images` table.
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct ImageRow {
    pub id: String,
    pub post_id: String,
    pub content_type: String,
    #[serde(with = "serde_bytes")]
    pub data: Vec<u8>,
}

/// Helper row for single-column id projections.
#[derive(Debug, Row, Deserialize)]
struct IdRow {
    id: String,
}

// ═══════════════════════════════════════════════════════════════════════════
// Blogs
// ═══════════════════════════════════════════════════════════════════════════

/// All blogs, newest first.
pub async fn list_blogs(client: &Client) -> Result<Vec<BlogRow>, SiteError> {
    let rows = client
        .query(
            "SELECT id, name, description, owner_id, owner_name, created_at \
             FROM blogs ORDER BY created_at DESC, id DESC",
        )
        .fetch_all::<BlogRow>()
        .await?;
    Ok(rows)
}

/// Fetch a single blog by id.
pub async fn fetch_blog(client: &Client, blog_id: &str) -> Result<Option<BlogRow>, SiteError> {
    let row = client
        .query(
            "SELECT id, name, description, owner_id, owner_name, created_at \
             FROM blogs WHERE id = ? LIMIT 1",
        )
        .bind(blog_id)
        .fetch_optional::<BlogRow>()
        .await?;
    Ok(row)
}

/// Insert a new blog.
pub async fn insert_blog(client: &Client, row: &BlogRow) -> Result<(), SiteError> {
    let mut insert = client.insert("blogs")?;
    insert.write(row).await?;
    insert.end().await?;
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
// Posts
// ═══════════════════════════════════════════════════════════════════════════

const POST_COLUMNS: &str = "id, blog_id, title, content, tag_ids, created_at, updated_at";

/// One page of a blog's posts, newest first, resuming below `cursor`.
pub async fn list_blog_posts(
    client: &Client,
    blog_id: &str,
    cursor: Option<&Cursor>,
) -> Result<Vec<PostRow>, SiteError> {
    let rows = match cursor {
        Some(cursor) => {
            client
                .query(&format!(
                    "SELECT {POST_COLUMNS} FROM posts FINAL \
                     WHERE blog_id = ? AND (toUInt32(created_at), id) < (?, ?) \
                     ORDER BY created_at DESC, id DESC LIMIT ?"
                ))
                .bind(blog_id)
                .bind(cursor.created_at)
                .bind(&cursor.id)
                .bind(PAGE_SIZE as u64)
                .fetch_all::<PostRow>()
                .await?
        }
        None => {
            client
                .query(&format!(
                    "SELECT {POST_COLUMNS} FROM posts FINAL \
                     WHERE blog_id = ? \
                     ORDER BY created_at DESC, id DESC LIMIT ?"
                ))
                .bind(blog_id)
                .bind(PAGE_SIZE as u64)
                .fetch_all::<PostRow>()
                .await?
        }
    };
    Ok(rows)
}

/// One page of a blog's posts carrying the given tag, newest first.
pub async fn list_blog_posts_by_tag(
    client: &Client,
    blog_id: &str,
    tag_id: &str,
    cursor: Option<&Cursor>,
) -> Result<Vec<PostRow>, SiteError> {
    let rows = match cursor {
        Some(cursor) => {
            client
                .query(&format!(
                    "SELECT {POST_COLUMNS} FROM posts FINAL \
                     WHERE blog_id = ? AND has(tag_ids, ?) \
                       AND (toUInt32(created_at), id) < (?, ?) \
                     ORDER BY created_at DESC, id DESC LIMIT ?"
                ))
                .bind(blog_id)
                .bind(tag_id)
                .bind(cursor.created_at)
                .bind(&cursor.id)
                .bind(PAGE_SIZE as u64)
                .fetch_all::<PostRow>()
                .await?
        }
        None => {
            client
                .query(&format!(
                    "SELECT {POST_COLUMNS} FROM posts FINAL \
                     WHERE blog_id = ? AND has(tag_ids, ?) \
                     ORDER BY created_at DESC, id DESC LIMIT ?"
                ))
                .bind(blog_id)
                .bind(tag_id)
                .bind(PAGE_SIZE as u64)
                .fetch_all::<PostRow>()
                .await?
        }
    };
    Ok(rows)
}

/// All of a blog's posts, newest first (RSS feed).
pub async fn list_all_blog_posts(
    client: &Client,
    blog_id: &str,
) -> Result<Vec<PostRow>, SiteError> {
    let rows = client
        .query(&format!(
            "SELECT {POST_COLUMNS} FROM posts FINAL \
             WHERE blog_id = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(blog_id)
        .fetch_all::<PostRow>()
        .await?;
    Ok(rows)
}

/// Fetch a single post by id (latest version).
pub async fn fetch_post(client: &Client, post_id: &str) -> Result<Option<PostRow>, SiteError> {
    let row = client
        .query(&format!(
            "SELECT {POST_COLUMNS} FROM posts FINAL WHERE id = ? LIMIT 1"
        ))
        .bind(post_id)
        .fetch_optional::<PostRow>()
        .await?;
    Ok(row)
}

/// Insert a post row. Used both for creation and for writing a new version
/// of an existing post; the caller sets `updated_at`.
pub async fn insert_post(client: &Client, row: &PostRow) -> Result<(), SiteError> {
    let mut insert = client.insert("posts")?;
    insert.write(row).await?;
    insert.end().await?;
    Ok(())
}

/// Tag ids appearing on any of the blog's posts, in newest-post-first
/// scan order with duplicates retained (callers dedupe by label).
pub async fn blog_tag_ids(client: &Client, blog_id: &str) -> Result<Vec<String>, SiteError> {
    let rows = client
        .query(
            "SELECT arrayJoin(tag_ids) AS tag_id FROM posts FINAL \
             WHERE blog_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(blog_id)
        .fetch_all::<IdRow>()
        .await?;
    Ok(rows.into_iter().map(|r| r.id).collect())
}

// ═══════════════════════════════════════════════════════════════════════════
// Tags
// ═══════════════════════════════════════════════════════════════════════════

/// Fetch a single tag by id.
pub async fn fetch_tag(client: &Client, tag_id: &str) -> Result<Option<TagRow>, SiteError> {
    let row = client
        .query("SELECT id, label, created_at FROM tags WHERE id = ? LIMIT 1")
        .bind(tag_id)
        .fetch_optional::<TagRow>()
        .await?;
    Ok(row)
}

/// Look up a tag by exact label. When the creation race has produced
/// duplicates, the oldest row wins.
pub async fn find_tag_by_label(
    client: &Client,
    label: &str,
) -> Result<Option<TagRow>, SiteError> {
    let row = client
        .query("SELECT id, label, created_at FROM tags WHERE label = ? ORDER BY created_at ASC LIMIT 1")
        .bind(label)
        .fetch_optional::<TagRow>()
        .await?;
    Ok(row)
}

/// Fetch tags by id, in no particular order (see [`order_tags`]).
pub async fn fetch_tags_by_ids(
    client: &Client,
    tag_ids: &[String],
) -> Result<Vec<TagRow>, SiteError> {
    if tag_ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = client
        .query("SELECT id, label, created_at FROM tags WHERE id IN ?")
        .bind(tag_ids)
        .fetch_all::<TagRow>()
        .await?;
    Ok(rows)
}

/// Insert a new tag.
pub async fn insert_tag(client: &Client, row: &TagRow) -> Result<(), SiteError> {
    let mut insert = client.insert("tags")?;
    insert.write(row).await?;
    insert.end().await?;
    Ok(())
}

/// Resolve submitted labels to tag ids, reusing existing tags and lazily
/// creating the rest.
///
/// Lookup-then-insert with no uniqueness constraint: two concurrent
/// submissions of a new label can both insert, leaving duplicate rows with
/// the same label. [`find_tag_by_label`] keeps duplicates invisible
/// afterwards.
pub async fn resolve_tag_ids(
    client: &Client,
    labels: &[String],
) -> Result<Vec<String>, SiteError> {
    let mut ids = Vec::with_capacity(labels.len());
    for label in labels {
        let id = match find_tag_by_label(client, label).await? {
            Some(tag) => tag.id,
            None => {
                let row = TagRow {
                    id: new_id(),
                    label: label.clone(),
                    created_at: now(),
                };
                insert_tag(client, &row).await?;
                tracing::debug!(label = %label, id = %row.id, "created tag");
                row.id
            }
        };
        ids.push(id);
    }
    Ok(ids)
}

/// Reorder fetched tag rows to match an id list, dropping unknown ids.
pub fn order_tags(tag_ids: &[String], rows: Vec<TagRow>) -> Vec<TagRow> {
    tag_ids
        .iter()
        .filter_map(|id| rows.iter().find(|row| &row.id == id).cloned())
        .collect()
}

/// Deduplicate tags by label, first occurrence wins. Used for the blog
/// page's facet list, where racy duplicate tag rows must collapse.
pub fn dedupe_tags_by_label(rows: Vec<TagRow>) -> Vec<TagRow> {
    let mut seen: Vec<TagRow> = Vec::new();
    for row in rows {
        if !seen.iter().any(|kept| kept.label == row.label) {
            seen.push(row);
        }
    }
    seen
}

// ═══════════════════════════════════════════════════════════════════════════
// Comments
// ═══════════════════════════════════════════════════════════════════════════

/// All comments on a post, oldest first.
pub async fn list_comments(client: &Client, post_id: &str) -> Result<Vec<CommentRow>, SiteError> {
    let rows = client
        .query(
            "SELECT id, post_id, author, body, created_at FROM comments \
             WHERE post_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(post_id)
        .fetch_all::<CommentRow>()
        .await?;
    Ok(rows)
}

/// Insert a new comment.
pub async fn insert_comment(client: &Client, row: &CommentRow) -> Result<(), SiteError> {
    let mut insert = client.insert("comments")?;
    insert.write(row).await?;
    insert.end().await?;
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
// Images
// ═══════════════════════════════════════════════════════════════════════════

/// Fetch a stored image blob by id.
pub async fn fetch_image(client: &Client, image_id: &str) -> Result<Option<ImageRow>, SiteError> {
    let row = client
        .query("SELECT id, post_id, content_type, data FROM images WHERE id = ? LIMIT 1")
        .bind(image_id)
        .fetch_optional::<ImageRow>()
        .await?;
    Ok(row)
}

/// Image ids attached to a post, oldest first (edit-form gallery).
pub async fn list_post_image_ids(
    client: &Client,
    post_id: &str,
) -> Result<Vec<String>, SiteError> {
    let rows = client
        .query("SELECT id FROM images WHERE post_id = ? ORDER BY id ASC")
        .bind(post_id)
        .fetch_all::<IdRow>()
        .await?;
    Ok(rows.into_iter().map(|r| r.id).collect())
}

/// Insert a new image blob.
pub async fn insert_image(client: &Client, row: &ImageRow) -> Result<(), SiteError> {
    let mut insert = client.insert("images")?;
    insert.write(row).await?;
    insert.end().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(id: &str, label: &str, created_at: u32) -> TagRow {
        TagRow {
            id: id.to_string(),
            label: label.to_string(),
            created_at,
        }
    }

    #[test]
    fn order_tags_preserves_reference_order() {
        let ids = vec!["b".to_string(), "a".to_string()];
        let rows = vec![tag("a", "alpha", 1), tag("b", "beta", 2)];
        let ordered = order_tags(&ids, rows);
        assert_eq!(ordered[0].id, "b");
        assert_eq!(ordered[1].id, "a");
    }

    #[test]
    fn order_tags_drops_unknown_ids() {
        let ids = vec!["a".to_string(), "missing".to_string()];
        let ordered = order_tags(&ids, vec![tag("a", "alpha", 1)]);
        assert_eq!(ordered.len(), 1);
    }

    #[test]
    fn dedupe_keeps_first_occurrence_per_label() {
        let rows = vec![tag("1", "go", 5), tag("2", "rust", 6), tag("3", "go", 7)];
        let deduped = dedupe_tags_by_label(rows);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].id, "1");
        assert_eq!(deduped[1].label, "rust");
    }

    #[test]
    fn new_ids_are_distinct_hex() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
