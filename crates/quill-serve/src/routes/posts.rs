//! Post listings and the single-post page.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use maud::{Markup, PreEscaped, html};
use serde::Deserialize;

use quill_core::{Cursor, PAGE_SIZE, filter_content};

use crate::auth::Identity;
use crate::error::SiteError;
use crate::query::{self, PostRow, TagRow};
use crate::render::components::{self, page, pager, post_card, tag_chips};
use crate::state::AppState;

/// Query string accepted by paginated listings.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// Continuation cursor from the previous page, if any.
    pub cursor: Option<String>,
}

/// Parse the optional cursor parameter; malformed values are a 400.
fn parse_cursor(raw: Option<&str>) -> Result<Option<Cursor>, SiteError> {
    match raw {
        Some(s) if !s.is_empty() => Ok(Some(s.parse()?)),
        _ => Ok(None),
    }
}

/// Continuation cursor for the page after `posts`.
///
/// A full page means the scan may continue below the last row; a short page
/// is the last page and yields no cursor.
fn next_cursor(posts: &[PostRow]) -> Option<Cursor> {
    if posts.len() < PAGE_SIZE {
        return None;
    }
    posts
        .last()
        .map(|last| Cursor::after(last.created_at, last.id.clone()))
}

/// Fetch the tag rows for a page of posts, keyed by tag id.
async fn tags_for_posts(
    state: &AppState,
    posts: &[PostRow],
) -> Result<HashMap<String, TagRow>, SiteError> {
    let mut ids: Vec<String> = Vec::new();
    for post in posts {
        for id in &post.tag_ids {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
    }
    let rows = query::fetch_tags_by_ids(&state.clickhouse, &ids).await?;
    Ok(rows.into_iter().map(|row| (row.id.clone(), row)).collect())
}

/// Tags of one post in its stored order.
fn post_tags(post: &PostRow, by_id: &HashMap<String, TagRow>) -> Vec<TagRow> {
    post.tag_ids
        .iter()
        .filter_map(|id| by_id.get(id).cloned())
        .collect()
}

/// `GET /singleblog/{blog_id}`
///
/// One page of the blog's posts plus the facet list: every tag used
/// anywhere on the blog, deduplicated by label, newest post first.
pub async fn blog_page(
    State(state): State<AppState>,
    Identity(user): Identity,
    Path(blog_id): Path<String>,
    Query(query_params): Query<PageQuery>,
) -> Result<Markup, SiteError> {
    let blog = query::fetch_blog(&state.clickhouse, &blog_id)
        .await?
        .ok_or_else(|| SiteError::NotFound(format!("blog {blog_id}")))?;

    let cursor = parse_cursor(query_params.cursor.as_deref())?;
    let posts = query::list_blog_posts(&state.clickhouse, &blog_id, cursor.as_ref()).await?;
    let next = next_cursor(&posts);
    let tags_by_id = tags_for_posts(&state, &posts).await?;

    // Facet list: tags across all the blog's posts, first occurrence wins.
    let facet_ids = query::blog_tag_ids(&state.clickhouse, &blog_id).await?;
    let facet_rows = query::fetch_tags_by_ids(&state.clickhouse, &facet_ids).await?;
    let facets = query::dedupe_tags_by_label(query::order_tags(&facet_ids, facet_rows));

    let is_owner = user.as_ref().is_some_and(|u| u.id == blog.owner_id);
    let path = format!("/singleblog/{}", blog.id);

    let body = html! {
        h1 { (blog.name) }
        div class="meta" {
            (blog.description) " · by " (blog.owner_name)
            " · " a href={ "/rss/" (blog.id) } { "RSS" }
            @if is_owner {
                " · " a href={ "/post/" (blog.id) } { "New post" }
            }
        }
        @if !facets.is_empty() {
            div class="facet" { "Tags: " (tag_chips(&facets, &blog.id)) }
        }
        @if posts.is_empty() {
            p { "No posts yet." }
        }
        @for post in &posts {
            (post_card(post, &post_tags(post, &tags_by_id)))
        }
        (pager(&path, next.as_ref()))
    };

    Ok(page(&state.config, user.as_ref(), &blog.name, &path, body))
}

/// `GET /tag/{tag_id}/{blog_id}`
///
/// Same listing as the blog page, restricted to posts carrying the tag; no
/// facet list.
pub async fn tag_page(
    State(state): State<AppState>,
    Identity(user): Identity,
    Path((tag_id, blog_id)): Path<(String, String)>,
    Query(query_params): Query<PageQuery>,
) -> Result<Markup, SiteError> {
    let tag = query::fetch_tag(&state.clickhouse, &tag_id)
        .await?
        .ok_or_else(|| SiteError::NotFound(format!("tag {tag_id}")))?;
    let blog = query::fetch_blog(&state.clickhouse, &blog_id)
        .await?
        .ok_or_else(|| SiteError::NotFound(format!("blog {blog_id}")))?;

    let cursor = parse_cursor(query_params.cursor.as_deref())?;
    let posts =
        query::list_blog_posts_by_tag(&state.clickhouse, &blog_id, &tag_id, cursor.as_ref())
            .await?;
    let next = next_cursor(&posts);
    let tags_by_id = tags_for_posts(&state, &posts).await?;

    let path = format!("/tag/{}/{}", tag.id, blog.id);
    let title = format!("{} · {}", tag.label, blog.name);

    let body = html! {
        h1 { (blog.name) }
        div class="meta" {
            "Posts tagged " span class="tag-chip" { (tag.label) }
            " · " a href={ "/singleblog/" (blog.id) } { "All posts" }
        }
        @if posts.is_empty() {
            p { "No posts with this tag." }
        }
        @for post in &posts {
            (post_card(post, &post_tags(post, &tags_by_id)))
        }
        (pager(&path, next.as_ref()))
    };

    Ok(page(&state.config, user.as_ref(), &title, &path, body))
}

/// `GET /singlepost/{post_id}`
///
/// One post with filtered content, its comments oldest first, and the
/// comment form.
pub async fn single_post(
    State(state): State<AppState>,
    Identity(user): Identity,
    Path(post_id): Path<String>,
) -> Result<Markup, SiteError> {
    let post = query::fetch_post(&state.clickhouse, &post_id)
        .await?
        .ok_or_else(|| SiteError::NotFound(format!("post {post_id}")))?;
    let blog = query::fetch_blog(&state.clickhouse, &post.blog_id)
        .await?
        .ok_or_else(|| SiteError::NotFound(format!("blog {}", post.blog_id)))?;

    let tag_rows = query::fetch_tags_by_ids(&state.clickhouse, &post.tag_ids).await?;
    let tags = query::order_tags(&post.tag_ids, tag_rows);
    let comments = query::list_comments(&state.clickhouse, &post_id).await?;

    let is_owner = user.as_ref().is_some_and(|u| u.id == blog.owner_id);
    let path = format!("/singlepost/{}", post.id);

    let body = html! {
        div class="meta" {
            a href={ "/singleblog/" (blog.id) } { "← " (blog.name) }
        }
        article class="card" {
            h1 { (post.title) }
            div class="meta" {
                "posted " (components::format_time(post.created_at))
                @if post.updated_at > post.created_at {
                    " · edited " (components::format_time(post.updated_at))
                }
                @if is_owner {
                    " · " a href={ "/editpost/" (post.id) } { "Edit" }
                }
            }
            div class="content" { (PreEscaped(filter_content(&post.content))) }
            @if !tags.is_empty() {
                div class="tag-row" { (tag_chips(&tags, &blog.id)) }
            }
        }
        h2 { "Comments" }
        @if comments.is_empty() {
            p class="meta" { "No comments yet." }
        }
        @for comment in &comments {
            div class="comment" {
                div class="meta" {
                    @if comment.author.is_empty() { "anonymous" } @else { (comment.author) }
                    " · " (components::format_time(comment.created_at))
                }
                p { (comment.body) }
            }
        }
        form class="form-grid" method="post" action={ "/comment/" (post.id) } {
            label for="author" { "Name (optional)" }
            input type="text" id="author" name="author";
            label for="comment" { "Comment" }
            textarea id="comment" name="comment" {}
            button type="submit" { "Add comment" }
        }
    };

    Ok(page(&state.config, user.as_ref(), &post.title, &path, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str, created_at: u32) -> PostRow {
        PostRow {
            id: id.to_string(),
            blog_id: "b1".to_string(),
            title: "t".to_string(),
            content: String::new(),
            tag_ids: vec![],
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn full_page_yields_continuation_cursor() {
        let posts: Vec<PostRow> = (0..PAGE_SIZE as u32)
            .map(|i| post(&format!("p{i}"), 1000 - i))
            .collect();
        let cursor = next_cursor(&posts).unwrap();
        assert_eq!(cursor.created_at, 1000 - (PAGE_SIZE as u32 - 1));
        assert_eq!(cursor.id, format!("p{}", PAGE_SIZE - 1));
    }

    #[test]
    fn short_page_yields_no_cursor() {
        let posts: Vec<PostRow> = (0..PAGE_SIZE as u32 - 1)
            .map(|i| post(&format!("p{i}"), 1000 - i))
            .collect();
        assert!(next_cursor(&posts).is_none());
    }

    #[test]
    fn empty_page_yields_no_cursor() {
        assert!(next_cursor(&[]).is_none());
    }

    #[test]
    fn missing_cursor_param_is_none() {
        assert_eq!(parse_cursor(None).unwrap(), None);
        assert_eq!(parse_cursor(Some("")).unwrap(), None);
    }

    #[test]
    fn malformed_cursor_param_is_bad_request() {
        assert!(matches!(
            parse_cursor(Some("garbage")),
            Err(SiteError::BadRequest(_))
        ));
    }

    #[test]
    fn valid_cursor_param_parses() {
        let cursor = parse_cursor(Some("123.abc")).unwrap().unwrap();
        assert_eq!(cursor.created_at, 123);
        assert_eq!(cursor.id, "abc");
    }

    #[test]
    fn post_tags_follow_stored_order() {
        let mut by_id = HashMap::new();
        for (id, label) in [("t1", "one"), ("t2", "two")] {
            by_id.insert(
                id.to_string(),
                TagRow {
                    id: id.to_string(),
                    label: label.to_string(),
                    created_at: 0,
                },
            );
        }
        let mut p = post("p1", 1);
        p.tag_ids = vec!["t2".to_string(), "t1".to_string(), "gone".to_string()];
        let tags = post_tags(&p, &by_id);
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].label, "two");
        assert_eq!(tags[1].label, "one");
    }
}
