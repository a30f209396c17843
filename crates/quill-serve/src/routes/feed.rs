//! RSS 2.0 feed for a blog.

use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use maud::html;

use crate::error::SiteError;
use crate::query;
use crate::state::AppState;

/// `GET /rss/{blog_id}`
///
/// All of the blog's posts, newest first. Item descriptions carry the
/// filtered post HTML, escaped into the XML as RSS requires.
pub async fn rss_feed(
    State(state): State<AppState>,
    Path(blog_id): Path<String>,
) -> Result<Response, SiteError> {
    let blog = query::fetch_blog(&state.clickhouse, &blog_id)
        .await?
        .ok_or_else(|| SiteError::NotFound(format!("blog {blog_id}")))?;
    let posts = query::list_all_blog_posts(&state.clickhouse, &blog_id).await?;

    let base = &state.config.base_url;
    let markup = html! {
        rss version="2.0" {
            channel {
                title { (blog.name) }
                link { (base) "/singleblog/" (blog.id) }
                description { (blog.description) }
                @for post in &posts {
                    item {
                        title { (post.title) }
                        link { (base) "/singlepost/" (post.id) }
                        guid isPermaLink="false" { (post.id) }
                        pubDate { (rfc2822(post.created_at)) }
                        description { (quill_core::filter_content(&post.content)) }
                    }
                }
            }
        }
    };

    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}",
        markup.into_string()
    );

    let headers = [(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/rss+xml; charset=utf-8"),
    )];
    Ok((StatusCode::OK, headers, xml).into_response())
}

/// Format a unix timestamp per RFC 2822, as RSS `pubDate` requires.
fn rfc2822(unix_seconds: u32) -> String {
    chrono::DateTime::from_timestamp(i64::from(unix_seconds), 0)
        .map(|dt| dt.to_rfc2822())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc2822_formats_epoch() {
        assert_eq!(rfc2822(0), "Thu, 1 Jan 1970 00:00:00 +0000");
    }
}
