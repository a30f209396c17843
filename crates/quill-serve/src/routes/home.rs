//! Front page — every blog on the platform, newest first.

use axum::extract::State;
use maud::{Markup, html};

use crate::auth::Identity;
use crate::error::SiteError;
use crate::query;
use crate::render::components;
use crate::state::AppState;

/// `GET /`
pub async fn blog_list(
    State(state): State<AppState>,
    Identity(user): Identity,
) -> Result<Markup, SiteError> {
    let blogs = query::list_blogs(&state.clickhouse).await?;

    let body = html! {
        h1 { "Blogs" }
        p class="meta" {
            a href="/createblog" { "Create a blog" }
        }
        @if blogs.is_empty() {
            p { "No blogs yet." }
        }
        @for blog in &blogs {
            article class="card" {
                h2 { a href={ "/singleblog/" (blog.id) } { (blog.name) } }
                div class="meta" {
                    "by " (blog.owner_name)
                    " · created " (components::format_time(blog.created_at))
                }
                p { (blog.description) }
            }
        }
    };

    Ok(components::page(
        &state.config,
        user.as_ref(),
        "Blogs",
        "/",
        body,
    ))
}
