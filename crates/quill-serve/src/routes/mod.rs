//! Route definitions.
//!
//! ## Routes
//!
//! - `GET /` - All blogs, newest first
//! - `GET|POST /createblog` - Blog creation form / create a blog
//! - `GET /singleblog/{blog_id}` - Paginated posts for a blog, with tag facets
//! - `GET|POST /post/{blog_id}` - Post form / create a post (owner-only)
//! - `GET /singlepost/{post_id}` - One post with comments
//! - `GET|POST /editpost/{post_id}` - Edit form / update a post, optionally
//!   attaching an image (owner-only)
//! - `GET /tag/{tag_id}/{blog_id}` - Paginated posts filtered by tag
//! - `GET /rss/{blog_id}` - RSS feed of a blog's posts
//! - `GET /image/{image_id}` - Raw image bytes with stored content type
//! - `POST /comment/{post_id}` - Append a comment to a post
//! - `GET /health` - Health check (JSON)

mod blogs;
mod comments;
mod compose;
mod feed;
mod health;
mod home;
mod images;
mod posts;

use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

/// Build the complete site router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::blog_list))
        .route(
            "/createblog",
            get(blogs::create_blog_form).post(blogs::create_blog),
        )
        .route("/singleblog/{blog_id}", get(posts::blog_page))
        .route(
            "/post/{blog_id}",
            get(compose::new_post_form).post(compose::create_post),
        )
        .route("/singlepost/{post_id}", get(posts::single_post))
        .route(
            "/editpost/{post_id}",
            get(compose::edit_post_form).post(compose::update_post),
        )
        .route("/tag/{tag_id}/{blog_id}", get(posts::tag_page))
        .route("/rss/{blog_id}", get(feed::rss_feed))
        .route("/image/{image_id}", get(images::serve_image))
        .route("/comment/{post_id}", post(comments::create_comment))
        .route("/health", get(health::health_check))
        .with_state(state)
}
