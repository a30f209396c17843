//! Anonymous comments.

use axum::Form;
use axum::extract::{Path, State};
use axum::response::Redirect;
use serde::Deserialize;

use crate::error::SiteError;
use crate::query::{self, CommentRow};
use crate::state::AppState;

/// Comment form fields.
#[derive(Debug, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub comment: String,
}

/// `POST /comment/{post_id}`
///
/// Appends a comment when the body is non-empty; an empty body skips the
/// write. No authentication, no moderation. Redirects back to the post.
pub async fn create_comment(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Form(form): Form<CommentForm>,
) -> Result<Redirect, SiteError> {
    let post = query::fetch_post(&state.clickhouse, &post_id)
        .await?
        .ok_or_else(|| SiteError::NotFound(format!("post {post_id}")))?;

    if !form.comment.is_empty() {
        let comment = CommentRow {
            id: query::new_id(),
            post_id: post.id.clone(),
            author: form.author,
            body: form.comment,
            created_at: query::now(),
        };
        query::insert_comment(&state.clickhouse, &comment).await?;
        tracing::info!(comment_id = %comment.id, post_id = %post.id, "comment added");
    }

    Ok(Redirect::to(&format!("/singlepost/{post_id}")))
}
