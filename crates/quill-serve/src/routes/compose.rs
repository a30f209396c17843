//! Post creation and editing (owner-only).

use axum::Form;
use axum::extract::{Multipart, Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use maud::html;
use serde::Deserialize;

use quill_core::{image_placeholder, split_tag_labels};

use crate::auth::{self, CurrentUser, Identity};
use crate::error::SiteError;
use crate::query::{self, BlogRow, ImageRow, PostRow};
use crate::render::components::page;
use crate::state::AppState;

/// Post creation form fields.
#[derive(Debug, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: String,
}

/// Owner gate for mutating handlers: anonymous callers are redirected to the
/// login flow (returning to `next`), non-owners get the error page linking
/// back to `back`.
fn require_owner(
    state: &AppState,
    user: Option<CurrentUser>,
    blog: &BlogRow,
    next: &str,
    back: &str,
) -> Result<CurrentUser, OwnerGate> {
    let Some(user) = user else {
        return Err(OwnerGate::Login(
            Redirect::to(&auth::login_url(&state.config, next)).into_response(),
        ));
    };
    if user.id != blog.owner_id {
        return Err(OwnerGate::Forbidden(SiteError::NotOwner {
            back: back.to_string(),
        }));
    }
    Ok(user)
}

enum OwnerGate {
    Login(Response),
    Forbidden(SiteError),
}

impl OwnerGate {
    fn into_result(self) -> Result<Response, SiteError> {
        match self {
            Self::Login(redirect) => Ok(redirect),
            Self::Forbidden(err) => Err(err),
        }
    }
}

/// `GET /post/{blog_id}`
///
/// The new-post form, owner-only.
pub async fn new_post_form(
    State(state): State<AppState>,
    Identity(user): Identity,
    Path(blog_id): Path<String>,
) -> Result<Response, SiteError> {
    let blog = query::fetch_blog(&state.clickhouse, &blog_id)
        .await?
        .ok_or_else(|| SiteError::NotFound(format!("blog {blog_id}")))?;

    let next = format!("/post/{blog_id}");
    let back = format!("/singleblog/{blog_id}");
    let user = match require_owner(&state, user, &blog, &next, &back) {
        Ok(user) => user,
        Err(gate) => return gate.into_result(),
    };

    let body = html! {
        h1 { "New post on " (blog.name) }
        form class="form-grid" method="post" action={ "/post/" (blog.id) } {
            label for="title" { "Title" }
            input type="text" id="title" name="title";
            label for="content" { "Content" }
            textarea id="content" name="content" {}
            label for="tags" { "Tags (separated by comma, semicolon, or space)" }
            input type="text" id="tags" name="tags";
            button type="submit" { "Publish" }
        }
    };

    Ok(page(&state.config, Some(&user), "New post", &next, body).into_response())
}

/// `POST /post/{blog_id}`
///
/// Creates the post when title and content are present; otherwise the write
/// is silently skipped. Always redirects to the blog page.
pub async fn create_post(
    State(state): State<AppState>,
    Identity(user): Identity,
    Path(blog_id): Path<String>,
    Form(form): Form<PostForm>,
) -> Result<Response, SiteError> {
    let blog = query::fetch_blog(&state.clickhouse, &blog_id)
        .await?
        .ok_or_else(|| SiteError::NotFound(format!("blog {blog_id}")))?;

    let next = format!("/post/{blog_id}");
    let back = format!("/singleblog/{blog_id}");
    if let Err(gate) = require_owner(&state, user, &blog, &next, &back) {
        return gate.into_result();
    }

    if !form.title.is_empty() && !form.content.is_empty() {
        let labels = split_tag_labels(&form.tags);
        let tag_ids = query::resolve_tag_ids(&state.clickhouse, &labels).await?;
        let now = query::now();
        let post = PostRow {
            id: query::new_id(),
            blog_id: blog.id.clone(),
            title: form.title,
            content: form.content,
            tag_ids,
            created_at: now,
            updated_at: now,
        };
        query::insert_post(&state.clickhouse, &post).await?;
        tracing::info!(post_id = %post.id, blog_id = %blog.id, "post created");
    }

    Ok(Redirect::to(&format!("/singleblog/{blog_id}")).into_response())
}

/// `GET /editpost/{post_id}`
///
/// The edit form, prefilled with the post's current title, content, and
/// space-joined tag labels, plus a gallery of already-attached images.
/// Owner-only; this is also the only place images can be attached.
pub async fn edit_post_form(
    State(state): State<AppState>,
    Identity(user): Identity,
    Path(post_id): Path<String>,
) -> Result<Response, SiteError> {
    let post = query::fetch_post(&state.clickhouse, &post_id)
        .await?
        .ok_or_else(|| SiteError::NotFound(format!("post {post_id}")))?;
    let blog = query::fetch_blog(&state.clickhouse, &post.blog_id)
        .await?
        .ok_or_else(|| SiteError::NotFound(format!("blog {}", post.blog_id)))?;

    let next = format!("/editpost/{post_id}");
    let back = format!("/singlepost/{post_id}");
    let user = match require_owner(&state, user, &blog, &next, &back) {
        Ok(user) => user,
        Err(gate) => return gate.into_result(),
    };

    let tag_rows = query::fetch_tags_by_ids(&state.clickhouse, &post.tag_ids).await?;
    let labels: Vec<String> = query::order_tags(&post.tag_ids, tag_rows)
        .into_iter()
        .map(|tag| tag.label)
        .collect();
    let prefilled_tags = labels.join(" ");

    let image_ids = query::list_post_image_ids(&state.clickhouse, &post_id).await?;

    let body = html! {
        h1 { "Edit post" }
        form class="form-grid" method="post" action={ "/editpost/" (post.id) }
             enctype="multipart/form-data" {
            label for="title" { "Title" }
            input type="text" id="title" name="title" value=(post.title);
            label for="content" { "Content" }
            textarea id="content" name="content" { (post.content) }
            label for="tags" { "Tags (separated by comma, semicolon, or space)" }
            input type="text" id="tags" name="tags" value=(prefilled_tags);
            label for="file" { "Attach an image" }
            input type="file" id="file" name="file";
            button type="submit" { "Save" }
        }
        @if !image_ids.is_empty() {
            h2 { "Attached images" }
            div class="edit-images" {
                @for image_id in &image_ids {
                    img src={ "/image/" (image_id) } alt="attached image";
                }
            }
        }
    };

    Ok(page(&state.config, Some(&user), "Edit post", &next, body).into_response())
}

/// `POST /editpost/{post_id}`
///
/// Multipart update: title, content, and tags are replaced wholesale. An
/// optional `file` part stores an Image and appends its `[img:<id>]`
/// placeholder to the content. Redirects to the post page.
pub async fn update_post(
    State(state): State<AppState>,
    Identity(user): Identity,
    Path(post_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Response, SiteError> {
    let post = query::fetch_post(&state.clickhouse, &post_id)
        .await?
        .ok_or_else(|| SiteError::NotFound(format!("post {post_id}")))?;
    let blog = query::fetch_blog(&state.clickhouse, &post.blog_id)
        .await?
        .ok_or_else(|| SiteError::NotFound(format!("blog {}", post.blog_id)))?;

    let next = format!("/editpost/{post_id}");
    let back = format!("/singlepost/{post_id}");
    if let Err(gate) = require_owner(&state, user, &blog, &next, &back) {
        return gate.into_result();
    }

    let mut title = String::new();
    let mut content = String::new();
    let mut tags = String::new();
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_upload)? {
        match field.name() {
            Some("title") => title = field.text().await.map_err(bad_upload)?,
            Some("content") => content = field.text().await.map_err(bad_upload)?,
            Some("tags") => tags = field.text().await.map_err(bad_upload)?,
            Some("file") => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(bad_upload)?;
                // An empty file input still submits a zero-length part
                if !data.is_empty() {
                    upload = Some((content_type, data.to_vec()));
                }
            }
            _ => {}
        }
    }

    let labels = split_tag_labels(&tags);
    let tag_ids = query::resolve_tag_ids(&state.clickhouse, &labels).await?;

    if let Some((content_type, data)) = upload {
        let image = ImageRow {
            id: query::new_id(),
            post_id: post.id.clone(),
            content_type,
            data,
        };
        query::insert_image(&state.clickhouse, &image).await?;
        content.push('\n');
        content.push_str(&image_placeholder(&image.id));
        content.push('\n');
        tracing::info!(image_id = %image.id, post_id = %post.id, "image attached");
    }

    let updated = PostRow {
        id: post.id.clone(),
        blog_id: post.blog_id.clone(),
        title,
        content,
        tag_ids,
        created_at: post.created_at,
        updated_at: query::now(),
    };
    query::insert_post(&state.clickhouse, &updated).await?;
    tracing::info!(post_id = %post.id, "post updated");

    Ok(Redirect::to(&format!("/singlepost/{post_id}")).into_response())
}

fn bad_upload(err: axum::extract::multipart::MultipartError) -> SiteError {
    SiteError::BadRequest(format!("invalid form upload: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> AppState {
        AppState::new(crate::config::Config {
            bind_addr: "0.0.0.0:8080".to_string(),
            clickhouse_url: "http://localhost:8123".to_string(),
            clickhouse_database: "quill".to_string(),
            base_url: "http://localhost:8080".to_string(),
            site_name: "Quill".to_string(),
            auth_url: "https://id.example.org".to_string(),
        })
    }

    fn blog(owner_id: &str) -> BlogRow {
        BlogRow {
            id: "b1".to_string(),
            name: "Tech".to_string(),
            description: "d".to_string(),
            owner_id: owner_id.to_string(),
            owner_name: "Ada".to_string(),
            created_at: 0,
        }
    }

    #[test]
    fn anonymous_caller_is_sent_to_login() {
        let state = test_state();
        let result = require_owner(&state, None, &blog("u-1"), "/post/b1", "/singleblog/b1");
        assert!(matches!(result, Err(OwnerGate::Login(_))));
    }

    #[test]
    fn non_owner_is_forbidden_with_back_link() {
        let state = test_state();
        let user = CurrentUser {
            id: "u-2".to_string(),
            name: "Eve".to_string(),
        };
        let result = require_owner(&state, Some(user), &blog("u-1"), "/post/b1", "/singleblog/b1");
        match result {
            Err(OwnerGate::Forbidden(SiteError::NotOwner { back })) => {
                assert_eq!(back, "/singleblog/b1");
            }
            _ => panic!("expected NotOwner"),
        }
    }

    #[test]
    fn owner_passes_the_gate() {
        let state = test_state();
        let user = CurrentUser {
            id: "u-1".to_string(),
            name: "Ada".to_string(),
        };
        let result = require_owner(&state, Some(user), &blog("u-1"), "/post/b1", "/singleblog/b1");
        assert!(result.is_ok());
    }
}
