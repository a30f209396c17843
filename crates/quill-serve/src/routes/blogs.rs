//! Blog creation.

use axum::Form;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use maud::html;
use serde::Deserialize;

use crate::auth::{self, Identity};
use crate::error::SiteError;
use crate::query::{self, BlogRow};
use crate::render::components;
use crate::state::AppState;

/// Blog creation form fields.
#[derive(Debug, Deserialize)]
pub struct BlogForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// `GET /createblog`
///
/// Renders the creation form; anonymous visitors are sent to the login flow
/// and returned here afterwards.
pub async fn create_blog_form(
    State(state): State<AppState>,
    Identity(user): Identity,
) -> Result<Response, SiteError> {
    let Some(user) = user else {
        return Ok(Redirect::to(&auth::login_url(&state.config, "/createblog")).into_response());
    };

    let body = html! {
        h1 { "Create a blog" }
        form class="form-grid" method="post" action="/createblog" {
            label for="name" { "Name" }
            input type="text" id="name" name="name";
            label for="description" { "Description" }
            textarea id="description" name="description" {}
            button type="submit" { "Create" }
        }
    };

    Ok(components::page(
        &state.config,
        Some(&user),
        "Create a blog",
        "/createblog",
        body,
    )
    .into_response())
}

/// `POST /createblog`
///
/// Creates the blog when both fields are present; otherwise the write is
/// silently skipped. Either way the response redirects to the front page.
pub async fn create_blog(
    State(state): State<AppState>,
    Identity(user): Identity,
    Form(form): Form<BlogForm>,
) -> Result<Response, SiteError> {
    let Some(user) = user else {
        return Ok(Redirect::to(&auth::login_url(&state.config, "/createblog")).into_response());
    };

    if !form.name.is_empty() && !form.description.is_empty() {
        let blog = BlogRow {
            id: query::new_id(),
            name: form.name,
            description: form.description,
            owner_id: user.id,
            owner_name: user.name,
            created_at: query::now(),
        };
        query::insert_blog(&state.clickhouse, &blog).await?;
        tracing::info!(blog_id = %blog.id, name = %blog.name, "blog created");
    }

    Ok(Redirect::to("/").into_response())
}
