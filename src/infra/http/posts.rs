//! Public HTTP surface: the post CRUD routes and their form flows.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{Form, Path, Query, State},
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use tower::{
    Layer,
    util::{MapRequest, MapRequestLayer},
};
use tracing::error;

use crate::{
    application::posts::{CreatePostCommand, PostError, PostService, UpdatePostCommand},
    domain::slug::derive_slug,
    infra::db::SqliteRepositories,
    presentation::views::{
        PostDeletePage, PostDeleteTemplate, PostDetailPage, PostDetailTemplate, PostFormPage,
        PostFormTemplate, PostListPage, PostListTemplate, PostSummaryView,
        render_not_found_response, render_template_response,
    },
};

use super::{
    db_health_response,
    middleware::{log_responses, method_override, set_request_context},
    post_error_to_http,
};

#[derive(Clone)]
pub struct HttpState {
    pub posts: Arc<PostService>,
    pub db: Arc<SqliteRepositories>,
}

/// The router wrapped in the method-override rewrite. The rewrite sits
/// outside the `Router` because it must change the verb before routing
/// dispatches on it; serve with `axum::ServiceExt::into_make_service`.
pub type AppRouter = MapRequest<Router, fn(Request<Body>) -> Request<Body>>;

pub fn build_router(state: HttpState) -> AppRouter {
    let router = Router::new()
        .route("/", get(root))
        .route("/posts/", get(post_list))
        .route("/posts/create", get(post_create_form).post(post_create))
        .route("/posts/details/{slug}", get(post_details))
        .route("/posts/edit/{slug}", get(post_edit_form).patch(post_edit))
        .route(
            "/posts/delete/{slug}",
            get(post_delete_confirm).delete(post_delete),
        )
        .route("/health/db", get(db_health))
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
        .with_state(state);

    MapRequestLayer::new(method_override as fn(Request<Body>) -> Request<Body>).layer(router)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FlashQuery {
    notice: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatePostForm {
    title: String,
    body: String,
}

#[derive(Debug, Deserialize)]
struct EditPostForm {
    id: i64,
    slug: String,
    title: String,
    body: String,
}

fn redirect_with_flash(path: &str, key: &str, message: &str) -> Redirect {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair(key, message)
        .finish();
    Redirect::to(&format!("{path}?{query}"))
}

fn post_error_message(err: &PostError) -> String {
    match err {
        PostError::NotFound => "Post not found".to_string(),
        PostError::SlugTaken { slug } => format!("A post with slug `{slug}` already exists"),
        PostError::Validation(message) => message.clone(),
        PostError::Render(_) => "The post body could not be rendered".to_string(),
        PostError::Repo(_) => "Storage is temporarily unavailable".to_string(),
    }
}

async fn root() -> Redirect {
    Redirect::to("/posts/")
}

async fn db_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.db.health_check().await)
}

/// A listing failure degrades to an empty list with a visible message rather
/// than an error page; the blog stays navigable while storage is down.
async fn post_list(State(state): State<HttpState>, Query(flash): Query<FlashQuery>) -> Response {
    let (posts, error) = match state.posts.list_posts().await {
        Ok(posts) => (posts, flash.error),
        Err(err) => {
            error!(target = "breve::http::posts", error = %err, "failed to list posts");
            (Vec::new(), Some(post_error_message(&err)))
        }
    };

    let view = PostListPage {
        posts: posts.iter().map(PostSummaryView::from).collect(),
        notice: flash.notice,
        error,
    };
    render_template_response(PostListTemplate { view }, StatusCode::OK)
}

async fn post_create_form() -> Response {
    let view = PostFormPage::create_blank();
    render_template_response(PostFormTemplate { view }, StatusCode::OK)
}

async fn post_create(
    State(state): State<HttpState>,
    Form(form): Form<CreatePostForm>,
) -> Response {
    let command = CreatePostCommand {
        title: form.title.clone(),
        body_markdown: form.body.clone(),
    };

    match state.posts.create_post(command).await {
        Ok(post) => Redirect::to(&format!("/posts/details/{}", post.slug)).into_response(),
        Err(err) => {
            let slug = derive_slug(&form.title).unwrap_or_default();
            let view =
                PostFormPage::create_retry(form.title, slug, form.body, post_error_message(&err));
            render_template_response(PostFormTemplate { view }, StatusCode::OK)
        }
    }
}

async fn post_details(State(state): State<HttpState>, Path(slug): Path<String>) -> Response {
    match state.posts.get_by_slug(&slug).await {
        Ok(post) => {
            let view = PostDetailPage::from(&post);
            render_template_response(PostDetailTemplate { view }, StatusCode::OK)
        }
        Err(PostError::NotFound) => {
            render_not_found_response(format!("post `{slug}` could not be found"))
        }
        Err(err) => post_error_to_http("infra::http::post_details", err).into_response(),
    }
}

async fn post_edit_form(State(state): State<HttpState>, Path(slug): Path<String>) -> Response {
    match state.posts.get_by_slug(&slug).await {
        Ok(post) => {
            let view = PostFormPage::edit_prefilled(&post);
            render_template_response(PostFormTemplate { view }, StatusCode::OK)
        }
        Err(PostError::NotFound) => {
            render_not_found_response(format!("post `{slug}` could not be found"))
        }
        Err(err) => post_error_to_http("infra::http::post_edit_form", err).into_response(),
    }
}

/// The submitted id and slug must both match the stored row; a mismatch
/// redisplays the form with the caller's input intact and nothing written.
async fn post_edit(
    State(state): State<HttpState>,
    Path(_path_id): Path<i64>,
    Form(form): Form<EditPostForm>,
) -> Response {
    let command = UpdatePostCommand {
        id: form.id,
        slug: form.slug.clone(),
        title: form.title.clone(),
        body_markdown: form.body.clone(),
    };

    match state.posts.edit_post(command).await {
        Ok(post) => Redirect::to(&format!("/posts/details/{}", post.slug)).into_response(),
        Err(err) => {
            let view = PostFormPage::edit_retry(
                form.id,
                form.title,
                form.slug,
                form.body,
                post_error_message(&err),
            );
            render_template_response(PostFormTemplate { view }, StatusCode::OK)
        }
    }
}

async fn post_delete_confirm(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    Query(flash): Query<FlashQuery>,
) -> Response {
    match state.posts.get_by_slug(&slug).await {
        Ok(post) => {
            let view = PostDeletePage::confirm(&post, flash.error);
            render_template_response(PostDeleteTemplate { view }, StatusCode::OK)
        }
        Err(PostError::NotFound) => {
            render_not_found_response(format!("post `{slug}` could not be found"))
        }
        Err(err) => post_error_to_http("infra::http::post_delete_confirm", err).into_response(),
    }
}

async fn post_delete(State(state): State<HttpState>, Path(id): Path<i64>) -> Response {
    match state.posts.delete_post(id).await {
        Ok(deleted_id) => {
            redirect_with_flash("/posts/", "notice", &format!("Deleted post {deleted_id}"))
                .into_response()
        }
        Err(PostError::NotFound) => {
            redirect_with_flash("/posts/", "error", "Post not found").into_response()
        }
        Err(err) => {
            // bounce back to the confirmation view when the post still exists
            let message = post_error_message(&err);
            match state.posts.get_by_id(id).await {
                Ok(post) => redirect_with_flash(
                    &format!("/posts/delete/{}", post.slug),
                    "error",
                    &message,
                )
                .into_response(),
                Err(_) => redirect_with_flash("/posts/", "error", &message).into_response(),
            }
        }
    }
}
