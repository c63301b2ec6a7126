use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::application::error::{ErrorReport, HttpError};
use crate::domain::entities::PostRecord;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(message: impl Into<String>) -> Response {
    let view = ErrorPageView::not_found();
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        message,
    )
    .attach(&mut response);
    response
}

#[derive(Clone)]
pub struct PostSummaryView {
    pub slug: String,
    pub title: String,
    pub created_human: String,
    pub created_iso: String,
}

impl From<&PostRecord> for PostSummaryView {
    fn from(post: &PostRecord) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.title.clone(),
            created_human: post.created_human(),
            created_iso: post.created_iso(),
        }
    }
}

pub struct PostListPage {
    pub posts: Vec<PostSummaryView>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "posts/list.html")]
pub struct PostListTemplate {
    pub view: PostListPage,
}

/// Shared create/edit form. `id` is present only when editing; the slug is
/// shown read-only because it is frozen at creation.
pub struct PostFormPage {
    pub heading: &'static str,
    pub submit_label: &'static str,
    pub action: String,
    pub id: Option<i64>,
    pub title: String,
    pub slug: String,
    pub body_markdown: String,
    pub error: Option<String>,
}

impl PostFormPage {
    pub fn create_blank() -> Self {
        Self {
            heading: "New post",
            submit_label: "Create post",
            action: "/posts/create".to_string(),
            id: None,
            title: String::new(),
            slug: String::new(),
            body_markdown: String::new(),
            error: None,
        }
    }

    /// Redisplay of the create form with the caller's in-flight input intact.
    pub fn create_retry(title: String, slug: String, body_markdown: String, error: String) -> Self {
        Self {
            title,
            slug,
            body_markdown,
            error: Some(error),
            ..Self::create_blank()
        }
    }

    pub fn edit_prefilled(post: &PostRecord) -> Self {
        Self {
            heading: "Edit post",
            submit_label: "Save changes",
            action: format!("/posts/edit/{}?_method=PATCH", post.id),
            id: Some(post.id),
            title: post.title.clone(),
            slug: post.slug.clone(),
            body_markdown: post.body_markdown.clone(),
            error: None,
        }
    }

    /// Redisplay of the edit form with the caller's submitted fields intact.
    pub fn edit_retry(
        id: i64,
        title: String,
        slug: String,
        body_markdown: String,
        error: String,
    ) -> Self {
        Self {
            heading: "Edit post",
            submit_label: "Save changes",
            action: format!("/posts/edit/{id}?_method=PATCH"),
            id: Some(id),
            title,
            slug,
            body_markdown,
            error: Some(error),
        }
    }
}

#[derive(Template)]
#[template(path = "posts/form.html")]
pub struct PostFormTemplate {
    pub view: PostFormPage,
}

pub struct PostDetailPage {
    pub title: String,
    pub slug: String,
    pub created_human: String,
    pub created_iso: String,
    pub body_html: String,
}

impl From<&PostRecord> for PostDetailPage {
    fn from(post: &PostRecord) -> Self {
        Self {
            title: post.title.clone(),
            slug: post.slug.clone(),
            created_human: post.created_human(),
            created_iso: post.created_iso(),
            body_html: post.body_html.clone(),
        }
    }
}

#[derive(Template)]
#[template(path = "posts/detail.html")]
pub struct PostDetailTemplate {
    pub view: PostDetailPage,
}

pub struct PostDeletePage {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub created_human: String,
    pub error: Option<String>,
}

impl PostDeletePage {
    pub fn confirm(post: &PostRecord, error: Option<String>) -> Self {
        Self {
            id: post.id,
            slug: post.slug.clone(),
            title: post.title.clone(),
            created_human: post.created_human(),
            error,
        }
    }
}

#[derive(Template)]
#[template(path = "posts/delete.html")]
pub struct PostDeleteTemplate {
    pub view: PostDeletePage,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Post Not Found".to_string(),
            message: "The post you requested does not exist. It may have been deleted."
                .to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: ErrorPageView,
}
