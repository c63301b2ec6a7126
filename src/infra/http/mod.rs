mod middleware;
mod posts;

pub use posts::{AppRouter, HttpState, build_router};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sqlx::Error as SqlxError;

use crate::application::error::{ErrorReport, HttpError};
use crate::application::posts::PostError;

fn db_health_response(result: Result<(), SqlxError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}

/// Map a post service error to a consistent HTTP error response for paths
/// where a form redisplay is not the right presentation.
pub fn post_error_to_http(source: &'static str, err: PostError) -> HttpError {
    match err {
        PostError::NotFound => HttpError::new(
            source,
            StatusCode::NOT_FOUND,
            "Post not found",
            "post not found",
        ),
        PostError::SlugTaken { slug } => HttpError::new(
            source,
            StatusCode::CONFLICT,
            "Duplicate slug",
            format!("slug `{slug}` already exists"),
        ),
        PostError::Validation(message) => {
            HttpError::new(source, StatusCode::BAD_REQUEST, "Invalid input", message)
        }
        PostError::Render(err) => HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Rendering failed",
            &err,
        ),
        PostError::Repo(err) => HttpError::from_error(
            source,
            StatusCode::SERVICE_UNAVAILABLE,
            "Storage unavailable",
            &err,
        ),
    }
}
