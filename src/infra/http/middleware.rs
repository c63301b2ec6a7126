use std::time::Instant;

use axum::{
    body::Body,
    http::{Method, Request},
    middleware::Next,
    response::Response,
};
use tracing::{error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let ctx = RequestContext {
        request_id: request_id.clone(),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

/// HTML forms can only submit GET/POST; a `_method` query parameter on a
/// POST selects the real verb, matching the classic method-override flow.
///
/// This runs as a request map wrapped around the whole router: the rewrite
/// has to happen before routing, or the POST is dispatched (and 405-rejected)
/// against the PATCH/DELETE-only route first.
pub fn method_override(mut request: Request<Body>) -> Request<Body> {
    if request.method() == Method::POST
        && let Some(query) = request.uri().query()
        && let Some(target) = override_target(query)
    {
        *request.method_mut() = target;
    }
    request
}

fn override_target(query: &str) -> Option<Method> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "_method")
        .and_then(|(_, value)| match value.to_ascii_uppercase().as_str() {
            "PATCH" => Some(Method::PATCH),
            "DELETE" => Some(Method::DELETE),
            _ => None,
        })
}

pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        let elapsed_ms = start.elapsed().as_millis();
        let report = response.extensions_mut().remove::<ErrorReport>();
        let (source, messages) = match report {
            Some(report) => (report.source, report.messages),
            None => ("unknown", Vec::new()),
        };
        let detail = messages
            .first()
            .cloned()
            .unwrap_or_else(|| "no diagnostic available".to_string());

        if status.is_server_error() {
            error!(
                target = "breve::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                "request failed",
            );
        } else {
            warn!(
                target = "breve::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                "client request error",
            );
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_override_rewrites_post_in_place() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/posts/edit/1?_method=PATCH")
            .body(Body::empty())
            .unwrap();
        assert_eq!(method_override(request).method(), Method::PATCH);
    }

    #[test]
    fn method_override_leaves_plain_posts_alone() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/posts/create")
            .body(Body::empty())
            .unwrap();
        assert_eq!(method_override(request).method(), Method::POST);
    }

    #[test]
    fn override_target_accepts_known_verbs() {
        assert_eq!(override_target("_method=PATCH"), Some(Method::PATCH));
        assert_eq!(override_target("_method=delete"), Some(Method::DELETE));
    }

    #[test]
    fn override_target_rejects_other_verbs() {
        assert_eq!(override_target("_method=PUT"), None);
        assert_eq!(override_target("_method=TRACE"), None);
        assert_eq!(override_target("other=1"), None);
    }
}
