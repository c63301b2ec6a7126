//! Markdown body rendering: comrak parsing followed by ammonia sanitisation.
//!
//! The pipeline is pure and side-effect free. Markdown grammars are
//! permissive, so parsing never fails; the only error path is HTML
//! serialisation itself.

mod sanitize;

use std::sync::Arc;

use comrak::{Arena, Options, format_html, parse_document};
use once_cell::sync::Lazy;
use thiserror::Error;

pub use sanitize::build_body_sanitizer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("markdown rendering failed: {message}")]
    Markdown { message: String },
}

/// Converts raw markdown into sanitized HTML fit for storage and display.
pub trait RenderService: Send + Sync {
    fn render_body(&self, markdown: &str) -> Result<String, RenderError>;
}

/// Default comrak-based pipeline with an ammonia sanitizer that strips
/// script-execution vectors while keeping structural markup.
pub struct ComrakRenderService {
    options: Options<'static>,
    sanitizer: ammonia::Builder<'static>,
}

impl ComrakRenderService {
    fn new() -> Self {
        Self {
            options: default_options(),
            sanitizer: build_body_sanitizer(),
        }
    }

    /// Run only the sanitisation stage. Sanitising already-safe HTML is
    /// idempotent, which keeps stored `body_html` stable across re-renders.
    pub fn sanitize(&self, html: &str) -> String {
        self.sanitizer.clean(html).to_string()
    }
}

impl Default for ComrakRenderService {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderService for ComrakRenderService {
    fn render_body(&self, markdown: &str) -> Result<String, RenderError> {
        let arena = Arena::new();
        let root = parse_document(&arena, markdown, &self.options);

        let mut html = String::new();
        format_html(root, &self.options, &mut html).map_err(|err| RenderError::Markdown {
            message: err.to_string(),
        })?;

        Ok(self.sanitize(&html))
    }
}

static RENDER_SERVICE: Lazy<Arc<ComrakRenderService>> =
    Lazy::new(|| Arc::new(ComrakRenderService::new()));

/// Access the shared render service instance, initialised on first use.
pub fn render_service() -> Arc<ComrakRenderService> {
    Arc::clone(&RENDER_SERVICE)
}

fn default_options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    // Raw HTML passes through comrak untouched; ammonia is the safety
    // boundary. Without this comrak replaces it with an HTML comment and
    // safe inline markup like `<img>` never reaches the sanitizer.
    options.render.r#unsafe = true;
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> ComrakRenderService {
        ComrakRenderService::default()
    }

    #[test]
    fn renders_emphasis() {
        let html = service().render_body("**hi**").expect("render");
        assert!(html.contains("<strong>hi</strong>"));
    }

    #[test]
    fn renders_structural_markup() {
        let markdown = "# Title\n\n- one\n- two\n\n```\nlet x = 1;\n```\n\n[link](https://example.com)";
        let html = service().render_body(markdown).expect("render");
        assert!(html.contains("<h1>"));
        assert!(html.contains("<li>one</li>"));
        assert!(html.contains("<code>"));
        assert!(html.contains("href=\"https://example.com\""));
    }

    #[test]
    fn keeps_safe_inline_html() {
        let html = service()
            .render_body("before <img src=\"x.png\" alt=\"pic\"> after")
            .expect("render");
        assert!(html.contains("src=\"x.png\""));
        assert!(html.contains("alt=\"pic\""));
        assert!(!html.contains("raw HTML omitted"));
    }

    #[test]
    fn strips_script_tags() {
        let html = service()
            .render_body("hello <script>alert(1)</script> world")
            .expect("render");
        assert!(!html.contains("<script"));
    }

    #[test]
    fn strips_event_handlers() {
        let html = service()
            .render_body("<img src=\"x.png\" onerror=\"alert(1)\">")
            .expect("render");
        assert!(!html.contains("onerror="));
        assert!(html.contains("<img"));
    }

    #[test]
    fn strips_javascript_uris() {
        let html = service()
            .render_body("[click](javascript:alert(1))")
            .expect("render");
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn hostile_inputs_never_emit_script_vectors() {
        let samples = [
            "<SCRIPT>alert(1)</SCRIPT>",
            "<a href=\"JaVaScRiPt:alert(1)\">x</a>",
            "<div onclick=alert(1)>x</div>",
            "![x](x) <svg onload=alert(1)>",
            "<iframe src=\"javascript:alert(1)\"></iframe>",
        ];
        let service = service();
        for sample in samples {
            let html = service.render_body(sample).expect("render");
            let lowered = html.to_lowercase();
            assert!(!lowered.contains("<script"), "script tag in {html:?}");
            assert!(!lowered.contains("onerror="), "onerror in {html:?}");
            assert!(!lowered.contains("onclick="), "onclick in {html:?}");
            assert!(!lowered.contains("javascript:"), "js uri in {html:?}");
        }
    }

    #[test]
    fn sanitization_is_idempotent() {
        let service = service();
        let markdown = "# Heading\n\n**bold** _em_ `code`\n\n> quote\n\n<img src=\"a.png\" alt=\"a\">";
        let once = service.render_body(markdown).expect("render");
        let twice = service.sanitize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn malformed_markdown_renders_best_effort() {
        let html = service()
            .render_body("[unclosed **mismatch `tick\n\n|broken|table")
            .expect("render");
        assert!(!html.is_empty());
    }
}
