//! Domain entities mirrored from persistent storage.

use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};

pub const HUMAN_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");
pub const ISO_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// A stored post. `body_html` is always the sanitized render of
/// `body_markdown`; the two are written together and never diverge.
#[derive(Debug, Clone, PartialEq)]
pub struct PostRecord {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub body_markdown: String,
    pub body_html: String,
    pub created_at: OffsetDateTime,
}

impl PostRecord {
    pub fn created_human(&self) -> String {
        self.created_at
            .format(HUMAN_DATE_FORMAT)
            .unwrap_or_else(|_| self.created_at.to_string())
    }

    pub fn created_iso(&self) -> String {
        self.created_at
            .format(ISO_DATE_FORMAT)
            .unwrap_or_else(|_| self.created_at.to_string())
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn record(at: OffsetDateTime) -> PostRecord {
        PostRecord {
            id: 1,
            slug: "hello-world".to_string(),
            title: "Hello World".to_string(),
            body_markdown: "**hi**".to_string(),
            body_html: "<p><strong>hi</strong></p>\n".to_string(),
            created_at: at,
        }
    }

    #[test]
    fn human_date_is_long_form() {
        let post = record(datetime!(2026-08-03 09:30 UTC));
        assert_eq!(post.created_human(), "August 3, 2026");
    }

    #[test]
    fn iso_date_is_calendar_only() {
        let post = record(datetime!(2026-08-03 09:30 UTC));
        assert_eq!(post.created_iso(), "2026-08-03");
    }
}
