use std::collections::HashSet;

use ammonia::Builder as AmmoniaBuilder;

/// Allow list for post bodies: headings, lists, emphasis, links, images,
/// code blocks, tables. Anything capable of executing script is absent, and
/// ammonia additionally strips event-handler attributes and unsafe URI
/// schemes from what remains.
pub fn build_body_sanitizer() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();

    let tags: HashSet<&'static str> = HashSet::from([
        "a",
        "abbr",
        "blockquote",
        "br",
        "code",
        "del",
        "dd",
        "dl",
        "dt",
        "em",
        "figcaption",
        "figure",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "hr",
        "i",
        "img",
        "input",
        "ins",
        "kbd",
        "li",
        "mark",
        "ol",
        "p",
        "pre",
        "s",
        "strong",
        "sub",
        "sup",
        "table",
        "tbody",
        "td",
        "th",
        "thead",
        "tr",
        "u",
        "ul",
    ]);
    builder.tags(tags);

    let generic: HashSet<&'static str> = HashSet::from(["class", "id", "title", "lang", "dir"]);
    builder.generic_attributes(generic);

    // task list checkboxes survive, but only as inert markers
    builder.add_tag_attributes("input", &["type", "checked", "disabled"]);
    builder.add_tag_attributes("img", &["src", "alt", "width", "height"]);
    builder.add_tag_attributes("a", &["href", "hreflang"]);
    builder.add_tag_attributes("ol", &["start"]);
    builder.add_tag_attributes("td", &["align"]);
    builder.add_tag_attributes("th", &["align"]);

    builder.url_schemes(HashSet::from(["http", "https", "mailto"]));
    builder.link_rel(Some("noopener noreferrer"));

    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_safe_formatting() {
        let cleaned = build_body_sanitizer()
            .clean("<h2>hey</h2><p><em>soft</em> <strong>loud</strong></p>")
            .to_string();
        assert!(cleaned.contains("<h2>hey</h2>"));
        assert!(cleaned.contains("<em>soft</em>"));
    }

    #[test]
    fn rewrites_link_rel() {
        let cleaned = build_body_sanitizer()
            .clean("<a href=\"https://example.com\">x</a>")
            .to_string();
        assert!(cleaned.contains("rel=\"noopener noreferrer\""));
    }

    #[test]
    fn drops_unknown_schemes() {
        let cleaned = build_body_sanitizer()
            .clean("<a href=\"ftp://example.com/file\">x</a>")
            .to_string();
        assert!(!cleaned.contains("ftp:"));
    }
}
