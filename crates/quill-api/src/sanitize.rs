//! Cleaning of user-submitted rich text before it is stored.

use std::sync::LazyLock;

use ammonia::{Builder, UrlRelative};

/// ammonia's default policy, minus relative URLs: `<img src="/delete/1">`
/// would otherwise fire a same-site request with the viewer's session.
static POLICY: LazyLock<Builder<'static>> = LazyLock::new(|| {
    let mut builder = Builder::default();
    builder.url_relative(UrlRelative::Deny);
    builder
});

/// Strip unsafe markup (scripts, event handlers, `javascript:` and relative
/// links) from `html`, keeping text and harmless formatting.
pub fn clean(html: &str) -> String {
    POLICY.clean(html).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_script_keeps_text() {
        let cleaned = clean("<script>alert(1)</script>Hello");
        assert!(!cleaned.contains("<script"));
        assert!(!cleaned.contains("alert(1)"));
        assert!(cleaned.contains("Hello"));
    }

    #[test]
    fn drops_event_handlers_and_js_links() {
        let cleaned = clean(r#"<p onclick="steal()">hi</p><a href="javascript:steal()">x</a>"#);
        assert!(!cleaned.contains("onclick"));
        assert!(!cleaned.contains("javascript:"));
        assert!(cleaned.contains("<p>hi</p>"));
    }

    #[test]
    fn drops_relative_urls() {
        let cleaned = clean(r#"<p>hi</p><img src="/delete/1"><a href="/logout">bye</a>"#);
        assert!(!cleaned.contains("/delete/1"));
        assert!(!cleaned.contains("/logout"));
        assert!(cleaned.contains("<p>hi</p>"));
        assert!(cleaned.contains("bye"));
    }

    #[test]
    fn keeps_absolute_urls() {
        let cleaned = clean(r#"<img src="https://images.example.com/a.png">"#);
        assert!(cleaned.contains(r#"src="https://images.example.com/a.png""#));
    }

    #[test]
    fn keeps_formatting() {
        let html = "<p>Some <strong>bold</strong> and <em>italic</em> text</p>";
        assert_eq!(clean(html), html);
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(clean("just words"), "just words");
    }
}
