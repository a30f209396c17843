//! Content filtering for post text.
//!
//! Converts raw author text into trusted HTML:
//! - URLs ending in an image extension become inline image blocks
//! - Remaining bare URLs become anchors with truncated labels
//! - Newlines become `<br />`
//! - `[img:<id>]` placeholders resolve to the image-serving route
//!
//! The output is inserted into pages as pre-escaped markup. Post content is
//! author-trusted input; only the template engine's autoescaping protects
//! interpolated values elsewhere on the page.

use std::sync::LazyLock;

use regex::Regex;

use crate::LINK_LABEL_LIMIT;

/// Regex for URLs pointing at an image file.
static IMAGE_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://[\w:;/.?%#&=+-]+\.(?:jpg|png|gif)")
        .expect("image URL regex should compile")
});

/// Regex for bare URLs in text content.
///
/// The regex crate has no lookbehind, so the "not already inside a quoted
/// attribute" guard captures the preceding character (or start of input) and
/// re-emits it in the replacement.
static BARE_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(^|[^"])(https?://[\w:;/.?%#&=+-]+)"#).expect("URL regex should compile")
});

/// Regex for `[img:<id>]` placeholders embedded in post content.
static IMG_PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[img:([^\]\s]+)\]").expect("placeholder regex should compile"));

/// Convert raw post text into displayable HTML.
///
/// Substitution order matters: image URLs must be wrapped before the generic
/// URL pass so they are never double-wrapped as anchors. The quote guard in
/// [`BARE_URL_REGEX`] then skips the `src="..."` attributes emitted by the
/// first pass.
pub fn filter_content(raw: &str) -> String {
    let text = IMAGE_URL_REGEX.replace_all(raw, |caps: &regex::Captures| {
        format!(r#"<div><img src="{}" alt="loading image.."></div>"#, &caps[0])
    });

    let text = BARE_URL_REGEX.replace_all(&text, |caps: &regex::Captures| {
        let url = &caps[2];
        format!(r#"{}<a href="{}">{}</a>"#, &caps[1], url, link_label(url))
    });

    let text = text.replace("\r\n", "\n").replace('\n', "<br />\n");

    IMG_PLACEHOLDER_REGEX
        .replace_all(&text, r#"<img src="/image/$1" style="max-width:400px">"#)
        .into_owned()
}

/// The textual placeholder embedded into post content for a stored image.
pub fn image_placeholder(image_id: &str) -> String {
    format!("[img:{image_id}]")
}

/// Visible label for a linked URL: the URL itself, truncated to
/// [`LINK_LABEL_LIMIT`] characters with a trailing ellipsis when longer.
fn link_label(url: &str) -> String {
    if url.len() <= LINK_LABEL_LIMIT {
        return url.to_string();
    }
    let mut end = LINK_LABEL_LIMIT;
    while !url.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    format!("{}...", &url[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(filter_content("hello world"), "hello world");
    }

    #[test]
    fn short_url_becomes_anchor_with_full_label() {
        let out = filter_content("see http://example.com/a here");
        assert_eq!(
            out,
            r#"see <a href="http://example.com/a">http://example.com/a</a> here"#
        );
    }

    #[test]
    fn long_url_label_truncates_at_forty_chars() {
        let url = "http://example.com/a/very/long/path/that/exceeds/forty/chars";
        let out = filter_content(&format!("Check {url}"));
        let expected_label = format!("{}...", &url[..40]);
        assert!(out.contains(&format!(r#"<a href="{url}">{expected_label}</a>"#)));
    }

    #[test]
    fn forty_char_url_keeps_full_label() {
        let url = "http://example.com/exactly-40-chars-aaaa";
        assert_eq!(url.len(), 40);
        let out = filter_content(url);
        assert_eq!(out, format!(r#"<a href="{url}">{url}</a>"#));
    }

    #[test]
    fn image_url_becomes_image_block_not_anchor() {
        let out = filter_content("look http://example.com/cat.png wow");
        assert_eq!(
            out,
            r#"look <div><img src="http://example.com/cat.png" alt="loading image.."></div> wow"#
        );
        assert!(!out.contains("<a "));
    }

    #[test]
    fn image_extensions_jpg_png_gif_all_embed() {
        for ext in ["jpg", "png", "gif"] {
            let out = filter_content(&format!("https://x.org/pic.{ext}"));
            assert!(out.starts_with("<div><img "), "extension {ext}: {out}");
        }
    }

    #[test]
    fn url_at_start_of_text_is_linked() {
        let out = filter_content("http://example.com");
        assert_eq!(
            out,
            r#"<a href="http://example.com">http://example.com</a>"#
        );
    }

    #[test]
    fn quoted_url_is_left_alone() {
        let out = filter_content(r#"attr "http://example.com/x" end"#);
        assert!(!out.contains("<a "));
    }

    #[test]
    fn newlines_become_line_breaks() {
        assert_eq!(filter_content("a\nb"), "a<br />\nb");
        assert_eq!(filter_content("a\r\nb"), "a<br />\nb");
    }

    #[test]
    fn placeholder_resolves_to_image_route() {
        let out = filter_content("before [img:abc123] after");
        assert_eq!(
            out,
            r#"before <img src="/image/abc123" style="max-width:400px"> after"#
        );
    }

    #[test]
    fn placeholder_round_trip() {
        let id = "deadbeef";
        let out = filter_content(&image_placeholder(id));
        assert_eq!(out, format!(r#"<img src="/image/{id}" style="max-width:400px">"#));
    }

    #[test]
    fn mixed_content_applies_all_steps() {
        let out = filter_content("pic https://a.io/x.gif\nlink https://a.io/y\n[img:77]");
        assert!(out.contains(r#"<div><img src="https://a.io/x.gif""#));
        assert!(out.contains(r#"<a href="https://a.io/y">https://a.io/y</a>"#));
        assert!(out.contains("<br />\n"));
        assert!(out.contains(r#"<img src="/image/77""#));
    }
}
