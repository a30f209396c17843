//! Shared HTML components used across all pages.
//!
//! These are maud functions that return `Markup` fragments for composition
//! into full pages.

use maud::{DOCTYPE, Markup, PreEscaped, html};

use quill_core::{Cursor, filter_content};

use crate::auth::{self, CurrentUser};
use crate::config::Config;
use crate::query::{PostRow, TagRow};

/// Inline CSS for all pages.
///
/// Flat design, no external assets.
pub const PAGE_CSS: &str = r#"
*{margin:0;padding:0;box-sizing:border-box}
:root{--bg:#fafaf7;--fg:#1b1b18;--fg2:#55534c;--fg3:#99968c;--accent:#1a6b49;--accent-hover:#134f36;--surface:#fff;--border:rgba(26,107,73,.18);--mono:"SF Mono",SFMono-Regular,ui-monospace,Menlo,monospace}
body{font-family:Georgia,"Times New Roman",serif;line-height:1.65;color:var(--fg);background:var(--bg);min-height:100vh;display:flex;flex-direction:column;align-items:center;padding:1.5rem 1rem}
main{max-width:720px;width:100%;flex:1}
a{color:var(--accent);text-decoration:none}
a:hover{text-decoration:underline;color:var(--accent-hover)}
img{max-width:100%;height:auto}
h1{font-size:1.9rem;letter-spacing:-.01em;margin-bottom:.75rem}
h2{font-size:1.3rem;margin-bottom:.35rem}
.site-header{width:100%;max-width:720px;display:flex;align-items:baseline;justify-content:space-between;margin-bottom:1.75rem;border-bottom:1px solid var(--border);padding-bottom:.75rem}
.site-title{font-size:1.4rem;font-weight:700;color:var(--fg)}
.auth-link{font-size:.9rem;color:var(--fg2)}
.card{padding:1.25rem 1.5rem;border:1px solid var(--border);border-radius:8px;background:var(--surface);margin-bottom:1rem}
.meta{font-size:.85rem;color:var(--fg3);margin-bottom:.5rem}
.meta a{color:var(--fg2)}
.content{word-break:break-word}
.tag-row{margin:.5rem 0 0;font-size:.85rem}
.tag-chip{display:inline-block;padding:.1rem .55rem;margin-right:.35rem;border:1px solid var(--border);border-radius:999px;color:var(--accent)}
.facet{margin:1rem 0;font-size:.9rem;color:var(--fg2)}
.pager{margin:1.5rem 0;text-align:center}
.form-grid{display:flex;flex-direction:column;gap:.75rem}
.form-grid label{font-size:.85rem;color:var(--fg2)}
.form-grid input[type=text],.form-grid textarea{width:100%;padding:.5rem .65rem;border:1px solid var(--border);border-radius:6px;font:inherit;background:var(--surface)}
.form-grid textarea{min-height:12rem}
.form-grid button{align-self:flex-start;padding:.45rem 1.2rem;border:none;border-radius:6px;background:var(--accent);color:#fff;font:inherit;cursor:pointer}
.form-grid button:hover{background:var(--accent-hover)}
.comment{border-top:1px solid var(--border);padding:.75rem 0}
.comment:first-of-type{border-top:none}
.edit-images{display:flex;gap:.5rem;flex-wrap:wrap;margin:.5rem 0}
.edit-images img{max-width:120px;border-radius:6px;border:1px solid var(--border)}
.error-page{text-align:center;padding:4rem 1rem}
.error-page h1{margin-bottom:1rem}
.error-page p{color:var(--fg2);margin-bottom:1.5rem}
.footer{margin-top:2.5rem;font-size:.8rem;color:var(--fg3)}
"#;

/// Full page shell: doctype, head, site header with the auth link, body.
///
/// `path` is the page's own path, used as the post-login/logout return
/// target.
pub fn page(
    config: &Config,
    user: Option<&CurrentUser>,
    title: &str,
    path: &str,
    body: Markup,
) -> Markup {
    let (auth_href, auth_text) = auth_link(config, user, path);
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " — " (config.site_name) }
                style { (PreEscaped(PAGE_CSS)) }
            }
            body {
                header class="site-header" {
                    a class="site-title" href="/" { (config.site_name) }
                    a class="auth-link" href=(auth_href) { (auth_text) }
                }
                main { (body) }
                footer class="footer" { (config.site_name) }
            }
        }
    }
}

/// Login/logout link for the page header.
fn auth_link(config: &Config, user: Option<&CurrentUser>, path: &str) -> (String, String) {
    match user {
        Some(user) => (
            auth::logout_url(config, path),
            format!("{} -> Logout", user.name),
        ),
        None => (auth::login_url(config, path), "Login".to_string()),
    }
}

/// A post rendered as a listing card: linked title, timestamps, tag chips,
/// filtered content.
pub fn post_card(post: &PostRow, tags: &[TagRow]) -> Markup {
    html! {
        article class="card" {
            h2 { a href={ "/singlepost/" (post.id) } { (post.title) } }
            div class="meta" {
                "posted " (format_time(post.created_at))
                @if post.updated_at > post.created_at {
                    " · edited " (format_time(post.updated_at))
                }
            }
            div class="content" { (PreEscaped(filter_content(&post.content))) }
            @if !tags.is_empty() {
                div class="tag-row" { (tag_chips(tags, &post.blog_id)) }
            }
        }
    }
}

/// Tag chips linking to the tag-filtered listing for `blog_id`.
pub fn tag_chips(tags: &[TagRow], blog_id: &str) -> Markup {
    html! {
        @for tag in tags {
            a class="tag-chip" href={ "/tag/" (tag.id) "/" (blog_id) } { (tag.label) }
        }
    }
}

/// "Next page" link when a continuation cursor exists.
pub fn pager(base_path: &str, cursor: Option<&Cursor>) -> Markup {
    html! {
        @if let Some(cursor) = cursor {
            div class="pager" {
                a href={ (base_path) "?cursor=" (cursor) } { "Next page →" }
            }
        }
    }
}

/// Render a unix timestamp as a human-readable UTC time.
pub fn format_time(unix_seconds: u32) -> String {
    match chrono::DateTime::from_timestamp(i64::from(unix_seconds), 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => unix_seconds.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            bind_addr: "0.0.0.0:8080".to_string(),
            clickhouse_url: "http://localhost:8123".to_string(),
            clickhouse_database: "quill".to_string(),
            base_url: "http://localhost:8080".to_string(),
            site_name: "Quill".to_string(),
            auth_url: "https://id.example.org".to_string(),
        }
    }

    #[test]
    fn format_time_renders_utc() {
        assert_eq!(format_time(0), "1970-01-01 00:00 UTC");
    }

    #[test]
    fn anonymous_header_offers_login() {
        let (href, text) = auth_link(&test_config(), None, "/createblog");
        assert!(href.contains("/login?next=%2Fcreateblog"));
        assert_eq!(text, "Login");
    }

    #[test]
    fn signed_in_header_offers_logout_with_name() {
        let user = CurrentUser {
            id: "u-1".to_string(),
            name: "Ada".to_string(),
        };
        let (href, text) = auth_link(&test_config(), Some(&user), "/");
        assert!(href.contains("/logout?next=%2F"));
        assert_eq!(text, "Ada -> Logout");
    }

    #[test]
    fn post_card_escapes_title_but_trusts_content() {
        let post = PostRow {
            id: "p1".to_string(),
            blog_id: "b1".to_string(),
            title: "<script>".to_string(),
            content: "line one\nline two".to_string(),
            tag_ids: vec![],
            created_at: 100,
            updated_at: 100,
        };
        let out = post_card(&post, &[]).into_string();
        assert!(out.contains("&lt;script&gt;"));
        assert!(out.contains("line one<br />\nline two"));
    }

    #[test]
    fn pager_renders_only_with_cursor() {
        assert_eq!(pager("/singleblog/b1", None).into_string(), "");
        let cursor = Cursor::after(99, "zz");
        let out = pager("/singleblog/b1", Some(&cursor)).into_string();
        assert!(out.contains("/singleblog/b1?cursor=99.zz"));
    }

    #[test]
    fn tag_chips_link_into_blog_scope() {
        let tags = vec![TagRow {
            id: "t1".to_string(),
            label: "rust".to_string(),
            created_at: 1,
        }];
        let out = tag_chips(&tags, "b9").into_string();
        assert!(out.contains(r#"href="/tag/t1/b9""#));
        assert!(out.contains("rust"));
    }
}
