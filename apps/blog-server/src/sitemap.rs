//! Sitemap rendering.
//!
//! Emits the sitemap protocol's `<urlset>` document: one `<url>` per
//! published post with its absolute location and last-modified time.

use quill_core::domain::Post;

/// Minimal XML escaping for text nodes and attribute values.
fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Join the site base and a canonical path without doubling slashes.
fn absolute_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// Render the sitemap for the given published posts.
pub fn render_sitemap(base_url: &str, posts: &[Post]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");

    for post in posts {
        let loc = absolute_url(base_url, &post.canonical_path());
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&loc)));
        xml.push_str(&format!(
            "    <lastmod>{}</lastmod>\n",
            post.updated_at.format("%Y-%m-%dT%H:%M:%S%:z")
        ));
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn post(title: &str, published: bool) -> Post {
        let mut p = Post::new(Uuid::new_v4(), title.to_string(), None, String::new());
        p.published_at = Utc.with_ymd_and_hms(2024, 3, 7, 8, 0, 0).unwrap();
        p.updated_at = Utc.with_ymd_and_hms(2024, 3, 7, 9, 30, 0).unwrap();
        if published {
            p.status = quill_core::domain::PostStatus::Published;
        }
        p
    }

    #[test]
    fn renders_one_url_per_post() {
        let posts = vec![post("First Post", true), post("Second Post", true)];
        let xml = render_sitemap("https://example.com", &posts);

        assert_eq!(xml.matches("<url>").count(), 2);
        assert!(xml.contains("<loc>https://example.com/blog/2024/3/7/first-post/</loc>"));
        assert!(xml.contains("<loc>https://example.com/blog/2024/3/7/second-post/</loc>"));
        assert!(xml.contains("<lastmod>2024-03-07T09:30:00+00:00</lastmod>"));
    }

    #[test]
    fn base_url_trailing_slash_does_not_double() {
        let posts = vec![post("Solo", true)];
        let xml = render_sitemap("https://example.com/", &posts);
        assert!(xml.contains("<loc>https://example.com/blog/"));
        assert!(!xml.contains("com//blog"));
    }

    #[test]
    fn escapes_reserved_characters_in_locations() {
        let mut p = post("Ampersand", true);
        p.slug = "a&b".to_string();
        let xml = render_sitemap("https://example.com", &[p]);
        assert!(xml.contains("a&amp;b"));
        assert!(!xml.contains("<loc>https://example.com/blog/2024/3/7/a&b/"));
    }

    #[test]
    fn empty_post_set_renders_an_empty_urlset() {
        let xml = render_sitemap("https://example.com", &[]);
        assert!(xml.contains("<urlset"));
        assert!(!xml.contains("<url>"));
    }
}
