//! RSS, Atom and sitemap documents.
//!
//! Callers pass only published posts; nothing here re-checks visibility.

use chrono::{DateTime, Utc};

use folio_core::domain::{Category, Post};

use crate::config::SiteConfig;

/// Items carried by the RSS and Atom feeds.
pub const FEED_ITEMS: u64 = 20;

/// Characters of post content used as a feed description.
pub const DESCRIPTION_CHARS: usize = 400;

/// Site-relative pages listed in the sitemap besides posts and categories.
const STATIC_PAGES: &[&str] = &["/", "/category/"];

pub fn description(post: &Post) -> String {
    post.content.chars().take(DESCRIPTION_CHARS).collect()
}

fn published(post: &Post) -> DateTime<Utc> {
    post.published_at.unwrap_or(post.updated_at)
}

/// RSS 2.0 channel.
pub fn rss(site: &SiteConfig, posts: &[Post]) -> String {
    let mut items = String::new();
    for post in posts {
        let link = site.post_url(post.slug_str());
        items.push_str(&format!(
            "    <item>\n      <title>{}</title>\n      <link>{}</link>\n      <guid>{}</guid>\n      <pubDate>{}</pubDate>\n      <description>{}</description>\n    </item>\n",
            xml_escape(&post.title),
            xml_escape(&link),
            xml_escape(&link),
            published(post).to_rfc2822(),
            xml_escape(&description(post)),
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss version=\"2.0\" xmlns:atom=\"http://www.w3.org/2005/Atom\">\n  <channel>\n    <title>{}</title>\n    <link>{}</link>\n    <description>{}</description>\n    <atom:link href=\"{}\" rel=\"self\"/>\n{}  </channel>\n</rss>\n",
        xml_escape(&site.title),
        xml_escape(&site.absolute("/")),
        xml_escape(&site.description),
        xml_escape(&site.absolute("/feed/")),
        items
    )
}

/// Atom 1.0 feed with the same items as [`rss`].
pub fn atom(site: &SiteConfig, posts: &[Post]) -> String {
    let updated = posts.iter().map(published).max().unwrap_or_else(Utc::now);

    let mut entries = String::new();
    for post in posts {
        let link = site.post_url(post.slug_str());
        entries.push_str(&format!(
            "  <entry>\n    <title>{}</title>\n    <link href=\"{}\" rel=\"alternate\"/>\n    <id>{}</id>\n    <updated>{}</updated>\n    <summary type=\"html\">{}</summary>\n  </entry>\n",
            xml_escape(&post.title),
            xml_escape(&link),
            xml_escape(&link),
            published(post).to_rfc3339(),
            xml_escape(&description(post)),
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<feed xmlns=\"http://www.w3.org/2005/Atom\">\n  <title>{}</title>\n  <subtitle>{}</subtitle>\n  <id>{}</id>\n  <updated>{}</updated>\n  <link href=\"{}\" rel=\"alternate\"/>\n  <link href=\"{}\" rel=\"self\"/>\n{}</feed>\n",
        xml_escape(&site.title),
        xml_escape(&site.description),
        xml_escape(&site.absolute("/")),
        updated.to_rfc3339(),
        xml_escape(&site.absolute("/")),
        xml_escape(&site.absolute("/feed/atom/")),
        entries
    )
}

/// Sitemap covering published posts, categories and static pages.
pub fn sitemap(site: &SiteConfig, posts: &[Post], categories: &[Category]) -> String {
    let mut urls = String::new();

    for post in posts {
        push_url(
            &mut urls,
            &site.post_url(post.slug_str()),
            Some(post.updated_at),
            "0.8",
        );
    }
    for category in categories {
        push_url(&mut urls, &site.category_url(&category.slug), None, "0.5");
    }
    for page in STATIC_PAGES {
        push_url(&mut urls, &site.absolute(page), None, "0.3");
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{urls}</urlset>\n"
    )
}

fn push_url(out: &mut String, loc: &str, lastmod: Option<DateTime<Utc>>, priority: &str) {
    out.push_str("  <url>\n");
    out.push_str(&format!("    <loc>{}</loc>\n", xml_escape(loc)));
    if let Some(lastmod) = lastmod {
        out.push_str(&format!(
            "    <lastmod>{}</lastmod>\n",
            lastmod.format("%Y-%m-%d")
        ));
    }
    out.push_str("    <changefreq>weekly</changefreq>\n");
    out.push_str(&format!("    <priority>{priority}</priority>\n"));
    out.push_str("  </url>\n");
}

pub fn robots(site: &SiteConfig) -> String {
    format!(
        "User-agent: *\nDisallow: /api/\n\nSitemap: {}\n",
        site.absolute("/sitemap.xml")
    )
}

fn xml_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::domain::PostStatus;
    use uuid::Uuid;

    fn site() -> SiteConfig {
        SiteConfig::new("https://blog.example.com", "Blog", "Posts & notes")
    }

    fn post(title: &str, slug: &str, content: &str) -> Post {
        let mut post = Post::new(Uuid::new_v4(), Uuid::new_v4(), title.into(), content.into())
            .with_status(PostStatus::Published);
        post.slug = Some(slug.into());
        post.published_at = Some(Utc::now());
        post
    }

    #[test]
    fn description_is_cut_at_four_hundred_characters() {
        let long = "é".repeat(500);
        assert_eq!(description(&post("t", "t", &long)).chars().count(), 400);
    }

    #[test]
    fn rss_escapes_titles_and_links_posts() {
        let xml = rss(&site(), &[post("Tom & Jerry", "tom-jerry", "<b>hi</b>")]);

        assert!(xml.contains("<title>Tom &amp; Jerry</title>"));
        assert!(xml.contains("<link>https://blog.example.com/post/tom-jerry/</link>"));
        assert!(xml.contains("&lt;b&gt;hi&lt;/b&gt;"));
        assert!(xml.contains("<description>Posts &amp; notes</description>"));
    }

    #[test]
    fn atom_lists_the_same_entries() {
        let posts = [post("One", "one", "a"), post("Two", "two", "b")];
        let xml = atom(&site(), &posts);

        assert_eq!(xml.matches("<entry>").count(), 2);
        assert!(xml.contains("<id>https://blog.example.com/post/two/</id>"));
    }

    #[test]
    fn sitemap_prioritises_posts_over_categories_and_pages() {
        let category = Category::new("Rust".into(), String::new(), String::new());
        let xml = sitemap(&site(), &[post("One", "one", "a")], &[category]);

        assert!(xml.contains("<loc>https://blog.example.com/post/one/</loc>"));
        assert!(xml.contains("<priority>0.8</priority>"));
        assert!(xml.contains("<loc>https://blog.example.com/category/rust/</loc>"));
        assert!(xml.contains("<priority>0.5</priority>"));
        assert_eq!(xml.matches("<priority>0.3</priority>").count(), 2);
        assert_eq!(xml.matches("<lastmod>").count(), 1);
    }

    #[test]
    fn robots_points_at_the_sitemap() {
        assert!(robots(&site()).contains("Sitemap: https://blog.example.com/sitemap.xml"));
    }
}
