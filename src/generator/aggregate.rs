use std::{fs, path::Path};

use anyhow::Context;
use chrono::Utc;
use log::info;

use crate::{
    date::format_date,
    metadata::Article,
    renderer::Renderer,
    settings::{Settings, SortKey},
};

use super::{
    data::{IndexEntry, IndexPageData, RssData, RssItem, SearchRecord},
    utils::{clean_content, share_links, sort_articles},
};

pub(super) const RSS_NAME: &str = "rss.xml";
pub(super) const SEARCH_INDEX_NAME: &str = "search_index.json";

// RFC 1123 with a numeric zone
const RSS_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Articles split into standalone pages and timeline entries.
pub(super) struct Partition<'a> {
    pub pages: Vec<&'a Article>,
    pub articles: Vec<&'a Article>,
    /// Sorted union of the timeline entries' tags.
    pub all_tags: Vec<&'a str>,
}

pub(super) fn partition(articles: &[Article]) -> Partition<'_> {
    let mut pages = vec![];
    let mut entries = vec![];
    let mut all_tags: Vec<&str> = vec![];
    for article in articles {
        if article.is_page() {
            pages.push(article);
            continue;
        }
        for tag in article.tags.iter() {
            if !all_tags.contains(&tag.as_str()) {
                all_tags.push(tag);
            }
        }
        entries.push(article);
    }
    all_tags.sort_unstable();

    Partition {
        pages,
        articles: entries,
        all_tags,
    }
}

fn write(path: &Path, content: &str) -> anyhow::Result<()> {
    fs::write(path, content).with_context(|| format!("failed to write {path:?}"))?;
    info!("Wrote {path:?}");
    Ok(())
}

pub(super) fn render_index(
    articles: &[Article],
    settings: &Settings,
    renderer: &Renderer,
) -> anyhow::Result<String> {
    let Partition {
        mut pages,
        articles: mut entries,
        all_tags,
    } = partition(articles);
    sort_articles(&mut pages, SortKey::Title);
    sort_articles(&mut entries, settings.sort_by);

    let data = IndexPageData {
        site: settings,
        root: "",
        title: &settings.title,
        description: &settings.description,
        pages,
        all_tags,
        articles: entries
            .into_iter()
            .map(|article| IndexEntry {
                article,
                created: format_date(&article.created, &settings.date_format),
                updated: format_date(&article.updated, &settings.date_format),
                share: share_links(settings, article),
            })
            .collect(),
    };
    renderer
        .render("index", &data)
        .context("while generating the index page")
}

pub(super) fn generate_index(
    articles: &[Article],
    settings: &Settings,
    renderer: &Renderer,
) -> anyhow::Result<()> {
    let html = render_index(articles, settings, renderer)?;
    write(&settings.output_directory.join(&settings.index_name), &html)
}

fn image_type(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        _ => "image/jpeg",
    }
}

pub(super) fn render_rss(
    articles: &[Article],
    settings: &Settings,
    renderer: &Renderer,
) -> anyhow::Result<String> {
    let mut entries = partition(articles).articles;
    // the feed is always newest first
    entries.sort_by(|a, b| b.created.cmp(&a.created));

    let items = entries
        .into_iter()
        .map(|article| {
            let cover = article.cover_image_path.as_str();
            RssItem {
                title: &article.title,
                url: settings.url_for(&article.link_to_self),
                pub_date: article.created.format(RSS_DATE_FORMAT).to_string(),
                description: &article.description,
                cover_url: (!cover.is_empty()).then(|| settings.url_for(cover)),
                cover_type: image_type(cover),
                tags: &article.tags,
            }
        })
        .collect();

    let data = RssData {
        site: settings,
        feed_url: settings.url_for(RSS_NAME),
        build_date: Utc::now().format(RSS_DATE_FORMAT).to_string(),
        items,
    };
    renderer.render("rss", &data).context("while generating the RSS feed")
}

pub(super) fn generate_rss(
    articles: &[Article],
    settings: &Settings,
    renderer: &Renderer,
) -> anyhow::Result<()> {
    let xml = render_rss(articles, settings, renderer)?;
    write(&settings.output_directory.join(RSS_NAME), &xml)
}

pub(super) fn search_records(articles: &[Article]) -> Vec<SearchRecord<'_>> {
    partition(articles)
        .articles
        .into_iter()
        .map(|article| SearchRecord {
            title: &article.title,
            content: clean_content(&article.text_content),
            description: &article.description,
            tags: &article.tags,
            url: &article.link_to_self,
        })
        .collect()
}

pub(super) fn generate_search_index(articles: &[Article], settings: &Settings) -> anyhow::Result<()> {
    let json = serde_json::to_string(&search_records(articles))
        .context("failed to serialize the search index")?;
    write(&settings.output_directory.join(SEARCH_INDEX_NAME), &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        generator::utils::tests::article,
        theme::{Style, Theme},
    };

    fn sample() -> Vec<Article> {
        let mut cover = article("middle", 2021, &["rust", "notes"]);
        cover.cover_image_path = "img/cover.png".to_string();
        cover.description = "<b>bold</b> claim".to_string();
        vec![
            cover,
            article("newest", 2022, &["life"]),
            article("About me", 2019, &["PAGE", "secret"]),
            article("oldest", 2020, &["rust"]),
        ]
    }

    fn renderer() -> Renderer {
        Renderer::new(&Theme::builtin(Style::Default)).unwrap()
    }

    #[test]
    fn test_partition_excludes_pages() {
        let articles = sample();
        let partition = partition(&articles);

        assert_eq!(partition.pages.len(), 1);
        assert_eq!(partition.pages[0].title, "About me");
        assert_eq!(partition.articles.len(), 3);
        assert_eq!(partition.all_tags, vec!["life", "notes", "rust"]);
    }

    #[test]
    fn test_render_index() {
        let articles = sample();
        let settings = Settings {
            sort_by: SortKey::ReverseDateCreated,
            ..Settings::default()
        };

        let html = render_index(&articles, &settings, &renderer()).unwrap();
        assert_eq!(html.matches("class=\"detail\"").count(), 3);
        // pages only show up as navigation
        assert!(html.contains(r#"<a href="About me/index.html">About me</a>"#));
        assert!(!html.contains("secret"));

        let oldest = html.find("oldest").unwrap();
        let middle = html.find("middle").unwrap();
        let newest = html.find("newest").unwrap();
        assert!(oldest < middle && middle < newest);
        assert!(html.contains("2021 01 01"));
        assert!(html.contains(r#"src="img/cover.png""#));
    }

    #[test]
    fn test_render_rss() {
        let articles = sample();
        let settings = Settings {
            base_url: "https://example.com/".to_string(),
            sort_by: SortKey::Title,
            ..Settings::default()
        };

        let xml = render_rss(&articles, &settings, &renderer()).unwrap();
        assert_eq!(xml.matches("<item>").count(), 3);
        assert!(!xml.contains("About me"));

        let newest = xml.find("<title>newest</title>").unwrap();
        let middle = xml.find("<title>middle</title>").unwrap();
        let oldest = xml.find("<title>oldest</title>").unwrap();
        assert!(newest < middle && middle < oldest);

        assert!(xml.contains("<link>https://example.com/newest/index.html</link>"));
        assert!(xml.contains("<pubDate>Sat, 01 Jan 2022 00:00:00 +0000</pubDate>"));
        assert!(xml.contains("&lt;b&gt;bold&lt;/b&gt; claim"));
        assert!(xml.contains(
            r#"<media:content url="https://example.com/img/cover.png" medium="image" type="image/png" />"#
        ));
        assert!(xml.contains("<category>notes</category>"));
    }

    #[test]
    fn test_search_records() {
        let articles = sample();
        let records = search_records(&articles);

        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.title != "About me"));
        assert_eq!(records[1].content, vec!["text", "of", "newest"]);
        assert_eq!(records[1].url, "newest/index.html");

        let json = serde_json::to_value(&records).unwrap();
        assert_eq!(json[0]["tags"], serde_json::json!(["rust", "notes"]));
    }
}
