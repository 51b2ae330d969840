use std::borrow::Borrow;

use maud::html;
use url::form_urlencoded;

use crate::{
    metadata::Article,
    settings::{Settings, SortKey},
};

pub(super) fn sort_articles<T: Borrow<Article>>(articles: &mut [T], key: SortKey) {
    articles.sort_by(|a, b| {
        let (a, b) = (a.borrow(), b.borrow());
        match key {
            SortKey::DateCreated => b.created.cmp(&a.created),
            SortKey::ReverseDateCreated => a.created.cmp(&b.created),
            SortKey::DateUpdated => b.updated.cmp(&a.updated),
            SortKey::ReverseDateUpdated => a.updated.cmp(&b.updated),
            SortKey::Title => a.title.cmp(&b.title),
            SortKey::ReverseTitle => b.title.cmp(&a.title),
            SortKey::Path => a.original_path.cmp(&b.original_path),
            SortKey::ReversePath => b.original_path.cmp(&a.original_path),
        }
    });
}

const REMOVED_FROM_CONTENT: &[char] = &[
    '\n', '\r', '\t', '(', ')', '[', ']', '{', '}', '"', '\\', '/', '”', '“', '#', '-', '*',
];

/// Search tokens of an article's plain text.
pub(super) fn clean_content(text: &str) -> Vec<String> {
    text.replace('’', "'")
        .replace('–', " ")
        .replace(REMOVED_FROM_CONTENT, " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Prefix leading from a page at `link` back to the output root.
pub(super) fn relative_root(link: &str) -> String {
    "../".repeat(link.matches('/').count())
}

fn encode(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

fn mention(title: &str, handle: Option<&String>, prefix: &str) -> String {
    match handle.map(|h| h.trim().trim_start_matches('@')) {
        Some(h) if !h.is_empty() => format!("{title} {prefix}@{h}"),
        _ => title.to_string(),
    }
}

/// Share links of an index entry.
pub(super) fn share_links(settings: &Settings, article: &Article) -> String {
    let url = settings.url_for(&article.link_to_self);
    let social = &settings.social;
    let x_text = mention(&article.title, social.x.as_ref(), "via ");
    let bluesky_text = mention(&article.title, social.bluesky.as_ref(), "by ");
    let threads_text = mention(&article.title, social.threads.as_ref(), "by ");
    let mastodon_text = mention(&article.title, social.mastodon.as_ref(), "by ");

    html! {
        p.share {
            a href={ "https://x.com/intent/tweet?text=" (encode(&x_text)) "&url=" (encode(&url)) }
                target="_blank" rel="noopener" { "X" }
            a href={ "https://bsky.app/intent/compose?text=" (encode(&format!("{bluesky_text} {url}"))) }
                target="_blank" rel="noopener" { "Bluesky" }
            a href={ "https://www.threads.net/intent/post?text=" (encode(&format!("{threads_text} {url}"))) }
                target="_blank" rel="noopener" { "Threads" }
            a href={ "https://mastodonshare.com/?text=" (encode(&mastodon_text)) "&url=" (encode(&url)) }
                target="_blank" rel="noopener" { "Mastodon" }
        }
    }
    .into()
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;

    use crate::metadata::SourceKind;

    pub(in crate::generator) fn article(title: &str, created_year: i32, tags: &[&str]) -> Article {
        let created = Utc.with_ymd_and_hms(created_year, 1, 1, 0, 0, 0).unwrap();
        Article {
            title: title.to_string(),
            description: format!("about {title}"),
            cover_image_path: String::new(),
            created,
            updated: created,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            text_content: format!("text of {title}"),
            html_content: String::new(),
            original_path: PathBuf::from(format!("content/{title}.md")),
            link_to_self: format!("{title}/index.html"),
            link_to_save: PathBuf::new(),
            kind: SourceKind::Markdown,
        }
    }

    fn years(articles: &[Article]) -> Vec<String> {
        articles
            .iter()
            .map(|a| a.created.format("%Y").to_string())
            .collect()
    }

    #[test]
    fn test_sort_articles() {
        let mut articles = vec![
            article("b", 2021, &[]),
            article("c", 2022, &[]),
            article("a", 2020, &[]),
        ];

        sort_articles(&mut articles, SortKey::DateCreated);
        assert_eq!(years(&articles), vec!["2022", "2021", "2020"]);

        sort_articles(&mut articles, SortKey::ReverseDateCreated);
        assert_eq!(years(&articles), vec!["2020", "2021", "2022"]);

        sort_articles(&mut articles, SortKey::Title);
        assert_eq!(years(&articles), vec!["2020", "2021", "2022"]);

        let mut refs: Vec<&Article> = articles.iter().collect();
        sort_articles(&mut refs, SortKey::ReversePath);
        assert_eq!(refs[0].title, "c");
    }

    #[test]
    fn test_clean_content() {
        assert_eq!(
            clean_content("It’s a (small)\n[test] – see \"this\"/#tag *bold*"),
            vec!["It's", "a", "small", "test", "see", "this", "tag", "bold"]
        );
        assert!(clean_content(" \n\t").is_empty());
    }

    #[test]
    fn test_relative_root() {
        assert_eq!(relative_root("index.html"), "");
        assert_eq!(relative_root("post/index.html"), "../");
        assert_eq!(relative_root("blog/post/index.html"), "../../");
    }

    #[test]
    fn test_share_links() {
        let mut settings = Settings {
            base_url: "https://example.com".to_string(),
            ..Settings::default()
        };
        settings.social.x = Some("@me".to_string());
        let post = article("hello world", 2021, &[]);

        let html = share_links(&settings, &post);
        assert!(html.contains(
            "https://x.com/intent/tweet?text=hello+world+via+%40me&amp;url=https%3A%2F%2Fexample.com%2Fhello+world%2Findex.html"
        ));
        assert!(html.contains(">Mastodon</a>"));
    }
}
