use serde::Serialize;

use crate::{metadata::Article, settings::Settings};

#[derive(Serialize, Debug)]
pub(super) struct ArticlePageData<'a> {
    pub site: &'a Settings,
    pub root: String,
    pub title: &'a str,
    pub description: &'a str,
    pub tags: &'a [String],
    pub created: String,
    pub updated: String,
    pub cover_image: Option<String>,
    pub is_page: bool,
    pub body: &'a str,
}

#[derive(Serialize, Debug)]
pub(super) struct IndexEntry<'a> {
    pub article: &'a Article,
    pub created: String,
    pub updated: String,
    pub share: String,
}

#[derive(Serialize, Debug)]
pub(super) struct IndexPageData<'a> {
    pub site: &'a Settings,
    pub root: &'static str,
    pub title: &'a str,
    pub description: &'a str,
    pub pages: Vec<&'a Article>,
    pub all_tags: Vec<&'a str>,
    pub articles: Vec<IndexEntry<'a>>,
}

#[derive(Serialize, Debug)]
pub(super) struct RssItem<'a> {
    pub title: &'a str,
    pub url: String,
    pub pub_date: String,
    pub description: &'a str,
    pub cover_url: Option<String>,
    pub cover_type: &'static str,
    pub tags: &'a [String],
}

#[derive(Serialize, Debug)]
pub(super) struct RssData<'a> {
    pub site: &'a Settings,
    pub feed_url: String,
    pub build_date: String,
    pub items: Vec<RssItem<'a>>,
}

/// One entry of `search_index.json`.
#[derive(Serialize, Debug)]
pub(super) struct SearchRecord<'a> {
    pub title: &'a str,
    pub content: Vec<String>,
    pub description: &'a str,
    pub tags: &'a [String],
    pub url: &'a str,
}
