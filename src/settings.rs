use std::{fmt, path::PathBuf, str::FromStr};

use anyhow::bail;
use serde::Serialize;

/// Ordering of the article list on the index page.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum SortKey {
    #[default]
    DateCreated,
    ReverseDateCreated,
    DateUpdated,
    ReverseDateUpdated,
    Title,
    ReverseTitle,
    Path,
    ReversePath,
}

impl SortKey {
    pub const NAMES: [&'static str; 8] = [
        "date-created",
        "reverse-date-created",
        "date-updated",
        "reverse-date-updated",
        "title",
        "reverse-title",
        "path",
        "reverse-path",
    ];
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "date-created" => SortKey::DateCreated,
            "reverse-date-created" => SortKey::ReverseDateCreated,
            "date-updated" => SortKey::DateUpdated,
            "reverse-date-updated" => SortKey::ReverseDateUpdated,
            "title" => SortKey::Title,
            "reverse-title" => SortKey::ReverseTitle,
            "path" => SortKey::Path,
            "reverse-path" => SortKey::ReversePath,
            other => bail!("unknown sort key: {other}"),
        })
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let idx = *self as usize;
        f.write_str(Self::NAMES[idx])
    }
}

#[derive(Serialize, Debug, Clone, Default)]
pub(crate) struct SocialHandles {
    pub x: Option<String>,
    pub bluesky: Option<String>,
    pub threads: Option<String>,
    pub mastodon: Option<String>,
}

/// Everything a build needs to know. Filled once by the command line layer
/// and only ever read afterwards.
#[derive(Serialize, Debug, Clone)]
pub(crate) struct Settings {
    pub title: String,
    pub description: String,
    pub input_directory: PathBuf,
    pub output_directory: PathBuf,
    /// chrono strftime format used for the dates shown on pages
    pub date_format: String,
    pub index_name: String,
    pub base_url: String,
    pub sort_by: SortKey,

    pub keep_date_in_titles: bool,
    pub keep_date_in_paths: bool,
    pub ignore_tags_from_paths: bool,

    pub social: SocialHandles,

    pub css_path: Option<PathBuf>,
    pub js_path: Option<PathBuf>,
    pub favicon_path: Option<PathBuf>,
    pub elements_top: String,
    pub elements_bottom: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            description: "This is my blog".to_string(),
            input_directory: PathBuf::from("content"),
            output_directory: PathBuf::from("public"),
            date_format: "%Y %m %d".to_string(),
            index_name: "index.html".to_string(),
            base_url: "http://localhost:666".to_string(),
            sort_by: SortKey::default(),
            keep_date_in_titles: false,
            keep_date_in_paths: false,
            ignore_tags_from_paths: false,
            social: SocialHandles::default(),
            css_path: None,
            js_path: None,
            favicon_path: None,
            elements_top: String::new(),
            elements_bottom: String::new(),
        }
    }
}

impl Settings {
    /// Absolute URL of something living at `link` under the output root.
    pub fn url_for(&self, link: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            link.trim_start_matches('/')
        )
    }
}
