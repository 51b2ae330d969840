use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Tag marking an article as a standalone page instead of a timeline entry.
pub(crate) const PAGE_TAG: &str = "PAGE";

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SourceKind {
    Markdown,
    Html,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "md" => Some(SourceKind::Markdown),
            "html" => Some(SourceKind::Html),
            _ => None,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub(crate) struct Article {
    pub title: String,
    pub description: String,
    pub cover_image_path: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub tags: Vec<String>,

    #[serde(skip_serializing)]
    pub text_content: String,
    /// Body HTML after parsing, full page HTML after rendering.
    #[serde(skip_serializing)]
    pub html_content: String,

    pub original_path: PathBuf,
    pub link_to_self: String,
    #[serde(skip_serializing)]
    pub link_to_save: PathBuf,

    pub kind: SourceKind,
}

impl Article {
    pub fn is_page(&self) -> bool {
        self.tags.iter().any(|t| t == PAGE_TAG)
    }

    /// Appends `tag` unless it is blank or already present.
    pub fn add_tag(&mut self, tag: &str) {
        let tag = tag.trim();
        if !tag.is_empty() && !self.tags.iter().any(|t| t == tag) {
            self.tags.push(tag.to_string());
        }
    }
}

/// Splits a `,`/`;` separated tag list, trimming every entry.
pub(crate) fn split_tags(s: &str) -> Vec<String> {
    let mut tags: Vec<String> = vec![];
    for tag in s.split([',', ';']).map(str::trim) {
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}
