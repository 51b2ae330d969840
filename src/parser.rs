use std::{fs, path::Path};

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};

use crate::{
    date::extract_date_time,
    metadata::{split_tags, Article, SourceKind},
};

mod frontmatter;

use frontmatter::{Frontmatter, RawDate, RawTags};

/// Reads one source file into a partially populated [`Article`].
/// Output links are left empty; they belong to path resolution.
pub(crate) fn parse(path: &Path) -> anyhow::Result<Article> {
    match SourceKind::from_path(path) {
        Some(SourceKind::Markdown) => parse_markdown(path),
        Some(SourceKind::Html) => parse_html(path),
        None => bail!("unsupported file type: {path:?}"),
    }
}

pub(crate) fn parse_markdown(path: &Path) -> anyhow::Result<Article> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {path:?}"))?;
    let converted = markdown_to_html(&content);

    let fm = match converted.frontmatter {
        Some(ref yaml) => frontmatter::decode(yaml)
            .with_context(|| format!("while decoding frontmatter of {path:?}"))?,
        None => Frontmatter::default(),
    };

    Draft {
        title: fm.title.unwrap_or_default(),
        description: fm.description.unwrap_or_default(),
        cover_image_path: fm.cover_image_path.unwrap_or_default(),
        created: fm.created.as_ref().and_then(RawDate::resolve),
        updated: fm.updated.as_ref().and_then(RawDate::resolve),
        tags: fm.tags.map(RawTags::into_tags).unwrap_or_default(),
        text_content: converted.text,
        html_content: converted.body,
    }
    .finish(path, SourceKind::Markdown)
}

pub(crate) fn parse_html(path: &Path) -> anyhow::Result<Article> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {path:?}"))?;
    let page = webpage::HTML::from_string(content.clone(), None)
        .with_context(|| format!("failed to parse HTML {path:?}"))?;

    let mut draft = Draft {
        title: page.title.unwrap_or_default(),
        text_content: page.text_content,
        html_content: content,
        ..Draft::default()
    };

    for (name, value) in page.meta.iter() {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match name.trim().to_lowercase().as_str() {
            "description" => draft.description = value.to_string(),
            "keywords" => draft.tags = split_tags(value),
            "created" => draft.created = extract_date_time(value).map(|dt| dt.and_utc()),
            "updated" => draft.updated = extract_date_time(value).map(|dt| dt.and_utc()),
            "coverimagepath" => draft.cover_image_path = value.to_string(),
            _ => {}
        }
    }

    draft.finish(path, SourceKind::Html)
}

struct Converted {
    frontmatter: Option<String>,
    body: String,
    text: String,
}

/// Converts Markdown to HTML, pulling out the YAML metadata block and
/// collecting the plain text along the way.
fn markdown_to_html(content: &str) -> Converted {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);

    let mut frontmatter: Option<String> = None;
    let mut in_metadata = false;
    let mut text = String::new();

    let parser = Parser::new_ext(content, options).filter_map(|event| match event {
        Event::Start(Tag::MetadataBlock(_)) => {
            in_metadata = true;
            frontmatter.get_or_insert_with(String::new);
            None
        }
        Event::End(TagEnd::MetadataBlock(_)) => {
            in_metadata = false;
            None
        }
        Event::Text(ref t) if in_metadata => {
            frontmatter.get_or_insert_with(String::new).push_str(t);
            None
        }
        Event::Text(ref t) | Event::Code(ref t) => {
            text.push_str(t);
            Some(event)
        }
        Event::SoftBreak
        | Event::HardBreak
        | Event::End(
            TagEnd::Paragraph
            | TagEnd::Heading(_)
            | TagEnd::Item
            | TagEnd::CodeBlock
            | TagEnd::TableCell,
        ) => {
            text.push(' ');
            Some(event)
        }
        _ => Some(event),
    });

    let mut body = String::new();
    html::push_html(&mut body, parser);

    Converted {
        frontmatter,
        body,
        text,
    }
}

/// Metadata as found in the file, before the fallbacks kick in.
#[derive(Default)]
struct Draft {
    title: String,
    description: String,
    cover_image_path: String,
    created: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
    tags: Vec<String>,
    text_content: String,
    html_content: String,
}

impl Draft {
    fn finish(self, path: &Path, kind: SourceKind) -> anyhow::Result<Article> {
        let modified: DateTime<Utc> = fs::metadata(path)
            .and_then(|m| m.modified())
            .map(DateTime::from)
            .with_context(|| format!("failed to get file info of {path:?}"))?;

        // frontmatter, then the path text, then the filesystem
        let created = self
            .created
            .or_else(|| extract_date_time(&path.to_string_lossy()).map(|dt| dt.and_utc()))
            .unwrap_or(modified);
        let updated = self.updated.unwrap_or(modified);

        let title = match self.title.trim() {
            "" => path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default(),
            title => title.to_string(),
        };

        Ok(Article {
            title,
            description: self.description.trim().to_string(),
            cover_image_path: self.cover_image_path.trim().to_string(),
            created,
            updated,
            tags: self.tags,
            text_content: self.text_content,
            html_content: self.html_content,
            original_path: path.to_path_buf(),
            link_to_self: String::new(),
            link_to_save: Default::default(),
            kind,
        })
    }
}
