use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use log::{info, warn};
use walkdir::WalkDir;

use crate::{
    date::format_date,
    metadata::{Article, SourceKind},
    parser, path,
    renderer::Renderer,
    settings::Settings,
    theme::Theme,
};

mod aggregate;
mod data;
mod utils;

use data::ArticlePageData;

const SCRIPT_JS: &str = include_str!("../assets/script.js");
const SEARCH_JS: &str = include_str!("../assets/search.js");
const FAVICON: &[u8] = include_bytes!("../assets/favicon.ico");

fn render_article(
    article: &Article,
    settings: &Settings,
    renderer: &Renderer,
) -> anyhow::Result<String> {
    let root = utils::relative_root(&article.link_to_self);
    let cover_image = (!article.cover_image_path.is_empty())
        .then(|| format!("{root}{}", article.cover_image_path));
    let data = ArticlePageData {
        site: settings,
        title: &article.title,
        description: &article.description,
        tags: &article.tags,
        created: format_date(&article.created, &settings.date_format),
        updated: format_date(&article.updated, &settings.date_format),
        cover_image,
        is_page: article.is_page(),
        body: &article.html_content,
        root,
    };
    renderer
        .render("article", &data)
        .with_context(|| format!("while generating from {:?}", article.original_path))
}

/// Turns one source file into a written page.
///
/// Nothing is written when any step fails.
pub(crate) fn process(
    source: &Path,
    settings: &Settings,
    renderer: &Renderer,
) -> anyhow::Result<Article> {
    let mut article = parser::parse(source)?;
    path::resolve(settings, &mut article)?;

    // HTML sources already are complete documents
    if article.kind == SourceKind::Markdown {
        article.html_content = render_article(&article, settings, renderer)?;
    }

    fs::write(&article.link_to_save, &article.html_content)
        .with_context(|| format!("failed to write {:?}", article.link_to_save))?;
    Ok(article)
}

fn collect_sources(settings: &Settings) -> anyhow::Result<Vec<PathBuf>> {
    let mut sources = vec![];
    let walker = WalkDir::new(&settings.input_directory)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.path() != settings.output_directory);
    for entry in walker {
        let entry = entry
            .with_context(|| format!("failed to walk {:?}", settings.input_directory))?;
        if entry.file_type().is_dir() {
            continue;
        }
        if SourceKind::from_path(entry.path()).is_some() {
            sources.push(entry.into_path());
        }
    }
    Ok(sources)
}

fn reset_output_directory(settings: &Settings) -> anyhow::Result<()> {
    let out_dir = &settings.output_directory;
    if let (Ok(input), Ok(output)) = (
        settings.input_directory.canonicalize(),
        out_dir.canonicalize(),
    ) {
        if input.starts_with(&output) {
            bail!("clearing {out_dir:?} would delete the sources in {input:?}");
        }
    }
    fs_extra::dir::remove(out_dir).with_context(|| format!("failed to clear {out_dir:?}"))?;
    fs_extra::dir::create_all(out_dir, false)
        .with_context(|| format!("failed to create {out_dir:?}"))?;
    Ok(())
}

fn copy_or_write(
    custom: Option<&PathBuf>,
    dest: &Path,
    builtin: impl FnOnce() -> anyhow::Result<Vec<u8>>,
) -> anyhow::Result<()> {
    match custom {
        Some(custom) => {
            fs::copy(custom, dest)
                .with_context(|| format!("failed to copy {custom:?} to {dest:?}"))?;
        }
        None => {
            fs::write(dest, builtin()?).with_context(|| format!("failed to write {dest:?}"))?;
        }
    }
    Ok(())
}

fn write_assets(settings: &Settings, renderer: &Renderer) -> anyhow::Result<()> {
    let out_dir = &settings.output_directory;
    copy_or_write(settings.css_path.as_ref(), &out_dir.join("style.css"), || {
        renderer.render_style().map(String::into_bytes)
    })?;
    copy_or_write(settings.js_path.as_ref(), &out_dir.join("script.js"), || {
        Ok(SCRIPT_JS.as_bytes().to_vec())
    })?;
    copy_or_write(
        settings.favicon_path.as_ref(),
        &out_dir.join("favicon.ico"),
        || Ok(FAVICON.to_vec()),
    )?;
    fs::write(out_dir.join("search.js"), SEARCH_JS).context("failed to write search.js")?;
    Ok(())
}

/// Regenerates the whole site from scratch.
///
/// A source file that fails is reported and left out; anything that would
/// leave the site half-built aborts the build instead.
pub(crate) fn build(settings: &Settings, theme: &Theme) -> anyhow::Result<Vec<Article>> {
    let renderer = Renderer::new(theme)?;
    info!(
        "Building {:?} into {:?}",
        settings.input_directory, settings.output_directory
    );

    reset_output_directory(settings)?;

    let mut articles = vec![];
    for source in collect_sources(settings)? {
        match process(&source, settings, &renderer) {
            Ok(article) => articles.push(article),
            Err(e) => warn!("Skipping {source:?}: {e:#}"),
        }
    }

    aggregate::generate_index(&articles, settings, &renderer)?;
    aggregate::generate_rss(&articles, settings, &renderer)?;
    aggregate::generate_search_index(&articles, settings)?;
    write_assets(settings, &renderer)?;

    info!("Blog generated successfully! ({} articles)", articles.len());
    Ok(articles)
}
