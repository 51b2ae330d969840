use std::{
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use anyhow::{bail, Context};
use regex::Regex;

use crate::{
    date::{strip_date, strip_path_date, SEPARATORS},
    metadata::Article,
    resources,
    settings::Settings,
};

static UNSAFE_CHARS: OnceLock<Regex> = OnceLock::new();

fn unsafe_chars() -> &'static Regex {
    UNSAFE_CHARS.get_or_init(|| Regex::new(r"[^a-zA-Z0-9/\\. ]+").unwrap())
}

/// Works out where `article` is written and what it links to, copies the
/// files it depends on, and fills in path-derived tags.
///
/// The article's title, tags, `link_to_self` and `link_to_save` are updated.
/// Any failure leaves the links unset and is meant to skip only this article.
pub(crate) fn resolve(settings: &Settings, article: &mut Article) -> anyhow::Result<()> {
    let relative = article
        .original_path
        .strip_prefix(&settings.input_directory)
        .with_context(|| {
            format!(
                "{:?} is not inside {:?}",
                article.original_path, settings.input_directory
            )
        })?
        .to_path_buf();

    if !settings.keep_date_in_titles {
        let title = strip_date(&article.title);
        if !title.is_empty() {
            article.title = title;
        }
    }

    if !settings.ignore_tags_from_paths {
        for tag in derive_path_tags(&relative) {
            article.add_tag(&tag);
        }
    }

    let link = output_link(settings, &relative)?;
    let save_path = settings.output_directory.join(&link);
    let dest_dir = save_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| settings.output_directory.clone());
    fs::create_dir_all(&dest_dir)
        .with_context(|| format!("failed to create directory {dest_dir:?}"))?;

    let source_dir = article
        .original_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    if article.is_page() && source_dir != settings.input_directory {
        resources::copy_page_tree(&source_dir, &dest_dir)
            .with_context(|| format!("while copying page directory {source_dir:?}"))?;
    }
    if !article.cover_image_path.is_empty() && !article.is_page() {
        resources::copy_cover_image(
            &source_dir,
            &settings.output_directory,
            &article.cover_image_path,
        )?;
    }
    resources::copy_resources(&article.html_content, &source_dir, &dest_dir)
        .with_context(|| format!("while copying resources of {:?}", article.original_path))?;

    article.link_to_self = link;
    article.link_to_save = save_path;
    Ok(())
}

/// Tags from the directory names between the input root and the file.
pub(crate) fn derive_path_tags(relative: &Path) -> Vec<String> {
    let relative = relative.to_string_lossy().replace('\\', "/");
    let stripped = strip_path_date(&relative);
    let mut segments: Vec<&str> = stripped
        .split('/')
        .map(|s| s.trim_matches(SEPARATORS))
        .collect();
    // the file itself
    segments.pop();
    segments
        .into_iter()
        .filter(|s| !matches!(*s, "" | "." | ".."))
        .map(str::to_string)
        .collect()
}

/// Output-root-relative slug of the page generated for `relative`,
/// e.g. `blog/2023-05-11 My Post.md` -> `blog/My-Post/index.html`.
fn output_link(settings: &Settings, relative: &Path) -> anyhow::Result<String> {
    let candidate: PathBuf = relative.with_extension("").join(&settings.index_name);
    let mut candidate = candidate.to_string_lossy().replace('\\', "/");

    if !settings.keep_date_in_paths {
        let stripped = strip_path_date(&candidate);
        // a date spanning a directory boundary would leave an empty segment
        if !(stripped.contains("//") || stripped.starts_with('/')) {
            candidate = stripped;
        }
    }

    let link = sanitize_path(&candidate);
    if !link.contains('/') {
        bail!("cannot derive an output path for {relative:?}");
    }
    Ok(link)
}

/// Reduces a path to URL-safe characters, one `/` between segments and
/// hyphens instead of whitespace.
pub(crate) fn sanitize_path(path: &str) -> String {
    let cleaned = unsafe_chars().replace_all(path, "").replace('\\', "/");
    let joined = cleaned
        .split('/')
        .map(|segment| segment.trim_matches(SEPARATORS))
        .filter(|segment| !matches!(*segment, "" | "." | ".."))
        .collect::<Vec<_>>()
        .join("/");
    joined
        .split_whitespace()
        .map(|piece| piece.trim_matches(SEPARATORS))
        .collect::<Vec<_>>()
        .join("-")
        .trim_matches('-')
        .to_string()
}
