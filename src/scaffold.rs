use std::{fs, path::PathBuf};

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use handlebars::Handlebars;
use log::info;
use serde_json::json;

use crate::{date::format_date, settings::Settings};

const POST_TEMPLATE: &str = "---
title: {{title}}
description:
created: {{created}}
updated: {{created}}
coverImagePath:
tags:
---

{{body}}
";

fn render_post(title: &str, now: &DateTime<Utc>) -> anyhow::Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    let data = json!({
        // a JSON string is a valid YAML scalar whatever the title contains
        "title": serde_json::to_string(title)?,
        "created": now.format("%Y-%m-%d %H:%M:%S").to_string(),
        "body": if title.is_empty() { String::new() } else { format!("# {title}") },
    });
    handlebars
        .render_template(POST_TEMPLATE, &data)
        .context("while rendering the new post")
}

/// Writes an empty Markdown post named `<date> <title>.md` into the input
/// directory and returns its path.
pub(crate) fn new_post(settings: &Settings, title: &str) -> anyhow::Result<PathBuf> {
    new_post_at(settings, title, &Utc::now())
}

fn new_post_at(settings: &Settings, title: &str, now: &DateTime<Utc>) -> anyhow::Result<PathBuf> {
    let title = title.trim();
    let date = format_date(now, &settings.date_format);
    let name = if title.is_empty() {
        format!("{date}.md")
    } else {
        format!("{date} {title}.md")
    };
    let path = settings.input_directory.join(name.replace(['/', '\\'], "-"));
    if path.exists() {
        bail!("{path:?} already exists");
    }

    fs::create_dir_all(&settings.input_directory)
        .with_context(|| format!("failed to create {:?}", settings.input_directory))?;
    fs::write(&path, render_post(title, now)?)
        .with_context(|| format!("failed to write {path:?}"))?;
    info!("Created {path:?}");
    Ok(path)
}
