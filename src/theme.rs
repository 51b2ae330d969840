use std::{fs, path::Path, str::FromStr};

use anyhow::{bail, Context};
use log::info;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Style {
    #[default]
    Default,
    Dark,
    Colorful,
}

impl Style {
    pub const NAMES: [&'static str; 3] = ["default", "dark", "colorful"];
}

impl FromStr for Style {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "default" => Style::Default,
            "dark" => Style::Dark,
            "colorful" => Style::Colorful,
            other => bail!("unknown style: {other}"),
        })
    }
}

/// Colors fed into `style.css.hbs`.
#[derive(Serialize, Debug, Clone)]
pub(crate) struct Palette {
    pub background: String,
    pub surface: String,
    pub text: String,
    pub muted: String,
    pub accent: String,
    pub tag_on: String,
    pub tag_off: String,
}

impl Palette {
    fn new(colors: [&str; 7]) -> Self {
        let [background, surface, text, muted, accent, tag_on, tag_off] = colors.map(String::from);
        Self {
            background,
            surface,
            text,
            muted,
            accent,
            tag_on,
            tag_off,
        }
    }

    pub fn for_style(style: Style) -> Self {
        match style {
            Style::Default => Palette::new([
                "#fdfdfd", "#f1f1f1", "#222222", "#6b6b6b", "#1f5fa8", "#1f5fa8", "#c9c9c9",
            ]),
            Style::Dark => Palette::new([
                "#16181c", "#22252b", "#e4e4e4", "#9a9a9a", "#7fb4ff", "#3d6fb3", "#3a3d44",
            ]),
            Style::Colorful => Palette::new([
                "#fff8ef", "#ffe8cc", "#2b1d0e", "#7a5c3b", "#d1495b", "#00798c", "#edae49",
            ]),
        }
    }
}

/// Handlebars sources for every generated artifact.
#[derive(Debug, Clone)]
pub(crate) struct Templates {
    pub layout: String,
    pub article: String,
    pub index: String,
    pub rss: String,
    pub style: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            layout: include_str!("../templates/layout.hbs").to_string(),
            article: include_str!("../templates/article.hbs").to_string(),
            index: include_str!("../templates/index.hbs").to_string(),
            rss: include_str!("../templates/rss.hbs").to_string(),
            style: include_str!("../templates/style.css.hbs").to_string(),
        }
    }
}

/// Look of a site: a palette plus the templates rendering it.
#[derive(Debug, Clone)]
pub(crate) struct Theme {
    pub style: Style,
    pub palette: Palette,
    pub templates: Templates,
}

impl Theme {
    pub fn builtin(style: Style) -> Self {
        Self {
            style,
            palette: Palette::for_style(style),
            templates: Templates::default(),
        }
    }

    /// Replaces the built-in templates with the ones found in `dir`.
    /// Missing files keep their built-in version.
    pub fn with_template_dir(mut self, dir: &Path) -> anyhow::Result<Self> {
        if !dir.is_dir() {
            bail!("template_dir must be a directory.");
        }
        let slots = [
            ("layout.hbs", &mut self.templates.layout),
            ("article.hbs", &mut self.templates.article),
            ("index.hbs", &mut self.templates.index),
            ("rss.hbs", &mut self.templates.rss),
            ("style.css.hbs", &mut self.templates.style),
        ];
        for (name, slot) in slots {
            let path = dir.join(name);
            if path.is_file() {
                *slot = fs::read_to_string(&path).with_context(|| format!("{path:?}"))?;
                info!("Using template {path:?}");
            }
        }
        Ok(self)
    }
}
