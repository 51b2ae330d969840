use anyhow::Context;
use handlebars::{handlebars_helper, Handlebars};
use serde::Serialize;

use crate::theme::{Palette, Theme};

handlebars_helper!(join: |lst: array, sep: str| {
    lst.iter()
        .filter_map(|v| v.as_str())
        .collect::<Vec<_>>()
        .join(sep)
});
handlebars_helper!(contains: |lst: array, item: str| lst.iter().any(|v| v.as_str() == Some(item)));

#[derive(Serialize)]
struct StyleData<'a> {
    palette: &'a Palette,
}

/// Compiled templates of a [`Theme`].
pub(crate) struct Renderer {
    handlebars: Handlebars<'static>,
    palette: Palette,
}

impl Renderer {
    pub fn new(theme: &Theme) -> anyhow::Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_helper("join", Box::new(join));
        handlebars.register_helper("contains", Box::new(contains));
        handlebars
            .register_partial("layout", &theme.templates.layout)
            .context("layout.hbs")?;
        handlebars
            .register_template_string("article", &theme.templates.article)
            .context("article.hbs")?;
        handlebars
            .register_template_string("index", &theme.templates.index)
            .context("index.hbs")?;
        handlebars
            .register_template_string("rss", &theme.templates.rss)
            .context("rss.hbs")?;
        handlebars
            .register_template_string("style", &theme.templates.style)
            .context("style.css.hbs")?;

        Ok(Self {
            handlebars,
            palette: theme.palette.clone(),
        })
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> anyhow::Result<String> {
        self.handlebars
            .render(name, data)
            .with_context(|| format!("while rendering {name}"))
    }

    pub fn render_style(&self) -> anyhow::Result<String> {
        self.render(
            "style",
            &StyleData {
                palette: &self.palette,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Style;
    use serde_json::json;

    #[test]
    fn test_helpers() {
        let mut theme = Theme::builtin(Style::Default);
        theme.templates.index =
            r#"{{join tags ", "}}|{{#if (contains tags "b")}}yes{{/if}}"#.to_string();
        let renderer = Renderer::new(&theme).unwrap();

        let out = renderer
            .render("index", &json!({ "tags": ["a", "b"] }))
            .unwrap();
        assert_eq!(out, "a, b|yes");
    }

    #[test]
    fn test_style_uses_palette() {
        let renderer = Renderer::new(&Theme::builtin(Style::Dark)).unwrap();
        let css = renderer.render_style().unwrap();
        assert!(css.contains("--background: #16181c;"));
    }

    #[test]
    fn test_broken_template_is_an_error() {
        let mut theme = Theme::builtin(Style::Default);
        theme.templates.article = "{{#if title}}never closed".to_string();
        assert!(Renderer::new(&theme).is_err());
    }
}
