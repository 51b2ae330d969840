use anyhow::{bail, Context};
use clap::{builder::PossibleValuesParser, command, value_parser, Arg, ArgAction, ArgMatches};
use log::info;
use std::{fs, path::PathBuf};

use settings::{Settings, SocialHandles, SortKey};
use theme::{Style, Theme};

mod date;
mod generator;
mod metadata;
mod parser;
mod path;
mod renderer;
mod resources;
mod scaffold;
mod settings;
mod theme;
mod watch;

fn string_arg(matches: &ArgMatches, id: &str) -> String {
    matches.get_one::<String>(id).cloned().unwrap_or_default()
}

fn path_arg(matches: &ArgMatches, id: &str) -> Option<PathBuf> {
    matches.get_one::<PathBuf>(id).cloned()
}

fn read_fragment(matches: &ArgMatches, id: &str) -> anyhow::Result<String> {
    match path_arg(matches, id) {
        Some(path) => fs::read_to_string(&path).with_context(|| format!("{path:?}")),
        None => Ok(String::new()),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = command!()
        .args(&[
            Arg::new("title")
                .long("title")
                .help("Title of the blog")
                .default_value("Blog"),
            Arg::new("description")
                .long("description")
                .help("Short description shown on the index page and in the feed")
                .default_value("This is my blog"),
            Arg::new("input_path")
                .long("input-path")
                .help("Directory path of the source content")
                .value_parser(value_parser!(PathBuf))
                .default_value("content"),
            Arg::new("output_path")
                .long("output-path")
                .help("Directory path of output. Existing contents will be removed.")
                .value_parser(value_parser!(PathBuf))
                .default_value("public"),
            Arg::new("date_format")
                .long("date-format")
                .help("strftime format of the dates shown on pages")
                .default_value("%Y %m %d"),
            Arg::new("index_name")
                .long("index-name")
                .help("File name of every generated page")
                .default_value("index.html"),
            Arg::new("sort")
                .long("sort")
                .help("Ordering of the articles on the index page")
                .value_parser(PossibleValuesParser::new(SortKey::NAMES))
                .default_value("date-created"),
            Arg::new("base_url")
                .long("base-url")
                .env("BLOG_BASE_URL")
                .help("Absolute URL the site is published at, used by the feed and share links")
                .default_value("http://localhost:666"),
            Arg::new("keep_date_in_titles")
                .long("keep-date-in-titles")
                .help("Do not remove dates from titles")
                .action(ArgAction::SetTrue),
            Arg::new("keep_date_in_paths")
                .long("keep-date-in-paths")
                .help("Do not remove dates from output paths")
                .action(ArgAction::SetTrue),
            Arg::new("ignore_tags_from_paths")
                .long("ignore-tags-from-paths")
                .help("Do not turn directory names into tags")
                .action(ArgAction::SetTrue),
            Arg::new("x_handle").long("x-handle").help("X handle mentioned in share links"),
            Arg::new("bluesky_handle")
                .long("bluesky-handle")
                .help("Bluesky handle mentioned in share links"),
            Arg::new("threads_handle")
                .long("threads-handle")
                .help("Threads handle mentioned in share links"),
            Arg::new("mastodon_handle")
                .long("mastodon-handle")
                .help("Mastodon handle mentioned in share links"),
            Arg::new("css_path")
                .long("css-path")
                .help("Stylesheet used instead of the generated one")
                .value_parser(value_parser!(PathBuf)),
            Arg::new("js_path")
                .long("js-path")
                .help("Script used instead of the built-in tag filter")
                .value_parser(value_parser!(PathBuf)),
            Arg::new("favicon_path")
                .long("favicon-path")
                .help("Icon copied to favicon.ico")
                .value_parser(value_parser!(PathBuf)),
            Arg::new("elements_top")
                .long("elements-top")
                .help("File with HTML inserted at the top of every page")
                .value_parser(value_parser!(PathBuf)),
            Arg::new("elements_bottom")
                .long("elements-bottom")
                .help("File with HTML inserted at the bottom of every page")
                .value_parser(value_parser!(PathBuf)),
            Arg::new("style")
                .long("style")
                .help("Built-in color scheme")
                .value_parser(PossibleValuesParser::new(Style::NAMES))
                .default_value("default"),
            Arg::new("template_dir")
                .long("template-dir")
                .help("Directory with templates replacing the built-in ones")
                .value_parser(value_parser!(PathBuf)),
            Arg::new("watch")
                .long("watch")
                .help("Rebuild whenever the sources change")
                .action(ArgAction::SetTrue),
            Arg::new("new_post")
                .long("new-post")
                .value_name("TITLE")
                .help("Create a new Markdown post in the input directory and exit")
                .num_args(0..=1)
                .default_missing_value(""),
        ])
        .get_matches();

    let settings = Settings {
        title: string_arg(&matches, "title"),
        description: string_arg(&matches, "description"),
        input_directory: path_arg(&matches, "input_path").unwrap_or_default(),
        output_directory: path_arg(&matches, "output_path").unwrap_or_default(),
        date_format: string_arg(&matches, "date_format"),
        index_name: string_arg(&matches, "index_name"),
        base_url: string_arg(&matches, "base_url"),
        sort_by: string_arg(&matches, "sort").parse()?,
        keep_date_in_titles: matches.get_flag("keep_date_in_titles"),
        keep_date_in_paths: matches.get_flag("keep_date_in_paths"),
        ignore_tags_from_paths: matches.get_flag("ignore_tags_from_paths"),
        social: SocialHandles {
            x: matches.get_one::<String>("x_handle").cloned(),
            bluesky: matches.get_one::<String>("bluesky_handle").cloned(),
            threads: matches.get_one::<String>("threads_handle").cloned(),
            mastodon: matches.get_one::<String>("mastodon_handle").cloned(),
        },
        css_path: path_arg(&matches, "css_path"),
        js_path: path_arg(&matches, "js_path"),
        favicon_path: path_arg(&matches, "favicon_path"),
        elements_top: read_fragment(&matches, "elements_top")?,
        elements_bottom: read_fragment(&matches, "elements_bottom")?,
    };

    if let Some(title) = matches.get_one::<String>("new_post") {
        scaffold::new_post(&settings, title)?;
        return Ok(());
    }

    if !settings.input_directory.is_dir() {
        bail!("input_path must be a directory.");
    }
    if settings.output_directory.exists() && !settings.output_directory.is_dir() {
        bail!("if output_path exists, it must be directory.");
    }
    if settings.index_name.is_empty() || settings.index_name.contains(['/', '\\']) {
        bail!("index_name must be a plain file name.");
    }
    for asset in [&settings.css_path, &settings.js_path, &settings.favicon_path]
        .into_iter()
        .flatten()
    {
        if !asset.is_file() {
            bail!("{asset:?} is not a file.");
        }
    }

    let mut theme = Theme::builtin(string_arg(&matches, "style").parse()?);
    if let Some(template_dir) = path_arg(&matches, "template_dir") {
        theme = theme.with_template_dir(&template_dir)?;
    }
    info!("Using the {:?} style", theme.style);

    generator::build(&settings, &theme)?;

    if matches.get_flag("watch") {
        watch::watch(&settings, &theme)?;
    }

    Ok(())
}
