use std::{path::Path, sync::mpsc};

use anyhow::Context;
use log::{debug, error, info};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::{generator, settings::Settings, theme::Theme};

/// Whether `event` should trigger a rebuild. Changes the build itself makes
/// under `output_dir` never do.
fn needs_rebuild(event: &Event, output_dir: &Path) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event.paths.iter().any(|p| !p.starts_with(output_dir))
}

/// Rebuilds the site whenever a source or custom asset changes.
/// Blocks until the watcher goes away.
pub(crate) fn watch(settings: &Settings, theme: &Theme) -> anyhow::Result<()> {
    let (tx, rx) = mpsc::channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        },
        notify::Config::default(),
    )
    .context("Failed to initialize watcher")?;

    watcher
        .watch(&settings.input_directory, RecursiveMode::Recursive)
        .with_context(|| format!("failed to watch {:?}", settings.input_directory))?;
    let custom_assets = [
        &settings.css_path,
        &settings.js_path,
        &settings.favicon_path,
    ];
    for asset in custom_assets.into_iter().flatten() {
        watcher
            .watch(asset, RecursiveMode::NonRecursive)
            .with_context(|| format!("failed to watch {asset:?}"))?;
    }

    let output_dir = settings
        .output_directory
        .canonicalize()
        .unwrap_or_else(|_| settings.output_directory.clone());

    info!("Watching for changes...");
    for res in rx {
        match res {
            Ok(event) if needs_rebuild(&event, &output_dir) => {
                info!("Changes detected in {:?}, rebuilding", event.paths);
                if let Err(e) = generator::build(settings, theme) {
                    error!("Rebuild failed: {e:#}");
                }
                info!("Watching for changes...");
            }
            Ok(event) => debug!("Ignoring {event:?}"),
            Err(e) => error!("Watch error: {e}"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind};
    use std::path::PathBuf;

    #[test]
    fn test_needs_rebuild() {
        let out = Path::new("/site/public");
        let source = PathBuf::from("/site/content/post.md");

        let modify = Event::new(EventKind::Modify(ModifyKind::Any)).add_path(source.clone());
        assert!(needs_rebuild(&modify, out));

        let create = Event::new(EventKind::Create(CreateKind::File)).add_path(source.clone());
        assert!(needs_rebuild(&create, out));

        let access = Event::new(EventKind::Access(AccessKind::Any)).add_path(source);
        assert!(!needs_rebuild(&access, out));

        let own_output = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/site/public/index.html"));
        assert!(!needs_rebuild(&own_output, out));
    }
}
