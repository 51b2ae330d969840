use std::{
    fs,
    path::Path,
    sync::OnceLock,
};

use anyhow::Context;
use fs_extra::file::CopyOptions;
use log::debug;
use regex::Regex;
use walkdir::WalkDir;

static RESOURCE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn resource_pattern() -> &'static Regex {
    RESOURCE_PATTERN.get_or_init(|| {
        Regex::new(
            r#"(?is)<(?:img|script|link)\b[^>]*?\s(?:src|href)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#,
        )
        .unwrap()
    })
}

fn entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Replaces character references in an attribute value. Unknown ones are
/// left alone.
fn decode_entities(value: &str) -> String {
    let mut decoded = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find('&') {
        decoded.push_str(&rest[..start]);
        let tail = &rest[start..];
        let reference = tail
            .find(';')
            .and_then(|end| entity(&tail[1..end]).map(|c| (c, end)));
        match reference {
            Some((c, end)) => {
                decoded.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                decoded.push('&');
                rest = &tail[1..];
            }
        }
    }
    decoded.push_str(rest);
    decoded
}

/// `src`/`href` targets of every `img`, `script` and `link` element, in
/// document order. Only the first of the two attributes counts per element.
pub(crate) fn extract_resources(html: &str) -> Vec<String> {
    resource_pattern()
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| decode_entities(m.as_str().trim()))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Strips query and fragment, percent-decodes the rest, and rejects anything
/// that does not point to a file next to the source.
fn local_resource(resource: &str) -> Option<String> {
    let lower = resource.to_lowercase();
    if lower.contains("http")
        || lower.starts_with("data:")
        || lower.starts_with("mailto:")
        || resource.starts_with('/')
        || resource.starts_with('#')
    {
        return None;
    }
    let end = resource.find(['?', '#']).unwrap_or(resource.len());
    let path = &resource[..end];
    if path.is_empty() {
        return None;
    }
    match percent_encoding::percent_decode_str(path).decode_utf8() {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(_) => Some(path.to_string()),
    }
}

fn copy_file(from: &Path, to: &Path) -> anyhow::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {parent:?}"))?;
    }
    let mut options = CopyOptions::new();
    options.overwrite = true;
    fs_extra::file::copy(from, to, &options)
        .with_context(|| format!("failed to copy {from:?} to {to:?}"))?;
    debug!("{from:?} -> {to:?}");
    Ok(())
}

/// Copies every local resource referenced by `html` from `source_dir` to
/// `dest_dir`, keeping its relative sub-path.
pub(crate) fn copy_resources(html: &str, source_dir: &Path, dest_dir: &Path) -> anyhow::Result<()> {
    let mut seen: Vec<String> = vec![];
    for resource in extract_resources(html).iter().filter_map(|r| local_resource(r)) {
        if seen.contains(&resource) {
            continue;
        }
        copy_file(&source_dir.join(&resource), &dest_dir.join(&resource))?;
        seen.push(resource);
    }
    Ok(())
}

/// Mirrors every regular file below `source_dir` into `dest_dir`.
/// Symlinks, devices, sockets and pipes are skipped.
pub(crate) fn copy_page_tree(source_dir: &Path, dest_dir: &Path) -> anyhow::Result<()> {
    for entry in WalkDir::new(source_dir).follow_links(false) {
        let entry = entry.with_context(|| format!("failed to walk {source_dir:?}"))?;
        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }
        if !file_type.is_file() {
            debug!("Skipping non-regular file: {:?}", entry.path());
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .with_context(|| format!("error getting relative path for {:?}", entry.path()))?;
        copy_file(entry.path(), &dest_dir.join(relative))?;
    }
    Ok(())
}

/// Copies the cover image to the same relative path under the output root.
pub(crate) fn copy_cover_image(
    source_dir: &Path,
    output_dir: &Path,
    cover_image_path: &str,
) -> anyhow::Result<()> {
    match local_resource(cover_image_path) {
        Some(cover) => copy_file(&source_dir.join(&cover), &output_dir.join(&cover)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_resources() {
        let html = r#"<p><img alt="x" src="img/a.png"></p>
<script src='app.js'></script>
<link rel="stylesheet" href=style.css>
<a href="not-a-resource.html">link</a>
<img data-src="lazy.png" src="real.png" />
<img src="https://example.com/b.png">"#;
        assert_eq!(
            extract_resources(html),
            vec![
                "img/a.png",
                "app.js",
                "style.css",
                "real.png",
                "https://example.com/b.png"
            ]
        );
    }

    #[test]
    fn test_local_resource() {
        assert_eq!(local_resource("img/a.png?v=2").as_deref(), Some("img/a.png"));
        assert_eq!(local_resource("my%20photo.png").as_deref(), Some("my photo.png"));
        assert_eq!(local_resource("100%.png").as_deref(), Some("100%.png"));
        assert_eq!(local_resource("HTTPS://cdn.example.com/x.js"), None);
        assert_eq!(local_resource("/style.css"), None);
        assert_eq!(local_resource("data:image/png;base64,AAAA"), None);
        assert_eq!(local_resource("#top"), None);
    }

    #[test]
    fn test_copy_resources() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src");
        let dest = dir.path().join("out");
        fs::create_dir_all(source.join("img")).unwrap();
        fs::write(source.join("img/a.png"), b"png").unwrap();

        let html = r#"<img src="img/a.png"><img src="img/a.png"><img src="http://x/y.png">"#;
        copy_resources(html, &source, &dest).unwrap();
        assert_eq!(fs::read(dest.join("img/a.png")).unwrap(), b"png");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a&amp;b.png"), "a&b.png");
        assert_eq!(decode_entities("&quot;x&#39;&#x41;"), "\"x'A");
        assert_eq!(decode_entities("fish & chips;"), "fish & chips;");
        assert_eq!(decode_entities("&bogus;"), "&bogus;");
    }

    #[test]
    fn test_copy_resources_with_escaped_names() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src");
        let dest = dir.path().join("out");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("my photo.png"), b"space").unwrap();
        fs::write(source.join("a&b.png"), b"amp").unwrap();

        let html = r#"<img src="my%20photo.png" alt="pic"><img src="a&amp;b.png" alt="amp">"#;
        copy_resources(html, &source, &dest).unwrap();
        assert_eq!(fs::read(dest.join("my photo.png")).unwrap(), b"space");
        assert_eq!(fs::read(dest.join("a&b.png")).unwrap(), b"amp");
    }

    #[test]
    fn test_copy_resources_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = copy_resources(r#"<img src="gone.png">"#, dir.path(), &dir.path().join("out"));
        assert!(result.is_err());
    }

    #[test]
    fn test_copy_page_tree() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("about");
        let dest = dir.path().join("out/about");
        fs::create_dir_all(source.join("sub")).unwrap();
        fs::write(source.join("index.md"), "page").unwrap();
        fs::write(source.join("sub/file.txt"), "nested").unwrap();
        #[cfg(unix)]
        std::os::unix::fs::symlink(source.join("index.md"), source.join("link.md")).unwrap();

        copy_page_tree(&source, &dest).unwrap();
        assert_eq!(fs::read_to_string(dest.join("index.md")).unwrap(), "page");
        assert_eq!(fs::read_to_string(dest.join("sub/file.txt")).unwrap(), "nested");
        assert!(!dest.join("link.md").exists());
    }
}
