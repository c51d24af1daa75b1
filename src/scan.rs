//! Directory scanning into gallery items.
//!
//! Turns a folder of images into the ordered [`GalleryItem`] list the engine
//! takes. This is the content source the CLI uses; library hosts usually
//! build their item lists themselves.
//!
//! ## Directory Structure
//!
//! ```text
//! photos/                          # Scan root
//! ├── masonry.toml                 # Gallery configuration (optional)
//! ├── 001-dawn.jpg                 # id "001-dawn.jpg", alt "dawn"
//! ├── 001-dawn.url                 # link_target for 001-dawn.jpg
//! ├── 002-Long-Exposure.png        # alt "Long Exposure"
//! ├── 010-Japan/                   # group "Japan"
//! │   ├── 001-tokyo.jpg            # id "010-Japan/001-tokyo.jpg"
//! │   └── 002-kyoto.webp
//! └── misc.jpg                     # unnumbered: sorts after numbered entries
//! ```
//!
//! ## Ordering
//!
//! Within each directory, entries sort by their `NNN-` prefix, then by file
//! name. Unnumbered entries come after numbered ones. Directories are walked
//! depth-first in the same order, so a subdirectory's images appear where the
//! subdirectory sorts.
//!
//! Hidden entries (leading `.`) are skipped.

use crate::types::GalleryItem;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// File extensions treated as images (case-insensitive).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "tif", "tiff", "avif"];

/// Sidecar extension holding an item's link target.
const LINK_SIDECAR: &str = "url";

/// Scan `root` for images and return them as items in display order.
pub fn scan(root: &Path) -> Result<Vec<GalleryItem>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by(compare_entries)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    let mut items = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_image(entry.path()) {
            continue;
        }
        items.push(build_item(root, entry.path())?);
    }
    tracing::debug!(root = %root.display(), items = items.len(), "scan complete");
    Ok(items)
}

fn build_item(root: &Path, path: &Path) -> Result<GalleryItem, ScanError> {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let id = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    let mut item = GalleryItem::new(id, path.to_string_lossy());

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let (_, title) = split_prefix(&stem);
    if !title.is_empty() {
        item = item.with_alt(title);
    }

    if let Some(parent) = rel.parent().and_then(Path::file_name) {
        let (_, group) = split_prefix(&parent.to_string_lossy());
        if !group.is_empty() {
            item = item.with_group(group);
        }
    }

    if let Some(link) = read_link_sidecar(path)? {
        item = item.with_link(link);
    }
    Ok(item)
}

/// First non-empty line of `<stem>.url` next to the image, if present.
fn read_link_sidecar(image: &Path) -> Result<Option<String>, ScanError> {
    let sidecar = image.with_extension(LINK_SIDECAR);
    if !sidecar.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(&sidecar)?;
    Ok(content
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string))
}

/// Split `NNN-Some-Name` into `(Some(NNN), "Some Name")`.
///
/// A bare number yields an empty title. Names without a numeric prefix keep
/// their full text, dashes turned into spaces.
pub fn split_prefix(name: &str) -> (Option<u32>, String) {
    let (head, rest) = match name.split_once('-') {
        Some((head, rest)) => (head, Some(rest)),
        None => (name, None),
    };
    match head.parse::<u32>() {
        Ok(n) => (Some(n), rest.unwrap_or("").replace('-', " ")),
        Err(_) => (None, name.replace('-', " ")),
    }
}

fn compare_entries(a: &DirEntry, b: &DirEntry) -> Ordering {
    let key = |e: &DirEntry| {
        let name = e.file_name().to_string_lossy().to_string();
        let stem = Path::new(&name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        (split_prefix(&stem).0.unwrap_or(u32::MAX), name)
    };
    key(a).cmp(&key(b))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}
