use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// File extensions treated as sprite images (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp"];

pub fn is_image_file(path: &Path) -> bool {
    let ext = path.extension().and_then(OsStr::to_str).unwrap_or("");
    IMAGE_EXTENSIONS
        .iter()
        .any(|allowed| ext.eq_ignore_ascii_case(allowed))
}

/// Sort key: lowercased path. Windows separators are rewritten to `/`; elsewhere `\`
/// is an ordinary filename character and is kept.
pub fn sort_key(path: &Path) -> String {
    let key = path.to_string_lossy();
    #[cfg(windows)]
    let key = key.replace('\\', "/");
    key.to_lowercase()
}

/// Recursively collect image files under `root`, sorted case-insensitively by path.
///
/// `limit == 0` keeps every file. Unreadable directory entries are skipped, and a root
/// that is not a directory yields nothing.
pub fn discover_images(root: &Path, limit: usize) -> Vec<PathBuf> {
    if !root.is_dir() {
        tracing::debug!(root = %root.display(), "sprite root is not a directory");
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                tracing::debug!(error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file() && is_image_file(e.path()))
        .map(walkdir::DirEntry::into_path)
        .collect();

    files.sort_by_cached_key(|p| (sort_key(p), p.clone()));
    if limit > 0 {
        files.truncate(limit);
    }

    tracing::debug!(root = %root.display(), count = files.len(), "discovered image files");
    files
}
