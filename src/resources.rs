use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::MemeResult;

/// Font file extensions offered for selection.
pub const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc"];

/// Background image extensions offered for selection.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "svg"];

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
}

/// File names in `folder` whose extension matches `extensions`, case-insensitively, sorted.
///
/// A missing or unreadable folder yields an empty list.
pub fn list_files(folder: impl AsRef<Path>, extensions: &[&str]) -> Vec<String> {
    let folder = folder.as_ref();
    let entries = match std::fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(folder = %folder.display(), error = %e, "resource folder unreadable");
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .map(|entry| entry.path())
        .filter(|path| has_extension(path, extensions))
        .filter_map(|path| path.file_name()?.to_str().map(str::to_owned))
        .collect();
    names.sort();
    names
}

/// Create `dir` (and parents) if missing.
pub fn ensure_dir(dir: impl AsRef<Path>) -> MemeResult<PathBuf> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).with_context(|| format!("create dir '{}'", dir.display()))?;
    Ok(dir.to_path_buf())
}
