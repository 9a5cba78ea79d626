use glob::{glob_with, MatchOptions, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{IoContext, PrepError, Result};

/// Check a path's extension against a list of lowercase extensions, ignoring case
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            extensions.iter().any(|candidate| *candidate == ext)
        })
        .unwrap_or(false)
}

/// List the names of regular files directly inside `dir` that carry one of
/// `extensions`. The result is sorted so that seeded shuffles are reproducible.
pub fn list_files_with_extensions(dir: &Path, extensions: &[&str]) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "directory does not exist",
        ))
        .io_context("list directory", dir);
    }

    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };
    let escaped_dir = Pattern::escape(&dir.to_string_lossy());

    let mut names = Vec::new();
    for ext in extensions {
        let pattern = format!("{}/*.{}", escaped_dir, ext);
        let entries = match glob_with(&pattern, options) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Skipping invalid glob pattern {}: {}", pattern, e);
                continue;
            }
        };
        for path in entries.filter_map(|entry| entry.ok()) {
            if !path.is_file() {
                continue;
            }
            match path.file_name().and_then(|name| name.to_str()) {
                Some(name) => names.push(name.to_string()),
                None => log::warn!("Skipping file with non UTF-8 name: {:?}", path),
            }
        }
    }
    names.sort();
    names.dedup();
    Ok(names)
}

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template(&format!(
            "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
            label
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

/// Create a directory and its parents, leaving an existing one untouched
pub fn ensure_dir(path: &Path) -> Result<PathBuf> {
    fs::create_dir_all(path).io_context("create directory", path)?;
    Ok(path.to_path_buf())
}

/// Move `source` into `dest_dir`, keeping its file name.
///
/// Falls back to copy-and-delete when a plain rename is not possible, e.g.
/// across filesystems. An existing file at the destination is never replaced.
pub fn move_into(source: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let file_name = source.file_name().ok_or_else(|| PrepError::Io {
        op: "move",
        path: source.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
    })?;
    let destination = dest_dir.join(file_name);
    if destination.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            "destination already exists",
        ))
        .io_context("move", &destination);
    }

    if fs::rename(source, &destination).is_err() {
        fs::copy(source, &destination).io_context("move", source)?;
        fs::remove_file(source).io_context("move", source)?;
    }
    Ok(destination)
}
