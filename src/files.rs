use jwalk::WalkDir;
use log::{error, info};
use std::fs;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

use crate::error::{IoContext, PrepError, Result};
use crate::types::IMG_FORMATS;
use crate::utils::{ensure_dir, list_files_with_extensions};

const INDENT: &str = "    ";

fn is_hidden(name: &str) -> bool {
    name.starts_with('.') || name.starts_with("__")
}

/// Render the directory tree below `root`, one entry per line.
///
/// Directories end with `/`; files are only listed when `show_files` is set.
/// Hidden entries (`.git`, `__pycache__`, ...) are skipped along with
/// everything below them.
pub fn render_tree(root: &Path, show_files: bool) -> Result<String> {
    if !root.exists() {
        return Err(PrepError::PathNotFound(root.to_path_buf()));
    }

    let root_name = root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());
    let mut tree = format!("{}/\n", root_name);

    for entry in WalkDir::new(root).sort(true).skip_hidden(false).min_depth(1) {
        let entry = entry
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
            .io_context("walk directory", root)?;
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path.as_path());

        let hidden = relative.components().any(|component| match component {
            Component::Normal(name) => is_hidden(&name.to_string_lossy()),
            _ => false,
        });
        if hidden {
            continue;
        }

        let is_dir = entry.file_type().is_dir();
        if !is_dir && !show_files {
            continue;
        }

        tree.push_str(&INDENT.repeat(entry.depth));
        tree.push_str(&entry.file_name().to_string_lossy());
        if is_dir {
            tree.push('/');
        }
        tree.push('\n');
    }
    Ok(tree)
}

fn try_copy_with_unique_id(source: &Path, dest_dir: &Path) -> Result<PathBuf> {
    if !source.is_file() {
        return Err(PrepError::PathNotFound(source.to_path_buf()));
    }
    let file_name = source
        .file_name()
        .map(|name| sanitize_filename::sanitize(name.to_string_lossy()))
        .ok_or_else(|| PrepError::PathNotFound(source.to_path_buf()))?;

    ensure_dir(dest_dir)?;
    let destination = dest_dir.join(format!("{}_{}", Uuid::new_v4(), file_name));
    fs::copy(source, &destination).io_context("copy", source)?;
    Ok(destination)
}

/// Copy `source` into `dest_dir` under a name prefixed with a fresh UUID.
///
/// Failures are logged and reported as `None`; the caller carries on.
pub fn copy_with_unique_id(source: &Path, dest_dir: &Path) -> Option<PathBuf> {
    match try_copy_with_unique_id(source, dest_dir) {
        Ok(destination) => {
            info!(
                "File {} successfully copied to {}",
                source.display(),
                destination.display()
            );
            Some(destination)
        }
        Err(e) => {
            error!("An error occurred while copying: {}", e);
            None
        }
    }
}

/// Delete the images lying directly in `dir`; subdirectories are left alone
pub fn cleanup_images(dir: &Path) -> Result<usize> {
    let images = list_files_with_extensions(dir, IMG_FORMATS)?;
    for image in &images {
        let path = dir.join(image);
        fs::remove_file(&path).io_context("remove image", &path)?;
    }
    info!("Removed {} images from {}", images.len(), dir.display());
    Ok(images.len())
}
