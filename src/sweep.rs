//! One-shot relocation of freshly captured webcam images.
//!
//! The capture software drops images into a fixed folder. A sweep moves every
//! image created within the configured window into the group folder that was
//! touched most recently, i.e. the group currently working at the machine.

use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::error::{IoContext, Result};
use crate::types::SWEEP_FORMATS;
use crate::utils::{has_extension, move_into};

pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(8 * 3600);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    pub source_dir: PathBuf,
    pub target_base: PathBuf,
    pub max_age: Duration,
    pub extensions: Vec<String>,
}

impl SweepConfig {
    pub fn new(source_dir: impl Into<PathBuf>, target_base: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            target_base: target_base.into(),
            max_age: DEFAULT_MAX_AGE,
            extensions: SWEEP_FORMATS.iter().map(|ext| ext.to_string()).collect(),
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub target: Option<PathBuf>,
    pub moved: usize,
    pub failed: usize,
}

/// The subdirectory of `base` with the latest modification time
pub fn latest_subfolder(base: &Path) -> Result<Option<PathBuf>> {
    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for entry in fs::read_dir(base).io_context("list groups", base)? {
        let entry = entry.io_context("list groups", base)?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|metadata| metadata.modified())
            .io_context("read modification time", &path)?;
        if latest.as_ref().map_or(true, |(time, _)| modified > *time) {
            latest = Some((modified, path));
        }
    }
    Ok(latest.map(|(_, path)| path))
}

fn created_at(path: &Path) -> std::io::Result<SystemTime> {
    let metadata = fs::metadata(path)?;
    metadata.created().or_else(|_| metadata.modified())
}

/// Move recent images from the capture folder into the latest group folder.
///
/// Per-file failures are logged and counted; only failing to list the
/// folders themselves aborts the sweep.
pub fn sweep_recent_images(config: &SweepConfig) -> Result<SweepReport> {
    let Some(target) = latest_subfolder(&config.target_base)? else {
        warn!(
            "No group folder found in {}",
            config.target_base.display()
        );
        return Ok(SweepReport::default());
    };

    let cutoff = SystemTime::now()
        .checked_sub(config.max_age)
        .unwrap_or(SystemTime::UNIX_EPOCH);
    let extensions: Vec<&str> = config.extensions.iter().map(String::as_str).collect();

    let mut report = SweepReport {
        target: Some(target.clone()),
        ..SweepReport::default()
    };
    let source_dir = &config.source_dir;
    for entry in fs::read_dir(source_dir).io_context("list captures", source_dir)? {
        let path = entry.io_context("list captures", source_dir)?.path();
        if !path.is_file() || !has_extension(&path, &extensions) {
            continue;
        }
        match created_at(&path) {
            Ok(created) if created >= cutoff => {}
            Ok(_) => continue,
            Err(e) => {
                error!("Failed to read creation time of {}: {}", path.display(), e);
                report.failed += 1;
                continue;
            }
        }

        match move_into(&path, &target) {
            Ok(_) => {
                info!("Moved {} to {}", path.display(), target.display());
                report.moved += 1;
            }
            Err(e) => {
                error!("Failed to move {}: {}", path.display(), e);
                report.failed += 1;
            }
        }
    }

    if report.moved == 0 {
        info!("No new images found.");
    } else {
        info!("Moved {} images in total", report.moved);
    }
    Ok(report)
}
