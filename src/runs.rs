use log::{info, warn};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{IoContext, PrepError, Result};
use crate::io::CONFIG_FILE;

pub const RUNS_DIR: &str = "runs";

fn group_name(group_dir: &Path) -> String {
    group_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Number at the end of a run directory name (`grp12` -> 12)
fn trailing_number(name: &str) -> Option<u64> {
    let digits_start = name
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(idx, _)| idx)?;
    name[digits_start..].parse().ok()
}

fn list_run_dirs(runs_dir: &Path) -> Result<Vec<String>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(runs_dir).io_context("list runs", runs_dir)? {
        let entry = entry.io_context("list runs", runs_dir)?;
        if entry.path().is_dir() {
            if let Ok(name) = entry.file_name().into_string() {
                dirs.push(name);
            }
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Locate the weights of a trained model below `<group_dir>/runs`.
///
/// Training runs are named after the group, with a counter appended from the
/// second run on (`grp`, `grp2`, `grp3`, ...). Without `run`, the run with the
/// highest counter wins; `run == 1` selects the uncounted first run.
pub fn resolve_model(group_dir: &Path, run: Option<u32>) -> Result<PathBuf> {
    let runs_dir = group_dir.join(RUNS_DIR);
    let run_dirs = list_run_dirs(&runs_dir)?;

    let selected = match run {
        Some(run) if run != 1 => run_dirs
            .into_iter()
            .find(|dir| trailing_number(dir) == Some(u64::from(run)))
            .ok_or(PrepError::RunNotFound {
                dir: runs_dir.clone(),
                run,
            })?,
        _ => {
            let latest = run_dirs
                .iter()
                .filter_map(|dir| trailing_number(dir).map(|number| (number, dir)))
                .max_by_key(|(number, _)| *number)
                .map(|(_, dir)| dir.clone());
            match (latest, run) {
                (Some(dir), None) => dir,
                _ => group_name(group_dir),
            }
        }
    };

    let model = runs_dir.join(selected).join("weights").join("best.pt");
    if model.is_file() {
        info!("Using {}", model.display());
    } else {
        warn!("Using {}, but the file does not exist yet", model.display());
    }
    Ok(model)
}

/// Inputs an external training routine needs for one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainingPlan {
    pub epochs: u32,
    pub data: PathBuf,
    pub name: String,
    pub save_dir: PathBuf,
}

impl TrainingPlan {
    pub fn for_group(group_dir: &Path, epochs: u32) -> Self {
        Self {
            epochs,
            data: group_dir.join(CONFIG_FILE),
            name: group_name(group_dir),
            save_dir: group_dir.join(RUNS_DIR),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
