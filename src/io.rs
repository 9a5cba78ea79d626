use log::{info, warn};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{IoContext, PrepError, Result};
use crate::types::{ClassificationConfig, DatasetConfig, DetectionConfig, Task};

pub const CONFIG_FILE: &str = "config.yaml";
pub const CLASSES_FILE: &str = "classes.txt";

/// Read one class name per line; the line number is the class id
pub fn read_class_names(classes_path: &Path) -> Result<Vec<String>> {
    if !classes_path.is_file() {
        return Err(PrepError::ClassesNotFound(classes_path.to_path_buf()));
    }
    let content = fs::read_to_string(classes_path).io_context("read classes", classes_path)?;
    let names: Vec<String> = content.lines().map(|line| line.trim().to_string()).collect();

    for (id, name) in names.iter().enumerate() {
        if name.is_empty() {
            warn!("Class {} in {} is blank", id, classes_path.display());
        }
    }
    Ok(names)
}

/// Class names of a classification dataset: the directories under `train/`,
/// sorted so that class ids are stable.
pub fn read_class_dirs(train_dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(train_dir).io_context("list classes", train_dir)? {
        let entry = entry.io_context("list classes", train_dir)?;
        if !entry.path().is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => warn!("Skipping class directory with non UTF-8 name: {:?}", name),
        }
    }
    names.sort();
    Ok(names)
}

/// Build the configuration describing a split dataset
pub fn build_config(root: &Path, task: Task) -> Result<DatasetConfig> {
    if !root.exists() {
        return Err(PrepError::PathNotFound(root.to_path_buf()));
    }

    let config = match task {
        Task::Detect => {
            let names = read_class_names(&root.join(CLASSES_FILE))?;
            DatasetConfig::Detection(DetectionConfig {
                train: "images/train".to_string(),
                val: "images/val".to_string(),
                nc: names.len(),
                names: names.into_iter().enumerate().collect(),
            })
        }
        Task::Cls => {
            let names = read_class_dirs(&root.join("train"))?;
            DatasetConfig::Classification(ClassificationConfig {
                train: "train".to_string(),
                val: "val".to_string(),
                test: "test".to_string(),
                nc: names.len(),
                names,
            })
        }
    };
    Ok(config)
}

/// Write `config.yaml` at the dataset root, replacing any previous one
pub fn create_config(root: &Path, task: Task) -> Result<(PathBuf, DatasetConfig)> {
    let config = build_config(root, task)?;

    let config_path = root.join(CONFIG_FILE);
    let yaml_content = serde_yaml::to_string(&config)?;
    let mut config_file =
        BufWriter::new(File::create(&config_path).io_context("create config", &config_path)?);
    config_file
        .write_all(yaml_content.as_bytes())
        .and_then(|_| config_file.flush())
        .io_context("write config", &config_path)?;

    info!(
        "Created {} under {} ({} classes)",
        CONFIG_FILE,
        root.display(),
        config.class_count()
    );
    Ok((config_path, config))
}
