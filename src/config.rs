use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use crate::types::{SplitOptions, Task};

/// Prepare captured images as YOLO classification and detection datasets.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the working directory of a group
    Init {
        #[arg(long, value_enum)]
        task: Task,

        /// Group name; prompted for when omitted
        #[arg(long)]
        group: Option<String>,

        /// Directory holding the `classification` and `detection` folders
        #[arg(long = "data_root", default_value = "../data")]
        data_root: PathBuf,
    },

    /// Split a dataset directory into train/val(/test) subsets in place
    Split(SplitArgs),

    /// Write config.yaml for an already split dataset
    Config {
        path: PathBuf,

        #[arg(long, value_enum)]
        task: Task,
    },

    /// Split a dataset and write its config.yaml
    Prepare(SplitArgs),

    /// Print the directory tree of a path
    Tree {
        path: PathBuf,

        /// Also list files
        #[arg(long)]
        files: bool,
    },

    /// Remove the images lying directly in a directory
    Cleanup { path: PathBuf },

    /// Copy a file into a directory under a unique name
    #[command(name = "copy")]
    CopyUnique { source: PathBuf, dest_dir: PathBuf },

    /// Move recently captured images into the most recently used group folder
    Sweep {
        /// Folder the capture software writes to
        #[arg(long)]
        source: PathBuf,

        /// Folder holding the group folders
        #[arg(long)]
        target: PathBuf,

        /// Only move images created within this many hours
        #[arg(long, default_value_t = 8)]
        hours: u64,
    },

    /// Print the weights file of a group's trained model
    Model {
        group_dir: PathBuf,

        /// Training run number; the latest run when omitted
        #[arg(long)]
        run: Option<u32>,
    },

    /// Print the training settings of a group
    TrainPlan {
        group_dir: PathBuf,

        #[arg(long)]
        epochs: u32,
    },
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SplitArgs {
    /// Dataset root directory
    pub path: PathBuf,

    #[arg(long, value_enum)]
    pub task: Task,

    /// Proportion of the dataset to use for validation
    /// [default: 0.4 for cls, 0.2 for detect]
    #[arg(long = "val_size", value_parser = validate_size)]
    pub val_size: Option<f64>,

    /// Proportion of the held-out images to use for testing (cls only) [default: 0.1]
    #[arg(long = "test_size", value_parser = validate_size)]
    pub test_size: Option<f64>,

    /// Seed for random shuffling [default: 42]
    #[arg(long = "seed")]
    pub seed: Option<u64>,
}

impl SplitArgs {
    pub fn split_options(&self) -> SplitOptions {
        SplitOptions::for_task(self.task).with_overrides(self.val_size, self.test_size, self.seed)
    }
}

// Validate that the size lies strictly between 0.0 and 1.0
pub fn validate_size(s: &str) -> Result<f64, String> {
    match f64::from_str(s) {
        Ok(val) if val > 0.0 && val < 1.0 => Ok(val),
        _ => Err("SIZE must be between 0.0 and 1.0 (exclusive)".to_string()),
    }
}
