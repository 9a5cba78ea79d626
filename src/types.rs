use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

// Image extensions accepted by the splitter and the cleanup helper
pub const IMG_FORMATS: &[&str] = &["png", "jpg", "jpeg"];

// Image extensions picked up when sweeping the webcam folder
pub const SWEEP_FORMATS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

pub const DEFAULT_SEED: u64 = 42;

/// The kind of dataset a group works on
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Debug)]
pub enum Task {
    /// Image classification, one folder per class
    #[value(alias = "classification")]
    Cls,
    /// Object detection, paired images and YOLO label files
    #[value(alias = "detection")]
    Detect,
}

impl Task {
    /// Name of the directory holding every group of this task
    pub fn dir_name(self) -> &'static str {
        match self {
            Task::Cls => "classification",
            Task::Detect => "detection",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Fractions and seed used when partitioning a dataset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitOptions {
    pub val_size: f64,
    /// Applied to the held-out remainder of each class, classification only
    pub test_size: f64,
    pub seed: u64,
}

impl SplitOptions {
    pub fn for_task(task: Task) -> Self {
        match task {
            Task::Cls => Self {
                val_size: 0.4,
                test_size: 0.1,
                seed: DEFAULT_SEED,
            },
            Task::Detect => Self {
                val_size: 0.2,
                test_size: 0.0,
                seed: DEFAULT_SEED,
            },
        }
    }

    /// Override the defaults with whatever the caller supplied
    pub fn with_overrides(
        mut self,
        val_size: Option<f64>,
        test_size: Option<f64>,
        seed: Option<u64>,
    ) -> Self {
        if let Some(val_size) = val_size {
            self.val_size = val_size;
        }
        if let Some(test_size) = test_size {
            self.test_size = test_size;
        }
        if let Some(seed) = seed {
            self.seed = seed;
        }
        self
    }
}

// One image file and its YOLO label file, both named relative to their folders
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SamplePair {
    pub image: String,
    pub label: String,
}

// Struct to hold the three subsets of one classification class
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassSplit {
    pub train: Vec<String>,
    pub val: Vec<String>,
    pub test: Vec<String>,
}

impl ClassSplit {
    pub fn len(&self) -> usize {
        self.train.len() + self.val.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Subset folder names paired with their images, in move order
    pub fn subsets(&self) -> [(&'static str, &Vec<String>); 3] {
        [
            ("train", &self.train),
            ("val", &self.val),
            ("test", &self.test),
        ]
    }
}

/// Outcome of a split, counted after every file has been moved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitReport {
    pub train: usize,
    pub val: usize,
    pub test: usize,
    /// Detection only: images without a label plus labels without an image
    pub dropped: usize,
}

impl SplitReport {
    pub fn total(&self) -> usize {
        self.train + self.val + self.test
    }

    pub fn print_summary(&self) {
        log::info!("=== Split Summary ===");
        log::info!("Train samples: {}", self.train);
        log::info!("Val samples: {}", self.val);
        log::info!("Test samples: {}", self.test);
        if self.dropped > 0 {
            log::warn!("Skipped unpaired files: {}", self.dropped);
        }
    }
}

/// `config.yaml` layout for detection datasets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionConfig {
    pub train: String,
    pub val: String,
    pub nc: usize,
    pub names: BTreeMap<usize, String>,
}

/// `config.yaml` layout for classification datasets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationConfig {
    pub train: String,
    pub val: String,
    pub test: String,
    pub nc: usize,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DatasetConfig {
    Detection(DetectionConfig),
    Classification(ClassificationConfig),
}

impl DatasetConfig {
    pub fn class_count(&self) -> usize {
        match self {
            DatasetConfig::Detection(config) => config.nc,
            DatasetConfig::Classification(config) => config.nc,
        }
    }
}

/// A sanitized group name and the directory created for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDir {
    pub group: String,
    pub path: PathBuf,
}
