//! Dataset preparation for YOLO classification and detection training
//!
//! This library turns folders of captured images into split datasets with a
//! matching `config.yaml`, and offers the small file helpers used around
//! that workflow.

pub mod config;
pub mod dataset;
pub mod error;
pub mod files;
pub mod io;
pub mod runs;
pub mod sweep;
pub mod types;
pub mod utils;
pub mod workspace;

// Re-export commonly used types and functions
pub use config::{Args, Command, SplitArgs};
pub use dataset::{prepare_folder_structure, split_classification, split_detection};
pub use error::{PrepError, Result};
pub use files::{cleanup_images, copy_with_unique_id, render_tree};
pub use io::create_config;
pub use runs::{resolve_model, TrainingPlan};
pub use sweep::{sweep_recent_images, SweepConfig, SweepReport};
pub use types::{DatasetConfig, GroupDir, SplitOptions, SplitReport, Task};
pub use workspace::{ConsoleNameProvider, NameProvider, ScriptedNames, Workspace};
