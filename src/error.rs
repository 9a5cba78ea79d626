use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors produced while preparing datasets and group directories
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("The specified path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("Class list not found: {}", .0.display())]
    ClassesNotFound(PathBuf),

    #[error("No images found in {}!", .0.display())]
    EmptyDataset(PathBuf),

    #[error("Invalid split fraction {0}: must be strictly between 0.0 and 1.0")]
    InvalidFraction(f64),

    #[error("Invalid name {0:?}: names cannot contain the underscore (_) character or be empty")]
    InvalidName(String),

    #[error("No more names available from the input source")]
    InputExhausted,

    #[error("No training run matching {run} in {}", .dir.display())]
    RunNotFound { dir: PathBuf, run: u32 },

    #[error("{op} failed for {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, PrepError>;

/// Attach an operation name and path to a bare `io::Error`
pub trait IoContext<T> {
    fn io_context(self, op: &'static str, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn io_context(self, op: &'static str, path: &Path) -> Result<T> {
        self.map_err(|source| PrepError::Io {
            op,
            path: path.to_path_buf(),
            source,
        })
    }
}
