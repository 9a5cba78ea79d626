//! Group working directories.
//!
//! Group names are typed in by students, so they are normalized before use:
//! lowercased, trimmed and with German umlauts spelled out. The underscore
//! separates class prefixes from the rest of an image name and is therefore
//! never allowed in a name.

use log::{info, warn};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::{IoContext, PrepError, Result};
use crate::types::{GroupDir, Task};
use crate::utils::ensure_dir;

pub const GROUP_PROMPT: &str = "Gruppenname: ";

/// Source of names typed in by a user
pub trait NameProvider {
    fn next_name(&mut self, prompt: &str) -> Result<String>;
}

/// Reads names line by line from standard input
#[derive(Debug, Default)]
pub struct ConsoleNameProvider;

impl NameProvider for ConsoleNameProvider {
    fn next_name(&mut self, prompt: &str) -> Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt)
            .and_then(|_| stdout.flush())
            .io_context("write prompt", Path::new("<stdout>"))?;

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .io_context("read name", Path::new("<stdin>"))?;
        if read == 0 {
            return Err(PrepError::InputExhausted);
        }
        Ok(line)
    }
}

/// Hands out a fixed list of names, used for non-interactive runs
#[derive(Debug, Default, Clone)]
pub struct ScriptedNames {
    names: VecDeque<String>,
}

impl ScriptedNames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl NameProvider for ScriptedNames {
    fn next_name(&mut self, _prompt: &str) -> Result<String> {
        self.names.pop_front().ok_or(PrepError::InputExhausted)
    }
}

/// Lowercase, trim and spell out umlauts and the sharp s
pub fn sanitize_name(raw: &str) -> String {
    let mut sanitized = String::with_capacity(raw.len());
    for c in raw.to_lowercase().trim().chars() {
        match c {
            'ä' => sanitized.push_str("ae"),
            'ü' => sanitized.push_str("ue"),
            'ö' => sanitized.push_str("oe"),
            'ß' => sanitized.push_str("ss"),
            other => sanitized.push(other),
        }
    }
    sanitized
}

/// Accept a sanitized name unless it is empty or contains an underscore
pub fn validate_name(name: &str) -> Result<&str> {
    if name.is_empty() || name.contains('_') {
        Err(PrepError::InvalidName(name.to_string()))
    } else {
        Ok(name)
    }
}

/// Ask `provider` until it yields a valid name
pub fn prompt_name(provider: &mut dyn NameProvider, prompt: &str) -> Result<String> {
    loop {
        let name = sanitize_name(&provider.next_name(prompt)?);
        match validate_name(&name) {
            Ok(_) => return Ok(name),
            Err(e) => warn!("{}", e),
        }
    }
}

/// Root of all group directories, e.g. `../data`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub data_root: PathBuf,
}

impl Workspace {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
        }
    }

    /// Directory holding every group of `task`
    pub fn task_dir(&self, task: Task) -> PathBuf {
        self.data_root.join(task.dir_name())
    }

    /// Prompt for a group name and create its directory if needed
    pub fn init_group(&self, task: Task, provider: &mut dyn NameProvider) -> Result<GroupDir> {
        let group = prompt_name(provider, GROUP_PROMPT)?;
        self.create_group(task, group)
    }

    /// Create the directory of a group whose name was given up front.
    /// An invalid name is an error instead of a reason to ask again.
    pub fn init_named_group(&self, task: Task, raw_name: &str) -> Result<GroupDir> {
        let group = sanitize_name(raw_name);
        validate_name(&group)?;
        self.create_group(task, group)
    }

    fn create_group(&self, task: Task, group: String) -> Result<GroupDir> {
        let path = ensure_dir(&self.task_dir(task).join(&group))?;
        info!("Group directory ready: {}", path.display());
        Ok(GroupDir { group, path })
    }
}
