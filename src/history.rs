//! Explanation log
//!
//! Append-only record of past explanations, one line per result.

use crate::capture::ExplanationRequest;
use crate::error::RelayError;
use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ExplanationLog {
    path: PathBuf,
}

impl ExplanationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Log under the config directory (respecting XDG)
    pub fn open_default() -> Self {
        Self::new(crate::config::config_path().with_file_name("history.log"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write an entry for one result
    pub fn append(
        &self,
        request: &ExplanationRequest,
        result: &Result<String, RelayError>,
    ) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let (status, text) = match result {
            Ok(text) => ("OK", text.clone()),
            Err(err) => ("ERR", err.to_string()),
        };

        writeln!(
            file,
            "[{}] {} | {} | {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            request.word(),
            status,
            text.replace('\n', " ")
        )?;
        Ok(())
    }

    /// All entries, oldest first. Empty when nothing was logged yet.
    pub fn read_all(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(content.lines().map(str::to_string).collect())
    }
}
