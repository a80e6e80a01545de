//! Line-delimited JSON log writing.

use crate::error::{Error, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append-only writer for a JSONL decision log.
///
/// One writer per log file; there is no concurrent producer to guard
/// against.
pub struct JsonlWriter {
    inner: BufWriter<File>,
    path: PathBuf,
}

impl JsonlWriter {
    /// Create (truncating) a log file, creating parent directories as
    /// needed.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::OutputDirCreate {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let file = File::create(path).map_err(|e| Error::LogCreate {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(Self {
            inner: BufWriter::new(file),
            path: path.to_path_buf(),
        })
    }

    /// Append one record as a JSON line.
    pub fn write_record<T: Serialize>(&mut self, record: &T) -> Result<()> {
        let line = serde_json::to_string(record).map_err(|e| Error::RecordSerialize { source: e })?;
        writeln!(self.inner, "{line}").map_err(|e| Error::LogWrite {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Flush and close the log.
    pub fn finish(mut self) -> Result<()> {
        self.inner.flush().map_err(|e| Error::LogWrite {
            path: self.path.clone(),
            source: e,
        })
    }
}
