//! Data-quality reporting for malformed wordlist entries.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// An entry excluded from scorer estimation, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedEntry {
    pub id: String,
    pub reason: String,
}

impl MalformedEntry {
    pub fn new(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Receiver of data-quality errors.
pub trait ErrorSink {
    fn record(&mut self, entry: MalformedEntry);
}

/// Accumulated data-quality errors of one corpus load
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorReport {
    entries: Vec<MalformedEntry>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[MalformedEntry] {
        &self.entries
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Write one `id<TAB>reason` line per malformed entry
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        for entry in &self.entries {
            writeln!(writer, "{}\t{}", entry.id, entry.reason)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl ErrorSink for ErrorReport {
    fn record(&mut self, entry: MalformedEntry) {
        self.entries.push(entry);
    }
}

impl<F: FnMut(MalformedEntry)> ErrorSink for F {
    fn record(&mut self, entry: MalformedEntry) {
        self(entry)
    }
}
