use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use tracing::warn;

/// Appends segmentation decisions to a JSONL file, one record per line.
///
/// A logger whose file could not be opened is disabled and drops records;
/// tracing never fails a compile.
pub struct TraceLogger {
    sink: Option<(PathBuf, Mutex<File>)>,
}

impl TraceLogger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Self {
                sink: Some((path.to_path_buf(), Mutex::new(file))),
            },
            Err(e) => {
                warn!("could not open trace file '{}': {}", path.display(), e);
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn log<T: Serialize>(&self, record: &T) {
        let Some((path, file)) = &self.sink else {
            return;
        };

        if let Err(e) = append_line(file, record) {
            warn!("dropped trace record for '{}': {}", path.display(), e);
        }
    }
}

fn append_line<T: Serialize>(file: &Mutex<File>, record: &T) -> std::io::Result<()> {
    let json = serde_json::to_string(record)?;
    let mut file = file
        .lock()
        .map_err(|_| std::io::Error::other("trace file lock poisoned"))?;
    writeln!(file, "{}", json)
}
