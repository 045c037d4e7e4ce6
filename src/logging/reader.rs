use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::Value;

use crate::error::LoggingError;

/// The last `limit` entries of a JSON log file, oldest first.
///
/// Lines that are not valid UTF-8 or JSON (a torn write, a hand edit) are
/// skipped. The file is streamed; at most `limit` entries are held.
pub fn read_recent(path: &Path, limit: usize) -> Result<Vec<Value>, LoggingError> {
    let read_err = |source| LoggingError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = BufReader::new(File::open(path).map_err(read_err)?);

    let mut recent = VecDeque::with_capacity(limit.min(1024));
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).map_err(read_err)? == 0 {
            break;
        }
        if limit == 0 {
            continue;
        }
        let Ok(text) = std::str::from_utf8(&line) else {
            continue;
        };
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        if let Ok(value) = serde_json::from_str::<Value>(text) {
            if recent.len() == limit {
                recent.pop_front();
            }
            recent.push_back(value);
        }
    }

    Ok(recent.into())
}
