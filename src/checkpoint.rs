//! File-based checkpoint helpers for the statistics types in [`crate::stats`].
//!
//! The core save/restore contract (`save_fields`/`restore_fields` on each
//! statistic) is pure string manipulation and returns `Option`/`bool`
//! rather than an error type, matching the serialization format's own
//! permissive contract. These helpers are the file-I/O edge around that
//! contract, for callers who want a richer error than "it didn't work".

use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use derive_more::Error as DeriveError;

/// A checkpoint's contents parsed as the wrong number or shape of fields
/// for the statistic being restored.
#[derive(Clone, Debug, DeriveError)]
pub struct MalformedCheckpoint {
    path: PathBuf,
}

impl Display for MalformedCheckpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed checkpoint at {}", self.path.display())
    }
}

/// Write `fields` (as produced by a statistic's `save_fields()`) to `path`.
pub fn save(path: impl AsRef<Path>, fields: &str) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, fields).with_context(|| format!("writing checkpoint to {}", path.display()))
}

/// Read the raw contents of a checkpoint file at `path`, for passing to a
/// statistic's `restore_fields`.
pub fn load(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).with_context(|| format!("reading checkpoint from {}", path.display()))
}

/// Load and restore a statistic in one step, given its `restore_fields`
/// function. Returns [`MalformedCheckpoint`] (wrapped in `anyhow::Error`)
/// if the file parses but doesn't match the expected field shape.
pub fn load_and_restore<T>(
    path: impl AsRef<Path>,
    restore_fields: impl FnOnce(&[&str]) -> Option<(T, usize)>,
) -> Result<T> {
    let path = path.as_ref();
    let contents = load(path)?;
    let parts: Vec<&str> = contents.split_whitespace().collect();
    restore_fields(&parts)
        .map(|(value, _)| value)
        .ok_or_else(|| {
            MalformedCheckpoint {
                path: path.to_path_buf(),
            }
            .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Mean;

    #[test]
    fn round_trips_a_mean_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mean.chk");

        let mut m = Mean::new();
        m.set_value(1.0);
        m.set_value(2.0);
        save(&path, &m.save_fields()).unwrap();

        let contents = load(&path).unwrap();
        let parts: Vec<&str> = contents.split_whitespace().collect();
        let (restored, _) = Mean::restore_fields(&parts).unwrap();
        assert_eq!(restored.save_fields(), m.save_fields());
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.chk");
        assert!(load(&path).is_err());
    }

    #[test]
    fn load_and_restore_reports_malformed_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.chk");
        fs::write(&path, "not a valid checkpoint").unwrap();
        let err = load_and_restore(&path, |parts| Mean::restore_fields(parts)).unwrap_err();
        assert!(err.to_string().contains("malformed checkpoint"));
    }
}
