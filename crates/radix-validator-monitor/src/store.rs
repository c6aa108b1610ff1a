//! Single-record persistence of the last observed snapshot.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::MonitorError;
use crate::snapshot::ValidatorSnapshot;

/// Owns the state file holding the most recent snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored snapshot. `Ok(None)` when nothing has been stored yet,
    /// [`MonitorError::StateCorrupt`] when the file cannot be decoded.
    pub fn load(&self) -> Result<Option<ValidatorSnapshot>, MonitorError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| MonitorError::StateCorrupt(format!("{}: {e}", self.path.display())))
    }

    /// Overwrite the stored snapshot. The file is replaced by rename so a crash
    /// mid-write never leaves a truncated record.
    pub fn save(&self, snapshot: &ValidatorSnapshot) -> Result<(), MonitorError> {
        let json = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.tmp_path();
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "state".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
