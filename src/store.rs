//! RecordingStore - one JSON document per recording in a directory.

use crate::error::{RecorderError, Result};
use crate::recording::Recording;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const ID_PREFIX: &str = "recording_";
const EXTENSION: &str = "json";

/// Directory-backed store of recordings.
///
/// Ids are file stems. Recordings saved by the store are named
/// `recording_<n>` with `n` increasing, which gives the listing order.
#[derive(Debug, Clone)]
pub struct RecordingStore {
    dir: PathBuf,
}

impl RecordingStore {
    /// Create a store over `dir`.
    /// Does not create the directory - call `ensure_dir_exists()` or save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the platform data dir, e.g.
    /// `~/.local/share/action-recorder/recordings/`.
    pub fn with_default_dir() -> Self {
        Self::new(default_dir())
    }

    pub fn ensure_dir_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| RecorderError::storage(&self.dir, e))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist a recording under a fresh id.
    pub fn save(&self, recording: &Recording) -> Result<String> {
        self.ensure_dir_exists()?;
        let id = self.next_id()?;
        self.write(&id, recording)?;
        log::info!(
            "Saved {} ({} mouse, {} keyboard events)",
            id,
            recording.metadata().total_mouse_events,
            recording.metadata().total_keyboard_events
        );
        Ok(id)
    }

    /// Load and validate a recording.
    pub fn load(&self, id: &str) -> Result<Recording> {
        validate_id(id)?;
        let path = self.path_for(id);
        let content = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => RecorderError::NotFound(id.to_string()),
            _ => RecorderError::storage(&path, e),
        })?;
        Recording::from_json(id, &content)
    }

    pub fn exists(&self, id: &str) -> bool {
        validate_id(id).is_ok() && self.path_for(id).is_file()
    }

    /// All recording ids, newest first.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(&self.dir).map_err(|e| RecorderError::storage(&self.dir, e))?;
        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| RecorderError::storage(&self.dir, e))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) || !path.is_file() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_id(stem).is_ok() {
                    ids.push(stem.to_string());
                }
            }
        }

        ids.sort_by(|a, b| (sequence(b), b).cmp(&(sequence(a), a)));
        Ok(ids)
    }

    /// Remove a recording. Returns false if it did not exist.
    pub fn delete(&self, id: &str) -> Result<bool> {
        validate_id(id)?;
        let path = self.path_for(id);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                log::info!("Deleted {}", id);
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(RecorderError::storage(&path, e)),
        }
    }

    /// Collect recordings keyed by id.
    ///
    /// Ids that do not exist are skipped with a warning.
    pub fn export(&self, ids: &[String]) -> Result<BTreeMap<String, Recording>> {
        if ids.is_empty() {
            return Err(RecorderError::Validation(
                "no recordings selected for export".to_string(),
            ));
        }

        let mut exported = BTreeMap::new();
        for id in ids {
            match self.load(id) {
                Ok(recording) => {
                    exported.insert(id.clone(), recording);
                }
                Err(RecorderError::NotFound(_)) => {
                    log::warn!("Skipping {}: not found", id);
                }
                Err(e) => return Err(e),
            }
        }

        if exported.is_empty() {
            return Err(RecorderError::NotFound(ids.join(", ")));
        }
        Ok(exported)
    }

    /// Export as one pretty-printed JSON document.
    pub fn export_document(&self, ids: &[String]) -> Result<String> {
        let exported = self.export(ids)?;
        serde_json::to_string_pretty(&exported)
            .map_err(|e| RecorderError::storage(&self.dir, e.into()))
    }

    /// Import a document keyed by recording name.
    ///
    /// Every entry is validated before anything is written. Names are
    /// reduced to safe file stems; a name already in use gets a fresh id.
    pub fn import(&self, document: &str) -> Result<Vec<String>> {
        let value: serde_json::Value = serde_json::from_str(document)
            .map_err(|e| RecorderError::Validation(format!("import document is not JSON: {}", e)))?;
        let entries = match value {
            serde_json::Value::Object(entries) => entries,
            _ => {
                return Err(RecorderError::Validation(
                    "import document must be an object keyed by recording id".to_string(),
                ))
            }
        };
        if entries.is_empty() {
            return Err(RecorderError::Validation(
                "import document contains no recordings".to_string(),
            ));
        }

        let recordings = entries
            .into_iter()
            .map(|(name, value)| Recording::from_value(&name, value).map(|rec| (name, rec)))
            .collect::<Result<Vec<_>>>()?;

        self.ensure_dir_exists()?;
        let mut added = Vec::with_capacity(recordings.len());
        for (name, recording) in recordings {
            let stem = sanitize(&name);
            let id = if stem.is_empty() || self.path_for(&stem).exists() {
                self.next_id()?
            } else {
                stem
            };
            self.write(&id, &recording)?;
            log::info!("Imported '{}' as {}", name, id);
            added.push(id);
        }
        Ok(added)
    }

    fn next_id(&self) -> Result<String> {
        let next = self
            .list()?
            .iter()
            .filter_map(|id| sequence(id))
            .max()
            .map_or(1, |n| n + 1);
        Ok(format!("{}{}", ID_PREFIX, next))
    }

    /// Write through a temp file so a crash never leaves a partial document.
    fn write(&self, id: &str, recording: &Recording) -> Result<()> {
        let path = self.path_for(id);
        let json = recording
            .to_json()
            .map_err(|e| RecorderError::storage(&path, e.into()))?;

        let tmp = self.dir.join(format!(".{}.{}.tmp", id, EXTENSION));
        std::fs::write(&tmp, json).map_err(|e| RecorderError::storage(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            RecorderError::storage(&path, e)
        })
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", id, EXTENSION))
    }
}

/// Default recordings directory.
pub fn default_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from(".local/share"))
        .join("action-recorder")
        .join("recordings")
}

/// Sequence number of a store-assigned id.
fn sequence(id: &str) -> Option<u64> {
    id.strip_prefix(ID_PREFIX)?.parse().ok()
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() || !id.chars().all(is_id_char) {
        return Err(RecorderError::Validation(format!(
            "invalid recording id '{}'",
            id
        )));
    }
    Ok(())
}

/// Reduce an arbitrary name to a safe file stem.
fn sanitize(name: &str) -> String {
    let name = name.strip_suffix(".json").unwrap_or(name);
    let mut stem: String = name
        .chars()
        .map(|c| if is_id_char(c) { c } else { '_' })
        .collect();
    if stem.chars().all(|c| c == '_') {
        stem.clear();
    }
    stem
}
