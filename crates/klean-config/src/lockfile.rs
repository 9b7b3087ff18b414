use serde::{Deserialize, Serialize};
use std::path::Path;

/// The `klean.lock` lockfile: pinned jar hashes per tool coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Lockfile {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolLock>,
}

/// A pinned tool artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolLock {
    /// `group:artifact:version` of the pinned jar.
    pub coordinate: String,
    /// Hex-encoded SHA-256 of the jar content.
    pub jar_sha256: String,
}

impl Lockfile {
    /// Read and parse a `klean.lock` from the given path.
    /// Returns a default lockfile if the file does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or contains
    /// invalid TOML.
    pub fn from_path(path: &Path) -> Result<Self, LockfileError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| LockfileError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let lockfile: Lockfile = toml::from_str(&content).map_err(|e| LockfileError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(lockfile)
    }

    /// Pin (or re-pin) the hash for a coordinate.
    pub fn pin(&mut self, coordinate: &str, jar_sha256: &str) {
        if let Some(entry) = self.tools.iter_mut().find(|t| t.coordinate == coordinate) {
            entry.jar_sha256 = jar_sha256.to_owned();
        } else {
            self.tools.push(ToolLock {
                coordinate: coordinate.to_owned(),
                jar_sha256: jar_sha256.to_owned(),
            });
        }
    }

    /// Look up the pinned hash for a coordinate.
    pub fn sha_for(&self, coordinate: &str) -> Option<&str> {
        self.tools
            .iter()
            .find(|t| t.coordinate == coordinate)
            .map(|t| t.jar_sha256.as_str())
    }

    /// Write the lockfile to disk as human-readable TOML.
    ///
    /// Uses atomic write (write-to-temp-then-rename) to prevent partial
    /// writes from corrupting the lockfile.
    ///
    /// # Errors
    /// Returns an error if serialization fails or the file cannot be written.
    pub fn write_to(&self, path: &Path) -> Result<(), LockfileError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| LockfileError::Serialize { source: e })?;
        let tmp_path = path.with_extension("lock.tmp");
        std::fs::write(&tmp_path, &content).map_err(|e| LockfileError::Write {
            path: tmp_path.display().to_string(),
            source: e,
        })?;
        std::fs::rename(&tmp_path, path).map_err(|e| LockfileError::Write {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LockfileError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid klean.lock at {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("cannot serialize lockfile: {source}")]
    Serialize { source: toml::ser::Error },
    #[error("cannot write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}
