//! Tool provisioning: resolving a formatter coordinate to a local jar.
//!
//! Step factories never talk to the network themselves; they go through
//! the [`Provisioner`] seam so the pipeline owner decides how tools are
//! obtained (download, pre-populated cache, or a test stub).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use klean_util::maven::MavenCoordinate;

use crate::error::StepError;

/// A tool artifact resolved to a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedTool {
    /// The coordinate that was resolved.
    pub coordinate: MavenCoordinate,
    /// Local path of the resolved jar.
    pub jar_path: PathBuf,
    /// Hex-encoded SHA-256 of the jar content.
    pub sha256: String,
}

/// Resolves tool coordinates to local artifacts.
pub trait Provisioner {
    /// Resolve a coordinate, downloading it if the implementation allows.
    ///
    /// # Errors
    /// Returns `StepError::ToolResolution` when the tool cannot be
    /// obtained or fails verification.
    fn provision(&self, coordinate: &MavenCoordinate) -> Result<ProvisionedTool, StepError>;
}

/// A provisioner backed by a Maven repository and a local jar cache.
///
/// Downloads are SHA-256 hashed in-flight, verified against any pinned
/// hash, and placed with an atomic rename so a concurrent klean process
/// never observes a partial jar.
#[derive(Debug)]
pub struct MavenProvisioner {
    registry: String,
    cache_root: PathBuf,
    offline: bool,
    pinned: HashMap<String, String>,
}

impl MavenProvisioner {
    /// Create a provisioner caching into `cache_root`, fetching from
    /// Maven Central.
    pub fn new(cache_root: &Path) -> Self {
        Self {
            registry: klean_util::maven::MAVEN_CENTRAL.to_owned(),
            cache_root: cache_root.to_path_buf(),
            offline: false,
            pinned: HashMap::new(),
        }
    }

    /// Use a different Maven registry (e.g. a corporate mirror).
    pub fn with_registry(mut self, registry: &str) -> Self {
        self.registry = registry.to_owned();
        self
    }

    /// Forbid network access: only already-cached jars resolve.
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    /// Pin the expected SHA-256 for a coordinate (typically from the
    /// lockfile). Cached and downloaded jars are verified against it.
    pub fn pin(&mut self, coordinate_label: &str, sha256: &str) {
        self.pinned
            .insert(coordinate_label.to_owned(), sha256.to_owned());
    }

    /// Query the repository metadata for the newest release of a tool.
    ///
    /// # Errors
    /// Returns `StepError::ToolResolution` in offline mode, on network
    /// failure, or when the metadata cannot be parsed.
    pub fn latest_release(&self, coordinate: &MavenCoordinate) -> Result<String, StepError> {
        if self.offline {
            return Err(resolution_err(
                coordinate,
                "cannot query latest release in offline mode",
            ));
        }
        let url = coordinate.metadata_url(&self.registry);
        let xml = klean_util::download::fetch_text(&url)
            .map_err(|e| resolution_err(coordinate, &e.to_string()))?;
        klean_util::maven::parse_metadata_release(&xml, &coordinate.label())
            .map_err(|e| resolution_err(coordinate, &e.to_string()))
    }

    fn expected_hash(&self, coordinate: &MavenCoordinate) -> Option<&str> {
        self.pinned.get(&coordinate.label()).map(String::as_str)
    }

    fn verify(
        coordinate: &MavenCoordinate,
        expected: Option<&str>,
        actual: &str,
    ) -> Result<(), StepError> {
        match expected {
            Some(want) if want != actual => Err(resolution_err(
                coordinate,
                &format!("jar hash mismatch — expected {want}, got {actual}"),
            )),
            _ => Ok(()),
        }
    }
}

fn resolution_err(coordinate: &MavenCoordinate, message: &str) -> StepError {
    StepError::ToolResolution {
        coordinate: coordinate.label(),
        message: message.to_owned(),
    }
}

impl Provisioner for MavenProvisioner {
    fn provision(&self, coordinate: &MavenCoordinate) -> Result<ProvisionedTool, StepError> {
        klean_util::maven::validate_version(&coordinate.version)
            .map_err(|e| resolution_err(coordinate, &e.to_string()))?;

        let jar = coordinate.cache_path(&self.cache_root);
        let expected = self.expected_hash(coordinate);

        if jar.is_file() {
            let actual = klean_util::hash::sha256_file(&jar)?;
            Self::verify(coordinate, expected, &actual)?;
            return Ok(ProvisionedTool {
                coordinate: coordinate.clone(),
                jar_path: jar,
                sha256: actual,
            });
        }

        if self.offline {
            return Err(resolution_err(
                coordinate,
                "jar not cached and offline mode prevents downloads",
            ));
        }

        let Some(dir) = jar.parent() else {
            return Err(resolution_err(coordinate, "cache path has no parent"));
        };
        klean_util::fs::ensure_dir(dir)?;

        // Download to a temp file, then rename atomically.
        let pid = std::process::id();
        let tmp_path = dir.join(format!(".tmp-{pid}-{}", coordinate.filename()));

        let downloaded_hash = klean_util::download::download_with_progress(
            &coordinate.to_url(&self.registry),
            &tmp_path,
            &coordinate.artifact_id,
            &coordinate.version,
        )
        .map_err(|e| resolution_err(coordinate, &e.to_string()))?;

        // Verify before placing the file.
        if let Err(e) = Self::verify(coordinate, expected, &downloaded_hash) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e);
        }

        match std::fs::rename(&tmp_path, &jar) {
            Ok(()) => {}
            Err(_) if jar.is_file() => {
                // Another process placed the jar concurrently — verify its hash.
                let _ = std::fs::remove_file(&tmp_path);
                let placed = klean_util::hash::sha256_file(&jar)?;
                Self::verify(coordinate, expected, &placed)?;
                return Ok(ProvisionedTool {
                    coordinate: coordinate.clone(),
                    jar_path: jar,
                    sha256: placed,
                });
            }
            Err(source) => {
                let _ = std::fs::remove_file(&tmp_path);
                return Err(StepError::Io {
                    path: jar.display().to_string(),
                    source,
                });
            }
        }

        Ok(ProvisionedTool {
            coordinate: coordinate.clone(),
            jar_path: jar,
            sha256: downloaded_hash,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use super::*;

    fn coord() -> MavenCoordinate {
        MavenCoordinate::new("com.facebook", "ktfmt", "0.46")
    }

    /// Seed a fake jar into the cache layout so no network is needed.
    fn seed_cache(root: &Path, coordinate: &MavenCoordinate, content: &[u8]) -> String {
        let jar = coordinate.cache_path(root);
        fs::create_dir_all(jar.parent().unwrap()).unwrap();
        fs::write(&jar, content).unwrap();
        klean_util::hash::sha256_bytes(content)
    }

    #[test]
    fn cached_jar_resolves_offline() {
        let tmp = tempfile::tempdir().unwrap();
        let expected = seed_cache(tmp.path(), &coord(), b"fake jar bytes");

        let provisioner = MavenProvisioner::new(tmp.path()).offline();
        let tool = provisioner.provision(&coord()).unwrap();

        assert_eq!(tool.sha256, expected);
        assert!(tool.jar_path.ends_with("ktfmt-0.46.jar"));
    }

    #[test]
    fn missing_jar_offline_is_tool_resolution_error() {
        let tmp = tempfile::tempdir().unwrap();
        let provisioner = MavenProvisioner::new(tmp.path()).offline();

        let err = provisioner.provision(&coord()).unwrap_err();
        assert!(matches!(err, StepError::ToolResolution { .. }));
        assert!(err.to_string().contains("offline"), "error was: {err}");
    }

    #[test]
    fn pinned_hash_mismatch_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        seed_cache(tmp.path(), &coord(), b"tampered jar");

        let mut provisioner = MavenProvisioner::new(tmp.path()).offline();
        provisioner.pin(&coord().label(), &"0".repeat(64));

        let err = provisioner.provision(&coord()).unwrap_err();
        assert!(err.to_string().contains("hash mismatch"), "error was: {err}");
    }

    #[test]
    fn pinned_hash_match_accepted() {
        let tmp = tempfile::tempdir().unwrap();
        let sha = seed_cache(tmp.path(), &coord(), b"fake jar bytes");

        let mut provisioner = MavenProvisioner::new(tmp.path()).offline();
        provisioner.pin(&coord().label(), &sha);

        assert!(provisioner.provision(&coord()).is_ok());
    }

    #[test]
    fn unsafe_version_rejected_before_any_io() {
        let tmp = tempfile::tempdir().unwrap();
        let provisioner = MavenProvisioner::new(tmp.path()).offline();
        let bad = MavenCoordinate::new("com.facebook", "ktfmt", "../../etc");

        let err = provisioner.provision(&bad).unwrap_err();
        assert!(matches!(err, StepError::ToolResolution { .. }));
    }

    #[test]
    fn latest_release_offline_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let provisioner = MavenProvisioner::new(tmp.path()).offline();
        assert!(provisioner.latest_release(&coord()).is_err());
    }
}
