//! Content-addressed fingerprints of referenced configuration files.
//!
//! A signature captures what a referenced file contained when it was
//! assigned, so cached results are invalidated by content changes rather
//! than by path or mtime churn. Signatures are computed eagerly on
//! assignment and never refreshed behind the caller's back; re-signing is
//! the only way to pick up new content.

use std::path::{Path, PathBuf};

use crate::error::StepError;

/// A content fingerprint of one referenced file (e.g. an `.editorconfig`
/// or a diktat rules file).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSignature {
    path: PathBuf,
    sha256: String,
}

impl FileSignature {
    /// Sign an explicitly referenced file.
    ///
    /// # Errors
    /// Returns a validation error if the file does not exist, and an I/O
    /// error if it exists but cannot be read.
    pub fn sign(path: &Path) -> Result<Self, StepError> {
        if !path.is_file() {
            return Err(StepError::validation(format!(
                "referenced file does not exist: {}",
                path.display()
            )));
        }
        let sha256 = klean_util::hash::sha256_file(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            sha256,
        })
    }

    /// Sign an optional or defaulted reference.
    ///
    /// Absence is legal here (e.g. no project-root `.editorconfig`), so a
    /// missing file yields `Ok(None)` rather than an error.
    ///
    /// # Errors
    /// Returns an error only if the file exists but cannot be read.
    pub fn sign_optional(path: &Path) -> Result<Option<Self>, StepError> {
        if !path.is_file() {
            return Ok(None);
        }
        Self::sign(path).map(Some)
    }

    /// The path the signature was computed from. Display-only; the path
    /// never participates in cache identity.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The hex-encoded SHA-256 of the file content at signing time.
    pub fn fingerprint(&self) -> &str {
        &self.sha256
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn sign_missing_file_is_validation_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = FileSignature::sign(&tmp.path().join(".editorconfig")).unwrap_err();
        assert!(matches!(err, StepError::Validation { .. }));
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn sign_optional_missing_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let sig = FileSignature::sign_optional(&tmp.path().join(".editorconfig")).unwrap();
        assert!(sig.is_none());
    }

    #[test]
    fn fingerprint_tracks_content_not_path() {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("a.editorconfig");
        let b = tmp.path().join("b.editorconfig");
        fs::write(&a, b"indent_size = 4").unwrap();
        fs::write(&b, b"indent_size = 4").unwrap();

        let sig_a = FileSignature::sign(&a).unwrap();
        let sig_b = FileSignature::sign(&b).unwrap();
        assert_eq!(sig_a.fingerprint(), sig_b.fingerprint());
        assert_ne!(sig_a.path(), sig_b.path());
    }

    #[test]
    fn resigning_after_rewrite_changes_fingerprint() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join(".editorconfig");
        fs::write(&file, b"X").unwrap();
        let before = FileSignature::sign(&file).unwrap();

        fs::write(&file, b"Y").unwrap();
        let after = FileSignature::sign(&file).unwrap();

        assert_ne!(before.fingerprint(), after.fingerprint());
    }

    #[test]
    fn signature_is_stable_without_resigning() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("diktat-analysis.yml");
        fs::write(&file, b"rules: []").unwrap();
        let sig = FileSignature::sign(&file).unwrap();

        // The signature holds the content hash from signing time; a later
        // rewrite does not touch the existing value object.
        fs::write(&file, b"rules: [x]").unwrap();
        assert_eq!(sig.fingerprint(), klean_util::hash::sha256_bytes(b"rules: []"));
    }

    #[test]
    fn directory_is_not_a_signable_file() {
        let tmp = tempfile::tempdir().unwrap();
        let err = FileSignature::sign(tmp.path()).unwrap_err();
        assert!(matches!(err, StepError::Validation { .. }));
    }
}
