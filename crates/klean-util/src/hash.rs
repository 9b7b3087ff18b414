//! SHA-256 content fingerprints and composite cache keys.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::UtilError;

fn hex_digest(hasher: Sha256) -> String {
    format!("{:x}", hasher.finalize())
}

/// Compute the SHA-256 hex digest of a byte slice.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex_digest(hasher)
}

/// Compute the SHA-256 hex digest of a file using streaming reads.
///
/// Reads in 64 KiB chunks rather than loading the whole file; formatter
/// jars can be tens of megabytes.
///
/// # Errors
/// Returns an error if the file cannot be opened or read.
pub fn sha256_file(path: &Path) -> Result<String, UtilError> {
    let io_err = |source| UtilError::Io {
        path: path.display().to_string(),
        source,
    };

    let file = std::fs::File::open(path).map_err(io_err)?;
    let mut reader = std::io::BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = std::io::Read::read(&mut reader, &mut buf).map_err(io_err)?;
        if n == 0 {
            break;
        }
        let Some(chunk) = buf.get(..n) else {
            break; // unreachable: n is bounded by buf.len()
        };
        hasher.update(chunk);
    }
    Ok(hex_digest(hasher))
}

/// Combine ordered canonical parts into one composite cache key.
///
/// This is the identity function for steps: callers pass the canonical
/// configuration text followed by the resolved tool fingerprint, and two
/// steps are cache-equivalent exactly when their parts agree pairwise.
/// Each part is length-prefixed before hashing so adjacent parts cannot
/// collide (`["ab","c"]` vs `["a","bc"]`).
pub fn cache_key(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.len().to_le_bytes());
        hasher.update(part.as_bytes());
    }
    hex_digest(hasher)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn sha256_bytes_deterministic() {
        let a = sha256_bytes(b"max_line_length=120");
        let b = sha256_bytes(b"max_line_length=120");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64); // 256 bits = 64 hex chars
    }

    #[test]
    fn sha256_bytes_different_input() {
        let a = sha256_bytes(b"indent_size=4");
        let b = sha256_bytes(b"indent_size=2");
        assert_ne!(a, b);
    }

    #[test]
    fn sha256_bytes_empty() {
        let hash = sha256_bytes(b"");
        // Known SHA-256 of empty input
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256_file_matches_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(".editorconfig");
        fs::write(&file, b"root = true").unwrap();

        let hash = sha256_file(&file).unwrap();
        let expected = sha256_bytes(b"root = true");
        assert_eq!(hash, expected);
    }

    #[test]
    fn sha256_file_missing() {
        let result = sha256_file(Path::new("/nonexistent/path/.editorconfig"));
        assert!(result.is_err());
    }

    #[test]
    fn sha256_file_content_not_path() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.yml");
        let b = dir.path().join("b.yml");
        fs::write(&a, b"same content").unwrap();
        fs::write(&b, b"same content").unwrap();

        assert_eq!(sha256_file(&a).unwrap(), sha256_file(&b).unwrap());
    }

    #[test]
    fn cache_key_deterministic() {
        let a = cache_key(&["tool=ktlint", "1.2.1"]);
        let b = cache_key(&["tool=ktlint", "1.2.1"]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn cache_key_part_order_matters() {
        let a = cache_key(&["tool=ktlint", "1.2.1"]);
        let b = cache_key(&["1.2.1", "tool=ktlint"]);
        assert_ne!(a, b);
    }

    #[test]
    fn cache_key_no_boundary_collision() {
        // ["ab", "c"] and ["a", "bc"] must produce different keys
        let a = cache_key(&["ab", "c"]);
        let b = cache_key(&["a", "bc"]);
        assert_ne!(a, b);
    }

    #[test]
    fn cache_key_empty_parts() {
        assert_eq!(cache_key(&[]).len(), 64);
    }
}
