//! Maven coordinate parsing, URL generation, and repository metadata.

use std::path::{Path, PathBuf};

use crate::error::UtilError;

/// Maven Central repository URL.
pub const MAVEN_CENTRAL: &str = "https://repo1.maven.org/maven2";

/// A parsed Maven coordinate identifying a single artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MavenCoordinate {
    /// Maven group identifier, e.g. `"com.pinterest.ktlint"`.
    pub group_id: String,
    /// Maven artifact identifier, e.g. `"ktlint-cli"`.
    pub artifact_id: String,
    /// Artifact version, e.g. `"1.2.1"`.
    pub version: String,
    /// File extension / packaging type (defaults to `"jar"`).
    pub packaging: String,
}

impl MavenCoordinate {
    /// Create a new coordinate with default packaging ("jar").
    pub fn new(group_id: &str, artifact_id: &str, version: &str) -> Self {
        Self {
            group_id: group_id.to_owned(),
            artifact_id: artifact_id.to_owned(),
            version: version.to_owned(),
            packaging: "jar".to_owned(),
        }
    }

    /// Parse a Maven coordinate string.
    ///
    /// Accepted formats:
    /// - `"group:artifact:version"` (3 parts, packaging defaults to "jar")
    /// - `"group:artifact:version:packaging"` (4 parts)
    ///
    /// # Errors
    /// Returns `UtilError::InvalidMavenCoordinate` when the string does not
    /// have 3 or 4 colon-separated parts, or any part is empty.
    pub fn parse(coord: &str) -> Result<Self, UtilError> {
        let parts: Vec<&str> = coord.split(':').collect();

        if let Some((i, _)) = parts.iter().enumerate().find(|(_, p)| p.is_empty()) {
            let label = ["group_id", "artifact_id", "version", "packaging"]
                .get(i)
                .copied()
                .unwrap_or("part");
            return Err(UtilError::InvalidMavenCoordinate {
                coordinate: coord.to_owned(),
                reason: format!("{label} is empty"),
            });
        }

        match parts.as_slice() {
            [group, artifact, version] => Ok(Self::new(group, artifact, version)),
            [group, artifact, version, packaging] => {
                let mut parsed = Self::new(group, artifact, version);
                parsed.packaging = (*packaging).to_owned();
                Ok(parsed)
            }
            _ => Err(UtilError::InvalidMavenCoordinate {
                coordinate: coord.to_owned(),
                reason: format!(
                    "expected 3 or 4 colon-separated parts (group:artifact:version[:packaging]), got {}",
                    parts.len()
                ),
            }),
        }
    }

    /// The filename for this artifact: `"{artifact_id}-{version}.{packaging}"`.
    pub fn filename(&self) -> String {
        format!("{}-{}.{}", self.artifact_id, self.version, self.packaging)
    }

    /// The repository-relative path for this artifact.
    ///
    /// Dots in `group_id` are replaced with `/`, then:
    /// `"{group_path}/{artifact_id}/{version}/{filename}"`.
    pub fn repository_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group_id.replace('.', "/"),
            self.artifact_id,
            self.version,
            self.filename()
        )
    }

    /// Build the full download URL for this artifact.
    ///
    /// Strips any trailing `/` from `registry` before appending the path.
    pub fn to_url(&self, registry: &str) -> String {
        let base = registry.trim_end_matches('/');
        format!("{}/{}", base, self.repository_path())
    }

    /// Build the URL of the group/artifact `maven-metadata.xml`.
    ///
    /// The metadata file lives beside the version directories and lists all
    /// published versions plus the most recent release.
    pub fn metadata_url(&self, registry: &str) -> String {
        let base = registry.trim_end_matches('/');
        format!(
            "{}/{}/{}/maven-metadata.xml",
            base,
            self.group_id.replace('.', "/"),
            self.artifact_id
        )
    }

    /// Return the local cache path for this artifact, rooted at `cache_root`.
    ///
    /// Uses the same directory layout as `repository_path` but as a `PathBuf`.
    pub fn cache_path(&self, cache_root: &Path) -> PathBuf {
        cache_root
            .join(self.group_id.replace('.', "/"))
            .join(&self.artifact_id)
            .join(&self.version)
            .join(self.filename())
    }

    /// A compact `group:artifact:version` label for messages and lock entries.
    pub fn label(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// Validate that a version string is safe for use in URLs and filesystem paths.
///
/// Only alphanumeric characters, dots, hyphens, and underscores are allowed,
/// which covers every published release of the supported formatters.
///
/// # Errors
/// Returns `UtilError::InvalidVersion` for empty strings or strings with
/// other characters (notably `/`, which would allow path traversal).
pub fn validate_version(version: &str) -> Result<(), UtilError> {
    if version.is_empty()
        || !version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
    {
        return Err(UtilError::InvalidVersion {
            version: version.to_owned(),
        });
    }
    Ok(())
}

/// Extract the newest release version from a `maven-metadata.xml` document.
///
/// Prefers `<release>`, falls back to `<latest>`, then to the last
/// `<version>` entry (repositories list versions oldest-first).
///
/// # Errors
/// Returns `UtilError::InvalidMetadata` if the document is not valid XML or
/// contains no version information.
pub fn parse_metadata_release(xml: &str, coordinate: &str) -> Result<String, UtilError> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| UtilError::InvalidMetadata {
        coordinate: coordinate.to_owned(),
        message: e.to_string(),
    })?;

    let text_of = |tag: &str| {
        doc.descendants()
            .find(|n| n.has_tag_name(tag))
            .and_then(|n| n.text())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
    };

    if let Some(release) = text_of("release") {
        return Ok(release);
    }
    if let Some(latest) = text_of("latest") {
        return Ok(latest);
    }

    doc.descendants()
        .filter(|n| n.has_tag_name("version"))
        .filter_map(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .last()
        .map(str::to_owned)
        .ok_or_else(|| UtilError::InvalidMetadata {
            coordinate: coordinate.to_owned(),
            message: "no <release>, <latest>, or <version> element found".to_owned(),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn parse_three_part() {
        let coord = MavenCoordinate::parse("com.pinterest.ktlint:ktlint-cli:1.2.1").unwrap();
        assert_eq!(coord.group_id, "com.pinterest.ktlint");
        assert_eq!(coord.artifact_id, "ktlint-cli");
        assert_eq!(coord.version, "1.2.1");
        assert_eq!(coord.packaging, "jar");
    }

    #[test]
    fn parse_four_part() {
        let coord = MavenCoordinate::parse("com.facebook:ktfmt:0.46:pom").unwrap();
        assert_eq!(coord.packaging, "pom");
    }

    #[test]
    fn parse_rejects_two_parts() {
        let err = MavenCoordinate::parse("com.pinterest:ktlint")
            .unwrap_err()
            .to_string();
        assert!(err.contains("invalid Maven coordinate"), "error was: {err}");
    }

    #[test]
    fn parse_rejects_five_parts() {
        assert!(MavenCoordinate::parse("a:b:c:d:e").is_err());
    }

    #[test]
    fn parse_rejects_empty_parts() {
        let err = MavenCoordinate::parse("com.facebook::0.46")
            .unwrap_err()
            .to_string();
        assert!(err.contains("artifact_id is empty"), "error was: {err}");
    }

    #[test]
    fn filename_jar() {
        let coord = MavenCoordinate::new("com.facebook", "ktfmt", "0.46");
        assert_eq!(coord.filename(), "ktfmt-0.46.jar");
    }

    #[test]
    fn repository_path_dots_to_slashes() {
        let coord = MavenCoordinate::new("com.pinterest.ktlint", "ktlint-cli", "1.2.1");
        assert_eq!(
            coord.repository_path(),
            "com/pinterest/ktlint/ktlint-cli/1.2.1/ktlint-cli-1.2.1.jar"
        );
    }

    #[test]
    fn to_url_maven_central() {
        let coord = MavenCoordinate::new("com.facebook", "ktfmt", "0.46");
        assert_eq!(
            coord.to_url(MAVEN_CENTRAL),
            "https://repo1.maven.org/maven2/com/facebook/ktfmt/0.46/ktfmt-0.46.jar"
        );
    }

    #[test]
    fn to_url_trailing_slash_normalized() {
        let coord = MavenCoordinate::new("com.example", "tool", "2.0.0");
        assert_eq!(
            coord.to_url("https://my.repo.com/maven"),
            coord.to_url("https://my.repo.com/maven/")
        );
    }

    #[test]
    fn metadata_url_omits_version() {
        let coord = MavenCoordinate::new("com.pinterest.ktlint", "ktlint-cli", "1.2.1");
        assert_eq!(
            coord.metadata_url(MAVEN_CENTRAL),
            "https://repo1.maven.org/maven2/com/pinterest/ktlint/ktlint-cli/maven-metadata.xml"
        );
    }

    #[test]
    fn cache_path_layout() {
        let coord = MavenCoordinate::new("com.facebook", "ktfmt", "0.46");
        assert_eq!(
            coord.cache_path(Path::new("/home/user/.klean/tools")),
            Path::new("/home/user/.klean/tools/com/facebook/ktfmt/0.46/ktfmt-0.46.jar")
        );
    }

    #[test]
    fn label_format() {
        let coord = MavenCoordinate::new("com.facebook", "ktfmt", "0.46");
        assert_eq!(coord.label(), "com.facebook:ktfmt:0.46");
    }

    #[test]
    fn validate_version_accepts_releases() {
        assert!(validate_version("1.2.1").is_ok());
        assert!(validate_version("0.46").is_ok());
        assert!(validate_version("2.0.0-rc.1").is_ok());
    }

    #[test]
    fn validate_version_rejects_path_traversal() {
        assert!(validate_version("../../etc").is_err());
        assert!(validate_version("1.0/../../etc").is_err());
    }

    #[test]
    fn validate_version_rejects_empty_and_special() {
        assert!(validate_version("").is_err());
        assert!(validate_version("1.0; rm -rf /").is_err());
    }

    #[test]
    fn metadata_release_preferred() {
        let xml = r#"<metadata>
  <groupId>com.pinterest.ktlint</groupId>
  <artifactId>ktlint-cli</artifactId>
  <versioning>
    <latest>1.3.0-beta</latest>
    <release>1.2.1</release>
    <versions>
      <version>1.1.0</version>
      <version>1.2.1</version>
    </versions>
  </versioning>
</metadata>"#;
        assert_eq!(parse_metadata_release(xml, "test").unwrap(), "1.2.1");
    }

    #[test]
    fn metadata_falls_back_to_latest() {
        let xml = "<metadata><versioning><latest>0.46</latest></versioning></metadata>";
        assert_eq!(parse_metadata_release(xml, "test").unwrap(), "0.46");
    }

    #[test]
    fn metadata_falls_back_to_last_version() {
        let xml = "<metadata><versioning><versions>\
                   <version>0.44</version><version>0.45</version>\
                   </versions></versioning></metadata>";
        assert_eq!(parse_metadata_release(xml, "test").unwrap(), "0.45");
    }

    #[test]
    fn metadata_rejects_garbage() {
        assert!(parse_metadata_release("not xml", "test").is_err());
        assert!(parse_metadata_release("<metadata/>", "test").is_err());
    }
}
