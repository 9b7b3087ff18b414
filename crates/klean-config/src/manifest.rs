use serde::Deserialize;
use std::path::Path;

/// The `klean.toml` project manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub format: FormatSection,
}

/// The `[format]` table: targets plus one optional table per formatter.
#[derive(Debug, Clone, Deserialize)]
pub struct FormatSection {
    #[serde(default = "default_targets")]
    pub targets: Vec<String>,
    #[serde(default)]
    pub ktlint: Option<KtlintSection>,
    #[serde(default)]
    pub ktfmt: Option<KtfmtSection>,
    #[serde(default)]
    pub diktat: Option<DiktatSection>,
}

fn default_targets() -> Vec<String> {
    vec!["**/*.kt".to_owned(), "**/*.kts".to_owned()]
}

/// `[format.ktlint]`.
#[derive(Debug, Clone, Deserialize)]
pub struct KtlintSection {
    pub version: Option<String>,
    /// Path of an explicit `.editorconfig`, relative to the project root.
    pub editor_config: Option<String>,
    #[serde(default)]
    pub user_data: toml::Table,
    #[serde(default)]
    pub editor_config_override: toml::Table,
}

/// `[format.ktfmt]`.
#[derive(Debug, Clone, Deserialize)]
pub struct KtfmtSection {
    pub version: Option<String>,
    /// One of `meta`, `google`, `kotlinlang`.
    pub style: Option<String>,
    pub max_width: Option<u32>,
    pub block_indent: Option<u32>,
    pub continuation_indent: Option<u32>,
    pub remove_unused_imports: Option<bool>,
    pub manage_trailing_commas: Option<bool>,
}

/// `[format.diktat]`.
#[derive(Debug, Clone, Deserialize)]
pub struct DiktatSection {
    pub version: Option<String>,
    /// Path of a diktat rules file, relative to the project root.
    pub config_file: Option<String>,
}

impl Manifest {
    /// Read and parse a `klean.toml` from the given path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|e| ManifestError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let manifest: Manifest = toml::from_str(&content).map_err(|e| ManifestError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(manifest)
    }
}

/// Flatten a TOML table into string pairs (for ktlint user data).
///
/// # Errors
/// Returns an error for any non-string value.
pub fn string_entries(table: &toml::Table) -> Result<Vec<(String, String)>, ManifestError> {
    table
        .iter()
        .map(|(key, value)| match value {
            toml::Value::String(s) => Ok((key.clone(), s.clone())),
            other => Err(ManifestError::UnsupportedValue {
                key: key.clone(),
                reason: format!("expected a string, got {}", other.type_str()),
            }),
        })
        .collect()
}

/// Convert a TOML table into opaque JSON values (for override maps),
/// preserving the table's entry order.
///
/// # Errors
/// Returns an error for datetimes and non-finite floats, which have no
/// canonical representation in the step serialization.
pub fn value_entries(
    table: &toml::Table,
) -> Result<Vec<(String, serde_json::Value)>, ManifestError> {
    table
        .iter()
        .map(|(key, value)| Ok((key.clone(), toml_to_json(key, value)?)))
        .collect()
}

fn toml_to_json(key: &str, value: &toml::Value) -> Result<serde_json::Value, ManifestError> {
    match value {
        toml::Value::String(s) => Ok(serde_json::Value::String(s.clone())),
        toml::Value::Integer(i) => Ok(serde_json::Value::from(*i)),
        toml::Value::Float(f) => {
            serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .ok_or_else(|| ManifestError::UnsupportedValue {
                    key: key.to_owned(),
                    reason: "non-finite floats cannot be serialized canonically".to_owned(),
                })
        }
        toml::Value::Boolean(b) => Ok(serde_json::Value::Bool(*b)),
        toml::Value::Datetime(_) => Err(ManifestError::UnsupportedValue {
            key: key.to_owned(),
            reason: "datetimes are not valid option values".to_owned(),
        }),
        toml::Value::Array(items) => items
            .iter()
            .map(|item| toml_to_json(key, item))
            .collect::<Result<Vec<_>, _>>()
            .map(serde_json::Value::Array),
        toml::Value::Table(inner) => {
            let mut map = serde_json::Map::new();
            for (inner_key, inner_value) in inner {
                map.insert(inner_key.clone(), toml_to_json(inner_key, inner_value)?);
            }
            Ok(serde_json::Value::Object(map))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid klean.toml at {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("unsupported value for `{key}`: {reason}")]
    UnsupportedValue { key: String, reason: String },
}
