//! Step factory for [ktfmt](https://github.com/facebook/ktfmt).

use serde_json::Value;

use klean_util::maven::MavenCoordinate;

use crate::error::StepError;
use crate::provision::Provisioner;
use crate::snapshot::StepConfig;
use crate::step::FormatterStep;

/// Version used when the configuration does not pin one.
pub const DEFAULT_VERSION: &str = "0.46";

const MAVEN_GROUP: &str = "com.facebook";
const MAVEN_ARTIFACT: &str = "ktfmt";

/// The built-in ktfmt styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KtfmtStyle {
    /// ktfmt's own default (Meta) style.
    #[default]
    Meta,
    Google,
    KotlinLang,
}

impl KtfmtStyle {
    /// The variant tag used in canonical serialization.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Meta => "meta",
            Self::Google => "google",
            Self::KotlinLang => "kotlinlang",
        }
    }

    /// Parse a style name as written in `klean.toml`.
    ///
    /// # Errors
    /// Returns a validation error for unknown style names.
    pub fn parse(name: &str) -> Result<Self, StepError> {
        match name {
            "meta" => Ok(Self::Meta),
            "google" => Ok(Self::Google),
            "kotlinlang" => Ok(Self::KotlinLang),
            other => Err(StepError::validation(format!(
                "unknown ktfmt style \"{other}\" — expected meta, google, or kotlinlang"
            ))),
        }
    }
}

/// Fine-grained ktfmt formatting options.
///
/// Unset fields stay out of the serialization entirely, so adding a new
/// option here never invalidates existing cache entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KtfmtFormattingOptions {
    pub max_width: Option<u32>,
    pub block_indent: Option<u32>,
    pub continuation_indent: Option<u32>,
    pub remove_unused_imports: Option<bool>,
    pub manage_trailing_commas: Option<bool>,
}

impl KtfmtFormattingOptions {
    fn override_entries(&self) -> Vec<(String, Value)> {
        let mut entries = Vec::new();
        if let Some(v) = self.max_width {
            entries.push(("maxWidth".to_owned(), Value::from(v)));
        }
        if let Some(v) = self.block_indent {
            entries.push(("blockIndent".to_owned(), Value::from(v)));
        }
        if let Some(v) = self.continuation_indent {
            entries.push(("continuationIndent".to_owned(), Value::from(v)));
        }
        if let Some(v) = self.remove_unused_imports {
            entries.push(("removeUnusedImports".to_owned(), Value::from(v)));
        }
        if let Some(v) = self.manage_trailing_commas {
            entries.push(("manageTrailingCommas".to_owned(), Value::from(v)));
        }
        entries
    }
}

/// The Maven coordinate of the ktfmt jar for a version.
pub fn coordinate(version: &str) -> MavenCoordinate {
    MavenCoordinate::new(MAVEN_GROUP, MAVEN_ARTIFACT, version)
}

/// Compile a ktfmt step for a style and optional formatting options.
///
/// # Errors
/// Returns a validation error for an unusable version string or a
/// `ToolResolution` error from the provisioner.
pub fn create(
    version: &str,
    style: KtfmtStyle,
    options: Option<&KtfmtFormattingOptions>,
    provisioner: &dyn Provisioner,
) -> Result<FormatterStep, StepError> {
    klean_util::maven::validate_version(version)
        .map_err(|e| StepError::validation(e.to_string()))?;

    let mut config = StepConfig::new(coordinate(version));
    config.set_variant(Some(style.as_str()));
    config.set_override_options(options.map(KtfmtFormattingOptions::override_entries).unwrap_or_default());

    FormatterStep::compile("ktfmt", &config, provisioner)
}
