//! Step factory for [ktlint](https://github.com/pinterest/ktlint).

use serde_json::Value;

use klean_util::maven::MavenCoordinate;

use crate::error::StepError;
use crate::provision::Provisioner;
use crate::signature::FileSignature;
use crate::snapshot::StepConfig;
use crate::step::FormatterStep;

/// Version used when the configuration does not pin one.
pub const DEFAULT_VERSION: &str = "1.2.1";

const MAVEN_GROUP: &str = "com.pinterest.ktlint";
const MAVEN_ARTIFACT: &str = "ktlint-cli";

/// The Maven coordinate of the ktlint CLI jar for a version.
pub fn coordinate(version: &str) -> MavenCoordinate {
    MavenCoordinate::new(MAVEN_GROUP, MAVEN_ARTIFACT, version)
}

/// Compile a ktlint step from the current binding state.
///
/// `editor_config` is the optional signed `.editorconfig` reference,
/// `user_data` the plain string options, and `editor_config_override` the
/// opaque-valued overrides laid over the editor config.
///
/// # Errors
/// Returns a validation error for an unusable version string, an
/// `UnsupportedValue` error from canonicalization, or a `ToolResolution`
/// error from the provisioner.
pub fn create(
    version: &str,
    editor_config: Option<&FileSignature>,
    user_data: &[(String, String)],
    editor_config_override: &[(String, Value)],
    provisioner: &dyn Provisioner,
) -> Result<FormatterStep, StepError> {
    klean_util::maven::validate_version(version)
        .map_err(|e| StepError::validation(e.to_string()))?;

    let mut config = StepConfig::new(coordinate(version));
    config.set_file_ref("editorconfig", editor_config.cloned());
    config.set_named_options(user_data.to_vec());
    config.set_override_options(editor_config_override.to_vec());

    FormatterStep::compile("ktlint", &config, provisioner)
}
