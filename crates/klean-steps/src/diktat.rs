//! Step factory for [diktat](https://github.com/saveourtool/diktat).

use klean_util::maven::MavenCoordinate;

use crate::error::StepError;
use crate::provision::Provisioner;
use crate::signature::FileSignature;
use crate::snapshot::StepConfig;
use crate::step::FormatterStep;

/// Version used when the configuration does not pin one.
pub const DEFAULT_VERSION: &str = "2.0.0";

const MAVEN_GROUP: &str = "com.saveourtool.diktat";
const MAVEN_ARTIFACT: &str = "diktat-rules";

/// The Maven coordinate of the diktat rules jar for a version.
pub fn coordinate(version: &str) -> MavenCoordinate {
    MavenCoordinate::new(MAVEN_GROUP, MAVEN_ARTIFACT, version)
}

/// Compile a diktat step with an optional signed rules-config file.
///
/// # Errors
/// Returns a validation error for an unusable version string or a
/// `ToolResolution` error from the provisioner.
pub fn create(
    version: &str,
    rules_config: Option<&FileSignature>,
    provisioner: &dyn Provisioner,
) -> Result<FormatterStep, StepError> {
    klean_util::maven::validate_version(version)
        .map_err(|e| StepError::validation(e.to_string()))?;

    let mut config = StepConfig::new(coordinate(version));
    config.set_file_ref("diktat-config", rules_config.cloned());

    FormatterStep::compile("diktat", &config, provisioner)
}
