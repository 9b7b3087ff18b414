//! The diktat binding.

use std::path::Path;

use klean_steps::error::StepError;
use klean_steps::signature::FileSignature;
use klean_steps::step::FormatterStep;

use crate::pipeline::{FormatPipeline, StepSlot};

/// Mutable front end for one diktat step.
pub struct DiktatFormat<'a> {
    pipeline: &'a mut FormatPipeline,
    slot: StepSlot,
    version: String,
    rules_config: Option<FileSignature>,
}

impl std::fmt::Debug for DiktatFormat<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiktatFormat")
            .field("slot", &self.slot)
            .field("version", &self.version)
            .field("rules_config", &self.rules_config)
            .finish_non_exhaustive()
    }
}

impl<'a> DiktatFormat<'a> {
    pub(crate) fn register(
        pipeline: &'a mut FormatPipeline,
        version: &str,
    ) -> Result<Self, StepError> {
        let step = klean_steps::diktat::create(version, None, pipeline.provisioner())?;
        let slot = pipeline.add_step(step);
        Ok(Self {
            pipeline,
            slot,
            version: version.to_owned(),
            rules_config: None,
        })
    }

    /// Point the binding at a diktat rules-config file, or clear the
    /// reference with `None`. Relative paths resolve against the pipeline
    /// root; the file is signed eagerly.
    ///
    /// # Errors
    /// Fails validation if the referenced file does not exist; the
    /// previously registered step then stays in place.
    pub fn config_file(&mut self, path: Option<&Path>) -> Result<&mut Self, StepError> {
        let candidate = match path {
            None => None,
            Some(p) => {
                let resolved = if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    self.pipeline.root().join(p)
                };
                Some(FileSignature::sign(&resolved)?)
            }
        };
        let step = self.compile(candidate.as_ref())?;
        self.rules_config = candidate;
        self.pipeline.replace_step(self.slot, step);
        Ok(self)
    }

    fn compile(&self, rules_config: Option<&FileSignature>) -> Result<FormatterStep, StepError> {
        klean_steps::diktat::create(&self.version, rules_config, self.pipeline.provisioner())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use super::*;
    use crate::pipeline::tests::pipeline_at;

    #[test]
    fn registers_with_absent_rules_config() {
        let tmp = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline_at(tmp.path());
        pipeline.diktat().unwrap();

        assert_eq!(pipeline.steps().len(), 1);
        assert!(pipeline
            .steps()
            .first()
            .unwrap()
            .canonical_config()
            .contains("\"diktat-config\":absent"));
    }

    #[test]
    fn missing_rules_file_keeps_previous_step() {
        let tmp = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline_at(tmp.path());
        let mut diktat = pipeline.diktat().unwrap();
        let before = diktat.pipeline.steps().first().cloned().unwrap();

        let err = diktat
            .config_file(Some(Path::new("missing-diktat.yml")))
            .unwrap_err();
        assert!(matches!(err, StepError::Validation { .. }));
        assert_eq!(diktat.pipeline.steps().first(), Some(&before));
    }

    #[test]
    fn rules_config_content_feeds_cache_key() {
        let tmp = tempfile::tempdir().unwrap();
        let rules = tmp.path().join("diktat-analysis.yml");
        fs::write(&rules, b"- name: DIKTAT_COMMON").unwrap();

        let mut pipeline = pipeline_at(tmp.path());
        let mut diktat = pipeline.diktat().unwrap();
        let before = diktat.pipeline.steps().first().cloned().unwrap();

        diktat.config_file(Some(Path::new("diktat-analysis.yml"))).unwrap();
        let after = diktat.pipeline.steps().first().cloned().unwrap();

        assert_ne!(before.cache_key(), after.cache_key());
        assert!(after
            .canonical_config()
            .contains(&klean_util::hash::sha256_bytes(b"- name: DIKTAT_COMMON")));
    }

    #[test]
    fn clearing_restores_default_serialization() {
        let tmp = tempfile::tempdir().unwrap();
        let rules = tmp.path().join("diktat-analysis.yml");
        fs::write(&rules, b"- name: DIKTAT_COMMON").unwrap();

        let mut pipeline = pipeline_at(tmp.path());
        let mut diktat = pipeline.diktat().unwrap();
        let fresh = diktat.pipeline.steps().first().cloned().unwrap();

        diktat.config_file(Some(&rules)).unwrap();
        diktat.config_file(None).unwrap();

        assert_eq!(diktat.pipeline.steps().first(), Some(&fresh));
    }
}
