//! The ktlint binding: one live configuration, one registered step.

use std::path::Path;

use serde_json::Value;

use klean_steps::error::StepError;
use klean_steps::signature::FileSignature;
use klean_steps::step::FormatterStep;

use crate::pipeline::{FormatPipeline, StepSlot};

/// Mutable front end for one ktlint step.
///
/// Created already registered: construction compiles the default binding
/// (probing the project root for an `.editorconfig`) and claims a slot.
/// Every setter recompiles from a candidate state and only commits, and
/// replaces the registered step, when the compile succeeds; a failed call
/// leaves the previous step authoritative.
pub struct KtlintFormat<'a> {
    pipeline: &'a mut FormatPipeline,
    slot: StepSlot,
    version: String,
    editor_config: Option<FileSignature>,
    user_data: Vec<(String, String)>,
    editor_config_override: Vec<(String, Value)>,
}

impl std::fmt::Debug for KtlintFormat<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KtlintFormat")
            .field("slot", &self.slot)
            .field("version", &self.version)
            .field("editor_config", &self.editor_config)
            .field("user_data", &self.user_data)
            .field("editor_config_override", &self.editor_config_override)
            .finish_non_exhaustive()
    }
}

impl<'a> KtlintFormat<'a> {
    pub(crate) fn register(
        pipeline: &'a mut FormatPipeline,
        version: &str,
    ) -> Result<Self, StepError> {
        // The root .editorconfig is a defaulted reference: absence is legal.
        let editor_config = FileSignature::sign_optional(&pipeline.root().join(".editorconfig"))?;
        let step = klean_steps::ktlint::create(
            version,
            editor_config.as_ref(),
            &[],
            &[],
            pipeline.provisioner(),
        )?;
        let slot = pipeline.add_step(step);
        Ok(Self {
            pipeline,
            slot,
            version: version.to_owned(),
            editor_config,
            user_data: Vec::new(),
            editor_config_override: Vec::new(),
        })
    }

    /// Point the binding at an explicit `.editorconfig`, or clear the
    /// reference with `None`.
    ///
    /// Relative paths resolve against the pipeline root. The file is
    /// signed eagerly; re-calling this setter is the only way to pick up
    /// changed content.
    ///
    /// # Errors
    /// Fails validation if the referenced file does not exist; the
    /// previously registered step then stays in place.
    pub fn editor_config_path(&mut self, path: Option<&Path>) -> Result<&mut Self, StepError> {
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
        let step = self.compile(candidate.as_ref(), &self.user_data, &self.editor_config_override)?;
        self.editor_config = candidate;
        self.pipeline.replace_step(self.slot, step);
        Ok(self)
    }

    /// Replace the plain string options passed to ktlint.
    ///
    /// # Errors
    /// Fails if the entries cannot be canonicalized (duplicate keys); the
    /// previously registered step then stays in place.
    pub fn user_data(&mut self, entries: Vec<(String, String)>) -> Result<&mut Self, StepError> {
        let step = self.compile(self.editor_config.as_ref(), &entries, &self.editor_config_override)?;
        self.user_data = entries;
        self.pipeline.replace_step(self.slot, step);
        Ok(self)
    }

    /// Replace the editor-config override map (opaque values laid over the
    /// signed `.editorconfig`).
    ///
    /// # Errors
    /// Fails if a value cannot be canonicalized (e.g. nulls); the
    /// previously registered step then stays in place.
    pub fn editor_config_override(
        &mut self,
        entries: Vec<(String, Value)>,
    ) -> Result<&mut Self, StepError> {
        let step = self.compile(self.editor_config.as_ref(), &self.user_data, &entries)?;
        self.editor_config_override = entries;
        self.pipeline.replace_step(self.slot, step);
        Ok(self)
    }

    fn compile(
        &self,
        editor_config: Option<&FileSignature>,
        user_data: &[(String, String)],
        editor_config_override: &[(String, Value)],
    ) -> Result<FormatterStep, StepError> {
        klean_steps::ktlint::create(
            &self.version,
            editor_config,
            user_data,
            editor_config_override,
            self.pipeline.provisioner(),
        )
    }
}
