//! The ordered step list and its slot-replace discipline.

use std::path::{Path, PathBuf};

use klean_steps::error::StepError;
use klean_steps::provision::Provisioner;
use klean_steps::step::FormatterStep;

use crate::diktat::DiktatFormat;
use crate::ktfmt::KtfmtConfig;
use crate::ktlint::KtlintFormat;

/// Target globs applied when the configuration names none.
pub const DEFAULT_TARGETS: &[&str] = &["**/*.kt", "**/*.kts"];

/// A builder's fixed position in the pipeline's step list.
///
/// Deliberately an index into the externally owned list rather than a
/// reference to the step, so builders and the pipeline never form an
/// ownership cycle. Slots are handed out by [`FormatPipeline::add_step`]
/// and stay valid for the pipeline's lifetime (steps are only ever
/// replaced, never removed or reordered).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StepSlot(usize);

/// An ordered formatter pipeline under construction.
///
/// Owns the step list, the target globs, and the [`Provisioner`] that
/// step factories resolve tools through. Builders borrow the pipeline
/// mutably while live, so the configuration phase is sequential by
/// construction; disjoint slots need no further coordination.
pub struct FormatPipeline {
    root: PathBuf,
    provisioner: Box<dyn Provisioner>,
    steps: Vec<FormatterStep>,
    targets: Vec<String>,
}

impl FormatPipeline {
    /// Create an empty pipeline rooted at a project directory.
    ///
    /// `root` anchors relative config-file references and the default
    /// `.editorconfig` probe; `provisioner` is handed to every step
    /// compile.
    pub fn new(root: &Path, provisioner: Box<dyn Provisioner>) -> Self {
        Self {
            root: root.to_path_buf(),
            provisioner,
            steps: Vec::new(),
            targets: DEFAULT_TARGETS.iter().map(|t| (*t).to_owned()).collect(),
        }
    }

    /// The project root this pipeline was created for.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The tool-resolution collaborator supplied by the pipeline owner.
    pub fn provisioner(&self) -> &dyn Provisioner {
        self.provisioner.as_ref()
    }

    /// The file-target globs, relative to the root.
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Replace the target globs.
    pub fn set_targets(&mut self, targets: Vec<String>) {
        self.targets = targets;
    }

    /// The registered steps, in registration order.
    pub fn steps(&self) -> &[FormatterStep] {
        &self.steps
    }

    /// All files under the root matching any target glob, sorted and
    /// deduplicated.
    ///
    /// # Errors
    /// Returns an error if a target glob is invalid.
    pub fn matched_files(&self) -> Result<Vec<PathBuf>, StepError> {
        let mut files = Vec::new();
        for target in &self.targets {
            files.extend(klean_util::fs::collect_matching(&self.root, target)?);
        }
        files.sort();
        files.dedup();
        Ok(files)
    }

    /// Append a step, returning the slot it will occupy forever after.
    pub(crate) fn add_step(&mut self, step: FormatterStep) -> StepSlot {
        self.steps.push(step);
        StepSlot(self.steps.len() - 1)
    }

    /// Replace the step at a slot with a newly compiled one.
    ///
    /// The list length and every other slot's content are untouched.
    pub(crate) fn replace_step(&mut self, slot: StepSlot, step: FormatterStep) {
        if let Some(registered) = self.steps.get_mut(slot.0) {
            *registered = step;
        }
    }

    /// Bind ktlint at its default version.
    ///
    /// # Errors
    /// Propagates compile errors from the initial registration.
    pub fn ktlint(&mut self) -> Result<KtlintFormat<'_>, StepError> {
        KtlintFormat::register(self, klean_steps::ktlint::DEFAULT_VERSION)
    }

    /// Bind a specific ktlint version.
    ///
    /// # Errors
    /// Propagates compile errors from the initial registration.
    pub fn ktlint_version(&mut self, version: &str) -> Result<KtlintFormat<'_>, StepError> {
        KtlintFormat::register(self, version)
    }

    /// Bind ktfmt at its default version.
    ///
    /// # Errors
    /// Propagates compile errors from the initial registration.
    pub fn ktfmt(&mut self) -> Result<KtfmtConfig<'_>, StepError> {
        KtfmtConfig::register(self, klean_steps::ktfmt::DEFAULT_VERSION)
    }

    /// Bind a specific ktfmt version.
    ///
    /// # Errors
    /// Propagates compile errors from the initial registration.
    pub fn ktfmt_version(&mut self, version: &str) -> Result<KtfmtConfig<'_>, StepError> {
        KtfmtConfig::register(self, version)
    }

    /// Bind diktat at its default version.
    ///
    /// # Errors
    /// Propagates compile errors from the initial registration.
    pub fn diktat(&mut self) -> Result<DiktatFormat<'_>, StepError> {
        DiktatFormat::register(self, klean_steps::diktat::DEFAULT_VERSION)
    }

    /// Bind a specific diktat version.
    ///
    /// # Errors
    /// Propagates compile errors from the initial registration.
    pub fn diktat_version(&mut self, version: &str) -> Result<DiktatFormat<'_>, StepError> {
        DiktatFormat::register(self, version)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::fs;
    use std::path::PathBuf;

    use klean_steps::provision::ProvisionedTool;
    use klean_util::maven::MavenCoordinate;

    use super::*;

    /// Resolves every coordinate to a deterministic fake jar.
    pub(crate) struct StubProvisioner;

    impl Provisioner for StubProvisioner {
        fn provision(&self, coordinate: &MavenCoordinate) -> Result<ProvisionedTool, StepError> {
            Ok(ProvisionedTool {
                coordinate: coordinate.clone(),
                jar_path: PathBuf::from("/stub").join(coordinate.filename()),
                sha256: klean_util::hash::sha256_bytes(coordinate.label().as_bytes()),
            })
        }
    }

    pub(crate) fn pipeline_at(root: &Path) -> FormatPipeline {
        FormatPipeline::new(root, Box::new(StubProvisioner))
    }

    #[test]
    fn builders_occupy_disjoint_slots_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline_at(tmp.path());

        pipeline.ktlint().unwrap();
        pipeline.ktfmt().unwrap();
        pipeline.diktat().unwrap();

        let names: Vec<&str> = pipeline.steps().iter().map(|s| s.name()).collect();
        assert_eq!(names, ["ktlint", "ktfmt", "diktat"]);
    }

    #[test]
    fn mutating_one_builder_leaves_others_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("rules.yml"), b"- name: DIKTAT_COMMON").unwrap();
        let mut pipeline = pipeline_at(tmp.path());

        pipeline.ktlint().unwrap();
        pipeline.ktfmt().unwrap();
        let ktlint_before = pipeline.steps().first().cloned().unwrap();
        let ktfmt_before = pipeline.steps().get(1).cloned().unwrap();

        {
            let mut diktat = pipeline.diktat().unwrap();
            diktat
                .config_file(Some(Path::new("rules.yml")))
                .unwrap();
        }

        assert_eq!(pipeline.steps().len(), 3);
        assert_eq!(pipeline.steps().first(), Some(&ktlint_before));
        assert_eq!(pipeline.steps().get(1), Some(&ktfmt_before));
    }

    #[test]
    fn matched_files_union_of_targets() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("Main.kt"), b"").unwrap();
        fs::write(tmp.path().join("build.gradle.kts"), b"").unwrap();
        fs::write(tmp.path().join("README.md"), b"").unwrap();

        let pipeline = pipeline_at(tmp.path());
        let files = pipeline.matched_files().unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn custom_targets_replace_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("build.gradle.kts"), b"").unwrap();
        fs::write(tmp.path().join("Main.kt"), b"").unwrap();

        let mut pipeline = pipeline_at(tmp.path());
        pipeline.set_targets(vec!["*.gradle.kts".to_owned()]);

        let files = pipeline.matched_files().unwrap();
        assert_eq!(files.len(), 1);
        assert!(files.first().unwrap().ends_with("build.gradle.kts"));
    }

    #[test]
    fn matched_files_deduplicates_overlapping_targets() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("Main.kt"), b"").unwrap();

        let mut pipeline = pipeline_at(tmp.path());
        pipeline.set_targets(vec!["*.kt".to_owned(), "**/*.kt".to_owned()]);

        assert_eq!(pipeline.matched_files().unwrap().len(), 1);
    }
}
