//! The ktfmt binding: style selection plus a formatting-options view.

use klean_steps::error::StepError;
use klean_steps::ktfmt::{KtfmtFormattingOptions, KtfmtStyle};
use klean_steps::step::FormatterStep;

use crate::pipeline::{FormatPipeline, StepSlot};

/// Mutable front end for one ktfmt step.
///
/// Registered at construction with the Meta style and no extra options.
/// Style setters and [`KtfmtConfig::configure`] both funnel through the
/// same recompile-and-replace cycle; the options closure is a view over
/// this binding's single configuration, not an independently registered
/// sub-builder.
pub struct KtfmtConfig<'a> {
    pipeline: &'a mut FormatPipeline,
    slot: StepSlot,
    version: String,
    style: KtfmtStyle,
    options: Option<KtfmtFormattingOptions>,
}

impl<'a> KtfmtConfig<'a> {
    pub(crate) fn register(
        pipeline: &'a mut FormatPipeline,
        version: &str,
    ) -> Result<Self, StepError> {
        let style = KtfmtStyle::default();
        let step = klean_steps::ktfmt::create(version, style, None, pipeline.provisioner())?;
        let slot = pipeline.add_step(step);
        Ok(Self {
            pipeline,
            slot,
            version: version.to_owned(),
            style,
            options: None,
        })
    }

    /// Select ktfmt's Meta (default) style.
    ///
    /// # Errors
    /// Propagates compile errors; the previous step stays registered.
    pub fn meta_style(&mut self) -> Result<&mut Self, StepError> {
        self.set_style(KtfmtStyle::Meta)
    }

    /// Select the Google style.
    ///
    /// # Errors
    /// Propagates compile errors; the previous step stays registered.
    pub fn google_style(&mut self) -> Result<&mut Self, StepError> {
        self.set_style(KtfmtStyle::Google)
    }

    /// Select the kotlinlang style.
    ///
    /// # Errors
    /// Propagates compile errors; the previous step stays registered.
    pub fn kotlinlang_style(&mut self) -> Result<&mut Self, StepError> {
        self.set_style(KtfmtStyle::KotlinLang)
    }

    /// Edit the formatting options through a closure over the current
    /// values, then recompile once.
    ///
    /// # Errors
    /// Propagates compile errors; the previous options and step stay in
    /// place on failure.
    pub fn configure(
        &mut self,
        configure: impl FnOnce(&mut KtfmtFormattingOptions),
    ) -> Result<&mut Self, StepError> {
        let mut candidate = self.options.clone().unwrap_or_default();
        configure(&mut candidate);
        let step = self.compile(self.style, Some(&candidate))?;
        self.options = Some(candidate);
        self.pipeline.replace_step(self.slot, step);
        Ok(self)
    }

    fn set_style(&mut self, style: KtfmtStyle) -> Result<&mut Self, StepError> {
        let step = self.compile(style, self.options.as_ref())?;
        self.style = style;
        self.pipeline.replace_step(self.slot, step);
        Ok(self)
    }

    fn compile(
        &self,
        style: KtfmtStyle,
        options: Option<&KtfmtFormattingOptions>,
    ) -> Result<FormatterStep, StepError> {
        klean_steps::ktfmt::create(&self.version, style, options, self.pipeline.provisioner())
    }
}
