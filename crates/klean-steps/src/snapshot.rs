//! The immutable configuration snapshot behind one formatter binding.

use serde_json::Value;

use klean_util::maven::MavenCoordinate;

use crate::error::StepError;
use crate::serial;
use crate::signature::FileSignature;

/// All options currently set for one formatter binding.
///
/// Builders own exactly one of these and mutate it between compiles; a
/// compiled [`crate::FormatterStep`] captures it by value. Equivalence for
/// caching purposes is defined by [`StepConfig::canonical_text`], never by
/// structural comparison: two snapshots built in different setter orders
/// must canonicalize identically.
#[derive(Debug, Clone)]
pub struct StepConfig {
    tool: MavenCoordinate,
    variant: Option<String>,
    named_options: Vec<(String, String)>,
    override_options: Vec<(String, Value)>,
    file_refs: Vec<(String, Option<FileSignature>)>,
}

impl StepConfig {
    /// Start a snapshot for the given tool artifact.
    pub fn new(tool: MavenCoordinate) -> Self {
        Self {
            tool,
            variant: None,
            named_options: Vec::new(),
            override_options: Vec::new(),
            file_refs: Vec::new(),
        }
    }

    /// The tool artifact this snapshot targets.
    pub fn tool(&self) -> &MavenCoordinate {
        &self.tool
    }

    /// Select a style variant (e.g. a ktfmt style). `None` clears it.
    pub fn set_variant(&mut self, variant: Option<&str>) {
        self.variant = variant.map(str::to_owned);
    }

    /// Replace the plain string options (kept in insertion order; the
    /// serializer sorts).
    pub fn set_named_options(&mut self, options: Vec<(String, String)>) {
        self.named_options = options;
    }

    /// Replace the opaque-valued override options.
    pub fn set_override_options(&mut self, options: Vec<(String, Value)>) {
        self.override_options = options;
    }

    /// Assign or clear a named file reference.
    ///
    /// Re-assigning an existing name replaces its signature; that is the
    /// only way a reference is ever refreshed. A `None` signature records
    /// the absent state, which canonicalizes the same as never configured.
    pub fn set_file_ref(&mut self, name: &str, signature: Option<FileSignature>) {
        if let Some(entry) = self.file_refs.iter_mut().find(|(n, _)| n == name) {
            entry.1 = signature;
        } else {
            self.file_refs.push((name.to_owned(), signature));
        }
    }

    /// Render the canonical, order-independent serialization of this
    /// snapshot.
    ///
    /// The text embeds file references as content fingerprints (never
    /// paths) and the absent state as the literal word `absent`, so the
    /// host engine's byte comparison sees exactly the inputs that affect
    /// formatting.
    ///
    /// # Errors
    /// Returns `StepError::UnsupportedValue` if any option value cannot be
    /// canonicalized.
    pub fn canonical_text(&self) -> Result<String, StepError> {
        let mut refs: Vec<(&str, Option<&str>)> = self
            .file_refs
            .iter()
            .map(|(name, sig)| (name.as_str(), sig.as_ref().map(FileSignature::fingerprint)))
            .collect();
        refs.sort_by_key(|(name, _)| *name);

        let mut files = String::from("{");
        for (i, (name, fingerprint)) in refs.iter().enumerate() {
            if i > 0 {
                files.push(',');
            }
            files.push_str(&Value::String((*name).to_owned()).to_string());
            files.push(':');
            match fingerprint {
                Some(hex) => files.push_str(&Value::String((*hex).to_owned()).to_string()),
                None => files.push_str("absent"),
            }
        }
        files.push('}');

        Ok([
            format!("tool={}:{}", self.tool.group_id, self.tool.artifact_id),
            format!("version={}", self.tool.version),
            format!("variant={}", self.variant.as_deref().unwrap_or("absent")),
            format!(
                "options={}",
                serial::canonical_string_entries(&self.named_options)?
            ),
            format!(
                "overrides={}",
                serial::canonical_entries(&self.override_options)?
            ),
            format!("files={files}"),
        ]
        .join("\n"))
    }
}
