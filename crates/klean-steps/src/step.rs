//! The immutable execution unit handed to the incremental-build engine.

use std::fmt;

use crate::error::StepError;
use crate::provision::{ProvisionedTool, Provisioner};
use crate::snapshot::StepConfig;

/// A content-addressed cache key wrapping a SHA-256 hex string.
///
/// Computed over the snapshot's canonical serialization plus the resolved
/// tool fingerprint, so both a configuration change and a re-published
/// jar at the same version invalidate cached results.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    fn compute(canonical_config: &str, tool_fingerprint: &str) -> Self {
        Self(klean_util::hash::cache_key(&[
            canonical_config,
            tool_fingerprint,
        ]))
    }

    /// Return the hex string representation of this cache key.
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An immutable, serialization-comparable unit of work.
///
/// The pipeline's step list owns these; builders hold only a slot index
/// after registration. The engine treats steps as opaque values compared
/// by serialization, which is what [`PartialEq`] implements here: two
/// steps are equal when their canonical configuration and resolved tool
/// agree, regardless of being distinct instances.
#[derive(Debug, Clone)]
pub struct FormatterStep {
    name: String,
    canonical_config: String,
    cache_key: CacheKey,
    tool: ProvisionedTool,
}

impl FormatterStep {
    /// Compile a snapshot into a step.
    ///
    /// Pure over `config`: the snapshot is read, never mutated, and equal
    /// snapshots compile to serialization-equal steps. The only outward
    /// effect is resolving the tool through `provisioner`.
    ///
    /// # Errors
    /// Propagates `StepError::UnsupportedValue` from canonicalization and
    /// `StepError::ToolResolution` from the provisioner, unswallowed.
    pub fn compile(
        name: &str,
        config: &StepConfig,
        provisioner: &dyn Provisioner,
    ) -> Result<Self, StepError> {
        let canonical_config = config.canonical_text()?;
        let tool = provisioner.provision(config.tool())?;
        let cache_key = CacheKey::compute(&canonical_config, &tool.sha256);
        Ok(Self {
            name: name.to_owned(),
            canonical_config,
            cache_key,
            tool,
        })
    }

    /// The formatter name ("ktlint", "ktfmt", "diktat").
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The canonical serialization the cache key was computed from.
    pub fn canonical_config(&self) -> &str {
        &self.canonical_config
    }

    /// The step's content-addressed identity.
    pub fn cache_key(&self) -> &CacheKey {
        &self.cache_key
    }

    /// The resolved tool backing this step.
    pub fn tool(&self) -> &ProvisionedTool {
        &self.tool
    }
}

impl PartialEq for FormatterStep {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.cache_key == other.cache_key
    }
}

impl Eq for FormatterStep {}
