#![forbid(unsafe_code)]
//! The declarative configuration surface of klean.
//!
//! A [`FormatPipeline`] owns the ordered step list. Formatter builders
//! ([`KtlintFormat`], [`KtfmtConfig`], [`DiktatFormat`]) register one step
//! each at construction and re-register a freshly compiled step on every
//! successful setter call, never editing a registered step in place.

pub mod diktat;
pub mod ktfmt;
pub mod ktlint;
pub mod pipeline;

pub use diktat::DiktatFormat;
pub use ktfmt::KtfmtConfig;
pub use ktlint::KtlintFormat;
pub use pipeline::FormatPipeline;
