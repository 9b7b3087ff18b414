//! Error types for klean-steps.

/// Errors produced while compiling formatter steps.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// Bad or missing required input, e.g. an explicitly referenced file
    /// that does not exist.
    #[error("invalid configuration: {message}")]
    Validation { message: String },

    /// The serializer cannot canonicalize a configured value.
    #[error("unsupported config value for `{key}`: {reason}")]
    UnsupportedValue { key: String, reason: String },

    /// The provisioner cannot obtain the requested tool version.
    #[error("cannot resolve {coordinate}: {message}")]
    ToolResolution { coordinate: String, message: String },

    /// A filesystem operation failed.
    #[error("cannot access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// A utility operation failed.
    #[error("{0}")]
    Util(#[from] klean_util::error::UtilError),
}

impl StepError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
