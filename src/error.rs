use thiserror::Error;

/// Failures the pipelines report to the operator.
///
/// These travel inside `anyhow::Error` chains; callers that need to branch on
/// the kind use `err.downcast_ref::<AdmError>()`.
#[derive(Debug, Error)]
pub enum AdmError {
    /// Bad operator input (unknown method, unresolved schema in strict mode, ...).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Boundary data could not be fetched, located or parsed.
    #[error("source unavailable ({provider}): {reason}")]
    SourceUnavailable { provider: &'static str, reason: String },
}

impl AdmError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn unavailable(provider: &'static str, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable { provider, reason: reason.into() }
    }

    /// Wrap an arbitrary failure (keeping its full context chain) as unavailable.
    pub(crate) fn unavailable_from(provider: &'static str, err: anyhow::Error) -> Self {
        Self::unavailable(provider, format!("{err:#}"))
    }
}
