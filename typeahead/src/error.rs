//! Error types

/// Error reported by a remote candidate source.
///
/// Remote collaborators own their transport and retry policy; this type only
/// carries what went wrong back to the control.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct FetchError {
    /// Human-readable failure description.
    pub message: String,
    /// Underlying cause, if the collaborator has one.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl FetchError {
    /// Creates a fetch error with a message only.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a fetch error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Errors raised by the typeahead control.
///
/// Everything except [`TypeaheadError::Fetch`] is a configuration error: the
/// host wired the control up wrong and retrying will not help.
#[derive(Debug, thiserror::Error)]
pub enum TypeaheadError {
    /// A remote dispatch was requested but no remote source is configured.
    #[error("no remote source configured")]
    MissingRemoteSource,

    /// Local filtering was requested without a display path or display function.
    #[error("local filtering requires a display path or display function")]
    MissingDisplayStrategy,

    /// The configured display path is not a plain dotted property path.
    #[error("malformed display path '{path}': {reason}")]
    MalformedDisplayPath {
        /// The path as configured.
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A candidate does not have the shape the display path expects.
    #[error("cannot resolve display path '{path}': {reason}")]
    DisplayResolution {
        /// The path being resolved.
        path: String,
        /// Why resolution failed.
        reason: String,
    },

    /// The remote source failed. The control stays usable.
    #[error("remote fetch failed: {0}")]
    Fetch(#[from] FetchError),
}

impl TypeaheadError {
    /// Creates a malformed path error.
    pub fn malformed_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDisplayPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a display resolution error.
    pub fn resolution(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DisplayResolution {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if this is a configuration error rather than a fetch failure.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::Fetch(_))
    }
}
