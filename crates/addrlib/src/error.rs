/// Errors returned by every public addressing entry point.
///
/// Results are all-or-nothing: an `Err` never comes with a partially
/// filled output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddrError {
    /// Malformed or mutually incompatible input.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// A recognised combination this hardware generation does not handle.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// A declared operation without an implementation.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
}

impl AddrError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        let message = message.into();
        log::debug!("rejected: {message}");
        Self::InvalidParameters(message)
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        let message = message.into();
        log::debug!("unsupported: {message}");
        Self::NotSupported(message)
    }
}
