use thiserror::Error;

/// Configuration errors raised while policies and challenge events are built.
///
/// None of these are produced while a request is being handled.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthzError {
    #[error("invalid argument: '{0}' must not be empty or whitespace")]
    InvalidArgument(&'static str),

    #[error("policy '{0}' has no requirements")]
    EmptyPolicy(String),

    #[error("unknown authorization policy '{0}'")]
    UnknownPolicy(String),
}

/// Reject empty / whitespace-only scope strings.
pub(crate) fn non_blank(name: &'static str, value: String) -> Result<String, AuthzError> {
    if value.trim().is_empty() {
        return Err(AuthzError::InvalidArgument(name));
    }
    Ok(value)
}
