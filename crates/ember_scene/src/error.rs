//! Scene-core error type.

use ember_codec::DecodeError;

/// Programmer-visible misuse of the scene core.
///
/// Raised synchronously by the operation that was misused: operating on a
/// destroyed or non-existent entity, double-adding a component type,
/// removing an absent component, dereferencing an invalidated handle, or
/// looking up an unregistered type id/name. The operation is aborted and
/// never retried internally; recovery is the caller's decision.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid operation: {0}")]
pub struct InvalidOperation(String);

impl InvalidOperation {
    /// Create an error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// The message describing the misuse.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl From<InvalidOperation> for DecodeError {
    fn from(err: InvalidOperation) -> Self {
        DecodeError::Invalid(err.0)
    }
}
