//! Serialisation error taxonomy.

/// Errors raised while encoding a document or a component value.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// A value could not be represented in the document tree.
    #[error("failed to encode value: {0}")]
    Tree(#[from] serde_json::Error),

    /// Failed to write the binary stream mode.
    #[error("failed to encode binary stream: {0}")]
    Binary(#[from] rmp_serde::encode::Error),

    /// A value that must encode to an object (named fields) encoded to
    /// something else.
    #[error("value of type '{type_name}' does not encode to a document object")]
    NotAnObject {
        /// The registered name of the offending type.
        type_name: String,
    },
}

/// Errors raised while decoding a document.
///
/// Distinct from invalid-operation misuse: a `DecodeError` means the *data*
/// was malformed or semantically invalid, so callers can tell bad input
/// apart from programming errors. A scene that fails mid-decode should be
/// discarded.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Failed to parse the binary stream mode.
    #[error("failed to decode binary stream: {0}")]
    Binary(#[from] rmp_serde::decode::Error),

    /// Failed to parse the text tree mode.
    #[error("failed to decode text tree: {0}")]
    Text(#[from] serde_json::Error),

    /// A required member was absent from a document object.
    #[error("missing member '{0}'")]
    MissingMember(String),

    /// A member was present but had the wrong shape.
    #[error("member '{member}' is not {expected}")]
    UnexpectedShape {
        /// The offending member name.
        member: String,
        /// Human-readable description of the expected shape.
        expected: &'static str,
    },

    /// A type name in the document is not registered.
    #[error("unknown {kind} type '{name}'")]
    UnknownType {
        /// Which registry was consulted (`"component"`, `"system"`, `"scene"`).
        kind: &'static str,
        /// The unregistered name found in the document.
        name: String,
    },

    /// A referenced asset could not be loaded or decoded.
    #[error("failed to load asset '{path}': {reason}")]
    Asset {
        /// The asset path as written in the document.
        path: String,
        /// Why resolution failed.
        reason: String,
    },

    /// A scene operation failed while applying decoded data.
    #[error("invalid operation during decode: {0}")]
    Invalid(String),
}

impl DecodeError {
    /// Convenience constructor for [`DecodeError::MissingMember`].
    #[must_use]
    pub fn missing(member: &str) -> Self {
        Self::MissingMember(member.to_string())
    }

    /// Convenience constructor for [`DecodeError::UnexpectedShape`].
    #[must_use]
    pub fn shape(member: &str, expected: &'static str) -> Self {
        Self::UnexpectedShape {
            member: member.to_string(),
            expected,
        }
    }
}
