//! Document tree type and member-access helpers.
//!
//! The tree is `serde_json::Value`: objects are ordered maps of named
//! members, arrays are ordered element sequences. The helpers here turn
//! shape mismatches into [`DecodeError`]s with the offending member named,
//! which is most of what scene/entity decoding needs.

use crate::error::DecodeError;

/// The in-memory document tree.
pub type Value = serde_json::Value;

/// Look up an object member, if present.
///
/// Returns `None` when `value` is not an object or lacks the member; the
/// caller decides whether absence is an error.
#[must_use]
pub fn member<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    value.as_object().and_then(|obj| obj.get(name))
}

/// Look up a required string member.
///
/// # Errors
///
/// Returns [`DecodeError::MissingMember`] when absent and
/// [`DecodeError::UnexpectedShape`] when present but not a string.
pub fn member_str<'a>(value: &'a Value, name: &str) -> Result<&'a str, DecodeError> {
    match member(value, name) {
        None => Err(DecodeError::missing(name)),
        Some(v) => v.as_str().ok_or_else(|| DecodeError::shape(name, "a string")),
    }
}

/// Look up an optional array member.
///
/// Absence yields an empty slice view (`None`); a present non-array member
/// is a shape error.
///
/// # Errors
///
/// Returns [`DecodeError::UnexpectedShape`] when the member exists but is
/// not an array.
pub fn member_array<'a>(
    value: &'a Value,
    name: &str,
) -> Result<Option<&'a Vec<Value>>, DecodeError> {
    match member(value, name) {
        None => Ok(None),
        Some(v) => v
            .as_array()
            .map(Some)
            .ok_or_else(|| DecodeError::shape(name, "an array")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_lookup() {
        let v: Value = serde_json::json!({"name": "root", "children": []});
        assert!(member(&v, "name").is_some());
        assert!(member(&v, "missing").is_none());
        assert!(member(&serde_json::json!(42), "name").is_none());
    }

    #[test]
    fn test_member_str() {
        let v: Value = serde_json::json!({"type": "Transform3D"});
        assert_eq!(member_str(&v, "type").unwrap(), "Transform3D");

        let err = member_str(&v, "name").unwrap_err();
        assert!(matches!(err, DecodeError::MissingMember(_)));

        let v: Value = serde_json::json!({"type": 7});
        let err = member_str(&v, "type").unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedShape { .. }));
    }

    #[test]
    fn test_member_array() {
        let v: Value = serde_json::json!({"components": [1, 2]});
        assert_eq!(member_array(&v, "components").unwrap().unwrap().len(), 2);
        assert!(member_array(&v, "children").unwrap().is_none());

        let v: Value = serde_json::json!({"components": "nope"});
        assert!(member_array(&v, "components").is_err());
    }
}
