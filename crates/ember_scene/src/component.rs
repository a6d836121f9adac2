//! Component trait and typed identifiers.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A pool-local component instance id.
///
/// Assigned on insertion, recycled lowest-first after removal. Local to one
/// [`ComponentPool`](crate::ComponentPool); two pools may both contain a
/// component with id 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub u32);

/// A dense, process-wide identifier for a component *type*.
///
/// Assigned by the [`ComponentRegistry`](crate::ComponentRegistry) in
/// registration order, which makes array-indexed dispatch possible wherever
/// a scene holds one pool per registered type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentTypeId(pub u32);

/// A typed data fragment attachable to at most one entity per type.
///
/// Components must serialize to an object with named fields, since the
/// scene wraps them as `{"type": <name>, ...fields}` in entity documents. The
/// `Default` value is the starting point for decode, so partially-specified
/// documents (and archetype overrides) fill in only the fields they name.
///
/// # Examples
///
/// ```rust
/// use serde::{Serialize, Deserialize};
/// use ember_scene::Component;
///
/// #[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
/// struct Health {
///     current: f32,
///     max: f32,
/// }
///
/// impl Component for Health {
///     fn type_name() -> &'static str { "Health" }
/// }
/// ```
pub trait Component: Clone + Default + Serialize + DeserializeOwned + 'static {
    /// The stable name this component type is registered and encoded under.
    fn type_name() -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Health {
        current: f32,
        max: f32,
    }

    impl Component for Health {
        fn type_name() -> &'static str {
            "Health"
        }
    }

    #[test]
    fn test_type_name_is_stable() {
        assert_eq!(Health::type_name(), "Health");
    }

    #[test]
    fn test_component_serializes_to_named_fields() {
        let health = Health {
            current: 80.0,
            max: 100.0,
        };
        let value = serde_json::to_value(&health).unwrap();
        assert!(value.is_object());
        assert_eq!(value["max"], 100.0);
    }
}
