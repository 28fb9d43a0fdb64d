//! Layer merging.
//!
//! Typed layers merge field by field through [`Layered`]: a patch value that is
//! present replaces scalars, unions maps (recursing into existing keys) and
//! replaces vectors wholesale. Free-form JSON fields go through [`deep_merge`],
//! which follows the same rule: objects merge recursively, everything else
//! (arrays included) is replaced.

use serde_json::Value;
use std::collections::BTreeMap;

/// A value that a configuration layer can patch.
pub trait Layered {
    /// The partial form a layer carries for this value.
    type Patch;

    fn apply(&mut self, patch: Self::Patch);
}

macro_rules! replace_layer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Layered for $ty {
                type Patch = $ty;

                fn apply(&mut self, patch: $ty) {
                    *self = patch;
                }
            }
        )*
    };
}

replace_layer!(String, bool, u64);

/// Arrays are replaced, never concatenated: a layer that sets `keywords`
/// owns the whole list.
impl<T> Layered for Vec<T> {
    type Patch = Vec<T>;

    fn apply(&mut self, patch: Vec<T>) {
        *self = patch;
    }
}

impl Layered for Option<String> {
    type Patch = String;

    fn apply(&mut self, patch: String) {
        *self = Some(patch);
    }
}

impl Layered for Value {
    type Patch = Value;

    fn apply(&mut self, patch: Value) {
        deep_merge(self, patch);
    }
}

impl Layered for Option<Value> {
    type Patch = Value;

    fn apply(&mut self, patch: Value) {
        match self {
            Some(base) => deep_merge(base, patch),
            None => *self = Some(patch),
        }
    }
}

impl<V> Layered for BTreeMap<String, V>
where
    V: Layered + Default,
{
    type Patch = BTreeMap<String, V::Patch>;

    fn apply(&mut self, patch: Self::Patch) {
        for (key, value) in patch {
            self.entry(key).or_default().apply(value);
        }
    }
}

/// Recursive merge of free-form JSON. Objects union their keys, recursing where
/// both sides hold an object; any other patch value replaces the base.
pub fn deep_merge(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                match base_map.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge(existing, value);
                    }
                    _ => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

/// Non-mutating form of [`deep_merge`].
pub fn merged(base: &Value, patch: &Value) -> Value {
    let mut out = base.clone();
    deep_merge(&mut out, patch.clone());
    out
}

/// Declares a configuration struct together with its all-optional patch form
/// and the field-by-field [`Layered`] impl joining them.
macro_rules! layered {
    (
        $(#[$meta:meta])*
        pub struct $name:ident / $patch:ident {
            $(
                $(#[$fmeta:meta])*
                pub $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        pub struct $name {
            $(
                $(#[$fmeta])*
                pub $field: $ty,
            )*
        }

        #[derive(Debug, Clone, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(default, rename_all = "camelCase")]
        pub struct $patch {
            $(
                $(#[$fmeta])*
                #[serde(skip_serializing_if = "Option::is_none")]
                pub $field: Option<<$ty as $crate::store::merge::Layered>::Patch>,
            )*
        }

        impl $crate::store::merge::Layered for $name {
            type Patch = $patch;

            fn apply(&mut self, patch: $patch) {
                $(
                    if let Some(value) = patch.$field {
                        $crate::store::merge::Layered::apply(&mut self.$field, value);
                    }
                )*
            }
        }
    };
}

pub(crate) use layered;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn objects_merge_recursively() {
        let mut base = json!({ "a": { "x": 1, "y": 2 }, "b": "keep" });
        deep_merge(&mut base, json!({ "a": { "y": 3, "z": 4 } }));
        assert_eq!(base, json!({ "a": { "x": 1, "y": 3, "z": 4 }, "b": "keep" }));
    }

    #[test]
    fn arrays_are_replaced_not_appended() {
        let mut base = json!({ "keywords": ["a", "b"] });
        deep_merge(&mut base, json!({ "keywords": ["x"] }));
        assert_eq!(base, json!({ "keywords": ["x"] }));
    }

    #[test]
    fn scalar_replaces_object_and_back() {
        let mut base = json!({ "a": { "x": 1 } });
        deep_merge(&mut base, json!({ "a": 5 }));
        assert_eq!(base, json!({ "a": 5 }));
        deep_merge(&mut base, json!({ "a": { "y": 1 } }));
        assert_eq!(base, json!({ "a": { "y": 1 } }));
    }

    #[test]
    fn merging_a_value_into_itself_is_a_no_op() {
        let base = json!({ "a": { "x": [1, 2] }, "b": null, "c": "s" });
        assert_eq!(merged(&base, &base), base);
    }

    #[test]
    fn typed_vec_layer_replaces() {
        let mut v = vec!["a".to_owned(), "b".to_owned()];
        v.apply(vec!["x".to_owned()]);
        assert_eq!(v, vec!["x".to_owned()]);
    }

    #[test]
    fn typed_map_layer_unions_keys() {
        let mut base: BTreeMap<String, String> =
            [("football".to_owned(), "Football".to_owned())].into();
        base.apply([("hockey".to_owned(), "Ice Hockey".to_owned())].into());
        assert_eq!(base.len(), 2);
        assert_eq!(base["hockey"], "Ice Hockey");
    }
}
