use crate::frozen::Frozen;

/// Whether `value` can be written back as a literal that evaluates to an equal value.
///
/// Plain mappings with string keys, arrays and literal primitives qualify.
/// Cycles, instances of named types, functions, symbols and opaque values do not.
pub fn is_simple_object_tree(value: &Frozen) -> bool {
    match value {
        Frozen::Undefined
        | Frozen::Null
        | Frozen::Bool(_)
        | Frozen::Number(_)
        | Frozen::String(_)
        | Frozen::Bytes(_)
        | Frozen::Date(_)
        | Frozen::Regex(_) => true,
        Frozen::Array(items) => items.iter().all(is_simple_object_tree),
        Frozen::Object(object) => {
            object.constructor.is_none()
                && object.entries.iter().all(|(key, value)| {
                    matches!(key, Frozen::String(_)) && is_simple_object_tree(value)
                })
        }
        Frozen::Function(_) | Frozen::Symbol(_) | Frozen::Opaque { .. } | Frozen::Circular => {
            false
        }
    }
}
