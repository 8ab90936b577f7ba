use std::collections::HashMap;
use std::sync::Arc;

use snapfix_value::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    #[error("unknown assertion `{0}`")]
    Unknown(String),

    #[error("`{adapter}` cannot be applied to a value of kind `{kind}`")]
    Unsupported {
        adapter: String,
        kind: &'static str,
    },
}

/// Transforms the subject before the base assertion sees it.
pub type AdapterFn = dyn Fn(&Value) -> Result<Value, AdapterError> + Send + Sync;

/// Named subject transformations, selected by the words in front of the base
/// assertion (`when sorted to equal snapshot`).
#[derive(Clone)]
pub struct Adapters {
    adapters: HashMap<String, Arc<AdapterFn>>,
}

impl std::fmt::Debug for Adapters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.adapters.keys().collect();
        names.sort();
        f.debug_struct("Adapters").field("adapters", &names).finish()
    }
}

impl Default for Adapters {
    fn default() -> Self {
        let mut adapters = Self {
            adapters: HashMap::new(),
        };
        adapters.register("noop", |value| Ok(value.clone()));
        adapters.register("when sorted", sorted);
        adapters.register("when trimmed", trimmed);
        adapters
    }
}

impl Adapters {
    pub fn register<F>(&mut self, name: impl Into<String>, adapter: F)
    where
        F: Fn(&Value) -> Result<Value, AdapterError> + Send + Sync + 'static,
    {
        self.adapters.insert(name.into(), Arc::new(adapter));
    }

    pub fn apply(&self, name: &str, value: &Value) -> Result<Value, AdapterError> {
        let adapter = self
            .adapters
            .get(name)
            .ok_or_else(|| AdapterError::Unknown(name.to_string()))?;
        adapter(value)
    }
}

/// A copy of an array with its elements ordered by their inspected text.
fn sorted(value: &Value) -> Result<Value, AdapterError> {
    let Value::Array(items) = value else {
        return Err(AdapterError::Unsupported {
            adapter: "when sorted".to_string(),
            kind: value.kind(),
        });
    };
    let mut keyed: Vec<(String, Value)> = items
        .borrow()
        .iter()
        .map(|item| (item.freeze().to_text(), item.clone()))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| a.cmp(b));
    Ok(Value::array(keyed.into_iter().map(|(_, item)| item)))
}

fn trimmed(value: &Value) -> Result<Value, AdapterError> {
    match value.as_str() {
        Some(text) => Ok(Value::from(text.trim())),
        None => Err(AdapterError::Unsupported {
            adapter: "when trimmed".to_string(),
            kind: value.kind(),
        }),
    }
}
