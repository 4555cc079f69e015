use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::signature::content_signature;

/// Truthiness in the cache's sense. Falsy values (null, false, zero, empty
/// string, empty collection) are treated as misses on every lookup.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Process-wide memoization for sheet reads. Entries are created lazily and
/// live until an explicit `clear`; no write path invalidates them.
#[derive(Debug, Default)]
pub struct SheetCache {
    data: Mutex<HashMap<String, Value>>,
}

impl SheetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached value if present and truthy; otherwise a truthy fallback is
    /// stored and returned; otherwise a miss.
    pub fn get(&self, key: &str, fallback: Option<Value>) -> Option<Value> {
        let cached = self.data.lock().expect("cache poisoned").get(key).cloned();
        if let Some(value) = cached {
            if truthy(&value) {
                return Some(value);
            }
        }
        match fallback {
            Some(value) if truthy(&value) => Some(self.set(key, value)),
            _ => None,
        }
    }

    /// Unconditional overwrite; returns the stored value.
    pub fn set(&self, key: &str, value: Value) -> Value {
        self.data
            .lock()
            .expect("cache poisoned")
            .insert(key.to_string(), value.clone());
        value
    }

    /// Deterministic memoization key over a name and its arguments.
    pub fn make_key(&self, name: &str, args: &Value) -> String {
        content_signature(&format!("{}{}", name, args))
    }

    /// Reset everything.
    pub fn clear(&self) {
        self.data.lock().expect("cache poisoned").clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_then_get_returns_value() {
        let cache = SheetCache::new();
        cache.set("k", json!(["a"]));
        assert_eq!(cache.get("k", Some(json!("other"))), Some(json!(["a"])));
    }

    #[test]
    fn truthy_fallback_is_stored() {
        let cache = SheetCache::new();
        assert_eq!(cache.get("k", Some(json!(42))), Some(json!(42)));
        assert_eq!(cache.get("k", None), Some(json!(42)));
    }

    #[test]
    fn falsy_fallback_is_a_miss() {
        let cache = SheetCache::new();
        assert_eq!(cache.get("k", Some(json!([]))), None);
        assert_eq!(cache.get("k", None), None);
    }

    #[test]
    fn falsy_cached_value_misses_every_time() {
        let cache = SheetCache::new();
        cache.set("k", json!([]));
        assert_eq!(cache.get("k", None), None);
        // and the fallback replaces it
        assert_eq!(cache.get("k", Some(json!(["x"]))), Some(json!(["x"])));
    }

    #[test]
    fn clear_drops_all_keys() {
        let cache = SheetCache::new();
        cache.set("a", json!(1));
        cache.set("b", json!(2));
        cache.clear();
        assert_eq!(cache.get("a", None), None);
        assert_eq!(cache.get("b", None), None);
    }

    #[test]
    fn make_key_is_deterministic() {
        let cache = SheetCache::new();
        let a = cache.make_key("fn", &json!({"x": 1}));
        let b = cache.make_key("fn", &json!({"x": 1}));
        let c = cache.make_key("fn", &json!({"x": 2}));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
