use std::collections::HashMap;

/// Inbound query parameters as a value object. Parameters are single-valued;
/// a repeated key keeps its first occurrence.
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    params: HashMap<String, String>,
}

impl RequestParams {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = HashMap::new();
        for (key, value) in pairs {
            params.entry(key).or_insert(value);
        }
        Self { params }
    }

    /// Convenience constructor for tests.
    pub fn of(pairs: &[(&str, &str)]) -> Self {
        Self::from_pairs(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Whether the key was literally present in the inbound request.
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn action(&self) -> Option<&str> {
        self.get("action")
    }

    pub fn hash(&self) -> Option<&str> {
        self.get("hash")
    }

    pub fn userid(&self) -> Option<&str> {
        self.get("userid")
    }

    pub fn userkey(&self) -> Option<&str> {
        self.get("userkey")
    }

    /// Verb selector within an endpoint; absent means GET.
    pub fn method(&self) -> &str {
        self.get("method").unwrap_or("GET")
    }

    /// JSONP callback name.
    pub fn prefix(&self) -> Option<&str> {
        self.get("prefix")
    }
}
