use std::collections::BTreeMap;
use std::fmt::Display;

/// Named parameters a key template is rendered against.
///
/// Values are stored in their rendered string form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    ///
    /// ```
    /// use keepsake_template::Params;
    ///
    /// let params = Params::new().with("flow", "etl").with("run", 7);
    /// assert_eq!(params.get("run"), Some("7"));
    /// ```
    pub fn with(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert a parameter, returning the previous value if one was set.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Display) -> Option<String> {
        self.0.insert(name.into(), value.to_string())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Display> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

impl<K: Into<String>, V: Display, const N: usize> From<[(K, V); N]> for Params {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_and_lookup() {
        let p = Params::new().with("name", "a").with("id", 42);
        assert_eq!(p.get("name"), Some("a"));
        assert_eq!(p.get("id"), Some("42"));
        assert_eq!(p.get("missing"), None);
        assert!(p.contains("id"));
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn insert_replaces() {
        let mut p = Params::new();
        assert_eq!(p.insert("k", "v1"), None);
        assert_eq!(p.insert("k", "v2"), Some("v1".to_string()));
        assert_eq!(p.get("k"), Some("v2"));
    }

    #[test]
    fn from_array_and_iter_order() {
        let p = Params::from([("b", 2), ("a", 1)]);
        let names: Vec<_> = p.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(Params::new().is_empty());
    }
}
