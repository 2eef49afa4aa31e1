use std::collections::HashMap;

/// Query parameters after repeated keys have been collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankingParams {
    values: HashMap<String, String>,
}

impl RankingParams {
    /// Collapse decoded query pairs so that each key keeps its first occurrence.
    pub fn normalize<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut values = HashMap::new();
        for (key, value) in pairs {
            values.entry(key).or_insert(value);
        }
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Comma-separated path patterns; empty when absent.
    pub fn includes_paths(&self) -> &str {
        self.get("includes_paths").unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_repeated_key_keeps_first() {
        let params =
            RankingParams::normalize(pairs(&[("includes_paths", "a"), ("includes_paths", "b")]));
        assert_eq!(params.includes_paths(), "a");
    }

    #[test]
    fn test_missing_includes_paths_is_empty() {
        let params = RankingParams::normalize(pairs(&[("other", "x")]));
        assert_eq!(params.includes_paths(), "");
        assert_eq!(params.get("other"), Some("x"));
    }

    #[test]
    fn test_unrelated_keys_are_independent() {
        let params = RankingParams::normalize(pairs(&[
            ("x", "1"),
            ("includes_paths", "/blog.*"),
            ("x", "2"),
        ]));
        assert_eq!(params.get("x"), Some("1"));
        assert_eq!(params.includes_paths(), "/blog.*");
    }
}
