use serde::Deserialize;

/// Configuration for a cache [`Store`](crate::Store) and its
/// [`WorkerPool`](crate::WorkerPool).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// The name used to tag log events emitted for this cache.
    pub name: String,

    /// Maximum number of background lookups running at once.
    ///
    /// Values below 1 are clamped to 1; see
    /// [`WorkerPool::new`](crate::WorkerPool::new).
    pub max_workers: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            name: "lookaside".to_owned(),
            max_workers: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config: CacheConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CacheConfig::default());
    }

    #[test]
    fn test_fields_override_defaults() {
        let config: CacheConfig =
            serde_json::from_str(r#"{"name": "remote-facts", "max_workers": 4}"#).unwrap();
        assert_eq!(config.name, "remote-facts");
        assert_eq!(config.max_workers, 4);
    }
}
