use serde::{Deserialize, Serialize};

/// Configuration for the user_registry module (`modules.user_registry` in the app config)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserRegistryConfig {
    /// How many managers to create when the manager table is empty.
    #[serde(default = "default_seed_managers")]
    pub seed_managers: usize,
}

impl Default for UserRegistryConfig {
    fn default() -> Self {
        Self {
            seed_managers: default_seed_managers(),
        }
    }
}

fn default_seed_managers() -> usize {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_unknown_fields() {
        let cfg: UserRegistryConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(cfg.seed_managers, 3);

        let cfg: UserRegistryConfig =
            serde_json::from_value(serde_json::json!({ "seed_managers": 0 })).unwrap();
        assert_eq!(cfg.seed_managers, 0);

        let bad = serde_json::from_value::<UserRegistryConfig>(serde_json::json!({ "pages": 1 }));
        assert!(bad.is_err());
    }
}
