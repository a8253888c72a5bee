use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Challenge-response settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeConfig {
    /// Lifetime of an issued challenge, in seconds.
    #[serde(default = "default_challenge_ttl")]
    pub ttl_secs: u64,
}

fn default_challenge_ttl() -> u64 {
    60
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_challenge_ttl(),
        }
    }
}

/// Issuer keys authorized per attestation type.
///
/// Single-issuer types (AI, SPID, jury) take one key each; suspension is
/// governed by a set of authorities of which `suspension_threshold` must
/// co-sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub ai_issuer_keys: Vec<String>,
    #[serde(default)]
    pub spid_issuer_keys: Vec<String>,
    #[serde(default)]
    pub jury_issuer_keys: Vec<String>,
    #[serde(default)]
    pub suspension_keys: Vec<String>,
    #[serde(default = "default_suspension_threshold")]
    pub suspension_threshold: usize,
}

fn default_suspension_threshold() -> usize {
    2
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            ai_issuer_keys: Vec::new(),
            spid_issuer_keys: Vec::new(),
            jury_issuer_keys: Vec::new(),
            suspension_keys: Vec::new(),
            suspension_threshold: default_suspension_threshold(),
        }
    }
}

impl PolicyConfig {
    /// Check that thresholds are satisfiable by the configured key sets.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.suspension_threshold == 0 {
            return Err(CoreError::ValidationError(
                "suspension_threshold must be at least 1".into(),
            ));
        }
        if !self.suspension_keys.is_empty() && self.suspension_threshold > self.suspension_keys.len()
        {
            return Err(CoreError::ValidationError(format!(
                "suspension_threshold {} exceeds the {} configured suspension keys",
                self.suspension_threshold,
                self.suspension_keys.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_challenge_config() {
        assert_eq!(ChallengeConfig::default().ttl_secs, 60);
    }

    #[test]
    fn test_policy_config_partial_json() {
        let config: PolicyConfig =
            serde_json::from_str(r#"{"suspension_keys":["a","b","c"]}"#).unwrap();
        assert_eq!(config.suspension_threshold, 2);
        assert!(config.ai_issuer_keys.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_policy_config_threshold_too_high() {
        let config = PolicyConfig {
            suspension_keys: vec!["a".into()],
            suspension_threshold: 2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_policy_config_default_is_valid() {
        let config = PolicyConfig::default();
        assert_eq!(config.suspension_threshold, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_policy_config_zero_threshold() {
        let config = PolicyConfig {
            suspension_threshold: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
