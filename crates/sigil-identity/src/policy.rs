//! Issuer authorization per attestation type.
//!
//! Every type is governed by an m-of-n [`ThresholdRule`]. Issuer keys are
//! opaque shared secrets; only their BLAKE3 digests are kept, and
//! comparison goes through `blake3::Hash` equality, which is constant-time.

use std::collections::HashMap;

use sigil_core::{AttestationType, PolicyConfig};

use crate::error::IdentityError;

/// At least `threshold` distinct keys from `keys` must be presented.
#[derive(Debug, Clone)]
pub struct ThresholdRule {
    threshold: usize,
    key_digests: Vec<blake3::Hash>,
}

impl ThresholdRule {
    pub fn new(threshold: usize, keys: &[String]) -> Result<Self, IdentityError> {
        if threshold == 0 {
            return Err(IdentityError::ValidationError(
                "threshold must be at least 1".into(),
            ));
        }
        let mut key_digests: Vec<blake3::Hash> = Vec::with_capacity(keys.len());
        for key in keys {
            let digest = blake3::hash(key.as_bytes());
            if !key_digests.contains(&digest) {
                key_digests.push(digest);
            }
        }
        if !key_digests.is_empty() && threshold > key_digests.len() {
            return Err(IdentityError::ValidationError(format!(
                "threshold {} exceeds {} distinct keys",
                threshold,
                key_digests.len()
            )));
        }
        Ok(Self {
            threshold,
            key_digests,
        })
    }

    /// A single-issuer rule: any one of `keys`.
    pub fn any_of(keys: &[String]) -> Result<Self, IdentityError> {
        Self::new(1, keys)
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn key_count(&self) -> usize {
        self.key_digests.len()
    }

    /// Number of configured keys found among `presented`. A key presented
    /// twice counts once.
    pub fn matched(&self, presented: &[String]) -> usize {
        let presented: Vec<blake3::Hash> =
            presented.iter().map(|k| blake3::hash(k.as_bytes())).collect();
        self.key_digests
            .iter()
            .filter(|configured| presented.iter().any(|p| p == *configured))
            .count()
    }
}

/// Authorization rules for every attestation type.
#[derive(Debug, Clone)]
pub struct IssuerPolicy {
    rules: HashMap<AttestationType, ThresholdRule>,
}

impl IssuerPolicy {
    /// Build from configuration: AI, SPID and jury take any one of their
    /// keys; suspension takes `suspension_threshold` of the authority keys.
    pub fn from_config(config: &PolicyConfig) -> Result<Self, IdentityError> {
        config.validate()?;
        let mut rules = HashMap::new();
        rules.insert(
            AttestationType::AiVerified,
            ThresholdRule::any_of(&config.ai_issuer_keys)?,
        );
        rules.insert(
            AttestationType::SpidVerified,
            ThresholdRule::any_of(&config.spid_issuer_keys)?,
        );
        rules.insert(
            AttestationType::JuryVerified,
            ThresholdRule::any_of(&config.jury_issuer_keys)?,
        );
        rules.insert(
            AttestationType::Suspended,
            ThresholdRule::new(config.suspension_threshold, &config.suspension_keys)?,
        );
        Ok(Self { rules })
    }

    /// Check `presented` against the rule for `attestation_type`.
    pub fn authorize(
        &self,
        attestation_type: AttestationType,
        presented: &[String],
    ) -> Result<(), IdentityError> {
        let rule = self.rules.get(&attestation_type).ok_or_else(|| {
            IdentityError::IssuerUnauthorized(format!("no issuers configured for {}", attestation_type))
        })?;
        let matched = rule.matched(presented);
        if matched < rule.threshold() {
            tracing::warn!(
                attestation_type = %attestation_type,
                matched,
                threshold = rule.threshold(),
                "issuer authorization failed"
            );
            return Err(IdentityError::IssuerUnauthorized(format!(
                "{} requires {} of {} authorized keys, {} presented",
                attestation_type,
                rule.threshold(),
                rule.key_count(),
                matched
            )));
        }
        Ok(())
    }
}
