//! Governance economics.

use serde::{Deserialize, Serialize};

use crate::error::GovernanceError;

/// Tokens granted on join.
pub const INITIAL_TOKENS: u64 = 100;
/// Fixed grant to the proposer when their proposal is finalized.
pub const PROPOSER_REWARD: u64 = 20;
/// Grant to each voter whose choice matches the outcome.
pub const VOTER_REWARD: u64 = 10;
/// Minimum total votes before a proposal may be finalized.
pub const FINALIZATION_THRESHOLD: u64 = 3;

/// Tunable constants of the reward model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceParams {
    /// Balance a new member starts with
    pub initial_tokens: u64,
    /// Reward credited to the proposer on finalization
    pub proposer_reward: u64,
    /// Reward credited to each majority-aligned voter
    pub voter_reward: u64,
    /// Votes required before `process` is accepted
    pub finalization_threshold: u64,
}

impl Default for GovernanceParams {
    fn default() -> Self {
        Self {
            initial_tokens: INITIAL_TOKENS,
            proposer_reward: PROPOSER_REWARD,
            voter_reward: VOTER_REWARD,
            finalization_threshold: FINALIZATION_THRESHOLD,
        }
    }
}

impl GovernanceParams {
    /// Validate parameters.
    pub fn validate(&self) -> Result<(), GovernanceError> {
        if self.finalization_threshold == 0 {
            return Err(GovernanceError::InvalidParameter(
                "finalization_threshold must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = GovernanceParams::default();
        assert_eq!(params.initial_tokens, 100);
        assert_eq!(params.proposer_reward, 20);
        assert_eq!(params.voter_reward, 10);
        assert_eq!(params.finalization_threshold, 3);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let params = GovernanceParams {
            finalization_threshold: 0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(GovernanceError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_partial_deserialize_fills_defaults() {
        let params: GovernanceParams =
            serde_json::from_str(r#"{ "voter_reward": 15 }"#).unwrap();
        assert_eq!(params.voter_reward, 15);
        assert_eq!(params.initial_tokens, INITIAL_TOKENS);
        assert_eq!(params.finalization_threshold, FINALIZATION_THRESHOLD);
    }
}
