//! Proposal finalization and reward issuance.
//!
//! Finalizing a proposal fixes its outcome to the majority option, pays the
//! proposer a flat reward and pays every voter who picked the outcome.
//! Voters in the minority receive nothing; nobody ever loses tokens.

use std::collections::BTreeMap;

use repdao_types::{Address, VoteOption};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::GovernanceError;
use crate::member::MembershipRegistry;
use crate::params::GovernanceParams;
use crate::proposal::{Proposal, ProposalStore};

/// Option with the strictly highest count. Ties go to the lowest option
/// in declaration order (Scam < HighRisk < Normal < Safe).
pub fn majority(counts: &[u64; VoteOption::COUNT]) -> VoteOption {
    let mut winner = VoteOption::Scam;
    for option in VoteOption::ALL {
        if counts[option.index()] > counts[winner.index()] {
            winner = option;
        }
    }
    winner
}

/// Outcome of a successful `process` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finalization {
    pub proposal_id: u64,
    /// Winning option, now the proposal's final status
    pub outcome: VoteOption,
    pub proposer: Address,
    pub proposer_reward: u64,
    /// Voters whose choice matched the outcome, in vote order
    pub rewarded_voters: Vec<Address>,
    pub voter_reward: u64,
}

impl Finalization {
    /// Total credit per address. A proposer who also voted with the
    /// majority collects both rewards.
    pub fn credits(&self) -> BTreeMap<Address, u64> {
        let mut credits = BTreeMap::new();
        *credits.entry(self.proposer).or_insert(0) += self.proposer_reward;
        for voter in &self.rewarded_voters {
            *credits.entry(*voter).or_insert(0) += self.voter_reward;
        }
        credits
    }
}

/// Finalizes proposals against the configured reward parameters.
#[derive(Debug, Clone, Copy)]
pub struct RewardEngine {
    params: GovernanceParams,
}

impl RewardEngine {
    pub fn new(params: GovernanceParams) -> Self {
        Self { params }
    }

    /// Check preconditions and compute the finalization without applying it.
    pub fn plan(
        &self,
        proposal: &Proposal,
        members: &MembershipRegistry,
    ) -> Result<Finalization, GovernanceError> {
        if proposal.processed {
            return Err(GovernanceError::AlreadyProcessed(proposal.id));
        }

        let total = proposal.tally.total();
        if total < self.params.finalization_threshold {
            return Err(GovernanceError::NotEnoughVotes {
                proposal_id: proposal.id,
                actual: total,
                required: self.params.finalization_threshold,
            });
        }

        let outcome = majority(&proposal.tally.counts());
        let rewarded_voters = proposal
            .tally
            .ballots()
            .filter(|b| b.option == outcome)
            .map(|b| b.voter)
            .collect();

        let finalization = Finalization {
            proposal_id: proposal.id,
            outcome,
            proposer: proposal.proposer,
            proposer_reward: self.params.proposer_reward,
            rewarded_voters,
            voter_reward: self.params.voter_reward,
        };

        // Every credit must land, or none does.
        for (addr, credit) in finalization.credits() {
            let member = members
                .get(&addr)
                .ok_or(GovernanceError::MemberNotFound(addr))?;
            if member.token_balance.checked_add(credit).is_none() {
                return Err(GovernanceError::BalanceOverflow(addr));
            }
        }

        Ok(finalization)
    }

    /// Finalize a proposal: set its outcome and pay rewards.
    pub fn process(
        &self,
        proposals: &mut ProposalStore,
        members: &mut MembershipRegistry,
        proposal_id: u64,
    ) -> Result<Finalization, GovernanceError> {
        let finalization = self.plan(proposals.require(proposal_id)?, members)?;

        for (addr, credit) in finalization.credits() {
            if let Some(member) = members.get_mut(&addr) {
                member.token_balance += credit;
                debug!("Credited {} tokens to {}", credit, addr);
            }
        }

        if let Some(proposal) = proposals.get_mut(proposal_id) {
            proposal.final_status = Some(finalization.outcome);
            proposal.processed = true;
        }

        info!(
            "Proposal {} finalized as {} ({} majority voters rewarded)",
            proposal_id,
            finalization.outcome,
            finalization.rewarded_voters.len()
        );
        Ok(finalization)
    }
}
