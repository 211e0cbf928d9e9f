//! The governance aggregate and its persisted form.
//!
//! `GovernanceState` is the single owner of the member table and the
//! proposal sequence. `GovernanceSnapshot` is its serializable layout: an
//! address-keyed member table in join order and a zero-indexed proposal
//! list.

use std::collections::HashSet;

use repdao_types::Role;
use serde::{Deserialize, Serialize};

use crate::error::GovernanceError;
use crate::member::{Member, MembershipRegistry};
use crate::proposal::{Proposal, ProposalStore};

/// Complete governance state; the unit of atomic mutation.
#[derive(Debug, Default, Clone)]
pub struct GovernanceState {
    pub(crate) members: MembershipRegistry,
    pub(crate) proposals: ProposalStore,
}

impl GovernanceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn members(&self) -> &MembershipRegistry {
        &self.members
    }

    pub fn proposals(&self) -> &ProposalStore {
        &self.proposals
    }

    /// Copy out the persisted layout.
    pub fn to_snapshot(&self) -> GovernanceSnapshot {
        GovernanceSnapshot {
            members: self.members.iter().cloned().collect(),
            proposals: self.proposals.iter().cloned().collect(),
        }
    }

    /// Rebuild state from a snapshot, rejecting anything that breaks a
    /// state invariant.
    pub fn from_snapshot(snapshot: GovernanceSnapshot) -> Result<Self, GovernanceError> {
        snapshot.validate()?;
        Ok(Self {
            members: MembershipRegistry::from_ordered(snapshot.members),
            proposals: ProposalStore::from_ordered(snapshot.proposals),
        })
    }
}

/// Serializable governance state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceSnapshot {
    /// Members in join order
    pub members: Vec<Member>,
    /// Proposals in id order
    pub proposals: Vec<Proposal>,
}

impl GovernanceSnapshot {
    /// Check every invariant the live state maintains.
    pub fn validate(&self) -> Result<(), GovernanceError> {
        let invalid = |msg: String| Err(GovernanceError::InvalidSnapshot(msg));

        let mut ids = HashSet::new();
        for (i, member) in self.members.iter().enumerate() {
            if !ids.insert(member.id) {
                return invalid(format!("duplicate member {}", member.id));
            }
            if !member.is_member {
                return invalid(format!("member {} stored with is_member = false", member.id));
            }
            let expected_admin = i == 0;
            if (member.role == Role::Admin) != expected_admin {
                return invalid(format!(
                    "member {} has role {} but the admin must be exactly the first member",
                    member.id, member.role
                ));
            }
        }

        for (i, proposal) in self.proposals.iter().enumerate() {
            if proposal.id != i as u64 {
                return invalid(format!("proposal at index {} has id {}", i, proposal.id));
            }
            if !ids.contains(&proposal.proposer) {
                return invalid(format!(
                    "proposal {} proposer {} is not a member",
                    proposal.id, proposal.proposer
                ));
            }
            if proposal.processed != proposal.final_status.is_some() {
                return invalid(format!(
                    "proposal {} processed flag disagrees with final status",
                    proposal.id
                ));
            }
            if let Some(voter) = proposal.tally.voters().iter().find(|v| !ids.contains(*v)) {
                return invalid(format!(
                    "proposal {} voter {} is not a member",
                    proposal.id, voter
                ));
            }
        }

        for member in &self.members {
            let submitted = self
                .proposals
                .iter()
                .filter(|p| p.proposer == member.id)
                .count() as u64;
            let voted = self
                .proposals
                .iter()
                .filter(|p| p.tally.has_voted(&member.id))
                .count() as u64;
            if member.proposals_submitted != submitted || member.votes_count != voted {
                return invalid(format!("member {} activity counters are inconsistent", member.id));
            }
        }

        Ok(())
    }
}
