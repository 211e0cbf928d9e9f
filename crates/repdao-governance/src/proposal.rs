//! Proposal store.
//!
//! Proposals go through states: Created -> Processed (terminal)
//!
//! Ids are dense and sequential from 0; proposals are never removed.

use repdao_types::{Address, VoteOption};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::GovernanceError;
use crate::member::MembershipRegistry;
use crate::tally::VoteTally;

/// A submitted website awaiting community judgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Sequential proposal ID
    pub id: u64,
    /// Submitted URL
    pub url: String,
    /// Proposer address
    pub proposer: Address,
    /// Unix seconds at submission
    pub start_time: u64,
    /// Set exactly once by finalization
    pub processed: bool,
    /// Outcome; `Some` iff `processed`
    pub final_status: Option<VoteOption>,
    /// Ballots cast so far
    pub tally: VoteTally,
}

impl Proposal {
    /// Create a new proposal.
    pub fn new(id: u64, url: String, proposer: Address, start_time: u64) -> Self {
        Self {
            id,
            url,
            proposer,
            start_time,
            processed: false,
            final_status: None,
            tally: VoteTally::new(),
        }
    }

    /// Display label for the current state.
    pub fn status_label(&self) -> &'static str {
        match self.final_status {
            Some(status) if self.processed => status.name(),
            _ => "Pending",
        }
    }
}

/// Read-only proposal view returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalInfo {
    pub id: u64,
    pub url: String,
    pub proposer: Address,
    pub start_time: u64,
    pub processed: bool,
    pub final_status: Option<VoteOption>,
}

impl From<&Proposal> for ProposalInfo {
    fn from(p: &Proposal) -> Self {
        Self {
            id: p.id,
            url: p.url.clone(),
            proposer: p.proposer,
            start_time: p.start_time,
            processed: p.processed,
            final_status: p.final_status,
        }
    }
}

/// Append-only proposal sequence.
#[derive(Debug, Default, Clone)]
pub struct ProposalStore {
    proposals: Vec<Proposal>,
}

impl ProposalStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit a URL for rating. Only members may submit.
    ///
    /// Returns the id of the new proposal.
    pub fn submit(
        &mut self,
        members: &mut MembershipRegistry,
        proposer: Address,
        url: String,
        now: u64,
    ) -> Result<u64, GovernanceError> {
        members.require_member(&proposer)?;
        let member = members
            .get_mut(&proposer)
            .ok_or(GovernanceError::NotMember(proposer))?;

        let id = self.count();
        info!("Proposal {} submitted by {}: {}", id, proposer, url);
        self.proposals.push(Proposal::new(id, url, proposer, now));
        member.proposals_submitted += 1;
        Ok(id)
    }

    /// Get a proposal.
    pub fn get(&self, id: u64) -> Option<&Proposal> {
        usize::try_from(id).ok().and_then(|i| self.proposals.get(i))
    }

    /// Get a proposal mutably.
    pub(crate) fn get_mut(&mut self, id: u64) -> Option<&mut Proposal> {
        usize::try_from(id).ok().and_then(move |i| self.proposals.get_mut(i))
    }

    /// Get a proposal or fail with `ProposalNotFound`.
    pub fn require(&self, id: u64) -> Result<&Proposal, GovernanceError> {
        self.get(id).ok_or(GovernanceError::ProposalNotFound(id))
    }

    /// Number of proposals created; also the next id.
    pub fn count(&self) -> u64 {
        self.proposals.len() as u64
    }

    /// All proposals in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.iter()
    }

    /// Rebuild from records in id order. Callers validate invariants.
    pub(crate) fn from_ordered(proposals: Vec<Proposal>) -> Self {
        Self { proposals }
    }
}
