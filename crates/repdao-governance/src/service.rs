//! Governance service - the single entry point for every call.
//!
//! Mutations (`join`, `submit`, `vote`, `process`) hold the write lock for
//! their whole validate-then-apply span, so they are totally ordered and
//! readers never see a half-applied call. Queries share the read lock and
//! return owned copies.

use std::sync::Arc;

use parking_lot::RwLock;
use repdao_types::{Address, VoteOption};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::error::GovernanceError;
use crate::member::{Member, MemberInfo};
use crate::params::GovernanceParams;
use crate::proposal::{Proposal, ProposalInfo};
use crate::reward::{Finalization, RewardEngine};
use crate::state::{GovernanceSnapshot, GovernanceState};
use crate::tally;

/// Serialized governance state machine.
#[derive(Debug)]
pub struct GovernanceService {
    state: RwLock<GovernanceState>,
    params: GovernanceParams,
    rewards: RewardEngine,
    clock: Arc<dyn Clock>,
}

impl GovernanceService {
    /// Fresh state with the wall clock.
    pub fn new(params: GovernanceParams) -> Result<Self, GovernanceError> {
        Self::with_clock(params, Arc::new(SystemClock))
    }

    /// Fresh state with an explicit clock.
    pub fn with_clock(
        params: GovernanceParams,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, GovernanceError> {
        Self::from_state(GovernanceState::new(), params, clock)
    }

    /// Resume from a persisted snapshot.
    pub fn restore(
        snapshot: GovernanceSnapshot,
        params: GovernanceParams,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, GovernanceError> {
        let state = GovernanceState::from_snapshot(snapshot)?;
        info!(
            "Restored governance state: {} members, {} proposals",
            state.members().count(),
            state.proposals().count()
        );
        Self::from_state(state, params, clock)
    }

    fn from_state(
        state: GovernanceState,
        params: GovernanceParams,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, GovernanceError> {
        params.validate()?;
        Ok(Self {
            state: RwLock::new(state),
            params,
            rewards: RewardEngine::new(params),
            clock,
        })
    }

    pub fn params(&self) -> &GovernanceParams {
        &self.params
    }

    // --- mutations ---

    /// Join as `caller`. The first member ever becomes Admin.
    pub fn join(&self, caller: Address, name: Option<&str>) -> Result<Member, GovernanceError> {
        let mut state = self.state.write();
        let now = self.clock.now();
        let member = state
            .members
            .join(caller, name, now, self.params.initial_tokens)
            .map_err(|e| rejected("join", e))?
            .clone();

        info!(
            "Member {} joined as {} ({} members)",
            caller,
            member.role,
            state.members.count()
        );
        Ok(member)
    }

    /// Submit `url` for rating. Returns the new proposal id.
    pub fn submit(&self, caller: Address, url: &str) -> Result<u64, GovernanceError> {
        let mut state = self.state.write();
        let now = self.clock.now();
        let GovernanceState { members, proposals } = &mut *state;
        proposals
            .submit(members, caller, url.to_string(), now)
            .map_err(|e| rejected("submit", e))
    }

    /// Cast a vote. `option` is the raw encoding (0 = Scam .. 3 = Safe).
    pub fn vote(
        &self,
        caller: Address,
        proposal_id: u64,
        option: u8,
    ) -> Result<VoteOption, GovernanceError> {
        let mut state = self.state.write();
        let GovernanceState { members, proposals } = &mut *state;
        tally::cast_vote(proposals, members, proposal_id, caller, option)
            .map_err(|e| rejected("vote", e))
    }

    /// Finalize a proposal. Any caller may trigger this once the vote
    /// threshold is met.
    pub fn process(
        &self,
        caller: Address,
        proposal_id: u64,
    ) -> Result<Finalization, GovernanceError> {
        let mut state = self.state.write();
        let GovernanceState { members, proposals } = &mut *state;
        debug!("Finalization of proposal {} requested by {}", proposal_id, caller);
        self.rewards
            .process(proposals, members, proposal_id)
            .map_err(|e| rejected("process", e))
    }

    // --- queries ---

    /// Member view; an unknown id yields a zeroed, non-member record.
    pub fn member_info(&self, id: &Address) -> MemberInfo {
        self.state
            .read()
            .members
            .get(id)
            .map(MemberInfo::from)
            .unwrap_or_default()
    }

    /// Full member record.
    pub fn member(&self, id: &Address) -> Result<Member, GovernanceError> {
        self.state
            .read()
            .members
            .get(id)
            .cloned()
            .ok_or(GovernanceError::MemberNotFound(*id))
    }

    pub fn is_member(&self, id: &Address) -> bool {
        self.state.read().members.is_member(id)
    }

    pub fn member_count(&self) -> usize {
        self.state.read().members.count()
    }

    /// Member ids in join order.
    pub fn all_members(&self) -> Vec<Address> {
        self.state.read().members.ids().to_vec()
    }

    pub fn proposal_count(&self) -> u64 {
        self.state.read().proposals.count()
    }

    pub fn proposal_info(&self, id: u64) -> Result<ProposalInfo, GovernanceError> {
        self.state.read().proposals.require(id).map(ProposalInfo::from)
    }

    /// Full proposal record including its tally.
    pub fn proposal(&self, id: u64) -> Result<Proposal, GovernanceError> {
        self.state.read().proposals.require(id).cloned()
    }

    /// Vote counts as `[Scam, HighRisk, Normal, Safe]`.
    pub fn proposal_votes(&self, id: u64) -> Result<[u64; VoteOption::COUNT], GovernanceError> {
        self.state
            .read()
            .proposals
            .require(id)
            .map(|p| p.tally.counts())
    }

    /// Ids that voted on the proposal, in vote order.
    pub fn proposal_voters(&self, id: u64) -> Result<Vec<Address>, GovernanceError> {
        self.state
            .read()
            .proposals
            .require(id)
            .map(|p| p.tally.voters().to_vec())
    }

    pub fn voter_choice(
        &self,
        proposal_id: u64,
        voter: &Address,
    ) -> Result<VoteOption, GovernanceError> {
        self.state
            .read()
            .proposals
            .require(proposal_id)?
            .tally
            .choice_of(voter)
            .ok_or(GovernanceError::ChoiceNotFound {
                proposal_id,
                voter: *voter,
            })
    }

    /// Consistent copy of the full state.
    pub fn snapshot(&self) -> GovernanceSnapshot {
        self.state.read().to_snapshot()
    }
}

fn rejected(op: &str, err: GovernanceError) -> GovernanceError {
    debug!("{} rejected: {} ({})", op, err, err.kind());
    err
}
