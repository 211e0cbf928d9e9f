//! Per-proposal vote records.
//!
//! A tally keeps three views of the same ballots: per-option counts, the
//! ordered voter list and the voter → choice map. They are only ever
//! updated together, so `voters().len() == total()` always holds.

use std::collections::HashMap;

use repdao_types::{Address, VoteOption};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GovernanceError;
use crate::member::MembershipRegistry;
use crate::proposal::ProposalStore;

/// One recorded vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub voter: Address,
    pub option: VoteOption,
}

/// Vote accumulation for a single proposal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Ballot>", into = "Vec<Ballot>")]
pub struct VoteTally {
    counts: [u64; VoteOption::COUNT],
    voters: Vec<Address>,
    choices: HashMap<Address, VoteOption>,
}

impl VoteTally {
    /// Create an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a ballot. Returns false, leaving the tally untouched, if the
    /// voter already has one.
    pub fn record(&mut self, voter: Address, option: VoteOption) -> bool {
        if self.choices.contains_key(&voter) {
            return false;
        }
        self.choices.insert(voter, option);
        self.voters.push(voter);
        self.counts[option.index()] += 1;
        true
    }

    /// Counts indexed by `VoteOption::index()`.
    pub fn counts(&self) -> [u64; VoteOption::COUNT] {
        self.counts
    }

    /// Count for one option.
    pub fn count_for(&self, option: VoteOption) -> u64 {
        self.counts[option.index()]
    }

    /// Total votes cast.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Voters in the order they voted.
    pub fn voters(&self) -> &[Address] {
        &self.voters
    }

    /// Choice recorded for `voter`.
    pub fn choice_of(&self, voter: &Address) -> Option<VoteOption> {
        self.choices.get(voter).copied()
    }

    /// Check if voter has voted.
    pub fn has_voted(&self, voter: &Address) -> bool {
        self.choices.contains_key(voter)
    }

    /// Ballots in vote order.
    pub fn ballots(&self) -> impl Iterator<Item = Ballot> + '_ {
        self.voters.iter().map(move |voter| Ballot {
            voter: *voter,
            option: self.choices[voter],
        })
    }
}

impl TryFrom<Vec<Ballot>> for VoteTally {
    type Error = String;

    fn try_from(ballots: Vec<Ballot>) -> Result<Self, Self::Error> {
        let mut tally = VoteTally::new();
        for ballot in ballots {
            if !tally.record(ballot.voter, ballot.option) {
                return Err(format!("duplicate ballot from {}", ballot.voter));
            }
        }
        Ok(tally)
    }
}

impl From<VoteTally> for Vec<Ballot> {
    fn from(tally: VoteTally) -> Self {
        tally.ballots().collect()
    }
}

/// Cast `voter`'s ballot on a proposal.
///
/// Preconditions are checked in a fixed order: membership, proposal
/// existence, not processed, not already voted, option in range. Nothing is
/// mutated unless all of them hold. No tokens move here.
pub fn cast_vote(
    proposals: &mut ProposalStore,
    members: &mut MembershipRegistry,
    proposal_id: u64,
    voter: Address,
    option: u8,
) -> Result<VoteOption, GovernanceError> {
    members.require_member(&voter)?;

    let proposal = proposals.require(proposal_id)?;
    if proposal.processed {
        return Err(GovernanceError::AlreadyProcessed(proposal_id));
    }
    if proposal.tally.has_voted(&voter) {
        return Err(GovernanceError::AlreadyVoted { proposal_id, voter });
    }
    let option =
        VoteOption::try_from(option).map_err(|_| GovernanceError::InvalidOption(option))?;

    let proposal = proposals
        .get_mut(proposal_id)
        .ok_or(GovernanceError::ProposalNotFound(proposal_id))?;
    let member = members
        .get_mut(&voter)
        .ok_or(GovernanceError::NotMember(voter))?;

    proposal.tally.record(voter, option);
    member.votes_count += 1;

    debug!(
        "Vote {} on proposal {} by {} ({} total)",
        option,
        proposal_id,
        voter,
        proposal.tally.total()
    );
    Ok(option)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn addr(b: u8) -> Address {
        Address::from_bytes([b; 20])
    }

    fn setup() -> (ProposalStore, MembershipRegistry) {
        let mut members = MembershipRegistry::new();
        for b in 1..=4 {
            members.join(addr(b), None, 0, 100).unwrap();
        }
        let mut proposals = ProposalStore::new();
        proposals
            .submit(&mut members, addr(1), "http://x".to_string(), 0)
            .unwrap();
        (proposals, members)
    }

    #[test]
    fn test_record_once() {
        let mut tally = VoteTally::new();
        assert!(tally.record(addr(1), VoteOption::Scam));
        assert!(!tally.record(addr(1), VoteOption::Safe));

        assert_eq!(tally.counts(), [1, 0, 0, 0]);
        assert_eq!(tally.voters(), &[addr(1)]);
        assert_eq!(tally.choice_of(&addr(1)), Some(VoteOption::Scam));
        assert_eq!(tally.choice_of(&addr(2)), None);
    }

    #[test]
    fn test_cast_vote_updates_counters_not_tokens() {
        let (mut proposals, mut members) = setup();

        cast_vote(&mut proposals, &mut members, 0, addr(2), 2).unwrap();

        let voter = members.get(&addr(2)).unwrap();
        assert_eq!(voter.votes_count, 1);
        assert_eq!(voter.token_balance, 100);
        assert_eq!(proposals.get(0).unwrap().tally.counts(), [0, 0, 1, 0]);
    }

    #[test]
    fn test_cast_vote_precondition_order() {
        let (mut proposals, mut members) = setup();
        let outsider = addr(99);

        // Non-member wins over every other failure
        assert_eq!(
            cast_vote(&mut proposals, &mut members, 42, outsider, 9).unwrap_err(),
            GovernanceError::NotMember(outsider)
        );

        // Missing proposal before invalid option
        assert_eq!(
            cast_vote(&mut proposals, &mut members, 42, addr(2), 9).unwrap_err(),
            GovernanceError::ProposalNotFound(42)
        );

        // Duplicate vote before invalid option
        cast_vote(&mut proposals, &mut members, 0, addr(2), 0).unwrap();
        assert_eq!(
            cast_vote(&mut proposals, &mut members, 0, addr(2), 9).unwrap_err(),
            GovernanceError::AlreadyVoted {
                proposal_id: 0,
                voter: addr(2)
            }
        );

        assert_eq!(
            cast_vote(&mut proposals, &mut members, 0, addr(3), 4).unwrap_err(),
            GovernanceError::InvalidOption(4)
        );

        // Only the one successful vote landed
        assert_eq!(proposals.get(0).unwrap().tally.total(), 1);
        assert_eq!(members.get(&addr(3)).unwrap().votes_count, 0);
    }

    #[test]
    fn test_vote_on_processed_rejected() {
        let (mut proposals, mut members) = setup();
        proposals.get_mut(0).unwrap().processed = true;

        assert_eq!(
            cast_vote(&mut proposals, &mut members, 0, addr(2), 0).unwrap_err(),
            GovernanceError::AlreadyProcessed(0)
        );
    }

    #[test]
    fn test_tally_json_rejects_duplicates() {
        let json = format!(
            r#"[{{"voter":"{v}","option":"Scam"}},{{"voter":"{v}","option":"Safe"}}]"#,
            v = addr(5)
        );
        assert!(serde_json::from_str::<VoteTally>(&json).is_err());
    }

    #[test]
    fn test_tally_json_preserves_order() {
        let mut tally = VoteTally::new();
        tally.record(addr(3), VoteOption::Safe);
        tally.record(addr(1), VoteOption::Scam);

        let json = serde_json::to_string(&tally).unwrap();
        let back: VoteTally = serde_json::from_str(&json).unwrap();
        assert_eq!(back.voters(), &[addr(3), addr(1)]);
        assert_eq!(back, tally);
    }

    proptest! {
        #[test]
        fn prop_voters_match_counts(votes in proptest::collection::vec((0u8..8, 0u8..4), 0..64)) {
            let mut tally = VoteTally::new();
            for (voter, option) in votes {
                tally.record(addr(voter), VoteOption::try_from(option).unwrap());
            }
            prop_assert_eq!(tally.voters().len() as u64, tally.total());
            for option in VoteOption::ALL {
                let chose = tally
                    .voters()
                    .iter()
                    .filter(|v| tally.choice_of(v) == Some(option))
                    .count() as u64;
                prop_assert_eq!(chose, tally.count_for(option));
            }
        }
    }
}
