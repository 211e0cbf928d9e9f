//! RepDAO Governance - reputation-weighted website risk ratings.
//!
//! This crate provides:
//! - Membership registry with token balances and roles
//! - Append-only proposal store
//! - One-vote-per-member tallies over four risk options
//! - Finalization with majority determination and token rewards
//! - A serialized service entry point that commits each call atomically

pub mod clock;
pub mod error;
pub mod member;
pub mod params;
pub mod proposal;
pub mod reward;
pub mod service;
pub mod state;
pub mod tally;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::GovernanceError;
pub use member::{Member, MemberInfo, MembershipRegistry};
pub use params::GovernanceParams;
pub use proposal::{Proposal, ProposalInfo, ProposalStore};
pub use reward::{majority, Finalization, RewardEngine};
pub use service::GovernanceService;
pub use state::{GovernanceSnapshot, GovernanceState};
pub use tally::{Ballot, VoteTally};

pub use repdao_types::{Address, Role, VoteOption};
