use repdao_types::Address;
use thiserror::Error;

/// Errors that can occur in governance operations.
///
/// Every variant is detected from in-memory state before anything is
/// mutated, so a returned error means the call left no trace.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("Already a member: {0}")]
    AlreadyMember(Address),

    #[error("Not a member: {0}")]
    NotMember(Address),

    #[error("Member not found: {0}")]
    MemberNotFound(Address),

    #[error("Proposal not found: {0}")]
    ProposalNotFound(u64),

    #[error("Proposal already processed: {0}")]
    AlreadyProcessed(u64),

    #[error("Already voted: {voter} on proposal {proposal_id}")]
    AlreadyVoted { proposal_id: u64, voter: Address },

    #[error("Invalid vote option: {0}")]
    InvalidOption(u8),

    #[error("Not enough votes on proposal {proposal_id}: {actual} < {required}")]
    NotEnoughVotes {
        proposal_id: u64,
        actual: u64,
        required: u64,
    },

    #[error("No recorded choice for {voter} on proposal {proposal_id}")]
    ChoiceNotFound { proposal_id: u64, voter: Address },

    #[error("Token balance overflow for {0}")]
    BalanceOverflow(Address),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl GovernanceError {
    /// Stable tag for external tooling; never changes with message wording.
    pub fn kind(&self) -> &'static str {
        match self {
            GovernanceError::AlreadyMember(_) => "AlreadyMember",
            GovernanceError::NotMember(_) => "NotMember",
            GovernanceError::MemberNotFound(_) => "MemberNotFound",
            GovernanceError::ProposalNotFound(_) => "ProposalNotFound",
            GovernanceError::AlreadyProcessed(_) => "AlreadyProcessed",
            GovernanceError::AlreadyVoted { .. } => "AlreadyVoted",
            GovernanceError::InvalidOption(_) => "InvalidOption",
            GovernanceError::NotEnoughVotes { .. } => "NotEnoughVotes",
            GovernanceError::ChoiceNotFound { .. } => "ChoiceNotFound",
            GovernanceError::BalanceOverflow(_) => "BalanceOverflow",
            GovernanceError::InvalidSnapshot(_) => "InvalidSnapshot",
            GovernanceError::InvalidParameter(_) => "InvalidParameter",
        }
    }
}
