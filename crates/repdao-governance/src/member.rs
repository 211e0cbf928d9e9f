//! Membership registry.
//!
//! Members join once and never leave. Token balances only grow, and only
//! through finalization rewards.

use std::collections::HashMap;

use repdao_types::{Address, Role};
use serde::{Deserialize, Serialize};

use crate::error::GovernanceError;

/// A DAO member record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Member identity
    pub id: Address,
    /// Always true for a stored record
    pub is_member: bool,
    /// Reputation tokens
    pub token_balance: u64,
    /// Role; the first member is Admin
    pub role: Role,
    /// Optional display name
    pub name: Option<String>,
    /// Unix seconds at join
    pub joined_at: u64,
    /// Number of proposals submitted
    pub proposals_submitted: u64,
    /// Number of votes cast
    pub votes_count: u64,
}

impl Member {
    fn new(id: Address, role: Role, name: Option<String>, joined_at: u64, tokens: u64) -> Self {
        Self {
            id,
            is_member: true,
            token_balance: tokens,
            role,
            name,
            joined_at,
            proposals_submitted: 0,
            votes_count: 0,
        }
    }
}

/// Read-only member view returned to callers.
///
/// For an identity that never joined, every field holds its zero value and
/// `is_member` is false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    pub is_member: bool,
    pub token_balance: u64,
    pub role: Role,
    pub joined_at: u64,
    pub proposals_submitted: u64,
    pub votes_count: u64,
    pub name: Option<String>,
}

impl From<&Member> for MemberInfo {
    fn from(m: &Member) -> Self {
        Self {
            is_member: m.is_member,
            token_balance: m.token_balance,
            role: m.role,
            joined_at: m.joined_at,
            proposals_submitted: m.proposals_submitted,
            votes_count: m.votes_count,
            name: m.name.clone(),
        }
    }
}

/// Address-keyed member table that remembers join order.
#[derive(Debug, Default, Clone)]
pub struct MembershipRegistry {
    members: HashMap<Address, Member>,
    order: Vec<Address>,
}

impl MembershipRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `caller` as a member.
    ///
    /// The very first join is granted `Role::Admin`. Blank names are stored
    /// as `None`.
    pub fn join(
        &mut self,
        caller: Address,
        name: Option<&str>,
        now: u64,
        initial_tokens: u64,
    ) -> Result<&Member, GovernanceError> {
        if self.is_member(&caller) {
            return Err(GovernanceError::AlreadyMember(caller));
        }

        let role = if self.order.is_empty() {
            Role::Admin
        } else {
            Role::Member
        };
        let name = name
            .filter(|n| !n.trim().is_empty())
            .map(str::to_string);

        self.order.push(caller);
        let member = self
            .members
            .entry(caller)
            .or_insert(Member::new(caller, role, name, now, initial_tokens));
        Ok(&*member)
    }

    /// Get a member.
    pub fn get(&self, id: &Address) -> Option<&Member> {
        self.members.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &Address) -> Option<&mut Member> {
        self.members.get_mut(id)
    }

    /// Get a member or fail with `NotMember`.
    pub fn require_member(&self, id: &Address) -> Result<&Member, GovernanceError> {
        self.get(id)
            .filter(|m| m.is_member)
            .ok_or(GovernanceError::NotMember(*id))
    }

    /// Check membership.
    pub fn is_member(&self, id: &Address) -> bool {
        self.get(id).map_or(false, |m| m.is_member)
    }

    /// Number of members.
    pub fn count(&self) -> usize {
        self.members.values().filter(|m| m.is_member).count()
    }

    /// Member ids in join order.
    pub fn ids(&self) -> &[Address] {
        &self.order
    }

    /// Members in join order.
    pub fn iter(&self) -> impl Iterator<Item = &Member> {
        self.order.iter().filter_map(|id| self.members.get(id))
    }

    /// Rebuild from records in join order. Callers validate invariants.
    pub(crate) fn from_ordered(records: Vec<Member>) -> Self {
        let mut registry = Self::new();
        for member in records {
            registry.order.push(member.id);
            registry.members.insert(member.id, member);
        }
        registry
    }
}
