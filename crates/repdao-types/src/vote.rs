//! Vote options and member roles.
//!
//! Both are closed sets with a fixed numeric encoding. The declaration order
//! of `VoteOption` is load-bearing: majority ties resolve to the lowest option.

use crate::error::TypesError;
use std::fmt;
use std::str::FromStr;

/// Risk rating a member casts on a submitted website.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum VoteOption {
    /// Confirmed fraud
    Scam = 0,
    /// Likely harmful
    HighRisk = 1,
    /// Nothing notable
    Normal = 2,
    /// Known good
    Safe = 3,
}

impl VoteOption {
    /// Number of options; also the length of every tally array.
    pub const COUNT: usize = 4;

    /// All options in declaration order.
    pub const ALL: [VoteOption; Self::COUNT] = [
        VoteOption::Scam,
        VoteOption::HighRisk,
        VoteOption::Normal,
        VoteOption::Safe,
    ];

    /// Position of this option in a tally array.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            VoteOption::Scam => "Scam",
            VoteOption::HighRisk => "HighRisk",
            VoteOption::Normal => "Normal",
            VoteOption::Safe => "Safe",
        }
    }
}

impl TryFrom<u8> for VoteOption {
    type Error = TypesError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or(TypesError::InvalidVoteOption(value))
    }
}

impl From<VoteOption> for u8 {
    fn from(option: VoteOption) -> Self {
        option as u8
    }
}

impl fmt::Display for VoteOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VoteOption {
    type Err = TypesError;

    /// Accepts either the numeric encoding (`"0"`..`"3"`) or a name, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(n) = s.parse::<u8>() {
            return VoteOption::try_from(n);
        }
        VoteOption::ALL
            .into_iter()
            .find(|o| o.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| TypesError::UnknownVoteOption(s.to_string()))
    }
}

/// Member role. The first member to join becomes `Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Role {
    #[default]
    Member = 0,
    Moderator = 1,
    Admin = 2,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::Member => "Member",
            Role::Moderator => "Moderator",
            Role::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
