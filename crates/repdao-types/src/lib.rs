//! RepDAO Types - Core type definitions shared across the RepDAO crates.
//!
//! This crate provides:
//! - Addresses (20-byte member identities, `0x` hex encoded)
//! - Vote options (the four risk ratings a member can cast)
//! - Member roles

pub mod address;
pub mod vote;
pub mod error;

#[cfg(feature = "serde")]
mod serialization;

pub use address::Address;
pub use vote::{Role, VoteOption};
pub use error::TypesError;
