//! Testing utilities for allowed-assignor
//!
//! Builders shared by the unit tests of several modules. Only compiled when
//! running tests.
//!
//! # Organization
//! - `helpers.rs` - Builders for members, subscriptions and JoinGroup protocol lists

#![cfg(test)]

pub mod helpers;

// Re-export commonly used items
pub use helpers::{make_members, make_protocols, make_subscription, topics};
