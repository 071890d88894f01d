//! allowed-assignor: a Kafka consumer-group partition assignor for members
//! that may only serve an explicit subset of partitions.
//!
//! Every member parses its local `allowed.partitions` option into a
//! [`Constraint`] and advertises it inside its JoinGroup subscription
//! metadata. The member elected to compute the round collects all
//! subscriptions, resolves the shared partition count of the subscribed
//! topics, and runs [`AllowedOnlyStrategy`] exactly once. The resulting
//! per-member assignments are handed back to the group transport.
//!
//! ```
//! use allowed_assignor::{assign, Constraint, Member, Topology};
//!
//! let topology = Topology::new(vec!["events".to_string()], 5).unwrap();
//! let members = vec![
//!     Member::new("a", Constraint::Unrestricted, 0),
//!     Member::new("b", Constraint::allow([1, 2]), 1),
//! ];
//!
//! let assignment = assign(&topology, &members).unwrap();
//! assert_eq!(assignment.partition_indices("a"), vec![0, 3, 4]);
//! assert_eq!(assignment.partition_indices("b"), vec![1, 2]);
//! ```

pub mod assignment; // Constraint parsing, wire codecs and the assignment engine
pub mod config; // Consumer configuration layer
pub mod constants;
pub mod error;

// Test utilities (only compiled in test builds)
#[cfg(test)]
pub mod testing;

pub use assignment::{
    assign, assign_with, create_strategy, parse_allowed_partitions, select_common_strategy,
    AllowSet, AllowedOnlyStrategy, Assignment, AssignmentInput, AssignmentOutput,
    AssignmentStrategy, BalanceMode, Constraint, Member, MemberAssignment, MemberSubscription,
    PartitionValue, RawAllowedPartitions, TopicPartition, Topology,
};
pub use config::AssignorConfig;
pub use constants::PartitionIndex;
pub use error::{AssignorError, Result};
