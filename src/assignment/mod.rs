//! Partition Assignment Module
//!
//! This module implements the allowed-only assignment strategy for consumer
//! groups whose members may each serve only an explicit subset of partitions.
//!
//! # Architecture
//!
//! The assignment process works as follows:
//!
//! 1. Each consumer parses its `allowed.partitions` option into a `Constraint`
//! 2. Consumers send JoinGroup with the constraint encoded in the subscription
//!    user data
//! 3. The group leader collects every subscription, resolves the shared
//!    partition count and runs the engine once
//! 4. Each consumer receives its partition assignment in the SyncGroup response
//!
//! # Wire Format
//!
//! Kafka uses a custom binary format for subscription and assignment metadata:
//!
//! ```text
//! MemberSubscription (JoinGroup metadata):
//!   version: i16
//!   topics: [String]  // array of subscribed topic names
//!   user_data: bytes  // allowed partitions, null when unrestricted
//!
//! MemberAssignment (SyncGroup response):
//!   version: i16
//!   topic_partitions: [TopicPartition]  // array of (topic, [partitions])
//!   user_data: bytes  // always empty
//! ```

pub mod allowed_partitions;
pub mod constraint;
pub mod member_assignment;
pub mod strategies;
pub mod subscription;
pub mod topology;


// Re-export main types
pub use allowed_partitions::{parse_allowed_partitions, PartitionValue, RawAllowedPartitions};
pub use constraint::{AllowSet, Constraint};
pub use member_assignment::MemberAssignment;
pub use strategies::{
    assign, assign_with, create_strategy, select_common_strategy, AllowedOnlyStrategy,
    Assignment, AssignmentInput, AssignmentOutput, AssignmentStrategy, BalanceMode, Member,
};
pub use subscription::MemberSubscription;
pub use topology::{TopicPartition, Topology};
