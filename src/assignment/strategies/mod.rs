//! Assignment Strategy Module
//!
//! This module defines the `AssignmentStrategy` trait and its implementation:
//!
//! - **AllowedOnly**: Honors each member's allowed partitions, balancing the rest
//!
//! # Strategy Selection
//!
//! Consumers advertise their supported strategies in JoinGroup, in preference
//! order. `select_common_strategy()` picks the first strategy of the first
//! member's list that every member supports; the allowed-only strategy only
//! runs when every member of the round advertises it.

pub mod allowed_only;

use std::collections::{HashMap, HashSet};

use super::member_assignment::MemberAssignment;
use super::subscription::MemberSubscription;
use super::topology::Topology;
use crate::config::AssignorConfig;
use crate::constants::STRATEGY_NAME;
use crate::error::{AssignorError, Result};

pub use allowed_only::{assign, assign_with, AllowedOnlyStrategy, Assignment, BalanceMode, Member};

/// Input for partition assignment computation
#[derive(Debug, Clone)]
pub struct AssignmentInput {
    /// (member_id, parsed subscription), in join order
    pub subscriptions: Vec<(String, MemberSubscription)>,

    /// Available partitions per topic: topic_name -> partition_count
    pub topic_partitions: HashMap<String, i32>,
}

impl AssignmentInput {
    /// Create new assignment input
    pub fn new(
        subscriptions: Vec<(String, MemberSubscription)>,
        topic_partitions: HashMap<String, i32>,
    ) -> Self {
        Self {
            subscriptions,
            topic_partitions,
        }
    }

    /// Build input from the JoinGroup protocol lists of every member
    ///
    /// # Arguments
    /// * `strategy` - Agreed strategy name
    /// * `member_protocols` - (member_id, [(strategy_name, metadata)]) in join order
    /// * `topic_partitions` - Partition count per topic from broker metadata
    ///
    /// # Errors
    /// `ContractViolation` when a member does not advertise `strategy`,
    /// `CorruptMessage` when its metadata cannot be parsed
    pub fn from_protocols(
        strategy: &str,
        member_protocols: &[(String, Vec<(String, Vec<u8>)>)],
        topic_partitions: HashMap<String, i32>,
    ) -> Result<Self> {
        let mut subscriptions = Vec::with_capacity(member_protocols.len());

        for (member_id, protocols) in member_protocols {
            let metadata = protocols
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(strategy))
                .map(|(_, metadata)| metadata)
                .ok_or_else(|| {
                    AssignorError::ContractViolation(format!(
                        "member {} does not support strategy {}",
                        member_id, strategy
                    ))
                })?;

            subscriptions.push((member_id.clone(), MemberSubscription::parse(metadata)?));
        }

        Ok(Self::new(subscriptions, topic_partitions))
    }

    /// Resolve the shared topology of this round
    ///
    /// Every member must subscribe to the same topic set. Topic order follows
    /// the first member's subscription.
    pub fn topology(&self) -> Result<Topology> {
        let (first_id, first) = self.subscriptions.first().ok_or_else(|| {
            AssignorError::ContractViolation("assignment requires at least one member".into())
        })?;

        let mut topics: Vec<String> = Vec::with_capacity(first.topics.len());
        for topic in &first.topics {
            if !topics.contains(topic) {
                topics.push(topic.clone());
            }
        }

        let expected: HashSet<&str> = topics.iter().map(String::as_str).collect();
        for (member_id, sub) in &self.subscriptions[1..] {
            let actual: HashSet<&str> = sub.topics.iter().map(String::as_str).collect();
            if actual != expected {
                return Err(AssignorError::ContractViolation(format!(
                    "member {} subscribes to {:?} but member {} subscribes to {:?}",
                    member_id, sub.topics, first_id, first.topics
                )));
            }
        }

        Topology::from_partition_counts(topics, &self.topic_partitions)
    }

    /// Decode every member's constraint; join order is the input position
    pub fn members(&self) -> Result<Vec<Member>> {
        self.subscriptions
            .iter()
            .enumerate()
            .map(|(join_order, (member_id, sub))| {
                Ok(Member::new(member_id.clone(), sub.constraint()?, join_order))
            })
            .collect()
    }
}

/// Output of partition assignment computation
/// Map of member_id -> MemberAssignment
pub type AssignmentOutput = HashMap<String, MemberAssignment>;

/// Trait for partition assignment strategies
///
/// Implementations must be thread-safe (Send + Sync) as they may be called
/// from different threads of the consumer.
pub trait AssignmentStrategy: Send + Sync {
    /// Strategy name (must match protocol name from JoinGroup)
    fn name(&self) -> &'static str;

    /// Subscription metadata this member advertises in JoinGroup
    fn subscription(&self, topics: Vec<String>) -> MemberSubscription;

    /// Compute partition assignments for all members
    ///
    /// # Arguments
    /// * `input` - Contains member subscriptions and available partitions
    ///
    /// # Returns
    /// Map of member_id -> MemberAssignment with their assigned partitions
    fn assign(&self, input: &AssignmentInput) -> Result<AssignmentOutput>;
}

/// Create an assignment strategy by name
///
/// # Arguments
/// * `name` - Strategy name (case-insensitive): "allowed-only"
/// * `config` - Local configuration of this member
///
/// # Returns
/// Strategy instance or None if name is unrecognized
pub fn create_strategy(name: &str, config: &AssignorConfig) -> Option<Box<dyn AssignmentStrategy>> {
    if name.eq_ignore_ascii_case(STRATEGY_NAME) {
        Some(Box::new(AllowedOnlyStrategy::new(config.clone())))
    } else {
        None
    }
}

/// Select a common strategy supported by all members
///
/// # Algorithm
/// 1. Walk the first member's protocol list in its preference order
/// 2. Return the first strategy every other member also advertises
///
/// # Arguments
/// * `member_protocols` - (member_id, [(strategy_name, metadata)]) in join order
///
/// # Returns
/// Selected strategy name (lowercase), or None if no common strategy exists
pub fn select_common_strategy(
    member_protocols: &[(String, Vec<(String, Vec<u8>)>)],
) -> Option<String> {
    let (_, first) = member_protocols.first()?;

    let member_strategies: Vec<HashSet<String>> = member_protocols[1..]
        .iter()
        .map(|(_, protocols)| {
            protocols
                .iter()
                .map(|(name, _)| name.to_lowercase())
                .collect()
        })
        .collect();

    first
        .iter()
        .map(|(name, _)| name.to_lowercase())
        .find(|name| member_strategies.iter().all(|strategies| strategies.contains(name)))
}
