//! Allowed-Only Assignment Strategy
//!
//! Every member may declare the partition indices it is permitted to serve.
//! The strategy never hands a member a partition outside its allow-set, and
//! otherwise spreads partitions as evenly as the constraints permit.
//!
//! # Algorithm
//!
//! 1. Clip every allow-set to the indices the topology actually has
//! 2. Order members by join order (the position is the member index)
//! 3. For each partition index `p` ascending:
//!    - eligible = unrestricted members plus members whose set contains `p`
//!    - no eligible member: `p` stays unassigned
//!    - otherwise pick the eligible member with the lowest rank (see
//!      [`BalanceMode`]) and give it `p`
//! 4. Every subscribed topic's partition `p` goes to the member chosen for `p`
//!
//! # Example
//!
//! With 5 partitions, member A unrestricted and member B allowed `{1, 2}`:
//! - p0: only A is eligible -> A
//! - p1: A has 1, B has 0 -> B
//! - p2: A has 1, B has 1, B's set is smaller -> B
//! - p3, p4: only A is eligible -> A
//!
//! Result: A = [0, 3, 4], B = [1, 2]
//!
//! # Characteristics
//!
//! - **Pros**: Hard placement constraints, co-partitioned topics, deterministic
//! - **Cons**: Not sticky; every round starts from scratch

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::{AssignmentInput, AssignmentOutput, AssignmentStrategy};
use crate::assignment::constraint::Constraint;
use crate::assignment::member_assignment::MemberAssignment;
use crate::assignment::subscription::MemberSubscription;
use crate::assignment::topology::{TopicPartition, Topology};
use crate::config::AssignorConfig;
use crate::constants::{PartitionIndex, STRATEGY_NAME};
use crate::error::{AssignorError, Result};

/// How the engine ranks eligible members for a partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BalanceMode {
    /// Fewest partitions so far, then smallest allow-set, then member index
    #[default]
    FewestLoaded,

    /// Partitions so far scaled by group size plus eligible partitions still
    /// ahead, then member index
    Lookahead,
}

impl BalanceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BalanceMode::FewestLoaded => "fewest-loaded",
            BalanceMode::Lookahead => "lookahead",
        }
    }

    /// Sort key of one eligible member; the lowest key wins
    fn rank(
        &self,
        load: usize,
        constraint: &Constraint,
        partition: PartitionIndex,
        topology: &Topology,
        group_size: usize,
        member_index: usize,
    ) -> (usize, usize, usize) {
        let partition_count = topology.partition_count();
        match self {
            BalanceMode::FewestLoaded => (
                load,
                constraint.cardinality(partition_count),
                member_index,
            ),
            BalanceMode::Lookahead => (
                load * group_size + constraint.remaining_after(partition, partition_count),
                member_index,
                0,
            ),
        }
    }
}

impl fmt::Display for BalanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BalanceMode {
    type Err = AssignorError;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_value(serde_json::Value::String(s.trim().to_lowercase())).map_err(|_| {
            AssignorError::InvalidConfiguration(format!(
                "unknown balance mode '{}' (expected 'fewest-loaded' or 'lookahead')",
                s
            ))
        })
    }
}

/// One participant of an assignment round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: String,
    pub constraint: Constraint,
    /// Position in the group; only used as the final tiebreak
    pub join_order: usize,
}

impl Member {
    pub fn new(id: impl Into<String>, constraint: Constraint, join_order: usize) -> Self {
        Self {
            id: id.into(),
            constraint,
            join_order,
        }
    }
}

/// Result of one assignment round
///
/// Members are kept in join order; each owns an ascending list of partition
/// indices that applies to every subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    topology: Topology,
    owned: Vec<(String, Vec<PartitionIndex>)>,
    unassigned: Vec<PartitionIndex>,
}

impl Assignment {
    /// Partition indices of a member, or `None` for an unknown member
    pub fn get(&self, member_id: &str) -> Option<&[PartitionIndex]> {
        self.owned
            .iter()
            .find(|(id, _)| id == member_id)
            .map(|(_, partitions)| partitions.as_slice())
    }

    /// Members and their partition indices, in join order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PartitionIndex])> {
        self.owned
            .iter()
            .map(|(id, partitions)| (id.as_str(), partitions.as_slice()))
    }

    /// Partition indices of a member (empty for an unknown member)
    pub fn partition_indices(&self, member_id: &str) -> Vec<PartitionIndex> {
        self.get(member_id).map(<[_]>::to_vec).unwrap_or_default()
    }

    /// (topic, partition) pairs of a member, partition-major
    ///
    /// A topic with fewer partitions than the topology has no pair for the
    /// indices it lacks.
    pub fn topic_partitions(&self, member_id: &str) -> Vec<TopicPartition> {
        self.get(member_id)
            .unwrap_or_default()
            .iter()
            .flat_map(|&partition| self.topology.slot(partition))
            .collect()
    }

    /// Indices no member was eligible for
    pub fn unassigned(&self) -> &[PartitionIndex] {
        &self.unassigned
    }

    /// Number of partition indices that found an owner
    pub fn assigned_count(&self) -> usize {
        self.owned.iter().map(|(_, partitions)| partitions.len()).sum()
    }

    /// Member that owns a partition index
    pub fn owner_of(&self, partition: PartitionIndex) -> Option<&str> {
        self.owned
            .iter()
            .find(|(_, partitions)| partitions.binary_search(&partition).is_ok())
            .map(|(id, _)| id.as_str())
    }

    /// Wire-level result for one member
    pub fn member_assignment(&self, member_id: &str) -> Option<MemberAssignment> {
        self.get(member_id)
            .map(|_| MemberAssignment::with_partitions(self.topic_partitions(member_id)))
    }

    /// Per-member wire-level results for the group transport
    pub fn into_output(self) -> AssignmentOutput {
        self.owned
            .iter()
            .filter_map(|(id, _)| Some((id.clone(), self.member_assignment(id)?)))
            .collect()
    }
}

/// Compute an assignment with the default balance mode
pub fn assign(topology: &Topology, members: &[Member]) -> Result<Assignment> {
    assign_with(topology, members, BalanceMode::default())
}

/// Compute an assignment
///
/// # Errors
/// `ContractViolation` for an empty group, blank or duplicate member ids, or
/// duplicate join orders
pub fn assign_with(
    topology: &Topology,
    members: &[Member],
    mode: BalanceMode,
) -> Result<Assignment> {
    validate_members(members)?;

    let partition_count = topology.partition_count();
    debug!(
        "Assigning {} partitions of {:?} to {} members ({})",
        partition_count,
        topology.topics(),
        members.len(),
        mode
    );

    let mut ordered: Vec<&Member> = members.iter().collect();
    ordered.sort_by_key(|member| member.join_order);

    let constraints: Vec<Constraint> = ordered
        .iter()
        .map(|member| {
            let clipped = member.constraint.clip(partition_count);
            if clipped != member.constraint {
                warn!(
                    "Member {} allows partitions beyond the topology ({} partitions): {} clipped to {}",
                    member.id, partition_count, member.constraint, clipped
                );
            }
            clipped
        })
        .collect();

    let group_size = ordered.len();
    let mut owned: Vec<Vec<PartitionIndex>> = vec![Vec::new(); group_size];
    let mut unassigned = Vec::new();

    for partition in topology.partitions() {
        let chosen = constraints
            .iter()
            .enumerate()
            .filter(|(_, constraint)| constraint.allows(partition))
            .min_by_key(|(index, constraint)| {
                mode.rank(
                    owned[*index].len(),
                    constraint,
                    partition,
                    topology,
                    group_size,
                    *index,
                )
            })
            .map(|(index, _)| index);

        match chosen {
            Some(index) => {
                trace!("Partition {} -> {}", partition, ordered[index].id);
                owned[index].push(partition);
            }
            None => {
                trace!("Partition {} has no eligible member", partition);
                unassigned.push(partition);
            }
        }
    }

    if !unassigned.is_empty() {
        debug!("Partitions without an eligible member: {:?}", unassigned);
    }

    Ok(Assignment {
        topology: topology.clone(),
        owned: ordered
            .iter()
            .zip(owned)
            .map(|(member, partitions)| (member.id.clone(), partitions))
            .collect(),
        unassigned,
    })
}

fn validate_members(members: &[Member]) -> Result<()> {
    if members.is_empty() {
        return Err(AssignorError::ContractViolation(
            "assignment requires at least one member".into(),
        ));
    }

    let mut ids = HashSet::with_capacity(members.len());
    let mut orders = HashSet::with_capacity(members.len());
    for member in members {
        if member.id.trim().is_empty() {
            return Err(AssignorError::ContractViolation(
                "member id must not be blank".into(),
            ));
        }
        if !ids.insert(member.id.as_str()) {
            return Err(AssignorError::ContractViolation(format!(
                "member {} appears twice",
                member.id
            )));
        }
        if !orders.insert(member.join_order) {
            return Err(AssignorError::ContractViolation(format!(
                "join order {} is shared by several members",
                member.join_order
            )));
        }
    }

    Ok(())
}

/// Allowed-only partition assignment strategy
#[derive(Debug, Clone, Default)]
pub struct AllowedOnlyStrategy {
    config: AssignorConfig,
}

impl AllowedOnlyStrategy {
    /// Create a strategy for the given local configuration
    pub fn new(config: AssignorConfig) -> Self {
        Self { config }
    }

    /// Create a strategy from raw client configuration
    pub fn configure(configs: &HashMap<String, serde_json::Value>) -> Result<Self> {
        Ok(Self::new(AssignorConfig::from_map(configs)?))
    }

    pub fn config(&self) -> &AssignorConfig {
        &self.config
    }

    /// Run the engine on already-decoded members
    pub fn assign_members(&self, topology: &Topology, members: &[Member]) -> Result<Assignment> {
        assign_with(topology, members, self.config.balance)
    }
}

impl AssignmentStrategy for AllowedOnlyStrategy {
    fn name(&self) -> &'static str {
        STRATEGY_NAME
    }

    fn subscription(&self, topics: Vec<String>) -> MemberSubscription {
        MemberSubscription::with_constraint(topics, &self.config.allowed_partitions)
    }

    fn assign(&self, input: &AssignmentInput) -> Result<AssignmentOutput> {
        let topology = input.topology()?;
        let members = input.members()?;
        let assignment = self.assign_members(&topology, &members)?;

        debug!(
            "Assigned {} of {} partitions, {} unassigned",
            assignment.assigned_count(),
            topology.partition_count(),
            assignment.unassigned().len()
        );

        Ok(assignment.into_output())
    }
}
