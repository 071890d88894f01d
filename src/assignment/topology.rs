//! Topology snapshot for one assignment round
//!
//! All subscribed topics are treated as exposing the same `partition_count`
//! partitions. Partition index `p` of every topic is a single logical slot,
//! which is what lets the engine keep co-subscribed topics co-partitioned.
//! A topic smaller than `partition_count` simply has no pair in the slots it
//! lacks.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::debug;

use crate::constants::{PartitionIndex, MAX_PARTITION_COUNT};
use crate::error::{AssignorError, Result};

/// A single (topic, partition) pair of an assignment
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TopicPartition {
    pub topic: String,
    pub partition: PartitionIndex,
}

impl TopicPartition {
    pub fn new(topic: impl Into<String>, partition: PartitionIndex) -> Self {
        Self {
            topic: topic.into(),
            partition,
        }
    }
}

impl fmt::Display for TopicPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.topic, self.partition)
    }
}

/// Subscribed topics plus their shared partition count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    topics: Vec<String>,
    /// Partitions each topic really has, parallel to `topics`
    topic_partition_counts: Vec<usize>,
    partition_count: usize,
}

impl Topology {
    /// Create a topology
    ///
    /// # Arguments
    /// * `topics` - Subscribed topic names; order is kept in assignment output
    /// * `partition_count` - Number of partitions every topic exposes
    ///
    /// # Errors
    /// `ContractViolation` for duplicate/blank topic names or a partition count
    /// above `MAX_PARTITION_COUNT`
    pub fn new(topics: Vec<String>, partition_count: usize) -> Result<Self> {
        if partition_count > MAX_PARTITION_COUNT {
            return Err(AssignorError::ContractViolation(format!(
                "partition count {} exceeds {}",
                partition_count, MAX_PARTITION_COUNT
            )));
        }

        let mut seen = HashSet::with_capacity(topics.len());
        for topic in &topics {
            if topic.is_empty() {
                return Err(AssignorError::ContractViolation(
                    "blank topic name in topology".into(),
                ));
            }
            if !seen.insert(topic.as_str()) {
                return Err(AssignorError::ContractViolation(format!(
                    "topic {} listed twice in topology",
                    topic
                )));
            }
        }

        Ok(Self {
            topic_partition_counts: vec![partition_count; topics.len()],
            topics,
            partition_count,
        })
    }

    /// Resolve the topology from broker metadata
    ///
    /// The shared partition count is the largest count among `topics`; a
    /// topic missing from `topic_partitions` counts as 0. Indices a smaller
    /// topic does not have are still assigned, but [`Topology::slot`] leaves
    /// that topic out of them. Counts beyond `MAX_PARTITION_COUNT` are capped.
    pub fn from_partition_counts(
        topics: Vec<String>,
        topic_partitions: &HashMap<String, i32>,
    ) -> Result<Self> {
        let counts: Vec<usize> = topics
            .iter()
            .map(|topic| {
                let count = topic_partitions.get(topic).copied().unwrap_or(0).max(0) as usize;
                count.min(MAX_PARTITION_COUNT)
            })
            .collect();

        let max = counts.iter().copied().max().unwrap_or(0);
        let min = counts.iter().copied().min().unwrap_or(0);
        if min != max {
            debug!(
                "Subscribed topics have uneven partition counts ({}..={}), using {}",
                min, max, max
            );
        }

        let mut topology = Self::new(topics, max)?;
        topology.topic_partition_counts = counts;
        Ok(topology)
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn partition_count(&self) -> usize {
        self.partition_count
    }

    /// All partition indices of this topology, ascending
    pub fn partitions(&self) -> impl Iterator<Item = PartitionIndex> {
        // partition_count <= MAX_PARTITION_COUNT, so every index fits
        (0..self.partition_count).map(|p| p as PartitionIndex)
    }

    /// Partitions `topic` really has, or `None` when it is not subscribed
    pub fn topic_partition_count(&self, topic: &str) -> Option<usize> {
        self.topics
            .iter()
            .position(|t| t == topic)
            .map(|i| self.topic_partition_counts[i])
    }

    /// The (topic, partition) pairs of one logical partition slot, in topic order
    ///
    /// Topics with fewer than `partition + 1` partitions are skipped.
    pub fn slot(&self, partition: PartitionIndex) -> impl Iterator<Item = TopicPartition> + '_ {
        self.topics
            .iter()
            .zip(&self.topic_partition_counts)
            .filter(move |&(_, &count)| (partition as usize) < count)
            .map(move |(topic, _)| TopicPartition::new(topic.clone(), partition))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topics(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_topology() {
        let topology = Topology::new(topics(&["topic-a", "topic-b"]), 3).unwrap();
        assert_eq!(topology.topics(), &["topic-a", "topic-b"]);
        assert_eq!(topology.partition_count(), 3);
        assert_eq!(topology.partitions().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_duplicate_topic_rejected() {
        let result = Topology::new(topics(&["topic-a", "topic-a"]), 3);
        assert!(matches!(result, Err(AssignorError::ContractViolation(_))));
    }

    #[test]
    fn test_blank_topic_rejected() {
        assert!(Topology::new(topics(&[""]), 3).is_err());
    }

    #[test]
    fn test_partition_count_bound() {
        assert!(Topology::new(topics(&["t"]), MAX_PARTITION_COUNT).is_ok());
        assert!(Topology::new(topics(&["t"]), MAX_PARTITION_COUNT + 1).is_err());
    }

    #[test]
    fn test_slot_follows_topic_order() {
        let topology = Topology::new(topics(&["topic-b", "topic-a"]), 2).unwrap();
        let slot: Vec<TopicPartition> = topology.slot(1).collect();
        assert_eq!(
            slot,
            vec![
                TopicPartition::new("topic-b", 1),
                TopicPartition::new("topic-a", 1)
            ]
        );
    }

    #[test]
    fn test_from_partition_counts_uses_largest() {
        let mut counts = HashMap::new();
        counts.insert("topic-a".to_string(), 4);
        counts.insert("topic-b".to_string(), 6);
        counts.insert("unrelated".to_string(), 100);

        let topology =
            Topology::from_partition_counts(topics(&["topic-a", "topic-b"]), &counts).unwrap();
        assert_eq!(topology.partition_count(), 6);
        assert_eq!(topology.topic_partition_count("topic-a"), Some(4));
        assert_eq!(topology.topic_partition_count("unrelated"), None);
    }

    #[test]
    fn test_slot_skips_partitions_a_topic_lacks() {
        let mut counts = HashMap::new();
        counts.insert("small".to_string(), 2);
        counts.insert("large".to_string(), 5);

        let topology =
            Topology::from_partition_counts(topics(&["small", "large"]), &counts).unwrap();

        assert_eq!(
            topology.slot(1).collect::<Vec<_>>(),
            vec![TopicPartition::new("small", 1), TopicPartition::new("large", 1)]
        );
        assert_eq!(
            topology.slot(3).collect::<Vec<_>>(),
            vec![TopicPartition::new("large", 3)]
        );
    }

    #[test]
    fn test_from_partition_counts_missing_topic() {
        let topology =
            Topology::from_partition_counts(topics(&["missing"]), &HashMap::new()).unwrap();
        assert_eq!(topology.partition_count(), 0);
        assert_eq!(topology.partitions().count(), 0);
    }

    #[test]
    fn test_from_partition_counts_caps_and_ignores_negative() {
        let mut counts = HashMap::new();
        counts.insert("huge".to_string(), i32::MAX);
        counts.insert("broken".to_string(), -3);

        let huge = Topology::from_partition_counts(topics(&["huge"]), &counts).unwrap();
        assert_eq!(huge.partition_count(), MAX_PARTITION_COUNT);

        let broken = Topology::from_partition_counts(topics(&["broken"]), &counts).unwrap();
        assert_eq!(broken.partition_count(), 0);
    }

    #[test]
    fn test_topic_partition_display() {
        assert_eq!(TopicPartition::new("events", 3).to_string(), "events-3");
    }
}
