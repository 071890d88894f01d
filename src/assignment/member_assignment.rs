//! MemberAssignment parsing and encoding
//!
//! The MemberAssignment is returned to consumers in the SyncGroup response.
//! It lists the (topic, partition) pairs the leader computed for the member.
//!
//! # Wire Format (Kafka ConsumerProtocolAssignment)
//!
//! ```text
//! version: i16
//! topic_partitions: [TopicPartition]
//!   - array_length: i32
//!   - for each topic:
//!     - topic_name:
//!       - string_length: i16
//!       - string_bytes: [u8]
//!     - partitions: [i32]
//!       - array_length: i32
//!       - partition_ids: [i32]
//! user_data: bytes
//!   - length: i32 (-1 for null)
//!   - data: [u8] (if length >= 0)
//! ```
//!
//! In memory the pairs are kept partition-major: every topic's partition `p`
//! before any topic's partition `p + 1`, topics in subscription order.

use bytes::{Buf, BufMut};

use super::topology::TopicPartition;
use crate::constants::{
    PartitionIndex, CONSUMER_PROTOCOL_VERSION, MAX_PARTITION_INDEX, MIN_ENVELOPE_SIZE,
    NULL_LENGTH,
};
use crate::error::{AssignorError, Result};

/// Partition assignment for a consumer member
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemberAssignment {
    /// Protocol version
    pub version: i16,

    /// Assigned pairs, partition-major
    pub partitions: Vec<TopicPartition>,

    /// Opaque bytes returned to the member; this assignor always sends empty
    pub user_data: Option<Vec<u8>>,
}

impl MemberAssignment {
    /// Create a new empty assignment
    pub fn new() -> Self {
        Self::default()
    }

    /// Create assignment with specific topic-partitions and empty user data
    pub fn with_partitions(partitions: Vec<TopicPartition>) -> Self {
        Self {
            version: CONSUMER_PROTOCOL_VERSION,
            partitions,
            user_data: Some(Vec::new()),
        }
    }

    /// Get partitions for a specific topic, in assignment order
    pub fn partitions(&self, topic: &str) -> Vec<PartitionIndex> {
        self.partitions
            .iter()
            .filter(|tp| tp.topic == topic)
            .map(|tp| tp.partition)
            .collect()
    }

    /// Distinct partition indices owned by this member, ascending
    pub fn partition_indices(&self) -> Vec<PartitionIndex> {
        let mut indices: Vec<PartitionIndex> = self.partitions.iter().map(|tp| tp.partition).collect();
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    /// Check if this assignment is empty (no partitions assigned)
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    /// Total number of (topic, partition) pairs assigned
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Topics in order of first appearance
    fn topics(&self) -> Vec<&str> {
        let mut topics: Vec<&str> = Vec::new();
        for tp in &self.partitions {
            if !topics.contains(&tp.topic.as_str()) {
                topics.push(&tp.topic);
            }
        }
        topics
    }

    /// Parse a MemberAssignment from raw bytes
    ///
    /// # Arguments
    /// * `bytes` - Raw bytes from SyncGroup assignment field
    ///
    /// # Returns
    /// Parsed assignment (pairs restored to partition-major order) or error if
    /// format is invalid
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }

        let mut buf = bytes;

        if buf.remaining() < MIN_ENVELOPE_SIZE {
            return Err(AssignorError::corrupt(format!(
                "MemberAssignment too short: {} bytes (need at least {})",
                buf.remaining(),
                MIN_ENVELOPE_SIZE
            )));
        }

        let version = buf.get_i16();

        let topics_len = buf.get_i32();
        if topics_len < 0 {
            return Err(AssignorError::corrupt(format!(
                "Invalid topic_partitions array length: {}",
                topics_len
            )));
        }

        // (partition, topic position on the wire, pair)
        let mut keyed: Vec<(PartitionIndex, usize, TopicPartition)> = Vec::new();

        for topic_position in 0..topics_len as usize {
            if buf.remaining() < 2 {
                return Err(AssignorError::corrupt(
                    "Unexpected end of data reading topic name length",
                ));
            }

            let str_len = buf.get_i16();
            if str_len < 0 {
                return Err(AssignorError::corrupt("Null topic name in assignment"));
            }

            let str_len = str_len as usize;
            if buf.remaining() < str_len {
                return Err(AssignorError::corrupt(format!(
                    "Topic name length {} exceeds remaining data {}",
                    str_len,
                    buf.remaining()
                )));
            }

            let mut str_bytes = vec![0u8; str_len];
            buf.copy_to_slice(&mut str_bytes);

            let topic_name = String::from_utf8(str_bytes)
                .map_err(|e| AssignorError::corrupt(format!("Invalid UTF-8 in topic name: {}", e)))?;

            if buf.remaining() < 4 {
                return Err(AssignorError::corrupt(
                    "Unexpected end of data reading partitions array length",
                ));
            }

            let partitions_len = buf.get_i32();
            if partitions_len < 0 {
                continue;
            }

            let partitions_len = partitions_len as usize;
            if buf.remaining() / 4 < partitions_len {
                return Err(AssignorError::corrupt(format!(
                    "Partitions array length {} exceeds remaining data {}",
                    partitions_len,
                    buf.remaining()
                )));
            }

            for _ in 0..partitions_len {
                let partition = buf.get_i32();
                if !(0..=MAX_PARTITION_INDEX as i32).contains(&partition) {
                    return Err(AssignorError::corrupt(format!(
                        "Partition {} of topic {} is out of range",
                        partition, topic_name
                    )));
                }
                let partition = partition as PartitionIndex;
                keyed.push((
                    partition,
                    topic_position,
                    TopicPartition::new(topic_name.clone(), partition),
                ));
            }
        }

        let user_data = if buf.remaining() >= 4 {
            let data_len = buf.get_i32();
            if data_len < 0 {
                None
            } else if buf.remaining() >= data_len as usize {
                let mut data = vec![0u8; data_len as usize];
                buf.copy_to_slice(&mut data);
                Some(data)
            } else {
                return Err(AssignorError::corrupt(format!(
                    "User data length {} exceeds remaining data {}",
                    data_len,
                    buf.remaining()
                )));
            }
        } else if buf.has_remaining() {
            return Err(AssignorError::corrupt(
                "Unexpected end of data reading user_data length",
            ));
        } else {
            None
        };

        keyed.sort_by_key(|(partition, position, _)| (*partition, *position));

        Ok(Self {
            version,
            partitions: keyed.into_iter().map(|(_, _, tp)| tp).collect(),
            user_data,
        })
    }

    /// Encode this assignment to bytes for wire format
    ///
    /// Topics are written in first-appearance order, each with its partitions
    /// in assignment order.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(128);

        buf.put_i16(self.version);

        let topics = self.topics();
        buf.put_i32(topics.len() as i32);
        for topic_name in topics {
            let name_bytes = topic_name.as_bytes();
            buf.put_i16(name_bytes.len() as i16);
            buf.put_slice(name_bytes);

            let partitions = self.partitions(topic_name);
            buf.put_i32(partitions.len() as i32);
            for partition in partitions {
                buf.put_i32(partition as i32);
            }
        }

        match &self.user_data {
            Some(data) => {
                buf.put_i32(data.len() as i32);
                buf.put_slice(data);
            }
            None => {
                buf.put_i32(NULL_LENGTH);
            }
        }

        buf
    }
}
