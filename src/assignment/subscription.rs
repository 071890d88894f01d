//! MemberSubscription parsing and encoding
//!
//! The MemberSubscription is sent by consumers in the JoinGroup request's
//! protocol metadata. It names the subscribed topics and carries the member's
//! allowed partitions in `user_data`.
//!
//! # Wire Format (Kafka ConsumerProtocolSubscription)
//!
//! ```text
//! version: i16
//! topics: [String]
//!   - array_length: i32
//!   - for each topic:
//!     - string_length: i16
//!     - string_bytes: [u8]
//! user_data: bytes
//!   - length: i32 (-1 for null)
//!   - data: [u8] (if length >= 0), see constraint.rs for the layout
//! owned_partitions: [TopicPartition] (v1+ only)
//!   - Ignored: assignments are recomputed from scratch every round
//! ```

use bytes::{Buf, BufMut};

use super::constraint::Constraint;
use crate::constants::{CONSUMER_PROTOCOL_VERSION, MIN_ENVELOPE_SIZE, NULL_LENGTH};
use crate::error::{AssignorError, Result};

/// Consumer subscription metadata from JoinGroup request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemberSubscription {
    /// Protocol version
    pub version: i16,

    /// List of topic names the consumer wants to subscribe to
    pub topics: Vec<String>,

    /// Encoded allowed partitions (null for an unrestricted member)
    pub user_data: Option<Vec<u8>>,
}

impl MemberSubscription {
    /// Create a new subscription with the given topics and no constraint
    pub fn new(topics: Vec<String>) -> Self {
        Self {
            version: CONSUMER_PROTOCOL_VERSION,
            topics,
            user_data: None,
        }
    }

    /// Create the subscription a member advertises for its constraint
    pub fn with_constraint(topics: Vec<String>, constraint: &Constraint) -> Self {
        Self {
            version: CONSUMER_PROTOCOL_VERSION,
            topics,
            user_data: constraint.encode_user_data(),
        }
    }

    /// Decode the allowed partitions carried in `user_data`
    pub fn constraint(&self) -> Result<Constraint> {
        Constraint::decode_user_data(self.user_data.as_deref())
    }

    /// Parse a MemberSubscription from raw bytes
    ///
    /// # Arguments
    /// * `bytes` - Raw bytes from JoinGroup protocol metadata field
    ///
    /// # Returns
    /// Parsed subscription or error if format is invalid
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }

        let mut buf = bytes;

        if buf.remaining() < MIN_ENVELOPE_SIZE {
            return Err(AssignorError::corrupt(format!(
                "MemberSubscription too short: {} bytes (need at least {})",
                buf.remaining(),
                MIN_ENVELOPE_SIZE
            )));
        }

        let version = buf.get_i16();

        let topics_len = buf.get_i32();
        if topics_len < 0 {
            return Err(AssignorError::corrupt(format!(
                "Invalid topics array length: {}",
                topics_len
            )));
        }

        let mut topics = Vec::with_capacity((topics_len as usize).min(buf.remaining() / 2));
        for _ in 0..topics_len {
            if buf.remaining() < 2 {
                return Err(AssignorError::corrupt(
                    "Unexpected end of data reading topic string length",
                ));
            }

            let str_len = buf.get_i16();
            if str_len < 0 {
                // Null string - skip
                continue;
            }

            let str_len = str_len as usize;
            if buf.remaining() < str_len {
                return Err(AssignorError::corrupt(format!(
                    "Topic string length {} exceeds remaining data {}",
                    str_len,
                    buf.remaining()
                )));
            }

            let mut str_bytes = vec![0u8; str_len];
            buf.copy_to_slice(&mut str_bytes);

            let topic = String::from_utf8(str_bytes)
                .map_err(|e| AssignorError::corrupt(format!("Invalid UTF-8 in topic name: {}", e)))?;

            topics.push(topic);
        }

        // A truncated user_data must not read as "unrestricted"
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

        Ok(Self {
            version,
            topics,
            user_data,
        })
    }

    /// Encode this subscription to bytes for wire format
    ///
    /// # Returns
    /// Encoded bytes suitable for JoinGroup protocol metadata
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64);

        buf.put_i16(self.version);

        buf.put_i32(self.topics.len() as i32);
        for topic in &self.topics {
            let topic_bytes = topic.as_bytes();
            buf.put_i16(topic_bytes.len() as i16);
            buf.put_slice(topic_bytes);
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
