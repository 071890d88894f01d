//! Member constraints and their subscription user-data encoding
//!
//! A [`Constraint`] is the canonical form of a member's `allowed.partitions`
//! option. It travels to the computing member inside the `user_data` field of
//! the ConsumerProtocolSubscription.
//!
//! # Wire Format (subscription user_data)
//!
//! ```text
//! Unrestricted:
//!   user_data = null (a zero-length payload is read the same way)
//!
//! AllowSet:
//!   version: i16            // ALLOWED_PARTITIONS_USER_DATA_VERSION
//!   count: i32
//!   partitions: [i16]       // strictly ascending
//! ```

use std::fmt;

use bytes::{Buf, BufMut};

use crate::constants::{
    PartitionIndex, ALLOWED_PARTITIONS_SEPARATOR, ALLOWED_PARTITIONS_USER_DATA_VERSION,
    MIN_USER_DATA_SIZE,
};
use crate::error::{AssignorError, Result};

/// Strictly ascending, deduplicated set of partition indices
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AllowSet(Vec<PartitionIndex>);

impl AllowSet {
    /// Build a set from indices in any order, collapsing duplicates
    pub fn new<I>(indices: I) -> Self
    where
        I: IntoIterator<Item = PartitionIndex>,
    {
        let mut indices: Vec<PartitionIndex> = indices.into_iter().collect();
        indices.sort_unstable();
        indices.dedup();
        Self(indices)
    }

    /// The empty set: the member is eligible for nothing
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, partition: PartitionIndex) -> bool {
        self.0.binary_search(&partition).is_ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = PartitionIndex> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[PartitionIndex] {
        &self.0
    }

    /// Drop every index that does not exist in a topology of `partition_count`
    pub fn clip(&self, partition_count: usize) -> AllowSet {
        let end = self
            .0
            .partition_point(|&p| (p as usize) < partition_count);
        Self(self.0[..end].to_vec())
    }

    /// Number of indices strictly greater than `partition`
    pub fn count_after(&self, partition: PartitionIndex) -> usize {
        self.0.len() - self.0.partition_point(|&p| p <= partition)
    }
}

impl FromIterator<PartitionIndex> for AllowSet {
    fn from_iter<T: IntoIterator<Item = PartitionIndex>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// Canonical delimited rendering, e.g. `0,1,2`; the empty set renders as ``
impl fmt::Display for AllowSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, partition) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", ALLOWED_PARTITIONS_SEPARATOR)?;
            }
            write!(f, "{}", partition)?;
        }
        Ok(())
    }
}

/// Which partitions a member is permitted to serve
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Constraint {
    /// No `allowed.partitions` option: every partition is acceptable
    #[default]
    Unrestricted,

    /// Only the listed partitions are acceptable (possibly none)
    AllowSet(AllowSet),
}

impl Constraint {
    /// Shorthand for `Constraint::AllowSet(AllowSet::new(indices))`
    pub fn allow<I>(indices: I) -> Self
    where
        I: IntoIterator<Item = PartitionIndex>,
    {
        Constraint::AllowSet(AllowSet::new(indices))
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Constraint::Unrestricted)
    }

    pub fn allow_set(&self) -> Option<&AllowSet> {
        match self {
            Constraint::Unrestricted => None,
            Constraint::AllowSet(set) => Some(set),
        }
    }

    /// Whether `partition` may be assigned to a member with this constraint
    pub fn allows(&self, partition: PartitionIndex) -> bool {
        match self {
            Constraint::Unrestricted => true,
            Constraint::AllowSet(set) => set.contains(partition),
        }
    }

    /// Size used for tiebreaks; `Unrestricted` counts as the whole topology
    pub fn cardinality(&self, partition_count: usize) -> usize {
        match self {
            Constraint::Unrestricted => partition_count,
            Constraint::AllowSet(set) => set.len(),
        }
    }

    /// Restrict an allow-set to a topology of `partition_count` partitions
    pub fn clip(&self, partition_count: usize) -> Constraint {
        match self {
            Constraint::Unrestricted => Constraint::Unrestricted,
            Constraint::AllowSet(set) => Constraint::AllowSet(set.clip(partition_count)),
        }
    }

    /// Eligible partitions strictly after `partition` in a topology of `partition_count`
    pub fn remaining_after(&self, partition: PartitionIndex, partition_count: usize) -> usize {
        match self {
            Constraint::Unrestricted => partition_count.saturating_sub(partition as usize + 1),
            Constraint::AllowSet(set) => set.count_after(partition),
        }
    }

    /// Encode for the subscription `user_data` field
    ///
    /// `Unrestricted` is the absence of user data, so members that do not
    /// run this assignor's configuration layer still decode as unrestricted.
    pub fn encode_user_data(&self) -> Option<Vec<u8>> {
        let set = self.allow_set()?;

        let mut buf = Vec::with_capacity(MIN_USER_DATA_SIZE + set.len() * 2);
        buf.put_i16(ALLOWED_PARTITIONS_USER_DATA_VERSION);
        buf.put_i32(set.len() as i32);
        for partition in set.iter() {
            // MAX_PARTITION_INDEX == i16::MAX, so the cast is lossless
            buf.put_i16(partition as i16);
        }

        Some(buf)
    }

    /// Decode the subscription `user_data` field
    pub fn decode_user_data(user_data: Option<&[u8]>) -> Result<Self> {
        let mut buf = match user_data {
            None => return Ok(Constraint::Unrestricted),
            Some(bytes) if bytes.is_empty() => return Ok(Constraint::Unrestricted),
            Some(bytes) => bytes,
        };

        if buf.remaining() < MIN_USER_DATA_SIZE {
            return Err(AssignorError::corrupt(format!(
                "allowed-partitions user data too short: {} bytes (need at least {})",
                buf.remaining(),
                MIN_USER_DATA_SIZE
            )));
        }

        let version = buf.get_i16();
        if version != ALLOWED_PARTITIONS_USER_DATA_VERSION {
            return Err(AssignorError::UnsupportedVersion(version));
        }

        let count = buf.get_i32();
        if count < 0 {
            return Err(AssignorError::corrupt(format!(
                "Invalid allowed-partitions count: {}",
                count
            )));
        }

        let count = count as usize;
        if buf.remaining() < count * 2 {
            return Err(AssignorError::corrupt(format!(
                "Allowed-partitions array of {} entries exceeds remaining data {}",
                count,
                buf.remaining()
            )));
        }

        let mut indices = Vec::with_capacity(count);
        for _ in 0..count {
            let partition = buf.get_i16();
            if partition < 0 {
                return Err(AssignorError::corrupt(format!(
                    "Negative allowed partition: {}",
                    partition
                )));
            }
            indices.push(partition as PartitionIndex);
        }

        Ok(Constraint::AllowSet(AllowSet::new(indices)))
    }
}

impl From<AllowSet> for Constraint {
    fn from(set: AllowSet) -> Self {
        Constraint::AllowSet(set)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Unrestricted => write!(f, "unrestricted"),
            Constraint::AllowSet(set) => write!(f, "[{}]", set),
        }
    }
}
