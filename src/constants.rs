//! Assignor constants
//!
//! This module centralizes the magic numbers and names shared by the parser,
//! the wire codecs and the assignment engine.

/// A logical partition slot, shared by every co-subscribed topic
pub type PartitionIndex = u16;

// ===== Partition bounds =====

/// Largest partition index an allowed-partitions list may name
///
/// Matches `i16::MAX` so every index fits the 16-bit user-data encoding as
/// well as the 32-bit partition fields of the consumer protocol.
pub const MAX_PARTITION_INDEX: PartitionIndex = i16::MAX as PartitionIndex;

/// Largest partition count a topology may carry (indices 0..=MAX_PARTITION_INDEX)
pub const MAX_PARTITION_COUNT: usize = MAX_PARTITION_INDEX as usize + 1;

// ===== Configuration keys =====

/// Consumer configuration key holding the member's allowed partitions
///
/// Absent or null means the member may serve every partition.
pub const ALLOWED_PARTITIONS_CONFIG: &str = "allowed.partitions";

/// Consumer configuration key selecting the tiebreak rule of the engine
pub const BALANCE_MODE_CONFIG: &str = "allowed.partitions.balance";

/// Separator for the delimited-string form of `allowed.partitions`
pub const ALLOWED_PARTITIONS_SEPARATOR: char = ',';

// ===== Protocol identity =====

/// Assignment strategy name advertised in JoinGroup protocol lists
pub const STRATEGY_NAME: &str = "allowed-only";

/// ConsumerProtocolSubscription / ConsumerProtocolAssignment version we emit
pub const CONSUMER_PROTOCOL_VERSION: i16 = 0;

/// Version of the allowed-partitions layout carried in subscription user data
pub const ALLOWED_PARTITIONS_USER_DATA_VERSION: i16 = 0;

// ===== Wire sizes =====

/// version(2) + array_length(4)
pub const MIN_ENVELOPE_SIZE: usize = 6;

/// version(2) + count(4)
pub const MIN_USER_DATA_SIZE: usize = 6;

/// Length marker for a null bytes/array field
pub const NULL_LENGTH: i32 = -1;
