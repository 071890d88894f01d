// Configuration module for allowed-assignor
//
// Options arrive the way a Kafka client hands them to a configurable
// assignor: a map of option name to loosely typed value. Only the options
// below are read; everything else belongs to the surrounding client.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::assignment::allowed_partitions::{parse_allowed_partitions, RawAllowedPartitions};
use crate::assignment::constraint::Constraint;
use crate::assignment::strategies::BalanceMode;
use crate::constants::{ALLOWED_PARTITIONS_CONFIG, BALANCE_MODE_CONFIG};
use crate::error::{AssignorError, Result};

/// Local configuration of one consumer's assignor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignorConfig {
    /// Parsed `allowed.partitions` (absent means unrestricted)
    pub allowed_partitions: Constraint,
    /// `allowed.partitions.balance`
    pub balance: BalanceMode,
}

impl AssignorConfig {
    /// Read the assignor options out of a client configuration map
    ///
    /// # Errors
    /// `InvalidConfiguration` when `allowed.partitions` cannot be normalized or
    /// `allowed.partitions.balance` names an unknown mode
    pub fn from_map(configs: &HashMap<String, Value>) -> Result<Self> {
        let allowed_partitions = match configs.get(ALLOWED_PARTITIONS_CONFIG) {
            Some(value) => {
                let raw = RawAllowedPartitions::try_from(value)?;
                parse_allowed_partitions(&raw).map_err(|e| match e {
                    AssignorError::InvalidConfiguration(reason) => AssignorError::InvalidConfiguration(
                        format!("{}: {}", ALLOWED_PARTITIONS_CONFIG, reason),
                    ),
                    other => other,
                })?
            }
            None => Constraint::Unrestricted,
        };

        let balance = match configs.get(BALANCE_MODE_CONFIG) {
            None | Some(Value::Null) => BalanceMode::default(),
            Some(Value::String(name)) => name.parse()?,
            Some(other) => {
                return Err(AssignorError::InvalidConfiguration(format!(
                    "{} must be a string, got {}",
                    BALANCE_MODE_CONFIG, other
                )))
            }
        };

        debug!(
            "Configured allowed partitions {} with {} balancing",
            allowed_partitions, balance
        );

        Ok(Self {
            allowed_partitions,
            balance,
        })
    }
}
