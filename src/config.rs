//! Pipeline configuration.
//!
//! Queue sizes and the payload limit are tunable per deployment, either in
//! code through the builder setters or from environment variables via
//! [`PipelineConfig::from_env`]:
//!
//! | Variable                     | Default  |
//! |------------------------------|----------|
//! | `NETQUEUE_QUEUE_CAPACITY`    | 32       |
//! | `NETQUEUE_ERROR_CAPACITY`    | 32       |
//! | `NETQUEUE_MAX_PAYLOAD_SIZE`  | 16 MiB   |

use std::str::FromStr;

use crate::error::{NetqueueError, Result};
use crate::message::DEFAULT_QUEUE_CAPACITY;
use crate::protocol::DEFAULT_MAX_PAYLOAD_SIZE;

/// Environment variable for [`PipelineConfig::queue_capacity`].
pub const ENV_QUEUE_CAPACITY: &str = "NETQUEUE_QUEUE_CAPACITY";
/// Environment variable for [`PipelineConfig::error_capacity`].
pub const ENV_ERROR_CAPACITY: &str = "NETQUEUE_ERROR_CAPACITY";
/// Environment variable for [`PipelineConfig::max_payload_size`].
pub const ENV_MAX_PAYLOAD_SIZE: &str = "NETQUEUE_MAX_PAYLOAD_SIZE";

/// Configuration shared by the encoding and decoding pipelines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Capacity of the message queue.
    pub queue_capacity: usize,
    /// Capacity of the error queue.
    pub error_capacity: usize,
    /// Largest record payload accepted on either side, in bytes.
    pub max_payload_size: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            error_capacity: DEFAULT_QUEUE_CAPACITY,
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
        }
    }
}

impl PipelineConfig {
    /// Set the message queue capacity.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the error queue capacity.
    pub fn with_error_capacity(mut self, capacity: usize) -> Self {
        self.error_capacity = capacity;
        self
    }

    /// Set the payload limit.
    pub fn with_max_payload_size(mut self, max_payload_size: u32) -> Self {
        self.max_payload_size = max_payload_size;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`NetqueueError::InvalidConfig`] if a variable is set but
    /// cannot be parsed, or the result fails [`PipelineConfig::validate`].
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            queue_capacity: parse_env(ENV_QUEUE_CAPACITY, defaults.queue_capacity)?,
            error_capacity: parse_env(ENV_ERROR_CAPACITY, defaults.error_capacity)?,
            max_payload_size: parse_env(ENV_MAX_PAYLOAD_SIZE, defaults.max_payload_size)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(NetqueueError::InvalidConfig(
                "queue_capacity must be at least 1".to_string(),
            ));
        }
        if self.error_capacity == 0 {
            return Err(NetqueueError::InvalidConfig(
                "error_capacity must be at least 1".to_string(),
            ));
        }
        if self.max_payload_size == 0 {
            return Err(NetqueueError::InvalidConfig(
                "max_payload_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    // tokio's bounded channels panic on zero capacity
    pub(crate) fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.max(1)
    }

    pub(crate) fn error_capacity_clamped(&self) -> usize {
        self.error_capacity.max(1)
    }
}

fn parse_env<T: FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            NetqueueError::InvalidConfig(format!("{}={:?} is not a valid value", key, raw))
        }),
        Err(_) => Ok(default),
    }
}
