//! Engine configuration.

use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for the transfer engine.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct TransferConfig {
    /// How long a drag must hover over a navigation target before the
    /// coordinator auto-navigates into it.
    #[builder(default = "Duration::from_secs(2)")]
    #[serde(default = "default_navigate_delay")]
    pub navigate_delay: Duration,

    /// How many source references the resolver works on concurrently.
    #[builder(default = "4")]
    #[serde(default = "default_resolve_concurrency")]
    pub resolve_concurrency: usize,

    /// Buffer size of the session and coordinator event channels.
    #[builder(default = "64")]
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_navigate_delay() -> Duration {
    Duration::from_secs(2)
}

fn default_resolve_concurrency() -> usize {
    4
}

fn default_event_capacity() -> usize {
    64
}

impl TransferConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(n) = self.resolve_concurrency {
            if n == 0 {
                return Err("resolve_concurrency must be at least 1".to_string());
            }
        }
        if let Some(n) = self.event_capacity {
            if n == 0 {
                return Err("event_capacity must be at least 1".to_string());
            }
        }
        Ok(())
    }
}

impl TransferConfig {
    /// Create a new config builder.
    pub fn builder() -> TransferConfigBuilder {
        TransferConfigBuilder::default()
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            navigate_delay: default_navigate_delay(),
            resolve_concurrency: default_resolve_concurrency(),
            event_capacity: default_event_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = TransferConfig::builder()
            .navigate_delay(Duration::from_millis(500))
            .resolve_concurrency(8usize)
            .build()
            .unwrap();

        assert_eq!(config.navigate_delay, Duration::from_millis(500));
        assert_eq!(config.resolve_concurrency, 8);
        assert_eq!(config.event_capacity, 64);
    }

    #[test]
    fn test_config_rejects_zero_concurrency() {
        let result = TransferConfig::builder().resolve_concurrency(0usize).build();
        assert!(result.is_err());
    }
}
