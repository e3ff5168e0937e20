//! Configuration for the runner module.

use serde::{Deserialize, Serialize};

/// Configuration for the process-backed runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// How long to keep draining output after the process exited, in milliseconds.
    #[serde(default = "default_drain_grace")]
    pub drain_grace_ms: u64,

    /// Read buffer size per output stream.
    #[serde(default = "default_read_buffer")]
    pub read_buffer_bytes: usize,
}

fn default_drain_grace() -> u64 {
    500
}

fn default_read_buffer() -> usize {
    8 * 1024
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            drain_grace_ms: default_drain_grace(),
            read_buffer_bytes: default_read_buffer(),
        }
    }
}

impl RunnerConfig {
    /// Sets the post-exit drain grace period.
    pub fn with_drain_grace(mut self, millis: u64) -> Self {
        self.drain_grace_ms = millis;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunnerConfig::default();
        assert_eq!(config.drain_grace_ms, 500);
        assert_eq!(config.read_buffer_bytes, 8192);
    }

    #[test]
    fn test_config_builder() {
        let config = RunnerConfig::default().with_drain_grace(50);
        assert_eq!(config.drain_grace_ms, 50);
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: RunnerConfig = serde_json::from_str(r#"{"drain_grace_ms": 3}"#).unwrap();
        assert_eq!(config.drain_grace_ms, 3);
        assert_eq!(config.read_buffer_bytes, 8192);
    }
}
