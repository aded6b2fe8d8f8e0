//! Engine configuration.

use std::time::Duration;

/// Tunables for the sync engine.
///
/// Defaults are tuned for an interactive chat screen: a short poll interval
/// and enough event capacity that a briefly busy UI thread does not lag out
/// of the broadcast channel.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// How often the open conversation is refreshed.
    pub poll_interval: Duration,
    /// Capacity of the engine's event broadcast channel.
    pub event_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
            event_capacity: 256,
        }
    }
}

impl SyncConfig {
    /// Start from the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the event channel capacity.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(3));
        assert_eq!(config.event_capacity, 256);
    }

    #[test]
    fn test_builder_overrides() {
        let config = SyncConfig::new()
            .with_poll_interval(Duration::from_secs(10))
            .with_event_capacity(32);
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.event_capacity, 32);
    }
}
