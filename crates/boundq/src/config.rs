use crate::QueueError;

/// Configuration for a [`BoundedQueue`](crate::BoundedQueue).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of buffered items (must be at least 1)
    pub capacity: usize,
    /// Enable metrics collection (counted under the queue lock)
    pub enable_metrics: bool,
}

impl Config {
    /// Creates a new configuration with custom settings.
    pub const fn new(capacity: usize, enable_metrics: bool) -> Self {
        Self {
            capacity,
            enable_metrics,
        }
    }

    /// Creates a configuration with the given capacity and metrics disabled.
    pub const fn with_capacity(capacity: usize) -> Self {
        Self::new(capacity, false)
    }

    /// Sets whether metrics are collected.
    pub const fn with_metrics(mut self, enable_metrics: bool) -> Self {
        self.enable_metrics = enable_metrics;
        self
    }

    /// Checks that the configuration describes a usable queue.
    pub const fn validate(&self) -> Result<(), QueueError> {
        if self.capacity == 0 {
            return Err(QueueError::InvalidCapacity);
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1024,
            enable_metrics: false,
        }
    }
}

/// Small queue for tight hand-off between a few threads (64 slots)
pub const SMALL_CONFIG: Config = Config::new(64, false);

/// Large queue for absorbing producer bursts (64K slots)
pub const LARGE_CONFIG: Config = Config::new(1 << 16, false);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert_eq!(config.capacity, 1024);
        assert!(!config.enable_metrics);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(
            Config::with_capacity(0).validate(),
            Err(QueueError::InvalidCapacity)
        );
    }

    #[test]
    fn test_presets() {
        assert_eq!(SMALL_CONFIG.capacity, 64);
        assert_eq!(LARGE_CONFIG.capacity, 65_536);
        assert!(LARGE_CONFIG.with_metrics(true).enable_metrics);
    }
}
