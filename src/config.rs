//! Harvester configuration.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use retro_harvest::{CompletionPolicy, HarvestConfig};
//!
//! let config = HarvestConfig::default()
//!     .with_pool_size(4)
//!     .with_capture_timeout(Duration::from_secs(15))
//!     .with_policy(CompletionPolicy::AllFamilies);
//! ```

use std::time::Duration;

use crate::board::{CaptureOptions, CompletionPolicy, FrameSchema};
use crate::browser::DEFAULT_POOL_SIZE;
use crate::error::{Error, Result};

/// Settings for a [`Harvester`](crate::Harvester).
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Maximum pages alive at once.
    pub pool_size: usize,
    /// Capture deadline, completion policy and frame schema.
    pub capture: CaptureOptions,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            capture: CaptureOptions::default(),
        }
    }
}

impl HarvestConfig {
    /// Sets the page pool capacity.
    #[inline]
    #[must_use]
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Sets the capture deadline.
    #[inline]
    #[must_use]
    pub fn with_capture_timeout(mut self, timeout: Duration) -> Self {
        self.capture.timeout = timeout;
        self
    }

    /// Sets the completion policy.
    #[inline]
    #[must_use]
    pub fn with_policy(mut self, policy: CompletionPolicy) -> Self {
        self.capture.policy = policy;
        self
    }

    /// Sets the frame schema.
    #[inline]
    #[must_use]
    pub fn with_schema(mut self, schema: FrameSchema) -> Self {
        self.capture.schema = schema;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a zero pool size or capture deadline.
    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(Error::config("Pool size must be greater than zero"));
        }
        if self.capture.timeout.is_zero() {
            return Err(Error::config("Capture timeout must be greater than zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HarvestConfig::default();
        assert_eq!(config.pool_size, 10);
        assert_eq!(config.capture.timeout, Duration::from_secs(10));
        assert_eq!(config.capture.policy, CompletionPolicy::FrameCount);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        assert!(HarvestConfig::default().with_pool_size(0).validate().is_err());
        assert!(
            HarvestConfig::default()
                .with_capture_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
    }
}
