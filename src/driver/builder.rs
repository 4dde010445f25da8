//! Builder pattern for driver configuration.
//!
//! Provides a fluent API for configuring and launching [`Driver`] instances.
//!
//! # Example
//!
//! ```no_run
//! use retro_harvest::Driver;
//!
//! # async fn example() -> retro_harvest::Result<()> {
//! let driver = Driver::builder()
//!     .binary("/usr/bin/chromium")
//!     .launch()
//!     .await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result};

use super::core::Driver;
use super::options::ChromeOptions;

// ============================================================================
// Constants
// ============================================================================

/// Default time allowed for the browser to expose its DevTools endpoint.
const DEFAULT_LAUNCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Binary names probed on `PATH` when no binary is configured.
const CANDIDATE_BINARIES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
];

// ============================================================================
// DriverBuilder
// ============================================================================

/// Builder for configuring a [`Driver`] instance.
///
/// Use [`Driver::builder()`] to create a new builder.
#[derive(Debug, Clone)]
pub struct DriverBuilder {
    /// Path to the Chromium binary.
    binary: Option<PathBuf>,
    /// Launch flags.
    options: ChromeOptions,
    /// Time allowed for the DevTools endpoint to appear.
    launch_timeout: Duration,
}

impl Default for DriverBuilder {
    fn default() -> Self {
        Self {
            binary: None,
            options: ChromeOptions::new(),
            launch_timeout: DEFAULT_LAUNCH_TIMEOUT,
        }
    }
}

// ============================================================================
// DriverBuilder Implementation
// ============================================================================

impl DriverBuilder {
    /// Creates a new driver builder with default configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the path to the Chromium binary executable.
    ///
    /// When unset, well-known binary names are looked up on `PATH`.
    #[inline]
    #[must_use]
    pub fn binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary = Some(path.into());
        self
    }

    /// Sets an optional binary path, leaving discovery on when `None`.
    #[inline]
    #[must_use]
    pub fn binary_opt(mut self, path: Option<PathBuf>) -> Self {
        self.binary = path;
        self
    }

    /// Sets the launch options.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: ChromeOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets how long to wait for the DevTools endpoint.
    #[inline]
    #[must_use]
    pub fn launch_timeout(mut self, timeout: Duration) -> Self {
        self.launch_timeout = timeout;
        self
    }

    /// Validates the configuration and launches the browser.
    ///
    /// # Errors
    ///
    /// - [`Error::BrowserNotFound`] if the binary is missing or undiscoverable
    /// - [`Error::Config`] if the options are invalid
    /// - [`Error::ProcessLaunchFailed`] if the process cannot be spawned
    /// - [`Error::ConnectionTimeout`] if the DevTools endpoint never appears
    pub async fn launch(self) -> Result<Driver> {
        let binary = self.validate_binary()?;
        self.options.validate().map_err(Error::config)?;

        Driver::launch(binary, self.options, self.launch_timeout).await
    }
}

// ============================================================================
// Validation
// ============================================================================

impl DriverBuilder {
    /// Resolves the binary path, discovering one if none was configured.
    fn validate_binary(&self) -> Result<PathBuf> {
        if let Some(binary) = &self.binary {
            if !binary.exists() {
                return Err(Error::browser_not_found(binary));
            }
            return Ok(binary.clone());
        }

        discover_binary().ok_or_else(|| Error::browser_not_found(CANDIDATE_BINARIES.join("|")))
    }
}

/// Finds the first candidate Chromium binary on `PATH`.
fn discover_binary() -> Option<PathBuf> {
    CANDIDATE_BINARIES.iter().find_map(|name| {
        let found = which::which(name).ok()?;
        debug!(path = %found.display(), "Discovered browser binary");
        Some(found)
    })
}

// ============================================================================
// Tests
// ============================================================================
