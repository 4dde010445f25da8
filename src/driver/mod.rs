//! Browser process driver.
//!
//! This module launches Chromium and hands out DevTools-controlled pages.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Driver`] | Owns the browser process and creates pages |
//! | [`DriverBuilder`] | Fluent configuration builder |
//! | [`ChromeOptions`] | Browser launch flags |

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for driver configuration.
pub mod builder;

/// Core driver implementation.
pub mod core;

/// Chromium launch options.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::DriverBuilder;
pub use core::Driver;
pub use options::ChromeOptions;
