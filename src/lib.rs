//! Retro Harvest - EasyRetro public board capture and export.
//!
//! Opens a public board in a headless Chromium, listens to the board's
//! realtime WebSocket traffic through the DevTools protocol, rebuilds the
//! board from the captured frames and exports it as CSV or as a plain
//! outline.
//!
//! # Architecture
//!
//! - One Chromium process per [`Driver`], driven over a single DevTools
//!   WebSocket with flattened page sessions
//! - Pages come from a bounded [`PagePool`] and are destroyed after each
//!   capture
//! - A [`Harvester`] owns the pool, the latest board and the settings
//! - Exports are streamed record by record, honouring sink back-pressure
//!
//! # Quick Start
//!
//! ```no_run
//! use retro_harvest::{Driver, ExportFormat, HarvestConfig, Harvester, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let harvester = Harvester::launch(Driver::builder(), HarvestConfig::default()).await?;
//!
//!     harvester
//!         .fetch_board("https://easyretro.io/publicboard/abc/3f1c2a9e-0b7d-4c1e-9a2b-5d6e7f8a9b0c")
//!         .await?;
//!     let export = harvester.export(ExportFormat::Csv)?;
//!     print!("{}", export.to_text());
//!
//!     harvester.shutdown().await
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | HTTP routes over a shared [`Harvester`] |
//! | [`board`] | URL validation, frame capture, assembly, storage |
//! | [`browser`] | DevTools pages and the page pool |
//! | [`cli`] | Command-line interface |
//! | [`config`] | Harvester settings |
//! | [`driver`] | Chromium launch and page creation |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`export`] | CSV and outline rendering, record writer |
//! | [`harvester`] | Fetch and export context |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | DevTools message types (internal) |
//! | [`transport`] | DevTools WebSocket connection (internal) |

// ============================================================================
// Modules
// ============================================================================

/// HTTP API.
pub mod api;

/// Board acquisition and reconstruction.
pub mod board;

/// DevTools pages and the page pool.
pub mod browser;

/// Command-line interface.
pub mod cli;

/// Harvester settings.
pub mod config;

/// Chromium launch and configuration.
///
/// Use [`Driver::builder()`] to start a browser.
pub mod driver;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Board export formats and the record writer.
pub mod export;

/// Fetch and export context.
pub mod harvester;

/// Type-safe identifiers for DevTools entities.
pub mod identifiers;

/// DevTools protocol message types.
pub mod protocol;

/// DevTools WebSocket transport.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Board types
pub use board::{
    BoardColumn, BoardInformation, BoardStore, BoardUrl, CaptureOptions, CompletionPolicy, Family,
    FrameSchema, Message,
};

// Browser types
pub use browser::{FrameSource, Page, PageFactory, PagePool};

// Configuration
pub use config::HarvestConfig;

// Driver types
pub use driver::{ChromeOptions, Driver, DriverBuilder};

// Error types
pub use error::{Error, Result};

// Export types
pub use export::{BoardExport, ExportFormat, RecordSink, WriterSink, write_records};

// Harvester
pub use harvester::Harvester;

// Identifier types
pub use identifiers::{RequestId, SessionId, TargetId};
