//! Chrome DevTools Protocol message types.
//!
//! This module defines the JSON messages exchanged with the browser over
//! the DevTools WebSocket.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Request` | Local → Browser | Command request |
//! | `Response` | Browser → Local | Command response |
//! | `Event` | Browser → Local | Domain notification |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Command definitions by domain |
//! | `event` | Event types |
//! | `request` | Request and Response types |

// ============================================================================
// Submodules
// ============================================================================

/// Command definitions organized by domain.
pub mod command;

/// Event message types.
pub mod event;

/// Request and Response message types.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{BrowserCommand, Command, NetworkCommand, PageCommand, TargetCommand};
pub use event::{Event, ParsedEvent};
pub use request::{ProtocolError, Request, Response};
