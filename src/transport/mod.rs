//! DevTools WebSocket transport layer.
//!
//! This module handles communication between the local end (Rust) and the
//! browser's DevTools endpoint via WebSocket.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Browser (Rust) │                              │  Chromium       │
//! │                 │         WebSocket            │                 │
//! │  Connection     │◄────────────────────────────►│  DevTools       │
//! │  (event loop)   │   ws://127.0.0.1:PORT/...    │  endpoint       │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! One connection is shared by every page. Page sessions are multiplexed
//! over it using flattened `sessionId` routing.

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub mod connection;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, EventHandler};
