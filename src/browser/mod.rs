//! Browser page module.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Page`] | One DevTools-controlled page |
//! | [`PagePool`] | Bounded set of reusable pages |
//! | [`FrameSource`] | Navigation plus WebSocket frame observation |
//! | [`PageFactory`] | Page creation and teardown for the pool |

// ============================================================================
// Submodules
// ============================================================================

/// DevTools page handle.
pub mod page;

/// Bounded page pool.
pub mod pool;

// ============================================================================
// Re-exports
// ============================================================================

pub use page::{FrameHandler, FrameSource, Page};
pub use pool::{DEFAULT_POOL_SIZE, PageFactory, PagePool, PooledPage};
