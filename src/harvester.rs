//! Board harvesting context.
//!
//! A [`Harvester`] owns the page pool, the board store and the settings.
//! Create one per process and share it by reference.
//!
//! # Fetch Sequence
//!
//! 1. Validate the URL (no page is touched on failure)
//! 2. Acquire a page
//! 3. Capture frames under the deadline
//! 4. Destroy the page, whatever the outcome
//! 5. Assemble and store the board

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::board::{BoardInformation, BoardStore, BoardUrl, assemble, capture_frames};
use crate::browser::{FrameSource, PageFactory, PagePool};
use crate::config::HarvestConfig;
use crate::driver::{Driver, DriverBuilder};
use crate::error::{Error, Result};
use crate::export::{BoardExport, ExportFormat};

// ============================================================================
// Harvester
// ============================================================================

/// Fetches boards through a page pool and keeps the latest one.
pub struct Harvester<F: PageFactory = Driver> {
    pool: PagePool<F>,
    store: BoardStore,
    config: HarvestConfig,
}

impl<F: PageFactory> fmt::Debug for Harvester<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Harvester")
            .field("pool", &self.pool)
            .field("has_board", &!self.store.is_empty())
            .finish_non_exhaustive()
    }
}

impl Harvester<Driver> {
    /// Launches a browser and builds a harvester on top of it.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the browser
    /// cannot be started.
    pub async fn launch(builder: DriverBuilder, config: HarvestConfig) -> Result<Self> {
        config.validate()?;
        let driver = builder.launch().await?;
        Self::new(driver, config)
    }
}

impl<F> Harvester<F>
where
    F: PageFactory,
    F::Page: FrameSource,
{
    /// Creates a harvester over an existing page factory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid.
    pub fn new(factory: F, config: HarvestConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            pool: PagePool::new(factory, config.pool_size),
            store: BoardStore::new(),
            config,
        })
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Returns the page pool.
    #[inline]
    #[must_use]
    pub fn pool(&self) -> &PagePool<F> {
        &self.pool
    }

    /// Returns the latest board, if any.
    #[inline]
    #[must_use]
    pub fn current_board(&self) -> Option<Arc<BoardInformation>> {
        self.store.current()
    }

    /// Fetches, assembles and stores the board at `url`.
    ///
    /// On failure the previously stored board is kept.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] before any page is acquired
    /// - [`Error::CaptureTimeout`] if the board frames never arrive
    /// - [`Error::PoolDraining`] during shutdown
    pub async fn fetch_board(&self, url: &str) -> Result<Arc<BoardInformation>> {
        let url = BoardUrl::parse(url)?;
        info!(board_id = %url.board_id(), "Fetching board");

        let page = self.pool.acquire().await?;
        let captured = capture_frames(&*page, url.as_str(), &self.config.capture).await;
        self.pool.destroy(page).await;

        let payloads = captured?;
        let board = assemble(&payloads, &self.config.capture.schema);

        if board.is_degraded() {
            warn!(
                board_id = %url.board_id(),
                frames = payloads.len(),
                "Board assembled with missing data"
            );
        }

        Ok(self.store.save(board))
    }

    /// Renders the stored board.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoBoard`] if nothing has been fetched yet.
    pub fn export(&self, format: ExportFormat) -> Result<BoardExport> {
        let board = self.store.current().ok_or(Error::NoBoard)?;
        Ok(BoardExport::render(&board, format))
    }

    /// Drains the pool, destroys idle pages and shuts the factory down.
    ///
    /// # Errors
    ///
    /// Returns the factory's shutdown error.
    pub async fn shutdown(&self) -> Result<()> {
        self.pool.drain().await;
        self.pool.clear().await;
        self.pool.factory().shutdown().await?;
        info!("Harvester shut down");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
