//! Bounded pool of reusable browser pages.
//!
//! The pool caps how many pages exist at once. Callers [`acquire`] a page,
//! use it, and then either [`release`] it for reuse or [`destroy`] it.
//!
//! | State | Meaning |
//! |-------|---------|
//! | idle | Created, returned, waiting for reuse |
//! | in use | Held by a [`PooledPage`] guard |
//! | draining | No new acquisitions; waits for in-use pages |
//!
//! [`acquire`]: PagePool::acquire
//! [`release`]: PagePool::release
//! [`destroy`]: PagePool::destroy

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, error, info};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default maximum number of pages alive at once.
pub const DEFAULT_POOL_SIZE: usize = 10;

// ============================================================================
// PageFactory
// ============================================================================

/// Creates and destroys pages for a [`PagePool`].
#[async_trait]
pub trait PageFactory: Send + Sync + 'static {
    /// Page type handed out by the pool.
    type Page: Send + Sync + 'static;

    /// Creates a fresh page.
    async fn create(&self) -> Result<Self::Page>;

    /// Releases every resource held by `page`.
    async fn destroy(&self, page: Self::Page) -> Result<()>;

    /// Tears down the factory itself once the pool is empty.
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// PooledPage
// ============================================================================

/// A page checked out of a [`PagePool`].
///
/// Holds one pool slot until handed back with [`PagePool::release`] or
/// [`PagePool::destroy`]. Dropping the guard frees the slot but leaks the
/// page, so always hand it back.
pub struct PooledPage<P> {
    page: P,
    _permit: OwnedSemaphorePermit,
}

impl<P> Deref for PooledPage<P> {
    type Target = P;

    fn deref(&self) -> &P {
        &self.page
    }
}

impl<P: fmt::Debug> fmt::Debug for PooledPage<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PooledPage").field(&self.page).finish()
    }
}

// ============================================================================
// PagePool
// ============================================================================

/// Bounded, reusable collection of pages.
pub struct PagePool<F: PageFactory> {
    factory: F,
    max_size: usize,
    permits: Arc<Semaphore>,
    idle: Mutex<Vec<F::Page>>,
    draining: AtomicBool,
}

impl<F: PageFactory> fmt::Debug for PagePool<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagePool")
            .field("max_size", &self.max_size)
            .field("in_use", &self.in_use())
            .field("idle", &self.idle_count())
            .field("draining", &self.is_draining())
            .finish()
    }
}

impl<F: PageFactory> PagePool<F> {
    /// Creates a pool allowing at most `max_size` pages at once.
    ///
    /// A `max_size` of zero is raised to one.
    #[must_use]
    pub fn new(factory: F, max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            factory,
            max_size,
            permits: Arc::new(Semaphore::new(max_size)),
            idle: Mutex::new(Vec::new()),
            draining: AtomicBool::new(false),
        }
    }

    /// Returns the factory.
    #[inline]
    #[must_use]
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Returns the capacity.
    #[inline]
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Returns the number of pages currently checked out.
    #[inline]
    #[must_use]
    pub fn in_use(&self) -> usize {
        if self.permits.is_closed() {
            return 0;
        }
        self.max_size - self.permits.available_permits()
    }

    /// Returns the number of idle pages.
    #[inline]
    #[must_use]
    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }

    /// Returns `true` once [`drain`](Self::drain) has started.
    #[inline]
    #[must_use]
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    /// Checks out a page, waiting while the pool is at capacity.
    ///
    /// Reuses an idle page when one exists, otherwise creates one.
    ///
    /// # Errors
    ///
    /// - [`Error::PoolDraining`] if the pool is draining
    /// - Any error from [`PageFactory::create`]
    pub async fn acquire(&self) -> Result<PooledPage<F::Page>> {
        if self.is_draining() {
            return Err(Error::PoolDraining);
        }

        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| Error::PoolDraining)?;

        let reused = self.idle.lock().pop();
        let page = match reused {
            Some(page) => {
                debug!("Reusing idle page");
                page
            }
            None => {
                debug!(in_use = self.in_use(), "Creating page");
                self.factory.create().await?
            }
        };

        Ok(PooledPage {
            page,
            _permit: permit,
        })
    }

    /// Returns a page for reuse.
    pub fn release(&self, pooled: PooledPage<F::Page>) {
        let PooledPage { page, _permit } = pooled;
        self.idle.lock().push(page);
    }

    /// Destroys a checked-out page and frees its slot.
    ///
    /// Factory errors are logged, never returned.
    pub async fn destroy(&self, pooled: PooledPage<F::Page>) {
        let PooledPage { page, _permit } = pooled;
        if let Err(e) = self.factory.destroy(page).await {
            error!(error = %e, "Failed to destroy page");
        }
    }

    /// Stops new acquisitions and waits for every checked-out page.
    pub async fn drain(&self) {
        self.draining.store(true, Ordering::Release);
        info!(in_use = self.in_use(), "Draining page pool");

        let all = u32::try_from(self.max_size).unwrap_or(u32::MAX);
        if let Ok(permits) = self.permits.acquire_many(all).await {
            permits.forget();
        }
        self.permits.close();

        debug!("Page pool drained");
    }

    /// Destroys every idle page.
    pub async fn clear(&self) {
        let pages = std::mem::take(&mut *self.idle.lock());
        let count = pages.len();

        for page in pages {
            if let Err(e) = self.factory.destroy(page).await {
                error!(error = %e, "Failed to destroy idle page");
            }
        }

        debug!(count, "Idle pages cleared");
    }
}

// ============================================================================
// Tests
// ============================================================================
