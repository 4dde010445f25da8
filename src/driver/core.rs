//! Chromium process coordinator and page factory.
//!
//! The [`Driver`] owns one headless Chromium process, its temporary profile
//! directory, and the single DevTools connection every [`Page`] is
//! multiplexed over.
//!
//! # Launch Sequence
//!
//! 1. Create a temporary profile directory
//! 2. Spawn Chromium with `--remote-debugging-port=0`
//! 3. Read `DevTools listening on ws://...` from stderr
//! 4. Connect to that endpoint
//!
//! # Example
//!
//! ```no_run
//! use retro_harvest::Driver;
//!
//! # async fn example() -> retro_harvest::Result<()> {
//! let driver = Driver::builder().launch().await?;
//! let page = driver.new_page().await?;
//! page.navigate("https://easyretro.io").await?;
//! driver.close().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStderr, Command};
use tokio::time::timeout;
use tracing::{debug, info, trace};

use crate::browser::{Page, PageFactory};
use crate::error::{Error, Result};
use crate::identifiers::{SessionId, TargetId};
use crate::protocol::{BrowserCommand, Command as CdpCommand, Request, TargetCommand};
use crate::transport::Connection;

use super::builder::DriverBuilder;
use super::options::ChromeOptions;

// ============================================================================
// Constants
// ============================================================================

/// Marker Chromium prints once the DevTools endpoint is ready.
const DEVTOOLS_MARKER: &str = "DevTools listening on ";

/// Time allowed for `Browser.close` before the process is killed.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// ProcessGuard
// ============================================================================

/// Guards a child process and ensures it is killed when dropped.
struct ProcessGuard {
    /// The child process handle.
    child: Option<Child>,
    /// Process ID for logging.
    pid: u32,
}

impl ProcessGuard {
    /// Creates a new process guard.
    fn new(child: Child) -> Self {
        let pid = child.id().unwrap_or(0);
        debug!(pid, "Process guard created");
        Self {
            child: Some(child),
            pid,
        }
    }

    /// Kills the process and waits for it to exit.
    async fn kill(&mut self) {
        if let Some(mut child) = self.child.take() {
            debug!(pid = self.pid, "Killing browser process");
            if let Err(e) = child.kill().await {
                debug!(pid = self.pid, error = %e, "Failed to kill process");
            }
            info!(pid = self.pid, "Process terminated");
        }
    }
}

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take()
            && let Err(e) = child.start_kill()
        {
            debug!(pid = self.pid, error = %e, "Failed to send kill signal in Drop");
        }
    }
}

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for the driver.
pub(crate) struct DriverInner {
    /// Path to the Chromium binary.
    binary: PathBuf,
    /// DevTools endpoint.
    ws_url: String,
    /// Browser-level DevTools connection.
    connection: Connection,
    /// Process handle, taken on close.
    process: Mutex<Option<ProcessGuard>>,
    /// Targets created and not yet destroyed.
    pages: Mutex<FxHashSet<TargetId>>,
    /// Profile directory, removed on drop after the process.
    _profile: TempDir,
}

// ============================================================================
// Driver
// ============================================================================

/// Headless Chromium coordinator.
///
/// The driver is responsible for:
/// - Spawning Chromium with a throwaway profile
/// - Owning the DevTools connection
/// - Creating and closing page targets
#[derive(Clone)]
pub struct Driver {
    /// Shared inner state.
    pub(crate) inner: Arc<DriverInner>,
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("binary", &self.inner.binary)
            .field("ws_url", &self.inner.ws_url)
            .field("page_count", &self.page_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Driver - Public API
// ============================================================================

impl Driver {
    /// Creates a configuration builder for the driver.
    #[inline]
    #[must_use]
    pub fn builder() -> DriverBuilder {
        DriverBuilder::new()
    }

    /// Returns the DevTools WebSocket URL.
    #[inline]
    #[must_use]
    pub fn ws_url(&self) -> &str {
        &self.inner.ws_url
    }

    /// Returns the number of open pages.
    #[inline]
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.inner.pages.lock().len()
    }

    /// Opens a blank page and attaches a flattened session to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot be created or attached.
    pub async fn new_page(&self) -> Result<Page> {
        let connection = &self.inner.connection;

        let created = connection
            .send(Request::new(CdpCommand::Target(TargetCommand::CreateTarget {
                url: "about:blank".to_string(),
            })))
            .await?;
        let target_id = TargetId::new(created.get_string("targetId"));
        created.into_result()?;

        let attached = connection
            .send(Request::new(CdpCommand::Target(TargetCommand::AttachToTarget {
                target_id: target_id.clone(),
                flatten: true,
            })))
            .await?;
        let session_id = SessionId::new(attached.get_string("sessionId"));
        attached.into_result()?;

        if target_id.as_str().is_empty() || session_id.as_str().is_empty() {
            return Err(Error::protocol("Target created without id or session"));
        }

        self.inner.pages.lock().insert(target_id.clone());
        debug!(target_id = %target_id, session_id = %session_id, "Page opened");

        Ok(Page::new(connection.clone(), target_id, session_id))
    }

    /// Closes the browser and releases its process and profile.
    ///
    /// Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Currently infallible; errors from the browser are logged.
    pub async fn close(&self) -> Result<()> {
        let Some(mut process) = self.inner.process.lock().take() else {
            return Ok(());
        };

        let pages = std::mem::take(&mut *self.inner.pages.lock());
        info!(page_count = pages.len(), "Closing browser");

        let request = Request::new(CdpCommand::Browser(BrowserCommand::Close));
        if let Err(e) = self
            .inner
            .connection
            .send_with_timeout(request, CLOSE_TIMEOUT)
            .await
        {
            debug!(error = %e, "Browser.close failed, killing process");
        }

        self.inner.connection.shutdown();
        process.kill().await;

        Ok(())
    }
}

// ============================================================================
// Driver - Internal API
// ============================================================================

impl Driver {
    /// Spawns Chromium and connects to its DevTools endpoint.
    pub(crate) async fn launch(
        binary: PathBuf,
        options: ChromeOptions,
        launch_timeout: Duration,
    ) -> Result<Self> {
        let profile = tempfile::Builder::new()
            .prefix("retro-harvest-")
            .tempdir()?;
        debug!(path = %profile.path().display(), "Created temporary profile");

        let mut cmd = Command::new(&binary);
        cmd.arg("--remote-debugging-port=0")
            .arg(format!("--user-data-dir={}", profile.path().display()))
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .args(options.to_args())
            .arg("about:blank");

        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| Error::process_launch_failed(e.to_string()))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::process_launch_failed("stderr was not captured"))?;

        let mut process = ProcessGuard::new(child);
        info!(pid = process.pid, binary = %binary.display(), "Browser process spawned");

        let mut lines = BufReader::new(stderr).lines();
        let ws_url = match timeout(launch_timeout, read_devtools_url(&mut lines)).await {
            Ok(Ok(url)) => url,
            Ok(Err(e)) => {
                process.kill().await;
                return Err(e);
            }
            Err(_) => {
                process.kill().await;
                return Err(Error::connection_timeout(launch_timeout.as_millis() as u64));
            }
        };

        tokio::spawn(drain_stderr(lines));

        let connection = Connection::connect(&ws_url).await?;
        info!(url = %ws_url, "Browser ready");

        Ok(Self {
            inner: Arc::new(DriverInner {
                binary,
                ws_url,
                connection,
                process: Mutex::new(Some(process)),
                pages: Mutex::new(FxHashSet::default()),
                _profile: profile,
            }),
        })
    }
}

// ============================================================================
// PageFactory Implementation
// ============================================================================

#[async_trait]
impl PageFactory for Driver {
    type Page = Page;

    async fn create(&self) -> Result<Page> {
        self.new_page().await
    }

    async fn destroy(&self, page: Page) -> Result<()> {
        self.inner.pages.lock().remove(page.target_id());
        page.close().await
    }

    async fn shutdown(&self) -> Result<()> {
        self.close().await
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Reads stderr until the DevTools endpoint is announced.
async fn read_devtools_url(lines: &mut Lines<BufReader<ChildStderr>>) -> Result<String> {
    while let Some(line) = lines.next_line().await? {
        if let Some(url) = parse_devtools_line(&line) {
            return Ok(url.to_string());
        }
        trace!(line = %line, "Browser stderr");
    }

    Err(Error::process_launch_failed(
        "Browser exited before exposing a DevTools endpoint",
    ))
}

/// Keeps stderr flowing so the browser never blocks on a full pipe.
async fn drain_stderr(mut lines: Lines<BufReader<ChildStderr>>) {
    while let Ok(Some(line)) = lines.next_line().await {
        trace!(line = %line, "Browser stderr");
    }
}

/// Extracts the WebSocket URL from a `DevTools listening on` line.
fn parse_devtools_line(line: &str) -> Option<&str> {
    let (_, rest) = line.split_once(DEVTOOLS_MARKER)?;
    let url = rest.trim();
    url.starts_with("ws://").then_some(url)
}

// ============================================================================
// Tests
// ============================================================================
