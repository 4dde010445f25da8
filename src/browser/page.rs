//! DevTools-controlled browser page.
//!
//! A [`Page`] is one Chromium target with a flattened session attached.
//! It can navigate and report the WebSocket frames the page receives.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::identifiers::{SessionId, TargetId};
use crate::protocol::{
    Command, Event, NetworkCommand, PageCommand, ParsedEvent, Request, Response, TargetCommand,
};
use crate::transport::Connection;

// ============================================================================
// Constants
// ============================================================================

/// WebSocket opcode of a text frame.
const TEXT_OPCODE: u64 = 1;

// ============================================================================
// FrameSource
// ============================================================================

/// Callback receiving the text payload of each observed WebSocket frame.
pub type FrameHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// Anything that can navigate to a URL and report WebSocket text frames.
///
/// [`Page`] is the production implementation. Capture logic depends only on
/// this trait.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Starts delivering frame payloads to `handler`.
    ///
    /// Must be called before [`navigate`](Self::navigate) so no frame is
    /// missed.
    async fn listen(&self, handler: FrameHandler) -> Result<()>;

    /// Navigates to `url`.
    async fn navigate(&self, url: &str) -> Result<()>;
}

// ============================================================================
// Page
// ============================================================================

/// Internal shared state for a page.
struct PageInner {
    /// Shared browser connection.
    connection: Connection,
    /// Target being controlled.
    target_id: TargetId,
    /// Flattened session for the target.
    session_id: SessionId,
}

/// A handle to a Chromium page target.
#[derive(Clone)]
pub struct Page {
    inner: Arc<PageInner>,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("target_id", &self.inner.target_id)
            .field("session_id", &self.inner.session_id)
            .finish()
    }
}

impl Page {
    /// Creates a page handle for an attached target.
    pub(crate) fn new(connection: Connection, target_id: TargetId, session_id: SessionId) -> Self {
        Self {
            inner: Arc::new(PageInner {
                connection,
                target_id,
                session_id,
            }),
        }
    }

    /// Returns the target ID.
    #[inline]
    #[must_use]
    pub fn target_id(&self) -> &TargetId {
        &self.inner.target_id
    }

    /// Returns the session ID.
    #[inline]
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.inner.session_id
    }
}

// ============================================================================
// Page - Navigation
// ============================================================================

impl Page {
    /// Navigates to a URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Navigation`] if the browser reports `errorText`.
    pub async fn navigate(&self, url: &str) -> Result<()> {
        debug!(url = %url, target_id = %self.inner.target_id, "Navigating");

        let command = Command::Page(PageCommand::Navigate {
            url: url.to_string(),
        });

        let response = self.send_command(command).await?;
        let error_text = response.get_string("errorText");
        if !error_text.is_empty() {
            return Err(Error::navigation(url, error_text));
        }

        response.into_result()?;
        Ok(())
    }

    /// Closes the page target.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser rejects the close.
    pub async fn close(&self) -> Result<()> {
        self.clear_listeners();

        let command = Command::Target(TargetCommand::CloseTarget {
            target_id: self.inner.target_id.clone(),
        });

        self.inner
            .connection
            .send(Request::new(command))
            .await?
            .into_result()?;

        debug!(target_id = %self.inner.target_id, "Page closed");
        Ok(())
    }
}

// ============================================================================
// Page - Network
// ============================================================================

impl Page {
    /// Enables network events for this page.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn enable_network(&self) -> Result<()> {
        self.send_command(Command::Network(NetworkCommand::Enable))
            .await?
            .into_result()?;
        Ok(())
    }

    /// Registers a callback for every text WebSocket frame the page receives.
    ///
    /// Replaces any callback registered earlier. Binary frames are skipped.
    pub fn on_websocket_frame(&self, handler: FrameHandler) {
        let target_id = self.inner.target_id.clone();

        self.inner.connection.set_event_handler(
            self.inner.session_id.clone(),
            Box::new(move |event: Event| {
                if let ParsedEvent::WebSocketFrameReceived {
                    opcode, payload, ..
                } = event.parse()
                {
                    if opcode != TEXT_OPCODE {
                        trace!(target_id = %target_id, opcode, "Skipping non-text frame");
                        return;
                    }
                    handler(&payload);
                }
            }),
        );
    }

    /// Removes the frame callback.
    pub fn clear_listeners(&self) {
        self.inner
            .connection
            .clear_event_handler(&self.inner.session_id);
    }

    /// Sends a command routed to this page's session.
    async fn send_command(&self, command: Command) -> Result<Response> {
        let request = Request::for_session(self.inner.session_id.clone(), command);
        self.inner.connection.send(request).await
    }
}

// ============================================================================
// FrameSource Implementation
// ============================================================================

#[async_trait]
impl FrameSource for Page {
    async fn listen(&self, handler: FrameHandler) -> Result<()> {
        self.on_websocket_frame(handler);
        self.enable_network().await
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        Page::navigate(self, url).await
    }
}

// ============================================================================
// Tests
// ============================================================================
