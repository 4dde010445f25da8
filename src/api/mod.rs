//! HTTP API.
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /healthz` | Liveness probe |
//! | `GET /v1/get-easy-retro-data?url=` | Fetch a board, return it as JSON |
//! | `GET /v1/download-easy-retro-board?format=` | Stream the stored board as a file |

// ============================================================================
// Submodules
// ============================================================================

/// HTTP error mapping.
pub mod error;

/// Route handlers.
pub mod handlers;

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::browser::{FrameSource, PageFactory};
use crate::error::Result;
use crate::harvester::Harvester;

pub use error::ApiError;

// ============================================================================
// ApiConfig
// ============================================================================

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3000;

/// Server bind settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ApiConfig {
    /// Returns `host:port`.
    #[inline]
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ============================================================================
// Router
// ============================================================================

/// Creates the API router.
pub fn router<F>(harvester: Arc<Harvester<F>>) -> Router
where
    F: PageFactory,
    F::Page: FrameSource,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(handlers::health))
        .route("/v1/get-easy-retro-data", get(handlers::get_board::<F>))
        .route(
            "/v1/download-easy-retro-board",
            get(handlers::download_board::<F>),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(harvester)
}

/// Serves the API until `shutdown` resolves.
///
/// # Errors
///
/// Returns [`Error::Io`](crate::Error::Io) if binding or serving fails.
pub async fn serve<F, S>(config: &ApiConfig, harvester: Arc<Harvester<F>>, shutdown: S) -> Result<()>
where
    F: PageFactory,
    F::Page: FrameSource,
    S: Future<Output = ()> + Send + 'static,
{
    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "API is live");

    axum::serve(listener, router(harvester))
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::harvester::tests::{URL, frames, harvester};

    use super::handlers::{FORMAT_MESSAGE, NO_BOARD_MESSAGE};

    async fn get(app: Router, uri: &str) -> (StatusCode, header::HeaderMap, String) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, headers, String::from_utf8_lossy(&bytes).into_owned())
    }

    fn error_of(body: &str) -> String {
        let value: Value = serde_json::from_str(body).expect("json");
        value["error"].as_str().unwrap_or_default().to_string()
    }

    #[test]
    fn test_bind_address() {
        let config = ApiConfig {
            host: "0.0.0.0".into(),
            port: 8080,
        };
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(ApiConfig::default().port, DEFAULT_PORT);
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(Arc::new(harvester(Vec::new())));
        let (status, _, body) = get(app, "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_fetch_returns_board_json() {
        let app = router(Arc::new(harvester(vec![frames("Sprint Retro")])));
        let uri = format!(
            "/v1/get-easy-retro-data?url={}",
            urlencoding::encode(URL)
        );

        let (status, _, body) = get(app, &uri).await;
        assert_eq!(status, StatusCode::OK);

        let board: Value = serde_json::from_str(&body).expect("json");
        assert_eq!(board["boardName"], "Sprint Retro");
        assert_eq!(board["columns"][0]["value"], "Went Well");
        assert_eq!(board["messages"][0]["messageId"], "m1");
    }

    #[tokio::test]
    async fn test_fetch_rejects_invalid_url() {
        let app = router(Arc::new(harvester(Vec::new())));
        let (status, _, body) = get(app, "/v1/get-easy-retro-data?url=nope").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error_of(&body).starts_with("Invalid url provided"));
    }

    #[tokio::test]
    async fn test_fetch_timeout_is_gateway_timeout() {
        let app = router(Arc::new(harvester(vec![Vec::new()])));
        let uri = format!(
            "/v1/get-easy-retro-data?url={}",
            urlencoding::encode(URL)
        );

        let (status, _, _) = get(app, &uri).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn test_download_requires_board_then_format() {
        let shared = Arc::new(harvester(vec![frames("Sprint Retro")]));

        let (status, _, body) = get(
            router(Arc::clone(&shared)),
            "/v1/download-easy-retro-board?format=csv",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&body), NO_BOARD_MESSAGE);

        shared.fetch_board(URL).await.expect("board");

        for uri in [
            "/v1/download-easy-retro-board",
            "/v1/download-easy-retro-board?format=xml",
        ] {
            let (status, _, body) = get(router(Arc::clone(&shared)), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(error_of(&body), FORMAT_MESSAGE);
        }
    }

    #[tokio::test]
    async fn test_download_streams_attachment() {
        let shared = Arc::new(harvester(vec![frames("Sprint Retro")]));
        shared.fetch_board(URL).await.expect("board");

        let (status, headers, body) = get(
            router(Arc::clone(&shared)),
            "/v1/download-easy-retro-board?format=csv",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "text/csv");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=sprint_retro.csv"
        );
        assert_eq!(body, "Went Well\nGreat demo\n");
    }
}
