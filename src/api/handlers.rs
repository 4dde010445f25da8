//! Route handlers.

// ============================================================================
// Imports
// ============================================================================

use std::convert::Infallible;
use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use futures_util::stream;
use serde::Deserialize;
use tracing::{debug, info};

use crate::board::BoardInformation;
use crate::browser::{FrameSource, PageFactory};
use crate::export::{BoardExport, ExportFormat, record_channel, write_records};
use crate::harvester::Harvester;

use super::error::ApiError;

// ============================================================================
// Messages
// ============================================================================

/// Body of a download attempted before any fetch.
pub const NO_BOARD_MESSAGE: &str = "You must first perform a find easy retro board action";

/// Body of a download with a missing or unknown format.
pub const FORMAT_MESSAGE: &str = "The format query param must be defined as either csv|legacy";

// ============================================================================
// Queries
// ============================================================================

/// Query of the board fetch route.
#[derive(Debug, Deserialize)]
pub struct BoardQuery {
    /// Public board link.
    pub url: Option<String>,
}

/// Query of the download route.
#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    /// `csv` or `legacy`.
    pub format: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET /healthz`
pub async fn health() -> &'static str {
    "ok"
}

/// `GET /v1/get-easy-retro-data?url=`
///
/// The fetch runs on its own task so a client hanging up cannot abandon a
/// page mid-capture.
pub async fn get_board<F>(
    State(harvester): State<Arc<Harvester<F>>>,
    Query(query): Query<BoardQuery>,
) -> Result<Json<BoardInformation>, ApiError>
where
    F: PageFactory,
    F::Page: FrameSource,
{
    let url = query.url.unwrap_or_default();
    let fetch = tokio::spawn(async move { harvester.fetch_board(&url).await });

    let board = fetch
        .await
        .map_err(|e| ApiError::Internal(format!("Fetch task failed: {e}")))??;

    Ok(Json(BoardInformation::clone(&board)))
}

/// `GET /v1/download-easy-retro-board?format=`
///
/// Streams the export as an attachment, one record per body chunk.
pub async fn download_board<F>(
    State(harvester): State<Arc<Harvester<F>>>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError>
where
    F: PageFactory,
    F::Page: FrameSource,
{
    if harvester.current_board().is_none() {
        return Err(ApiError::BadRequest(NO_BOARD_MESSAGE.to_string()));
    }

    let format: ExportFormat = query
        .format
        .as_deref()
        .and_then(|f| f.parse().ok())
        .ok_or_else(|| ApiError::BadRequest(FORMAT_MESSAGE.to_string()))?;

    let export = harvester.export(format)?;
    let disposition = content_disposition(&export)?;
    info!(file = %export.file_name(), lines = export.lines.len(), "Streaming export");

    let (mut sink, rx) = record_channel();
    let lines = export.lines;
    tokio::spawn(async move {
        if let Err(e) = write_records(lines, &mut sink).await {
            debug!(error = %e, "Export stream ended early");
        }
    });

    let body = Body::from_stream(stream::unfold(rx, |mut rx| async move {
        let line = rx.recv().await?;
        Some((Ok::<_, Infallible>(line), rx))
    }));

    let headers = [
        (CONTENT_TYPE, HeaderValue::from_static(format.content_type())),
        (CONTENT_DISPOSITION, disposition),
    ];
    Ok((headers, body).into_response())
}

// ============================================================================
// Helpers
// ============================================================================

/// Builds `attachment; filename=...`, adding `filename*` for non-ASCII names.
fn content_disposition(export: &BoardExport) -> Result<HeaderValue, ApiError> {
    let file_name = export.file_name();

    let value = if file_name.is_ascii() {
        format!("attachment; filename={file_name}")
    } else {
        format!(
            "attachment; filename=board.{}; filename*=UTF-8''{}",
            export.format.extension(),
            urlencoding::encode(&file_name)
        )
    };

    HeaderValue::from_str(&value).map_err(|e| ApiError::Internal(e.to_string()))
}
