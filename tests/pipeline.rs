//! End-to-end fetch and export over a replayed frame stream.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use retro_harvest::browser::FrameHandler;
use retro_harvest::{
    CompletionPolicy, ExportFormat, FrameSource, HarvestConfig, Harvester, PageFactory,
    WriterSink, write_records,
};

// ============================================================================
// Fixtures
// ============================================================================

const URL: &str = "https://easyretro.io/publicboard/team/0b6c1f0e-2f4b-4a8e-8c63-3a3f5e1d9c7a";

fn frame(path: &str, data: Value) -> String {
    json!({"t": "d", "d": {"b": {"p": path, "d": data}}}).to_string()
}

/// Messages first, a heartbeat in between, board info last.
fn planning_board() -> Vec<String> {
    vec![
        frame(
            "messages/board",
            json!({
                "a": {"text": "Ship it, quickly", "votes": {"u1": 1, "u2": 1}},
                "b": {"text": "Flaky CI", "votes": {}},
                "c": {"text": "More pairing", "votes": {"u1": 1}},
            }),
        ),
        json!({"t": "c", "d": {"t": "h"}}).to_string(),
        frame(
            "columns/publicboards/board",
            json!({"0": {"messagesIds": ["a"]}, "1": {"messagesIds": ["b", "c"]}}),
        ),
        frame(
            "publicboards/board",
            json!({
                "boardName": "Q3 Planning",
                "columns": {"1": {"value": "Change"}, "0": {"value": "Keep"}},
            }),
        ),
    ]
}

struct ReplayPage {
    frames: Vec<String>,
    handler: Mutex<Option<FrameHandler>>,
    visited: Mutex<Vec<String>>,
}

#[async_trait]
impl FrameSource for ReplayPage {
    async fn listen(&self, handler: FrameHandler) -> retro_harvest::Result<()> {
        *self.handler.lock() = Some(handler);
        Ok(())
    }

    async fn navigate(&self, url: &str) -> retro_harvest::Result<()> {
        self.visited.lock().push(url.to_string());
        let handler = self.handler.lock().clone();
        if let Some(handler) = handler {
            let frames = self.frames.clone();
            tokio::spawn(async move {
                for raw in frames {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    handler(raw.as_str());
                }
            });
        }
        Ok(())
    }
}

struct ReplayFactory {
    frames: Vec<String>,
    visited: Visited,
}

#[async_trait]
impl PageFactory for ReplayFactory {
    type Page = ReplayPage;

    async fn create(&self) -> retro_harvest::Result<ReplayPage> {
        Ok(ReplayPage {
            frames: self.frames.clone(),
            handler: Mutex::new(None),
            visited: Mutex::new(Vec::new()),
        })
    }

    async fn destroy(&self, page: ReplayPage) -> retro_harvest::Result<()> {
        self.visited.lock().extend(page.visited.into_inner());
        Ok(())
    }
}

type Visited = Arc<Mutex<Vec<String>>>;

fn harvester(
    frames: Vec<String>,
    policy: CompletionPolicy,
) -> Result<(Harvester<ReplayFactory>, Visited)> {
    let visited = Arc::new(Mutex::new(Vec::new()));
    let factory = ReplayFactory {
        frames,
        visited: Arc::clone(&visited),
    };
    let config = HarvestConfig::default()
        .with_pool_size(2)
        .with_capture_timeout(Duration::from_secs(2))
        .with_policy(policy);

    Ok((Harvester::new(factory, config)?, visited))
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn fetch_rebuilds_board_from_out_of_order_frames() -> Result<()> {
    let (harvester, visited) = harvester(planning_board(), CompletionPolicy::AllFamilies)?;

    let board = harvester.fetch_board(URL).await?;

    assert_eq!(board.name(), "Q3 Planning");
    assert_eq!(board.columns.len(), 2);
    assert_eq!(board.columns[0].title, "Keep");
    assert_eq!(board.columns[1].message_ids, vec!["b", "c"]);

    let votes: Vec<_> = board.messages.iter().map(|m| (m.id.as_str(), m.votes)).collect();
    assert_eq!(votes, vec![("a", 2), ("b", 0), ("c", 1)]);

    assert_eq!(visited.lock().as_slice(), [URL]);
    assert_eq!(harvester.pool().in_use(), 0);
    Ok(())
}

#[tokio::test]
async fn csv_export_pivots_columns_and_blanks_unvoted() -> Result<()> {
    let (harvester, _) = harvester(planning_board(), CompletionPolicy::AllFamilies)?;
    harvester.fetch_board(URL).await?;

    let export = harvester.export(ExportFormat::Csv)?;
    assert_eq!(export.file_name(), "q3_planning.csv");

    let mut sink = WriterSink::new(Vec::new());
    let written = write_records(&export.lines, &mut sink).await?;

    assert_eq!(written, 3);
    assert_eq!(
        String::from_utf8(sink.into_inner())?,
        "Keep,Change\n\"Ship it, quickly\",More pairing\n,\n"
    );
    Ok(())
}

#[tokio::test]
async fn legacy_export_lists_every_message() -> Result<()> {
    let (harvester, _) = harvester(planning_board(), CompletionPolicy::AllFamilies)?;
    harvester.fetch_board(URL).await?;

    let export = harvester.export(ExportFormat::Legacy)?;

    assert_eq!(
        export.to_text(),
        "Q3 Planning\n\n\
         Keep\n- Ship it, quickly (2)\n\n\
         Change\n- Flaky CI (0)\n- More pairing (1)\n\n"
    );
    Ok(())
}

#[tokio::test]
async fn export_to_file_in_temp_dir() -> Result<()> {
    let (harvester, _) = harvester(planning_board(), CompletionPolicy::FrameCount)?;
    let dir = tempfile::tempdir()?;

    let path =
        retro_harvest::cli::download(&harvester, URL, ExportFormat::Legacy, dir.path()).await?;

    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("q3_planning.txt"));
    assert!(tokio::fs::read_to_string(&path).await?.starts_with("Q3 Planning\n"));

    harvester.shutdown().await?;
    assert!(harvester.pool().is_draining());
    Ok(())
}

#[tokio::test]
async fn missing_frames_time_out_without_storing() -> Result<()> {
    let frames = planning_board()[..2].to_vec();
    let (harvester, _) = harvester(frames, CompletionPolicy::FrameCount)?;
    let started = tokio::time::Instant::now();

    let err = harvester.fetch_board(URL).await.expect_err("only two frames");

    assert!(err.is_timeout());
    assert!(started.elapsed() >= Duration::from_secs(2));
    assert!(harvester.current_board().is_none());
    Ok(())
}
