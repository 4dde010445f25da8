//! Command-line interface.
//!
//! ```text
//! retro-harvest serve [--host 127.0.0.1] [--port 3000]
//! retro-harvest download --url <url> --format csv|legacy [--destination ./]
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use tempfile::NamedTempFile;
use tokio::fs::File;
use tracing::{error, info, warn};

use crate::api::{self, ApiConfig, DEFAULT_PORT};
use crate::board::{CompletionPolicy, DEFAULT_CAPTURE_TIMEOUT};
use crate::browser::DEFAULT_POOL_SIZE;
use crate::config::HarvestConfig;
use crate::driver::{ChromeOptions, Driver, DriverBuilder};
use crate::error::{Error, Result};
use crate::export::{BoardExport, ExportFormat, WriterSink, write_records};
use crate::harvester::Harvester;

// ============================================================================
// Constants
// ============================================================================

/// Time allowed for releasing browser resources on shutdown.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

// ============================================================================
// Cli
// ============================================================================

/// Capture EasyRetro public boards and export them
#[derive(Parser, Debug)]
#[command(name = "retro-harvest", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the Chromium binary (discovered on PATH when omitted)
    #[arg(long, env = "RETRO_CHROME", global = true)]
    pub chrome: Option<PathBuf>,

    /// Maximum number of browser pages alive at once
    #[arg(long, env = "RETRO_POOL_SIZE", default_value_t = DEFAULT_POOL_SIZE, global = true)]
    pub pool_size: usize,

    /// Seconds to wait for board frames
    #[arg(long, env = "RETRO_CAPTURE_TIMEOUT_SECS", default_value_t = DEFAULT_CAPTURE_TIMEOUT.as_secs(), global = true)]
    pub capture_timeout_secs: u64,

    /// Wait for every data family instead of any three frames
    #[arg(long, global = true)]
    pub require_all_families: bool,

    /// Show the browser window
    #[arg(long, global = true)]
    pub show_browser: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        /// Interface to bind
        #[arg(long, env = "RETRO_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to bind
        #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
    },

    /// Download a public board to a file
    Download {
        /// URL of the public board
        #[arg(short, long)]
        url: String,

        /// Export format
        #[arg(short, long, value_enum)]
        format: ExportFormat,

        /// Directory to write the file into
        #[arg(short, long, default_value = "./")]
        destination: PathBuf,
    },
}

impl Cli {
    /// Returns the log level implied by `-v`.
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    /// Builds the harvester settings from the flags.
    #[must_use]
    pub fn harvest_config(&self) -> HarvestConfig {
        let policy = if self.require_all_families {
            CompletionPolicy::AllFamilies
        } else {
            CompletionPolicy::FrameCount
        };

        HarvestConfig::default()
            .with_pool_size(self.pool_size)
            .with_capture_timeout(Duration::from_secs(self.capture_timeout_secs))
            .with_policy(policy)
    }

    /// Builds the browser launcher from the flags.
    #[must_use]
    pub fn driver_builder(&self) -> DriverBuilder {
        let options = if self.show_browser {
            ChromeOptions::new().with_headed()
        } else {
            ChromeOptions::new()
        };

        Driver::builder()
            .binary_opt(self.chrome.clone())
            .options(options)
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Runs the parsed command.
///
/// # Errors
///
/// Returns the first fatal error of the command.
pub async fn run(cli: Cli) -> Result<()> {
    let harvester = Harvester::launch(cli.driver_builder(), cli.harvest_config()).await?;

    match cli.command {
        Command::Serve { host, port } => {
            serve(Arc::new(harvester), ApiConfig { host, port }, shutdown_signal()).await
        }
        Command::Download {
            url,
            format,
            destination,
        } => {
            let result = download(&harvester, &url, format, &destination).await;
            if let Err(e) = harvester.shutdown().await {
                warn!(error = %e, "Failed to shut down browser");
            }
            result.map(|_| ())
        }
    }
}

/// Serves the API, then releases browser resources within the grace period.
async fn serve<S>(harvester: Arc<Harvester>, config: ApiConfig, signal: S) -> Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let served = api::serve(&config, Arc::clone(&harvester), signal).await;

    match tokio::time::timeout(SHUTDOWN_GRACE, harvester.shutdown()).await {
        Ok(Ok(())) => info!("Gracefully shutdown all resources"),
        Ok(Err(e)) => error!(error = %e, "Failed to perform graceful shutdown"),
        Err(_) => error!("Graceful timeout limit reached, abandoning browser resources"),
    }

    served
}

/// Fetches a board and writes the export into `destination`.
///
/// Returns the written file's path.
///
/// # Errors
///
/// Returns fetch, export and file errors.
pub async fn download<F>(
    harvester: &Harvester<F>,
    url: &str,
    format: ExportFormat,
    destination: &Path,
) -> Result<PathBuf>
where
    F: crate::browser::PageFactory,
    F::Page: crate::browser::FrameSource,
{
    info!("Initializing");
    harvester.fetch_board(url).await?;

    let export = harvester.export(format)?;
    let path = write_export(&export, destination).await?;

    info!(path = %path.display(), "Finished, file exported");
    Ok(path)
}

/// Writes `export` into `destination` under its file name.
///
/// Records go to a temporary file in the same directory, which replaces
/// the target only once every record is written. On failure no file is
/// left behind.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be written or moved into place.
pub async fn write_export(export: &BoardExport, destination: &Path) -> Result<PathBuf> {
    let path = destination.join(export.file_name());
    let (file, temp_path) = NamedTempFile::new_in(destination)?.into_parts();

    let mut sink = WriterSink::new(File::from_std(file));
    write_records(&export.lines, &mut sink).await?;
    drop(sink);

    temp_path.persist(&path).map_err(|e| Error::Io(e.error))?;
    Ok(path)
}

/// Resolves on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    use crate::harvester::tests::{URL, frames, harvester};

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_download() {
        let cli = Cli::try_parse_from([
            "retro-harvest",
            "download",
            "-u",
            URL,
            "-f",
            "legacy",
            "--require-all-families",
            "-vv",
        ])
        .expect("parse");

        match &cli.command {
            Command::Download {
                url,
                format,
                destination,
            } => {
                assert_eq!(url, URL);
                assert_eq!(*format, ExportFormat::Legacy);
                assert_eq!(destination, &PathBuf::from("./"));
            }
            other => panic!("Expected download, got {other:?}"),
        }

        assert_eq!(cli.log_level(), tracing::Level::TRACE);
        assert_eq!(
            cli.harvest_config().capture.policy,
            CompletionPolicy::AllFamilies
        );
    }

    #[test]
    fn test_parse_rejects_unknown_format() {
        let result = Cli::try_parse_from(["retro-harvest", "download", "-u", URL, "-f", "xml"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["retro-harvest", "serve", "--pool-size", "3"]).expect("parse");
        assert!(matches!(cli.command, Command::Serve { port: DEFAULT_PORT, .. }));
        assert_eq!(cli.harvest_config().pool_size, 3);
        assert_eq!(cli.harvest_config().capture.timeout, Duration::from_secs(10));
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .expect("read dir")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_failed_export_leaves_no_partial_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let export = BoardExport::render(&crate::export::tests::sprint_retro(), ExportFormat::Csv);

        // A directory squatting on the target name makes the final move fail
        std::fs::create_dir(dir.path().join("sprint_retro.csv")).expect("mkdir");

        let err = write_export(&export, dir.path()).await.expect_err("blocked");
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(entries(dir.path()), vec!["sprint_retro.csv"]);
        assert!(dir.path().join("sprint_retro.csv").is_dir());
    }

    #[tokio::test]
    async fn test_export_replaces_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let export = BoardExport::render(&crate::export::tests::sprint_retro(), ExportFormat::Csv);
        std::fs::write(dir.path().join("sprint_retro.csv"), "stale").expect("seed");

        let path = write_export(&export, dir.path()).await.expect("export");

        assert_eq!(entries(dir.path()), vec!["sprint_retro.csv"]);
        let text = tokio::fs::read_to_string(&path).await.expect("read");
        assert_eq!(text, "Went Well,Improve\nGreat demo,\n");
    }

    #[tokio::test]
    async fn test_download_writes_named_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let harvester = harvester(vec![frames("Sprint Retro")]);

        let path = download(&harvester, URL, ExportFormat::Legacy, dir.path())
            .await
            .expect("download");

        assert_eq!(path, dir.path().join("sprint_retro.txt"));
        let text = tokio::fs::read_to_string(&path).await.expect("read");
        assert_eq!(text, "Sprint Retro\n\nWent Well\n- Great demo (3)\n\n");
    }
}
