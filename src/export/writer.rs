//! Sequential record writer.
//!
//! [`write_records`] pulls one record at a time and awaits the sink before
//! pulling the next, so a slow sink suspends the producer instead of
//! buffering the whole export.
//!
//! | Sink | Back-pressure |
//! |------|---------------|
//! | [`WriterSink`] | `AsyncWrite::poll_write` readiness |
//! | [`ChannelSink`] | Bounded channel of capacity 1 |

// ============================================================================
// Imports
// ============================================================================

use std::io::{Error as IoError, ErrorKind};

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{Error, Result};

// ============================================================================
// RecordSink
// ============================================================================

/// Destination that accepts records one at a time.
#[async_trait]
pub trait RecordSink: Send {
    /// Writes one record, suspending while the sink is full.
    async fn write_record(&mut self, record: &str) -> Result<()>;

    /// Signals end of stream.
    async fn end(&mut self) -> Result<()>;
}

// ============================================================================
// WriterSink
// ============================================================================

/// Sink over any [`AsyncWrite`], such as a file.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
}

impl<W> WriterSink<W> {
    /// Wraps a writer.
    #[inline]
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the wrapped writer.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W> RecordSink for WriterSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn write_record(&mut self, record: &str) -> Result<()> {
        self.writer.write_all(record.as_bytes()).await?;
        Ok(())
    }

    async fn end(&mut self) -> Result<()> {
        self.writer.flush().await?;
        self.writer.shutdown().await?;
        Ok(())
    }
}

// ============================================================================
// ChannelSink
// ============================================================================

/// Sink handing records to a receiver, one slot at a time.
#[derive(Debug)]
pub struct ChannelSink {
    tx: Option<mpsc::Sender<String>>,
}

/// Creates a channel sink and its receiving end.
#[must_use]
pub fn record_channel() -> (ChannelSink, mpsc::Receiver<String>) {
    let (tx, rx) = mpsc::channel(1);
    (ChannelSink { tx: Some(tx) }, rx)
}

#[async_trait]
impl RecordSink for ChannelSink {
    async fn write_record(&mut self, record: &str) -> Result<()> {
        let tx = self.tx.as_ref().ok_or_else(receiver_gone)?;
        tx.send(record.to_string())
            .await
            .map_err(|_| receiver_gone())
    }

    async fn end(&mut self) -> Result<()> {
        self.tx.take();
        Ok(())
    }
}

fn receiver_gone() -> Error {
    Error::Io(IoError::new(ErrorKind::BrokenPipe, "record receiver dropped"))
}

// ============================================================================
// write_records
// ============================================================================

/// Writes `records` in order, then ends the sink exactly once.
///
/// Returns the number of records written. The sink is ended even when a
/// write fails; the write error takes precedence.
///
/// # Errors
///
/// Returns the first write error, or the error from ending the sink.
pub async fn write_records<I, S>(records: I, sink: &mut S) -> Result<usize>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
    S: RecordSink + ?Sized,
{
    let mut written = 0;
    let mut outcome = Ok(());

    for record in records {
        if let Err(e) = sink.write_record(record.as_ref()).await {
            outcome = Err(e);
            break;
        }
        written += 1;
    }

    let ended = sink.end().await;
    outcome?;
    ended?;

    debug!(written, "Records written");
    Ok(written)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use tokio::io::AsyncReadExt;
    use tokio_test::{assert_pending, assert_ready, task};

    /// Records every call for inspection.
    #[derive(Default)]
    struct RecordingSink {
        records: Vec<String>,
        ends: usize,
        fail_on: Option<usize>,
    }

    #[async_trait]
    impl RecordSink for RecordingSink {
        async fn write_record(&mut self, record: &str) -> Result<()> {
            if self.fail_on == Some(self.records.len()) {
                return Err(receiver_gone());
            }
            self.records.push(record.to_string());
            Ok(())
        }

        async fn end(&mut self) -> Result<()> {
            self.ends += 1;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_preserves_order_and_ends_once() {
        let mut sink = RecordingSink::default();
        let written = write_records(["a\n", "b\n", "c\n"], &mut sink)
            .await
            .expect("written");

        assert_eq!(written, 3);
        assert_eq!(sink.records, vec!["a\n", "b\n", "c\n"]);
        assert_eq!(sink.ends, 1);
    }

    #[tokio::test]
    async fn test_failed_write_still_ends() {
        let mut sink = RecordingSink {
            fail_on: Some(1),
            ..Default::default()
        };
        let result = write_records(["a", "b", "c"], &mut sink).await;

        assert!(result.is_err());
        assert_eq!(sink.records, vec!["a"]);
        assert_eq!(sink.ends, 1);
    }

    #[tokio::test]
    async fn test_writer_sink_writes_each_record() {
        let mock = tokio_test::io::Builder::new()
            .write(b"header\n")
            .wait(Duration::from_millis(10))
            .write(b"row\n")
            .build();

        let mut sink = WriterSink::new(mock);
        let written = write_records(vec!["header\n".to_string(), "row\n".to_string()], &mut sink)
            .await
            .expect("written");
        assert_eq!(written, 2);
    }

    #[test]
    fn test_channel_sink_suspends_until_drained() {
        let (mut sink, mut rx) = record_channel();
        let mut writing = task::spawn(write_records(["a", "b", "c"], &mut sink));

        // One record fits the channel; the second must wait
        assert_pending!(writing.poll());
        assert_eq!(rx.try_recv().ok().as_deref(), Some("a"));
        assert!(rx.try_recv().is_err());

        assert!(writing.is_woken());
        assert_pending!(writing.poll());
        assert_eq!(rx.try_recv().ok().as_deref(), Some("b"));

        let written = assert_ready!(writing.poll()).expect("written");
        assert_eq!(written, 3);
        drop(writing);

        assert_eq!(rx.try_recv().ok().as_deref(), Some("c"));
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }

    #[tokio::test]
    async fn test_small_pipe_receives_everything_in_order() {
        let (client, mut server) = tokio::io::duplex(8);
        let reader = tokio::spawn(async move {
            let mut text = String::new();
            server.read_to_string(&mut text).await.map(|_| text)
        });

        let records: Vec<String> = (0..50).map(|i| format!("record number {i}\n")).collect();
        let expected = records.concat();

        let mut sink = WriterSink::new(client);
        write_records(&records, &mut sink).await.expect("written");
        drop(sink);

        let received = reader.await.expect("join").expect("read");
        assert_eq!(received, expected);
    }
}
