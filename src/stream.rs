//! Streaming API: job progress and completion as an async stream.
//!
//! [`convert_stream`] starts the same job as [`crate::convert::convert`] on a
//! blocking worker and returns immediately with a stream of [`JobEvent`]s.
//! A UI can poll the stream from its own task and update a progress
//! indicator without ever blocking on the extraction.
//!
//! The stream ends after exactly one terminal event, [`JobEvent::Completed`]
//! or [`JobEvent::Failed`]. Dropping the stream early does not stop the job;
//! it runs to completion and its remaining events are discarded.

use crate::config::ExtractionConfig;
use crate::convert::{check_paths, run_job};
use crate::error::{PageError, Pdf2TxtError};
use crate::job::JobState;
use crate::output::JobReport;
use crate::pipeline::emit::FileSink;
use crate::progress::{JobProgressCallback, ProgressCallback};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;
use tracing::warn;

/// One observable step of a running job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JobEvent {
    /// Outputs are open and the page count is known.
    Started { total_pages: usize },
    /// A page's extraction failed; it is written as an empty page.
    PageSkipped { page_num: usize, error: PageError },
    /// A page has been written to both outputs.
    PageComplete {
        pages_done: usize,
        total_pages: usize,
        /// Progress percentage, 0–100.
        percent: f64,
    },
    /// Terminal: the job finished and both outputs are flushed.
    Completed(JobReport),
    /// Terminal: the job failed. Holds the error message.
    Failed(String),
}

impl JobEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobEvent::Completed(_) | JobEvent::Failed(_))
    }
}

/// A boxed stream of job events.
pub type JobEventStream = Pin<Box<dyn Stream<Item = JobEvent> + Send>>;

/// Forwards callback events into the channel, then to the caller's callback.
struct ChannelCallback {
    tx: mpsc::UnboundedSender<JobEvent>,
    inner: Option<ProgressCallback>,
}

impl ChannelCallback {
    fn send(&self, event: JobEvent) {
        // A closed channel only means nobody is listening any more.
        let _ = self.tx.send(event);
    }
}

impl JobProgressCallback for ChannelCallback {
    fn on_job_start(&self, total_pages: usize) {
        self.send(JobEvent::Started { total_pages });
        if let Some(cb) = &self.inner {
            cb.on_job_start(total_pages);
        }
    }

    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        if let Some(cb) = &self.inner {
            cb.on_page_start(page_num, total_pages);
        }
    }

    fn on_page_complete(&self, state: &JobState, text_len: usize) {
        self.send(JobEvent::PageComplete {
            pages_done: state.pages_done(),
            total_pages: state.total_pages(),
            percent: state.progress().percent(),
        });
        if let Some(cb) = &self.inner {
            cb.on_page_complete(state, text_len);
        }
    }

    fn on_page_skipped(&self, page_num: usize, total_pages: usize, error: &PageError) {
        self.send(JobEvent::PageSkipped {
            page_num,
            error: error.clone(),
        });
        if let Some(cb) = &self.inner {
            cb.on_page_skipped(page_num, total_pages, error);
        }
    }

    fn on_job_complete(&self, report: &JobReport) {
        // The terminal event is sent from the job's result, not from here.
        if let Some(cb) = &self.inner {
            cb.on_job_complete(report);
        }
    }
}

/// Extract a PDF into `output_dir`, streaming progress as it happens.
///
/// # Returns
/// - `Ok(JobEventStream)`: events in order, ending with one terminal event
/// - `Err(Pdf2TxtError)`: the input or output path was rejected before the
///   job started
///
/// # Example
/// ```rust,no_run
/// use pdf2txt::{convert_stream, ExtractionConfig, JobEvent};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ExtractionConfig::default();
/// let mut events = convert_stream("document.pdf", "out", &config).await?;
/// while let Some(event) = events.next().await {
///     if let JobEvent::PageComplete { percent, .. } = event {
///         eprintln!("{percent:.2}%");
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub async fn convert_stream(
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<JobEventStream, Pdf2TxtError> {
    let (pdf_path, out_dir) = check_paths(input.as_ref(), output_dir.as_ref())?;

    let (tx, rx) = mpsc::unbounded_channel();
    let forwarder = Arc::new(ChannelCallback {
        tx: tx.clone(),
        inner: config.progress_callback.clone(),
    });
    let mut config = config.clone();
    config.progress_callback = Some(forwarder);

    let worker = tokio::task::spawn_blocking(move || {
        run_job(&pdf_path, &config, || {
            FileSink::create(&out_dir, &config.text_file_name, &config.html_file_name)
        })
    });

    tokio::spawn(async move {
        let terminal = match worker.await {
            Ok(Ok(report)) => JobEvent::Completed(report),
            Ok(Err(e)) => {
                warn!("Extraction failed: {}", e);
                JobEvent::Failed(e.to_string())
            }
            Err(e) => JobEvent::Failed(format!("Extraction worker panicked: {}", e)),
        };
        let _ = tx.send(terminal);
    });

    Ok(Box::pin(UnboundedReceiverStream::new(rx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter(AtomicUsize);

    impl JobProgressCallback for Counter {
        fn on_page_skipped(&self, _page_num: usize, _total: usize, _error: &PageError) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn channel_callback_forwards_and_chains() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        let cb = ChannelCallback {
            tx,
            inner: Some(counter.clone()),
        };

        cb.on_job_start(2);
        let err = PageError::ExtractionFailed {
            page: 1,
            detail: "bad".into(),
        };
        cb.on_page_skipped(1, 2, &err);
        cb.on_job_complete(&JobReport::default());

        assert_eq!(rx.try_recv().unwrap(), JobEvent::Started { total_pages: 2 });
        assert_eq!(
            rx.try_recv().unwrap(),
            JobEvent::PageSkipped {
                page_num: 1,
                error: err
            }
        );
        // No terminal event from the callback itself.
        assert!(rx.try_recv().is_err());
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn send_after_receiver_dropped_is_ignored() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let cb = ChannelCallback { tx, inner: None };
        cb.on_job_start(1);
    }

    #[test]
    fn event_json_is_tagged() {
        let json = serde_json::to_string(&JobEvent::Started { total_pages: 3 }).unwrap();
        assert_eq!(json, r#"{"event":"started","total_pages":3}"#);
        assert!(JobEvent::Failed("x".into()).is_terminal());
        assert!(!JobEvent::Started { total_pages: 0 }.is_terminal());
    }

    #[tokio::test]
    async fn rejected_paths_return_error_not_stream() {
        let out = tempfile::tempdir().unwrap();
        let result = convert_stream("/no/such/file.pdf", out.path(), &ExtractionConfig::default()).await;
        assert!(matches!(result, Err(Pdf2TxtError::FileNotFound { .. })));
    }
}
