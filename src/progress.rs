//! Progress-callback trait and job-progress values.
//!
//! Inject an [`Arc<dyn JobProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the job processes each page. The callback gets the job's
//! [`JobState`] by reference and never the other way round: the library does
//! not know whether the events end up in a terminal bar, a GUI widget or a
//! log file.
//!
//! # Example
//!
//! ```rust
//! use pdf2txt::{ExtractionConfig, JobProgressCallback, JobState};
//! use std::sync::{Arc, Mutex};
//!
//! struct LastPercent(Mutex<String>);
//!
//! impl JobProgressCallback for LastPercent {
//!     fn on_page_complete(&self, state: &JobState, _text_len: usize) {
//!         *self.0.lock().unwrap() = state.progress().to_string();
//!     }
//! }
//!
//! let cb = Arc::new(LastPercent(Mutex::new(String::new())));
//! let config = ExtractionConfig::builder()
//!     .progress_callback(cb as Arc<dyn JobProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::PageError;
use crate::job::JobState;
use crate::output::JobReport;
use std::fmt;
use std::sync::Arc;

/// Called by the job driver as it processes each page.
///
/// All calls come from the single worker thread that runs the job, in page
/// order. Implementations must still be `Send + Sync` because the worker is
/// not the thread that created them. All methods have no-op defaults.
pub trait JobProgressCallback: Send + Sync {
    /// Called once, after the page count is known and the outputs are open.
    fn on_job_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before a page is extracted.
    ///
    /// # Arguments
    /// * `page_num`: 1-indexed page number in the document
    /// * `total_pages`: number of selected pages
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called after a page (skipped or not) has been written to both outputs.
    ///
    /// `state.progress()` is the value to display.
    fn on_page_complete(&self, state: &JobState, text_len: usize) {
        let _ = (state, text_len);
    }

    /// Called when a page's extraction fails and it is written as an empty page.
    ///
    /// `on_page_complete` still follows for the same page.
    fn on_page_skipped(&self, page_num: usize, total_pages: usize, error: &PageError) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after the last page, when both outputs are flushed.
    fn on_job_complete(&self, report: &JobReport) {
        let _ = report;
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl JobProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn JobProgressCallback>;

/// Job progress as a percentage in `[0, 100]`.
///
/// Displays with two decimals: `Progress(50.0)` → `"50.00%"`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Progress(pub f64);

impl Progress {
    pub const DONE: Progress = Progress(100.0);

    /// Percentage after `completed` of `total` pages.
    ///
    /// Returns `None` for `total == 0`: an empty job has no meaningful
    /// fraction, the caller decides what to show.
    pub fn from_pages(completed: usize, total: usize) -> Option<Self> {
        if total == 0 {
            return None;
        }
        let completed = completed.min(total);
        Some(Progress(completed as f64 / total as f64 * 100.0))
    }

    pub fn percent(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn progress_formats_two_decimals() {
        assert_eq!(Progress(0.0).to_string(), "0.00%");
        assert_eq!(Progress::from_pages(1, 3).unwrap().to_string(), "33.33%");
        assert_eq!(Progress::from_pages(2, 3).unwrap().to_string(), "66.67%");
        assert_eq!(Progress::DONE.to_string(), "100.00%");
    }

    #[test]
    fn progress_last_page_is_exactly_100() {
        for total in 1..=50 {
            assert_eq!(Progress::from_pages(total, total), Some(Progress::DONE));
        }
    }

    #[test]
    fn progress_zero_total_has_no_fraction() {
        assert_eq!(Progress::from_pages(0, 0), None);
    }

    #[test]
    fn progress_is_clamped_to_total() {
        assert_eq!(Progress::from_pages(5, 4), Some(Progress::DONE));
    }

    struct CountingCallback {
        skipped: AtomicUsize,
    }

    impl JobProgressCallback for CountingCallback {
        fn on_page_skipped(&self, _page_num: usize, _total: usize, _error: &PageError) {
            self.skipped.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_job_start(5);
        cb.on_page_start(1, 5);
        cb.on_page_skipped(
            2,
            5,
            &PageError::LoadFailed {
                page: 2,
                detail: "x".into(),
            },
        );
        cb.on_job_complete(&JobReport::default());
    }

    #[test]
    fn arc_dyn_callback_receives_overridden_events_only() {
        let counting = Arc::new(CountingCallback {
            skipped: AtomicUsize::new(0),
        });
        let cb: ProgressCallback = counting.clone();
        cb.on_job_start(2);
        cb.on_page_skipped(
            1,
            2,
            &PageError::ExtractionFailed {
                page: 1,
                detail: "x".into(),
            },
        );
        assert_eq!(counting.skipped.load(Ordering::SeqCst), 1);
    }
}
