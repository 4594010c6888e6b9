//! The job driver: one sequential pass over the selected pages.
//!
//! ```text
//! NotStarted ──run()──▶ Running ──last page──▶ Completed
//! ```
//!
//! For each page, in order: extract fragments, assemble, write to the sink,
//! advance [`JobState`], notify the progress callback. A page whose
//! extraction fails is logged, reported through
//! [`crate::progress::JobProgressCallback::on_page_skipped`] and written as an empty page,
//! so its separators still appear. A write failure ends the job with an
//! error; the sink is dropped (and its files closed) on the way out.
//!
//! [`Assembler::run`] consumes the assembler, so a finished job cannot be
//! restarted; a new job needs a new `Assembler`.

use crate::config::{ExtractionConfig, PageSelection};
use crate::error::Pdf2TxtError;
use crate::output::JobReport;
use crate::pipeline::assemble::{assemble_page, HtmlOptions};
use crate::pipeline::emit::PageSink;
use crate::pipeline::extract::FragmentSource;
use crate::progress::{NoopProgressCallback, Progress, ProgressCallback};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Lifecycle of a job. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JobPhase {
    #[default]
    NotStarted,
    Running,
    Completed,
}

/// The state a job exposes to observers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobState {
    phase: JobPhase,
    total_pages: usize,
    /// 0-based position (within the selected pages) of the last finished page.
    current: Option<usize>,
}

impl JobState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    /// Number of pages the job iterates over. Fixed once running.
    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Position of the last finished page, if any page has finished.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn pages_done(&self) -> usize {
        self.current.map_or(0, |i| i + 1)
    }

    /// `(current + 1) / total` as a percentage.
    ///
    /// A job with no pages reports 0% until it completes and 100% after.
    pub fn progress(&self) -> Progress {
        match Progress::from_pages(self.pages_done(), self.total_pages) {
            Some(p) => p,
            None if self.phase == JobPhase::Completed => Progress::DONE,
            None => Progress::default(),
        }
    }

    fn start(&mut self, total_pages: usize) {
        debug_assert_eq!(self.phase, JobPhase::NotStarted);
        self.phase = JobPhase::Running;
        self.total_pages = total_pages;
        self.current = None;
    }

    fn page_done(&mut self, position: usize) {
        debug_assert_eq!(self.phase, JobPhase::Running);
        debug_assert!(position < self.total_pages);
        self.current = Some(position);
    }

    fn complete(&mut self) {
        debug_assert_eq!(self.phase, JobPhase::Running);
        self.phase = JobPhase::Completed;
    }
}

/// Drives a [`FragmentSource`] page by page into a [`PageSink`].
pub struct Assembler<S> {
    source: S,
    pages: PageSelection,
    html: HtmlOptions,
    callback: ProgressCallback,
    state: JobState,
}

impl<S: FragmentSource> Assembler<S> {
    /// An assembler over all pages of `source`, with default HTML options
    /// and no progress callback.
    pub fn new(source: S) -> Self {
        Self {
            source,
            pages: PageSelection::All,
            html: HtmlOptions::default(),
            callback: Arc::new(NoopProgressCallback),
            state: JobState::new(),
        }
    }

    /// An assembler using the page selection, HTML options and callback of
    /// `config`.
    pub fn from_config(source: S, config: &ExtractionConfig) -> Self {
        let mut assembler = Self::new(source)
            .pages(config.pages.clone())
            .html_options(HtmlOptions {
                escape: config.escape_html,
            });
        if let Some(cb) = &config.progress_callback {
            assembler = assembler.progress_callback(Arc::clone(cb));
        }
        assembler
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.pages = selection;
        self
    }

    pub fn html_options(mut self, options: HtmlOptions) -> Self {
        self.html = options;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.callback = cb;
        self
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    /// Run the job to completion.
    ///
    /// Returns the report once every selected page has been written and the
    /// sink flushed and dropped. Per-page extraction failures are in
    /// [`JobReport::skipped`]; only sink failures are returned as `Err`.
    pub fn run<K: PageSink>(mut self, mut sink: K) -> Result<JobReport, Pdf2TxtError> {
        let started = Instant::now();
        let indices = self.pages.to_indices(self.source.page_count());
        let total = indices.len();

        self.state.start(total);
        info!("Extracting {} pages", total);
        self.callback.on_job_start(total);

        let mut skipped = Vec::new();
        for (position, &index) in indices.iter().enumerate() {
            let page_num = index + 1;
            self.callback.on_page_start(page_num, total);

            let fragments = match self.source.fragments_for_page(index) {
                Ok(fragments) => fragments,
                Err(e) => {
                    warn!("Skipping page {}: {}", page_num, e);
                    self.callback.on_page_skipped(page_num, total, &e);
                    skipped.push(e);
                    Vec::new()
                }
            };
            let fragment_count = fragments.len();

            let page = assemble_page(fragments, self.html);
            sink.write_page(&page)?;

            self.state.page_done(position);
            debug!(
                "Page {} done: {} fragments, {} bytes ({})",
                page_num,
                fragment_count,
                page.text.len(),
                self.state.progress()
            );
            self.callback.on_page_complete(&self.state, page.text.len());
        }

        sink.finish()?;
        let (text_path, html_path) = sink.paths();
        drop(sink);
        self.state.complete();

        let report = JobReport {
            total_pages: total,
            processed_pages: total - skipped.len(),
            skipped_pages: skipped.len(),
            skipped,
            text_path,
            html_path,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            "Extraction complete: {}/{} pages, {} skipped, {}ms",
            report.processed_pages, report.total_pages, report.skipped_pages, report.duration_ms
        );
        self.callback.on_job_complete(&report);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PageError;
    use crate::output::{Fragment, PageOutput};
    use crate::pipeline::emit::MemorySink;
    use crate::pipeline::extract::PreparedSource;
    use crate::progress::JobProgressCallback;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    fn two_pages() -> PreparedSource {
        PreparedSource::new(vec![
            vec![Fragment::new(100.0, "B\n"), Fragment::new(200.0, "A\n")],
            vec![Fragment::new(50.0, "C\n")],
        ])
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
        percents: Mutex<Vec<f64>>,
    }

    impl JobProgressCallback for Recorder {
        fn on_job_start(&self, total_pages: usize) {
            self.events.lock().unwrap().push(format!("start {total_pages}"));
        }
        fn on_page_start(&self, page_num: usize, _total: usize) {
            self.events.lock().unwrap().push(format!("page {page_num}"));
        }
        fn on_page_complete(&self, state: &JobState, _text_len: usize) {
            self.percents.lock().unwrap().push(state.progress().percent());
        }
        fn on_page_skipped(&self, page_num: usize, _total: usize, _error: &PageError) {
            self.events.lock().unwrap().push(format!("skip {page_num}"));
        }
        fn on_job_complete(&self, report: &JobReport) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done {}", report.skipped_pages));
        }
    }

    #[test]
    fn two_page_job_matches_reference_output() {
        let mut sink = MemorySink::new();
        let report = Assembler::new(two_pages()).run(&mut sink).unwrap();
        assert_eq!(sink.text, "A\nB\n\u{c}\nC\n\u{c}\n");
        assert_eq!(report.total_pages, 2);
        assert_eq!(report.processed_pages, 2);
        assert!(report.is_complete());
        assert_eq!(report.text_path, None);
    }

    #[test]
    fn zero_page_job_completes_with_empty_output() {
        let recorder = Arc::new(Recorder::default());
        let mut sink = MemorySink::new();
        let report = Assembler::new(PreparedSource::new(Vec::new()))
            .progress_callback(recorder.clone())
            .run(&mut sink)
            .unwrap();
        assert_eq!(sink.text, "");
        assert_eq!(sink.html, "");
        assert_eq!(report.total_pages, 0);
        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec!["start 0".to_string(), "done 0".to_string()]
        );
        assert!(recorder.percents.lock().unwrap().is_empty());
    }

    #[test]
    fn failing_page_is_skipped_not_fatal() {
        let source = PreparedSource::new(vec![
            vec![Fragment::new(1.0, "one\n")],
            vec![Fragment::new(1.0, "two\n")],
            vec![Fragment::new(1.0, "three\n")],
        ])
        .with_failure(1, "malformed content");
        let recorder = Arc::new(Recorder::default());
        let mut sink = MemorySink::new();

        let report = Assembler::new(source)
            .progress_callback(recorder.clone())
            .run(&mut sink)
            .unwrap();

        assert_eq!(sink.text, "one\n\u{c}\n\u{c}\nthree\n\u{c}\n");
        assert_eq!(report.skipped_pages, 1);
        assert_eq!(report.processed_pages, 2);
        assert_eq!(report.skipped[0].page(), 2);
        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec!["start 3", "page 1", "page 2", "skip 2", "page 3", "done 1"]
        );
        assert_eq!(*recorder.percents.lock().unwrap().last().unwrap(), 100.0);
    }

    #[test]
    fn progress_is_monotonic_and_ends_at_100() {
        let pages = (0..7).map(|i| vec![Fragment::new(1.0, format!("{i}\n"))]).collect();
        let recorder = Arc::new(Recorder::default());
        Assembler::new(PreparedSource::new(pages))
            .progress_callback(recorder.clone())
            .run(MemorySink::new())
            .unwrap();

        let percents = recorder.percents.lock().unwrap();
        assert_eq!(percents.len(), 7);
        assert!(percents[0] > 0.0);
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(Progress(*percents.last().unwrap()).to_string(), "100.00%");
    }

    #[test]
    fn page_selection_limits_pages_and_separators() {
        let mut sink = MemorySink::new();
        let report = Assembler::new(two_pages())
            .pages(PageSelection::Single(2))
            .run(&mut sink)
            .unwrap();
        assert_eq!(sink.text, "C\n\u{c}\n");
        assert_eq!(report.total_pages, 1);
    }

    #[test]
    fn from_config_applies_html_escaping() {
        let config = ExtractionConfig::builder().escape_html(true).build().unwrap();
        let source = PreparedSource::new(vec![vec![Fragment::new(1.0, "<b>\n")]]);
        let mut sink = MemorySink::new();
        Assembler::from_config(source, &config).run(&mut sink).unwrap();
        assert!(sink.html.starts_with("&lt;b&gt;<br>\n"));
    }

    struct BrokenSink {
        writes: usize,
    }

    impl PageSink for BrokenSink {
        fn write_page(&mut self, _page: &PageOutput) -> Result<(), Pdf2TxtError> {
            self.writes += 1;
            if self.writes == 2 {
                return Err(Pdf2TxtError::OutputWriteFailed {
                    path: "output.txt".into(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                });
            }
            Ok(())
        }
        fn finish(&mut self) -> Result<(), Pdf2TxtError> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_aborts_job() {
        let recorder = Arc::new(Recorder::default());
        let mut sink = BrokenSink { writes: 0 };
        let err = Assembler::new(two_pages())
            .progress_callback(recorder.clone())
            .run(&mut sink)
            .unwrap_err();
        assert!(matches!(err, Pdf2TxtError::OutputWriteFailed { .. }));
        assert_eq!(sink.writes, 2);
        assert!(!recorder
            .events
            .lock()
            .unwrap()
            .iter()
            .any(|e| e.starts_with("done")));
    }

    struct ClosingSink {
        closed: Arc<AtomicBool>,
    }

    impl PageSink for ClosingSink {
        fn write_page(&mut self, _page: &PageOutput) -> Result<(), Pdf2TxtError> {
            Ok(())
        }
        fn finish(&mut self) -> Result<(), Pdf2TxtError> {
            Ok(())
        }
    }

    impl Drop for ClosingSink {
        fn drop(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    struct ClosedAtCompletion {
        closed: Arc<AtomicBool>,
        seen: AtomicBool,
    }

    impl JobProgressCallback for ClosedAtCompletion {
        fn on_job_complete(&self, _report: &JobReport) {
            self.seen
                .store(self.closed.load(Ordering::SeqCst), Ordering::SeqCst);
        }
    }

    #[test]
    fn sink_is_closed_before_completion_is_reported() {
        let closed = Arc::new(AtomicBool::new(false));
        let cb = Arc::new(ClosedAtCompletion {
            closed: closed.clone(),
            seen: AtomicBool::new(false),
        });
        let sink = ClosingSink {
            closed: closed.clone(),
        };

        Assembler::new(two_pages())
            .progress_callback(cb.clone())
            .run(sink)
            .unwrap();

        assert!(cb.seen.load(Ordering::SeqCst));
    }

    #[test]
    fn state_progress_boundaries() {
        let mut state = JobState::new();
        assert_eq!(state.phase(), JobPhase::NotStarted);
        assert_eq!(state.progress(), Progress(0.0));

        state.start(0);
        assert_eq!(state.progress(), Progress(0.0));
        state.complete();
        assert_eq!(state.phase(), JobPhase::Completed);
        assert_eq!(state.progress(), Progress::DONE);

        let mut state = JobState::new();
        state.start(4);
        state.page_done(0);
        assert_eq!(state.current_index(), Some(0));
        assert_eq!(state.progress().to_string(), "25.00%");
        state.page_done(3);
        assert_eq!(state.pages_done(), 4);
        assert_eq!(state.progress(), Progress::DONE);
    }
}
