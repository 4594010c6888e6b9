//! Data produced by an extraction job.
//!
//! [`Fragment`]s live only for the page being processed: a source produces
//! them, [`crate::pipeline::assemble::assemble_page`] turns them into a
//! [`PageOutput`], and both are dropped once the page is written. The only
//! thing that outlives the page loop is the [`JobReport`].

use crate::error::PageError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One line of text on a page, tagged with its vertical position.
///
/// `vertical_position` is in the page's own coordinate space, where larger
/// values are higher on the page (PDF user space). Values from different
/// pages are not comparable.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub vertical_position: f32,
    /// Line text, usually ending in `\n`.
    pub text: String,
}

impl Fragment {
    pub fn new(vertical_position: f32, text: impl Into<String>) -> Self {
        Self {
            vertical_position,
            text: text.into(),
        }
    }
}

/// The rendered output for one page, page separators included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageOutput {
    /// Plain text, ends with `"\f\n"`.
    pub text: String,
    /// HTML fragment with `<br>` line breaks, ends with the page-break divider.
    pub html: String,
}

/// Summary returned when a job completes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobReport {
    /// Pages the job iterated over (selected pages, not the document total).
    pub total_pages: usize,
    /// Pages whose fragments were extracted and written.
    pub processed_pages: usize,
    /// Pages that failed extraction and were written as empty pages.
    pub skipped_pages: usize,
    /// Why each skipped page was skipped, in page order.
    pub skipped: Vec<PageError>,
    /// Where the plain-text output went (`None` for in-memory jobs).
    pub text_path: Option<PathBuf>,
    /// Where the HTML output went (`None` for in-memory jobs).
    pub html_path: Option<PathBuf>,
    /// Wall-clock time of the page loop.
    pub duration_ms: u64,
}

impl JobReport {
    /// True when every page was extracted.
    pub fn is_complete(&self) -> bool {
        self.skipped_pages == 0
    }
}

/// Document-level information from [`crate::convert::inspect`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}
