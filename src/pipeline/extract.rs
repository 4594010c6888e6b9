//! Fragment extraction: turn a page into positioned lines of text.
//!
//! [`FragmentSource`] is the seam between the job driver and whatever parses
//! the PDF. The job calls [`FragmentSource::fragments_for_page`] exactly once
//! per selected page, in page order, from a single thread. Sources are
//! allowed to keep page-order-dependent state between calls; taking
//! `&mut self` makes the single-caller contract part of the signature.
//!
//! [`PdfiumSource`] is the production source. pdfium reports text as
//! rectangles of characters ("segments") in content-stream order; these are
//! grouped into lines with [`LineGrouping`] and each line becomes one
//! [`Fragment`] whose vertical position is the line's bottom edge.

use crate::error::PageError;
use crate::output::Fragment;
use pdfium_render::prelude::*;
use tracing::debug;

/// Produces the fragments of one page at a time.
pub trait FragmentSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Fragments of the page at 0-based `index`, in extraction order.
    ///
    /// An `Err` means only this page is unusable; the caller may continue
    /// with the next page.
    fn fragments_for_page(&mut self, index: usize) -> Result<Vec<Fragment>, PageError>;
}

impl<S: FragmentSource + ?Sized> FragmentSource for &mut S {
    fn page_count(&self) -> usize {
        (**self).page_count()
    }

    fn fragments_for_page(&mut self, index: usize) -> Result<Vec<Fragment>, PageError> {
        (**self).fragments_for_page(index)
    }
}

// ── Line grouping ────────────────────────────────────────────────────────

/// A run of characters with its bounding box, in PDF user space.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
    pub text: String,
}

impl TextRun {
    fn height(&self) -> f32 {
        (self.top - self.bottom).max(0.0)
    }
}

/// Rules for merging consecutive [`TextRun`]s into lines.
///
/// Runs are never reordered here. Reading order is decided later, over whole
/// lines, by [`crate::pipeline::assemble::assemble_page`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineGrouping {
    /// Two runs share a line when their vertical overlap is at least this
    /// fraction of the smaller height.
    pub line_overlap: f32,
    /// A space is inserted between runs further apart than this fraction of
    /// the line height.
    pub word_margin: f32,
}

impl Default for LineGrouping {
    fn default() -> Self {
        Self {
            line_overlap: 0.5,
            word_margin: 0.1,
        }
    }
}

struct OpenLine {
    bottom: f32,
    top: f32,
    right: f32,
    text: String,
}

impl OpenLine {
    fn start(run: &TextRun, text: String) -> Self {
        Self {
            bottom: run.bottom,
            top: run.top,
            right: run.right,
            text,
        }
    }

    fn accepts(&self, run: &TextRun, line_overlap: f32) -> bool {
        let overlap = self.top.min(run.top) - self.bottom.max(run.bottom);
        let min_height = (self.top - self.bottom).max(0.0).min(run.height());
        overlap >= 0.0 && overlap >= line_overlap * min_height
    }

    fn push(&mut self, run: &TextRun, text: &str, word_margin: f32) {
        let gap = run.left - self.right;
        let height = (self.top - self.bottom).max(run.height());
        let needs_space = gap > word_margin * height
            && !self.text.ends_with(char::is_whitespace)
            && !text.starts_with(char::is_whitespace);
        if needs_space {
            self.text.push(' ');
        }
        self.text.push_str(text);
        self.bottom = self.bottom.min(run.bottom);
        self.top = self.top.max(run.top);
        self.right = self.right.max(run.right);
    }

    fn finish(self) -> Option<Fragment> {
        let text = self.text.trim_end();
        if text.trim_start().is_empty() {
            return None;
        }
        Some(Fragment::new(self.bottom, format!("{text}\n")))
    }
}

impl LineGrouping {
    /// Merge runs into line fragments, keeping extraction order.
    ///
    /// Each fragment's text ends with exactly one `\n`; line breaks inside a
    /// run become spaces. Lines with no visible text are dropped.
    pub fn group(&self, runs: impl IntoIterator<Item = TextRun>) -> Vec<Fragment> {
        let mut fragments = Vec::new();
        let mut current: Option<OpenLine> = None;

        for run in runs {
            let text: String = run
                .text
                .chars()
                .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
                .collect();
            if text.is_empty() {
                continue;
            }

            match current.as_mut() {
                Some(line) if line.accepts(&run, self.line_overlap) => {
                    line.push(&run, &text, self.word_margin);
                }
                _ => {
                    if let Some(done) = current.take().and_then(OpenLine::finish) {
                        fragments.push(done);
                    }
                    current = Some(OpenLine::start(&run, text));
                }
            }
        }

        if let Some(done) = current.and_then(OpenLine::finish) {
            fragments.push(done);
        }
        fragments
    }
}

// ── pdfium ───────────────────────────────────────────────────────────────

/// Fragment source backed by a pdfium document.
///
/// Owns the document for the whole job; pdfium state is never shared with
/// another thread.
pub struct PdfiumSource<'a> {
    document: PdfDocument<'a>,
    grouping: LineGrouping,
    page_count: usize,
}

impl<'a> PdfiumSource<'a> {
    pub fn new(document: PdfDocument<'a>, grouping: LineGrouping) -> Self {
        let page_count = document.pages().len() as usize;
        Self {
            document,
            grouping,
            page_count,
        }
    }
}

impl FragmentSource for PdfiumSource<'_> {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn fragments_for_page(&mut self, index: usize) -> Result<Vec<Fragment>, PageError> {
        let page_num = index + 1;
        let page_index = PdfPageIndex::try_from(index).map_err(|_| PageError::LoadFailed {
            page: page_num,
            detail: format!("page index {index} exceeds pdfium's limit"),
        })?;

        let page = self
            .document
            .pages()
            .get(page_index)
            .map_err(|e| PageError::LoadFailed {
                page: page_num,
                detail: format!("{:?}", e),
            })?;

        let text = page.text().map_err(|e| PageError::ExtractionFailed {
            page: page_num,
            detail: format!("{:?}", e),
        })?;

        let segments = text.segments();
        let runs = segments.iter().map(|segment| {
            let bounds = segment.bounds();
            TextRun {
                left: bounds.left().value,
                bottom: bounds.bottom().value,
                right: bounds.right().value,
                top: bounds.top().value,
                text: segment.text(),
            }
        });

        let fragments = self.grouping.group(runs);
        debug!("Page {}: {} line fragments", page_num, fragments.len());
        Ok(fragments)
    }
}

// ── In-memory ────────────────────────────────────────────────────────────

/// A source whose fragments were produced ahead of time.
///
/// Useful when the layout analysis happens elsewhere, and for driving the
/// job without a PDF engine.
#[derive(Debug, Clone, Default)]
pub struct PreparedSource {
    pages: Vec<Result<Vec<Fragment>, String>>,
}

impl PreparedSource {
    pub fn new(pages: Vec<Vec<Fragment>>) -> Self {
        Self {
            pages: pages.into_iter().map(Ok).collect(),
        }
    }

    /// Make the page at 0-based `index` fail extraction with `detail`.
    pub fn with_failure(mut self, index: usize, detail: impl Into<String>) -> Self {
        if let Some(slot) = self.pages.get_mut(index) {
            *slot = Err(detail.into());
        }
        self
    }
}

impl FragmentSource for PreparedSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn fragments_for_page(&mut self, index: usize) -> Result<Vec<Fragment>, PageError> {
        match self.pages.get(index) {
            Some(Ok(fragments)) => Ok(fragments.clone()),
            Some(Err(detail)) => Err(PageError::ExtractionFailed {
                page: index + 1,
                detail: detail.clone(),
            }),
            None => Err(PageError::LoadFailed {
                page: index + 1,
                detail: format!("document has {} pages", self.pages.len()),
            }),
        }
    }
}
