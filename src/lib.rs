//! # pdf2txt
//!
//! Extract the text of a PDF into a plain-text file and an HTML file, page by
//! page, in top-to-bottom reading order.
//!
//! ## Why this crate?
//!
//! Text extraction engines return a page's text in content-stream order,
//! which is whatever order the producing application happened to draw it in.
//! This crate groups each page's characters into lines, sorts the lines by
//! their vertical position (top of the page first) and writes two outputs:
//!
//! - `output.txt`: each page's lines, followed by a form feed and a newline
//! - `output.html`: the same text with `<br>` before every newline, each page
//!   followed by a page-break `<div>`
//!
//! A page that cannot be extracted is logged, counted and written as an empty
//! page, so page `N` of the input is always page `N` of the outputs.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input     reject unset / missing / non-PDF paths, create output dir
//!  ├─ 2. Engine    bind pdfium, load the document (spawn_blocking)
//!  ├─ 3. Extract   per page: characters → line fragments + vertical position
//!  ├─ 4. Assemble  stable descending sort, render text and HTML
//!  └─ 5. Emit      append both forms, report progress, flush at the end
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2txt::{convert, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::default();
//!     let report = convert("document.pdf", "out", &config).await?;
//!     eprintln!(
//!         "{} pages written, {} skipped",
//!         report.processed_pages, report.skipped_pages
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Without pdfium
//!
//! The page loop does not depend on pdfium. Any [`FragmentSource`] can be
//! assembled into any [`PageSink`]:
//!
//! ```rust
//! use pdf2txt::{Assembler, Fragment, MemorySink, PreparedSource};
//!
//! let source = PreparedSource::new(vec![vec![
//!     Fragment::new(100.0, "Body\n"),
//!     Fragment::new(700.0, "Title\n"),
//! ]]);
//! let mut sink = MemorySink::new();
//! Assembler::new(source).run(&mut sink).unwrap();
//! let (text, _html) = sink.into_parts();
//! assert_eq!(text, "Title\nBody\n\u{c}\n");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2txt` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2txt = { version = "0.1", default-features = false }
//! ```
//!
//! ## PDFium
//!
//! The pdfium shared library is looked up in `PDFIUM_LIB_PATH` (a file or a
//! directory), then next to the working directory, then on the system
//! library path.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod job;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, PageSelection};
pub use convert::{convert, convert_sync, convert_to_strings, inspect};
pub use error::{PageError, Pdf2TxtError};
pub use job::{Assembler, JobPhase, JobState};
pub use output::{DocumentMetadata, Fragment, JobReport, PageOutput};
pub use pipeline::assemble::{assemble_page, HtmlOptions};
pub use pipeline::emit::{FileSink, MemorySink, PageSink};
pub use pipeline::extract::{FragmentSource, LineGrouping, PreparedSource, TextRun};
pub use progress::{JobProgressCallback, NoopProgressCallback, Progress, ProgressCallback};
pub use stream::{convert_stream, JobEvent, JobEventStream};
