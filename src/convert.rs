//! Top-level entry points.
//!
//! Every entry point checks its paths first, then runs the whole job on a
//! single blocking worker: bind pdfium, load the document, open the outputs,
//! then page by page through [`Assembler`]. pdfium state is created on that
//! worker and never leaves it.
//!
//! [`convert`] and [`convert_to_strings`] hand the worker to tokio's blocking
//! pool so an async caller (or a UI thread driving a runtime) stays
//! responsive. [`convert_sync`] runs on the calling thread for callers that
//! manage their own worker thread.

use crate::config::ExtractionConfig;
use crate::error::Pdf2TxtError;
use crate::job::Assembler;
use crate::output::{DocumentMetadata, JobReport};
use crate::pipeline::emit::{FileSink, MemorySink, PageSink};
use crate::pipeline::extract::{LineGrouping, PdfiumSource};
use crate::pipeline::{engine, input};
use std::path::{Path, PathBuf};
use tracing::info;

/// Extract `input` into `output.txt` and `output.html` inside `output_dir`.
///
/// # Arguments
/// * `input`: path to a local PDF file
/// * `output_dir`: directory for the two outputs; created if missing
/// * `config`: job configuration
///
/// # Returns
/// `Ok(JobReport)` once both files are written, even if some pages were
/// skipped (check `report.skipped_pages`).
///
/// # Errors
/// Configuration errors (unset/missing/non-PDF input, unusable output
/// directory, pdfium unavailable, encrypted or corrupt PDF) are returned
/// before either output file is created. A failed write mid-job returns
/// [`Pdf2TxtError::OutputWriteFailed`]; files written so far are left as is.
pub async fn convert(
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<JobReport, Pdf2TxtError> {
    let (pdf_path, out_dir) = check_paths(input.as_ref(), output_dir.as_ref())?;
    let config = config.clone();

    tokio::task::spawn_blocking(move || {
        run_job(&pdf_path, &config, || {
            FileSink::create(&out_dir, &config.text_file_name, &config.html_file_name)
        })
    })
    .await
    .map_err(|e| Pdf2TxtError::Internal(format!("Extraction worker panicked: {}", e)))?
}

/// Blocking version of [`convert`], run on the calling thread.
///
/// Do not call this from an async task; use [`convert`] there.
pub fn convert_sync(
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<JobReport, Pdf2TxtError> {
    let (pdf_path, out_dir) = check_paths(input.as_ref(), output_dir.as_ref())?;
    run_job(&pdf_path, config, || {
        FileSink::create(&out_dir, &config.text_file_name, &config.html_file_name)
    })
}

/// Extract `input` into memory.
///
/// Returns the plain text, the HTML and the report. Nothing is written to
/// disk.
pub async fn convert_to_strings(
    input: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<(String, String, JobReport), Pdf2TxtError> {
    let pdf_path = input::validate_input(input.as_ref())?;
    let config = config.clone();

    tokio::task::spawn_blocking(move || -> Result<_, Pdf2TxtError> {
        let mut sink = MemorySink::new();
        let sink_ref = &mut sink;
        let report = run_job(&pdf_path, &config, move || Ok(sink_ref))?;
        let (text, html) = sink.into_parts();
        Ok((text, html, report))
    })
    .await
    .map_err(|e| Pdf2TxtError::Internal(format!("Extraction worker panicked: {}", e)))?
}

/// Read PDF metadata and page count without extracting any text.
pub async fn inspect(
    input: impl AsRef<Path>,
    password: Option<&str>,
) -> Result<DocumentMetadata, Pdf2TxtError> {
    let pdf_path = input::validate_input(input.as_ref())?;
    let password = password.map(str::to_string);

    tokio::task::spawn_blocking(move || -> Result<_, Pdf2TxtError> {
        let pdfium = engine::bind_pdfium()?;
        let document = engine::open_document(&pdfium, &pdf_path, password.as_deref())?;
        Ok(engine::document_metadata(&document))
    })
    .await
    .map_err(|e| Pdf2TxtError::Internal(format!("Inspect task panicked: {}", e)))?
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Configuration checks that need no PDF engine.
pub(crate) fn check_paths(
    input: &Path,
    output_dir: &Path,
) -> Result<(PathBuf, PathBuf), Pdf2TxtError> {
    let pdf_path = input::validate_input(input)?;
    let out_dir = input::prepare_output_dir(output_dir)?;
    Ok((pdf_path, out_dir))
}

/// Load the document, open the sink, run the page loop.
///
/// `open_sink` is only called after the document has loaded, so a corrupt
/// or encrypted PDF never leaves empty output files behind.
pub(crate) fn run_job<K, F>(
    pdf_path: &Path,
    config: &ExtractionConfig,
    open_sink: F,
) -> Result<JobReport, Pdf2TxtError>
where
    K: PageSink,
    F: FnOnce() -> Result<K, Pdf2TxtError>,
{
    info!("Starting extraction: {}", pdf_path.display());

    let pdfium = engine::bind_pdfium()?;
    let document = engine::open_document(&pdfium, pdf_path, config.password.as_deref())?;
    let sink = open_sink()?;

    let grouping = LineGrouping {
        line_overlap: config.line_overlap,
        word_margin: config.word_margin,
    };
    let source = PdfiumSource::new(document, grouping);
    Assembler::from_config(source, config).run(sink)
}
