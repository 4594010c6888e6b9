//! Error types for the pdf2txt library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Pdf2TxtError`]: **Fatal**, the job cannot start or cannot continue
//!   (bad input file, wrong password, output directory not writable, a write
//!   to an output file failed). Returned as `Err(Pdf2TxtError)` from the
//!   top-level `convert*` functions.
//!
//! * [`PageError`]: **Non-fatal**, a single page's content could not be
//!   extracted. The page contributes an empty fragment set, the job goes on,
//!   and the error is recorded in [`crate::output::JobReport::skipped`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2txt library.
///
/// Page-level failures use [`PageError`] and are collected in the
/// [`crate::output::JobReport`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Pdf2TxtError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The output directory could not be created, or an output file could
    /// not be opened inside it. Reported before the job starts.
    #[error("Output directory '{path}' is not writable: {source}")]
    OutputDirNotWritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing to an already-open output file failed mid-job.
    ///
    /// Files written up to that point are left on disk.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed, or a required path was left unset.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Install libpdfium system-wide.\n\
  • Place libpdfium next to the working directory.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (file or directory).\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2TxtError {
    /// True for errors raised before any output file was opened.
    ///
    /// These are the "configuration errors" of the job: the caller can fix
    /// the input or output path and try again with nothing to clean up.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(
            self,
            Pdf2TxtError::OutputWriteFailed { .. } | Pdf2TxtError::Internal(_)
        )
    }
}

/// A non-fatal error for a single page.
///
/// The page is skipped (it contributes only its separators) and the job
/// continues.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The page object could not be loaded from the document.
    #[error("Page {page}: failed to load page: {detail}")]
    LoadFailed { page: usize, detail: String },

    /// The page loaded but its text layer could not be read.
    #[error("Page {page}: text extraction failed: {detail}")]
    ExtractionFailed { page: usize, detail: String },
}

impl PageError {
    /// 1-indexed page number the error refers to.
    pub fn page(&self) -> usize {
        match self {
            PageError::LoadFailed { page, .. } | PageError::ExtractionFailed { page, .. } => *page,
        }
    }
}
