//! Binding to the pdfium shared library and opening documents.
//!
//! pdfium is loaded at runtime. The library is looked up in this order:
//!
//! 1. `PDFIUM_LIB_PATH`: a library file, or a directory containing one
//! 2. the current working directory
//! 3. the system library search path
//!
//! Both functions here must run on the job's worker thread: the returned
//! [`Pdfium`] and every document loaded through it stay on that thread.

use crate::error::Pdf2TxtError;
use crate::output::DocumentMetadata;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an existing pdfium library (file or directory).
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind to a pdfium library.
pub fn bind_pdfium() -> Result<Pdfium, Pdf2TxtError> {
    let mut attempts: Vec<String> = Vec::new();

    if let Some(path) = std::env::var_os(PDFIUM_LIB_PATH_ENV).map(PathBuf::from) {
        let lib = library_file(&path);
        match Pdfium::bind_to_library(&lib) {
            Ok(bindings) => {
                debug!("Bound pdfium from {}", lib.display());
                return Ok(Pdfium::new(bindings));
            }
            Err(e) => attempts.push(format!("{}: {e:?}", lib.display())),
        }
    }

    let local = Pdfium::pdfium_platform_library_name_at_path("./");
    match Pdfium::bind_to_library(&local) {
        Ok(bindings) => {
            debug!("Bound pdfium from {}", local.display());
            return Ok(Pdfium::new(bindings));
        }
        Err(e) => attempts.push(format!("{}: {e:?}", local.display())),
    }

    match Pdfium::bind_to_system_library() {
        Ok(bindings) => {
            debug!("Bound system pdfium library");
            Ok(Pdfium::new(bindings))
        }
        Err(e) => {
            attempts.push(format!("system library: {e:?}"));
            Err(Pdf2TxtError::PdfiumBindingFailed(attempts.join("; ")))
        }
    }
}

/// A directory in `PDFIUM_LIB_PATH` means "the platform library inside it".
fn library_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    }
}

/// Load a PDF, mapping pdfium's load errors onto configuration errors.
pub fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, Pdf2TxtError> {
    let document = pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                Pdf2TxtError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                Pdf2TxtError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            Pdf2TxtError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })?;

    info!(
        "PDF loaded: {} ({} pages)",
        pdf_path.display(),
        document.pages().len()
    );
    Ok(document)
}

/// Read document-level metadata from an open document.
pub fn document_metadata(document: &PdfDocument) -> DocumentMetadata {
    let metadata = document.metadata();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().trim().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        page_count: document.pages().len() as usize,
        pdf_version: format!("{:?}", document.version()),
    }
}
