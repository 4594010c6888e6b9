//! Pipeline stages for PDF text extraction.
//!
//! Each submodule implements exactly one step of the job.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ engine ──▶ extract ──▶ assemble ──▶ emit
//! (checks)  (pdfium)   (lines)     (order)      (txt + html)
//! ```
//!
//! 1. [`input`]: reject unset, missing or non-PDF inputs and prepare the
//!    output directory before anything is opened
//! 2. [`engine`]: bind the pdfium library and load the document
//! 3. [`extract`]: produce each page's line fragments with their vertical
//!    positions; the only stage that talks to pdfium per page
//! 4. [`assemble`]: sort a page's fragments into reading order and render
//!    the text and HTML forms with their page separators
//! 5. [`emit`]: append rendered pages to the two outputs
//!
//! [`crate::job`] drives steps 3–5 page by page.

pub mod assemble;
pub mod emit;
pub mod engine;
pub mod extract;
pub mod input;
