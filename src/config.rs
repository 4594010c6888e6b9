//! Configuration types for an extraction job.
//!
//! All job behaviour is controlled through [`ExtractionConfig`], built via its
//! [`ExtractionConfigBuilder`]. The input PDF and the output directory are not
//! part of the config; they are passed to the `convert*` entry points so one
//! config can be reused across documents.

use crate::error::Pdf2TxtError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default name of the plain-text output file.
pub const DEFAULT_TEXT_FILE: &str = "output.txt";

/// Default name of the HTML output file.
pub const DEFAULT_HTML_FILE: &str = "output.html";

/// Configuration for an extraction job.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2txt::{ExtractionConfig, PageSelection};
///
/// let config = ExtractionConfig::builder()
///     .pages(PageSelection::Range(1, 10))
///     .escape_html(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Page selection. Default: All pages.
    ///
    /// Separators and progress are counted over the selected pages only.
    pub pages: PageSelection,

    /// HTML-escape `&`, `<` and `>` in the HTML output. Default: false.
    ///
    /// Off by default so the HTML file carries the extracted text verbatim,
    /// with only `<br>` inserted before each line terminator.
    pub escape_html: bool,

    /// Minimum vertical overlap, relative to the smaller box height, for two
    /// text segments to be placed on the same line. Range: 0.0–1.0. Default: 0.5.
    pub line_overlap: f32,

    /// Horizontal gap, relative to line height, above which a space is
    /// inserted between two segments of one line. Default: 0.1.
    pub word_margin: f32,

    /// Name of the plain-text file inside the output directory. Default: `output.txt`.
    pub text_file_name: String,

    /// Name of the HTML file inside the output directory. Default: `output.html`.
    pub html_file_name: String,

    /// Receives job events. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            password: None,
            pages: PageSelection::default(),
            escape_html: false,
            line_overlap: 0.5,
            word_margin: 0.1,
            text_file_name: DEFAULT_TEXT_FILE.to_string(),
            html_file_name: DEFAULT_HTML_FILE.to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pages", &self.pages)
            .field("escape_html", &self.escape_html)
            .field("line_overlap", &self.line_overlap)
            .field("word_margin", &self.word_margin)
            .field("text_file_name", &self.text_file_name)
            .field("html_file_name", &self.html_file_name)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn escape_html(mut self, v: bool) -> Self {
        self.config.escape_html = v;
        self
    }

    pub fn line_overlap(mut self, ratio: f32) -> Self {
        self.config.line_overlap = ratio;
        self
    }

    pub fn word_margin(mut self, ratio: f32) -> Self {
        self.config.word_margin = ratio;
        self
    }

    pub fn text_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.text_file_name = name.into();
        self
    }

    pub fn html_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.html_file_name = name.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, Pdf2TxtError> {
        let c = &self.config;
        if !(0.0..=1.0).contains(&c.line_overlap) {
            return Err(Pdf2TxtError::InvalidConfig(format!(
                "line overlap must be 0.0–1.0, got {}",
                c.line_overlap
            )));
        }
        if c.word_margin.is_nan() || c.word_margin < 0.0 {
            return Err(Pdf2TxtError::InvalidConfig(format!(
                "word margin must be ≥ 0, got {}",
                c.word_margin
            )));
        }
        for name in [&c.text_file_name, &c.html_file_name] {
            if name.trim().is_empty() || name.contains(['/', '\\']) {
                return Err(Pdf2TxtError::InvalidConfig(format!(
                    "output file name must be a plain, non-empty file name, got {name:?}"
                )));
            }
        }
        if c.text_file_name == c.html_file_name {
            return Err(Pdf2TxtError::InvalidConfig(format!(
                "text and HTML output would both be written to {:?}",
                c.text_file_name
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Specifies which pages of the PDF to extract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Extract all pages (default).
    #[default]
    All,
    /// Extract a single page (1-indexed).
    Single(usize),
    /// Extract a contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Extract specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    ///
    /// Pages beyond `total_pages` are dropped silently.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_output_names() {
        let c = ExtractionConfig::default();
        assert_eq!(c.text_file_name, "output.txt");
        assert_eq!(c.html_file_name, "output.html");
        assert!(!c.escape_html);
        assert_eq!(c.pages, PageSelection::All);
    }

    #[test]
    fn builder_rejects_bad_line_overlap() {
        let err = ExtractionConfig::builder().line_overlap(1.5).build().unwrap_err();
        assert!(err.to_string().contains("line overlap"));
        assert!(ExtractionConfig::builder().line_overlap(f32::NAN).build().is_err());
    }

    #[test]
    fn builder_rejects_negative_word_margin() {
        assert!(ExtractionConfig::builder().word_margin(-0.1).build().is_err());
        assert!(ExtractionConfig::builder().word_margin(0.0).build().is_ok());
    }

    #[test]
    fn builder_rejects_colliding_or_nested_file_names() {
        assert!(ExtractionConfig::builder()
            .text_file_name("same.out")
            .html_file_name("same.out")
            .build()
            .is_err());
        assert!(ExtractionConfig::builder()
            .text_file_name("sub/output.txt")
            .build()
            .is_err());
        assert!(ExtractionConfig::builder().html_file_name("  ").build().is_err());
    }

    #[test]
    fn debug_redacts_password() {
        let c = ExtractionConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn page_selection_to_indices() {
        assert_eq!(PageSelection::All.to_indices(3), vec![0, 1, 2]);
        assert_eq!(PageSelection::All.to_indices(0), Vec::<usize>::new());
        assert_eq!(PageSelection::Single(2).to_indices(3), vec![1]);
        assert_eq!(PageSelection::Single(0).to_indices(3), Vec::<usize>::new());
        assert_eq!(PageSelection::Range(2, 9).to_indices(4), vec![1, 2, 3]);
        assert_eq!(PageSelection::Set(vec![3, 1, 3]).to_indices(5), vec![0, 2]);
    }
}
