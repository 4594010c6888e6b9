//! Output emission: where assembled pages go.
//!
//! A [`PageSink`] receives every page's [`PageOutput`] in page order and is
//! finished once after the last page. [`FileSink`] writes the two output
//! files; [`MemorySink`] keeps both documents in memory.
//!
//! Both output files are opened when the sink is created and closed when it
//! is dropped, whichever way the job ends.

use crate::error::Pdf2TxtError;
use crate::output::PageOutput;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Destination of assembled pages.
pub trait PageSink {
    /// Append one page to both outputs.
    fn write_page(&mut self, page: &PageOutput) -> Result<(), Pdf2TxtError>;

    /// Flush everything written so far. Called once, after the last page.
    fn finish(&mut self) -> Result<(), Pdf2TxtError>;

    /// Paths of the text and HTML outputs, when they are files.
    fn paths(&self) -> (Option<PathBuf>, Option<PathBuf>) {
        (None, None)
    }
}

impl<S: PageSink + ?Sized> PageSink for &mut S {
    fn write_page(&mut self, page: &PageOutput) -> Result<(), Pdf2TxtError> {
        (**self).write_page(page)
    }

    fn finish(&mut self) -> Result<(), Pdf2TxtError> {
        (**self).finish()
    }

    fn paths(&self) -> (Option<PathBuf>, Option<PathBuf>) {
        (**self).paths()
    }
}

struct OutputFile {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl OutputFile {
    /// Open `dir/name` for writing without touching its current content.
    fn open(dir: &Path, name: &str) -> Result<(Self, bool), Pdf2TxtError> {
        let path = dir.join(name);
        let existed = path.exists();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| Pdf2TxtError::OutputDirNotWritable {
                path: dir.to_path_buf(),
                source: e,
            })?;
        debug!("Opened {}", path.display());
        Ok((
            Self {
                path,
                writer: BufWriter::new(file),
            },
            existed,
        ))
    }

    fn truncate(&mut self) -> Result<(), Pdf2TxtError> {
        self.writer
            .get_mut()
            .set_len(0)
            .map_err(|e| Pdf2TxtError::OutputWriteFailed {
                path: self.path.clone(),
                source: e,
            })
    }

    fn write(&mut self, s: &str) -> Result<(), Pdf2TxtError> {
        self.writer
            .write_all(s.as_bytes())
            .map_err(|e| Pdf2TxtError::OutputWriteFailed {
                path: self.path.clone(),
                source: e,
            })
    }

    fn flush(&mut self) -> Result<(), Pdf2TxtError> {
        self.writer
            .flush()
            .and_then(|()| self.writer.get_ref().sync_all())
            .map_err(|e| Pdf2TxtError::OutputWriteFailed {
                path: self.path.clone(),
                source: e,
            })
    }
}

/// Writes the plain-text and HTML outputs into a directory.
///
/// Files are UTF-8 and truncated on creation. The HTML file is a fragment:
/// there is no `<html>` or `<body>` wrapper.
pub struct FileSink {
    text: OutputFile,
    html: OutputFile,
}

impl FileSink {
    /// Create (or truncate) `dir/text_name` and `dir/html_name`.
    ///
    /// The directory must already exist. Neither file is truncated until
    /// both are open; if the second cannot be opened, a text file created
    /// by this call is removed again and an existing one is left untouched.
    pub fn create(dir: &Path, text_name: &str, html_name: &str) -> Result<Self, Pdf2TxtError> {
        let (mut text, text_existed) = OutputFile::open(dir, text_name)?;
        let mut html = match OutputFile::open(dir, html_name) {
            Ok((html, _)) => html,
            Err(e) => {
                let text_path = text.path.clone();
                drop(text);
                if !text_existed {
                    let _ = fs::remove_file(&text_path);
                }
                return Err(e);
            }
        };
        text.truncate()?;
        html.truncate()?;
        Ok(Self { text, html })
    }

    pub fn text_path(&self) -> &Path {
        &self.text.path
    }

    pub fn html_path(&self) -> &Path {
        &self.html.path
    }
}

impl PageSink for FileSink {
    fn write_page(&mut self, page: &PageOutput) -> Result<(), Pdf2TxtError> {
        self.text.write(&page.text)?;
        self.html.write(&page.html)
    }

    fn finish(&mut self) -> Result<(), Pdf2TxtError> {
        self.text.flush()?;
        self.html.flush()
    }

    fn paths(&self) -> (Option<PathBuf>, Option<PathBuf>) {
        (Some(self.text.path.clone()), Some(self.html.path.clone()))
    }
}

/// Collects both outputs in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySink {
    pub text: String,
    pub html: String,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_parts(self) -> (String, String) {
        (self.text, self.html)
    }
}

impl PageSink for MemorySink {
    fn write_page(&mut self, page: &PageOutput) -> Result<(), Pdf2TxtError> {
        self.text.push_str(&page.text);
        self.html.push_str(&page.html);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Pdf2TxtError> {
        Ok(())
    }
}
