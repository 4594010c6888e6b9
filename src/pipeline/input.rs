//! Input and output-location checks, run before the job starts.
//!
//! Everything here is a configuration error: it is reported before pdfium
//! is touched and before any output file exists. Checking the `%PDF` magic
//! bytes up front gives the caller a meaningful error rather than an opaque
//! pdfium load failure.

use crate::error::Pdf2TxtError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate that `path` names a readable file starting with `%PDF`.
pub fn validate_input(path: &Path) -> Result<PathBuf, Pdf2TxtError> {
    if path.as_os_str().is_empty() {
        return Err(Pdf2TxtError::InvalidConfig(
            "no input PDF selected".to_string(),
        ));
    }

    let path = path.to_path_buf();
    if !path.is_file() {
        return Err(Pdf2TxtError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            // A file shorter than four bytes cannot be a PDF either.
            if f.read_exact(&mut magic).is_err() || &magic != b"%PDF" {
                return Err(Pdf2TxtError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2TxtError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Pdf2TxtError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

/// Make sure the output directory exists, creating it if needed.
///
/// Does not create any file; [`crate::pipeline::emit::FileSink::create`]
/// opens the outputs once the PDF itself has loaded.
pub fn prepare_output_dir(dir: &Path) -> Result<PathBuf, Pdf2TxtError> {
    if dir.as_os_str().is_empty() {
        return Err(Pdf2TxtError::InvalidConfig(
            "no output directory selected".to_string(),
        ));
    }

    std::fs::create_dir_all(dir).map_err(|e| Pdf2TxtError::OutputDirNotWritable {
        path: dir.to_path_buf(),
        source: e,
    })?;

    if !dir.is_dir() {
        return Err(Pdf2TxtError::OutputDirNotWritable {
            path: dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "not a directory"),
        });
    }

    debug!("Output directory: {}", dir.display());
    Ok(dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_input_path_is_invalid_config() {
        let err = validate_input(Path::new("")).unwrap_err();
        assert!(matches!(err, Pdf2TxtError::InvalidConfig(_)));
    }

    #[test]
    fn missing_input_is_file_not_found() {
        let err = validate_input(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, Pdf2TxtError::FileNotFound { .. }));
    }

    #[test]
    fn non_pdf_input_is_rejected() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello world").unwrap();
        let err = validate_input(f.path()).unwrap_err();
        match err {
            Pdf2TxtError::NotAPdf { magic, .. } => assert_eq!(&magic, b"hell"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn short_file_is_not_a_pdf() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"%P").unwrap();
        assert!(matches!(
            validate_input(f.path()),
            Err(Pdf2TxtError::NotAPdf { .. })
        ));
    }

    #[test]
    fn pdf_magic_is_accepted() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"%PDF-1.7\n").unwrap();
        assert_eq!(validate_input(f.path()).unwrap(), f.path());
    }

    #[test]
    fn directory_input_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            validate_input(dir.path()),
            Err(Pdf2TxtError::FileNotFound { .. })
        ));
    }

    #[test]
    fn output_dir_is_created() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a/b");
        prepare_output_dir(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(std::fs::read_dir(&nested).unwrap().count(), 0);
    }

    #[test]
    fn output_dir_that_is_a_file_is_rejected() {
        let f = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            prepare_output_dir(f.path()),
            Err(Pdf2TxtError::OutputDirNotWritable { .. })
        ));
    }

    #[test]
    fn empty_output_dir_is_invalid_config() {
        assert!(matches!(
            prepare_output_dir(Path::new("")),
            Err(Pdf2TxtError::InvalidConfig(_))
        ));
    }
}
