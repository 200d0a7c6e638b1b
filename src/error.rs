//! Recoverable scan failures.
//!
//! Everything at or below a single container is expressed as a [`ScanError`].
//! Decoders never panic or unwind on bad input; they hand an [`Aborted`] back to
//! the dispatcher, which reports it and folds it into the verdict.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    /// Bad zip or tar structure.
    #[error("malformed archive: {0}")]
    Malformed(String),

    /// Decompression failure inside a member or stream.
    #[error("decompression failed: {0}")]
    Codec(String),

    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("nesting depth exceeds {0}")]
    DepthExceeded(usize),

    #[error("entry {name} is larger than {limit} bytes")]
    EntryTooLarge { name: String, limit: u64 },
}

impl ScanError {
    /// Classifies an I/O error raised while reading a compressed stream.
    ///
    /// `flate2` and the zip reader surface corrupt deflate data as
    /// `InvalidData`/`InvalidInput`; anything else is a genuine read failure.
    pub fn from_compressed_read(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput => {
                ScanError::Codec(err.to_string())
            }
            _ => ScanError::Io(err),
        }
    }

    /// Classifies an I/O error raised by the tar reader.
    ///
    /// The tar crate reports header problems (checksum mismatch, bad numeric
    /// fields, truncated blocks) as plain I/O errors with kind `Other` or
    /// `UnexpectedEof`.
    pub fn from_tar_read(err: io::Error, compressed: bool) -> Self {
        match err.kind() {
            io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput if compressed => {
                ScanError::Codec(err.to_string())
            }
            io::ErrorKind::Other | io::ErrorKind::UnexpectedEof | io::ErrorKind::InvalidData => {
                ScanError::Malformed(err.to_string())
            }
            _ => ScanError::Io(err),
        }
    }
}

impl From<zip::result::ZipError> for ScanError {
    fn from(err: zip::result::ZipError) -> Self {
        use zip::result::ZipError;
        match err {
            ZipError::Io(e) => ScanError::from_compressed_read(e),
            ZipError::InvalidArchive(msg) => ScanError::Malformed(msg.to_string()),
            ZipError::UnsupportedArchive(msg) => ScanError::Unsupported(msg.to_string()),
            ZipError::FileNotFound => ScanError::Malformed("entry listed but not found".to_string()),
        }
    }
}

/// A container that stopped part-way through.
///
/// `found` holds the verdict accumulated from members scanned before the
/// failure; whether it survives is decided per container family.
#[derive(Debug)]
pub struct Aborted {
    pub error: ScanError,
    pub found: bool,
}

impl Aborted {
    pub fn new(error: impl Into<ScanError>, found: bool) -> Self {
        Self {
            error: error.into(),
            found,
        }
    }
}

pub type ContainerResult = std::result::Result<bool, Aborted>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_deflate_maps_to_codec() {
        let err = io::Error::new(io::ErrorKind::InvalidInput, "corrupt deflate stream");
        assert!(matches!(
            ScanError::from_compressed_read(err),
            ScanError::Codec(_)
        ));
    }

    #[test]
    fn tar_header_errors_map_to_malformed() {
        let err = io::Error::other("archive header checksum mismatch");
        let mapped = ScanError::from_tar_read(err, false);
        assert!(matches!(mapped, ScanError::Malformed(_)));
        assert!(mapped.to_string().contains("checksum mismatch"));
    }

    #[test]
    fn zip_invalid_archive_maps_to_malformed() {
        let err = zip::result::ZipError::InvalidArchive("Invalid zip header");
        assert_eq!(
            ScanError::from(err).to_string(),
            "malformed archive: Invalid zip header"
        );
    }
}
