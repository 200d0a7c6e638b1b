//! Tar-family decoder (`.tar`, `.tar.gz`).
//!
//! Compression is detected from the leading bytes, not the name, so a plain
//! tar called `.tar.gz` still opens. Members are read strictly in stream order.

use flate2::read::MultiGzDecoder;
use std::io::{self, Read};
use tar::Archive;

use crate::classify::{acceptable_filename, is_scannable_class, join_label};
use crate::dispatch::{ScanTarget, Scanner, read_entry};
use crate::error::{Aborted, ContainerResult, ScanError};

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const BZIP2_MAGIC: &[u8] = b"BZh";
const XZ_MAGIC: &[u8] = &[0xfd, b'7', b'z', b'X', b'Z', 0x00];
const ZSTD_MAGIC: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Compression {
    None,
    Gzip,
}

fn detect_compression(bytes: &[u8]) -> Result<Compression, ScanError> {
    if bytes.starts_with(GZIP_MAGIC) {
        return Ok(Compression::Gzip);
    }
    let unsupported = [("bzip2", BZIP2_MAGIC), ("xz", XZ_MAGIC), ("zstd", ZSTD_MAGIC)];
    for (name, magic) in unsupported {
        if bytes.starts_with(magic) {
            return Err(ScanError::Unsupported(format!("{name} compression")));
        }
    }
    Ok(Compression::None)
}

fn compressed_read_err(err: io::Error) -> ScanError {
    ScanError::from_tar_read(err, true)
}

fn plain_read_err(err: io::Error) -> ScanError {
    ScanError::from_tar_read(err, false)
}

/// Walks every member of an in-memory tar stream.
///
/// Members whose name contains `../` are skipped unread. Names that are not
/// UTF-8 are decoded lossily. Regular files named like a container are
/// buffered and dispatched; class files are matched.
pub fn scan_tar(scanner: &mut Scanner, target: ScanTarget<'_>) -> ContainerResult {
    let compression = detect_compression(target.bytes).map_err(|e| Aborted::new(e, false))?;
    match compression {
        Compression::Gzip => {
            scan_members(scanner, target, MultiGzDecoder::new(target.bytes), true)
        }
        Compression::None => scan_members(scanner, target, target.bytes, false),
    }
}

fn scan_members<R: Read>(
    scanner: &mut Scanner,
    target: ScanTarget<'_>,
    reader: R,
    compressed: bool,
) -> ContainerResult {
    let classify_err: fn(io::Error) -> ScanError = if compressed {
        compressed_read_err
    } else {
        plain_read_err
    };
    let mut archive = Archive::new(reader);
    let mut found = false;

    let entries = archive
        .entries()
        .map_err(|e| Aborted::new(classify_err(e), false))?;
    for entry in entries {
        let entry = entry.map_err(|e| Aborted::new(classify_err(e), found))?;

        let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        if name.contains("../") {
            tracing::debug!(path = target.path, member = %name, "skipping parent-traversal member");
            continue;
        }
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let container = acceptable_filename(&name);
        let class = !container && is_scannable_class(&name);
        if !container && !class {
            continue;
        }

        let size = entry.size();
        let limit = scanner.entry_limit();
        if container {
            let label = join_label(target.path, &name);
            match read_entry(entry, &name, size, limit, classify_err) {
                Ok(nested) => {
                    let nested = ScanTarget::new(&label, &nested, target.depth + 1);
                    found |= scanner.scan_buffered(nested);
                }
                Err(err) => scanner.report_failure(&label, err.to_string()),
            }
        } else {
            let content = read_entry(entry, &name, size, limit, classify_err)
                .map_err(|e| Aborted::new(e, found))?;
            found |= scanner.examine_class(target.path, &name, &content);
        }
    }

    Ok(found)
}
