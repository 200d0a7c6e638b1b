//! Zip-family decoder (jar, war, ear, sar, par, zip, apk).

use std::io::Cursor;
use zip::ZipArchive;

use crate::classify::{acceptable_filename, is_scannable_class, join_label};
use crate::dispatch::{ScanTarget, Scanner, read_entry};
use crate::error::{Aborted, ContainerResult, ScanError};

/// Walks every entry of an in-memory zip archive.
///
/// Nested containers are buffered and handed back to the scanner; a nested
/// member that cannot be read is reported under its own label and skipped.
/// Any other structural, codec or read error ends this archive, keeping
/// whatever was found before it.
pub fn scan_zip(scanner: &mut Scanner, target: ScanTarget<'_>) -> ContainerResult {
    let mut archive =
        ZipArchive::new(Cursor::new(target.bytes)).map_err(|e| Aborted::new(e, false))?;
    let mut found = false;

    for i in 0..archive.len() {
        let entry = archive.by_index(i).map_err(|e| Aborted::new(e, found))?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let size = entry.size();
        let limit = scanner.entry_limit();

        if acceptable_filename(&name) {
            let label = join_label(target.path, &name);
            match read_entry(entry, &name, size, limit, ScanError::from_compressed_read) {
                Ok(nested) => {
                    let nested = ScanTarget::new(&label, &nested, target.depth + 1);
                    found |= scanner.scan_buffered(nested);
                }
                Err(err) => scanner.report_failure(&label, err.to_string()),
            }
            continue;
        }

        if is_scannable_class(&name) {
            let content = read_entry(entry, &name, size, limit, ScanError::from_compressed_read)
                .map_err(|e| Aborted::new(e, found))?;
            found |= scanner.examine_class(target.path, &name, &content);
        }
    }

    Ok(found)
}
