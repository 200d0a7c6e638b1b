//! Recursive dispatch of named byte streams.
//!
//! A [`ScanTarget`] is classified by its path suffix and handed to the matching
//! container decoder. Decoders call back into [`Scanner::scan`] for nested
//! containers, so the recursion is `scan -> decoder -> scan -> ...` with the
//! verdict OR-ed on the way back up.

use std::io::Read;

use crate::classify::{ContainerKind, classify};
use crate::error::{Aborted, ScanError};
use crate::jar;
use crate::matcher::Marker;
use crate::report::Reporter;
use crate::tarball;

pub const DEFAULT_MAX_DEPTH: usize = 32;
pub const DEFAULT_MAX_ENTRY_SIZE: u64 = 512 * 1024 * 1024;
pub const DEFAULT_MAX_HELD_BYTES: u64 = 2 * 1024 * 1024 * 1024;
const PREALLOC_CAP: u64 = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Suppress failure lines. Findings are always reported.
    pub quiet: bool,
    /// Deepest container nesting that is still opened; top-level files are depth 0.
    pub max_depth: usize,
    /// Largest member, in bytes, that is read into memory.
    pub max_entry_size: u64,
    /// Cap on nested container bytes buffered at once along one recursion path.
    pub max_held_bytes: u64,
    pub marker: Marker,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            quiet: false,
            max_depth: DEFAULT_MAX_DEPTH,
            max_entry_size: DEFAULT_MAX_ENTRY_SIZE,
            max_held_bytes: DEFAULT_MAX_HELD_BYTES,
            marker: Marker::default(),
        }
    }
}

/// A named, fully readable byte stream.
///
/// Top-level files arrive memory-mapped; nested members are buffered by the
/// decoder that found them. Either way the bytes are borrowed for the duration
/// of one `scan` call only.
#[derive(Debug, Clone, Copy)]
pub struct ScanTarget<'a> {
    pub path: &'a str,
    pub bytes: &'a [u8],
    pub depth: usize,
}

impl<'a> ScanTarget<'a> {
    pub fn new(path: &'a str, bytes: &'a [u8], depth: usize) -> Self {
        Self { path, bytes, depth }
    }
}

#[derive(Debug)]
pub struct Scanner {
    options: ScanOptions,
    reporter: Reporter,
    held: u64,
}

impl Scanner {
    pub fn new(options: ScanOptions, reporter: Reporter) -> Self {
        Self {
            options,
            reporter,
            held: 0,
        }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    pub fn into_reporter(self) -> Reporter {
        self.reporter
    }

    /// Largest member a decoder may buffer right now.
    pub fn entry_limit(&self) -> u64 {
        let remaining = self.options.max_held_bytes.saturating_sub(self.held);
        self.options.max_entry_size.min(remaining)
    }

    pub fn report_failure(&mut self, path: &str, message: impl Into<String>) {
        self.reporter.failure(path, message);
    }

    /// Scans `target`, classifying it by its path suffix.
    pub fn scan(&mut self, target: ScanTarget<'_>) -> bool {
        match classify(target.path) {
            Some(kind) => self.scan_as(kind, target),
            None => false,
        }
    }

    /// Scans a nested container whose bytes were buffered by its parent decoder.
    ///
    /// The buffer counts against `max_held_bytes` until the scan returns.
    pub fn scan_buffered(&mut self, target: ScanTarget<'_>) -> bool {
        let len = target.bytes.len() as u64;
        self.held = self.held.saturating_add(len);
        let found = self.scan(target);
        self.held = self.held.saturating_sub(len);
        found
    }

    /// Scans `target` as a container of the given family, ignoring its name.
    ///
    /// Used for the top-level archive whose label is empty.
    pub fn scan_as(&mut self, kind: ContainerKind, target: ScanTarget<'_>) -> bool {
        if target.depth > self.options.max_depth {
            let err = ScanError::DepthExceeded(self.options.max_depth);
            self.reporter.failure(target.path, err.to_string());
            return false;
        }

        tracing::debug!(path = target.path, depth = target.depth, ?kind, "opening container");
        let result = match kind {
            ContainerKind::Zip => jar::scan_zip(self, target),
            ContainerKind::Tar => tarball::scan_tar(self, target),
        };

        match result {
            Ok(found) => found,
            Err(Aborted { error, found }) => {
                self.reporter.failure(target.path, error.to_string());
                found && kind.keeps_partial_findings()
            }
        }
    }

    /// Tests the raw bytes of one class member against the marker.
    pub fn examine_class(&mut self, path: &str, entry: &str, content: &[u8]) -> bool {
        tracing::trace!(path, entry, len = content.len(), "examining class");
        if !self.options.marker.is_match(content) {
            return false;
        }
        self.reporter.finding(path, entry, content);
        true
    }
}

/// Reads a whole member into memory, refusing anything over `limit` bytes.
pub(crate) fn read_entry<R: Read>(
    reader: R,
    name: &str,
    declared_size: u64,
    limit: u64,
    classify_err: fn(std::io::Error) -> ScanError,
) -> Result<Vec<u8>, ScanError> {
    let too_large = || ScanError::EntryTooLarge {
        name: name.to_string(),
        limit,
    };
    if declared_size > limit {
        return Err(too_large());
    }

    // Declared sizes are untrusted; grow past this as real bytes arrive.
    let capacity = usize::try_from(declared_size.min(PREALLOC_CAP)).unwrap_or(0);
    let mut buf = Vec::with_capacity(capacity);
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut buf)
        .map_err(classify_err)?;
    if buf.len() as u64 > limit {
        return Err(too_large());
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Echo;
    use std::io::{Cursor, Write};
    use zip::write::{FileOptions, ZipWriter};

    fn scanner(options: ScanOptions) -> Scanner {
        Scanner::new(options, Reporter::new(Echo::Silent, false, "ECDSA"))
    }

    fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn irrelevant_suffix_is_never_opened() {
        let mut scanner = scanner(ScanOptions::default());
        let target = ScanTarget::new("notes.txt", b"withECDSA", 0);
        assert!(!scanner.scan(target));
        assert!(scanner.reporter().failures().is_empty());
    }

    #[test]
    fn class_suffix_is_not_a_container() {
        let mut scanner = scanner(ScanOptions::default());
        assert!(!scanner.scan(ScanTarget::new("Foo.class", b"withECDSA", 0)));
        assert!(scanner.reporter().findings().is_empty());
    }

    #[test]
    fn nested_jars_report_concatenated_path() {
        let inner = zip_bytes(&[("org/example/Foo.class", b"..SHA256withECDSA..")]);
        let outer = zip_bytes(&[("lib/inner.jar", &inner)]);

        let mut scanner = scanner(ScanOptions::default());
        assert!(scanner.scan(ScanTarget::new("app.war", &outer, 0)));

        let findings = scanner.reporter().findings();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].path, "app.war/lib/inner.jar");
        assert_eq!(
            findings[0].location(),
            "app.war/lib/inner.jar/org/example/Foo.class"
        );
    }

    #[test]
    fn depth_limit_stops_recursion_without_failing_siblings() {
        let deepest = zip_bytes(&[("Deep.class", b"withECDSA")]);
        let middle = zip_bytes(&[("deep.jar", &deepest)]);
        let outer = zip_bytes(&[("middle.jar", &middle), ("Top.class", b"withECDSA")]);

        let mut scanner = scanner(ScanOptions {
            max_depth: 1,
            ..ScanOptions::default()
        });
        assert!(scanner.scan(ScanTarget::new("outer.jar", &outer, 0)));

        let reporter = scanner.reporter();
        assert_eq!(reporter.findings().len(), 1);
        assert_eq!(reporter.findings()[0].entry, "Top.class");
        assert_eq!(reporter.failures().len(), 1);
        assert_eq!(reporter.failures()[0].path, "outer.jar/middle.jar/deep.jar");
        assert_eq!(reporter.failures()[0].message, "nesting depth exceeds 1");
    }

    #[test]
    fn self_nesting_chain_is_cut_off() {
        let mut bytes = zip_bytes(&[("Leaf.class", b"withECDSA")]);
        for _ in 0..10 {
            bytes = zip_bytes(&[("again.jar", &bytes)]);
        }

        let mut scanner = scanner(ScanOptions {
            max_depth: 4,
            ..ScanOptions::default()
        });
        assert!(!scanner.scan(ScanTarget::new("bomb.jar", &bytes, 0)));
        assert_eq!(scanner.reporter().failures().len(), 1);
    }

    #[test]
    fn buffered_bytes_are_bounded_across_nesting_levels() {
        let deepest = zip_bytes(&[("Deep.class", b"withECDSA")]);
        let middle = zip_bytes(&[("deep.jar", &deepest)]);
        let outer = zip_bytes(&[("middle.jar", &middle), ("Top.class", b"withECDSA")]);

        let budget = (middle.len() + deepest.len() - 1) as u64;
        let mut scanner = scanner(ScanOptions {
            max_held_bytes: budget,
            ..ScanOptions::default()
        });
        assert!(scanner.scan(ScanTarget::new("outer.jar", &outer, 0)));

        let reporter = scanner.reporter();
        assert_eq!(reporter.findings().len(), 1);
        assert_eq!(reporter.findings()[0].entry, "Top.class");
        assert_eq!(reporter.failures().len(), 1);
        assert_eq!(reporter.failures()[0].path, "outer.jar/middle.jar/deep.jar");
        assert_eq!(scanner.entry_limit(), budget);
    }

    #[test]
    fn read_entry_enforces_limit() {
        let data = vec![0u8; 16];
        let ok = read_entry(&data[..], "x", 16, 16, ScanError::Io).unwrap();
        assert_eq!(ok.len(), 16);

        let err = read_entry(&data[..], "x", 0, 8, ScanError::Io).unwrap_err();
        assert!(matches!(err, ScanError::EntryTooLarge { limit: 8, .. }));

        let err = read_entry(&data[..], "x", 32, 8, ScanError::Io).unwrap_err();
        assert!(matches!(err, ScanError::EntryTooLarge { .. }));
    }
}
