use anyhow::{Context, Result, bail};
use ignore::WalkBuilder;
use memmap2::Mmap;
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::classify::{ContainerKind, classify};
use crate::dispatch::{ScanTarget, Scanner};

/// Absolute directories the walker must not descend into.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    dirs: Arc<HashSet<PathBuf>>,
}

impl ExclusionSet {
    /// Every entry must be an existing directory; paths are canonicalised so
    /// they compare equal to what the walker yields under a canonical root.
    pub fn new(dirs: &[PathBuf]) -> Result<Self> {
        let mut set = HashSet::with_capacity(dirs.len());
        for dir in dirs {
            if !dir.is_dir() {
                bail!("{} is not a directory", dir.display());
            }
            let abs = dir
                .canonicalize()
                .with_context(|| format!("Failed to resolve excluded directory: {}", dir.display()))?;
            set.insert(abs);
        }
        Ok(Self { dirs: Arc::new(set) })
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}

/// Scans `root`, either a directory tree or a single archive.
///
/// Per-file problems are reported through the scanner and never abort the
/// walk. A root that is neither a directory nor an archive is an error.
pub fn run_scanner(root: &Path, exclusions: &ExclusionSet, scanner: &mut Scanner) -> Result<bool> {
    if root.is_dir() {
        return walk_dir(root, exclusions, scanner);
    }

    let kind = root
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(classify);
    match kind {
        Some(kind) if root.is_file() => Ok(scan_file(scanner, root, "", kind)),
        _ => bail!("{} is not a directory or an archive", root.display()),
    }
}

fn walk_dir(root: &Path, exclusions: &ExclusionSet, scanner: &mut Scanner) -> Result<bool> {
    let root = root
        .canonicalize()
        .with_context(|| format!("Failed to resolve scan root: {}", root.display()))?;
    let excluded = exclusions.clone();

    let walker = WalkBuilder::new(&root)
        .hidden(false)
        .ignore(false)
        .parents(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir && entry.depth() > 0 && excluded.contains(entry.path()))
        })
        .build();

    let mut found = false;
    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                scanner.report_failure("", err.to_string());
                continue;
            }
        };
        if entry.file_type().is_none_or(|t| t.is_dir()) {
            continue;
        }
        let Some(kind) = entry.file_name().to_str().and_then(classify) else {
            continue;
        };

        let rel = entry.path().strip_prefix(&root).unwrap_or(entry.path());
        let label = rel.to_string_lossy().replace('\\', "/");
        found |= scan_file(scanner, entry.path(), &label, kind);
    }

    Ok(found)
}

fn scan_file(scanner: &mut Scanner, path: &Path, label: &str, kind: ContainerKind) -> bool {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            scanner.report_failure(label, format!("{}: {err}", path.display()));
            return false;
        }
    };
    // SAFETY: The file is opened read-only and outlives the mapping, which is
    // dropped at the end of this function.
    let mmap = match unsafe { Mmap::map(&file) } {
        Ok(mmap) => mmap,
        Err(err) => {
            scanner.report_failure(label, format!("mmap failed: {err}"));
            return false;
        }
    };

    scanner.scan_as(kind, ScanTarget::new(label, &mmap[..], 0))
}
