use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::classify::join_label;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Finding {
    /// Label of the container holding the class; empty for a top-level archive.
    pub path: String,
    pub entry: String,
    pub sha256: String,
}

impl Finding {
    pub fn location(&self) -> String {
        join_label(&self.path, &self.entry)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Failure {
    pub path: String,
    pub message: String,
}

impl Failure {
    /// `<path>: <message>`; a top-level archive has an empty path, so its
    /// lines start with `: `.
    pub fn line(&self) -> String {
        format!("{}: {}", self.path, self.message)
    }
}

/// Where lines go while the scan runs.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Echo {
    /// Findings on stdout, failures on stderr, as they happen.
    Lines,
    /// Record only; the caller renders a summary at the end.
    Silent,
}

/// Collects findings and failures for one scan.
#[derive(Debug)]
pub struct Reporter {
    echo: Echo,
    quiet: bool,
    label: String,
    findings: Vec<Finding>,
    failures: Vec<Failure>,
}

impl Reporter {
    pub fn new(echo: Echo, quiet: bool, label: impl Into<String>) -> Self {
        Self {
            echo,
            quiet,
            label: label.into(),
            findings: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Findings are never suppressed by `quiet`.
    pub fn finding(&mut self, path: &str, entry: &str, content: &[u8]) {
        let finding = Finding {
            path: path.to_string(),
            entry: entry.to_string(),
            sha256: hash_bytes(content),
        };
        if self.echo == Echo::Lines {
            println!("{}", self.finding_line(&finding));
        }
        self.findings.push(finding);
    }

    pub fn failure(&mut self, path: &str, message: impl Into<String>) {
        let failure = Failure {
            path: path.to_string(),
            message: message.into(),
        };
        tracing::debug!(path = %failure.path, message = %failure.message, "scan failure");
        if self.quiet {
            return;
        }
        if self.echo == Echo::Lines {
            eprintln!("{}", failure.line());
        }
        self.failures.push(failure);
    }

    pub fn finding_line(&self, finding: &Finding) -> String {
        format!(
            "{}: potential use of {} - may be vulnerable",
            finding.location(),
            self.label
        )
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    pub fn into_parts(self) -> (Vec<Finding>, Vec<Failure>) {
        (self.findings, self.failures)
    }
}

#[derive(Debug, Serialize)]
pub struct ScanSummary {
    pub root: String,
    pub excluded: Vec<String>,
    pub problem_found: bool,
    pub duration_ms: u64,
    pub findings: Vec<Finding>,
    pub failures: Vec<Failure>,
}

pub fn hash_bytes(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}
