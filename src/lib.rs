//! # ecdsa-finder
//!
//! Finds Java class files that request ECDSA signature verification, the API
//! affected by CVE-2022-21449, inside directory trees and arbitrarily nested
//! archives. Nothing is extracted to disk.
//!
//! ## Architecture
//!
//! - **matcher**: Literal marker search over raw class bytes
//! - **classify**: Suffix rules for containers and class members
//! - **jar**: Zip-family decoder (jar, war, ear, sar, par, zip, apk)
//! - **tarball**: Tar-family decoder with transparent gzip
//! - **dispatch**: Recursive dispatcher, depth guard and verdict folding
//! - **walk**: Directory walk with exclusions, or a single top-level archive
//! - **report**: Finding and failure records, text and JSON output
//! - **error**: Recoverable failure taxonomy
//! - **config**: Validation of command-line input into a scan configuration
//! - **cli**: Command-line definitions

pub mod classify;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod jar;
pub mod matcher;
pub mod report;
pub mod tarball;
pub mod walk;
