use anyhow::{Context, Result, bail};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::classify::acceptable_filename;
use crate::cli::{Cli, OutputFormat};
use crate::dispatch::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_ENTRY_SIZE, ScanOptions};
use crate::walk::ExclusionSet;

pub const MAX_DEPTH_ENV: &str = "ECDSA_FINDER_MAX_DEPTH";
pub const MAX_ENTRY_SIZE_ENV: &str = "ECDSA_FINDER_MAX_ENTRY_SIZE";

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub root: PathBuf,
    pub excluded: Vec<PathBuf>,
    pub exclusions: ExclusionSet,
    pub options: ScanOptions,
    pub format: OutputFormat,
}

/// Validates the command line before any scanning starts.
pub fn resolve_config(cli: &Cli) -> Result<ScanConfig> {
    let exclusions = ExclusionSet::new(&cli.exclude)?;
    let root = resolve_root(cli)?;

    let max_depth = resolve_limit(cli.max_depth, MAX_DEPTH_ENV, DEFAULT_MAX_DEPTH)?;
    let max_entry_size =
        resolve_limit(cli.max_entry_size, MAX_ENTRY_SIZE_ENV, DEFAULT_MAX_ENTRY_SIZE)?;

    Ok(ScanConfig {
        root,
        excluded: cli.exclude.clone(),
        exclusions,
        options: ScanOptions {
            quiet: cli.quiet,
            max_depth,
            max_entry_size,
            ..ScanOptions::default()
        },
        format: cli.format,
    })
}

pub fn resolve_root(cli: &Cli) -> Result<PathBuf> {
    let root = cli.root.clone();
    if root.is_dir() {
        return Ok(root);
    }

    let is_archive = root
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(acceptable_filename);
    if root.is_file() && is_archive {
        if !cli.exclude.is_empty() {
            tracing::warn!("--exclude has no effect when scanning a single archive");
        }
        return Ok(root);
    }

    bail!("{} is not a directory or an archive", root.display())
}

/// Flag wins over environment, environment over the built-in default.
fn resolve_limit<T>(flag: Option<T>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_limit(flag, env::var(key).ok(), key, default)
}

fn parse_limit<T>(flag: Option<T>, env_value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if let Some(v) = flag {
        return Ok(v);
    }
    match env_value {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid value for {key}: {raw}")),
        _ => Ok(default),
    }
}
