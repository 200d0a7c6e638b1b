use anyhow::Result;
use clap::{CommandFactory, Parser};
use ecdsa_finder::cli::{Cli, OutputFormat};
use ecdsa_finder::config::{ScanConfig, resolve_config};
use ecdsa_finder::dispatch::Scanner;
use ecdsa_finder::report::{Echo, Reporter, ScanSummary};
use ecdsa_finder::walk::run_scanner;
use std::ffi::OsString;
use std::process::ExitCode;
use std::time::Instant;
use tracing::Level;
use tracing_subscriber::EnvFilter;

const EXIT_FOUND: u8 = 1;
/// Usage and configuration errors report nothing found. Clap's own parse
/// errors keep clap's status.
const EXIT_USAGE: u8 = 0;

fn main() -> ExitCode {
    let cli = parse_cli();
    init_tracing(cli.verbose);

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(err) => return usage_error(&err),
    };

    match scan(&config) {
        Ok(true) => ExitCode::from(EXIT_FOUND),
        Ok(false) => ExitCode::SUCCESS,
        Err(err) => usage_error(&err),
    }
}

fn parse_cli() -> Cli {
    let args: Vec<OsString> = std::env::args_os().collect();
    Cli::parse_from(rewrite_legacy_args(args))
}

/// Accepts the historical single-dash spellings `-quiet` and `-exclude`.
fn rewrite_legacy_args(mut args: Vec<OsString>) -> Vec<OsString> {
    for arg in args.iter_mut().skip(1) {
        if *arg == "--" {
            break;
        }
        if *arg == "-quiet" {
            *arg = OsString::from("--quiet");
        } else if *arg == "-exclude" {
            *arg = OsString::from("--exclude");
        }
    }
    args
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn usage_error(err: &anyhow::Error) -> ExitCode {
    eprintln!("{err:#}");
    eprintln!("{}", Cli::command().render_usage());
    ExitCode::from(EXIT_USAGE)
}

fn scan(config: &ScanConfig) -> Result<bool> {
    let start = Instant::now();
    let echo = match config.format {
        OutputFormat::Text => Echo::Lines,
        OutputFormat::Json => Echo::Silent,
    };

    if echo == Echo::Lines {
        println!("Scanning {}", config.root.display());
        if !config.excluded.is_empty() {
            let excluded: Vec<String> = config
                .excluded
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            println!("Excluded: {}", excluded.join(", "));
        }
    }

    let reporter = Reporter::new(echo, config.options.quiet, config.options.marker.label());
    let mut scanner = Scanner::new(config.options.clone(), reporter);
    let problem_found = run_scanner(&config.root, &config.exclusions, &mut scanner)?;
    tracing::info!(problem_found, elapsed_ms = start.elapsed().as_millis() as u64, "scan finished");

    if config.format == OutputFormat::Json {
        let (findings, failures) = scanner.into_reporter().into_parts();
        let summary = ScanSummary {
            root: config.root.to_string_lossy().to_string(),
            excluded: config
                .excluded
                .iter()
                .map(|p| p.to_string_lossy().to_string())
                .collect(),
            problem_found,
            duration_ms: start.elapsed().as_millis() as u64,
            findings,
            failures,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(problem_found)
}
