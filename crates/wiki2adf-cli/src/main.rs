//! wiki2adf: CLI tool to convert Jira wiki markup to Atlassian Document Format

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use config::{CONFIG_FILE_NAME, Config};
use wiki2adf_core::{Diagnostics, convert};

#[derive(Parser, Debug)]
#[command(name = "wiki2adf")]
#[command(about = "Convert Jira wiki markup to Atlassian Document Format (ADF) JSON")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
#[command(after_help = "Examples:
  wiki2adf page.txt                  # Convert single file to page-adf.json
  wiki2adf page.txt -o out.json      # Convert to specific output file
  wiki2adf pages/ -o adf/            # Convert directory
  wiki2adf pages/ -o adf/ -j4        # Use 4 parallel jobs
  wiki2adf init                      # Write a sample _wiki2adf.toml")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Input wiki markup file or directory
    #[arg(required = true)]
    input: Option<PathBuf>,

    /// Output file or directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of parallel jobs (defaults to number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Process directories recursively
    #[arg(short, long)]
    recursive: bool,

    /// Write compact JSON instead of pretty-printed JSON
    #[arg(long)]
    compact: bool,

    /// Write a `<stem><suffix>-errors.json` diagnostics log next to each output
    #[arg(long)]
    error_log: bool,

    /// Exit with status 1 when any diagnostic is recorded
    #[arg(long)]
    strict: bool,

    /// Configuration file (defaults to `_wiki2adf.toml` in the input directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only show errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a sample configuration file
    Init {
        /// Directory to write the configuration file to
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Print the configuration JSON schema instead
        #[arg(long)]
        schema: bool,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

/// Settings after merging the configuration file with CLI flags
#[derive(Debug)]
struct Options {
    config: Config,
    pretty: bool,
    error_log: bool,
    strict: bool,
    verbose: bool,
    quiet: bool,
}

impl Options {
    fn new(cli: &Cli, config: Config) -> Self {
        Self {
            pretty: config.pretty() && !cli.compact,
            error_log: cli.error_log || config.error_log(),
            strict: cli.strict || config.strict(),
            verbose: cli.verbose,
            quiet: cli.quiet,
            config,
        }
    }

    /// `<stem><suffix>.<extension>` for an input file
    fn output_file_name(&self, input: &Path) -> String {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();
        let extension = self.config.extension();
        if extension.is_empty() {
            format!("{}{}", stem, self.config.suffix())
        } else {
            format!("{}{}.{}", stem, self.config.suffix(), extension)
        }
    }
}

/// Outcome of converting one file
#[derive(Debug)]
struct FileReport {
    input: PathBuf,
    output: PathBuf,
    diagnostics: Diagnostics,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Returns `Ok(false)` when strict mode rejects the recorded diagnostics
fn run(cli: &Cli) -> Result<bool> {
    if let Some(Command::Init { dir, schema, force }) = &cli.command {
        init(dir, *schema, *force)?;
        return Ok(true);
    }

    let Some(input) = cli.input.as_deref() else {
        anyhow::bail!("No input path given");
    };

    let config = load_config(cli.config.as_deref(), input)?;
    let options = Options::new(cli, config);

    let (reports, failed) = if input.is_file() {
        let report = convert_file(input, cli.output.as_deref(), &options)?;
        if !options.quiet {
            println!("{}", report.output.display());
        }
        (vec![report], 0)
    } else if input.is_dir() {
        convert_directory(
            input,
            cli.output.as_deref(),
            cli.recursive,
            cli.jobs,
            &options,
        )?
    } else {
        anyhow::bail!("Input path does not exist: {}", input.display());
    };

    print_summary(&reports, &options);

    if failed > 0 {
        anyhow::bail!("{} files failed to convert", failed);
    }

    let total: usize = reports.iter().map(|r| r.diagnostics.len()).sum();
    if options.strict && total > 0 {
        warn!("strict mode: {} diagnostics recorded", total);
        return Ok(false);
    }

    Ok(true)
}

/// Write a sample configuration, or print the schema
fn init(dir: &Path, schema: bool, force: bool) -> Result<()> {
    if schema {
        println!("{}", Config::json_schema_string()?);
        return Ok(());
    }

    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let content = Config::sample().to_toml_with_schema()?;
    fs::write(&path, content).with_context(|| format!("Failed to write: {}", path.display()))?;
    println!("{}", path.display());

    Ok(())
}

/// Explicit `--config`, else `_wiki2adf.toml` beside the input, else defaults
fn load_config(explicit: Option<&Path>, input: &Path) -> Result<Config> {
    if let Some(path) = explicit {
        debug!("Using config file: {}", path.display());
        return Config::load(path);
    }

    let dir = if input.is_dir() {
        input
    } else {
        match input.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    };

    match Config::load_from_dir(dir)? {
        Some(config) => {
            debug!("Using config file: {}", dir.join(CONFIG_FILE_NAME).display());
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

/// Convert a single wiki markup file to ADF JSON
fn convert_file(input: &Path, output: Option<&Path>, options: &Options) -> Result<FileReport> {
    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => input.with_file_name(options.output_file_name(input)),
    };

    convert_file_inner(input, &output_path, options)
}

/// Convert a directory of wiki markup files
fn convert_directory(
    input: &Path,
    output: Option<&Path>,
    recursive: bool,
    jobs: Option<usize>,
    options: &Options,
) -> Result<(Vec<FileReport>, usize)> {
    let output_dir = output.unwrap_or(input);

    let files = collect_input_files(input, recursive, &options.config)?;

    if files.is_empty() {
        if !options.quiet {
            eprintln!("No wiki markup files found in {}", input.display());
        }
        return Ok((Vec::new(), 0));
    }

    info!("Found {} files", files.len());

    if let Some(n) = jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let failed = AtomicUsize::new(0);

    let results: Vec<_> = files
        .par_iter()
        .map(|file| {
            let relative = file.strip_prefix(input).unwrap_or(file);
            let output_file = output_dir
                .join(relative)
                .with_file_name(options.output_file_name(file));

            convert_file_inner(file, &output_file, options).map_err(|e| {
                failed.fetch_add(1, Ordering::Relaxed);
                (file.clone(), e)
            })
        })
        .collect();

    let mut reports = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(report) => {
                if !options.quiet {
                    println!("{}", report.output.display());
                }
                reports.push(report);
            }
            Err((file, e)) => eprintln!("Error converting {}: {:#}", file.display(), e),
        }
    }

    let failed_count = failed.load(Ordering::Relaxed);
    if !options.quiet {
        eprintln!(
            "Converted {} files, {} failed",
            reports.len(),
            failed_count
        );
    }

    Ok((reports, failed_count))
}

/// Read, convert and write one file; also writes the error log when enabled
fn convert_file_inner(input: &Path, output: &Path, options: &Options) -> Result<FileReport> {
    debug!("Converting: {} -> {}", input.display(), output.display());

    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read: {}", input.display()))?;

    let conversion = convert(&content);
    let json = if options.pretty {
        conversion.to_json_pretty()
    } else {
        conversion.to_json()
    }
    .context("Failed to serialize ADF document")?;

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(output, json).with_context(|| format!("Failed to write: {}", output.display()))?;

    if options.error_log && !conversion.diagnostics.is_empty() {
        let log_path = error_log_path(output);
        let log = serde_json::to_string_pretty(&conversion.summary())
            .context("Failed to serialize error log")?;
        fs::write(&log_path, log)
            .with_context(|| format!("Failed to write: {}", log_path.display()))?;
        debug!("Wrote error log: {}", log_path.display());
    }

    Ok(FileReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        diagnostics: conversion.diagnostics,
    })
}

/// `out/page-adf.json` -> `out/page-adf-errors.json`
fn error_log_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    output.with_file_name(format!("{stem}-errors.json"))
}

/// Collect input files with a configured extension
fn collect_input_files(dir: &Path, recursive: bool, config: &Config) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in
        fs::read_dir(dir).with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_file() {
            if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                if config.accepts_extension(ext) {
                    files.push(path);
                }
            }
        } else if path.is_dir() && recursive {
            files.extend(collect_input_files(&path, recursive, config)?);
        }
    }

    files.sort();
    Ok(files)
}

/// Print diagnostics grouped by kind to stderr
fn print_summary(reports: &[FileReport], options: &Options) {
    if options.quiet {
        return;
    }

    for report in reports.iter().filter(|r| !r.diagnostics.is_empty()) {
        let summary = report.diagnostics.summary();
        eprintln!(
            "{}: {} diagnostics",
            report.input.display(),
            summary.total_errors
        );
        for (kind, entries) in &summary.errors_by_kind {
            eprintln!("  {}: {}", kind, entries.len());
            if options.verbose {
                for diagnostic in entries {
                    eprintln!("    line {}: {}", diagnostic.line, diagnostic.message);
                }
            }
        }
    }
}
