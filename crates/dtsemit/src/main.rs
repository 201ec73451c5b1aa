use std::{env, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use dtsemit::{
    Config, OutputOptions, TscEngine,
    driver::BuildDriver,
    filter::FilterSpec,
    paths::resolve_against,
    sink::{DryRunSink, FsSink},
};
use log::{LevelFilter, error, info};

/// Emit TypeScript declaration files for a Vue or TypeScript project
#[derive(Parser, Debug)]
#[command(name = "dtsemit", version, about, long_about = None)]
struct Cli {
    /// Source files or directories to treat as the bundle's modules
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Project root; relative identifiers and emitted paths are resolved against it
    #[arg(long)]
    root: Option<PathBuf>,

    /// Output directory for declaration files
    #[arg(short = 'o', long, conflicts_with = "file")]
    out_dir: Option<PathBuf>,

    /// Output bundle file; declarations go next to it
    #[arg(long)]
    file: Option<PathBuf>,

    /// Include glob (repeatable); replaces the configured include list
    #[arg(long = "include")]
    include: Vec<String>,

    /// Exclude glob (repeatable); replaces the configured exclude list
    #[arg(long = "exclude")]
    exclude: Vec<String>,

    /// Emit `X.d.ts` instead of `X.vue.d.ts` and drop `.vue` from specifiers
    #[arg(long)]
    clean_vue_file_name: bool,

    /// Explicit configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report what would be written without touching the filesystem
    #[arg(long)]
    dry_run: bool,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref(), cli.root.as_deref())?;
    if !cli.include.is_empty() {
        config.include = FilterSpec::from(cli.include);
    }
    if !cli.exclude.is_empty() {
        config.exclude = FilterSpec::from(cli.exclude);
    }
    if cli.clean_vue_file_name {
        config.clean_vue_file_name = true;
    }

    let output = match (cli.file, cli.out_dir) {
        (Some(file), _) => OutputOptions::file(file),
        (None, Some(dir)) => OutputOptions::dir(dir),
        (None, None) => bail!("either --out-dir or --file must be given"),
    };

    // Inputs name files relative to where the command runs, not to the root
    let cwd = env::current_dir().context("failed to determine the working directory")?;
    let inputs: Vec<PathBuf> = cli
        .inputs
        .iter()
        .map(|input| resolve_against(&cwd, input))
        .collect();

    let driver = BuildDriver::<TscEngine>::new(config)?;
    let summary = if cli.dry_run {
        info!("Dry run: nothing will be written");
        driver.run(&inputs, &output, &mut DryRunSink::default())?
    } else {
        driver.run(&inputs, &output, &mut FsSink)?
    };

    if summary.diagnostics > 0 {
        info!(
            "{} compiler diagnostics reported; declarations were still emitted",
            summary.diagnostics
        );
    }
    Ok(())
}
