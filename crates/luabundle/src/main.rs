use std::{
    io::Write,
    path::PathBuf,
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{LevelFilter, error};
use luabundle::{
    BundleRequest, Bundler,
    config::{Config, OutputMode},
    scanner,
};

#[derive(Parser, Debug)]
#[command(name = "luabundle", version, about = "Inline required Lua functions into a single file")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (defaults to ./luabundle.toml, then the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan a source tree and write its dependency index
    Index {
        /// Source tree to scan
        root: PathBuf,

        /// Index file to write
        #[arg(short, long, default_value = "dependencies.json")]
        output: PathBuf,
    },
    /// Bundle one target module with the functions it references
    Bundle {
        /// Source tree root
        #[arg(long)]
        root: PathBuf,

        /// Directory of the target, relative to the root
        #[arg(long, default_value = ".")]
        sub_dir: PathBuf,

        /// Target file name
        #[arg(long)]
        target: String,

        /// Dependency index produced by `luabundle index`
        #[arg(long, default_value = "dependencies.json")]
        index: PathBuf,

        /// Replace the output file instead of appending to it
        #[arg(long)]
        overwrite: bool,

        /// Fail when any reference could not be inlined
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Command::Index { root, output } => {
            let report = scanner::scan(&root);
            report.index.save(&output)?;
            writeln!(
                stdout,
                "Generated dependency index with {} files ({} scanned, {} skipped, {} name collisions) -> {}",
                report.index.len(),
                report.files_scanned,
                report.skipped.len(),
                report.collisions.len(),
                output.display()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Bundle {
            root,
            sub_dir,
            target,
            index,
            overwrite,
            strict,
        } => {
            let mut config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
            if overwrite {
                config.output_mode = OutputMode::Overwrite;
            }

            let request = BundleRequest {
                root,
                sub_dir,
                target,
                index_path: index,
            };
            let outcome = Bundler::new(config).bundle(&request)?;

            writeln!(
                stdout,
                "Bundled {} functions into {}",
                outcome.bundle.functions.len(),
                outcome.output_path.display()
            )?;
            for reference in &outcome.unresolved {
                writeln!(stdout, "  unresolved: {reference}")?;
            }

            if strict && !outcome.is_complete() {
                error!(
                    "{} references could not be inlined",
                    outcome.unresolved.len()
                );
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
