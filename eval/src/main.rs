//! Sabot evaluation CLI - condense benchmark results and render tables
//!
//! # Commands
//!
//! ```bash
//! sabot-eval aggregate results.csv out/run 20     # Raw CSV → condensed CSVs
//! sabot-eval render out/run paper/table           # Condensed CSVs → _bw.tex, _rt.tex
//! sabot-eval inspect results.csv                  # Experiment groups as JSON
//! ```

use clap::{Parser, Subcommand};
use sabot_eval::logs::{log_success, set_quiet};
use sabot_eval::render::{DEFAULT_AUTH_MACRO, DEFAULT_NOAUTH_MACRO};
use sabot_eval::{aggregate, inspect_json, render, AggregateOptions, RenderOptions};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sabot-eval")]
#[command(about = "Aggregate Sabot benchmark measurements and render LaTeX tables", long_about = None)]
struct Cli {
    /// Suppress progress output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Condense a raw benchmark CSV into per-experiment CSVs
    Aggregate {
        /// Raw CSV written by the benchmark driver
        input: PathBuf,

        /// Prefix for the condensed CSVs (`<prefix>_BW_NoAuth.csv`, ...)
        output_prefix: PathBuf,

        /// Keep rows with rate <= REPETITIONS - 1
        repetitions: u32,

        /// Also write the single-client round-trip tables (rate 1)
        #[arg(long)]
        single_client: bool,
    },

    /// Render condensed CSVs into the bandwidth and round-trip tables
    Render {
        /// Prefix the condensed CSVs were written under
        input_prefix: PathBuf,

        /// Prefix for `<prefix>_bw.tex` and `<prefix>_rt.tex`
        output_prefix: PathBuf,

        /// LaTeX macro naming the unauthenticated protocol
        #[arg(long, env = "SABOT_NOAUTH_MACRO", default_value = DEFAULT_NOAUTH_MACRO)]
        noauth_macro: String,

        /// LaTeX macro naming the authenticated protocol
        #[arg(long, env = "SABOT_AUTH_MACRO", default_value = DEFAULT_AUTH_MACRO)]
        auth_macro: String,
    },

    /// Print every experiment group of a raw CSV as JSON
    Inspect {
        /// Raw CSV written by the benchmark driver
        input: PathBuf,

        /// Apply the repetition filter first
        #[arg(short, long)]
        repetitions: Option<u32>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    set_quiet(cli.quiet);

    let result = match cli.command {
        Commands::Aggregate {
            input,
            output_prefix,
            repetitions,
            single_client,
        } => cmd_aggregate(&input, &output_prefix, repetitions, single_client),

        Commands::Render {
            input_prefix,
            output_prefix,
            noauth_macro,
            auth_macro,
        } => cmd_render(&input_prefix, &output_prefix, noauth_macro, auth_macro),

        Commands::Inspect {
            input,
            repetitions,
            output,
        } => cmd_inspect(&input, repetitions, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_aggregate(
    input: &Path,
    output_prefix: &Path,
    repetitions: u32,
    single_client: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = AggregateOptions {
        repetitions,
        write_single_client: single_client,
    };
    let report = aggregate(input, output_prefix, &options)?;

    log_success(format!(
        "✨ Done: {} of {} rows kept, {} files written",
        report.kept_rows,
        report.input_rows,
        report.written.len()
    ));
    Ok(())
}

fn cmd_render(
    input_prefix: &Path,
    output_prefix: &Path,
    noauth_macro: String,
    auth_macro: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = RenderOptions {
        noauth_macro,
        auth_macro,
    };
    let report = render(input_prefix, output_prefix, &options)?;

    log_success(format!(
        "✨ Done: {} and {}",
        report.bandwidth.display(),
        report.latency.display()
    ));
    Ok(())
}

fn cmd_inspect(
    input: &Path,
    repetitions: Option<u32>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = inspect_json(input, repetitions)?;
    write_output(&json, output)?;
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            log_success(format!("💾 Output written to: {}", p.display()));
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
