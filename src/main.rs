use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use citylist::config::PipelineOptions;
use citylist::pipeline;

/// Merge city lists from a directory of Avro, JSON, CSV/DAT and Parquet files
#[derive(Parser, Debug)]
#[command(name = "citylist")]
#[command(version, about, long_about = None)]
struct Cli {
    /// The location of the files to process
    #[arg(short = 'i', long = "input-path")]
    input: PathBuf,

    /// Where to write the combined report (defaults to the working directory)
    #[arg(short = 'o', long = "output-path")]
    output: Option<PathBuf>,

    /// Where to write the file error log (defaults to the working directory)
    #[arg(short = 'e', long = "error-log")]
    error: Option<PathBuf>,

    /// Also print skipped and merged files to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let script_start = Instant::now();

    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    println!("Script started");
    let cli = Cli::parse();

    let options = PipelineOptions {
        input_dir: cli.input,
        output_dir: cli.output,
        error_dir: cli.error,
        echo_events: cli.verbose,
        ..Default::default()
    };

    let report = pipeline::run(&options).context("pipeline run failed")?;

    println!("Load time: {:.4} seconds", report.load_elapsed.as_secs_f64());
    print!("{}", report.summary);
    println!("Runtime: {:.4} seconds", script_start.elapsed().as_secs_f64());
    println!("Script ended");
    Ok(())
}
