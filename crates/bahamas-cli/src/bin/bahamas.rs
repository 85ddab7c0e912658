//! BAHAMAS CLI - software failure probability and CCCG generation
//!
//! Usage:
//!   bahamas -i config.toml                     # Run every configured analysis
//!   bahamas -i config.toml -o summary.csv      # Choose the BBN summary file
//!   bahamas -i config.toml --format json       # Print the report as JSON

use std::path::PathBuf;
use std::process;

use bahamas_core::workflow::{BbnReport, CcfReport};
use bahamas_core::{Workflow, WorkflowOutputs, WorkflowReport};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bahamas")]
#[command(version)]
#[command(about = "BAHAMAS - software failure probability and common cause component grouping")]
#[command(
    long_about = "Run the BBN software failure analysis and/or CCCG generation described by a TOML configuration"
)]
struct Cli {
    /// Input TOML configuration
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// BBN summary CSV
    #[arg(short, long, default_value = "output.csv", value_name = "FILE")]
    output: PathBuf,

    /// Directory for the CCCG view files
    #[arg(long, default_value = ".", value_name = "DIR")]
    cccg_dir: PathBuf,

    /// Report format: summary or json
    #[arg(long, default_value = "summary", value_name = "FORMAT")]
    format: String,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let workflow = match Workflow::from_path(&cli.input) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Configuration error in '{}': {}", cli.input.display(), e);
            process::exit(1);
        }
    };

    let outputs = WorkflowOutputs {
        bbn_summary: Some(cli.output.clone()),
        cccg_dir: cli.cccg_dir.clone(),
    };
    let report = match workflow.run(&outputs) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error running '{}': {}", cli.input.display(), e);
            process::exit(1);
        }
    };

    match cli.format.as_str() {
        "json" => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing to JSON: {}", e);
                process::exit(1);
            }
        },
        "summary" => print_summary(&report),
        other => {
            eprintln!("Unknown format '{}', expected summary or json", other);
            process::exit(1);
        }
    }
}

fn print_summary(report: &WorkflowReport) {
    if let Some(bbn) = &report.bbn {
        print_bbn(bbn);
    }
    if let Some(ccf) = &report.ccf {
        if report.bbn.is_some() {
            println!();
        }
        print_ccf(ccf);
    }
}

fn print_bbn(bbn: &BbnReport) {
    println!(
        "✓ BBN ({} analysis, {} samples, seed {})\n",
        bbn.analysis, bbn.num_samples, bbn.seed
    );
    print!("{}", bbn.summary);
    if let Some(path) = &bbn.summary_path {
        println!("\nSummary written to {}", path.display());
    }
}

fn print_ccf(ccf: &CcfReport) {
    println!("✓ CCCG generation\n");
    for (view, count) in &ccf.group_counts {
        println!("  {:<8} {} groups", view, count);
    }
    if !ccf.files.is_empty() {
        println!("\nFiles ({}):", ccf.files.len());
        for path in &ccf.files {
            println!("  {}", path.display());
        }
    }
}
