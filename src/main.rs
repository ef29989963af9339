//! Cohortscope entrypoint: dispatches to the segmentation or correlation
//! pipeline and maps failures to exit codes.

use std::process::ExitCode;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use cohortscope::cli::{Cli, Command};
use cohortscope::{report, run_correlation, run_segmentation, viz, AnalysisError};
use cohortscope::{CorrelationConfig, SegmentationConfig};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Command::Segment(args) => segment(SegmentationConfig::from(args), cli.verbose),
        Command::Correlate(args) => correlate(CorrelationConfig::from(args), cli.verbose),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            let code = e
                .downcast_ref::<AnalysisError>()
                .map(AnalysisError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn segment(config: SegmentationConfig, verbose: bool) -> Result<()> {
    println!(
        "Running customer segmentation with {} clusters...",
        config.n_clusters
    );
    let start_time = Instant::now();

    let outcome = run_segmentation(&config)?;
    if verbose {
        println!(
            "  Clustered {} customers on {} features in {:.2}s",
            outcome.matrix.n_records(),
            outcome.matrix.features.len(),
            start_time.elapsed().as_secs_f64()
        );
    }

    report::print_segmentation_report(&outcome);

    viz::plot_clusters(&outcome, &config.plot_x, &config.plot_y, &config.output)?;
    println!(
        "\nAnalysis complete. Check '{}' for the visualization.",
        config.output.display()
    );
    if verbose {
        println!("Total processing time: {:.2}s", start_time.elapsed().as_secs_f64());
    }

    Ok(())
}

fn correlate(config: CorrelationConfig, verbose: bool) -> Result<()> {
    println!("Running correlation analysis for NSM: '{}'", config.target);
    let start_time = Instant::now();

    let outcome = run_correlation(&config)?;
    report::print_correlation_report(&outcome);

    if verbose {
        println!("Total processing time: {:.2}s", start_time.elapsed().as_secs_f64());
    }

    Ok(())
}
