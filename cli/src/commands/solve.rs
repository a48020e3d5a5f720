//! Solve a tiered network and report attributed flows.

use std::path::PathBuf;

use anyhow::bail;
use clap::{Args, ValueEnum};
use log::{info, warn};
use tributary_core::{verify_assignment, FlowDecomposer};

use crate::network::{NetworkFile, SUPER_SINK, SUPER_SOURCE};
use crate::report::{format_flow, render_json, render_table};

/// Output format for solve results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Compute the maximum flow and the per-pair attribution.
#[derive(Args)]
pub struct SolveArgs {
    /// JSON network description (defaults to the built-in logistics demo)
    #[arg(short, long)]
    pub network: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Check capacity, conservation and the min-cut certificate
    #[arg(long)]
    pub verify: bool,
}

/// Run the solve command.
pub fn run(args: SolveArgs) -> anyhow::Result<()> {
    let file = match &args.network {
        Some(path) => NetworkFile::load(path)?,
        None => {
            info!("No network given, using the built-in logistics demo");
            NetworkFile::builtin()?
        }
    };

    let mut prepared = file.prepare()?;
    let source = SUPER_SOURCE.to_string();
    let sink = SUPER_SINK.to_string();

    let result = prepared.network.max_flow(&source, &sink)?;
    info!(
        "Maximum flow {} after {} augmentations ({:.3} ms)",
        format_flow(result.total_flow),
        result.metrics.augmentations,
        result.metrics.execution_time_ms
    );

    let verification = if args.verify {
        Some(verify_assignment(&prepared.network, &source, &sink, result.total_flow))
    } else {
        None
    };

    let attribution = FlowDecomposer::with_config(&prepared.tiers, prepared.decomposer)
        .decompose(&result.assignment);
    if attribution.total() > result.total_flow {
        warn!(
            "Attributed total {} exceeds the maximum flow {}: relays shared between origins are counted once per origin",
            format_flow(attribution.total()),
            format_flow(result.total_flow)
        );
    }

    match args.format {
        OutputFormat::Table => print!("{}", render_table(result.total_flow, &attribution)),
        OutputFormat::Json => println!(
            "{}",
            render_json(
                result.total_flow,
                &result.metrics,
                &result.assignment,
                &attribution,
                verification.as_ref(),
            )?
        ),
    }

    if let Some(report) = &verification {
        if !report.is_valid() {
            for violation in &report.violations {
                eprintln!("violation: {violation:?}");
            }
            bail!("flow verification failed with {} violations", report.violations.len());
        }
        if args.format == OutputFormat::Table {
            println!();
            println!("Verified: min-cut capacity {}", format_flow(report.cut_capacity));
        }
    }

    Ok(())
}
