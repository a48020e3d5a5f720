//! Text and JSON rendering of solve results.

use std::fmt::Write as _;

use serde::Serialize;
use tributary_core::{is_unbounded, Attribution, Flow, FlowAssignment, FlowReport, SolveMetrics};

/// Render a flow value, dropping the fraction when it is integral.
pub fn format_flow(flow: Flow) -> String {
    if is_unbounded(flow) {
        "unbounded".to_string()
    } else if flow.fract() == 0.0 && flow.abs() < 1e15 {
        format!("{flow:.0}")
    } else {
        format!("{flow:.3}")
    }
}

/// Total flow headline followed by a sorted origin/destination table.
pub fn render_table(total_flow: Flow, attribution: &Attribution<String>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Maximum flow: {}", format_flow(total_flow));
    let _ = writeln!(out);
    let _ = writeln!(out, "{:<8} | {:<11} | {:>15}", "Origin", "Destination", "Attributed flow");
    let _ = writeln!(out, "{}", "-".repeat(40));
    for (origin, destination, flow) in attribution.iter() {
        let _ = writeln!(out, "{:<8} | {:<11} | {:>15}", origin, destination, format_flow(flow));
    }
    out
}

#[derive(Serialize)]
struct ArcRow<'a> {
    from: &'a str,
    to: &'a str,
    flow: Flow,
}

#[derive(Serialize)]
struct PairRow<'a> {
    origin: &'a str,
    destination: &'a str,
    flow: Flow,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    total_flow: Flow,
    metrics: &'a SolveMetrics,
    assignment: Vec<ArcRow<'a>>,
    attribution: Vec<PairRow<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    verification: Option<&'a FlowReport<String>>,
}

/// Machine-readable result document.
pub fn render_json(
    total_flow: Flow,
    metrics: &SolveMetrics,
    assignment: &FlowAssignment<String>,
    attribution: &Attribution<String>,
    verification: Option<&FlowReport<String>>,
) -> anyhow::Result<String> {
    let report = JsonReport {
        total_flow,
        metrics,
        assignment: assignment
            .iter()
            .map(|(from, to, flow)| ArcRow { from, to, flow })
            .collect(),
        attribution: attribution
            .iter()
            .map(|(origin, destination, flow)| PairRow { origin, destination, flow })
            .collect(),
        verification,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
