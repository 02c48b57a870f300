use std::fmt::Write;

use crate::results::{AlgorithmRun, Campaign};

const MIB: f64 = 1024.0 * 1024.0;

/// Aggregate figures for one algorithm run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub algorithm: String,
    pub observations: usize,
    pub total_seconds: f64,
    pub total_bytes: u64,
    /// MiB per second over the whole run. `None` when byte counts are
    /// unknown (loaded campaigns) or no time was measured.
    pub throughput_mib_s: Option<f64>,
}

impl RunSummary {
    pub fn from_run(run: &AlgorithmRun) -> Self {
        let total_seconds: f64 = run
            .perf_metrics
            .iter()
            .map(|m| m.execution_time_in_seconds)
            .sum();
        let total_bytes: u64 = run.perf_metrics.iter().map(|m| m.payload_bytes as u64).sum();
        let throughput_mib_s = (total_bytes > 0 && total_seconds > 0.0)
            .then(|| total_bytes as f64 / MIB / total_seconds);
        Self {
            algorithm: run.algorithm.clone(),
            observations: run.perf_metrics.len(),
            total_seconds,
            total_bytes,
            throughput_mib_s,
        }
    }
}

pub fn summarize(campaign: &Campaign) -> Vec<RunSummary> {
    campaign.runs.iter().map(RunSummary::from_run).collect()
}

/// Plain-text table with one row per algorithm.
pub fn format_summary(summaries: &[RunSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:=<66}", "");
    let _ = writeln!(out, "  PERFORMANCE SUMMARY");
    let _ = writeln!(out, "{:=<66}", "");
    let _ = writeln!(
        out,
        "  {:<16} {:>6} {:>16} {:>16}",
        "Algorithm", "Sizes", "Total (s)", "MiB/s"
    );
    let _ = writeln!(out, "  {:-<16} {:->6} {:->16} {:->16}", "", "", "", "");
    for s in summaries {
        let throughput = s
            .throughput_mib_s
            .map(|t| format!("{t:.2}"))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "  {:<16} {:>6} {:>16.6} {:>16}",
            s.algorithm, s.observations, s.total_seconds, throughput
        );
    }
    let _ = writeln!(out, "{:=<66}", "");
    out
}
