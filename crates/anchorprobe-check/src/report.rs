//! Report rendering and pass/fail threshold.

use std::process::ExitCode;

use clap::ValueEnum;

use anchorprobe_core::{CountSpec, Summary};

/// Output format of the one-line report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `<ok>`
    Count,
    /// `<ok> <total>`
    #[value(name = "count_total")]
    CountTotal,
    /// Percentage reachable with two decimals, `N/A` when nothing was probed.
    Percent,
    /// `<ok> / <total> OK`
    #[default]
    Verbose,
}

pub fn render(summary: &Summary, format: OutputFormat) -> String {
    match format {
        OutputFormat::Count => summary.ok.to_string(),
        OutputFormat::CountTotal => format!("{} {}", summary.ok, summary.total),
        OutputFormat::Percent => match summary.percent() {
            Some(pct) => format!("{pct:.2}"),
            None => "N/A".to_string(),
        },
        OutputFormat::Verbose => format!("{} / {} OK", summary.ok, summary.total),
    }
}

/// Minimum reachable count for `threshold`; percentages resolve against the probed total.
pub fn required_ok(summary: &Summary, threshold: &CountSpec) -> usize {
    threshold.resolve(summary.total)
}

/// Whether enough targets were reachable.
pub fn passes(summary: &Summary, threshold: &CountSpec) -> bool {
    summary.ok >= required_ok(summary, threshold)
}

/// Process exit status for a finished run: failure when below `threshold`.
pub fn exit_code(summary: &Summary, threshold: Option<&CountSpec>) -> ExitCode {
    match threshold {
        Some(threshold) if !passes(summary, threshold) => {
            tracing::warn!(
                ok = summary.ok,
                total = summary.total,
                required = required_ok(summary, threshold),
                "Reachable targets below fail threshold"
            );
            ExitCode::FAILURE
        }
        _ => ExitCode::SUCCESS,
    }
}
