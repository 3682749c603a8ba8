//! Output formatter trait

use crate::output::report::SimulationReport;

/// Trait for formatting simulation results
pub trait OutputFormatter {
    /// Transcript, outcome, and proposal
    fn format(&self, report: &SimulationReport) -> String;

    /// Format as JSON
    fn format_json(&self, report: &SimulationReport) -> String;

    /// Outcome and proposal only
    fn format_summary(&self, report: &SimulationReport) -> String;
}
