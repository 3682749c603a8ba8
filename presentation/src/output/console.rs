//! Console output formatter for simulation results

use crate::output::formatter::OutputFormatter;
use crate::output::report::{SimulationReport, StopReason};
use accord_domain::{MessageType, MessageWithReactions, NegotiationStatus, Proposal};
use colored::Colorize;

/// Formats simulation results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete result
    pub fn format(report: &SimulationReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Negotiation Transcript"));
        output.push('\n');
        output.push_str(&Self::topic(report));

        output.push_str(&Self::section_header("Messages"));
        for entry in &report.transcript {
            output.push_str(&Self::message(entry));
        }

        output.push_str(&Self::outcome(report));
        if let Some(proposal) = &report.proposal {
            output.push_str(&Self::proposal(proposal));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(report: &SimulationReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the outcome only (concise output)
    pub fn format_summary(report: &SimulationReport) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n\n", "=== Negotiation Outcome ===".cyan().bold()));
        output.push_str(&Self::topic(report));
        output.push_str(&Self::outcome(report));
        if let Some(proposal) = &report.proposal {
            output.push_str(&Self::proposal(proposal));
        }

        output
    }

    fn topic(report: &SimulationReport) -> String {
        let mut output = format!("{} {}\n", "Topic:".cyan().bold(), report.session.topic);
        if let Some(description) = &report.session.description {
            output.push_str(&format!("{}\n", description.dimmed()));
        }
        output.push_str(&format!(
            "{} {}\n",
            "Initiator:".cyan().bold(),
            report.session.initiator_id
        ));
        output
    }

    fn message(entry: &MessageWithReactions) -> String {
        let message = &entry.message;
        let label = format!(
            "── {} · {} · {} ──",
            message.agent_id,
            message.message_type,
            message.timestamp.format("%H:%M:%S")
        );
        let label = match message.message_type {
            MessageType::Agreement => label.green().bold(),
            MessageType::Disagreement => label.red().bold(),
            MessageType::System => label.magenta().bold(),
            MessageType::Proposal => label.cyan().bold(),
            _ => label.yellow().bold(),
        };

        let mut output = format!("\n{}\n{}\n", label, message.content);

        let reactions = entry.reaction_summary();
        if !reactions.is_empty() {
            let rendered: Vec<String> = reactions
                .iter()
                .map(|(tag, count)| format!("{} x{}", tag, count))
                .collect();
            output.push_str(&format!("{}\n", rendered.join("  ").dimmed()));
        }
        output
    }

    fn outcome(report: &SimulationReport) -> String {
        let status = match report.session.status {
            NegotiationStatus::Completed => report.session.status.as_str().green().bold(),
            NegotiationStatus::Abandoned => report.session.status.as_str().red().bold(),
            NegotiationStatus::Active => report.session.status.as_str().yellow().bold(),
        };
        let reason = match report.stop_reason {
            StopReason::Consensus => report.stop_reason.describe().green(),
            _ => report.stop_reason.describe().yellow(),
        };

        let mut output = Self::section_header("Outcome");
        output.push_str(&format!("{} {}\n", "Status:".bold(), status));
        output.push_str(&format!("{} {}\n", "Stage:".bold(), report.stage));
        output.push_str(&format!(
            "{} {} turns, {} messages\n",
            "Rounds:".bold(),
            report.rounds,
            report.transcript.len()
        ));
        output.push_str(&format!("{} {}\n", "Stopped:".bold(), reason));
        output
    }

    fn proposal(proposal: &Proposal) -> String {
        let mut output = Self::section_header("Proposal");
        output.push_str(&format!("{}\n\n", proposal.title.bold()));
        output.push_str(&format!("{}\n\n", proposal.description));

        if let Some(amount) = &proposal.amount {
            output.push_str(&format!("{} {}\n", "Amount:".cyan().bold(), amount));
        }
        if let Some(class) = &proposal.decision_class {
            output.push_str(&format!("{} {}\n", "Decision class:".cyan().bold(), class));
        }
        output.push_str(&format!(
            "{} {} (quorum {}, threshold {:.0}%)\n",
            "Status:".cyan().bold(),
            proposal.status,
            proposal.quorum,
            proposal.threshold * 100.0
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Voting closes:".cyan().bold(),
            proposal.close_at.format("%Y-%m-%d %H:%M UTC")
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Veto window ends:".cyan().bold(),
            proposal.veto_window_end.format("%Y-%m-%d %H:%M UTC")
        ));

        if let Some(summary) = &proposal.negotiation_summary {
            output.push_str(&format!("\n{}\n", "Summary:".cyan().bold()));
            output.push_str(&Self::indent(summary, "  "));
            output.push('\n');
        }
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, report: &SimulationReport) -> String {
        Self::format(report)
    }

    fn format_json(&self, report: &SimulationReport) -> String {
        Self::format_json(report)
    }

    fn format_summary(&self, report: &SimulationReport) -> String {
        Self::format_summary(report)
    }
}
