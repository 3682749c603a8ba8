//! Progress reporting for negotiation turns

use accord_application::NegotiationProgress;
use accord_domain::{AgentId, ConsensusJudgment, NegotiationMessage, NegotiationStage};
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports progress with a bar per turn tracking respondents
pub struct ProgressReporter {
    multi: MultiProgress,
    turn_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            turn_bar: Mutex::new(None),
        }
    }

    fn turn_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn stage_display_name(stage: NegotiationStage) -> &'static str {
        match stage {
            NegotiationStage::PerspectivePass => "Perspective pass",
            NegotiationStage::OptionGeneration => "Option generation",
            NegotiationStage::ConsensusCheck => "Consensus check",
            NegotiationStage::Completed => "Completed",
            NegotiationStage::Abandoned => "Abandoned",
        }
    }

    fn finish_turn(&self, message: String) {
        if let Ok(mut bar) = self.turn_bar.lock()
            && let Some(pb) = bar.take()
        {
            pb.finish_with_message(message);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl NegotiationProgress for ProgressReporter {
    fn on_message_accepted(&self, message: &NegotiationMessage) {
        let _ = self.multi.println(format!(
            "{} {} {}",
            "->".cyan(),
            message.agent_id.as_str().bold(),
            format!("[{}]", message.message_type).dimmed()
        ));
    }

    fn on_respondents_selected(&self, stage: NegotiationStage, respondents: &[AgentId]) {
        if respondents.is_empty() {
            return;
        }
        let pb = self.multi.add(ProgressBar::new(respondents.len() as u64));
        pb.set_style(Self::turn_style());
        pb.set_prefix(Self::stage_display_name(stage).to_string());
        pb.set_message("Waiting for responses...");

        if let Ok(mut bar) = self.turn_bar.lock()
            && let Some(stale) = bar.replace(pb)
        {
            stale.finish_and_clear();
        }
    }

    fn on_response_complete(&self, agent_id: &AgentId, message: Option<&NegotiationMessage>) {
        if let Ok(bar) = self.turn_bar.lock()
            && let Some(pb) = bar.as_ref()
        {
            let status = match message {
                Some(_) => format!("{} {}", "v".green(), agent_id),
                None => format!("{} {}", "x".red(), agent_id),
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_consensus_checked(&self, judgment: &ConsensusJudgment) {
        let status = if judgment.reached {
            "consensus reached".green().to_string()
        } else if judgment.near_miss {
            "near miss, round two".yellow().to_string()
        } else {
            "no consensus yet".dimmed().to_string()
        };
        self.finish_turn(status);
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl NegotiationProgress for SimpleProgress {
    fn on_message_accepted(&self, message: &NegotiationMessage) {
        println!(
            "{} {} [{}]",
            "->".cyan(),
            message.agent_id.as_str().bold(),
            message.message_type
        );
    }

    fn on_respondents_selected(&self, stage: NegotiationStage, respondents: &[AgentId]) {
        if respondents.is_empty() {
            return;
        }
        let names: Vec<&str> = respondents.iter().map(|a| a.as_str()).collect();
        println!(
            "  {} {}",
            ProgressReporter::stage_display_name(stage).bold(),
            names.join(", ")
        );
    }

    fn on_response_complete(&self, agent_id: &AgentId, message: Option<&NegotiationMessage>) {
        match message {
            Some(_) => println!("  {} {}", "v".green(), agent_id),
            None => println!("  {} {} (skipped)", "x".red(), agent_id),
        }
    }

    fn on_consensus_checked(&self, judgment: &ConsensusJudgment) {
        if judgment.reached {
            println!("  {}", "Consensus reached".green().bold());
        } else if judgment.near_miss {
            println!("  {}", "Near miss, opening round two".yellow());
        }
    }
}
