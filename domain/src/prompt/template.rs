//! Prompt templates for the negotiation flow

use crate::consensus::block::FinalConsensusBlock;
use crate::consensus::tally::AgreementTally;
use crate::negotiation::classify::{
    CONSENT_NO, CONSENT_YES, OPTION_TAGS, PERSPECTIVE_MARKER, ROUND_TWO_MARKER,
};
use crate::negotiation::entities::{MessageWithReactions, NegotiationMessage, NegotiationSession};
use crate::negotiation::stage::NegotiationStage;
use crate::stance::entities::NegotiationStance;
use crate::stance::preference::PreferenceProfile;

/// Templates for generating prompts at each step of a negotiation
pub struct NegotiationPromptTemplate;

impl NegotiationPromptTemplate {
    /// Fixed persona for every agent turn
    pub fn response_system() -> &'static str {
        r#"You are a concise, constructive, professional negotiation representative.
You speak on behalf of one principal and argue for their interests honestly.
Keep turns short (at most a few sentences), address other participants' concerns directly,
and follow the protocol markers you are given exactly."#
    }

    /// Stage-specific instruction block
    pub fn stage_instructions(stage: NegotiationStage) -> String {
        match stage {
            NegotiationStage::PerspectivePass => format!(
                r#"Stage: PERSPECTIVE PASS.
Summarize your understanding of the other participants' viewpoints in your own words.
Do NOT propose solutions yet.
Begin your message with "{}"."#,
                PERSPECTIVE_MARKER
            ),
            NegotiationStage::OptionGeneration => format!(
                r#"Stage: OPTION GENERATION.
Put forward one or two concrete options that balance your principal's interests against the concerns raised so far.
Tag each option with "{}" or "{}" at the start of its line."#,
                OPTION_TAGS[0], OPTION_TAGS[1]
            ),
            NegotiationStage::ConsensusCheck => format!(
                r#"Stage: CONSENSUS CHECK.
State explicitly whether you consent to the leading option, writing "{}" or "{}", followed by a one-sentence justification.
Never consent to terms that violate any of your deal-breakers."#,
                CONSENT_YES, CONSENT_NO
            ),
            NegotiationStage::Completed | NegotiationStage::Abandoned => {
                "The negotiation is closed. Do not respond.".to_string()
            }
        }
    }

    /// User prompt for an agent's turn
    ///
    /// The recent transcript travels separately as context messages.
    pub fn response_prompt(
        session: &NegotiationSession,
        stage: NegotiationStage,
        stance: &NegotiationStance,
        agent_label: &str,
    ) -> String {
        let mut prompt = format!("Negotiation topic: {}\n", session.topic);
        if let Some(description) = &session.description {
            prompt.push_str(&format!("Context: {}\n", description));
        }

        prompt.push_str(&format!(
            "\nYou are representing {}. Your stance:\n{}",
            agent_label,
            stance.render()
        ));

        prompt.push('\n');
        prompt.push_str(&Self::stage_instructions(stage));
        prompt
    }

    /// One context line for a transcript message
    pub fn context_line(message: &NegotiationMessage) -> String {
        format!(
            "[{}] ({}): {}",
            message.agent_id, message.message_type, message.content
        )
    }

    /// System prompt for stance derivation
    pub fn stance_system() -> &'static str {
        r#"You analyze a principal's stored preferences and derive their negotiating stance on a topic.
Reply with a single JSON object and nothing else."#
    }

    /// User prompt for stance derivation
    pub fn stance_prompt(topic: &str, profile: &PreferenceProfile) -> String {
        format!(
            r#"Topic: {}

Stored preferences:
{}

Return JSON with exactly these fields:
{{
  "position": "one-sentence position on the topic",
  "strength": "strong" | "moderate" | "weak",
  "flexibility": "high" | "medium" | "low",
  "priorities": [{{"key": "issue", "importance": 1-10}}],
  "constraints": ["..."],
  "dealBreakers": ["..."]
}}"#,
            topic,
            profile.to_prompt_json()
        )
    }

    /// System prompt for the consensus judgment
    pub fn consensus_system() -> &'static str {
        r#"You are a neutral facilitator judging whether a group negotiation has reached consensus.
Base your judgment only on what participants actually said and how they reacted."#
    }

    /// User prompt for the consensus judgment
    pub fn consensus_prompt(
        session: &NegotiationSession,
        transcript: &[MessageWithReactions],
        tally: &AgreementTally,
    ) -> String {
        let mut prompt = format!(
            "Negotiation topic: {}\n\nFull transcript (oldest first):\n",
            session.topic
        );
        prompt.push_str(&render_transcript(transcript));

        prompt.push_str(&format!(
            "\nObserved explicit consent ({} / {} markers): {}\n",
            CONSENT_YES,
            CONSENT_NO,
            tally.summary()
        ));

        prompt.push_str(&format!(
            r#"
Consensus requires unanimous explicit consent with no outstanding objections and clearly stated terms.

Decision classes:
- standard: consensus requires at least 75% affirmative support
- pilot: at least 60% affirmative support with an opt-out path for dissenters
- emergency-capital: unanimous support

If affirmative support is between 70% and 74% under the standard class, call it a near-miss; another round ("{}") will follow.

Reply with your judgment. If consensus was reached, say "Consensus reached" and end with these lines:
terms: <the agreed terms>
decisionClass: standard | pilot | emergency-capital
consensusRatio: <percentage>
sunsetDate: <YYYY-MM-DD or none>
signatories: <comma-separated agent ids>

Otherwise say "No consensus" and state the affirmative percentage."#,
            ROUND_TWO_MARKER
        ));

        prompt
    }

    /// Announcement appended after a near-miss judgment
    pub fn round_two_announcement(summary: &str) -> String {
        format!(
            "{}: Consensus narrowly missed (70-74% support). Opening a second round. \
             Address the remaining objections and restate your position.\nJudgment: {}",
            ROUND_TWO_MARKER,
            summary.trim()
        )
    }

    /// System prompt for proposal drafting
    pub fn proposal_system() -> &'static str {
        r#"You write formal proposals from concluded negotiations.
Reply with a single JSON object and nothing else."#
    }

    /// User prompt for proposal drafting
    pub fn proposal_prompt(
        session: &NegotiationSession,
        transcript: &[MessageWithReactions],
        block: Option<&FinalConsensusBlock>,
    ) -> String {
        let mut prompt = format!(
            "Negotiation topic: {}\n\nTranscript (oldest first):\n{}",
            session.topic,
            render_transcript(transcript)
        );

        if let Some(block) = block {
            prompt.push_str(&format!(
                "\nAgreed terms: {}\nDecision class: {}\n",
                block.terms, block.decision_class
            ));
        }

        prompt.push_str(
            r#"
Return JSON with exactly these fields:
{"title": "short proposal title", "description": "what is being decided and why", "summary": "one-paragraph summary of the agreed outcome"}"#,
        );
        prompt
    }
}

/// One line per message, with reaction counts in brackets
pub fn render_transcript(transcript: &[MessageWithReactions]) -> String {
    let mut out = String::new();
    for entry in transcript {
        out.push_str(&NegotiationPromptTemplate::context_line(&entry.message));
        let reactions = entry.reaction_summary();
        if !reactions.is_empty() {
            let rendered: Vec<String> = reactions
                .iter()
                .map(|(tag, count)| format!("{}×{}", tag, count))
                .collect();
            out.push_str(&format!(" [reactions: {}]", rendered.join(", ")));
        }
        out.push('\n');
    }
    out
}
