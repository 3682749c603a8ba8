//! Respondent selection - who speaks after a message is posted.
//!
//! Randomness is a tie-break so no single agent dominates the floor. Callers
//! pass the random source in, which lets tests use a seeded `StdRng`.

use super::stage::NegotiationStage;
use crate::core::ids::AgentId;
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

/// Upper bound on respondents per inbound message after the perspective pass
pub const MAX_RESPONDENTS: usize = 2;

/// Choose which other participants answer the agent that just posted.
///
/// - The speaker is never selected.
/// - `PerspectivePass`: exactly one other participant, uniformly at random.
/// - `OptionGeneration` / `ConsensusCheck`: 1..=2 participants, never more
///   than are available.
/// - Terminal stages, or nobody else present: empty (the negotiation stalls
///   without error).
///
/// Duplicate ids in `participants` are ignored.
pub fn select_respondents<R: Rng + ?Sized>(
    speaker: &AgentId,
    participants: &[AgentId],
    stage: NegotiationStage,
    rng: &mut R,
) -> Vec<AgentId> {
    let mut others: Vec<AgentId> = Vec::with_capacity(participants.len());
    for agent in participants {
        if agent != speaker && !others.contains(agent) {
            others.push(agent.clone());
        }
    }

    if others.is_empty() || !stage.is_open() {
        return Vec::new();
    }

    match stage {
        NegotiationStage::PerspectivePass => others.choose(rng).cloned().into_iter().collect(),
        _ => {
            let count = rng.random_range(1..=MAX_RESPONDENTS).min(others.len());
            others.shuffle(rng);
            others.truncate(count);
            others
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn agents(ids: &[&str]) -> Vec<AgentId> {
        ids.iter().map(|id| AgentId::new(*id)).collect()
    }

    #[test]
    fn test_never_selects_speaker() {
        let participants = agents(&["a", "b", "c"]);
        let speaker = AgentId::new("a");
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            for stage in [
                NegotiationStage::PerspectivePass,
                NegotiationStage::OptionGeneration,
                NegotiationStage::ConsensusCheck,
            ] {
                let chosen = select_respondents(&speaker, &participants, stage, &mut rng);
                assert!(!chosen.contains(&speaker));
            }
        }
    }

    #[test]
    fn test_perspective_pass_selects_exactly_one() {
        let participants = agents(&["a", "b", "c", "d"]);
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let chosen = select_respondents(
                &AgentId::new("b"),
                &participants,
                NegotiationStage::PerspectivePass,
                &mut rng,
            );
            assert_eq!(chosen.len(), 1);
        }
    }

    #[test]
    fn test_later_stages_cap_at_two() {
        let participants = agents(&["a", "b", "c", "d", "e"]);
        let mut seen_two = false;
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let chosen = select_respondents(
                &AgentId::new("a"),
                &participants,
                NegotiationStage::OptionGeneration,
                &mut rng,
            );
            assert!((1..=MAX_RESPONDENTS).contains(&chosen.len()));
            seen_two |= chosen.len() == 2;
        }
        assert!(seen_two);
    }

    #[test]
    fn test_later_stage_with_single_other_returns_one() {
        let participants = agents(&["a", "b"]);
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let chosen = select_respondents(
                &AgentId::new("a"),
                &participants,
                NegotiationStage::ConsensusCheck,
                &mut rng,
            );
            assert_eq!(chosen, agents(&["b"]));
        }
    }

    #[test]
    fn test_no_other_participants_returns_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        let speaker = AgentId::new("a");
        let chosen = select_respondents(
            &speaker,
            &agents(&["a", "a"]),
            NegotiationStage::PerspectivePass,
            &mut rng,
        );
        assert!(chosen.is_empty());

        let chosen = select_respondents(&speaker, &[], NegotiationStage::ConsensusCheck, &mut rng);
        assert!(chosen.is_empty());
    }

    #[test]
    fn test_terminal_stage_returns_empty() {
        let mut rng = StdRng::seed_from_u64(3);
        let chosen = select_respondents(
            &AgentId::new("a"),
            &agents(&["a", "b", "c"]),
            NegotiationStage::Completed,
            &mut rng,
        );
        assert!(chosen.is_empty());
    }

    #[test]
    fn test_duplicates_are_ignored() {
        let participants = agents(&["a", "b", "b", "b"]);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let chosen = select_respondents(
                &AgentId::new("a"),
                &participants,
                NegotiationStage::OptionGeneration,
                &mut rng,
            );
            assert_eq!(chosen, agents(&["b"]));
        }
    }
}
