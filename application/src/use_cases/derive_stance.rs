//! Derive Stance use case
//!
//! Turns an agent's stored preference profile plus a topic into a
//! structured stance. Never fails: any problem along the way degrades to the
//! heuristic stance.

use crate::config::EngineParams;
use crate::ports::completion::{CompletionRequest, CompletionService};
use crate::ports::repository::NegotiationRepository;
use accord_domain::{
    AgentId, NegotiationPromptTemplate, NegotiationStance, PreferenceProfile, heuristic_stance,
    parse_stance,
};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct DeriveStanceUseCase<C: CompletionService + 'static, R: NegotiationRepository + 'static>
{
    completion: Arc<C>,
    repository: Arc<R>,
    params: EngineParams,
}

impl<C: CompletionService + 'static, R: NegotiationRepository + 'static> DeriveStanceUseCase<C, R> {
    pub fn new(completion: Arc<C>, repository: Arc<R>, params: EngineParams) -> Self {
        Self {
            completion,
            repository,
            params,
        }
    }

    pub async fn execute(&self, agent_id: &AgentId, topic: &str) -> NegotiationStance {
        let profile = match self.repository.preference_profile(agent_id).await {
            Ok(Some(raw)) => PreferenceProfile::from_value(&raw),
            Ok(None) => {
                debug!("No preference profile for {}, using empty profile", agent_id);
                PreferenceProfile::empty()
            }
            Err(e) => {
                warn!("Failed to load preference profile for {}: {}", agent_id, e);
                PreferenceProfile::empty()
            }
        };

        let request = CompletionRequest::new(
            NegotiationPromptTemplate::stance_system(),
            NegotiationPromptTemplate::stance_prompt(topic, &profile),
        )
        .with_sampling(self.params.temperature, self.params.max_tokens);

        match self.completion.complete(request).await {
            Ok(text) => match parse_stance(&text) {
                Ok(stance) => stance,
                Err(e) => {
                    warn!("Stance for {} unparseable ({}), using heuristic", agent_id, e);
                    heuristic_stance(&profile, topic)
                }
            },
            Err(e) => {
                warn!("Stance derivation for {} failed ({}), using heuristic", agent_id, e);
                heuristic_stance(&profile, topic)
            }
        }
    }
}
