//! Process Message use case
//!
//! The inbound-message path: accept a message, classify the stage, dispatch
//! auto-responses in parallel, then judge consensus once. Runs under the
//! session's lease so two posts to the same negotiation never interleave.

use crate::config::EngineParams;
use crate::error::NegotiationError;
use crate::ports::completion::{CompletionError, CompletionService};
use crate::ports::negotiation_logger::{NegotiationEvent, NegotiationLogger, events};
use crate::ports::progress::{NegotiationProgress, NoProgress};
use crate::ports::repository::NegotiationRepository;
use crate::use_cases::detect_consensus::{ConsensusCheck, DetectConsensusUseCase};
use crate::use_cases::finalize_negotiation::{FinalizeNegotiationUseCase, NegotiationOutcome};
use crate::use_cases::generate_response::GenerateResponseUseCase;
use crate::use_cases::session_lease::SessionLeases;
use crate::use_cases::transcript::participants;
use accord_domain::{
    AgentId, ConsensusClassifier, MessageId, MessageMetadata, MessageType, NegotiationId,
    NegotiationMessage, NegotiationPromptTemplate, NegotiationSession, NegotiationStage,
    ProposalId, classify_message_type, select_respondents,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use serde_json::json;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// An inbound message from a participant
#[derive(Debug, Clone)]
pub struct ProcessMessageInput {
    pub agent_id: AgentId,
    pub content: String,
    /// Classified from the content when absent
    pub message_type: Option<MessageType>,
    pub referenced_message_id: Option<MessageId>,
    pub metadata: Option<MessageMetadata>,
}

impl ProcessMessageInput {
    pub fn new(agent_id: impl Into<AgentId>, content: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            content: content.into(),
            message_type: None,
            referenced_message_id: None,
            metadata: None,
        }
    }

    pub fn with_type(mut self, message_type: MessageType) -> Self {
        self.message_type = Some(message_type);
        self
    }

    pub fn with_reference(mut self, message_id: MessageId) -> Self {
        self.referenced_message_id = Some(message_id);
        self
    }

    pub fn with_metadata(mut self, metadata: MessageMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessMessageOutput {
    pub message: NegotiationMessage,
    /// Stored auto-responses, oldest first
    pub auto_responses: Vec<NegotiationMessage>,
    pub consensus_reached: bool,
    pub near_miss: bool,
    pub proposal_id: Option<ProposalId>,
}

pub struct ProcessMessageUseCase<
    C: CompletionService + 'static,
    R: NegotiationRepository + 'static,
> {
    repository: Arc<R>,
    responder: Arc<GenerateResponseUseCase<C, R>>,
    detect: DetectConsensusUseCase<C, R>,
    finalize: FinalizeNegotiationUseCase<R>,
    logger: Arc<dyn NegotiationLogger>,
    leases: SessionLeases,
    rng: Mutex<StdRng>,
    params: EngineParams,
}

impl<C: CompletionService + 'static, R: NegotiationRepository + 'static>
    ProcessMessageUseCase<C, R>
{
    pub fn new(
        completion: Arc<C>,
        repository: Arc<R>,
        classifier: Arc<dyn ConsensusClassifier>,
        logger: Arc<dyn NegotiationLogger>,
        params: EngineParams,
    ) -> Self {
        Self {
            responder: Arc::new(GenerateResponseUseCase::new(
                Arc::clone(&completion),
                Arc::clone(&repository),
                params.clone(),
            )),
            detect: DetectConsensusUseCase::new(
                completion,
                Arc::clone(&repository),
                classifier,
                Arc::clone(&logger),
                params.clone(),
            ),
            finalize: FinalizeNegotiationUseCase::new(
                Arc::clone(&repository),
                Arc::clone(&logger),
                params.materialization_policy(),
            ),
            repository,
            logger,
            leases: SessionLeases::new(),
            rng: Mutex::new(StdRng::from_os_rng()),
            params,
        }
    }

    /// Use a seeded source for respondent selection.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub async fn execute(
        &self,
        negotiation_id: &NegotiationId,
        input: ProcessMessageInput,
    ) -> Result<ProcessMessageOutput, NegotiationError> {
        self.execute_with_progress(negotiation_id, input, &NoProgress)
            .await
    }

    pub async fn execute_with_progress(
        &self,
        negotiation_id: &NegotiationId,
        input: ProcessMessageInput,
        progress: &dyn NegotiationProgress,
    ) -> Result<ProcessMessageOutput, NegotiationError> {
        let content = input.content.trim();
        if content.is_empty() {
            return Err(NegotiationError::validation("message content must not be empty"));
        }

        let _lease = self.leases.acquire(negotiation_id).await;

        let session = self.active_session(negotiation_id).await?;

        if let Some(referenced) = &input.referenced_message_id {
            let in_session = self
                .repository
                .get_message(referenced)
                .await?
                .is_some_and(|m| &m.negotiation_id == negotiation_id);
            if !in_session {
                return Err(NegotiationError::validation(format!(
                    "referenced message {} is not part of negotiation {}",
                    referenced, negotiation_id
                )));
            }
        }

        let message_type = input
            .message_type
            .unwrap_or_else(|| classify_message_type(content));
        let message = NegotiationMessage::new(
            negotiation_id.clone(),
            input.agent_id.clone(),
            content,
            message_type,
        )
        .with_reference(input.referenced_message_id)
        .with_metadata(input.metadata);

        self.repository.append_message(&message).await?;
        debug!(
            "Accepted {} message {} from {} in {}",
            message.message_type, message.id, message.agent_id, negotiation_id
        );
        self.logger.log(NegotiationEvent::new(
            events::MESSAGE_POSTED,
            json!({
                "negotiation_id": negotiation_id,
                "message_id": message.id,
                "agent_id": message.agent_id,
                "message_type": message.message_type.as_str(),
            }),
        ));
        progress.on_message_accepted(&message);

        // The message is stored; from here on failures degrade the output instead of erroring.
        let (stage, respondents) = match self.repository.list_messages(negotiation_id).await {
            Ok(messages) => {
                let stage = NegotiationStage::classify(session.status, messages.len());
                let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
                let respondents = select_respondents(
                    &message.agent_id,
                    &participants(&messages),
                    stage,
                    &mut *rng,
                );
                (stage, respondents)
            }
            Err(e) => {
                warn!(
                    "Listing messages for negotiation {} failed, no auto-responses: {}",
                    negotiation_id, e
                );
                (NegotiationStage::classify(session.status, 0), Vec::new())
            }
        };
        progress.on_respondents_selected(stage, &respondents);

        let auto_responses = self
            .dispatch(negotiation_id, &message, stage, respondents, progress)
            .await;

        let check = match self.detect.execute(negotiation_id).await {
            Ok(check) => {
                progress.on_consensus_checked(&check.judgment);
                Some(check)
            }
            Err(e) => {
                warn!(
                    "Consensus check for negotiation {} failed after message from {}: {}",
                    negotiation_id, message.agent_id, e
                );
                None
            }
        };

        let mut output = ProcessMessageOutput {
            message,
            auto_responses,
            consensus_reached: false,
            near_miss: false,
            proposal_id: None,
        };

        match check {
            Some(check) if check.reached() => {
                output.consensus_reached = true;
                match self.conclude(negotiation_id, check).await {
                    Ok(proposal_id) => output.proposal_id = proposal_id,
                    Err(e) => warn!(
                        "Finalizing negotiation {} after consensus failed: {}",
                        negotiation_id, e
                    ),
                }
            }
            Some(check) if check.near_miss() => {
                output.near_miss = true;
                if let Err(e) = self.announce_round_two(&session, &check).await {
                    warn!(
                        "Round-two announcement for negotiation {} failed: {}",
                        negotiation_id, e
                    );
                }
            }
            _ => {}
        }

        Ok(output)
    }

    /// Compose `agent_id`'s next turn and post it through the normal path.
    pub async fn post_generated_turn(
        &self,
        negotiation_id: &NegotiationId,
        agent_id: &AgentId,
        progress: &dyn NegotiationProgress,
    ) -> Result<ProcessMessageOutput, NegotiationError> {
        let session = self.active_session(negotiation_id).await?;
        let count = self.repository.count_messages(negotiation_id).await?;
        let stage = NegotiationStage::classify(session.status, count);

        let content = self.responder.compose(negotiation_id, agent_id, stage).await?;

        let mut metadata = MessageMetadata::new();
        metadata.insert("stage".to_string(), json!(stage.as_str()));
        let input = ProcessMessageInput::new(agent_id.clone(), content).with_metadata(metadata);

        self.execute_with_progress(negotiation_id, input, progress)
            .await
    }

    async fn active_session(
        &self,
        negotiation_id: &NegotiationId,
    ) -> Result<NegotiationSession, NegotiationError> {
        let session = self
            .repository
            .get_session(negotiation_id)
            .await?
            .ok_or_else(|| NegotiationError::not_found("negotiation", negotiation_id))?;
        if !session.is_active() {
            return Err(NegotiationError::validation(format!(
                "negotiation {} is {}",
                negotiation_id, session.status
            )));
        }
        Ok(session)
    }

    /// Run every respondent concurrently; failed or timed-out turns are skipped.
    async fn dispatch(
        &self,
        negotiation_id: &NegotiationId,
        trigger: &NegotiationMessage,
        stage: NegotiationStage,
        respondents: Vec<AgentId>,
        progress: &dyn NegotiationProgress,
    ) -> Vec<NegotiationMessage> {
        let mut join_set = JoinSet::new();

        for agent_id in respondents {
            let responder = Arc::clone(&self.responder);
            let negotiation_id = negotiation_id.clone();
            let reply_to = Some(trigger.id.clone());
            let limit = self.params.response_timeout;

            join_set.spawn(async move {
                let turn = responder.execute(&negotiation_id, &agent_id, stage, reply_to);
                let result = match tokio::time::timeout(limit, turn).await {
                    Ok(result) => result,
                    Err(_) => Err(CompletionError::Timeout.into()),
                };
                (agent_id, result)
            });
        }

        let mut responses = Vec::new();

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((agent_id, Ok(message))) => {
                    info!("Agent {} responded in {}", agent_id, negotiation_id);
                    self.logger.log(NegotiationEvent::new(
                        events::AUTO_RESPONSE,
                        json!({
                            "negotiation_id": negotiation_id,
                            "agent_id": agent_id,
                            "message_id": message.id,
                            "message_type": message.message_type.as_str(),
                            "stage": stage.as_str(),
                        }),
                    ));
                    progress.on_response_complete(&agent_id, Some(&message));
                    responses.push(message);
                }
                Ok((agent_id, Err(e))) => {
                    warn!(
                        "Auto-response skipped for agent {} in negotiation {}: {}",
                        agent_id, negotiation_id, e
                    );
                    self.logger.log(NegotiationEvent::new(
                        events::AUTO_RESPONSE_SKIPPED,
                        json!({
                            "negotiation_id": negotiation_id,
                            "agent_id": agent_id,
                            "error": e.to_string(),
                        }),
                    ));
                    progress.on_response_complete(&agent_id, None);
                }
                Err(e) => {
                    warn!("Auto-response task failed in {}: {}", negotiation_id, e);
                }
            }
        }

        responses.sort_by_key(|m| m.timestamp);
        responses
    }

    async fn conclude(
        &self,
        negotiation_id: &NegotiationId,
        check: ConsensusCheck,
    ) -> Result<Option<ProposalId>, NegotiationError> {
        let outcome = NegotiationOutcome::completed(check.judgment.summary)
            .with_block(check.judgment.block);
        let output = self.finalize.execute(negotiation_id, outcome).await?;
        Ok(output.proposal.map(|p| p.id))
    }

    async fn announce_round_two(
        &self,
        session: &NegotiationSession,
        check: &ConsensusCheck,
    ) -> Result<(), NegotiationError> {
        let mut metadata = MessageMetadata::new();
        metadata.insert("round".to_string(), json!(2));

        let announcement = NegotiationMessage::new(
            session.id.clone(),
            session.initiator_id.clone(),
            NegotiationPromptTemplate::round_two_announcement(&check.judgment.summary),
            MessageType::System,
        )
        .with_metadata(Some(metadata));
        self.repository.append_message(&announcement).await?;

        info!(
            "Near-miss in negotiation {} (tally {}), opening round 2",
            session.id,
            check.tally.summary()
        );
        self.logger.log(NegotiationEvent::new(
            events::NEAR_MISS,
            json!({
                "negotiation_id": session.id,
                "message_id": announcement.id,
                "summary": check.judgment.summary,
            }),
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        CallKind, MemoryRepository, RecordingLogger, ScriptedCompletion, StoreOp,
    };
    use accord_domain::{NegotiationStatus, SubstringConsensusClassifier};
    use std::time::Duration;

    struct Fixture {
        completion: Arc<ScriptedCompletion>,
        repo: Arc<MemoryRepository>,
        logger: Arc<RecordingLogger>,
        session: NegotiationSession,
    }

    impl Fixture {
        async fn new() -> Self {
            let repo = Arc::new(MemoryRepository::new());
            let session =
                NegotiationSession::open("Budget split", AgentId::new("alice"), None).unwrap();
            repo.insert_session(&session).await.unwrap();
            Self {
                completion: Arc::new(ScriptedCompletion::new()),
                repo,
                logger: Arc::new(RecordingLogger::default()),
                session,
            }
        }

        fn use_case(&self) -> ProcessMessageUseCase<ScriptedCompletion, MemoryRepository> {
            self.use_case_with(EngineParams::default())
        }

        fn use_case_with(
            &self,
            params: EngineParams,
        ) -> ProcessMessageUseCase<ScriptedCompletion, MemoryRepository> {
            ProcessMessageUseCase::new(
                self.completion.clone(),
                self.repo.clone(),
                Arc::new(SubstringConsensusClassifier),
                self.logger.clone(),
                params,
            )
            .with_seed(7)
        }

        async fn seed(&self, messages: &[(&str, &str)]) {
            for (agent, text) in messages {
                let message = NegotiationMessage::new(
                    self.session.id.clone(),
                    AgentId::new(*agent),
                    *text,
                    classify_message_type(text),
                );
                self.repo.append_message(&message).await.unwrap();
            }
        }

        async fn status(&self) -> NegotiationStatus {
            self.repo
                .get_session(&self.session.id)
                .await
                .unwrap()
                .unwrap()
                .status
        }
    }

    #[tokio::test]
    async fn test_first_message_has_no_respondents() {
        let fixture = Fixture::new().await;

        let output = fixture
            .use_case()
            .execute(
                &fixture.session.id,
                ProcessMessageInput::new("alice", "PERSPECTIVE: we need a fair split"),
            )
            .await
            .unwrap();

        assert_eq!(output.message.message_type, MessageType::Statement);
        assert!(output.auto_responses.is_empty());
        assert!(!output.consensus_reached);
        assert_eq!(fixture.completion.calls(CallKind::Response), 0);
        assert_eq!(fixture.logger.count(events::MESSAGE_POSTED), 1);
    }

    #[tokio::test]
    async fn test_perspective_pass_gets_one_reply() {
        let fixture = Fixture::new().await;
        fixture
            .seed(&[("bob", "PERSPECTIVE: engineering first"), ("carol", "PERSPECTIVE: ops")])
            .await;

        let output = fixture
            .use_case()
            .execute(
                &fixture.session.id,
                ProcessMessageInput::new("alice", "PERSPECTIVE: I hear both of you"),
            )
            .await
            .unwrap();

        assert_eq!(output.auto_responses.len(), 1);
        let reply = &output.auto_responses[0];
        assert_ne!(reply.agent_id, AgentId::new("alice"));
        assert_eq!(reply.referenced_message_id.as_ref(), Some(&output.message.id));
        assert_eq!(fixture.logger.count(events::AUTO_RESPONSE), 1);
    }

    #[tokio::test]
    async fn test_failed_respondent_is_skipped() {
        let fixture = Fixture::new().await;
        fixture
            .seed(&[("bob", "PERSPECTIVE: engineering first")])
            .await;
        fixture
            .completion
            .push(CallKind::Response, Err(CompletionError::Unavailable("down".into())));

        let output = fixture
            .use_case()
            .execute(&fixture.session.id, ProcessMessageInput::new("alice", "PERSPECTIVE: ok"))
            .await
            .unwrap();

        assert!(output.auto_responses.is_empty());
        assert_eq!(fixture.logger.count(events::AUTO_RESPONSE_SKIPPED), 1);
        assert_eq!(fixture.repo.list_messages(&fixture.session.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_slow_respondent_times_out() {
        let fixture = Fixture::new().await;
        fixture.seed(&[("bob", "PERSPECTIVE: engineering first")]).await;
        fixture.completion.delay_agent("bob", Duration::from_millis(500));

        let use_case = fixture.use_case_with(
            EngineParams::default().with_response_timeout(Duration::from_millis(20)),
        );
        let output = use_case
            .execute(&fixture.session.id, ProcessMessageInput::new("alice", "PERSPECTIVE: ok"))
            .await
            .unwrap();

        assert!(output.auto_responses.is_empty());
        assert_eq!(fixture.logger.count(events::AUTO_RESPONSE_SKIPPED), 1);
    }

    #[tokio::test]
    async fn test_consensus_finalizes_and_materializes() {
        let fixture = Fixture::new().await;
        fixture
            .seed(&[
                ("alice", "PERSPECTIVE: fair split"),
                ("bob", "PERSPECTIVE: engineering first"),
                ("carol", "OPT-A: 50/30/20"),
                ("bob", "CONSENT:YES to OPT-A"),
            ])
            .await;
        fixture.completion.push_ok(
            CallKind::Consensus,
            "Consensus reached at 100% affirmative.\nterms: OPT-A 50/30/20\ndecisionClass: standard",
        );

        let output = fixture
            .use_case()
            .execute(
                &fixture.session.id,
                ProcessMessageInput::new("alice", "CONSENT:YES, OPT-A works"),
            )
            .await
            .unwrap();

        assert_eq!(output.message.message_type, MessageType::Agreement);
        assert!(output.consensus_reached);
        assert!(output.proposal_id.is_some());
        assert_eq!(fixture.status().await, NegotiationStatus::Completed);
        assert_eq!(fixture.repo.proposal_count(), 1);
    }

    #[tokio::test]
    async fn test_near_miss_opens_round_two() {
        let fixture = Fixture::new().await;
        fixture
            .seed(&[
                ("alice", "PERSPECTIVE: fair split"),
                ("bob", "PERSPECTIVE: engineering first"),
                ("carol", "OPT-A: 50/30/20"),
                ("bob", "CONSENT:YES to OPT-A"),
            ])
            .await;
        fixture.completion.push_ok(
            CallKind::Consensus,
            "No consensus: affirmative support sits at 72%, carol objects.",
        );

        let output = fixture
            .use_case()
            .execute(&fixture.session.id, ProcessMessageInput::new("alice", "CONSENT:YES"))
            .await
            .unwrap();

        assert!(!output.consensus_reached);
        assert!(output.near_miss);
        assert_eq!(fixture.status().await, NegotiationStatus::Active);

        let messages = fixture.repo.list_messages(&fixture.session.id).await.unwrap();
        let announcement = messages
            .iter()
            .find(|m| m.message_type == MessageType::System)
            .unwrap();
        assert!(announcement.content.contains("ROUND-2"));
        assert_eq!(announcement.agent_id, AgentId::new("alice"));
        assert_eq!(
            announcement.metadata.as_ref().unwrap().get("round"),
            Some(&json!(2))
        );
        assert_eq!(fixture.logger.count(events::NEAR_MISS), 1);
    }

    #[tokio::test]
    async fn test_consensus_failure_is_not_fatal() {
        let fixture = Fixture::new().await;
        fixture
            .seed(&[
                ("alice", "PERSPECTIVE: a"),
                ("bob", "PERSPECTIVE: b"),
                ("carol", "PERSPECTIVE: c"),
                ("bob", "OPT-A: split"),
            ])
            .await;
        fixture
            .completion
            .push(CallKind::Consensus, Err(CompletionError::Timeout));

        let output = fixture
            .use_case()
            .execute(&fixture.session.id, ProcessMessageInput::new("alice", "OPT-B: rotate"))
            .await
            .unwrap();

        assert_eq!(output.message.message_type, MessageType::Proposal);
        assert!(!output.consensus_reached);
        assert_eq!(fixture.status().await, NegotiationStatus::Active);
    }

    async fn seed_option_stage(fixture: &Fixture) {
        fixture
            .seed(&[
                ("alice", "PERSPECTIVE: fair split"),
                ("bob", "PERSPECTIVE: engineering first"),
                ("carol", "OPT-A: 50/30/20"),
                ("bob", "CONSENT:YES to OPT-A"),
            ])
            .await;
    }

    #[tokio::test]
    async fn test_finalize_failure_still_returns_message() {
        let fixture = Fixture::new().await;
        seed_option_stage(&fixture).await;
        fixture
            .completion
            .push_ok(CallKind::Consensus, "Consensus reached. terms: OPT-A");
        fixture.repo.fail(StoreOp::UpdateSession);

        let output = fixture
            .use_case()
            .execute(&fixture.session.id, ProcessMessageInput::new("alice", "CONSENT:YES"))
            .await
            .unwrap();

        assert!(output.consensus_reached);
        assert!(output.proposal_id.is_none());
        assert_eq!(output.message.content, "CONSENT:YES");
        let stored = fixture.repo.get_message(&output.message.id).await.unwrap();
        assert!(stored.is_some());
        assert_eq!(fixture.status().await, NegotiationStatus::Active);
    }

    #[tokio::test]
    async fn test_announcement_failure_still_returns_message() {
        let fixture = Fixture::new().await;
        seed_option_stage(&fixture).await;
        fixture
            .completion
            .push_ok(CallKind::Consensus, "No consensus yet, support is at 71%.");
        fixture.repo.fail(StoreOp::AppendSystemMessage);

        let output = fixture
            .use_case()
            .execute(&fixture.session.id, ProcessMessageInput::new("alice", "CONSENT:YES"))
            .await
            .unwrap();

        assert!(output.near_miss);
        assert!(!output.consensus_reached);
        let messages = fixture.repo.list_messages(&fixture.session.id).await.unwrap();
        assert!(messages.iter().all(|m| m.message_type != MessageType::System));
        assert!(messages.iter().any(|m| m.id == output.message.id));
    }

    #[tokio::test]
    async fn test_listing_failure_skips_respondents() {
        let fixture = Fixture::new().await;
        fixture.seed(&[("bob", "PERSPECTIVE: engineering first")]).await;
        fixture.repo.fail(StoreOp::ListMessages);

        let output = fixture
            .use_case()
            .execute(&fixture.session.id, ProcessMessageInput::new("alice", "PERSPECTIVE: ok"))
            .await
            .unwrap();

        assert!(output.auto_responses.is_empty());
        assert!(!output.consensus_reached);
        assert_eq!(fixture.completion.calls(CallKind::Response), 0);
        assert!(fixture.repo.get_message(&output.message.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_validation_before_write() {
        let fixture = Fixture::new().await;
        let use_case = fixture.use_case();

        assert!(matches!(
            use_case
                .execute(&fixture.session.id, ProcessMessageInput::new("alice", "   "))
                .await,
            Err(NegotiationError::Validation(_))
        ));

        let foreign = NegotiationMessage::new(
            NegotiationId::new("other"),
            AgentId::new("bob"),
            "hello",
            MessageType::Statement,
        );
        fixture.repo.append_message(&foreign).await.unwrap();
        assert!(matches!(
            use_case
                .execute(
                    &fixture.session.id,
                    ProcessMessageInput::new("alice", "re").with_reference(foreign.id.clone()),
                )
                .await,
            Err(NegotiationError::Validation(_))
        ));

        assert!(matches!(
            use_case
                .execute(&NegotiationId::new("missing"), ProcessMessageInput::new("alice", "hi"))
                .await,
            Err(NegotiationError::NotFound { .. })
        ));

        assert!(fixture.repo.list_messages(&fixture.session.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_closed_session_rejects_messages() {
        let fixture = Fixture::new().await;
        let mut session = fixture.session.clone();
        session.conclude(NegotiationStatus::Abandoned, chrono::Utc::now());
        fixture.repo.update_session(&session).await.unwrap();

        let result = fixture
            .use_case()
            .execute(&session.id, ProcessMessageInput::new("alice", "anyone?"))
            .await;
        assert!(matches!(result, Err(NegotiationError::Validation(_))));
    }

    #[tokio::test]
    async fn test_post_generated_turn() {
        let fixture = Fixture::new().await;
        fixture.seed(&[("alice", "PERSPECTIVE: fair split")]).await;
        fixture
            .completion
            .push_ok(CallKind::Response, "PERSPECTIVE: alice wants fairness, I agree on that");

        let output = fixture
            .use_case()
            .post_generated_turn(&fixture.session.id, &AgentId::new("bob"), &NoProgress)
            .await
            .unwrap();

        assert_eq!(output.message.agent_id, AgentId::new("bob"));
        assert!(output.message.content.starts_with("PERSPECTIVE:"));
        assert_eq!(
            output.message.metadata.as_ref().unwrap().get("stage"),
            Some(&json!("PERSPECTIVE_PASS"))
        );
        // alice answers bob
        assert_eq!(output.auto_responses.len(), 1);
        assert_eq!(output.auto_responses[0].agent_id, AgentId::new("alice"));
    }
}
