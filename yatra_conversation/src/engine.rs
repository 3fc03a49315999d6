//! The turn engine: one inbound message in, one response out.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::json;
use tokio::task::JoinSet;
use tracing::{info, warn};

use yatra_agents::AgentRegistry;
use yatra_core::{
    AgentOutputRecord, ConversationState, EngineError, EntitySlots, MessageRecord, OutputKind,
    Role, SearchResult, ServiceType, SessionRecord, SessionStats, SessionStore, TravelerInfo,
    TurnWarning,
};
use yatra_language::{EntityExtractor, LanguageBridge};

use crate::compose::ResponseComposer;
use crate::followup::{FollowupIntent, FollowupResolver};
use crate::router::{RouteDecision, SlotRouter};

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Outer deadline for one turn's capability fan-out. In-flight
    /// agents past this point are abandoned and their sections render
    /// degraded.
    pub turn_deadline: Duration,
    /// Messages returned in a session snapshot.
    pub history_limit: u64,
    /// Agent outputs returned in a session snapshot.
    pub snapshot_output_limit: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            turn_deadline: Duration::from_secs(60),
            history_limit: 10,
            snapshot_output_limit: 50,
        }
    }
}

/// One inbound message.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    /// Omitted id means "start a new session".
    pub session_id: Option<String>,
    pub message: String,
    pub is_followup: bool,
}

/// The transport-facing result of one turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnResponse {
    pub session_id: String,
    pub response_text: String,
    pub detected_language: Option<String>,
    pub is_followup: bool,
    pub is_booking: bool,
    /// `false` means the response is a clarification question, not a
    /// final answer.
    pub is_complete: bool,
    pub agents_called: Vec<String>,
    pub warnings: Vec<String>,
    pub status: String,
}

/// Full session inspection surface.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub language: Option<String>,
    pub state: ConversationState,
    pub entities: EntitySlots,
    pub conversation_history: Vec<MessageRecord>,
    pub search_results: Vec<SearchResult>,
    pub agent_outputs: Vec<AgentOutputRecord>,
    pub stats: SessionStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: String,
    pub storage_ok: bool,
    pub capabilities_reachable: bool,
    pub capabilities: Vec<&'static str>,
}

/// Outcome of the routing half of a turn, before back-translation.
struct TurnOutcome {
    pivot_response: String,
    state: ConversationState,
    is_complete: bool,
    is_booking: bool,
    agents_called: Vec<String>,
    warnings: Vec<TurnWarning>,
}

impl TurnOutcome {
    fn answer(pivot_response: String) -> Self {
        Self {
            pivot_response,
            state: ConversationState::Answered,
            is_complete: true,
            is_booking: false,
            agents_called: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn clarification(pivot_response: String, state: ConversationState) -> Self {
        Self {
            pivot_response,
            state,
            is_complete: false,
            is_booking: false,
            agents_called: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Turn orchestration engine.
///
/// Holds the session store and the capability seams by handle; one
/// instance serves every session concurrently. All writes for a turn
/// happen under that session's lock, so concurrent messages to the
/// same session queue instead of interleaving.
pub struct TurnEngine<S> {
    store: S,
    bridge: LanguageBridge,
    registry: AgentRegistry,
    extractor: EntityExtractor,
    router: SlotRouter,
    resolver: FollowupResolver,
    composer: ResponseComposer,
    config: EngineConfig,
}

impl<S> TurnEngine<S>
where
    S: SessionStore,
{
    #[must_use]
    pub fn new(store: S, bridge: LanguageBridge, registry: AgentRegistry) -> Self {
        Self {
            store,
            bridge,
            registry,
            extractor: EntityExtractor::new(),
            router: SlotRouter::new(),
            resolver: FollowupResolver::new(),
            composer: ResponseComposer::new(),
            config: EngineConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// The underlying store handle.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Process one turn end to end.
    pub async fn process_turn(&self, request: TurnRequest) -> Result<TurnResponse, EngineError> {
        let session_id = match &request.session_id {
            Some(id) => {
                if self.store.get_session(id).await?.is_none() {
                    return Err(EngineError::SessionNotFound(id.clone()));
                }
                id.clone()
            }
            None => self.store.create_session(HashMap::new()).await?,
        };

        // One writer per session for the whole turn.
        let _turn_guard = self.store.lock_session(&session_id).await;

        let session = self
            .store
            .get_session(&session_id)
            .await?
            .ok_or_else(|| EngineError::SessionNotFound(session_id.clone()))?;

        info!(
            "Turn start: session={} followup={}",
            session_id, request.is_followup
        );

        let mut warnings: Vec<TurnWarning> = Vec::new();

        let (language, w) = self
            .bridge
            .detect(&request.message, session.language.as_deref())
            .await;
        warnings.extend(w);

        let (pivot, w) = self.bridge.to_pivot(&request.message, &language).await;
        warnings.extend(w);

        if session.language.as_deref() != Some(language.as_str()) {
            self.store.set_language(&session_id, &language).await?;
        }

        self.store
            .append_message(
                &session_id,
                Role::User,
                &request.message,
                Some(json!({
                    "is_followup": request.is_followup,
                    "detected_language": language,
                })),
            )
            .await?;

        let outcome = if request.is_followup {
            self.handle_followup(&session_id, &pivot, &session).await?
        } else {
            self.handle_new_query(&session_id, &pivot, &session).await?
        };

        for warning in &outcome.warnings {
            if !warnings.contains(warning) {
                warnings.push(*warning);
            }
        }

        let (response_text, w) = self.bridge.from_pivot(&outcome.pivot_response, &language).await;
        warnings.extend(w);

        self.store.set_state(&session_id, outcome.state).await?;

        self.store
            .append_message(
                &session_id,
                Role::Assistant,
                &response_text,
                Some(json!({
                    "detected_language": language,
                    "is_followup": request.is_followup,
                    "is_complete": outcome.is_complete,
                    "is_booking": outcome.is_booking,
                    "agents_called": outcome.agents_called,
                })),
            )
            .await?;

        info!(
            "Turn done: session={} complete={} booking={} agents={}",
            session_id,
            outcome.is_complete,
            outcome.is_booking,
            outcome.agents_called.len()
        );

        Ok(TurnResponse {
            session_id,
            response_text,
            detected_language: Some(language),
            is_followup: request.is_followup,
            is_booking: outcome.is_booking,
            is_complete: outcome.is_complete,
            agents_called: outcome.agents_called,
            warnings: warnings.iter().map(ToString::to_string).collect(),
            status: "success".to_string(),
        })
    }

    /// Full session inspection, or `SessionNotFound`.
    pub async fn snapshot(&self, session_id: &str) -> Result<SessionSnapshot, EngineError> {
        let session = self
            .store
            .get_session(session_id)
            .await?
            .ok_or_else(|| EngineError::SessionNotFound(session_id.to_owned()))?;

        let conversation_history = self
            .store
            .conversation_history(session_id, self.config.history_limit)
            .await?;
        let agent_outputs = self
            .store
            .recent_agent_outputs(session_id, &[], self.config.snapshot_output_limit)
            .await?;

        // Outputs arrive newest-first; present result sets chronologically.
        let mut search_results: Vec<SearchResult> = agent_outputs
            .iter()
            .filter(|o| o.kind == OutputKind::SearchResults)
            .filter_map(|o| serde_json::from_value(o.payload.clone()).ok())
            .collect();
        search_results.reverse();

        let stats = self.store.session_stats(session_id).await?;

        Ok(SessionSnapshot {
            session_id: session.id,
            language: session.language,
            state: session.state,
            entities: session.entities,
            conversation_history,
            search_results,
            agent_outputs,
            stats,
        })
    }

    /// Idempotent delete; reports whether the session existed.
    pub async fn delete_session(&self, session_id: &str) -> Result<bool, EngineError> {
        self.store.delete_session(session_id).await
    }

    pub async fn health_check(&self) -> HealthReport {
        let storage_ok = self.store.ping().await.is_ok();
        let capabilities_reachable = !self.registry.is_empty();

        let status = if storage_ok && capabilities_reachable {
            "healthy"
        } else {
            "degraded"
        };

        HealthReport {
            status: status.to_string(),
            storage_ok,
            capabilities_reachable,
            capabilities: self.registry.list(),
        }
    }

    async fn handle_new_query(
        &self,
        session_id: &str,
        pivot: &str,
        prior: &SessionRecord,
    ) -> Result<TurnOutcome, EngineError> {
        let extraction = self.extractor.extract(pivot);

        let new_services = &extraction.slots.services;
        let slots = if !new_services.is_empty()
            && !prior.entities.services.is_empty()
            && *new_services != prior.entities.services
        {
            // Unrelated or overlapping new intent: keep what still
            // makes sense, drop what conflicts.
            info!(
                "Service switch {:?} -> {:?}, retaining compatible slots",
                prior.entities.services, new_services
            );
            let mut base = prior.entities.retained_for(new_services);
            base.merge(&extraction.slots);
            self.store.replace_entity_slots(session_id, &base).await?;
            base
        } else {
            self.store
                .merge_entity_slots(session_id, &extraction.slots)
                .await?
        };

        match self.router.route(&slots) {
            RouteDecision::Redirect => {
                let text = if extraction.services.contains(&ServiceType::Booking) {
                    "Booking works as a follow-up: search for flights, hotels, trains or \
                     attractions first, then tell me which option to book."
                } else {
                    "I can help with flights, hotels, trains and buses, attractions, and \
                     bookings. Tell me where you want to go and when."
                };
                Ok(TurnOutcome {
                    state: ConversationState::Collecting,
                    ..TurnOutcome::answer(text.to_string())
                })
            }
            RouteDecision::Clarify { question, .. } => {
                Ok(TurnOutcome::clarification(question, ConversationState::Collecting))
            }
            RouteDecision::Dispatch { services } => {
                self.store
                    .set_state(session_id, ConversationState::Ready)
                    .await?;
                self.store
                    .set_state(session_id, ConversationState::Dispatched)
                    .await?;

                let results = self.dispatch(&services, &slots).await;

                let mut agents_called = Vec::new();
                let mut warnings = Vec::new();
                for result in &results {
                    let agent_name = self
                        .registry
                        .get(result.service)
                        .map_or_else(|| format!("{}_agent", result.service), |a| a.name().to_string());

                    self.store
                        .append_agent_output(
                            session_id,
                            &agent_name,
                            "search",
                            OutputKind::SearchResults,
                            serde_json::to_value(result).map_err(EngineError::storage)?,
                        )
                        .await?;
                    agents_called.push(agent_name);

                    if result.degraded && !warnings.contains(&TurnWarning::ProviderUnavailable) {
                        warnings.push(TurnWarning::ProviderUnavailable);
                    }
                }

                let response = self.composer.compose(&results, None);
                self.store
                    .append_agent_output(
                        session_id,
                        "composer",
                        "respond",
                        OutputKind::SynthesizedResponse,
                        json!(response),
                    )
                    .await?;

                Ok(TurnOutcome {
                    agents_called,
                    warnings,
                    ..TurnOutcome::answer(response)
                })
            }
        }
    }

    async fn handle_followup(
        &self,
        session_id: &str,
        pivot: &str,
        prior: &SessionRecord,
    ) -> Result<TurnOutcome, EngineError> {
        self.store
            .set_state(session_id, ConversationState::Followup)
            .await?;

        // Booking details arrive piecemeal across follow-up turns;
        // merge whatever this one carries before deciding anything.
        let extraction = self.extractor.extract(pivot);
        let booking_partial = EntitySlots {
            selected_option: extraction.slots.selected_option,
            traveler_name: extraction.slots.traveler_name.clone(),
            contact: extraction.slots.contact.clone(),
            email: extraction.slots.email.clone(),
            ..EntitySlots::default()
        };
        let supplied_detail = booking_partial.traveler_name.is_some()
            || booking_partial.contact.is_some()
            || booking_partial.email.is_some();
        let slots = self
            .store
            .merge_entity_slots(session_id, &booking_partial)
            .await?;

        let cached = self.latest_search_result(session_id).await?;

        let mut intent = self.resolver.classify(pivot);
        // Mid-booking, a bare detail ("Email: x@y.com") continues the
        // booking rather than starting an informational query.
        if prior.state == ConversationState::Booking
            && supplied_detail
            && slots.selected_option.is_some()
        {
            intent = FollowupIntent::Booking;
        }

        match intent {
            FollowupIntent::Booking => self.handle_booking(session_id, &slots, cached.as_ref()).await,
            FollowupIntent::Informational(query) => {
                let Some(cached) = cached else {
                    return Ok(TurnOutcome::answer(
                        "I don't have any search results for this session yet. Ask me for \
                         flights, hotels, trains or attractions first."
                            .to_string(),
                    ));
                };

                // Answered purely from the cache: no capability call.
                let answer = self.resolver.answer(query, &cached);

                self.store
                    .append_agent_output(
                        session_id,
                        "followup_resolver",
                        "followup",
                        OutputKind::SynthesizedResponse,
                        json!(answer),
                    )
                    .await?;

                Ok(TurnOutcome {
                    agents_called: vec!["followup_resolver".to_string()],
                    ..TurnOutcome::answer(answer)
                })
            }
            FollowupIntent::Ambiguous => Ok(TurnOutcome::clarification(
                "I'm not sure what you are referring to. You can ask about an option by \
                 number, or tell me which one to book."
                    .to_string(),
                ConversationState::Followup,
            )),
        }
    }

    async fn handle_booking(
        &self,
        session_id: &str,
        slots: &EntitySlots,
        cached: Option<&SearchResult>,
    ) -> Result<TurnOutcome, EngineError> {
        self.store
            .set_state(session_id, ConversationState::Booking)
            .await?;

        let Some(cached) = cached else {
            return Ok(TurnOutcome::answer(
                "There is nothing to book yet. Search for flights, hotels, trains or \
                 attractions first, then pick an option."
                    .to_string(),
            ));
        };

        let Some(index) = slots.selected_option else {
            return Ok(TurnOutcome::clarification(
                "Could you tell me which option you would like to book (for example, \
                 \"the second one\")?"
                    .to_string(),
                ConversationState::Booking,
            ));
        };

        let Some(offer) = index.checked_sub(1).and_then(|i| cached.offers.get(i)) else {
            return Ok(TurnOutcome::clarification(
                format!(
                    "There are only {} options in the last search, so option {} doesn't \
                     exist. Which one would you like?",
                    cached.offers.len(),
                    index
                ),
                ConversationState::Booking,
            ));
        };

        let traveler = TravelerInfo::from_slots(slots);
        let missing = traveler.missing();
        if !missing.is_empty() {
            // Never book silently: ask for exactly what is absent.
            let phrases: Vec<&str> = missing.iter().map(|k| k.ask_phrase()).collect();
            return Ok(TurnOutcome::clarification(
                format!(
                    "To confirm this booking I still need {}.",
                    phrases.join(", and ")
                ),
                ConversationState::Booking,
            ));
        }

        let Some(agent) = self.registry.get(ServiceType::Booking) else {
            return Ok(TurnOutcome {
                warnings: vec![TurnWarning::ProviderUnavailable],
                ..TurnOutcome::answer(
                    "Booking is unavailable right now. Please try again later.".to_string(),
                )
            });
        };

        match agent.book(offer, &traveler).await {
            Ok(confirmation) => {
                self.store
                    .append_agent_output(
                        session_id,
                        agent.name(),
                        "book",
                        OutputKind::BookingConfirmation,
                        serde_json::to_value(&confirmation).map_err(EngineError::storage)?,
                    )
                    .await?;

                let response = self.composer.compose(&[], Some(&confirmation));
                Ok(TurnOutcome {
                    is_booking: true,
                    agents_called: vec![agent.name().to_string()],
                    ..TurnOutcome::answer(response)
                })
            }
            Err(e) => {
                warn!("Booking failed: {e}");
                Ok(TurnOutcome {
                    state: ConversationState::Booking,
                    warnings: vec![TurnWarning::ProviderUnavailable],
                    ..TurnOutcome::answer(
                        "The booking could not be completed right now. Please try again."
                            .to_string(),
                    )
                })
            }
        }
    }

    /// Concurrent fan-out over the implied services, joined before
    /// composition. Total latency is bounded by the slowest agent or
    /// the outer deadline, whichever comes first.
    async fn dispatch(&self, services: &[ServiceType], slots: &EntitySlots) -> Vec<SearchResult> {
        let mut set: JoinSet<SearchResult> = JoinSet::new();

        for service in services {
            if let Some(agent) = self.registry.get(*service) {
                let agent = Arc::clone(agent);
                let slots = slots.clone();
                set.spawn(async move { agent.search(&slots).await });
            } else {
                warn!("No agent registered for {service}");
            }
        }

        let mut completed: Vec<SearchResult> = Vec::new();
        let all_joined = tokio::time::timeout(self.config.turn_deadline, async {
            while let Some(joined) = set.join_next().await {
                match joined {
                    Ok(result) => completed.push(result),
                    Err(e) => warn!("Agent task failed: {e}"),
                }
            }
        })
        .await;

        if all_joined.is_err() {
            warn!("Turn deadline exceeded; abandoning in-flight agents");
            set.abort_all();
        }

        // Anything that didn't make it renders as a degraded section.
        for service in services {
            if !completed.iter().any(|r| r.service == *service) {
                completed.push(SearchResult::unavailable(*service, "deadline"));
            }
        }

        completed.sort_by_key(|r| {
            ServiceType::DISPATCH_ORDER
                .iter()
                .position(|s| *s == r.service)
                .unwrap_or(usize::MAX)
        });
        completed
    }

    async fn latest_search_result(
        &self,
        session_id: &str,
    ) -> Result<Option<SearchResult>, EngineError> {
        let outputs = self
            .store
            .recent_agent_outputs(session_id, &[OutputKind::SearchResults], 1)
            .await?;

        Ok(outputs
            .into_iter()
            .next()
            .and_then(|o| serde_json::from_value(o.payload).ok()))
    }
}
