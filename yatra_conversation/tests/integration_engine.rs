//! End-to-end turn engine tests with stub providers and an in-memory
//! store.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use yatra_agents::AgentRegistry;
use yatra_conversation::{TurnEngine, TurnRequest};
use yatra_core::{
    ConversationState, Detection, EngineError, Offer, SearchProvider, ServiceType, SessionStore,
    TranslationProvider,
};
use yatra_language::LanguageBridge;
use yatra_memory::MemoryManager;

/// English-only translator stub: confident detection, identity
/// translation.
struct EchoTranslator;

#[async_trait]
impl TranslationProvider for EchoTranslator {
    async fn detect(&self, _text: &str) -> anyhow::Result<Detection> {
        Ok(Detection {
            language: "en".to_string(),
            confidence: 0.9,
        })
    }

    async fn translate(&self, text: &str, _from: &str, _to: &str) -> anyhow::Result<String> {
        Ok(text.to_string())
    }
}

/// Search stub returning three fixed offers and counting every call,
/// so tests can assert that follow-ups never reach it.
struct CountingProvider {
    calls: AtomicUsize,
}

impl CountingProvider {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for CountingProvider {
    fn name(&self) -> &str {
        "counting"
    }

    async fn search(&self, _service: ServiceType, _query: &str) -> anyhow::Result<Vec<Offer>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut offers = Vec::new();
        for (title, price, dep) in [
            ("IndiGo 6E-123", 5000.0, "06:00"),
            ("SpiceJet SG-456", 3000.0, "07:15"),
            ("Air India AI-860", 4000.0, "05:30"),
        ] {
            let mut offer = Offer::new(title);
            offer.price = Some(price);
            offer.departure = Some(dep.to_string());
            offers.push(offer);
        }
        Ok(offers)
    }
}

struct FailingProvider;

#[async_trait]
impl SearchProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn search(&self, _service: ServiceType, _query: &str) -> anyhow::Result<Vec<Offer>> {
        anyhow::bail!("connection refused")
    }
}

async fn engine_with(provider: Arc<dyn SearchProvider>) -> TurnEngine<MemoryManager> {
    let store = MemoryManager::in_memory().await.unwrap();
    let bridge = LanguageBridge::new(Arc::new(EchoTranslator));
    let registry = AgentRegistry::with_defaults(provider, Duration::from_secs(2));
    TurnEngine::new(store, bridge, registry)
}

fn turn(session_id: Option<&str>, message: &str, is_followup: bool) -> TurnRequest {
    TurnRequest {
        session_id: session_id.map(str::to_string),
        message: message.to_string(),
        is_followup,
    }
}

#[tokio::test]
async fn incomplete_flight_query_asks_for_the_date_first() {
    let provider = CountingProvider::new();
    let engine = engine_with(provider.clone() as Arc<dyn SearchProvider>).await;

    let response = engine
        .process_turn(turn(None, "flight Pune to Delhi", false))
        .await
        .unwrap();

    assert!(!response.is_complete);
    assert!(!response.is_booking);
    assert!(response.response_text.contains("travel date"));
    assert!(response.agents_called.is_empty());
    assert_eq!(provider.call_count(), 0);

    let session = engine
        .store()
        .get_session(&response.session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.state, ConversationState::Collecting);
    assert_eq!(session.entities.origin.as_deref(), Some("Pune"));
    assert_eq!(session.entities.destination.as_deref(), Some("Delhi"));
}

#[tokio::test]
async fn clarification_answer_merges_into_the_retained_intent() {
    let provider = CountingProvider::new();
    let engine = engine_with(provider.clone() as Arc<dyn SearchProvider>).await;

    let first = engine
        .process_turn(turn(None, "flight Pune to Delhi", false))
        .await
        .unwrap();
    assert!(!first.is_complete);

    // The answer names no service and no route: everything comes from
    // the session's retained slots.
    let second = engine
        .process_turn(turn(
            Some(&first.session_id),
            "2025-12-10 for 1 traveler",
            false,
        ))
        .await
        .unwrap();

    assert!(second.is_complete);
    assert_eq!(second.agents_called, vec!["flight_agent"]);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn complete_flight_query_dispatches_exactly_once() {
    let provider = CountingProvider::new();
    let engine = engine_with(provider.clone() as Arc<dyn SearchProvider>).await;

    let response = engine
        .process_turn(turn(
            None,
            "I need a flight from Pune to Delhi on 2025-12-10 for 1 person",
            false,
        ))
        .await
        .unwrap();

    assert!(response.is_complete);
    assert_eq!(response.agents_called, vec!["flight_agent"]);
    assert_eq!(provider.call_count(), 1);
    assert!(response.response_text.contains("Flight options"));
    assert!(response.response_text.contains("IndiGo 6E-123"));

    let session = engine
        .store()
        .get_session(&response.session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.state, ConversationState::Answered);
}

#[tokio::test]
async fn cheapest_followup_is_answered_from_cache_without_any_agent_call() {
    let provider = CountingProvider::new();
    let engine = engine_with(provider.clone() as Arc<dyn SearchProvider>).await;

    let first = engine
        .process_turn(turn(
            None,
            "flight from Pune to Delhi on 2025-12-10 for 1 person",
            false,
        ))
        .await
        .unwrap();
    assert_eq!(provider.call_count(), 1);

    let followup = engine
        .process_turn(turn(Some(&first.session_id), "which is cheapest", true))
        .await
        .unwrap();

    // The ₹3000 offer wins, and the provider was not consulted again.
    assert!(followup.response_text.contains("SpiceJet SG-456"));
    assert!(followup.is_complete);
    assert_eq!(followup.agents_called, vec!["followup_resolver"]);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn booking_asks_for_missing_email_then_confirms() {
    let provider = CountingProvider::new();
    let engine = engine_with(provider.clone() as Arc<dyn SearchProvider>).await;

    let first = engine
        .process_turn(turn(
            None,
            "flight from Pune to Delhi on 2025-12-10 for 1 person",
            false,
        ))
        .await
        .unwrap();

    let missing_email = engine
        .process_turn(turn(
            Some(&first.session_id),
            "Book the second one - Name: John Doe, Contact: 9876543210",
            true,
        ))
        .await
        .unwrap();

    assert!(!missing_email.is_complete);
    assert!(!missing_email.is_booking);
    assert!(missing_email.response_text.contains("email"));

    let confirmed = engine
        .process_turn(turn(
            Some(&first.session_id),
            "Email: john@example.com",
            true,
        ))
        .await
        .unwrap();

    assert!(confirmed.is_booking);
    assert!(confirmed.is_complete);
    assert!(confirmed.response_text.contains("YT-"));
    assert!(confirmed.response_text.contains("SpiceJet SG-456"));
    assert_eq!(confirmed.agents_called, vec!["booking_agent"]);

    // Booking never re-ran the search.
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn multi_service_query_fans_out_and_keeps_section_order() {
    let provider = CountingProvider::new();
    let engine = engine_with(provider.clone() as Arc<dyn SearchProvider>).await;

    let response = engine
        .process_turn(turn(
            None,
            "flights and hotels from Pune to Goa on 2025-12-10 for 2 people",
            false,
        ))
        .await
        .unwrap();

    assert!(response.is_complete);
    assert_eq!(provider.call_count(), 2);
    assert!(response.agents_called.contains(&"flight_agent".to_string()));
    assert!(response.agents_called.contains(&"hotel_agent".to_string()));

    let flight_at = response.response_text.find("Flight options").unwrap();
    let hotel_at = response.response_text.find("Hotel options").unwrap();
    assert!(flight_at < hotel_at);
}

#[tokio::test]
async fn provider_outage_degrades_the_section_not_the_turn() {
    let engine = engine_with(Arc::new(FailingProvider)).await;

    let response = engine
        .process_turn(turn(
            None,
            "flight from Pune to Delhi on 2025-12-10 for 1 person",
            false,
        ))
        .await
        .unwrap();

    assert!(response.is_complete);
    assert_eq!(response.status, "success");
    assert!(response.response_text.contains("no results found right now"));
    assert!(response
        .warnings
        .contains(&"provider_unavailable".to_string()));
}

#[tokio::test]
async fn unknown_session_id_is_a_caller_visible_error() {
    let engine = engine_with(CountingProvider::new() as Arc<dyn SearchProvider>).await;

    let err = engine
        .process_turn(turn(Some("no-such-session"), "hello", false))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::SessionNotFound(_)));

    let err = engine.snapshot("no-such-session").await.unwrap_err();
    assert!(matches!(err, EngineError::SessionNotFound(_)));

    // Deleting an unknown session is not an error, just a signal.
    assert!(!engine.delete_session("no-such-session").await.unwrap());
}

#[tokio::test]
async fn small_talk_gets_a_redirect_answer() {
    let provider = CountingProvider::new();
    let engine = engine_with(provider.clone() as Arc<dyn SearchProvider>).await;

    let response = engine
        .process_turn(turn(None, "hello there my friend", false))
        .await
        .unwrap();

    assert!(response.is_complete);
    assert!(response.response_text.contains("flights, hotels"));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn switching_service_retains_destination_and_drops_origin() {
    let provider = CountingProvider::new();
    let engine = engine_with(provider.clone() as Arc<dyn SearchProvider>).await;

    let first = engine
        .process_turn(turn(
            None,
            "flight from Pune to Delhi on 2025-12-10 for 1 person",
            false,
        ))
        .await
        .unwrap();
    assert!(first.is_complete);

    // New intent, different service, no slots restated: destination,
    // date and travelers carry over, so the hotel search can run
    // immediately.
    let second = engine
        .process_turn(turn(Some(&first.session_id), "now find hotels", false))
        .await
        .unwrap();

    assert!(second.is_complete);
    assert_eq!(second.agents_called, vec!["hotel_agent"]);

    let session = engine
        .store()
        .get_session(&first.session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.entities.services, vec![ServiceType::Hotel]);
    assert!(session.entities.origin.is_none());
    assert_eq!(session.entities.destination.as_deref(), Some("Delhi"));
}

#[tokio::test]
async fn concurrent_sessions_never_observe_each_other() {
    let provider = CountingProvider::new();
    let engine = Arc::new(engine_with(provider.clone() as Arc<dyn SearchProvider>).await);

    let e1 = Arc::clone(&engine);
    let task_a = tokio::spawn(async move {
        let first = e1
            .process_turn(turn(None, "flight Pune to Delhi", false))
            .await
            .unwrap();
        for _ in 0..3 {
            e1.process_turn(turn(Some(&first.session_id), "still thinking", false))
                .await
                .unwrap();
        }
        first.session_id
    });

    let e2 = Arc::clone(&engine);
    let task_b = tokio::spawn(async move {
        let first = e2
            .process_turn(turn(None, "hotel in Goa for 2 guests", false))
            .await
            .unwrap();
        for _ in 0..3 {
            e2.process_turn(turn(Some(&first.session_id), "hmm", false))
                .await
                .unwrap();
        }
        first.session_id
    });

    let id_a = task_a.await.unwrap();
    let id_b = task_b.await.unwrap();

    let a = engine.store().get_session(&id_a).await.unwrap().unwrap();
    let b = engine.store().get_session(&id_b).await.unwrap().unwrap();

    assert_eq!(a.entities.services, vec![ServiceType::Flight]);
    assert_eq!(a.entities.origin.as_deref(), Some("Pune"));
    assert_eq!(a.entities.destination.as_deref(), Some("Delhi"));

    assert_eq!(b.entities.services, vec![ServiceType::Hotel]);
    assert_eq!(b.entities.destination.as_deref(), Some("Goa"));
    assert_eq!(b.entities.travelers, Some(2));
    assert!(b.entities.origin.is_none());
}

#[tokio::test]
async fn snapshot_reflects_the_whole_session() {
    let provider = CountingProvider::new();
    let engine = engine_with(provider.clone() as Arc<dyn SearchProvider>).await;

    let first = engine
        .process_turn(turn(
            None,
            "flight from Pune to Delhi on 2025-12-10 for 1 person",
            false,
        ))
        .await
        .unwrap();
    engine
        .process_turn(turn(Some(&first.session_id), "which is cheapest", true))
        .await
        .unwrap();

    let snapshot = engine.snapshot(&first.session_id).await.unwrap();

    assert_eq!(snapshot.language.as_deref(), Some("en"));
    assert_eq!(snapshot.stats.message_count, 4);
    assert!(snapshot.stats.agent_call_count >= 3);
    assert_eq!(snapshot.search_results.len(), 1);
    assert_eq!(snapshot.search_results[0].offers.len(), 3);
    assert_eq!(snapshot.entities.destination.as_deref(), Some("Delhi"));

    // History is chronological and alternates user/assistant.
    assert_eq!(snapshot.conversation_history.len(), 4);
    for pair in snapshot.conversation_history.windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
}

#[tokio::test]
async fn health_check_reports_storage_and_capabilities() {
    let engine = engine_with(CountingProvider::new() as Arc<dyn SearchProvider>).await;

    let health = engine.health_check().await;
    assert_eq!(health.status, "healthy");
    assert!(health.storage_ok);
    assert!(health.capabilities_reachable);
    assert!(health.capabilities.contains(&"flight_agent"));
    assert!(health.capabilities.contains(&"booking_agent"));
}
