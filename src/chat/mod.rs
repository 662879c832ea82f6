// src/chat/mod.rs
pub mod orchestrator;

use crate::models::chat::ChatMessage;
use crate::models::events::{PromptDescriptor, ResultItem};
use crate::upstream_client::{UpstreamClient, UpstreamError};
use async_trait::async_trait;
use orchestrator::{ChatSession, Phase};
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// The two upstream calls a submit needs, behind a seam so the orchestrator
/// can be exercised without a network.
#[async_trait]
pub trait ResultsBackend: Send + Sync {
    async fn interpret(&self, question: &str) -> Result<PromptDescriptor, UpstreamError>;
    async fn fetch_results(&self, api_url: &str) -> Result<Vec<ResultItem>, UpstreamError>;
}

#[async_trait]
impl ResultsBackend for UpstreamClient {
    async fn interpret(&self, question: &str) -> Result<PromptDescriptor, UpstreamError> {
        let value = self.interpret_raw(question).await?;
        // The relay endpoint passes arbitrary JSON through; the orchestrator
        // is stricter and treats a shape it can't use as a malformed answer.
        PromptDescriptor::from_value(&value).ok_or(UpstreamError::Malformed {
            body: value.to_string(),
        })
    }

    async fn fetch_results(&self, api_url: &str) -> Result<Vec<ResultItem>, UpstreamError> {
        let value = self.fetch_raw(api_url).await?;
        parse_results_envelope(value)
    }
}

/// The data service answers `{"data": [record, ...]}`. Anything without a
/// usable `data` array counts as malformed.
pub fn parse_results_envelope(value: serde_json::Value) -> Result<Vec<ResultItem>, UpstreamError> {
    let raw = value.to_string();
    let data = match value.get("data") {
        Some(data) => data.clone(),
        None => return Err(UpstreamError::Malformed { body: raw }),
    };
    serde_json::from_value(data).map_err(|_| UpstreamError::Malformed { body: raw })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Dropped by admission control: nothing appended, nothing called.
    Rejected,
    Completed,
    Failed,
}

#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub started: bool,
    pub phase: Phase,
    pub loading: bool,
    pub transcript: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<ResultItem>,
}

/// In-memory sessions, keyed by id. Nothing survives a restart. The write
/// lock is only ever held for a state transition, never across an outbound
/// await; the session's `Phase` is what keeps submits single-file.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, ChatSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a session and run its start transition.
    pub async fn create(&self) -> SessionSnapshot {
        let id = Uuid::new_v4();
        let mut session = ChatSession::new();
        session.start();
        let snapshot = snapshot_of(id, &session);
        self.sessions.write().await.insert(id, session);
        tracing::info!("🔌 Started new chat session: {}", id);
        snapshot
    }

    pub async fn snapshot(&self, id: Uuid) -> Option<SessionSnapshot> {
        let sessions = self.sessions.read().await;
        sessions.get(&id).map(|s| snapshot_of(id, s))
    }

    /// Drive one submit through the two relays in order. The data call is
    /// never issued unless the interpreter call succeeded. Returns `None`
    /// for an unknown session.
    pub async fn submit<B: ResultsBackend + ?Sized>(
        &self,
        id: Uuid,
        text: &str,
        backend: &B,
    ) -> Option<SubmitOutcome> {
        {
            let mut sessions = self.sessions.write().await;
            let session = sessions.get_mut(&id)?;
            if !session.begin_submit(text) {
                tracing::debug!("Submit rejected for session {}", id);
                return Some(SubmitOutcome::Rejected);
            }
        }

        let descriptor = match backend.interpret(text).await {
            Ok(descriptor) => descriptor,
            Err(e) => {
                tracing::warn!("Interpreter call failed for session {}: {}", id, e);
                self.mark_failed(id).await;
                return Some(SubmitOutcome::Failed);
            }
        };

        tracing::info!(
            "🧭 Interpreter resolved intent '{}' for session {}",
            descriptor.intent,
            id
        );
        {
            let mut sessions = self.sessions.write().await;
            if let Some(session) = sessions.get_mut(&id) {
                session.descriptor_received();
            }
        }

        match backend.fetch_results(&descriptor.api_url).await {
            Ok(items) => {
                tracing::info!("✅ {} result(s) for session {}", items.len(), id);
                let mut sessions = self.sessions.write().await;
                if let Some(session) = sessions.get_mut(&id) {
                    session.complete_submit(items);
                }
                Some(SubmitOutcome::Completed)
            }
            Err(e) => {
                tracing::warn!("Data fetch failed for session {}: {}", id, e);
                self.mark_failed(id).await;
                Some(SubmitOutcome::Failed)
            }
        }
    }

    /// Select one item from the session's latest results. The item is read
    /// back under the same write lock, so the answer can't be raced by a
    /// concurrent deselect. Outer `None` means unknown session; inner `None`
    /// means there was nothing to select at that index.
    pub async fn select(&self, id: Uuid, index: usize) -> Option<Option<ResultItem>> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id)?;
        if !session.select(index) {
            return Some(None);
        }
        Some(session.selected().cloned())
    }

    pub async fn deselect(&self, id: Uuid) -> Option<()> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(&id).map(|s| s.deselect())
    }

    async fn mark_failed(&self, id: Uuid) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(&id) {
            session.fail_submit();
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn snapshot_of(id: Uuid, session: &ChatSession) -> SessionSnapshot {
    SessionSnapshot {
        session_id: id,
        started: session.started(),
        phase: session.phase(),
        loading: session.is_loading(),
        transcript: session.transcript().to_vec(),
        selected: session.selected().cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::MessageKind;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Notify;

    /// Scripted backend: counts calls, optionally parks inside `interpret`
    /// until released, and answers from canned responses.
    struct MockBackend {
        interpret_calls: AtomicUsize,
        fetch_calls: AtomicUsize,
        interpret_gate: Option<Arc<Notify>>,
        interpret_response: Result<PromptDescriptor, u16>,
        fetch_items: Vec<ResultItem>,
    }

    impl MockBackend {
        fn ok(items: Vec<ResultItem>) -> Self {
            Self {
                interpret_calls: AtomicUsize::new(0),
                fetch_calls: AtomicUsize::new(0),
                interpret_gate: None,
                interpret_response: Ok(PromptDescriptor {
                    api_url: "https://data.cityscout-api.com/v1/events".to_string(),
                    intent: "find_events".to_string(),
                }),
                fetch_items: items,
            }
        }

        fn interpreter_down(status: u16) -> Self {
            let mut backend = Self::ok(Vec::new());
            backend.interpret_response = Err(status);
            backend
        }

        fn gated(gate: Arc<Notify>, items: Vec<ResultItem>) -> Self {
            let mut backend = Self::ok(items);
            backend.interpret_gate = Some(gate);
            backend
        }
    }

    #[async_trait]
    impl ResultsBackend for MockBackend {
        async fn interpret(&self, _question: &str) -> Result<PromptDescriptor, UpstreamError> {
            self.interpret_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.interpret_gate {
                gate.notified().await;
            }
            match &self.interpret_response {
                Ok(descriptor) => Ok(descriptor.clone()),
                Err(status) => Err(UpstreamError::Status { status: *status }),
            }
        }

        async fn fetch_results(&self, _api_url: &str) -> Result<Vec<ResultItem>, UpstreamError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.fetch_items.clone())
        }
    }

    fn items(ids: &[&str]) -> Vec<ResultItem> {
        ids.iter().map(|id| ResultItem::stub(id, "place")).collect()
    }

    #[tokio::test]
    async fn one_submit_yields_one_user_message_and_one_results_pair() {
        let store = SessionStore::new();
        let backend = MockBackend::ok(items(&["1", "2"]));
        let session_id = store.create().await.session_id;

        let outcome = store.submit(session_id, "live music", &backend).await;
        assert_eq!(outcome, Some(SubmitOutcome::Completed));

        let snapshot = store.snapshot(session_id).await.unwrap();
        let kinds: Vec<_> = snapshot.transcript.iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![
                MessageKind::Assistant, // greeting
                MessageKind::User,
                MessageKind::Assistant, // summary
                MessageKind::Results,
            ]
        );
        let payload = snapshot.transcript[3].payload.as_ref().unwrap();
        assert_eq!(payload.len(), 2);
        assert_eq!(backend.interpret_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.fetch_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn interpreter_failure_skips_data_fetch_entirely() {
        let store = SessionStore::new();
        let backend = MockBackend::interpreter_down(503);
        let session_id = store.create().await.session_id;

        let outcome = store.submit(session_id, "live music", &backend).await;
        assert_eq!(outcome, Some(SubmitOutcome::Failed));
        assert_eq!(backend.fetch_calls.load(Ordering::SeqCst), 0);

        let snapshot = store.snapshot(session_id).await.unwrap();
        // greeting + user message + one generic error, nothing else
        assert_eq!(snapshot.transcript.len(), 3);
        assert_eq!(snapshot.transcript[2].kind, MessageKind::Assistant);
        assert!(snapshot.transcript[2].payload.is_none());
    }

    #[tokio::test]
    async fn blank_input_is_dropped_without_calling_out() {
        let store = SessionStore::new();
        let backend = MockBackend::ok(items(&["1"]));
        let session_id = store.create().await.session_id;

        assert_eq!(
            store.submit(session_id, "   ", &backend).await,
            Some(SubmitOutcome::Rejected)
        );
        assert_eq!(backend.interpret_calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.snapshot(session_id).await.unwrap().transcript.len(), 1);
    }

    #[tokio::test]
    async fn submit_while_in_flight_is_silently_dropped() {
        let store = Arc::new(SessionStore::new());
        let gate = Arc::new(Notify::new());
        let backend = Arc::new(MockBackend::gated(gate.clone(), items(&["1"])));
        let session_id = store.create().await.session_id;

        let first = {
            let store = store.clone();
            let backend = backend.clone();
            tokio::spawn(async move { store.submit(session_id, "first", backend.as_ref()).await })
        };

        // let the first submit reach the parked interpreter call
        while backend.interpret_calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let second = store.submit(session_id, "second", backend.as_ref()).await;
        assert_eq!(second, Some(SubmitOutcome::Rejected));

        gate.notify_one();
        assert_eq!(first.await.unwrap(), Some(SubmitOutcome::Completed));

        let snapshot = store.snapshot(session_id).await.unwrap();
        // only the first submit's messages landed
        let user_messages = snapshot
            .transcript
            .iter()
            .filter(|m| m.kind == MessageKind::User)
            .count();
        assert_eq!(user_messages, 1);
        assert_eq!(backend.interpret_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn select_hands_back_the_item_in_one_step() {
        let store = SessionStore::new();
        let backend = MockBackend::ok(items(&["first", "second"]));
        let session_id = store.create().await.session_id;
        store.submit(session_id, "markets", &backend).await;

        let item = store.select(session_id, 1).await.unwrap();
        assert_eq!(item.unwrap().id, "second");

        // out of range selects nothing but the session is still known
        let out_of_range = store.select(session_id, 9).await.unwrap();
        assert!(out_of_range.is_none());
        assert!(store.select(Uuid::new_v4(), 0).await.is_none());
    }

    #[tokio::test]
    async fn unknown_session_is_reported_as_missing() {
        let store = SessionStore::new();
        let backend = MockBackend::ok(Vec::new());
        assert!(store.submit(Uuid::new_v4(), "hi", &backend).await.is_none());
        assert!(store.snapshot(Uuid::new_v4()).await.is_none());
    }

    #[test]
    fn results_envelope_preserves_record_count_and_order() {
        let value = json!({
            "data": [
                {"id": "a", "title": "First"},
                {"id": "b", "title": "Second"},
                {"id": "c", "title": "Third"}
            ]
        });
        let parsed = parse_results_envelope(value).unwrap();
        let ids: Vec<_> = parsed.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn results_envelope_without_data_is_malformed() {
        let err = parse_results_envelope(json!({"items": []})).unwrap_err();
        assert!(matches!(err, UpstreamError::Malformed { .. }));
        let err = parse_results_envelope(json!({"data": "nope"})).unwrap_err();
        assert!(matches!(err, UpstreamError::Malformed { .. }));
    }
}
