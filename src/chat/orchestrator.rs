// src/chat/orchestrator.rs
use crate::models::chat::{ChatMessage, MessageKind};
use crate::models::events::ResultItem;
use serde::Serialize;

const GREETING: &str =
    "Hi! I'm your city guide. Ask me about events, attractions, and things to do around town.";
const GENERIC_ERROR: &str =
    "Sorry, I couldn't look that up right now. Please try again in a moment.";

/// Where a session is in its single in-flight request. Submission is only
/// admitted from `Idle`, so there is never more than one outstanding request
/// and "loading with no pending call" cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    AwaitingPromptRelay,
    AwaitingDataRelay,
}

/// One chat conversation: the welcome gate, the append-only transcript, the
/// request phase, and the ephemeral detail-view selection. Selection is
/// independent of the request phase.
#[derive(Debug)]
pub struct ChatSession {
    started: bool,
    phase: Phase,
    transcript: Vec<ChatMessage>,
    selected: Option<ResultItem>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            started: false,
            phase: Phase::Idle,
            transcript: Vec::new(),
            selected: None,
        }
    }

    /// The "start" transition: leave the welcome screen and seed the
    /// transcript with one assistant greeting. A second start is a no-op.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.transcript.push(ChatMessage::assistant(GREETING));
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn selected(&self) -> Option<&ResultItem> {
        self.selected.as_ref()
    }

    /// Admission control for the "submit" transition. Rejected outright when
    /// the session hasn't started, a request is already in flight, or the
    /// input is empty/whitespace; a rejected submit changes nothing and must
    /// issue no outbound call. On admission the user message is appended and
    /// the session enters `AwaitingPromptRelay`.
    pub fn begin_submit(&mut self, text: &str) -> bool {
        if !self.started || self.phase != Phase::Idle || text.trim().is_empty() {
            return false;
        }
        self.transcript.push(ChatMessage::user(text));
        self.phase = Phase::AwaitingPromptRelay;
        true
    }

    /// The interpreter answered; the data fetch is about to be issued.
    pub fn descriptor_received(&mut self) {
        if self.phase == Phase::AwaitingPromptRelay {
            self.phase = Phase::AwaitingDataRelay;
        }
    }

    /// Both calls succeeded: append one assistant summary and one results
    /// message carrying the records in upstream order, then return to idle.
    /// Only meaningful while a submit is in flight; from `Idle` it is a
    /// no-op, so results can never land without a preceding user message.
    pub fn complete_submit(&mut self, items: Vec<ResultItem>) {
        if self.phase == Phase::Idle {
            return;
        }
        let summary = match items.len() {
            0 => "I couldn't find anything matching that.".to_string(),
            1 => "Found 1 place for you:".to_string(),
            n => format!("Found {} places for you:", n),
        };
        self.transcript.push(ChatMessage::assistant(summary));
        self.transcript
            .push(ChatMessage::results("results", items));
        self.phase = Phase::Idle;
    }

    /// Either call failed: one generic error message, back to idle. The user
    /// is not told which stage failed. A no-op from `Idle`, like
    /// `complete_submit`.
    pub fn fail_submit(&mut self) {
        if self.phase == Phase::Idle {
            return;
        }
        self.transcript.push(ChatMessage::assistant(GENERIC_ERROR));
        self.phase = Phase::Idle;
    }

    /// Select one item from the most recent results message for the detail
    /// view. Replaces any previous selection; at most one item is ever
    /// selected. Returns false when there is no such item.
    pub fn select(&mut self, index: usize) -> bool {
        let item = self
            .transcript
            .iter()
            .rev()
            .find(|m| m.kind == MessageKind::Results)
            .and_then(|m| m.payload.as_ref())
            .and_then(|items| items.get(index))
            .cloned();
        match item {
            Some(item) => {
                self.selected = Some(item);
                true
            }
            None => false,
        }
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
