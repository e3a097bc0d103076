//! Chat Widget State Machine
//!
//! Drives the visible conversation from keystrokes to fully revealed agent
//! text. The widget holds no I/O: it hands out [`OutboundQuery`] values for
//! the surface to send and takes replies back through
//! [`ChatWidget::on_reply`].
//!
//! # Turn Lifecycle
//!
//! ```text
//! Idle ──submit──> Sending ──mark_sent──> WaitingForReply
//!   ^                                            │
//!   │                                        on_reply
//!   │                                   (success or apology)
//!   │                                            v
//!   └───────────── tick (last char) ──────── Revealing
//! ```
//!
//! Failures never produce an error state. A failed call becomes an agent
//! message carrying a fixed apology and goes through the same reveal.
//!
//! # Ordering
//!
//! Sending is never blocked by an open request or a running reveal. Each
//! query gets a [`RequestToken`]; replies are applied in token order, so the
//! transcript always reads question, answer, question, answer.

mod requests;
mod reveal;

use std::time::{Duration, Instant};

pub use requests::{OutboundQuery, ReplyOutcome, RequestToken};
pub use reveal::{RevealSession, DEFAULT_REVEAL_DELAY};

use requests::PendingRequests;
use reveal::RevealSchedule;

use crate::layout::{Layout, ViewportPolicy};
use crate::messages::{Message, MessageId};
use crate::scene::SceneDescription;
use crate::wire::{reply_text, CLIENT_CONNECTION_APOLOGY};

/// Widget construction settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Portfolio owner the agent speaks for
    pub owner: String,
    /// Delay between revealed characters
    pub reveal_delay: Duration,
    /// Layout thresholds
    pub viewport: ViewportPolicy,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            owner: "JC".to_string(),
            reveal_delay: DEFAULT_REVEAL_DELAY,
            viewport: ViewportPolicy::default(),
        }
    }
}

/// Where the current conversation turn is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnPhase {
    /// Nothing outstanding
    Idle,
    /// A query was accepted but not yet handed to the transport
    Sending,
    /// Waiting on the proxy
    WaitingForReply,
    /// An agent message is being typed out
    Revealing,
}

/// The chat overlay's state
#[derive(Debug)]
pub struct ChatWidget {
    owner: String,
    transcript: Vec<Message>,
    next_message_id: u64,
    input: String,
    chat_mode: bool,
    policy: ViewportPolicy,
    layout: Layout,
    requests: PendingRequests,
    reveals: RevealSchedule,
    revision: u64,
}

impl Default for ChatWidget {
    fn default() -> Self {
        Self::new(WidgetConfig::default())
    }
}

impl ChatWidget {
    /// Create a widget with the greeting already in the transcript
    #[must_use]
    pub fn new(config: WidgetConfig) -> Self {
        let mut widget = Self {
            owner: config.owner,
            transcript: Vec::new(),
            next_message_id: 0,
            input: String::new(),
            chat_mode: false,
            policy: config.viewport,
            layout: Layout::default(),
            requests: PendingRequests::default(),
            reveals: RevealSchedule::new(config.reveal_delay),
            revision: 0,
        };
        let id = widget.allocate_id();
        let greeting = Message::agent(id, widget.greeting());
        widget.transcript.push(greeting);
        widget
    }

    /// The opening line the agent greets visitors with
    #[must_use]
    pub fn greeting(&self) -> String {
        format!(
            "Hello! I'm {}'s AI agent. How can I help you today?",
            self.owner
        )
    }

    /// Portfolio owner name
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    // ------------------------------------------------------------------
    // Transcript access
    // ------------------------------------------------------------------

    /// All messages, oldest first
    #[must_use]
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// Look up a message by id
    #[must_use]
    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.transcript.iter().find(|m| m.id == id)
    }

    /// Changes whenever the transcript or the waiting indicator changes
    ///
    /// Surfaces scroll to the bottom when this moves.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether any query is still waiting on the proxy
    #[must_use]
    pub fn is_waiting(&self) -> bool {
        !self.requests.is_empty()
    }

    /// Current turn phase
    #[must_use]
    pub fn phase(&self) -> TurnPhase {
        if self.requests.any_sending() {
            TurnPhase::Sending
        } else if !self.requests.is_empty() {
            TurnPhase::WaitingForReply
        } else if !self.reveals.is_empty() {
            TurnPhase::Revealing
        } else {
            TurnPhase::Idle
        }
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Current draft
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the draft
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Append one character to the draft
    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    /// Delete the last character of the draft
    pub fn pop_char(&mut self) {
        self.input.pop();
    }

    /// Whether the send action is enabled
    #[must_use]
    pub fn can_send(&self) -> bool {
        !self.input.trim().is_empty()
    }

    /// Handle the Enter key
    ///
    /// Shift+Enter inserts a newline; plain Enter submits.
    pub fn handle_enter(&mut self, shift: bool) -> Option<OutboundQuery> {
        if shift {
            self.input.push('\n');
            None
        } else {
            self.submit()
        }
    }

    /// Submit the draft
    ///
    /// Appends the user message, clears the draft and returns the query to
    /// send. Whitespace-only drafts are ignored and return `None`.
    pub fn submit(&mut self) -> Option<OutboundQuery> {
        if !self.can_send() {
            return None;
        }

        let query = std::mem::take(&mut self.input);
        let id = self.allocate_id();
        self.transcript.push(Message::user(id, query.clone()));

        let token = self.requests.open();
        self.bump();
        tracing::debug!(%token, message = %id, "Query submitted");

        Some(OutboundQuery { token, query })
    }

    /// Record that the surface handed the query to its transport
    pub fn mark_sent(&mut self, token: RequestToken) {
        if !self.requests.mark_sent(token) {
            tracing::debug!(%token, "mark_sent for unknown or settled request");
        }
    }

    // ------------------------------------------------------------------
    // Replies
    // ------------------------------------------------------------------

    /// Apply a reply from the proxy
    ///
    /// Returns the ids of agent messages appended by this call. A reply
    /// that overtook an earlier request is held and appended later, so the
    /// return value may be empty or contain several ids.
    pub fn on_reply(
        &mut self,
        token: RequestToken,
        outcome: ReplyOutcome,
        now: Instant,
    ) -> Vec<MessageId> {
        if !self.requests.resolve(token, outcome) {
            tracing::debug!(%token, "Ignoring reply for unknown request");
            return Vec::new();
        }

        let mut appended = Vec::new();
        for (token, outcome) in self.requests.drain_ready() {
            let text = match outcome {
                ReplyOutcome::Success(body) => reply_text(&body),
                ReplyOutcome::Failure(reason) => {
                    tracing::warn!(%token, reason = %reason, "Chat request failed");
                    CLIENT_CONNECTION_APOLOGY.to_string()
                }
            };

            let id = self.allocate_id();
            let message = Message::agent_revealing(id, text);
            if message.is_typing() {
                self.reveals.start(id, now);
            }
            self.transcript.push(message);
            appended.push(id);
        }

        self.bump();
        appended
    }

    // ------------------------------------------------------------------
    // Reveal animation
    // ------------------------------------------------------------------

    /// Advance every due reveal by one character
    ///
    /// Returns `true` if anything visible changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let due = self.reveals.due(now);
        if due.is_empty() {
            return false;
        }

        for id in due {
            let more = match self.transcript.iter_mut().find(|m| m.id == id) {
                Some(message) => message.reveal_next(),
                None => false,
            };
            if more {
                self.reveals.reschedule(id, now);
            } else {
                self.reveals.remove(id);
                tracing::trace!(message = %id, "Reveal complete");
            }
        }

        self.bump();
        true
    }

    /// When the next reveal step is due, if any reveal is running
    #[must_use]
    pub fn next_reveal_deadline(&self) -> Option<Instant> {
        self.reveals.next_deadline()
    }

    /// Delay between revealed characters
    #[must_use]
    pub fn reveal_delay(&self) -> Duration {
        self.reveals.delay()
    }

    /// The reveal session for a message, if one is running
    #[must_use]
    pub fn reveal(&self, id: MessageId) -> Option<&RevealSession> {
        self.reveals.get(id)
    }

    /// Pause one message's reveal
    pub fn pause_reveal(&mut self, id: MessageId) -> bool {
        self.reveals.pause(id)
    }

    /// Resume a paused reveal; the next character is due at `now`
    pub fn resume_reveal(&mut self, id: MessageId, now: Instant) -> bool {
        self.reveals.resume(id, now)
    }

    /// Stop one message's reveal where it is
    pub fn cancel_reveal(&mut self, id: MessageId) -> bool {
        if self.reveals.remove(id).is_none() {
            return false;
        }
        if let Some(message) = self.transcript.iter_mut().find(|m| m.id == id) {
            message.stop_typing();
        }
        self.bump();
        true
    }

    /// Finish one message's reveal immediately
    pub fn skip_reveal(&mut self, id: MessageId) -> bool {
        if self.reveals.remove(id).is_none() {
            return false;
        }
        if let Some(message) = self.transcript.iter_mut().find(|m| m.id == id) {
            message.reveal_all();
        }
        self.bump();
        true
    }

    /// Cancel every pending reveal step
    ///
    /// Called when the surface goes away.
    pub fn teardown(&mut self) {
        let cancelled = self.reveals.clear();
        if cancelled.is_empty() {
            return;
        }
        for id in cancelled {
            if let Some(message) = self.transcript.iter_mut().find(|m| m.id == id) {
                message.stop_typing();
            }
        }
        self.bump();
    }

    // ------------------------------------------------------------------
    // Session UI state
    // ------------------------------------------------------------------

    /// Whether the chat overlay is showing
    #[must_use]
    pub fn chat_mode(&self) -> bool {
        self.chat_mode
    }

    /// Show the chat overlay
    pub fn open_chat(&mut self) {
        self.chat_mode = true;
    }

    /// Return to the scene
    pub fn close_chat(&mut self) {
        self.chat_mode = false;
    }

    /// Flip between scene and chat
    pub fn toggle_chat(&mut self) {
        self.chat_mode = !self.chat_mode;
    }

    /// Recompute layout flags for a new viewport size (pixels)
    pub fn resize(&mut self, width: u32, height: u32) -> Layout {
        self.layout = self.policy.layout(width, height);
        self.layout
    }

    /// Current layout flags
    #[must_use]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Describe the lanyard scene for the current layout and mode
    #[must_use]
    pub fn scene(&self) -> SceneDescription {
        SceneDescription::for_layout(&self.owner, &self.layout, self.chat_mode)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn allocate_id(&mut self) -> MessageId {
        self.next_message_id += 1;
        MessageId::from_raw(self.next_message_id)
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Sender;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn widget() -> ChatWidget {
        ChatWidget::new(WidgetConfig::default())
    }

    /// Tick until no reveal is running, collecting every display state of `id`
    fn run_reveal(widget: &mut ChatWidget, id: MessageId, start: Instant) -> Vec<(String, bool)> {
        let mut states = Vec::new();
        let record = |w: &ChatWidget, states: &mut Vec<(String, bool)>| {
            let m = w.message(id).unwrap();
            states.push((m.display_text().to_string(), m.is_typing()));
        };
        record(&*widget, &mut states);

        let mut now = start;
        while let Some(deadline) = widget.next_reveal_deadline() {
            now = now.max(deadline);
            widget.tick(now);
            record(&*widget, &mut states);
        }
        states
    }

    #[test]
    fn test_starts_with_greeting() {
        let w = widget();
        assert_eq!(w.transcript().len(), 1);
        let greeting = &w.transcript()[0];
        assert_eq!(greeting.sender, Sender::Agent);
        assert_eq!(
            greeting.text(),
            "Hello! I'm JC's AI agent. How can I help you today?"
        );
        assert!(!greeting.is_typing());
        assert_eq!(w.phase(), TurnPhase::Idle);
    }

    #[test]
    fn test_whitespace_submit_is_noop() {
        let mut w = widget();
        for draft in ["", "   ", "\n\t "] {
            w.set_input(draft);
            let revision = w.revision();
            assert!(w.submit().is_none());
            assert_eq!(w.transcript().len(), 1);
            assert_eq!(w.revision(), revision);
            assert!(!w.is_waiting());
        }
    }

    #[test]
    fn test_submit_appends_user_message_and_clears_input() {
        let mut w = widget();
        w.set_input("pricing");
        let out = w.submit().unwrap();

        assert_eq!(out.query, "pricing");
        assert_eq!(w.input(), "");
        assert!(w.is_waiting());
        assert_eq!(w.phase(), TurnPhase::Sending);

        let last = w.transcript().last().unwrap();
        assert_eq!(last.sender, Sender::User);
        assert_eq!(last.text(), "pricing");

        w.mark_sent(out.token);
        assert_eq!(w.phase(), TurnPhase::WaitingForReply);
    }

    #[test]
    fn test_shift_enter_inserts_newline() {
        let mut w = widget();
        w.set_input("line one");
        assert!(w.handle_enter(true).is_none());
        assert_eq!(w.input(), "line one\n");
        assert!(w.handle_enter(false).is_some());
    }

    #[test]
    fn test_successful_reply_reveals_fully() {
        let mut w = widget();
        w.set_input("pricing");
        let out = w.submit().unwrap();
        w.mark_sent(out.token);

        let now = Instant::now();
        let ids = w.on_reply(
            out.token,
            ReplyOutcome::Success(json!({"response": "Our plans start at $10."})),
            now,
        );
        assert_eq!(ids.len(), 1);
        assert!(!w.is_waiting());
        assert_eq!(w.phase(), TurnPhase::Revealing);

        let states = run_reveal(&mut w, ids[0], now);
        let message = w.message(ids[0]).unwrap();
        assert_eq!(message.text(), "Our plans start at $10.");
        assert_eq!(message.display_text(), "Our plans start at $10.");
        assert!(!message.is_typing());
        assert_eq!(states.len(), "Our plans start at $10.".len() + 1);
        assert_eq!(w.phase(), TurnPhase::Idle);
    }

    #[test]
    fn test_reveal_states_are_strict_prefixes() {
        let mut w = widget();
        w.set_input("hi");
        let out = w.submit().unwrap();
        let now = Instant::now();
        let id = w.on_reply(out.token, ReplyOutcome::Success(json!({"response": "héllo"})), now)[0];

        let states = run_reveal(&mut w, id, now);
        let texts: Vec<&str> = states.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["", "h", "hé", "hél", "héll", "héllo"]);

        let typing: Vec<bool> = states.iter().map(|(_, t)| *t).collect();
        assert_eq!(typing, vec![true, true, true, true, true, false]);
    }

    #[test]
    fn test_reveal_respects_delay() {
        let mut w = ChatWidget::new(WidgetConfig {
            reveal_delay: Duration::from_millis(30),
            ..WidgetConfig::default()
        });
        w.set_input("hi");
        let out = w.submit().unwrap();
        let now = Instant::now();
        let id = w.on_reply(out.token, ReplyOutcome::Success(json!({"response": "abc"})), now)[0];

        assert!(w.tick(now));
        assert_eq!(w.message(id).unwrap().display_text(), "a");
        assert!(!w.tick(now + Duration::from_millis(10)));
        assert!(w.tick(now + Duration::from_millis(30)));
        assert_eq!(w.message(id).unwrap().display_text(), "ab");
    }

    #[test]
    fn test_failure_becomes_apology() {
        let mut w = widget();
        w.set_input("hello?");
        let out = w.submit().unwrap();
        let now = Instant::now();
        let id = w.on_reply(out.token, ReplyOutcome::Failure("connection refused".into()), now)[0];

        run_reveal(&mut w, id, now);
        let message = w.message(id).unwrap();
        assert_eq!(message.sender, Sender::Agent);
        assert_eq!(
            message.text(),
            "Sorry, I'm having trouble connecting. Please try again later."
        );
        assert!(!message.is_typing());
    }

    #[test]
    fn test_missing_response_field_uses_fallback() {
        let mut w = widget();
        w.set_input("hello?");
        let out = w.submit().unwrap();
        let id = w.on_reply(out.token, ReplyOutcome::Success(json!({})), Instant::now())[0];
        assert_eq!(
            w.message(id).unwrap().text(),
            "Sorry, I couldn't process your request."
        );
    }

    #[test]
    fn test_sequential_turns_keep_order() {
        let mut w = widget();
        let now = Instant::now();

        w.set_input("A");
        let a = w.submit().unwrap();
        w.on_reply(a.token, ReplyOutcome::Success(json!({"response": "A-reply"})), now);

        w.set_input("B");
        let b = w.submit().unwrap();
        w.on_reply(b.token, ReplyOutcome::Success(json!({"response": "B-reply"})), now);

        let texts: Vec<(&str, Sender)> = w
            .transcript()
            .iter()
            .skip(1)
            .map(|m| (m.text(), m.sender))
            .collect();
        assert_eq!(
            texts,
            vec![
                ("A", Sender::User),
                ("A-reply", Sender::Agent),
                ("B", Sender::User),
                ("B-reply", Sender::Agent),
            ]
        );
    }

    #[test]
    fn test_out_of_order_replies_applied_in_request_order() {
        let mut w = widget();
        let now = Instant::now();

        w.set_input("first");
        let first = w.submit().unwrap();
        w.set_input("second");
        let second = w.submit().unwrap();

        let held = w.on_reply(second.token, ReplyOutcome::Success(json!({"response": "2"})), now);
        assert!(held.is_empty());
        assert!(w.is_waiting());

        let released = w.on_reply(first.token, ReplyOutcome::Success(json!({"response": "1"})), now);
        assert_eq!(released.len(), 2);
        assert_eq!(w.message(released[0]).unwrap().text(), "1");
        assert_eq!(w.message(released[1]).unwrap().text(), "2");
        assert!(!w.is_waiting());
    }

    #[test]
    fn test_concurrent_reveals_are_independent() {
        let mut w = widget();
        let now = Instant::now();

        w.set_input("one");
        let one = w.submit().unwrap();
        let a = w.on_reply(one.token, ReplyOutcome::Success(json!({"response": "aaaa"})), now)[0];
        w.tick(now);

        w.set_input("two");
        let two = w.submit().unwrap();
        let b = w.on_reply(two.token, ReplyOutcome::Success(json!({"response": "bbbb"})), now)[0];

        assert!(w.cancel_reveal(a));
        assert!(w.reveal(b).is_some());

        run_reveal(&mut w, b, now);
        assert_eq!(w.message(b).unwrap().display_text(), "bbbb");
        assert!(!w.message(b).unwrap().is_typing());

        let cancelled = w.message(a).unwrap();
        assert_eq!(cancelled.display_text(), "a");
        assert!(!cancelled.is_typing());
    }

    #[test]
    fn test_pause_and_resume_reveal() {
        let mut w = widget();
        let now = Instant::now();
        w.set_input("q");
        let out = w.submit().unwrap();
        let id = w.on_reply(out.token, ReplyOutcome::Success(json!({"response": "xyz"})), now)[0];

        w.tick(now);
        assert!(w.pause_reveal(id));
        assert!(!w.tick(now + Duration::from_secs(5)));
        assert_eq!(w.message(id).unwrap().display_text(), "x");

        let later = now + Duration::from_secs(6);
        assert!(w.resume_reveal(id, later));
        run_reveal(&mut w, id, later);
        assert_eq!(w.message(id).unwrap().display_text(), "xyz");
    }

    #[test]
    fn test_skip_reveal() {
        let mut w = widget();
        w.set_input("q");
        let out = w.submit().unwrap();
        let id = w.on_reply(out.token, ReplyOutcome::Success(json!({"response": "long reply"})), Instant::now())[0];
        assert!(w.skip_reveal(id));
        assert_eq!(w.message(id).unwrap().display_text(), "long reply");
        assert!(!w.skip_reveal(id));
    }

    #[test]
    fn test_teardown_cancels_pending_reveals() {
        let mut w = widget();
        let now = Instant::now();
        w.set_input("q");
        let out = w.submit().unwrap();
        let id = w.on_reply(out.token, ReplyOutcome::Success(json!({"response": "abc"})), now)[0];

        let before = w.revision();
        w.teardown();
        assert!(w.revision() > before);
        assert_eq!(w.next_reveal_deadline(), None);
        assert!(!w.tick(now + Duration::from_secs(1)));
        assert!(!w.message(id).unwrap().is_typing());

        // Nothing left to cancel
        let settled = w.revision();
        w.teardown();
        assert_eq!(w.revision(), settled);
    }

    #[test]
    fn test_revision_moves_on_transcript_and_waiting_changes() {
        let mut w = widget();
        let r0 = w.revision();
        w.set_input("q");
        let out = w.submit().unwrap();
        let r1 = w.revision();
        assert!(r1 > r0);

        w.on_reply(out.token, ReplyOutcome::Failure("x".into()), Instant::now());
        assert!(w.revision() > r1);
    }

    #[test]
    fn test_stale_reply_ignored() {
        let mut w = widget();
        w.set_input("q");
        let out = w.submit().unwrap();
        let now = Instant::now();
        w.on_reply(out.token, ReplyOutcome::Failure("x".into()), now);
        let len = w.transcript().len();

        assert!(w.on_reply(out.token, ReplyOutcome::Failure("x".into()), now).is_empty());
        assert_eq!(w.transcript().len(), len);
    }

    #[test]
    fn test_chat_mode_and_layout() {
        let mut w = widget();
        assert!(!w.chat_mode());
        w.toggle_chat();
        assert!(w.chat_mode());
        w.close_chat();
        assert!(!w.chat_mode());
        w.open_chat();

        let layout = w.resize(600, 900);
        assert!(layout.is_mobile);
        assert!(!layout.shows_scene(w.chat_mode()));
        assert!(!w.resize(1400, 900).is_mobile);
    }
}
