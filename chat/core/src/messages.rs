//! Transcript Messages
//!
//! The entries shown in the chat overlay. A message is either authored by
//! the user (fully resolved the moment it is created) or by the agent
//! (created empty and revealed one character at a time).

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Unique message identifier within a widget session
///
/// Identifiers come from a per-widget counter, so a later message always
/// compares greater than an earlier one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(u64);

impl MessageId {
    /// Wrap a raw counter value
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw counter value
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

/// Who authored a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Typed by the visitor
    User,
    /// Produced by the chatbot (or the fallback apology)
    Agent,
}

/// A transcript entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    /// Stable key for in-place updates
    pub id: MessageId,
    /// Final content, never changed after creation
    text: String,
    /// Revealed prefix of `text`
    display_text: String,
    /// Who sent this message
    pub sender: Sender,
    /// Creation time, display only
    pub timestamp: DateTime<Local>,
    /// Whether the reveal animation is still running
    is_typing: bool,
}

impl Message {
    /// Create a fully resolved user message
    pub fn user(id: MessageId, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id,
            display_text: text.clone(),
            text,
            sender: Sender::User,
            timestamp: Local::now(),
            is_typing: false,
        }
    }

    /// Create an agent message that is already fully visible
    pub fn agent(id: MessageId, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id,
            display_text: text.clone(),
            text,
            sender: Sender::Agent,
            timestamp: Local::now(),
            is_typing: false,
        }
    }

    /// Create an agent message whose text will be revealed progressively
    ///
    /// An empty text has nothing to reveal and starts out complete.
    pub fn agent_revealing(id: MessageId, text: impl Into<String>) -> Self {
        let text = text.into();
        let is_typing = !text.is_empty();
        Self {
            id,
            text,
            display_text: String::new(),
            sender: Sender::Agent,
            timestamp: Local::now(),
            is_typing,
        }
    }

    /// The final text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The currently revealed prefix
    #[must_use]
    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    /// Whether the reveal is in progress
    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.is_typing
    }

    /// Number of characters revealed so far
    #[must_use]
    pub fn revealed_chars(&self) -> usize {
        self.display_text.chars().count()
    }

    /// Total number of characters in the final text
    #[must_use]
    pub fn total_chars(&self) -> usize {
        self.text.chars().count()
    }

    /// Reveal the next character
    ///
    /// Returns `true` while more characters remain. The call that reveals
    /// the last character also clears `is_typing`.
    pub(crate) fn reveal_next(&mut self) -> bool {
        if !self.is_typing {
            return false;
        }
        let revealed = self.revealed_chars();
        if let Some(c) = self.text.chars().nth(revealed) {
            self.display_text.push(c);
        }
        if self.display_text.len() >= self.text.len() {
            self.is_typing = false;
        }
        self.is_typing
    }

    /// Stop revealing, leaving `display_text` where it is
    pub(crate) fn stop_typing(&mut self) {
        self.is_typing = false;
    }

    /// Jump to the fully revealed state
    pub(crate) fn reveal_all(&mut self) {
        self.display_text.clone_from(&self.text);
        self.is_typing = false;
    }

    /// Text to render right now
    ///
    /// The revealed prefix while typing, and wherever a cancelled reveal
    /// stopped; the full text otherwise.
    #[must_use]
    pub fn visible_text(&self) -> &str {
        &self.display_text
    }

    /// Creation time as 2-digit hour and minute
    #[must_use]
    pub fn formatted_time(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_is_resolved() {
        let msg = Message::user(MessageId::from_raw(1), "hi there");
        assert_eq!(msg.sender, Sender::User);
        assert_eq!(msg.text(), "hi there");
        assert_eq!(msg.display_text(), "hi there");
        assert!(!msg.is_typing());
    }

    #[test]
    fn test_reveal_walks_every_prefix() {
        let mut msg = Message::agent_revealing(MessageId::from_raw(2), "abc");
        assert_eq!(msg.display_text(), "");
        assert!(msg.is_typing());

        assert!(msg.reveal_next());
        assert_eq!(msg.display_text(), "a");
        assert!(msg.reveal_next());
        assert_eq!(msg.display_text(), "ab");
        assert!(!msg.reveal_next());
        assert_eq!(msg.display_text(), "abc");
        assert!(!msg.is_typing());

        // Further calls are no-ops
        assert!(!msg.reveal_next());
        assert_eq!(msg.display_text(), "abc");
    }

    #[test]
    fn test_reveal_is_char_aware() {
        let mut msg = Message::agent_revealing(MessageId::from_raw(3), "héé");
        msg.reveal_next();
        msg.reveal_next();
        assert_eq!(msg.display_text(), "hé");
        assert_eq!(msg.revealed_chars(), 2);
        assert_eq!(msg.total_chars(), 3);
    }

    #[test]
    fn test_empty_agent_text_starts_complete() {
        let msg = Message::agent_revealing(MessageId::from_raw(4), "");
        assert!(!msg.is_typing());
        assert_eq!(msg.visible_text(), "");
    }

    #[test]
    fn test_visible_text_during_reveal() {
        let mut msg = Message::agent_revealing(MessageId::from_raw(5), "hello");
        msg.reveal_next();
        assert_eq!(msg.visible_text(), "h");
        msg.reveal_all();
        assert_eq!(msg.visible_text(), "hello");
    }

    #[test]
    fn test_formatted_time_shape() {
        let msg = Message::agent(MessageId::from_raw(6), "x");
        let time = msg.formatted_time();
        assert_eq!(time.len(), 5);
        assert_eq!(time.as_bytes()[2], b':');
    }

    #[test]
    fn test_message_ids_order() {
        assert!(MessageId::from_raw(1) < MessageId::from_raw(2));
        assert_eq!(MessageId::from_raw(7).to_string(), "msg-7");
    }
}
