//! Reveal Scheduling
//!
//! Each agent message being typed out owns a [`RevealSession`]. Sessions
//! are independent: pausing, resuming or cancelling one never touches
//! another, and the widget can run any number at once.
//!
//! Time is passed in by the caller. The schedule never sleeps; the event
//! loop asks for [`RevealSchedule::next_deadline`] and ticks when it passes.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::messages::MessageId;

/// Default delay between revealed characters
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(30);

/// Per-message reveal state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevealSession {
    /// When the next character is due
    next_due: Instant,
    /// Paused sessions keep their place but never come due
    paused: bool,
}

impl RevealSession {
    /// Whether this session is paused
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

/// All reveal sessions of one widget
#[derive(Debug)]
pub(crate) struct RevealSchedule {
    delay: Duration,
    sessions: BTreeMap<MessageId, RevealSession>,
}

impl RevealSchedule {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            sessions: BTreeMap::new(),
        }
    }

    /// Start a session whose first character is due at `now`
    pub(crate) fn start(&mut self, id: MessageId, now: Instant) {
        self.sessions.insert(
            id,
            RevealSession {
                next_due: now,
                paused: false,
            },
        );
    }

    /// Sessions due at `now`, in message order
    pub(crate) fn due(&self, now: Instant) -> Vec<MessageId> {
        self.sessions
            .iter()
            .filter(|(_, s)| !s.paused && s.next_due <= now)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Push a session's next character one delay past `now`
    pub(crate) fn reschedule(&mut self, id: MessageId, now: Instant) {
        if let Some(session) = self.sessions.get_mut(&id) {
            session.next_due = now + self.delay;
        }
    }

    pub(crate) fn pause(&mut self, id: MessageId) -> bool {
        match self.sessions.get_mut(&id) {
            Some(session) if !session.paused => {
                session.paused = true;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn resume(&mut self, id: MessageId, now: Instant) -> bool {
        match self.sessions.get_mut(&id) {
            Some(session) if session.paused => {
                session.paused = false;
                session.next_due = now;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn remove(&mut self, id: MessageId) -> Option<RevealSession> {
        self.sessions.remove(&id)
    }

    pub(crate) fn get(&self, id: MessageId) -> Option<&RevealSession> {
        self.sessions.get(&id)
    }

    /// Remove every session, returning their ids
    pub(crate) fn clear(&mut self) -> Vec<MessageId> {
        let ids = self.sessions.keys().copied().collect();
        self.sessions.clear();
        ids
    }

    /// Earliest instant any unpaused session comes due
    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.sessions
            .values()
            .filter(|s| !s.paused)
            .map(|s| s.next_due)
            .min()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub(crate) fn delay(&self) -> Duration {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_due_immediately() {
        let now = Instant::now();
        let mut schedule = RevealSchedule::new(DEFAULT_REVEAL_DELAY);
        schedule.start(MessageId::from_raw(1), now);
        assert_eq!(schedule.due(now), vec![MessageId::from_raw(1)]);
        assert_eq!(schedule.next_deadline(), Some(now));
    }

    #[test]
    fn test_reschedule_waits_one_delay() {
        let now = Instant::now();
        let id = MessageId::from_raw(1);
        let mut schedule = RevealSchedule::new(Duration::from_millis(30));
        schedule.start(id, now);
        schedule.reschedule(id, now);

        assert!(schedule.due(now + Duration::from_millis(29)).is_empty());
        assert_eq!(schedule.due(now + Duration::from_millis(30)), vec![id]);
    }

    #[test]
    fn test_paused_session_never_due() {
        let now = Instant::now();
        let id = MessageId::from_raw(1);
        let mut schedule = RevealSchedule::new(DEFAULT_REVEAL_DELAY);
        schedule.start(id, now);

        assert!(schedule.pause(id));
        assert!(!schedule.pause(id));
        assert!(schedule.due(now + Duration::from_secs(10)).is_empty());
        assert_eq!(schedule.next_deadline(), None);

        let later = now + Duration::from_secs(1);
        assert!(schedule.resume(id, later));
        assert_eq!(schedule.due(later), vec![id]);
    }

    #[test]
    fn test_sessions_are_independent() {
        let now = Instant::now();
        let a = MessageId::from_raw(1);
        let b = MessageId::from_raw(2);
        let mut schedule = RevealSchedule::new(DEFAULT_REVEAL_DELAY);
        schedule.start(a, now);
        schedule.start(b, now);

        schedule.remove(a);
        assert_eq!(schedule.due(now), vec![b]);
        assert!(schedule.get(a).is_none());
        assert!(schedule.get(b).is_some());
    }
}
