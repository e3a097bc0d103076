//! Outbound Request Tracking
//!
//! Every query the widget sends carries a [`RequestToken`]. Replies are
//! released strictly in token order, so a fast reply to a later question
//! waits for the slower reply to the earlier one.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

/// Sequence number attached to an outbound query
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    /// The raw sequence number
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// A query the surface must send to the proxy
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundQuery {
    /// Token to hand back with the reply
    pub token: RequestToken,
    /// The visitor's text, untrimmed
    pub query: String,
}

/// How an outbound call ended
#[derive(Clone, Debug, PartialEq)]
pub enum ReplyOutcome {
    /// The proxy answered 2xx with this JSON body
    Success(Value),
    /// Transport error or non-2xx status
    Failure(String),
}

/// Where a tracked request is
#[derive(Clone, Debug, PartialEq)]
enum Slot {
    /// Created, not yet handed to the transport
    Sending,
    /// On the wire
    Waiting,
    /// Reply arrived but an earlier request is still open
    Resolved(ReplyOutcome),
}

/// In-order reply queue
#[derive(Debug, Default)]
pub(crate) struct PendingRequests {
    next: u64,
    slots: BTreeMap<RequestToken, Slot>,
}

impl PendingRequests {
    /// Allocate a token for a new query
    pub(crate) fn open(&mut self) -> RequestToken {
        self.next += 1;
        let token = RequestToken(self.next);
        self.slots.insert(token, Slot::Sending);
        token
    }

    /// Record that the query left the widget
    pub(crate) fn mark_sent(&mut self, token: RequestToken) -> bool {
        match self.slots.get_mut(&token) {
            Some(slot) if matches!(slot, Slot::Sending) => {
                *slot = Slot::Waiting;
                true
            }
            _ => false,
        }
    }

    /// Record a reply; returns `false` for unknown or already-resolved tokens
    pub(crate) fn resolve(&mut self, token: RequestToken, outcome: ReplyOutcome) -> bool {
        match self.slots.get_mut(&token) {
            Some(slot) if matches!(slot, Slot::Sending | Slot::Waiting) => {
                *slot = Slot::Resolved(outcome);
                true
            }
            _ => false,
        }
    }

    /// Pop every reply that is now in order
    pub(crate) fn drain_ready(&mut self) -> Vec<(RequestToken, ReplyOutcome)> {
        let mut ready = Vec::new();
        while let Some(entry) = self.slots.first_entry() {
            if !matches!(entry.get(), Slot::Resolved(_)) {
                break;
            }
            let (token, slot) = entry.remove_entry();
            if let Slot::Resolved(outcome) = slot {
                ready.push((token, outcome));
            }
        }
        ready
    }

    /// Whether any request has no reply applied yet
    pub(crate) fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether any request has not left the widget yet
    pub(crate) fn any_sending(&self) -> bool {
        self.slots.values().any(|s| matches!(s, Slot::Sending))
    }

    /// Number of open requests
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}
