//! Canned Backend
//!
//! Offline demo mode. Ignores the query and answers with a random line from
//! a fixed list, in the same `{"response": ...}` shape the upstream uses.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde_json::{json, Value};

use super::traits::{BackendError, ChatBackend};
use crate::wire::ChatRequest;

/// Reply templates; `{owner}` is replaced with the portfolio owner's name
pub const CANNED_REPLIES: &[&str] = &[
    "That's an interesting question! I'm {owner}'s AI assistant and I'd love to help you with that.",
    "Welcome to {owner}'s creative space! I'd be happy to assist you with your portfolio needs.",
    "Based on your inquiry about {owner}'s work, I can provide you with detailed information.",
    "Great question! Let me walk you through {owner}'s portfolio and expertise.",
    "I understand what you're looking for regarding {owner}'s services. Here's what I can tell you...",
    "That's a common question about {owner}'s creative work. Here's my take on it...",
    "I can definitely help you learn more about {owner}'s portfolio and capabilities. Let me explain...",
    "{owner}'s studio specializes in creative solutions. How can I help you explore our services?",
    "Thanks for your interest in {owner}'s work! I'm here to provide you with all the details you need.",
];

/// Offline backend with random canned replies
#[derive(Clone, Debug)]
pub struct CannedBackend {
    owner: String,
}

impl CannedBackend {
    /// Create a canned backend speaking for `owner`
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
        }
    }

    /// Pick one reply at random
    #[must_use]
    pub fn pick(&self) -> String {
        let template = CANNED_REPLIES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(CANNED_REPLIES[0]);
        template.replace("{owner}", &self.owner)
    }
}

#[async_trait]
impl ChatBackend for CannedBackend {
    fn name(&self) -> &'static str {
        "canned"
    }

    async fn ask(&self, _request: &ChatRequest) -> Result<Value, BackendError> {
        Ok(json!({ "response": self.pick() }))
    }
}
