//! Wire Types
//!
//! JSON bodies exchanged between the chat surface, the proxy and the
//! upstream chatbot, plus the fixed strings the failure paths use.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Proxy error for a disallowed HTTP method
pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";

/// Proxy error for a missing or falsy `query`
pub const QUERY_REQUIRED: &str = "Query is required";

/// Proxy error when the upstream call fails for any reason
pub const UPSTREAM_FAILED: &str = "Failed to get response from chatbot";

/// Human-readable sentence attached to the proxy's upstream failure body
pub const PROXY_FALLBACK_RESPONSE: &str =
    "Sorry, I'm having trouble connecting right now. Please try again later.";

/// Agent text shown when the chat surface cannot reach the proxy
pub const CLIENT_CONNECTION_APOLOGY: &str =
    "Sorry, I'm having trouble connecting. Please try again later.";

/// Agent text shown when a successful reply carries no usable `response`
pub const CLIENT_EMPTY_REPLY: &str = "Sorry, I couldn't process your request.";

/// Body sent to the proxy and forwarded to the upstream
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The visitor's question
    pub query: Value,
}

impl ChatRequest {
    /// Build a request around a text query
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query: Value::String(query.into()),
        }
    }

    /// Pull `query` out of an arbitrary JSON body
    ///
    /// Returns `None` when the body is not an object or when `query` is
    /// missing or falsy (`null`, `false`, `0`, `""`).
    #[must_use]
    pub fn from_body(body: &Value) -> Option<Self> {
        let query = body.as_object()?.get("query")?;
        if is_truthy(query) {
            Some(Self {
                query: query.clone(),
            })
        } else {
            None
        }
    }
}

/// Body of every proxy failure
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Short machine-readable error
    pub error: String,
    /// Conversational fallback, only on upstream failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl ErrorBody {
    /// 405 body
    #[must_use]
    pub fn method_not_allowed() -> Self {
        Self {
            error: METHOD_NOT_ALLOWED.to_string(),
            response: None,
        }
    }

    /// 400 body
    #[must_use]
    pub fn query_required() -> Self {
        Self {
            error: QUERY_REQUIRED.to_string(),
            response: None,
        }
    }

    /// 500 body
    #[must_use]
    pub fn upstream_failed() -> Self {
        Self {
            error: UPSTREAM_FAILED.to_string(),
            response: Some(PROXY_FALLBACK_RESPONSE.to_string()),
        }
    }
}

/// The text an agent reply should show for a successful proxy body
///
/// Uses `response` when it is truthy, otherwise the fixed "couldn't
/// process" sentence. Non-string values are shown as their JSON text.
#[must_use]
pub fn reply_text(body: &Value) -> String {
    match body.get("response") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(other) if is_truthy(other) => other.to_string(),
        _ => CLIENT_EMPTY_REPLY.to_string(),
    }
}

/// JavaScript-style truthiness for JSON values
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_from_body_accepts_text_query() {
        let req = ChatRequest::from_body(&json!({"query": "pricing"})).unwrap();
        assert_eq!(req, ChatRequest::text("pricing"));
    }

    #[test]
    fn test_from_body_rejects_falsy_queries() {
        for body in [
            json!({}),
            json!({"query": null}),
            json!({"query": ""}),
            json!({"query": false}),
            json!({"query": 0}),
            json!("query"),
            json!([1, 2]),
        ] {
            assert!(ChatRequest::from_body(&body).is_none(), "accepted {body}");
        }
    }

    #[test]
    fn test_from_body_keeps_non_string_truthy_query() {
        let req = ChatRequest::from_body(&json!({"query": 42})).unwrap();
        assert_eq!(req.query, json!(42));
    }

    #[test]
    fn test_error_bodies_serialize() {
        assert_eq!(
            serde_json::to_value(ErrorBody::method_not_allowed()).unwrap(),
            json!({"error": "Method not allowed"})
        );
        assert_eq!(
            serde_json::to_value(ErrorBody::query_required()).unwrap(),
            json!({"error": "Query is required"})
        );
        assert_eq!(
            serde_json::to_value(ErrorBody::upstream_failed()).unwrap(),
            json!({
                "error": "Failed to get response from chatbot",
                "response": "Sorry, I'm having trouble connecting right now. Please try again later."
            })
        );
    }

    #[test]
    fn test_reply_text_fallbacks() {
        assert_eq!(reply_text(&json!({"response": "Hi"})), "Hi");
        assert_eq!(reply_text(&json!({"response": ""})), CLIENT_EMPTY_REPLY);
        assert_eq!(reply_text(&json!({"answer": "Hi"})), CLIENT_EMPTY_REPLY);
        assert_eq!(reply_text(&json!({"response": 5})), "5");
        assert_eq!(reply_text(&json!({"response": null})), CLIENT_EMPTY_REPLY);
    }
}
