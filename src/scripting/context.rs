//! Script execution context
//!
//! What a pre/post script gets to see: the working variables, a snapshot of
//! the outgoing request and, after dispatch, a snapshot of the response.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::models::{HeadersDict, ResponseBody};
use crate::variables::VariableStore;

/// Request data available to scripts (read-only inside the script)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestSnapshot {
    pub url: String,
    pub method: String,
    pub headers: HeadersDict,
    pub body: String,
}

impl RequestSnapshot {
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            url: url.to_string(),
            method: method.to_string(),
            headers: HeadersDict::new(),
            body: String::new(),
        }
    }
}

/// Response data available to post-scripts (read-only inside the script)
///
/// Exactly one of `json` / `text` is set; the other serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSnapshot {
    pub status: u16,
    pub headers: HeadersDict,
    pub json: Option<JsonValue>,
    pub text: Option<String>,
}

impl ResponseSnapshot {
    pub fn new(status: u16, headers: HeadersDict, body: &ResponseBody) -> Self {
        Self {
            status,
            headers,
            json: body.json().cloned(),
            text: body.text().map(str::to_string),
        }
    }
}

/// Everything a script runs against
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptContext {
    pub env: VariableStore,
    pub request: RequestSnapshot,
    pub response: Option<ResponseSnapshot>,
}

impl ScriptContext {
    /// Context for a pre-request script (no response yet)
    pub fn pre_request(env: VariableStore, request: RequestSnapshot) -> Self {
        Self { env, request, response: None }
    }

    /// Context for a post-response script
    pub fn post_response(env: VariableStore, request: RequestSnapshot, response: ResponseSnapshot) -> Self {
        Self { env, request, response: Some(response) }
    }
}
