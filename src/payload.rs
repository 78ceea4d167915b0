//! Request body encoding per declared payload type
//!
//! | type   | wire body                          | injected content type               |
//! |--------|------------------------------------|-------------------------------------|
//! | `json` | parsed JSON, raw text if unparsable | `application/json` (parsed only)   |
//! | `xml`  | raw text                           | `application/xml`                   |
//! | `form` | `key=value` fields, raw if none    | `application/x-www-form-urlencoded` |
//! | `text` | raw text                           | `text/plain`                        |
//!
//! A content type is only injected when the request has no `content-type`
//! header under any casing. Malformed bodies are never an error.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::errors::WorkbenchError;
use crate::models::{HeadersDict, PayloadType};

pub const CONTENT_TYPE: &str = "Content-Type";

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const XML_CONTENT_TYPE: &str = "application/xml";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const TEXT_CONTENT_TYPE: &str = "text/plain";

/// Form fields in body order
pub type FormFields = IndexMap<String, String>;

/// Body as it will be put on the wire
#[derive(Debug, Clone, PartialEq)]
pub enum WireBody {
    /// No body at all
    Empty,
    /// Structured JSON payload
    Json(JsonValue),
    /// URL-encoded form fields
    Form(FormFields),
    /// Body text sent verbatim
    Raw(String),
}

impl WireBody {
    pub fn is_empty(&self) -> bool {
        matches!(self, WireBody::Empty)
    }

    /// Serialize to the bytes sent on the wire; `None` for no body
    pub fn to_bytes(&self) -> Result<Option<Vec<u8>>, WorkbenchError> {
        match self {
            WireBody::Empty => Ok(None),
            WireBody::Json(value) => Ok(Some(serde_json::to_vec(value)?)),
            WireBody::Form(fields) => serde_urlencoded::to_string(fields)
                .map(|encoded| Some(encoded.into_bytes()))
                .map_err(|e| WorkbenchError::Argument(format!("Failed to encode form fields: {}", e))),
            WireBody::Raw(text) => Ok(Some(text.clone().into_bytes())),
        }
    }
}

/// Encoder output: the wire body and the headers with any injected content type
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedPayload {
    pub body: WireBody,
    pub headers: HeadersDict,
}

/// Case-insensitive header presence check (name only)
pub fn has_header(headers: &HeadersDict, name: &str) -> bool {
    headers.keys().any(|k| k.eq_ignore_ascii_case(name))
}

fn inject_content_type(headers: &mut HeadersDict, content_type: &str) {
    if !has_header(headers, CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE.to_string(), content_type.to_string());
    }
}

/// Encode `body` according to `payload_type`.
pub fn encode(payload_type: PayloadType, body: &str, headers: HeadersDict) -> EncodedPayload {
    let mut headers = headers;

    let body = match payload_type {
        PayloadType::Json => encode_json(body, &mut headers),
        PayloadType::Xml => {
            inject_content_type(&mut headers, XML_CONTENT_TYPE);
            raw_or_empty(body)
        }
        PayloadType::Form => {
            inject_content_type(&mut headers, FORM_CONTENT_TYPE);
            encode_form(body)
        }
        PayloadType::Text => {
            inject_content_type(&mut headers, TEXT_CONTENT_TYPE);
            raw_or_empty(body)
        }
    };

    EncodedPayload { body, headers }
}

fn raw_or_empty(body: &str) -> WireBody {
    if body.is_empty() {
        WireBody::Empty
    } else {
        WireBody::Raw(body.to_string())
    }
}

fn encode_json(body: &str, headers: &mut HeadersDict) -> WireBody {
    if body.trim().is_empty() {
        return WireBody::Empty;
    }

    match serde_json::from_str::<JsonValue>(body) {
        Ok(value) => {
            inject_content_type(headers, JSON_CONTENT_TYPE);
            WireBody::Json(value)
        }
        Err(e) => {
            debug!(error = %e, "Body is not valid JSON; sending it verbatim");
            WireBody::Raw(body.to_string())
        }
    }
}

fn encode_form(body: &str) -> WireBody {
    if body.trim().is_empty() {
        return WireBody::Empty;
    }

    let fields = parse_form_fields(body);
    if fields.is_empty() {
        debug!("Form body has no key=value pairs; sending it verbatim");
        return WireBody::Raw(body.to_string());
    }
    WireBody::Form(fields)
}

/// Split `a=1&b=2` into fields. Values keep everything after the first `=`;
/// segments without `=` are dropped.
pub fn parse_form_fields(body: &str) -> FormFields {
    body.split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}
