//! HTTP dispatch and response normalization
//!
//! This is the one place where failures are allowed to surface: every
//! transport problem becomes a `WorkbenchError::Dispatch` with a readable,
//! non-empty message, which the executor turns into `{ok: false, error}`.

use std::error::Error as StdError;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use tracing::{debug, warn};

use super::method;
use crate::errors::WorkbenchError;
use crate::models::{HeadersDict, ResponseBody};
use crate::payload::WireBody;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Normalized response
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    /// Lower-cased names in arrival order; repeated headers joined with `", "`
    pub headers: HeadersDict,
    pub body: ResponseBody,
}

/// Sends requests with a fixed timeout
#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    client: Client,
    timeout: Duration,
}

impl HttpDispatcher {
    pub fn new() -> Result<Self, WorkbenchError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, WorkbenchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(WorkbenchError::Request)?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Perform the call and normalize the response.
    pub async fn dispatch(
        &self,
        method: &str,
        url: &str,
        headers: &HeadersDict,
        body: &WireBody,
    ) -> Result<RawResponse, WorkbenchError> {
        let method = method::parse(method).map_err(|e| WorkbenchError::Dispatch(e.to_string()))?;
        let payload = body.to_bytes().map_err(|e| WorkbenchError::Dispatch(e.to_string()))?;

        let mut request = self.client
            .request(method.clone(), url)
            .headers(build_header_map(headers));
        if let Some(bytes) = payload {
            request = request.body(bytes);
        }

        debug!(method = %method, url = %url, "Dispatching request");

        let start = Instant::now();
        let response = request
            .send()
            .await
            .map_err(|e| WorkbenchError::Dispatch(describe_request_error(&e, self.timeout)))?;

        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let bytes = response
            .bytes()
            .await
            .map_err(|e| WorkbenchError::Dispatch(describe_request_error(&e, self.timeout)))?;

        debug!(status, bytes = bytes.len(), elapsed_ms = start.elapsed().as_millis() as u64, "Response received");

        Ok(RawResponse {
            status,
            headers,
            body: ResponseBody::decode(&bytes),
        })
    }
}

/// Build a reqwest header map, skipping names or values HTTP cannot carry
fn build_header_map(headers: &HeadersDict) -> HeaderMap {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (key, value) in headers {
        match (HeaderName::try_from(key.as_str()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(val)) => {
                map.append(name, val);
            }
            _ => warn!(header = %key, "Skipping header that is not valid HTTP"),
        }
    }
    map
}

/// Flatten a response header map into an ordered dictionary
pub fn collect_headers(headers: &HeaderMap) -> HeadersDict {
    let mut collected = HeadersDict::with_capacity(headers.keys_len());
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        collected
            .entry(name.as_str().to_string())
            .and_modify(|existing: &mut String| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    collected
}

/// Provide better error messages than reqwest's top-level Display
fn describe_request_error(e: &reqwest::Error, timeout: Duration) -> String {
    let mut message = if e.is_timeout() {
        format!("Request timed out after {:?}", timeout)
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else if e.is_builder() {
        format!("Invalid request: {}", e)
    } else if e.is_request() {
        format!("Request error: {}", e)
    } else {
        e.to_string()
    };

    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    if message.is_empty() {
        message = "request failed".to_string();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string, header, method as http_method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_dispatch_decodes_json() {
        let server = MockServer::start().await;
        Mock::given(http_method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"users": [1, 2]})))
            .mount(&server)
            .await;

        let dispatcher = HttpDispatcher::new().unwrap();
        let url = format!("{}/users", server.uri());
        let response = dispatcher
            .dispatch("get", &url, &HeadersDict::new(), &WireBody::Empty)
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, ResponseBody::Json(json!({"users": [1, 2]})));
        assert!(response.headers.contains_key("content-type"));
    }

    #[tokio::test]
    async fn test_dispatch_keeps_text_body() {
        let server = MockServer::start().await;
        Mock::given(http_method("POST"))
            .and(path("/echo"))
            .and(header("x-trace", "abc"))
            .and(body_string("hello"))
            .respond_with(ResponseTemplate::new(201).set_body_string("created"))
            .mount(&server)
            .await;

        let mut headers = HeadersDict::new();
        headers.insert("X-Trace".to_string(), "abc".to_string());

        let dispatcher = HttpDispatcher::new().unwrap();
        let url = format!("{}/echo", server.uri());
        let response = dispatcher
            .dispatch("POST", &url, &headers, &WireBody::Raw("hello".to_string()))
            .await
            .unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.body, ResponseBody::Text("created".to_string()));
    }

    #[tokio::test]
    async fn test_dispatch_timeout_is_error() {
        let server = MockServer::start().await;
        Mock::given(http_method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let dispatcher = HttpDispatcher::with_timeout(Duration::from_millis(200)).unwrap();
        let err = dispatcher
            .dispatch("GET", &server.uri(), &HeadersDict::new(), &WireBody::Empty)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("timed out"), "got: {}", err);
    }

    #[tokio::test]
    async fn test_dispatch_connection_refused() {
        // Bind then drop to get a port nobody listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();

        let dispatcher = HttpDispatcher::new().unwrap();
        let err = dispatcher
            .dispatch("GET", &format!("http://127.0.0.1:{}/", port), &HeadersDict::new(), &WireBody::Empty)
            .await
            .unwrap_err();

        assert!(matches!(err, WorkbenchError::Dispatch(ref msg) if !msg.is_empty()));
    }

    #[tokio::test]
    async fn test_dispatch_invalid_url() {
        let dispatcher = HttpDispatcher::new().unwrap();
        let err = dispatcher
            .dispatch("GET", "{{base}}/users", &HeadersDict::new(), &WireBody::Empty)
            .await
            .unwrap_err();

        assert!(matches!(err, WorkbenchError::Dispatch(_)));
    }

    #[test]
    fn test_collect_headers_joins_repeats() {
        let mut map = HeaderMap::new();
        map.append("set-cookie", HeaderValue::from_static("a=1"));
        map.append("set-cookie", HeaderValue::from_static("b=2"));
        map.append("x-id", HeaderValue::from_static("7"));

        let collected = collect_headers(&map);
        assert_eq!(collected.get("set-cookie").map(String::as_str), Some("a=1, b=2"));
        assert_eq!(collected.get("x-id").map(String::as_str), Some("7"));
    }

    #[test]
    fn test_invalid_headers_skipped() {
        let mut headers = HeadersDict::new();
        headers.insert("bad header".to_string(), "x".to_string());
        headers.insert("X-Ok".to_string(), "fine".to_string());

        let map = build_header_map(&headers);
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("x-ok"));
    }
}
