//! Single request execution
//!
//! Template resolution -> pre-request script -> payload encoding -> dispatch
//! -> post-response script, for one request definition and one environment.
//! Only a dispatch failure changes the shape of the result; everything else
//! degrades quietly.

use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::WorkbenchError;
use crate::http::HttpDispatcher;
use crate::models::{Environment, ExecutionResult, HeadersDict, RequestDefinition};
use crate::payload;
use crate::scripting::{RequestSnapshot, ResponseSnapshot, ScriptContext, ScriptPhase, ScriptSandbox};
use crate::template;
use crate::variables::VariableStore;

/// Executes request definitions against environments
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    dispatcher: HttpDispatcher,
    sandbox: ScriptSandbox,
}

impl RequestExecutor {
    pub fn new(dispatcher: HttpDispatcher, sandbox: ScriptSandbox) -> Self {
        Self { dispatcher, sandbox }
    }

    /// Build an executor with the timeouts and limits from `config`
    pub fn from_config(config: &Config) -> Result<Self, WorkbenchError> {
        let dispatcher = HttpDispatcher::with_timeout(config.request_timeout)?;
        let sandbox = ScriptSandbox::new(config.sandbox_limits());
        Ok(Self::new(dispatcher, sandbox))
    }

    pub fn dispatcher(&self) -> &HttpDispatcher {
        &self.dispatcher
    }

    pub fn sandbox(&self) -> &ScriptSandbox {
        &self.sandbox
    }

    /// Execute `request` with the variables of `environment` (none if absent)
    pub async fn execute(&self, request: &RequestDefinition, environment: Option<&Environment>) -> ExecutionResult {
        let variables = environment
            .map(VariableStore::from_environment)
            .unwrap_or_default();
        self.execute_with_variables(request, variables).await
    }

    /// Execute `request` starting from an explicit variable store
    pub async fn execute_with_variables(&self, request: &RequestDefinition, variables: VariableStore) -> ExecutionResult {
        debug!(
            request_id = request.id,
            method = %request.method,
            variables = ?variables.keys().collect::<Vec<_>>(),
            "Executing request"
        );

        let snapshot = resolve_request(request, &variables);

        let pre = self
            .sandbox
            .run_blocking(&request.pre_script, ScriptPhase::PreRequest, ScriptContext::pre_request(variables, snapshot))
            .await;
        let ScriptContext { env: variables, request: snapshot, .. } = pre;

        let encoded = payload::encode(request.payload_type, &snapshot.body, snapshot.headers.clone());

        let response = match self
            .dispatcher
            .dispatch(&snapshot.method, &snapshot.url, &encoded.headers, &encoded.body)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let message = dispatch_message(e);
                warn!(request_id = request.id, url = %snapshot.url, error = %message, "Request failed");
                return ExecutionResult::failure(message);
            }
        };

        let sent = RequestSnapshot { headers: encoded.headers, ..snapshot };
        let response_snapshot = ResponseSnapshot::new(response.status, response.headers.clone(), &response.body);
        let post = self
            .sandbox
            .run_blocking(
                &request.post_script,
                ScriptPhase::PostResponse,
                ScriptContext::post_response(variables, sent, response_snapshot),
            )
            .await;

        debug!(request_id = request.id, status = response.status, "Request completed");

        ExecutionResult::success(response.status, response.headers, response.body, post.env)
    }
}

/// Substitute variables into the URL, every header value and the body
pub fn resolve_request(request: &RequestDefinition, variables: &VariableStore) -> RequestSnapshot {
    let headers: HeadersDict = request
        .headers
        .iter()
        .map(|(name, value)| (name.clone(), template::resolve_header_value(value, variables)))
        .collect();

    RequestSnapshot {
        url: template::resolve(&request.url, variables),
        method: request.method.clone(),
        headers,
        body: template::resolve(&request.body, variables),
    }
}

fn dispatch_message(e: WorkbenchError) -> String {
    match e {
        WorkbenchError::Dispatch(message) => message,
        other => other.to_string(),
    }
}
