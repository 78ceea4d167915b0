//! Upward boundary of the engine
//!
//! Looks records up by id and hands them to the executor or scenario runner.
//! Unknown request and scenario ids are the only errors returned from here;
//! an unknown environment id runs without it.

use tracing::{debug, warn};

use crate::actions::{ActionRunner, UnavailableActionRunner};
use crate::errors::{Result, WorkbenchError};
use crate::executor::RequestExecutor;
use crate::models::{Environment, ExecutionResult, ScenarioResult};
use crate::scenario::{ScenarioOptions, ScenarioRunner};
use crate::store::RecordStore;

pub struct Workbench<S: RecordStore, A: ActionRunner = UnavailableActionRunner> {
    executor: RequestExecutor,
    store: S,
    actions: A,
    options: ScenarioOptions,
}

impl<S: RecordStore> Workbench<S, UnavailableActionRunner> {
    pub fn new(executor: RequestExecutor, store: S) -> Self {
        Self::with_actions(executor, store, UnavailableActionRunner)
    }
}

impl<S: RecordStore, A: ActionRunner> Workbench<S, A> {
    pub fn with_actions(executor: RequestExecutor, store: S, actions: A) -> Self {
        Self {
            executor,
            store,
            actions,
            options: ScenarioOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ScenarioOptions) -> Self {
        self.options = options;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    /// Execute one stored request, optionally against a stored environment
    pub async fn execute_request(&self, request_id: i64, environment_id: Option<i64>) -> Result<ExecutionResult> {
        let request = self
            .store
            .request(request_id)
            .ok_or_else(|| WorkbenchError::not_found("request", request_id))?;
        let environment = environment_id.and_then(|id| self.lookup_environment(id));

        Ok(self.executor.execute(&request, environment.as_ref()).await)
    }

    /// Run one stored scenario against its environment, or the default one
    pub async fn run_scenario(&self, scenario_id: i64) -> Result<ScenarioResult> {
        let scenario = self
            .store
            .scenario(scenario_id)
            .ok_or_else(|| WorkbenchError::not_found("scenario", scenario_id))?;

        let environment = match scenario.environment_id.and_then(|id| self.lookup_environment(id)) {
            Some(env) => Some(env),
            None => {
                let fallback = self.store.default_environment();
                debug!(
                    scenario_id,
                    environment_id = fallback.as_ref().map(|e| e.id),
                    "Using default environment for scenario"
                );
                fallback
            }
        };

        let runner = ScenarioRunner::new(&self.executor, &self.store, &self.actions).with_options(self.options);
        Ok(runner.run(&scenario, environment.as_ref()).await)
    }

    fn lookup_environment(&self, id: i64) -> Option<Environment> {
        let environment = self.store.environment(id);
        if environment.is_none() {
            warn!(environment_id = id, "Environment not found, running without it");
        }
        environment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpDispatcher;
    use crate::models::{EnvironmentVariable, RequestDefinition, Scenario, ScenarioStep};
    use crate::scripting::ScriptSandbox;
    use crate::store::MemoryStore;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn workbench(store: MemoryStore) -> Workbench<MemoryStore> {
        let executor = RequestExecutor::new(HttpDispatcher::new().unwrap(), ScriptSandbox::default());
        Workbench::new(executor, store)
    }

    fn environment(id: i64, base: &str) -> Environment {
        Environment {
            id,
            name: format!("env-{}", id),
            description: String::new(),
            variables: vec![EnvironmentVariable::new("base", base)],
        }
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let mut store = MemoryStore::new();
        store.insert_request(RequestDefinition::new(1, "GET", "http://localhost/"));
        let bench = workbench(store);

        let err = bench.execute_request(2, None).await.unwrap_err();
        assert_eq!(err.to_string(), "request 2 not found");

        let err = bench.run_scenario(3).await.unwrap_err();
        assert!(matches!(err, WorkbenchError::NotFound { kind: "scenario", id: 3 }));
    }

    #[tokio::test]
    async fn test_execute_request_with_environment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .mount(&server)
            .await;

        let mut store = MemoryStore::new();
        store.insert_environment(environment(1, &server.uri()));
        store.insert_request(RequestDefinition::new(7, "GET", "{{base}}/users"));

        let result = workbench(store).execute_request(7, Some(1)).await.unwrap();
        assert!(result.ok);
        assert_eq!(result.status, Some(200));
    }

    #[tokio::test]
    async fn test_unknown_environment_runs_without_variables() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .and(header("x-base", "{{base}}"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let mut request = RequestDefinition::new(7, "GET", &format!("{}/users", server.uri()));
        request.headers.insert("X-Base".to_string(), json!("{{base}}"));

        let mut store = MemoryStore::new();
        store.insert_environment(environment(1, "http://unused"));
        store.insert_request(request);

        let result = workbench(store).execute_request(7, Some(99)).await.unwrap();
        assert!(result.ok);
        assert_eq!(result.status, Some(200));
        assert!(result.env.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scenario_with_unknown_environment_uses_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let mut store = MemoryStore::new();
        store.insert_environment(environment(1, &server.uri()));
        store.insert_request(RequestDefinition::new(1, "GET", "{{base}}/health"));
        store.insert_scenario(Scenario {
            id: 1,
            environment_id: Some(42),
            steps: vec![ScenarioStep::request(1, 1, 1)],
            ..Default::default()
        });

        let result = workbench(store).run_scenario(1).await.unwrap();
        assert!(result.all_ok());
    }

    #[tokio::test]
    async fn test_scenario_falls_back_to_default_environment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let mut store = MemoryStore::new();
        store.insert_environment(environment(1, &server.uri()));
        store.insert_environment(environment(2, "http://127.0.0.1:1"));
        store.insert_request(RequestDefinition::new(1, "GET", "{{base}}/health"));
        store.insert_scenario(Scenario {
            id: 1,
            steps: vec![ScenarioStep::request(1, 1, 1)],
            ..Default::default()
        });

        let result = workbench(store).run_scenario(1).await.unwrap();
        assert!(result.all_ok());
        assert_eq!(result.results[0].result.as_request().and_then(|r| r.status), Some(204));
    }
}
