//! Scenario tests through the workbench boundary
//!
//! Workspaces are loaded from YAML the same way the CLI loads them.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use reqbench::actions::ActionRunner;
use reqbench::errors::WorkbenchError;
use reqbench::models::{ActionOutcome, StepOutcome};
use reqbench::scenario::ScenarioOptions;
use reqbench::store::MemoryStore;
use reqbench::workbench::Workbench;
use serde_json::{json, Map};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{executor, Fixture};

/// Counts calls and succeeds for even ids
#[derive(Clone, Default)]
struct CountingRunner {
    calls: Arc<AtomicUsize>,
}

impl ActionRunner for CountingRunner {
    async fn run(&self, action_id: i64) -> ActionOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if action_id % 2 == 0 {
            let mut payload = Map::new();
            payload.insert("rows".to_string(), json!(3));
            ActionOutcome::success(payload)
        } else {
            ActionOutcome::failure("odd action")
        }
    }
}

fn workspace(base: &str) -> String {
    format!(
        r#"
environments:
  - id: 1
    name: staging
    variables:
      - key: base
        value: {base}
      - key: user
        value: alice
requests:
  - id: 1
    name: login
    method: POST
    url: "{{{{base}}}}/login"
    body: '{{"user": "{{{{user}}}}"}}'
    post_script: "environment.set('token', response.json.token)"
  - id: 2
    name: profile
    url: "{{{{base}}}}/profile"
    headers:
      Authorization: "Bearer {{{{token}}}}"
scenarios:
  - id: 10
    name: login then profile
    environment_id: 1
    steps:
      - {{ id: 102, order: 2, step_type: request, ref_id: 2 }}
      - {{ id: 101, order: 1, step_type: request, ref_id: 1 }}
      - {{ id: 103, order: 3, step_type: action, ref_id: 4 }}
      - {{ id: 104, order: 4, step_type: request, ref_id: 99 }}
      - {{ id: 105, order: 5, step_type: action, ref_id: 5 }}
"#
    )
}

async fn mock_api() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t-1"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(header("authorization", "Bearer t-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "alice"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(401).set_body_string("no token"))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_scenario_isolates_steps_by_default() {
    let server = mock_api().await;
    let fixture = Fixture::new("workspace.yaml", &workspace(&server.uri()));
    let store = MemoryStore::load(fixture.workspace()).unwrap();
    let runner = CountingRunner::default();

    let bench = Workbench::with_actions(executor(), store, runner.clone());
    let result = bench.run_scenario(10).await.unwrap();

    let steps: Vec<i64> = result.results.iter().map(|r| r.step).collect();
    assert_eq!(steps, vec![101, 102, 103, 105]);
    assert_eq!(runner.calls.load(Ordering::SeqCst), 2);

    // The profile request never sees the token set by login
    let profile = result.results[1].result.as_request().unwrap();
    assert!(profile.ok);
    assert_eq!(profile.status, Some(401));

    assert_eq!(result.failed_steps(), vec![105]);
    match &result.results[2].result {
        StepOutcome::Action(outcome) => assert_eq!(outcome.payload["rows"], json!(3)),
        other => panic!("expected action outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn test_scenario_chaining_is_opt_in() {
    let server = mock_api().await;
    let fixture = Fixture::new("workspace.yaml", &workspace(&server.uri()));
    let store = MemoryStore::load(fixture.workspace()).unwrap();
    let runner = CountingRunner::default();

    let bench = Workbench::with_actions(executor(), store, runner)
        .with_options(ScenarioOptions { chain_variables: true });
    let result = bench.run_scenario(10).await.unwrap();

    let profile = result.results[1].result.as_request().unwrap();
    assert_eq!(profile.status, Some(200));
    assert_eq!(profile.env.as_ref().unwrap().get("token"), Some("t-1"));
}

#[tokio::test]
async fn test_scenario_result_serializes_per_step() {
    let server = mock_api().await;
    let fixture = Fixture::new("workspace.yaml", &workspace(&server.uri()));
    let store = MemoryStore::load(fixture.workspace()).unwrap();

    let result = Workbench::new(executor(), store).run_scenario(10).await.unwrap();
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["scenario_id"], json!(10));
    assert_eq!(value["results"][0]["step"], json!(101));
    assert_eq!(value["results"][0]["result"]["ok"], json!(true));
    assert_eq!(value["results"][0]["result"]["env"]["token"], json!("t-1"));
    assert_eq!(value["results"][2]["result"]["ok"], json!(false));
    assert_eq!(value["results"][2]["result"]["action_id"], json!(4));
}

#[tokio::test]
async fn test_scenario_with_unknown_environment_still_runs() {
    let fixture = Fixture::new(
        "workspace.yaml",
        "scenarios:\n  - id: 1\n    environment_id: 42\n    steps:\n      - { id: 1, order: 1, step_type: action, ref_id: 2 }\n",
    );
    let store = MemoryStore::load(fixture.workspace()).unwrap();
    let bench = Workbench::new(executor(), store);

    let result = bench.run_scenario(1).await.unwrap();
    assert_eq!(result.results.len(), 1);

    let err = bench.run_scenario(2).await.unwrap_err();
    assert!(matches!(err, WorkbenchError::NotFound { kind: "scenario", id: 2 }));
}
