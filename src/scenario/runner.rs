//! Scenario execution engine
//!
//! Runs steps one at a time in ascending order against a single environment.
//! A failing step is recorded and the run moves on; nothing halts a scenario.

use std::time::Instant;

use tracing::{debug, info};

use crate::actions::ActionRunner;
use crate::executor::RequestExecutor;
use crate::models::{Environment, Scenario, ScenarioResult, StepOutcome, StepReport, StepTarget};
use crate::store::RecordStore;
use crate::variables::VariableStore;

/// Scenario configuration options
#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioOptions {
    /// Feed the `env` of each successful request step into the next one.
    /// Off by default: every request step starts from the environment snapshot.
    pub chain_variables: bool,
}

/// Executes scenarios using a shared executor, record store and action runner
pub struct ScenarioRunner<'a, S: RecordStore, A: ActionRunner> {
    executor: &'a RequestExecutor,
    store: &'a S,
    actions: &'a A,
    options: ScenarioOptions,
}

impl<'a, S: RecordStore, A: ActionRunner> ScenarioRunner<'a, S, A> {
    pub fn new(executor: &'a RequestExecutor, store: &'a S, actions: &'a A) -> Self {
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

    pub fn options(&self) -> ScenarioOptions {
        self.options
    }

    /// Run every step of `scenario` against `environment`
    pub async fn run(&self, scenario: &Scenario, environment: Option<&Environment>) -> ScenarioResult {
        let start = Instant::now();
        let snapshot = environment
            .map(VariableStore::from_environment)
            .unwrap_or_default();

        info!(
            scenario_id = scenario.id,
            steps = scenario.steps.len(),
            environment_id = environment.map(|e| e.id),
            chain_variables = self.options.chain_variables,
            "Running scenario"
        );

        let mut chained = snapshot.clone();
        let mut results = Vec::with_capacity(scenario.steps.len());

        for step in scenario.ordered_steps() {
            let outcome = match step.target {
                StepTarget::Request { ref_id } => {
                    let Some(request) = self.store.request(ref_id) else {
                        debug!(step = step.id, request_id = ref_id, "Skipping step with missing request");
                        continue;
                    };

                    let variables = if self.options.chain_variables {
                        chained.clone()
                    } else {
                        snapshot.clone()
                    };

                    let result = self.executor.execute_with_variables(&request, variables).await;
                    if self.options.chain_variables {
                        if let Some(env) = result.env.as_ref().filter(|_| result.ok) {
                            chained = env.clone();
                        }
                    }
                    StepOutcome::Request(result)
                }
                StepTarget::Action { ref_id } => {
                    StepOutcome::Action(self.actions.run(ref_id).await)
                }
            };

            debug!(step = step.id, ok = outcome.is_ok(), "Step finished");
            results.push(StepReport { step: step.id, result: outcome });
        }

        let result = ScenarioResult { scenario_id: scenario.id, results };
        info!(
            scenario_id = scenario.id,
            executed = result.results.len(),
            failed = result.failed_steps().len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Scenario finished"
        );
        result
    }
}
