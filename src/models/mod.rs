//! Data model shared by every component

mod results;
mod types;

pub use results::{ActionOutcome, ExecutionResult, ResponseBody, ScenarioResult, StepOutcome, StepReport};
pub use types::{
    Environment, EnvironmentVariable, HeadersDict, PayloadType, RequestDefinition, RequestHeaders,
    Scenario, ScenarioStep, StepTarget,
};
