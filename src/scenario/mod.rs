//! Scenario orchestration

mod runner;

pub use runner::{ScenarioOptions, ScenarioRunner};
