//! Record store contract and the in-memory workspace store
//!
//! The engine only needs fetch-by-id. Persistence lives elsewhere; the
//! `MemoryStore` here is loaded once from a workspace file (YAML, JSON or
//! TOML) and then only read.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::WorkbenchError;
use crate::models::{Environment, RequestDefinition, Scenario};

/// Maximum workspace file size (1 MB) - prevents OOM from malicious files
const MAX_WORKSPACE_FILE_SIZE: u64 = 1024 * 1024;

/// Read access to stored records. Implementations return snapshots.
pub trait RecordStore: Send + Sync {
    fn request(&self, id: i64) -> Option<RequestDefinition>;

    fn environment(&self, id: i64) -> Option<Environment>;

    fn scenario(&self, id: i64) -> Option<Scenario>;

    /// Environment used for scenario runs that do not name one
    fn default_environment(&self) -> Option<Environment> {
        None
    }
}

/// On-disk workspace layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workspace {
    #[serde(default)]
    pub environments: Vec<Environment>,
    #[serde(default)]
    pub requests: Vec<RequestDefinition>,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

/// In-memory record store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    environments: IndexMap<i64, Environment>,
    requests: IndexMap<i64, RequestDefinition>,
    scenarios: IndexMap<i64, Scenario>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a workspace by id, rejecting duplicate ids
    pub fn from_workspace(workspace: Workspace) -> Result<Self, WorkbenchError> {
        let mut store = Self::new();
        for env in workspace.environments {
            if store.environments.contains_key(&env.id) {
                return Err(duplicate("environment", env.id));
            }
            store.environments.insert(env.id, env);
        }
        for request in workspace.requests {
            if store.requests.contains_key(&request.id) {
                return Err(duplicate("request", request.id));
            }
            store.requests.insert(request.id, request);
        }
        for scenario in workspace.scenarios {
            if store.scenarios.contains_key(&scenario.id) {
                return Err(duplicate("scenario", scenario.id));
            }
            store.scenarios.insert(scenario.id, scenario);
        }
        Ok(store)
    }

    /// Load a workspace file. The format follows the extension; unknown
    /// extensions are tried as YAML, then JSON, then TOML.
    pub fn load(path: &Path) -> Result<Self, WorkbenchError> {
        // Check file size before loading to prevent OOM
        let file_size = fs::metadata(path)?.len();
        if file_size > MAX_WORKSPACE_FILE_SIZE {
            return Err(WorkbenchError::Workspace(format!(
                "Workspace file too large: {} bytes (max {} bytes)",
                file_size, MAX_WORKSPACE_FILE_SIZE
            )));
        }

        let content = fs::read_to_string(path)?;
        let extension = path.extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let workspace = match extension.as_str() {
            "yaml" | "yml" => parse_yaml(&content)?,
            "json" => parse_json(&content)?,
            "toml" => parse_toml(&content)?,
            _ => parse_yaml(&content)
                .or_else(|_| parse_json(&content))
                .or_else(|_| parse_toml(&content))?,
        };

        Self::from_workspace(workspace)
    }

    pub fn insert_environment(&mut self, env: Environment) {
        self.environments.insert(env.id, env);
    }

    pub fn insert_request(&mut self, request: RequestDefinition) {
        self.requests.insert(request.id, request);
    }

    pub fn insert_scenario(&mut self, scenario: Scenario) {
        self.scenarios.insert(scenario.id, scenario);
    }
}

impl RecordStore for MemoryStore {
    fn request(&self, id: i64) -> Option<RequestDefinition> {
        self.requests.get(&id).cloned()
    }

    fn environment(&self, id: i64) -> Option<Environment> {
        self.environments.get(&id).cloned()
    }

    fn scenario(&self, id: i64) -> Option<Scenario> {
        self.scenarios.get(&id).cloned()
    }

    /// First environment in workspace order
    fn default_environment(&self) -> Option<Environment> {
        self.environments.values().next().cloned()
    }
}

fn duplicate(kind: &str, id: i64) -> WorkbenchError {
    WorkbenchError::Workspace(format!("Duplicate {} id {}", kind, id))
}

fn parse_yaml(content: &str) -> Result<Workspace, WorkbenchError> {
    serde_yaml::from_str(content)
        .map_err(|e| WorkbenchError::Workspace(format!("Failed to parse YAML workspace: {}", e)))
}

fn parse_json(content: &str) -> Result<Workspace, WorkbenchError> {
    serde_json::from_str(content)
        .map_err(|e| WorkbenchError::Workspace(format!("Failed to parse JSON workspace: {}", e)))
}

fn parse_toml(content: &str) -> Result<Workspace, WorkbenchError> {
    toml::from_str(content)
        .map_err(|e| WorkbenchError::Workspace(format!("Failed to parse TOML workspace: {}", e)))
}
