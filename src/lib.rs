//! reqbench library interface
//!
//! Request templating, sandboxed scripting and scenario execution for an
//! API-testing workbench.
//!
//! # Module Organization
//!
//! - [`template`] - `{{name}}` placeholder resolution
//! - [`scripting`] - Pre-request and post-response JavaScript sandbox
//! - [`payload`] - Body encoding and content-type injection
//! - [`http`] - Request dispatch and response normalization
//! - [`executor`] - Single request execution
//! - [`scenario`] - Ordered multi-step runs
//! - [`workbench`] - Lookup by id on top of a [`store::RecordStore`]
//! - [`errors`] - Error types (WorkbenchError, Result)
//! - [`status`] - Exit status codes (ExitStatus)
//! - [`core`] - CLI execution logic

pub mod actions;
pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod executor;
pub mod http;
pub mod logging;
pub mod models;
pub mod payload;
pub mod scenario;
pub mod scripting;
pub mod status;
pub mod store;
pub mod template;
pub mod variables;
pub mod workbench;
