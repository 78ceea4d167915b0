//! JavaScript scripting support via QuickJS (rquickjs)
//!
//! Scripts see `environment.get/set`, a frozen `request`, a frozen
//! `response` (post scripts only) and the `pm` alias object. No modules,
//! no timers, no I/O.

mod context;
mod runtime;

pub use context::inject_context;
pub use runtime::{JsSandbox, SandboxLimits};
