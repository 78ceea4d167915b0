//! HTTP dispatch
//!
//! Method parsing plus the dispatcher that performs the network call and
//! normalizes the response.

mod dispatcher;
pub mod method;

pub use dispatcher::{collect_headers, HttpDispatcher, RawResponse, DEFAULT_TIMEOUT};
