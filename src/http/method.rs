//! HTTP method parsing

use reqwest::Method;

use crate::errors::WorkbenchError;

/// Parse a stored method name. Case and surrounding whitespace are ignored;
/// extension methods are accepted as long as they are valid tokens.
pub fn parse(method: &str) -> Result<Method, WorkbenchError> {
    let normalized = method.trim().to_ascii_uppercase();
    if normalized.is_empty() {
        return Err(WorkbenchError::Argument("HTTP method is empty".to_string()));
    }
    Method::from_bytes(normalized.as_bytes())
        .map_err(|_| WorkbenchError::Argument(format!("Invalid HTTP method '{}'", method)))
}
