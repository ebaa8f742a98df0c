pub mod account_handlers;
pub mod health_handlers;
pub mod publication_handlers;

use crate::services::ServiceError;

/// Presence check for a request field: absent and empty values are both
/// rejected before any gateway call.
pub(crate) fn required(value: Option<String>, field: &'static str) -> Result<String, ServiceError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ServiceError::MissingField(field)),
    }
}
