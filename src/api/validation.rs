use serde::Serialize;
use validator::ValidationErrors;

use crate::api::errors::ApiError;

/// One violated constraint, addressed by the path of the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ValidationIssue {
    pub(crate) code: String,
    pub(crate) path: Vec<String>,
    pub(crate) message: String,
}

impl ValidationIssue {
    pub(crate) fn new(code: &str, path: &[&str], message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            path: path.iter().map(|segment| segment.to_string()).collect(),
            message: message.into(),
        }
    }

    pub(crate) fn custom(path: &[&str], message: impl Into<String>) -> Self {
        Self::new("custom", path, message)
    }
}

/// Flattens `validator` field errors into issues, sorted by field name.
pub(crate) fn issues_from(errors: &ValidationErrors) -> Vec<ValidationIssue> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    fields
        .into_iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {field}"));
                ValidationIssue::new(&error.code, &[field.as_ref()], message)
            })
        })
        .collect()
}

pub(crate) fn validate_payload<T: validator::Validate>(payload: &T) -> Result<(), ApiError> {
    payload.validate().map_err(|errors| ApiError::Validation(issues_from(&errors)))
}
