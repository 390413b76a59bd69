//! Field validation shared by the resource stores and the REST server.

use chrono::{DateTime, NaiveDate};

use crate::error::ValidationError;

/// Reject missing or blank text.
pub fn require_text(value: &str, field: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field.to_string()));
    }
    Ok(())
}

/// Like [`require_text`] for optional input.
pub fn require_present(value: Option<&str>, field: &str) -> Result<(), ValidationError> {
    require_text(value.unwrap_or_default(), field)
}

pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    url::Url::parse(url)
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidUrl)
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn validate_date(value: &str) -> Result<(), ValidationError> {
    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(value).is_ok()
    {
        Ok(())
    } else {
        Err(ValidationError::InvalidDate)
    }
}

pub fn validate_positive(value: f64, field: &str) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: "must be a positive number".into(),
        });
    }
    Ok(())
}
