use crate::error::Error;
use chrono::{DateTime, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationErrors;

lazy_static! {
    pub static ref TIME_LABEL: Regex = Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").unwrap();
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp. The time of day is dropped.
pub fn parse_calendar_date(value: &str) -> Result<NaiveDate, Error> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|datetime| datetime.date_naive()))
        .map_err(|_| Error::Validation(format!("Invalid date '{value}', expected YYYY-MM-DD")))
}

/// Collapses validator output into a single message for the `{error}` body.
pub fn first_message(errors: &ValidationErrors) -> Error {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let message = fields
        .iter()
        .flat_map(|(field, errs)| errs.iter().map(move |err| (field, err)))
        .map(|(field, err)| match &err.message {
            Some(message) => message.to_string(),
            None => format!("{field} is invalid"),
        })
        .next()
        .unwrap_or_else(|| "Invalid request".to_string());

    Error::Validation(message)
}
