//! Request validation shared by the HTTP handlers.
//!
//! Failures become `invalid_request` errors whose `details` name the
//! offending field and a machine-readable reason.

use pagination::{PageLimits, PageParams, PageRequest, PageRequestError};
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

/// A request field as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }
}

/// Parse an identifier, echoing the rejected value back in the details.
pub(crate) fn parse_uuid(value: String, field: FieldName) -> Result<Uuid, Error> {
    let FieldName(name) = field;
    Uuid::parse_str(&value).map_err(|_| {
        Error::invalid_request(format!("{name} must be a valid UUID")).with_details(json!({
            "field": name,
            "value": value,
            "code": "invalid_uuid",
        }))
    })
}

/// Map a domain validation failure onto the field it names.
pub(crate) fn field_error(field: &str, error: impl std::fmt::Display) -> Error {
    Error::invalid_field(field, error.to_string())
}

/// Normalise raw `page`/`limit` values against an endpoint's limits.
pub(crate) fn page_request(
    limits: PageLimits,
    page: Option<u32>,
    limit: Option<u32>,
) -> Result<PageRequest, Error> {
    limits.resolve(PageParams { page, limit }).map_err(|err| {
        let field = match err {
            PageRequestError::ZeroPage => "page",
            PageRequestError::ZeroLimit => "limit",
        };
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": field,
            "code": "invalid_page",
        }))
    })
}
