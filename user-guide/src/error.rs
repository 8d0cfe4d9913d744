//! Validation errors reported back to clients.
//!
//! Every rejected input is described by a [FieldError], and a request fails with a
//! [ValidationError] rendered as `422 Unprocessable Entity` with a `{"detail": [...]}` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::{Display, Formatter};
use thiserror::Error;
use tracing::debug;

/// Part of the request an error refers to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Path,
    Query,
    Body,
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Path => f.write_str("path"),
            Location::Query => f.write_str("query"),
            Location::Body => f.write_str("body"),
        }
    }
}

/// A single rejected input value.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldError {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub loc: Vec<String>,
    pub msg: String,
    pub input: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctx: Option<Value>,
}

impl FieldError {
    pub fn new(
        kind: &'static str,
        location: Location,
        field: Option<&str>,
        msg: impl Into<String>,
        input: Value,
    ) -> Self {
        let mut loc = vec![location.to_string()];
        loc.extend(field.map(str::to_string));

        Self {
            kind,
            loc,
            msg: msg.into(),
            input,
            ctx: None,
        }
    }

    pub fn with_ctx(mut self, ctx: Value) -> Self {
        self.ctx = Some(ctx);
        self
    }

    /// Appends nested field names, e.g. the path to a body field.
    pub fn with_path(mut self, path: impl IntoIterator<Item = String>) -> Self {
        self.loc.extend(path);
        self
    }

    pub fn missing(location: Location, field: Option<&str>) -> Self {
        Self::new("missing", location, field, "Field required", Value::Null)
    }

    pub fn int_parsing(location: Location, field: &str, input: &str) -> Self {
        Self::new(
            "int_parsing",
            location,
            Some(field),
            "Input should be a valid integer, unable to parse string as an integer",
            input.into(),
        )
    }

    pub fn bool_parsing(location: Location, field: &str, input: &str) -> Self {
        Self::new(
            "bool_parsing",
            location,
            Some(field),
            "Input should be a valid boolean, unable to interpret input",
            input.into(),
        )
    }

    pub fn float_parsing(location: Location, field: Option<&str>, input: Value) -> Self {
        Self::new(
            "float_parsing",
            location,
            field,
            "Input should be a valid number, unable to parse string as a number",
            input,
        )
    }

    pub fn float_type(location: Location, field: Option<&str>, input: Value) -> Self {
        Self::new(
            "float_type",
            location,
            field,
            "Input should be a valid number",
            input,
        )
    }

    pub fn string_type(location: Location, field: Option<&str>, input: Value) -> Self {
        Self::new(
            "string_type",
            location,
            field,
            "Input should be a valid string",
            input,
        )
    }

    pub fn model_attributes_type(location: Location, input: Value) -> Self {
        Self::new(
            "model_attributes_type",
            location,
            None,
            "Input should be a valid dictionary or object to extract fields from",
            input,
        )
    }

    pub fn too_short(location: Location, field: &str, input: &str, min_length: usize) -> Self {
        Self::new(
            "string_too_short",
            location,
            Some(field),
            format!(
                "String should have at least {min_length} {}",
                characters(min_length)
            ),
            input.into(),
        )
        .with_ctx(json!({ "min_length": min_length }))
    }

    pub fn too_long(location: Location, field: &str, input: &str, max_length: usize) -> Self {
        Self::new(
            "string_too_long",
            location,
            Some(field),
            format!(
                "String should have at most {max_length} {}",
                characters(max_length)
            ),
            input.into(),
        )
        .with_ctx(json!({ "max_length": max_length }))
    }

    pub fn pattern_mismatch(location: Location, field: &str, input: &str, pattern: &str) -> Self {
        Self::new(
            "string_pattern_mismatch",
            location,
            Some(field),
            format!("String should match pattern '{pattern}'"),
            input.into(),
        )
        .with_ctx(json!({ "pattern": pattern }))
    }

    pub fn enumeration(location: Location, field: &str, input: &str, choices: &[&str]) -> Self {
        let expected = expected_choices(choices);
        Self::new(
            "enum",
            location,
            Some(field),
            format!("Input should be {expected}"),
            input.into(),
        )
        .with_ctx(json!({ "expected": expected }))
    }

    pub fn value_error(location: Location, field: &str, input: &str, message: &str) -> Self {
        Self::new(
            "value_error",
            location,
            Some(field),
            format!("Value error, {message}"),
            input.into(),
        )
        .with_ctx(json!({ "error": message }))
    }
}

fn characters(count: usize) -> &'static str {
    if count == 1 {
        "character"
    } else {
        "characters"
    }
}

// 'a', 'b' or 'c'
fn expected_choices(choices: &[&str]) -> String {
    let quoted: Vec<_> = choices.iter().map(|choice| format!("'{choice}'")).collect();
    match quoted.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} or {last}", rest.join(", ")),
        Some((last, _)) => last.clone(),
        None => String::new(),
    }
}

/// Request input failed validation.
#[derive(Error, Clone, Debug, PartialEq)]
#[error("Request validation failed: {}", summarize(.detail))]
pub struct ValidationError {
    pub detail: Vec<FieldError>,
}

fn summarize(detail: &[FieldError]) -> String {
    detail
        .iter()
        .map(|error| format!("{} ({})", error.msg, error.loc.join(".")))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<FieldError> for ValidationError {
    fn from(value: FieldError) -> Self {
        Self {
            detail: vec![value],
        }
    }
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        debug!(error = %self, "Rejecting request");

        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": self.detail })),
        )
            .into_response()
    }
}

/// Result of a handler which validates its own inputs.
pub type ApiResult<T> = Result<T, ValidationError>;

/// Combines independently validated inputs. Succeeds only when every input is valid, otherwise
/// reports the failures of all inputs together, in tuple order.
///
/// ```
/// use user_guide::error::{ApiResult, FieldError, Location, ValidateAll};
///
/// let item_id: ApiResult<i64> =
///     Err(FieldError::int_parsing(Location::Path, "item_id", "x").into());
/// let short: ApiResult<bool> =
///     Err(FieldError::bool_parsing(Location::Query, "short", "y").into());
///
/// assert_eq!((item_id, short).validate_all().unwrap_err().detail.len(), 2);
/// ```
pub trait ValidateAll {
    type Output;

    fn validate_all(self) -> ApiResult<Self::Output>;
}

macro_rules! impl_validate_all {
    ($($value:ident: $ty:ident),+) => {
        impl<$($ty),+> ValidateAll for ($(ApiResult<$ty>,)+) {
            type Output = ($($ty,)+);

            fn validate_all(self) -> ApiResult<Self::Output> {
                match self {
                    ($(Ok($value),)+) => Ok(($($value,)+)),
                    ($($value,)+) => {
                        let mut detail = Vec::new();
                        $(
                            if let Err(error) = $value {
                                detail.extend(error.detail);
                            }
                        )+
                        Err(ValidationError { detail })
                    }
                }
            }
        }
    };
}

impl_validate_all!(a: A, b: B);
impl_validate_all!(a: A, b: B, c: C);
impl_validate_all!(a: A, b: B, c: C, d: D);
impl_validate_all!(a: A, b: B, c: C, d: D, e: E);

#[cfg(test)]
mod tests {
    use crate::error::{ApiResult, FieldError, Location, ValidateAll, ValidationError};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use serde_json::json;

    #[test]
    fn should_serialize_field_error() {
        let error = FieldError::too_long(Location::Query, "q", "abc", 2);
        assert_eq!(
            serde_json::to_value(error).unwrap(),
            json!({
                "type": "string_too_long",
                "loc": ["query", "q"],
                "msg": "String should have at most 2 characters",
                "input": "abc",
                "ctx": {"max_length": 2}
            })
        );
    }

    #[test]
    fn should_skip_missing_ctx() {
        let error = FieldError::missing(Location::Body, None);
        assert_eq!(
            serde_json::to_value(error).unwrap(),
            json!({
                "type": "missing",
                "loc": ["body"],
                "msg": "Field required",
                "input": null
            })
        );
    }

    #[test]
    fn should_list_enum_choices() {
        let error = FieldError::enumeration(
            Location::Path,
            "model_name",
            "vgg",
            &["alexnet", "resnet", "lenet"],
        );
        assert_eq!(error.msg, "Input should be 'alexnet', 'resnet' or 'lenet'");

        let error = FieldError::enumeration(Location::Path, "model_name", "vgg", &["alexnet"]);
        assert_eq!(error.msg, "Input should be 'alexnet'");
    }

    #[test]
    fn should_use_singular_character() {
        let error = FieldError::too_short(Location::Query, "q", "", 1);
        assert_eq!(error.msg, "String should have at least 1 character");
    }

    #[test]
    fn should_respond_with_unprocessable_entity() {
        let error = ValidationError::from(FieldError::missing(Location::Query, Some("q")));
        assert_eq!(
            error.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn should_collect_every_failure() {
        let user_id: ApiResult<i64> =
            Err(FieldError::int_parsing(Location::Path, "user_id", "abc").into());
        let item_id: ApiResult<String> = Ok("foo".to_string());
        let short: ApiResult<Option<bool>> =
            Err(FieldError::bool_parsing(Location::Query, "short", "maybe").into());

        let error = (user_id, item_id, short).validate_all().unwrap_err();
        let kinds: Vec<_> = error.detail.iter().map(|error| error.kind).collect();
        assert_eq!(kinds, vec!["int_parsing", "bool_parsing"]);
        assert_eq!(error.detail[1].loc, vec!["query", "short"]);
    }

    #[test]
    fn should_pass_through_valid_inputs() {
        let user_id: ApiResult<i64> = Ok(1);
        let q: ApiResult<Option<String>> = Ok(None);
        assert_eq!((user_id, q).validate_all().unwrap(), (1, None));
    }
}
