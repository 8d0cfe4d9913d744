//! Request extractors feeding [Param](crate::params::Param) validation and typed bodies.

use crate::error::{ApiResult, FieldError, Location, ValidationError};
use axum::async_trait;
use axum::body::{Bytes, HttpBody};
use axum::extract::rejection::PathRejection;
use axum::extract::{FromRequest, FromRequestParts, Path};
use axum::http::request::Parts;
use axum::http::Request;
use axum::BoxError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use serde_path_to_error::Segment;
use std::convert::Infallible;
use url::form_urlencoded;

/// Raw path and query parameters of a request. Values are decoded, but not yet validated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestParams {
    path: Vec<(String, String)>,
    query: Vec<(String, String)>,
}

impl RequestParams {
    pub fn new(path: Vec<(String, String)>, query: Vec<(String, String)>) -> Self {
        Self { path, query }
    }

    /// Creates params from a raw, still encoded query string.
    pub fn from_query(query: &str) -> Self {
        Self::new(Vec::new(), parse_query(query))
    }

    pub fn with_path(mut self, name: &str, value: &str) -> Self {
        self.path.push((name.to_string(), value.to_string()));
        self
    }

    pub fn path_value(&self, name: &str) -> Option<&str> {
        self.path
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Last value given for a query key.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .rev()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// All values given for a query key, in request order.
    pub fn query_values(&self, key: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
            .collect()
    }
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequestParams {
    type Rejection = ValidationError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let path = match Path::<Vec<(String, String)>>::from_request_parts(parts, state).await {
            Ok(Path(path)) => path,
            Err(PathRejection::MissingPathParams(_)) => Vec::new(),
            Err(rejection) => {
                return Err(FieldError::new(
                    "value_error",
                    Location::Path,
                    None,
                    rejection.body_text(),
                    Value::Null,
                )
                .into())
            }
        };

        let query = parts.uri.query().map(parse_query).unwrap_or_default();
        Ok(Self::new(path, query))
    }
}

/// JSON body deserialized into `T`. The body is parsed regardless of the declared content type.
///
/// Extraction never rejects the request. Body errors are kept, so they can be reported together
/// with parameter errors, e.g. with [ValidateAll](crate::error::ValidateAll).
#[derive(Clone, Debug, PartialEq)]
pub struct JsonBody<T>(pub ApiResult<T>);

#[async_trait]
impl<T, S, B> FromRequest<S, B> for JsonBody<T>
where
    T: DeserializeOwned,
    B: HttpBody + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        let body = match Bytes::from_request(req, state).await {
            Ok(body) => body,
            Err(rejection) => {
                return Ok(Self(Err(FieldError::new(
                    "value_error",
                    Location::Body,
                    None,
                    rejection.body_text(),
                    Value::Null,
                )
                .into())))
            }
        };

        Ok(Self(parse_body(&body)))
    }
}

/// Deserializes a JSON body, mapping failures to body [FieldErrors](FieldError) located at the
/// offending field.
pub fn parse_body<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(FieldError::missing(Location::Body, None).into());
    }

    let value: Value = serde_json::from_slice(body).map_err(|error| {
        FieldError::new(
            "json_invalid",
            Location::Body,
            None,
            "JSON decode error",
            Value::Null,
        )
        .with_ctx(serde_json::json!({ "error": error.to_string() }))
    })?;

    serde_path_to_error::deserialize(&value).map_err(|error| data_error(error, &value))
}

fn data_error(
    error: serde_path_to_error::Error<serde_json::Error>,
    body: &Value,
) -> ValidationError {
    let mut loc = Vec::new();
    let mut input = Some(body);
    for segment in error.path() {
        match segment {
            Segment::Seq { index } => {
                input = input.and_then(|value| value.get(index));
                loc.push(index.to_string());
            }
            Segment::Map { key } => {
                input = input.and_then(|value| value.get(key.as_str()));
                loc.push(key.clone());
            }
            Segment::Enum { variant } => loc.push(variant.clone()),
            Segment::Unknown => {}
        }
    }

    let input = input.cloned().unwrap_or(Value::Null);
    let message = error.into_inner().to_string();

    let field_error = if let Some(field) = missing_field(&message) {
        loc.push(field.to_string());
        FieldError::new("missing", Location::Body, None, "Field required", input)
    } else if message == FLOAT_PARSING {
        FieldError::float_parsing(Location::Body, None, input)
    } else if message == FLOAT_TYPE {
        FieldError::float_type(Location::Body, None, input)
    } else {
        match expected_type(&message) {
            Some("a string") => FieldError::string_type(Location::Body, None, input),
            Some(expected) if expected == "a map" || expected.starts_with("struct ") => {
                FieldError::model_attributes_type(Location::Body, input)
            }
            _ => FieldError::new("value_error", Location::Body, None, message, input),
        }
    };

    field_error.with_path(loc).into()
}

// serde reports missing fields as "missing field `name`"
fn missing_field(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("missing field `")?;
    rest.find('`').map(|end| &rest[..end])
}

// serde reports type mismatches as "invalid type: <actual>, expected <expected>"
fn expected_type(message: &str) -> Option<&str> {
    message
        .strip_prefix("invalid type: ")?
        .split_once(", expected ")
        .map(|(_, expected)| expected)
}

const FLOAT_PARSING: &str = "unable to parse string as a number";
const FLOAT_TYPE: &str = "not a number";

/// Accepts a JSON number or a string holding one.
pub fn lax_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    lax_optional_number(deserializer)?.ok_or_else(|| serde::de::Error::custom(FLOAT_TYPE))
}

/// Optional variant of [lax_number]; `null` stays `None`.
pub fn lax_optional_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Float(f64),
        Text(String),
        Other(Value),
    }

    match Option::<Number>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Number::Float(value)) => Ok(Some(value)),
        Some(Number::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(FLOAT_PARSING)),
        Some(Number::Other(_)) => Err(serde::de::Error::custom(FLOAT_TYPE)),
    }
}
