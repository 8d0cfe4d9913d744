//! Declarative request parameters.
//!
//! A [Param] is a `const` declaration describing where a value comes from, how it is coerced and
//! which constraints it must satisfy. Handlers use the same declaration to read validated values
//! from [RequestParams], and [openapi](crate::openapi) uses it to document the route.
//!
//! ```
//! use user_guide::extract::RequestParams;
//! use user_guide::params::Param;
//!
//! const QUERY: Param = Param::query("q").min_length(3).max_length(50);
//!
//! let params = RequestParams::from_query("q=fixedquery");
//! assert_eq!(QUERY.optional_string(&params).unwrap(), Some("fixedquery".to_string()));
//! ```

use crate::error::{FieldError, Location, ValidationError};
use crate::extract::RequestParams;
use fxhash::FxHashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};
use tracing::error;

static PATTERNS: Lazy<Mutex<FxHashMap<&'static str, Regex>>> = Lazy::new(Default::default);

/// Compiles a declared pattern on first use; later calls reuse the compiled [Regex].
pub fn compiled_pattern(pattern: &'static str) -> Result<Regex, regex::Error> {
    let mut patterns = PATTERNS.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(regex) = patterns.get(pattern) {
        return Ok(regex.clone());
    }

    let regex = Regex::new(pattern)?;
    patterns.insert(pattern, regex.clone());
    Ok(regex)
}

/// Custom check run after all declared constraints pass.
pub type Validator = fn(&str) -> Result<(), String>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParamLocation {
    Path,
    Query,
}

impl From<ParamLocation> for Location {
    fn from(value: ParamLocation) -> Self {
        match value {
            ParamLocation::Path => Location::Path,
            ParamLocation::Query => Location::Query,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParamType {
    String,
    Integer,
    Boolean,
    StringList,
    /// Closed set of allowed string values.
    Enumeration(&'static [&'static str]),
}

/// Declaration of a single path or query parameter.
#[derive(Clone, Copy, Debug)]
pub struct Param {
    pub name: &'static str,
    pub location: ParamLocation,
    pub param_type: ParamType,
    pub required: bool,
    pub alias: Option<&'static str>,
    pub title: Option<&'static str>,
    pub description: Option<&'static str>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<&'static str>,
    pub deprecated: bool,
    pub include_in_schema: bool,
    pub validator: Option<Validator>,
}

impl Param {
    /// Path parameters are always required.
    pub const fn path(name: &'static str, param_type: ParamType) -> Self {
        Self {
            name,
            location: ParamLocation::Path,
            param_type,
            required: true,
            alias: None,
            title: None,
            description: None,
            min_length: None,
            max_length: None,
            pattern: None,
            deprecated: false,
            include_in_schema: true,
            validator: None,
        }
    }

    /// Optional string query parameter.
    pub const fn query(name: &'static str) -> Self {
        Self {
            location: ParamLocation::Query,
            required: false,
            ..Self::path(name, ParamType::String)
        }
    }

    pub const fn of_type(self, param_type: ParamType) -> Self {
        Self { param_type, ..self }
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    pub const fn alias(self, alias: &'static str) -> Self {
        Self {
            alias: Some(alias),
            ..self
        }
    }

    pub const fn title(self, title: &'static str) -> Self {
        Self {
            title: Some(title),
            ..self
        }
    }

    pub const fn description(self, description: &'static str) -> Self {
        Self {
            description: Some(description),
            ..self
        }
    }

    pub const fn min_length(self, min_length: usize) -> Self {
        Self {
            min_length: Some(min_length),
            ..self
        }
    }

    pub const fn max_length(self, max_length: usize) -> Self {
        Self {
            max_length: Some(max_length),
            ..self
        }
    }

    pub const fn pattern(self, pattern: &'static str) -> Self {
        Self {
            pattern: Some(pattern),
            ..self
        }
    }

    pub const fn deprecated(self) -> Self {
        Self {
            deprecated: true,
            ..self
        }
    }

    /// Keeps the parameter out of generated documentation. Validation is unaffected.
    pub const fn hidden(self) -> Self {
        Self {
            include_in_schema: false,
            ..self
        }
    }

    pub const fn validator(self, validator: Validator) -> Self {
        Self {
            validator: Some(validator),
            ..self
        }
    }

    /// Verifies the declaration itself, e.g. that the pattern compiles.
    pub fn validate_declaration(&self) -> Result<(), regex::Error> {
        match self.pattern {
            Some(pattern) => compiled_pattern(pattern).map(|_| ()),
            None => Ok(()),
        }
    }

    /// Name under which the value is sent by clients.
    pub fn key(&self) -> &'static str {
        self.alias.unwrap_or(self.name)
    }

    fn raw<'a>(&self, params: &'a RequestParams) -> Option<&'a str> {
        match self.location {
            ParamLocation::Path => params.path_value(self.key()),
            ParamLocation::Query => params.query_value(self.key()),
        }
    }

    fn missing(&self) -> ValidationError {
        FieldError::missing(self.location.into(), Some(self.key())).into()
    }

    /// Runs length, pattern and custom checks against a raw value.
    pub fn check(&self, value: &str) -> Result<(), ValidationError> {
        let location: Location = self.location.into();
        let key = self.key();

        let length = value.chars().count();
        if let Some(min_length) = self.min_length {
            if length < min_length {
                return Err(FieldError::too_short(location, key, value, min_length).into());
            }
        }

        if let Some(max_length) = self.max_length {
            if length > max_length {
                return Err(FieldError::too_long(location, key, value, max_length).into());
            }
        }

        if let Some(pattern) = self.pattern {
            // declared patterns are checked when routes are registered
            let matches = match compiled_pattern(pattern) {
                Ok(regex) => regex.is_match(value),
                Err(error) => {
                    error!(%error, pattern, param = key, "Invalid parameter pattern");
                    false
                }
            };
            if !matches {
                return Err(FieldError::pattern_mismatch(location, key, value, pattern).into());
            }
        }

        if let Some(validator) = self.validator {
            validator(value)
                .map_err(|message| FieldError::value_error(location, key, value, &message))?;
        }

        Ok(())
    }

    pub fn optional_string(&self, params: &RequestParams) -> Result<Option<String>, ValidationError> {
        self.raw(params)
            .map(|value| self.check(value).map(|_| value.to_string()))
            .transpose()
    }

    pub fn string(&self, params: &RequestParams) -> Result<String, ValidationError> {
        self.optional_string(params)?
            .ok_or_else(|| self.missing())
    }

    pub fn optional_integer(&self, params: &RequestParams) -> Result<Option<i64>, ValidationError> {
        self.raw(params)
            .map(|value| {
                parse_integer(value).ok_or_else(|| {
                    ValidationError::from(FieldError::int_parsing(
                        self.location.into(),
                        self.key(),
                        value,
                    ))
                })
            })
            .transpose()
    }

    pub fn integer(&self, params: &RequestParams) -> Result<i64, ValidationError> {
        self.optional_integer(params)?
            .ok_or_else(|| self.missing())
    }

    pub fn optional_boolean(&self, params: &RequestParams) -> Result<Option<bool>, ValidationError> {
        self.raw(params)
            .map(|value| {
                parse_boolean(value).ok_or_else(|| {
                    ValidationError::from(FieldError::bool_parsing(
                        self.location.into(),
                        self.key(),
                        value,
                    ))
                })
            })
            .transpose()
    }

    /// Every value given for a repeated query key. `None` when the key is absent.
    pub fn optional_list(
        &self,
        params: &RequestParams,
    ) -> Result<Option<Vec<String>>, ValidationError> {
        let values = params.query_values(self.key());
        if values.is_empty() {
            return Ok(None);
        }

        values
            .into_iter()
            .map(|value| self.check(value).map(|_| value.to_string()))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Parses one of the declared [ParamType::Enumeration] values.
    pub fn choice<T: FromStr>(&self, params: &RequestParams) -> Result<T, ValidationError> {
        let value = self.raw(params).ok_or_else(|| self.missing())?;
        value.parse().map_err(|_| {
            let choices = match self.param_type {
                ParamType::Enumeration(choices) => choices,
                _ => &[],
            };
            ValidationError::from(FieldError::enumeration(
                self.location.into(),
                self.key(),
                value,
                choices,
            ))
        })
    }
}

fn parse_integer(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

fn parse_boolean(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "on" | "yes" | "y" => Some(true),
        "0" | "false" | "f" | "off" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::extract::RequestParams;
    use crate::params::{compiled_pattern, Param, ParamType};

    const BOUNDED: Param = Param::query("q").min_length(3).max_length(5);
    const FIXED: Param = Param::query("q").pattern("^fixedquery$");
    const ALIASED: Param = Param::query("q").alias("item-query");
    const FLAG: Param = Param::query("short").of_type(ParamType::Boolean);
    const NUMBER: Param = Param::path("item_id", ParamType::Integer);
    const CHOICE: Param = Param::path("color", ParamType::Enumeration(&["red", "blue"]));
    const PREFIXED: Param = Param::query("id").validator(starts_with_x);

    fn starts_with_x(value: &str) -> Result<(), String> {
        if value.starts_with("x-") {
            Ok(())
        } else {
            Err("must start with x-".to_string())
        }
    }

    #[derive(Debug, PartialEq)]
    enum Color {
        Red,
        Blue,
    }

    impl std::str::FromStr for Color {
        type Err = ();

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "red" => Ok(Color::Red),
                "blue" => Ok(Color::Blue),
                _ => Err(()),
            }
        }
    }

    #[test]
    fn should_treat_absent_optional_as_none() {
        let params = RequestParams::from_query("");
        assert_eq!(BOUNDED.optional_string(&params).unwrap(), None);
    }

    #[test]
    fn should_reject_missing_required() {
        let params = RequestParams::from_query("other=1");
        let error = BOUNDED.required().string(&params).unwrap_err();
        assert_eq!(error.detail[0].kind, "missing");
        assert_eq!(error.detail[0].loc, vec!["query", "q"]);
    }

    #[test]
    fn should_check_length_in_characters() {
        let params = RequestParams::from_query("q=%C3%A9%C3%A9%C3%A9");
        assert_eq!(
            BOUNDED.optional_string(&params).unwrap(),
            Some("ééé".to_string())
        );

        let params = RequestParams::from_query("q=ab");
        assert_eq!(
            BOUNDED.optional_string(&params).unwrap_err().detail[0].kind,
            "string_too_short"
        );

        let params = RequestParams::from_query("q=abcdef");
        assert_eq!(
            BOUNDED.optional_string(&params).unwrap_err().detail[0].kind,
            "string_too_long"
        );
    }

    #[test]
    fn should_check_pattern() {
        let params = RequestParams::from_query("q=fixedquery");
        assert!(FIXED.optional_string(&params).is_ok());

        let params = RequestParams::from_query("q=fixedquery2");
        assert_eq!(
            FIXED.optional_string(&params).unwrap_err().detail[0].kind,
            "string_pattern_mismatch"
        );
    }

    #[test]
    fn should_read_alias() {
        let params = RequestParams::from_query("q=ignored&item-query=used");
        assert_eq!(ALIASED.key(), "item-query");
        assert_eq!(
            ALIASED.optional_string(&params).unwrap(),
            Some("used".to_string())
        );
    }

    #[test]
    fn should_use_last_repeated_value() {
        let params = RequestParams::from_query("q=first&q=second");
        assert_eq!(
            Param::query("q").optional_string(&params).unwrap(),
            Some("second".to_string())
        );
    }

    #[test]
    fn should_coerce_booleans() {
        for value in ["1", "true", "True", "on", "yes"] {
            let params = RequestParams::from_query(&format!("short={value}"));
            assert_eq!(FLAG.optional_boolean(&params).unwrap(), Some(true));
        }

        for value in ["0", "false", "FALSE", "off", "no"] {
            let params = RequestParams::from_query(&format!("short={value}"));
            assert_eq!(FLAG.optional_boolean(&params).unwrap(), Some(false));
        }

        let params = RequestParams::from_query("short=maybe");
        assert_eq!(
            FLAG.optional_boolean(&params).unwrap_err().detail[0].kind,
            "bool_parsing"
        );
    }

    #[test]
    fn should_coerce_path_integers() {
        let params = RequestParams::default().with_path("item_id", "-7");
        assert_eq!(NUMBER.integer(&params).unwrap(), -7);

        let params = RequestParams::default().with_path("item_id", "foo");
        let error = NUMBER.integer(&params).unwrap_err();
        assert_eq!(error.detail[0].kind, "int_parsing");
        assert_eq!(error.detail[0].loc, vec!["path", "item_id"]);
    }

    #[test]
    fn should_parse_choices() {
        let params = RequestParams::default().with_path("color", "blue");
        assert_eq!(CHOICE.choice::<Color>(&params).unwrap(), Color::Blue);

        let params = RequestParams::default().with_path("color", "green");
        let error = CHOICE.choice::<Color>(&params).unwrap_err();
        assert_eq!(error.detail[0].kind, "enum");
        assert_eq!(error.detail[0].msg, "Input should be 'red' or 'blue'");
    }

    #[test]
    fn should_collect_lists() {
        let params = RequestParams::from_query("q=foo&q=bar");
        assert_eq!(
            Param::query("q").optional_list(&params).unwrap(),
            Some(vec!["foo".to_string(), "bar".to_string()])
        );

        let params = RequestParams::from_query("");
        assert_eq!(Param::query("q").optional_list(&params).unwrap(), None);
    }

    #[test]
    fn should_run_custom_validator() {
        let params = RequestParams::from_query("id=x-1");
        assert!(PREFIXED.optional_string(&params).is_ok());

        let params = RequestParams::from_query("id=y-1");
        let error = PREFIXED.optional_string(&params).unwrap_err();
        assert_eq!(error.detail[0].kind, "value_error");
        assert_eq!(error.detail[0].msg, "Value error, must start with x-");
    }

    #[test]
    fn should_reuse_compiled_patterns() {
        let first = compiled_pattern("^cached$").unwrap();
        let second = compiled_pattern("^cached$").unwrap();
        assert_eq!(first.as_str(), second.as_str());
        assert!(second.is_match("cached"));
    }

    #[test]
    fn should_reject_invalid_pattern_declaration() {
        assert!(FIXED.validate_declaration().is_ok());
        assert!(Param::query("q").pattern("(").validate_declaration().is_err());
    }
}
