//! Guide chapters. Each chapter is a controller attached to a server of the same name.

pub mod first_steps;
pub mod path_parameters;
pub mod query_parameters;
pub mod request_body;
pub mod string_validations;

pub const FIRST_STEPS: &str = "first-steps";
pub const PATH_PARAMETERS: &str = "path-parameters";
pub const QUERY_PARAMETERS: &str = "query-parameters";
pub const REQUEST_BODY: &str = "request-body";
pub const STRING_VALIDATIONS: &str = "string-validations";
