//! OpenAPI documents generated from [RouteMetadata].

use crate::config::ServerConfig;
use crate::controller::RouteMetadata;
use crate::params::{Param, ParamLocation, ParamType};
use serde_json::{json, Map, Value};

pub const OPENAPI_VERSION: &str = "3.1.0";
pub const OPENAPI_PATH: &str = "/openapi.json";

/// Returns the schema name and JSON schema of a request body type.
pub type BodySchemaFn = fn() -> (&'static str, Value);

/// Types accepted as documented request bodies.
pub trait BodySchema {
    const NAME: &'static str;

    fn schema() -> Value;

    fn schema_entry() -> (&'static str, Value) {
        (Self::NAME, Self::schema())
    }
}

/// Converts a router path template (`/files/*file_path`, `/items/:item_id`) to OpenAPI syntax.
pub fn openapi_path(path: &str) -> String {
    path.split('/')
        .map(|segment| match segment.strip_prefix(&[':', '*'][..]) {
            Some(name) => format!("{{{name}}}"),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn param_schema(param: &Param) -> Value {
    let mut schema = Map::new();
    match param.param_type {
        ParamType::String => {
            schema.insert("type".into(), "string".into());
        }
        ParamType::Integer => {
            schema.insert("type".into(), "integer".into());
        }
        ParamType::Boolean => {
            schema.insert("type".into(), "boolean".into());
        }
        ParamType::StringList => {
            schema.insert("type".into(), "array".into());
            schema.insert("items".into(), json!({ "type": "string" }));
        }
        ParamType::Enumeration(values) => {
            schema.insert("type".into(), "string".into());
            schema.insert("enum".into(), values.into());
        }
    }

    if let Some(title) = param.title {
        schema.insert("title".into(), title.into());
    }
    if let Some(min_length) = param.min_length {
        schema.insert("minLength".into(), min_length.into());
    }
    if let Some(max_length) = param.max_length {
        schema.insert("maxLength".into(), max_length.into());
    }
    if let Some(pattern) = param.pattern {
        schema.insert("pattern".into(), pattern.into());
    }

    Value::Object(schema)
}

fn parameter(param: &Param) -> Value {
    let mut parameter = Map::new();
    parameter.insert("name".into(), param.key().into());
    parameter.insert(
        "in".into(),
        match param.location {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
        }
        .into(),
    );
    parameter.insert("required".into(), param.required.into());
    if let Some(description) = param.description {
        parameter.insert("description".into(), description.into());
    }
    if param.deprecated {
        parameter.insert("deprecated".into(), true.into());
    }
    parameter.insert("schema".into(), param_schema(param));

    Value::Object(parameter)
}

fn operation(route: &RouteMetadata, schemas: &mut Map<String, Value>) -> Value {
    let mut operation = Map::new();
    if !route.tags.is_empty() {
        operation.insert("tags".into(), route.tags.into());
    }
    if let Some(summary) = route.summary {
        operation.insert("summary".into(), summary.into());
    }
    operation.insert("operationId".into(), route.operation_id.into());

    let parameters: Vec<_> = route
        .params
        .iter()
        .filter(|param| param.include_in_schema)
        .map(parameter)
        .collect();
    if !parameters.is_empty() {
        operation.insert("parameters".into(), parameters.into());
    }

    if let Some(schema_entry) = route.request_body {
        let (name, schema) = schema_entry();
        schemas.insert(name.to_string(), schema);
        operation.insert(
            "requestBody".into(),
            json!({
                "required": true,
                "content": {
                    "application/json": {
                        "schema": { "$ref": format!("#/components/schemas/{name}") }
                    }
                }
            }),
        );
    }

    let mut responses = Map::new();
    responses.insert(
        "200".into(),
        json!({
            "description": "Successful Response",
            "content": { "application/json": { "schema": {} } }
        }),
    );
    if !route.params.is_empty() || route.request_body.is_some() {
        responses.insert(
            "422".into(),
            json!({ "description": "Validation Error" }),
        );
    }
    operation.insert("responses".into(), Value::Object(responses));

    Value::Object(operation)
}

/// Builds the document describing all routes of a single server.
pub fn document(config: &ServerConfig, routes: &[RouteMetadata]) -> Value {
    let mut paths = Map::new();
    let mut schemas = Map::new();

    for route in routes {
        let operation = operation(route, &mut schemas);
        if let Value::Object(path_item) = paths
            .entry(openapi_path(route.path))
            .or_insert_with(|| Value::Object(Map::new()))
        {
            path_item.insert(route.method.as_str().to_ascii_lowercase(), operation);
        }
    }

    let mut info = Map::new();
    info.insert("title".into(), config.title.as_str().into());
    info.insert("version".into(), config.version.as_str().into());
    if let Some(description) = &config.description {
        info.insert("description".into(), description.as_str().into());
    }

    let mut document = json!({
        "openapi": OPENAPI_VERSION,
        "info": info,
        "paths": paths,
    });
    if !schemas.is_empty() {
        document["components"] = json!({ "schemas": schemas });
    }

    document
}
