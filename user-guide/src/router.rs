//! Controller routing handling. Routing is based on gathering registered controllers and their
//! request handlers.

use crate::config::ServerConfig;
use crate::controller::{Controller, ControllerPtr, RouteMetadata};
use crate::openapi::{self, OPENAPI_PATH};
use axum::http::{header, StatusCode};
use axum::middleware::map_response;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors related to assembling a server router.
#[derive(Error, Debug)]
pub enum RouterBootstrapError {
    #[error("Invalid pattern of parameter {param} on route {path}: {source}")]
    InvalidPattern {
        path: &'static str,
        param: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// Trait for creating a [Router], usually based on registered [Controllers](Controller).
pub trait RouterBootstrap {
    /// Creates a new [Router] for the named server.
    fn bootstrap_router(
        &self,
        server_name: &str,
        config: &ServerConfig,
    ) -> Result<Router, RouterBootstrapError>;
}

/// Default bootstrap merging all controllers which should be attached to the given server.
pub struct ControllerRouterBootstrap {
    controllers: Vec<ControllerPtr>,
}

impl ControllerRouterBootstrap {
    pub fn new(controllers: Vec<ControllerPtr>) -> Self {
        Self { controllers }
    }

    fn controllers_for<'a>(
        &'a self,
        server_name: &'a str,
    ) -> impl Iterator<Item = &'a (dyn Controller + Send + Sync)> + 'a {
        self.controllers
            .iter()
            .map(|controller| controller.as_ref())
            .filter(move |controller| {
                controller
                    .server_names()
                    .map(|server_names| server_names.contains(server_name))
                    .unwrap_or(true)
            })
    }
}

fn validate_routes(routes: &[RouteMetadata]) -> Result<(), RouterBootstrapError> {
    for route in routes {
        for param in &route.params {
            param
                .validate_declaration()
                .map_err(|source| RouterBootstrapError::InvalidPattern {
                    path: route.path,
                    param: param.name,
                    source,
                })?;
        }
    }

    Ok(())
}

impl RouterBootstrap for ControllerRouterBootstrap {
    fn bootstrap_router(
        &self,
        server_name: &str,
        config: &ServerConfig,
    ) -> Result<Router, RouterBootstrapError> {
        let routes: Vec<_> = self
            .controllers_for(server_name)
            .flat_map(|controller| controller.routes())
            .collect();
        validate_routes(&routes)?;

        debug!(server_name, routes = routes.len(), "Bootstrapping router");

        let document = Arc::new(openapi::document(config, &routes));
        let router = Router::new()
            .route(
                OPENAPI_PATH,
                get(move || {
                    let document = document.clone();
                    async move { Json(document.as_ref().clone()) }
                }),
            )
            .fallback(not_found);

        Ok(self
            .controllers_for(server_name)
            .fold(router, |router, controller| {
                controller.configure_router(router)
            })
            .layer(map_response(json_method_not_allowed)))
    }
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not Found" })))
}

// keeps the Allow header of the original response
async fn json_method_not_allowed(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    let allow = response.headers().get(header::ALLOW).cloned();
    let mut response = (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "detail": "Method Not Allowed" })),
    )
        .into_response();
    if let Some(allow) = allow {
        response.headers_mut().insert(header::ALLOW, allow);
    }

    response
}

#[cfg(test)]
mod tests {
    use crate::config::ServerConfig;
    use crate::controller::{MockController, RouteMetadata};
    use crate::params::Param;
    use crate::router::{
        json_method_not_allowed, ControllerRouterBootstrap, RouterBootstrap, RouterBootstrapError,
    };
    use axum::http::{header, HeaderValue, Method, StatusCode};
    use axum::response::IntoResponse;
    use fxhash::FxHashSet;
    use serde_json::{json, Value};

    fn controller(configure_times: usize) -> MockController {
        let mut controller = MockController::new();
        controller
            .expect_configure_router()
            .times(configure_times)
            .returning(|router| router);
        controller.expect_server_names().return_const(
            ["1".to_string(), "2".to_string()]
                .into_iter()
                .collect::<FxHashSet<_>>(),
        );
        controller
            .expect_routes()
            .return_const(Vec::<RouteMetadata>::new());
        controller
    }

    #[test]
    fn should_configure_router_with_filtering() {
        let bootstrap = ControllerRouterBootstrap::new(vec![Box::new(controller(1))]);
        assert!(bootstrap.bootstrap_router("1", &ServerConfig::default()).is_ok());
    }

    #[test]
    fn should_not_configure_router_with_filtering() {
        let bootstrap = ControllerRouterBootstrap::new(vec![Box::new(controller(0))]);
        assert!(bootstrap.bootstrap_router("3", &ServerConfig::default()).is_ok());
    }

    #[test]
    fn should_configure_router_without_server_names() {
        let mut controller = MockController::new();
        controller
            .expect_configure_router()
            .times(1)
            .returning(|router| router);
        controller
            .expect_server_names()
            .return_const(None::<FxHashSet<String>>);
        controller
            .expect_routes()
            .return_const(Vec::<RouteMetadata>::new());

        let bootstrap = ControllerRouterBootstrap::new(vec![Box::new(controller)]);
        assert!(bootstrap
            .bootstrap_router("any", &ServerConfig::default())
            .is_ok());
    }

    #[test]
    fn should_reject_invalid_param_pattern() {
        let mut controller = MockController::new();
        controller.expect_configure_router().never();
        controller
            .expect_server_names()
            .return_const(None::<FxHashSet<String>>);
        controller.expect_routes().return_const(vec![RouteMetadata {
            method: Method::GET,
            path: "/broken/",
            operation_id: "broken",
            summary: None,
            tags: &[],
            params: vec![Param::query("q").pattern("[unclosed")],
            request_body: None,
        }]);

        let bootstrap = ControllerRouterBootstrap::new(vec![Box::new(controller)]);
        assert!(matches!(
            bootstrap.bootstrap_router("any", &ServerConfig::default()),
            Err(RouterBootstrapError::InvalidPattern {
                path: "/broken/",
                param: "q",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn should_describe_method_not_allowed_as_json() {
        let mut response = StatusCode::METHOD_NOT_ALLOWED.into_response();
        response
            .headers_mut()
            .insert(header::ALLOW, HeaderValue::from_static("GET,HEAD"));

        let response = json_method_not_allowed(response).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET,HEAD");

        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({ "detail": "Method Not Allowed" }));
    }

    #[tokio::test]
    async fn should_keep_other_responses() {
        let response = json_method_not_allowed(StatusCode::OK.into_response()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
