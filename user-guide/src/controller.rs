//! Functionality related to defining [Controller]s.
//!
//! Controllers are usually not implemented by hand. Marking an `impl` block with
//! [controller](user_guide_derive::controller) generates the implementation from route
//! attributes and registers the controller for discovery:
//!
//! ```no_run
//! use user_guide::controller;
//!
//! #[derive(Default)]
//! struct HelloController;
//!
//! #[controller(server_names = ["default"], tags = ["Greetings"])]
//! impl HelloController {
//!     #[get("/", summary = "Say hello")]
//!     async fn hello_world() -> &'static str {
//!         "Hello world!"
//!     }
//! }
//! ```

use crate::openapi::BodySchemaFn;
use crate::params::Param;
use axum::http::Method;
use axum::Router;
use fxhash::FxHashSet;
#[cfg(test)]
use mockall::automock;

/// Description of a single route, used to document the server.
#[derive(Clone, Debug)]
pub struct RouteMetadata {
    pub method: Method,
    /// Path template in router syntax, e.g. `/items/:item_id`.
    pub path: &'static str,
    pub operation_id: &'static str,
    pub summary: Option<&'static str>,
    pub tags: &'static [&'static str],
    pub params: Vec<Param>,
    pub request_body: Option<BodySchemaFn>,
}

/// A collection of web [handlers](axum::handler::Handler) served together on one or more
/// servers.
#[cfg_attr(test, automock)]
pub trait Controller {
    /// Names of servers this controller should be attached to. `None` means all servers.
    fn server_names(&self) -> Option<FxHashSet<String>>;

    /// Routes served by this controller.
    fn routes(&self) -> Vec<RouteMetadata>;

    /// Adds controller routes to the given router.
    fn configure_router(&self, router: Router) -> Router;
}

pub type ControllerPtr = Box<dyn Controller + Send + Sync>;

/// Link-time registration of a controller constructor.
pub struct ControllerRegistration {
    constructor: fn() -> ControllerPtr,
}

impl ControllerRegistration {
    pub const fn new(constructor: fn() -> ControllerPtr) -> Self {
        Self { constructor }
    }

    pub fn create(&self) -> ControllerPtr {
        (self.constructor)()
    }
}

inventory::collect!(ControllerRegistration);

/// Creates an instance of every registered controller.
pub fn registered_controllers() -> Vec<ControllerPtr> {
    inventory::iter::<ControllerRegistration>
        .into_iter()
        .map(ControllerRegistration::create)
        .collect()
}
