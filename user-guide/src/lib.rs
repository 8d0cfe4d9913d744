//! Routing, parameter declaration and validation guide built on axum.
//!
//! Every chapter of the guide is a [*Controller*](controller::Controller) - a collection of
//! handlers declared with the [controller] attribute and served on its own named server. Handler
//! inputs are declared as [Params](params::Param), which both validate requests and document
//! them in the `/openapi.json` document of each server.
//!
//! ### Simple usage example
//!
//! ```no_run
//! use user_guide::application;
//!
//! #[tokio::main]
//! async fn main() {
//!     let application = application::create_default().expect("unable to create application");
//!
//!     // every chapter listens on its own port, see WebConfig
//!     application.run().await.expect("error running application");
//! }
//! ```

extern crate self as user_guide;

pub mod application;
pub mod config;
pub mod controller;
pub mod error;
pub mod extract;
pub mod guide;
pub mod openapi;
pub mod params;
pub mod router;
pub mod server;

pub use axum;
pub use fxhash;
pub use inventory;
pub use user_guide_derive::controller;
