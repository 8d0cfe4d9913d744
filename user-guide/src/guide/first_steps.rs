use crate::controller;
use crate::guide::FIRST_STEPS;
use axum::Json;
use serde_json::{json, Value};

#[derive(Default)]
pub struct FirstStepsController;

#[controller(server_names = [FIRST_STEPS])]
impl FirstStepsController {
    #[get("/", summary = "Hello World example")]
    pub async fn root() -> Json<Value> {
        Json(json!({ "message": "Hello World" }))
    }
}
