//! Typed path parameters: integers, strings, closed sets and whole sub-paths.

use crate::controller;
use crate::error::ApiResult;
use crate::extract::RequestParams;
use crate::guide::PATH_PARAMETERS;
use crate::params::{Param, ParamType};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use std::str::FromStr;

/// Models which can be requested by name.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelName {
    Alexnet,
    Resnet,
    Lenet,
}

impl ModelName {
    pub const VALUES: &'static [&'static str] = &["alexnet", "resnet", "lenet"];

    pub fn message(&self) -> &'static str {
        match self {
            ModelName::Alexnet => "Deep Learning FTW!",
            ModelName::Lenet => "LeCNN all the images",
            ModelName::Resnet => "Have some residuals",
        }
    }
}

impl FromStr for ModelName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alexnet" => Ok(ModelName::Alexnet),
            "resnet" => Ok(ModelName::Resnet),
            "lenet" => Ok(ModelName::Lenet),
            _ => Err(()),
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct ModelResponse {
    pub model_name: ModelName,
    pub message: &'static str,
}

const ITEM_ID: Param = Param::path("item_id", ParamType::Integer);
const USER_ID: Param = Param::path("user_id", ParamType::String);
const MODEL_NAME: Param = Param::path("model_name", ParamType::Enumeration(ModelName::VALUES));
const FILE_PATH: Param = Param::path("file_path", ParamType::String);

#[derive(Default)]
pub struct PathParametersController;

#[controller(server_names = [PATH_PARAMETERS])]
impl PathParametersController {
    #[get("/items/:item_id", params = [ITEM_ID])]
    pub async fn read_item(params: RequestParams) -> ApiResult<Json<Value>> {
        let item_id = ITEM_ID.integer(&params)?;
        Ok(Json(json!({ "item_id": item_id })))
    }

    // static paths take precedence over templates, regardless of declaration order
    #[get("/users/me")]
    pub async fn read_user_me() -> Json<Value> {
        Json(json!({ "user_id": "the current user" }))
    }

    #[get("/users/:user_id", params = [USER_ID])]
    pub async fn read_user(params: RequestParams) -> ApiResult<Json<Value>> {
        let user_id = USER_ID.string(&params)?;
        Ok(Json(json!({ "user_id": user_id })))
    }

    #[get("/models/:model_name", params = [MODEL_NAME])]
    pub async fn get_model(params: RequestParams) -> ApiResult<Json<ModelResponse>> {
        let model_name: ModelName = MODEL_NAME.choice(&params)?;
        Ok(Json(ModelResponse {
            model_name,
            message: model_name.message(),
        }))
    }

    /// The parameter captures the rest of the path, including slashes.
    #[get("/files/*file_path", params = [FILE_PATH])]
    pub async fn read_file(params: RequestParams) -> ApiResult<Json<Value>> {
        let file_path = FILE_PATH.string(&params)?;
        Ok(Json(json!({ "file_path": file_path })))
    }

    /// Catch-all segments never match an empty rest of the path.
    #[get("/files/")]
    pub async fn read_root_file() -> Json<Value> {
        Json(json!({ "file_path": "" }))
    }
}
