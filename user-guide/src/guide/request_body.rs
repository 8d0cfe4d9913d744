//! JSON request bodies, alone and combined with path and query parameters.

use crate::controller;
use crate::error::{ApiResult, ValidateAll};
use crate::extract::{lax_number, lax_optional_number, JsonBody, RequestParams};
use crate::guide::REQUEST_BODY;
use crate::openapi::BodySchema;
use crate::params::{Param, ParamType};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Item sent by clients. Numbers may also be given as numeric strings.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "lax_number")]
    pub price: f64,
    #[serde(default, deserialize_with = "lax_optional_number")]
    pub tax: Option<f64>,
}

impl BodySchema for Item {
    const NAME: &'static str = "Item";

    fn schema() -> Value {
        json!({
            "title": "Item",
            "type": "object",
            "required": ["name", "price"],
            "properties": {
                "name": { "title": "Name", "type": "string" },
                "description": {
                    "title": "Description",
                    "anyOf": [{ "type": "string" }, { "type": "null" }]
                },
                "price": { "title": "Price", "type": "number" },
                "tax": {
                    "title": "Tax",
                    "anyOf": [{ "type": "number" }, { "type": "null" }]
                }
            }
        })
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct PricedItem {
    #[serde(flatten)]
    pub item: Item,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_with_tax: Option<f64>,
}

impl From<Item> for PricedItem {
    fn from(item: Item) -> Self {
        Self {
            price_with_tax: item.tax.map(|tax| item.price + tax),
            item,
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct UpdatedItem {
    pub item_id: i64,
    #[serde(flatten)]
    pub item: Item,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
}

const ITEM_ID: Param = Param::path("item_id", ParamType::Integer);
const Q: Param = Param::query("q");

#[derive(Default)]
pub struct RequestBodyController;

#[controller(server_names = [REQUEST_BODY])]
impl RequestBodyController {
    #[post("/items/", body = Item)]
    pub async fn create_item(JsonBody(item): JsonBody<Item>) -> ApiResult<Json<Item>> {
        Ok(Json(item?))
    }

    #[post("/item_2/", body = Item)]
    pub async fn create_item_2(JsonBody(item): JsonBody<Item>) -> ApiResult<Json<PricedItem>> {
        Ok(Json(item?.into()))
    }

    #[put("/items_1/:item_id", params = [ITEM_ID], body = Item)]
    pub async fn update_item_1(
        params: RequestParams,
        JsonBody(item): JsonBody<Item>,
    ) -> ApiResult<Json<UpdatedItem>> {
        let (item_id, item) = (ITEM_ID.integer(&params), item).validate_all()?;
        Ok(Json(UpdatedItem {
            item_id,
            item,
            q: None,
        }))
    }

    #[put("/items_2/:item_id", params = [ITEM_ID, Q], body = Item)]
    pub async fn update_item_2(
        params: RequestParams,
        JsonBody(item): JsonBody<Item>,
    ) -> ApiResult<Json<UpdatedItem>> {
        let (item_id, q, item) = (
            ITEM_ID.integer(&params),
            Q.optional_string(&params),
            item,
        )
            .validate_all()?;

        Ok(Json(UpdatedItem {
            item_id,
            item,
            q: q.filter(|q| !q.is_empty()),
        }))
    }
}
