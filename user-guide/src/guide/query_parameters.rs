//! Query parameters with defaults, optional values, type conversion and required values.

use crate::controller;
use crate::error::{ApiResult, ValidateAll};
use crate::extract::RequestParams;
use crate::guide::QUERY_PARAMETERS;
use crate::params::{Param, ParamType};
use axum::Json;
use serde::Serialize;

const TAG: &str = "Query Parameters";
const LONG_DESCRIPTION: &str = "This is an amazing item that has a long description";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct FakeItem {
    pub item_name: &'static str,
}

pub const FAKE_ITEMS_DB: [FakeItem; 3] = [
    FakeItem { item_name: "Foo" },
    FakeItem { item_name: "Bar" },
    FakeItem { item_name: "Baz" },
];

/// Item description assembled from path and query parameters.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct ItemView {
    pub item_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needy: Option<String>,
}

impl ItemView {
    fn new(item_id: String) -> Self {
        Self {
            item_id,
            ..Default::default()
        }
    }

    // empty queries are treated as absent
    fn with_query(mut self, q: Option<String>) -> Self {
        self.q = q.filter(|q| !q.is_empty());
        self
    }

    fn with_description(mut self, short: bool) -> Self {
        if !short {
            self.description = Some(LONG_DESCRIPTION);
        }
        self
    }
}

/// Slice bounds with sequence semantics: negative values count from the end, and both bounds
/// are clamped to the sequence.
fn window(len: usize, skip: i64, limit: i64) -> std::ops::Range<usize> {
    let len = len as i64;
    let clamp = |index: i64| {
        if index < 0 {
            (index + len).max(0)
        } else {
            index.min(len)
        }
    };

    let start = clamp(skip);
    let end = clamp(skip.saturating_add(limit)).max(start);
    start as usize..end as usize
}

const SKIP: Param = Param::query("skip").of_type(ParamType::Integer);
const LIMIT: Param = Param::query("limit").of_type(ParamType::Integer);
const ITEM_ID: Param = Param::path("item_id", ParamType::String);
const USER_ID: Param = Param::path("user_id", ParamType::Integer);
const Q: Param = Param::query("q");
const SHORT: Param = Param::query("short").of_type(ParamType::Boolean);
const NEEDY: Param = Param::query("needy").required();

#[derive(Default)]
pub struct QueryParametersController;

#[controller(server_names = [QUERY_PARAMETERS], tags = [TAG])]
impl QueryParametersController {
    #[get(
        "/items_1/",
        summary = "Query parameters with default values",
        params = [SKIP, LIMIT]
    )]
    pub async fn read_item_1(params: RequestParams) -> ApiResult<Json<Vec<FakeItem>>> {
        let (skip, limit) = (
            SKIP.optional_integer(&params),
            LIMIT.optional_integer(&params),
        )
            .validate_all()?;
        let (skip, limit) = (skip.unwrap_or(0), limit.unwrap_or(10));
        Ok(Json(FAKE_ITEMS_DB[window(FAKE_ITEMS_DB.len(), skip, limit)].to_vec()))
    }

    #[get(
        "/items_2/:item_id",
        summary = "Query parameter with optional values",
        params = [ITEM_ID, Q]
    )]
    pub async fn read_item_2(params: RequestParams) -> ApiResult<Json<ItemView>> {
        let (item_id, q) = (ITEM_ID.string(&params), Q.optional_string(&params)).validate_all()?;
        Ok(Json(ItemView::new(item_id).with_query(q)))
    }

    #[get(
        "/items_3/:item_id",
        summary = "Query parameter with str and bool with type conversion",
        params = [ITEM_ID, Q, SHORT]
    )]
    pub async fn read_items_3(params: RequestParams) -> ApiResult<Json<ItemView>> {
        let (item_id, q, short) = (
            ITEM_ID.string(&params),
            Q.optional_string(&params),
            SHORT.optional_boolean(&params),
        )
            .validate_all()?;

        Ok(Json(
            ItemView::new(item_id)
                .with_query(q)
                .with_description(short.unwrap_or(false)),
        ))
    }

    #[get(
        "/users/:user_id/items/:item_id",
        summary = "Multiple path and query parameters declared at the same time",
        params = [USER_ID, ITEM_ID, Q, SHORT]
    )]
    pub async fn read_user_item_1(params: RequestParams) -> ApiResult<Json<ItemView>> {
        let (user_id, item_id, q, short) = (
            USER_ID.integer(&params),
            ITEM_ID.string(&params),
            Q.optional_string(&params),
            SHORT.optional_boolean(&params),
        )
            .validate_all()?;

        let mut item = ItemView::new(item_id)
            .with_query(q)
            .with_description(short.unwrap_or(false));
        item.owner_id = Some(user_id);
        Ok(Json(item))
    }

    #[get(
        "/items_4/:item_id",
        summary = "Required query parameter (item_id and needy have no defaults)",
        params = [ITEM_ID, NEEDY]
    )]
    pub async fn read_user_item_2(params: RequestParams) -> ApiResult<Json<ItemView>> {
        let (item_id, needy) = (ITEM_ID.string(&params), NEEDY.string(&params)).validate_all()?;

        let mut item = ItemView::new(item_id);
        item.needy = Some(needy);
        Ok(Json(item))
    }
}
