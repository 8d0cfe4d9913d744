//! Query parameter constraints: lengths, patterns, lists, aliases, documentation-only metadata
//! and custom validators.

use crate::controller;
use crate::error::ApiResult;
use crate::extract::RequestParams;
use crate::guide::STRING_VALIDATIONS;
use crate::params::{Param, ParamType};
use axum::Json;
use rand::seq::IndexedRandom;
use serde::Serialize;
use serde_json::{json, Value};

const TAG: &str = "Query Parameters & String Validations";

const QUERY_TITLE: &str = "Query string";
const QUERY_DESCRIPTION: &str =
    "Query string for the items to search in the database that have a good match";

pub const BOOKS: [(&str, &str); 3] = [
    (
        "isbn-9781529046137",
        "The Hitchhiker's Guide to the Galaxy",
    ),
    ("imdb-tt0371724", "The Hitchhiker's Guide to the Galaxy"),
    (
        "isbn-9781439512982",
        "Isaac Asimov: The Complete Stories, Vol. 2",
    ),
];

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ItemId {
    pub item_id: &'static str,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct ItemsResponse {
    pub items: [ItemId; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
}

impl ItemsResponse {
    fn new(q: Option<String>) -> Self {
        Self {
            items: [ItemId { item_id: "Foo" }, ItemId { item_id: "Bar" }],
            q: q.filter(|q| !q.is_empty()),
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct BookResponse {
    pub id: String,
    pub name: Option<&'static str>,
}

fn check_valid_id(id: &str) -> Result<(), String> {
    if id.starts_with("isbn-") || id.starts_with("imdb-") {
        Ok(())
    } else {
        Err(r#"Invalid ID format, it must start with "isbn-" or "imdb-""#.to_string())
    }
}

const Q: Param = Param::query("q");
const Q_MAX_50: Param = Q.max_length(50);
const Q_3_TO_50: Param = Q.min_length(3).max_length(50);
const Q_FIXED: Param = Q_3_TO_50.pattern("^fixedquery$");
const Q_MIN_3: Param = Q.min_length(3);
const Q_REQUIRED: Param = Q_MIN_3.required();
const Q_LIST: Param = Q.of_type(ParamType::StringList);
const Q_DESCRIBED: Param = Q_MIN_3.title(QUERY_TITLE).description(QUERY_DESCRIPTION);
const Q_ALIASED: Param = Q.alias("item-query");
const Q_DEPRECATED: Param = Q_FIXED
    .alias("item-query")
    .title(QUERY_TITLE)
    .description(QUERY_DESCRIPTION)
    .deprecated();
const HIDDEN_QUERY: Param = Param::query("hidden_query").hidden();
const BOOK_ID: Param = Param::query("id").validator(check_valid_id);

#[derive(Default)]
pub struct StringValidationsController;

#[controller(server_names = [STRING_VALIDATIONS], tags = [TAG])]
impl StringValidationsController {
    #[get("/items_1/", summary = "Optional query parameter", params = [Q])]
    pub async fn read_items_1(params: RequestParams) -> ApiResult<Json<ItemsResponse>> {
        Ok(Json(ItemsResponse::new(Q.optional_string(&params)?)))
    }

    #[get(
        "/items_2/",
        summary = "Optional query parameter with additional validation",
        params = [Q_MAX_50]
    )]
    pub async fn read_items_2(params: RequestParams) -> ApiResult<Json<ItemsResponse>> {
        Ok(Json(ItemsResponse::new(Q_MAX_50.optional_string(&params)?)))
    }

    #[get(
        "/items_3/",
        summary = "Defaults with additional validation",
        params = [Q_MAX_50]
    )]
    pub async fn read_items_3(params: RequestParams) -> ApiResult<Json<ItemsResponse>> {
        Ok(Json(ItemsResponse::new(Q_MAX_50.optional_string(&params)?)))
    }

    #[get(
        "/items_4/",
        summary = "Add more validations, second parameter",
        params = [Q_3_TO_50]
    )]
    pub async fn read_items_4(params: RequestParams) -> ApiResult<Json<ItemsResponse>> {
        Ok(Json(ItemsResponse::new(Q_3_TO_50.optional_string(&params)?)))
    }

    #[get(
        "/items_5/",
        summary = "Add more validations, regex pattern",
        params = [Q_FIXED]
    )]
    pub async fn read_items_5(params: RequestParams) -> ApiResult<Json<ItemsResponse>> {
        Ok(Json(ItemsResponse::new(Q_FIXED.optional_string(&params)?)))
    }

    #[get("/items_6/", summary = "Non None default values", params = [Q_MIN_3])]
    pub async fn read_items_6(params: RequestParams) -> ApiResult<Json<ItemsResponse>> {
        let q = Q_MIN_3
            .optional_string(&params)?
            .unwrap_or_else(|| "fixedquery".to_string());
        Ok(Json(ItemsResponse::new(Some(q))))
    }

    #[get(
        "/items_7/",
        summary = "Required value when using Query",
        params = [Q_REQUIRED]
    )]
    pub async fn read_items_7(params: RequestParams) -> ApiResult<Json<ItemsResponse>> {
        Ok(Json(ItemsResponse::new(Some(Q_REQUIRED.string(&params)?))))
    }

    #[get("/items_8/", summary = "Required can be None", params = [Q_REQUIRED])]
    pub async fn read_items_8(params: RequestParams) -> ApiResult<Json<ItemsResponse>> {
        Ok(Json(ItemsResponse::new(Some(Q_REQUIRED.string(&params)?))))
    }

    #[get(
        "/items_9/",
        summary = "Query parameter list / multiple values",
        params = [Q_LIST]
    )]
    pub async fn read_items_9(params: RequestParams) -> ApiResult<Json<Value>> {
        let q = Q_LIST.optional_list(&params)?;
        Ok(Json(json!({ "q": q })))
    }

    #[get(
        "/items_10/",
        summary = "Query parameter list / multiple values with defaults",
        params = [Q_LIST]
    )]
    pub async fn read_items_10(params: RequestParams) -> ApiResult<Json<Value>> {
        let q = Q_LIST
            .optional_list(&params)?
            .unwrap_or_else(|| vec!["foo".to_string(), "bar".to_string()]);
        Ok(Json(json!({ "q": q })))
    }

    #[get("/items_11/", summary = "Add a title & description", params = [Q_DESCRIBED])]
    pub async fn read_items_11(params: RequestParams) -> ApiResult<Json<ItemsResponse>> {
        Ok(Json(ItemsResponse::new(Q_DESCRIBED.optional_string(&params)?)))
    }

    #[get(
        "/items_12/",
        summary = "Alias parameters when the wanted name is not a valid identifier",
        params = [Q_ALIASED]
    )]
    pub async fn read_items_12(params: RequestParams) -> ApiResult<Json<ItemsResponse>> {
        Ok(Json(ItemsResponse::new(Q_ALIASED.optional_string(&params)?)))
    }

    #[get(
        "/items_13/",
        summary = "Deprecating parameters when they are going to be changed or removed",
        params = [Q_DEPRECATED]
    )]
    pub async fn read_items_13(params: RequestParams) -> ApiResult<Json<ItemsResponse>> {
        Ok(Json(ItemsResponse::new(
            Q_DEPRECATED.optional_string(&params)?,
        )))
    }

    #[get(
        "/items_14/",
        summary = "Exclude parameters from OpenAPI",
        params = [HIDDEN_QUERY]
    )]
    pub async fn read_items_14(params: RequestParams) -> ApiResult<Json<Value>> {
        let hidden_query = HIDDEN_QUERY
            .optional_string(&params)?
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "Not found".to_string());
        Ok(Json(json!({ "hidden_query": hidden_query })))
    }

    /// Looks up a book by id, or picks a random one when no id is given.
    #[get("/items_15/", summary = "Custom Validation", params = [BOOK_ID])]
    pub async fn read_items_15(params: RequestParams) -> ApiResult<Json<BookResponse>> {
        let (id, name) = match BOOK_ID.optional_string(&params)? {
            Some(id) => {
                let name = BOOKS
                    .iter()
                    .find(|(book_id, _)| *book_id == id)
                    .map(|(_, name)| *name);
                (id, name)
            }
            None => BOOKS
                .choose(&mut rand::rng())
                .map(|(id, name)| (id.to_string(), Some(*name)))
                .unwrap_or_default(),
        };

        Ok(Json(BookResponse { id, name }))
    }
}
