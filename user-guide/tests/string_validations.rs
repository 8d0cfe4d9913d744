mod common;

use serde_json::json;
use user_guide::guide::STRING_VALIDATIONS;

#[tokio::test]
async fn should_validate_lengths_and_patterns() {
    let servers = common::start();

    let (status, body) = servers
        .get_json(STRING_VALIDATIONS, "/items_5/?q=fixedquery")
        .await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({ "items": [{ "item_id": "Foo" }, { "item_id": "Bar" }], "q": "fixedquery" })
    );

    let (status, body) = servers.get_json(STRING_VALIDATIONS, "/items_4/?q=ab").await;
    assert_eq!(status, 422);
    assert_eq!(body["detail"][0]["type"], json!("string_too_short"));
    assert_eq!(body["detail"][0]["ctx"], json!({ "min_length": 3 }));

    let (status, body) = servers.get_json(STRING_VALIDATIONS, "/items_5/?q=nope").await;
    assert_eq!(status, 422);
    assert_eq!(body["detail"][0]["type"], json!("string_pattern_mismatch"));
}

#[tokio::test]
async fn should_read_query_lists() {
    let servers = common::start();

    let (_, body) = servers
        .get_json(STRING_VALIDATIONS, "/items_9/?q=foo&q=bar")
        .await;
    assert_eq!(body, json!({ "q": ["foo", "bar"] }));

    let (_, body) = servers.get_json(STRING_VALIDATIONS, "/items_10/").await;
    assert_eq!(body, json!({ "q": ["foo", "bar"] }));
}

#[tokio::test]
async fn should_read_alias() {
    let servers = common::start();

    let (_, body) = servers
        .get_json(STRING_VALIDATIONS, "/items_12/?item-query=foo")
        .await;
    assert_eq!(body["q"], json!("foo"));
}

#[tokio::test]
async fn should_answer_hidden_query() {
    let servers = common::start();

    let (_, body) = servers.get_json(STRING_VALIDATIONS, "/items_14/").await;
    assert_eq!(body, json!({ "hidden_query": "Not found" }));
}

#[tokio::test]
async fn should_validate_book_ids() {
    let servers = common::start();

    let (status, body) = servers
        .get_json(STRING_VALIDATIONS, "/items_15/?id=imdb-tt0371724")
        .await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({ "id": "imdb-tt0371724", "name": "The Hitchhiker's Guide to the Galaxy" })
    );

    let (status, body) = servers
        .get_json(STRING_VALIDATIONS, "/items_15/?id=tt0371724")
        .await;
    assert_eq!(status, 422);
    assert_eq!(body["detail"][0]["type"], json!("value_error"));
    assert_eq!(body["detail"][0]["loc"], json!(["query", "id"]));

    let (status, body) = servers.get_json(STRING_VALIDATIONS, "/items_15/").await;
    assert_eq!(status, 200);
    assert!(body["name"].is_string());
}
