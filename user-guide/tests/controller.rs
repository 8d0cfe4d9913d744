mod common;

use serde_json::json;
use user_guide::config::{ServerConfig, WebConfig};
use user_guide::controller;
use user_guide::error::ApiResult;
use user_guide::extract::RequestParams;
use user_guide::params::{Param, ParamType};

const USER_ID: Param = Param::path("user_id", ParamType::Integer);

#[derive(Default)]
struct TestController;

#[controller(path = "/test", server_names = ["test"])]
impl TestController {
    #[get("/:user_id", params = [USER_ID])]
    async fn hello_world(params: RequestParams) -> ApiResult<&'static str> {
        USER_ID.integer(&params)?;
        Ok("Hello world!")
    }

    #[post("/")]
    async fn post_something() -> &'static str {
        "Posted!"
    }
}

#[tokio::test]
async fn should_register_controller() {
    let mut config = WebConfig::default();
    config.servers = [("test".to_string(), ServerConfig::default())]
        .into_iter()
        .collect();
    let servers = common::start_with(config);

    let response = servers.get("test", "/test/5").await;
    assert_eq!(response.text().await.unwrap(), "Hello world!");

    let response = servers
        .client()
        .post(servers.url("test", "/test/"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.text().await.unwrap(), "Posted!");

    let (status, _) = servers.get_json("test", "/test/abc").await;
    assert_eq!(status, 422);

    // guide chapters are attached to their own servers only
    let (status, body) = servers.get_json("test", "/").await;
    assert_eq!(status, 404);
    assert_eq!(body, json!({ "detail": "Not Found" }));
}
