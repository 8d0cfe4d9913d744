use reqwest::{Client, Response};
use serde_json::Value;
use user_guide::application;
use user_guide::config::WebConfig;
use user_guide::controller::registered_controllers;
use user_guide::fxhash::FxHashMap;
use user_guide::server::{serve_all, shutdown_signal, ShutdownSignalSender};

/// Running servers for all configured chapters, stopped when dropped.
pub struct TestServers {
    urls: FxHashMap<String, String>,
    client: Client,
    _shutdown: ShutdownSignalSender,
}

impl TestServers {
    pub fn url(&self, server_name: &str, path: &str) -> String {
        format!("{}{path}", self.urls[server_name])
    }

    pub async fn get(&self, server_name: &str, path: &str) -> Response {
        self.client
            .get(self.url(server_name, path))
            .send()
            .await
            .unwrap()
    }

    pub async fn get_json(&self, server_name: &str, path: &str) -> (u16, Value) {
        into_json(self.get(server_name, path).await).await
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

pub async fn into_json(response: Response) -> (u16, Value) {
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

pub fn start_with(mut config: WebConfig) -> TestServers {
    for server_config in config.servers.values_mut() {
        server_config.listen_address = "127.0.0.1:0".to_string();
    }

    let application = application::create_with(config, registered_controllers());
    let servers = application.bind().unwrap();
    let urls = servers
        .iter()
        .map(|server| {
            (
                server.name().to_string(),
                format!("http://{}", server.local_addr()),
            )
        })
        .collect();

    let (sender, receiver) = shutdown_signal();
    tokio::spawn(serve_all(servers, receiver));

    TestServers {
        urls,
        client: Client::new(),
        _shutdown: sender,
    }
}

/// Starts every chapter server on an ephemeral port.
pub fn start() -> TestServers {
    start_with(WebConfig::default())
}
