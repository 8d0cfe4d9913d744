//! Application and web server configuration.
//!
//! By default, the config is created with opinionated default values, which can then be overwritten
//! by values from the `user-guide.json` file. [ApplicationConfig] can additionally be overwritten
//! by environment variables prefixed with `USER_GUIDE_`, while [WebConfig] is read from the `web`
//! key of the same file.

use crate::guide::{
    FIRST_STEPS, PATH_PARAMETERS, QUERY_PARAMETERS, REQUEST_BODY, STRING_VALIDATIONS,
};
use config::{Config, ConfigError, Environment, File};
use fxhash::FxHashMap;
use serde::Deserialize;

const CONFIG_ENV_PREFIX: &str = "USER_GUIDE";

/// Name of the default config file.
pub const CONFIG_FILE: &str = "user-guide.json";

/// Name of the server used when no explicit server list is configured.
pub const DEFAULT_SERVER_NAME: &str = "default";

const DEFAULT_TITLE: &str = "Tutorial - User Guide";
const FASTAPI_TITLE: &str = "FastAPI Tutorial - User Guide";

/// Application-wide configuration.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct ApplicationConfig {
    /// Should a default tracing logger be installed in the scope of the application.
    pub install_tracing_logger: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            install_tracing_logger: true,
        }
    }
}

impl From<OptionalApplicationConfig> for ApplicationConfig {
    fn from(value: OptionalApplicationConfig) -> Self {
        let default = Self::default();
        Self {
            install_tracing_logger: value
                .install_tracing_logger
                .unwrap_or(default.install_tracing_logger),
        }
    }
}

impl ApplicationConfig {
    pub fn init_from_environment() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(CONFIG_ENV_PREFIX))
            .build()
            .and_then(|config| config.try_deserialize::<OptionalApplicationConfig>())
            .map(|config| config.into())
    }
}

/// Server configuration.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    /// Address on which to listen.
    pub listen_address: String,
    /// Title of the generated API document.
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: "127.0.0.1:8000".to_string(),
            title: default_title(),
            description: None,
            version: default_version(),
        }
    }
}

impl ServerConfig {
    fn local(port: u16) -> Self {
        Self {
            listen_address: format!("127.0.0.1:{port}"),
            ..Default::default()
        }
    }
}

/// Web configuration.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct WebConfig {
    /// Map from server name to their config. Every guide chapter runs on its own server by
    /// default, so equal paths in different chapters do not collide.
    pub servers: FxHashMap<String, ServerConfig>,
}

impl Default for WebConfig {
    fn default() -> Self {
        let mut first_steps = ServerConfig::local(8000);
        first_steps.description = Some("First Steps".to_string());

        let mut query_parameters = ServerConfig::local(8002);
        query_parameters.title = FASTAPI_TITLE.to_string();

        let mut string_validations = ServerConfig::local(8004);
        string_validations.title = FASTAPI_TITLE.to_string();

        Self {
            servers: [
                (FIRST_STEPS, first_steps),
                (PATH_PARAMETERS, ServerConfig::local(8001)),
                (QUERY_PARAMETERS, query_parameters),
                (REQUEST_BODY, ServerConfig::local(8003)),
                (STRING_VALIDATIONS, string_validations),
            ]
            .into_iter()
            .map(|(name, config)| (name.to_string(), config))
            .collect(),
        }
    }
}

impl From<OptionalWebConfig> for WebConfig {
    fn from(value: OptionalWebConfig) -> Self {
        let default = Self::default();
        Self {
            servers: value.servers.unwrap_or(default.servers),
        }
    }
}

impl WebConfig {
    pub fn init_from_config() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .build()
            .and_then(|config| config.try_deserialize::<OptionalWebConfigWrapper>())
            .map(|config| config.web.map(|config| config.into()).unwrap_or_default())
    }

    /// Config with a single server named [DEFAULT_SERVER_NAME].
    pub fn single(server_config: ServerConfig) -> Self {
        Self {
            servers: [(DEFAULT_SERVER_NAME.to_string(), server_config)]
                .into_iter()
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct OptionalApplicationConfig {
    install_tracing_logger: Option<bool>,
}

#[derive(Deserialize)]
struct OptionalWebConfig {
    servers: Option<FxHashMap<String, ServerConfig>>,
}

#[derive(Deserialize)]
struct OptionalWebConfigWrapper {
    web: Option<OptionalWebConfig>,
}
