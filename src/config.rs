use crate::error::BootstrapError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

pub const DEFAULT_APP_NAME: &str = "[DEFAULT]";
pub const DEFAULT_DATABASE_ID: &str = "(default)";
pub const DEFAULT_CREDENTIAL_PATH: &str = "serviceAccountKey.json";

/// Environment variable the Google SDKs read to target a local emulator.
pub const FIRESTORE_EMULATOR_HOST_ENV: &str = "FIRESTORE_EMULATOR_HOST";

pub const ENV_PREFIX: &str = "FIRESTORE_BOOTSTRAP_";

pub const FIRESTORE_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/datastore",
    "https://www.googleapis.com/auth/cloud-platform",
];

pub static GOOGLE_TOKEN_URI: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://oauth2.googleapis.com/token").expect("valid Google token URI")
});

pub static FIRESTORE_BASE_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://firestore.googleapis.com/v1/").expect("valid Firestore base URL")
});

/// Process configuration for the bootstrap binary.
///
/// Layered as defaults, then `config.toml`, then `FIRESTORE_BOOTSTRAP_*`
/// environment variables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub credential_path: PathBuf,
    pub app_name: String,
    pub database_id: String,
    pub firestore_url: Url,
    pub emulator_host: Option<String>,
    pub proxy: Option<Url>,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
    pub loglevel: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credential_path: PathBuf::from(DEFAULT_CREDENTIAL_PATH),
            app_name: DEFAULT_APP_NAME.to_string(),
            database_id: DEFAULT_DATABASE_ID.to_string(),
            firestore_url: FIRESTORE_BASE_URL.clone(),
            emulator_host: None,
            proxy: None,
            connect_timeout_secs: 5,
            timeout_secs: 15,
            loglevel: "info".to_string(),
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Extract the configuration from the default provider chain.
    ///
    /// `FIRESTORE_EMULATOR_HOST` fills `emulator_host` when the prefixed key
    /// is not set, matching what the Google client libraries do.
    pub fn load() -> Result<Self, BootstrapError> {
        let mut cfg: Config = Self::figment().extract()?;
        if cfg.emulator_host.is_none() {
            cfg.emulator_host = emulator_host_from_env();
        }
        Ok(cfg)
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            database_id: self.database_id.clone(),
            firestore_url: self.firestore_url.clone(),
            emulator_host: self.emulator_host.clone(),
            proxy: self.proxy.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            ..ClientOptions::default()
        }
    }
}

/// Knobs for the client handle a bootstrapper produces.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    pub database_id: String,
    pub firestore_url: Url,
    pub emulator_host: Option<String>,
    pub proxy: Option<Url>,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            database_id: DEFAULT_DATABASE_ID.to_string(),
            firestore_url: FIRESTORE_BASE_URL.clone(),
            emulator_host: None,
            proxy: None,
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(15),
            user_agent: concat!("firestore-bootstrap/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Value of `FIRESTORE_EMULATOR_HOST`, ignoring an empty setting.
pub fn emulator_host_from_env() -> Option<String> {
    std::env::var(FIRESTORE_EMULATOR_HOST_ENV)
        .ok()
        .filter(|h| !h.trim().is_empty())
}

impl ClientOptions {
    /// Defaults plus the emulator host the Google SDKs pick up from the
    /// environment.
    pub fn from_env() -> Self {
        Self {
            emulator_host: emulator_host_from_env(),
            ..Self::default()
        }
    }

    /// Base URL requests are resolved against. The emulator speaks plain HTTP.
    pub fn base_url(&self) -> Result<Url, BootstrapError> {
        match self.emulator_host.as_deref() {
            Some(host) => Ok(Url::parse(&format!("http://{}/v1/", host.trim_end_matches('/')))?),
            None => Ok(self.firestore_url.clone()),
        }
    }

    pub fn build_http_client(&self) -> Result<reqwest::Client, BootstrapError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(self.user_agent.clone())
            .connect_timeout(self.connect_timeout)
            .timeout(self.timeout);
        if let Some(proxy_url) = self.proxy.as_ref() {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
        }
        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_point_at_production_firestore() {
        let cfg = Config::default();
        assert_eq!(cfg.credential_path, PathBuf::from("serviceAccountKey.json"));
        assert_eq!(cfg.app_name, "[DEFAULT]");
        assert_eq!(
            cfg.client_options().base_url().unwrap().as_str(),
            "https://firestore.googleapis.com/v1/"
        );
    }

    #[test]
    fn toml_and_env_layers_override_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                credential_path = "keys/prod.json"
                database_id = "orders"
                timeout_secs = 30
                "#,
            )?;
            jail.set_env("FIRESTORE_BOOTSTRAP_DATABASE_ID", "analytics");
            jail.set_env("FIRESTORE_BOOTSTRAP_LOGLEVEL", "debug");

            let cfg: Config = Config::figment().extract()?;
            assert_eq!(cfg.credential_path, PathBuf::from("keys/prod.json"));
            assert_eq!(cfg.database_id, "analytics");
            assert_eq!(cfg.timeout_secs, 30);
            assert_eq!(cfg.loglevel, "debug");
            assert_eq!(cfg.client_options().timeout, Duration::from_secs(30));
            Ok(())
        });
    }

    #[test]
    fn sdk_emulator_variable_fills_emulator_host() {
        Jail::expect_with(|jail| {
            jail.set_env("FIRESTORE_EMULATOR_HOST", "localhost:8080");
            let cfg = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(cfg.emulator_host.as_deref(), Some("localhost:8080"));

            jail.set_env("FIRESTORE_BOOTSTRAP_EMULATOR_HOST", "127.0.0.1:9090");
            let cfg = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(cfg.emulator_host.as_deref(), Some("127.0.0.1:9090"));
            Ok(())
        });
    }

    #[test]
    fn client_options_from_env_pick_up_emulator() {
        Jail::expect_with(|jail| {
            jail.set_env("FIRESTORE_EMULATOR_HOST", "localhost:8080");
            let opts = ClientOptions::from_env();
            assert_eq!(opts.emulator_host.as_deref(), Some("localhost:8080"));
            assert_eq!(opts.base_url().unwrap().as_str(), "http://localhost:8080/v1/");
            Ok(())
        });
    }

    #[test]
    fn emulator_host_switches_base_url() {
        let opts = ClientOptions {
            emulator_host: Some("localhost:8080/".to_string()),
            ..ClientOptions::default()
        };
        assert_eq!(opts.base_url().unwrap().as_str(), "http://localhost:8080/v1/");
    }
}
