use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";

#[derive(Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub api_base_url: String,
    pub identity_url: String,
    pub token_url: String,
    pub identity_api_key: Option<String>,
    pub image_fetch_parallel: usize,
}

pub struct AppConfigOverrides {
    pub log_level: Option<String>,
    pub api_base_url: Option<String>,
    pub identity_api_key: Option<String>,
    pub image_fetch_parallel: Option<usize>,
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".aiguardian")
}

impl AppConfig {
    pub fn load_from(path: Option<PathBuf>) -> Self {
        let mut builder = config::Config::builder();
        let path = match path {
            Some(p) => p,
            None => config_dir().join("config"),
        };
        // The config file has no extension, so the format must be forced.
        builder = builder.add_source(
            config::File::from(path)
                .format(config::FileFormat::Toml)
                .required(false),
        );
        let cfg = builder.build().unwrap_or_default();

        let log_level = cfg
            .get_string("log_level")
            .unwrap_or_else(|_| "info".to_string());
        let api_base_url = cfg
            .get_string("api_base_url")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let identity_url = cfg
            .get_string("identity_url")
            .unwrap_or_else(|_| DEFAULT_IDENTITY_URL.to_string());
        let token_url = cfg
            .get_string("token_url")
            .unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string());
        let identity_api_key = cfg.get_string("identity_api_key").ok();
        let image_fetch_parallel = cfg.get_int("image_fetch_parallel").unwrap_or(4) as usize;

        Self {
            log_level,
            api_base_url,
            identity_url,
            token_url,
            identity_api_key,
            image_fetch_parallel,
        }
    }

    pub fn apply_overrides(mut self, ov: &AppConfigOverrides) -> Self {
        if let Some(l) = &ov.log_level {
            self.log_level = l.clone();
        }
        if let Some(u) = &ov.api_base_url {
            self.api_base_url = u.clone();
        }
        if let Some(k) = &ov.identity_api_key {
            self.identity_api_key = Some(k.clone());
        }
        if let Some(p) = ov.image_fetch_parallel {
            self.image_fetch_parallel = p;
        }
        self
    }

    pub fn save_to(&self, path: Option<PathBuf>) -> std::io::Result<()> {
        let path = match path {
            Some(p) => p,
            None => config_dir().join("config"),
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = toml::to_string(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, data)
    }
}
