use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Config, CorsConfig, DatabaseConfig, ServerConfig, TmdbConfig};
use crate::util::{parse_bool_var, parse_csv_var};

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub tmdb: FileTmdbConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
    pub dev_mode: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileTmdbConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_origin_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub database_url: Option<String>,
    pub tmdb_api_key: Option<String>,
    pub tmdb_base_url: Option<String>,
    pub tmdb_image_base: Option<String>,
    pub tmdb_image_origin_base: Option<String>,
    pub youtube_base: Option<String>,
    pub tmdb_language: Option<String>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub dev_mode: Option<bool>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            server_host: std::env::var("SERVER_HOST").ok(),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok()),
            database_url: std::env::var("DATABASE_URL").ok(),
            tmdb_api_key: std::env::var("TMDB_API_KEY").ok(),
            tmdb_base_url: std::env::var("TMDB_API_URL").ok(),
            tmdb_image_base: std::env::var("TMDB_IMG_PATH").ok(),
            tmdb_image_origin_base: std::env::var("TMDB_IMG_ORIGIN").ok(),
            youtube_base: std::env::var("YOUTUBE_PATH").ok(),
            tmdb_language: std::env::var("TMDB_LANGUAGE").ok(),
            cors_allowed_origins: parse_csv_var("CORS_ALLOWED_ORIGINS"),
            dev_mode: parse_bool_var("DEV_MODE"),
        }
    }
}

/// Load `.env` into the process environment; a missing file is fine.
pub fn load_env_file() {
    let _ = dotenvy::dotenv();
}

/// Loads and merges configuration sources.
#[derive(Debug, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration: optional TOML file plus the process environment.
    ///
    /// The caller is responsible for loading `.env` (via dotenvy) before
    /// this runs, so `EnvConfig::gather` sees those values too.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigLoadError> {
        let file = match path {
            Some(path) => Self::read_file(path)?,
            None => FileConfig::default(),
        };
        Ok(Self::resolve(file, EnvConfig::gather()))
    }

    fn read_file(path: &Path) -> Result<FileConfig, ConfigLoadError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Merge precedence: environment > file > defaults.
    pub fn resolve(file: FileConfig, env: EnvConfig) -> Config {
        let server_defaults = ServerConfig::default();
        let tmdb_defaults = TmdbConfig::default();

        Config {
            server: ServerConfig {
                host: env
                    .server_host
                    .or(file.server.host)
                    .unwrap_or(server_defaults.host),
                port: env
                    .server_port
                    .or(file.server.port)
                    .unwrap_or(server_defaults.port),
            },
            database: DatabaseConfig {
                url: env.database_url.or(file.database.url),
            },
            tmdb: TmdbConfig {
                api_key: env
                    .tmdb_api_key
                    .or(file.tmdb.api_key)
                    .unwrap_or(tmdb_defaults.api_key),
                base_url: env
                    .tmdb_base_url
                    .or(file.tmdb.base_url)
                    .unwrap_or(tmdb_defaults.base_url),
                image_base: env
                    .tmdb_image_base
                    .or(file.tmdb.image_base)
                    .unwrap_or(tmdb_defaults.image_base),
                image_origin_base: env
                    .tmdb_image_origin_base
                    .or(file.tmdb.image_origin_base)
                    .unwrap_or(tmdb_defaults.image_origin_base),
                youtube_base: env
                    .youtube_base
                    .or(file.tmdb.youtube_base)
                    .unwrap_or(tmdb_defaults.youtube_base),
                language: env
                    .tmdb_language
                    .or(file.tmdb.language)
                    .unwrap_or(tmdb_defaults.language),
            },
            cors: CorsConfig {
                allowed_origins: env
                    .cors_allowed_origins
                    .or(file.cors.allowed_origins)
                    .unwrap_or_default(),
            },
            dev_mode: env.dev_mode.or(file.dev_mode).unwrap_or(false),
        }
    }
}
