//! Shared configuration library for cinerate.
//!
//! This crate centralizes config loading and validation so the server binary
//! and tooling agree on defaults and precedence: environment variables win
//! over the TOML file, which wins over built-in defaults. The third-party
//! metadata client is configured exclusively through [`TmdbConfig`]; there
//! is no ambient process-wide client state.

pub mod loader;
pub mod models;
mod util;

pub use loader::{load_env_file, ConfigLoadError, ConfigLoader, EnvConfig, FileConfig};
pub use models::{Config, CorsConfig, DatabaseConfig, ServerConfig, TmdbConfig};
