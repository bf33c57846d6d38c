// --- File: crates/skywarn_config/src/lib.rs ---

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::PathBuf;

pub mod models;
pub use models::*;

/// Loads the application configuration.
///
/// Configuration is layered: `config/default`, then `config/<RUN_ENV>`, then
/// environment variables prefixed with `SKYWARN` (separator `__`, e.g.
/// `SKYWARN_SERVER__PORT=7800`). Missing files are tolerated so a pure-env
/// deployment works.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let config_dir = env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    let default_path = PathBuf::from(&config_dir).join("default");
    let env_path = PathBuf::from(&config_dir).join(&run_env);

    let builder = Config::builder()
        .add_source(File::from(default_path).required(false))
        .add_source(File::from(env_path).required(false))
        .add_source(Environment::with_prefix("SKYWARN").separator("__"));

    builder.build()?.try_deserialize()
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures that the dotenv file is loaded into the environment variables.
///
/// This function checks if the dotenv file has already been loaded using a
/// `OnceCell`. The path can be overridden with `DOTENV_OVERRIDE`; otherwise
/// a file named ".env" is loaded if present.
pub fn ensure_dotenv_loaded() {
    let dotenv_path =
        env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });
}
