//! Handles settings for the application.
//!
//! Sources, from lowest to highest priority: built-in defaults, the optional
//! `settings.toml` file, `EXPENSES__*` environment variables (e.g.
//! `EXPENSES__STORAGE__PATH`), command line flags.
use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
    /// JSON file holding the entries, relative to the working directory.
    pub path: String,
    /// Keep entries in memory only; nothing survives a restart.
    pub memory: bool,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub storage: Storage,
}

#[derive(Debug, Parser)]
#[command(name = "expenses", about = "Personal income/expense tracker backend")]
struct Args {
    /// Optional config file path (TOML, extension may be omitted).
    #[arg(long)]
    config: Option<String>,
    /// Override the address to bind.
    #[arg(long)]
    bind: Option<String>,
    /// Override the port to listen on.
    #[arg(long)]
    port: Option<u16>,
    /// Override the JSON file holding the entries.
    #[arg(long)]
    data_file: Option<String>,
}

impl Settings {
    pub fn new() -> Result<Self, SettingsError> {
        Self::from_args(Args::parse())
    }

    fn from_args(args: Args) -> Result<Self, SettingsError> {
        let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let mut settings: Settings = Config::builder()
            .set_default("app.level", "info")?
            .set_default("server.bind", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("storage.path", "expenses.json")?
            .set_default("storage.memory", false)?
            .add_source(File::with_name(config_path).required(args.config.is_some()))
            .add_source(
                Environment::with_prefix("EXPENSES")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        if let Some(bind) = args.bind {
            settings.server.bind = bind;
        }
        if let Some(port) = args.port {
            settings.server.port = port;
        }
        if let Some(path) = args.data_file {
            settings.storage.path = path;
        }

        Ok(settings)
    }
}
