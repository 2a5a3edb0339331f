use anyhow::Context;
use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::credentials::SchemeKind;

pub const CONFIG_ENV_VAR: &str = "EDUSMART_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "edusmart.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub workspace: WorkspaceSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkspaceSettings {
    /// Opened at startup when set, as if the host had sent `workspace.select`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "StoreSettings::default_seed")]
    pub seed_demo_data: bool,
}

impl StoreSettings {
    const fn default_seed() -> bool {
        true
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            seed_demo_data: Self::default_seed(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub credential_scheme: SchemeKind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    #[serde(default = "LogSettings::default_filter")]
    pub filter: String,
}

impl LogSettings {
    fn default_filter() -> String {
        "warn".to_string()
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: Self::default_filter(),
        }
    }
}

fn base_builder() -> anyhow::Result<ConfigBuilder<DefaultState>> {
    let defaults = Settings::default();
    let builder = config::Config::builder()
        .set_default("store.seed_demo_data", defaults.store.seed_demo_data)?
        .set_default("auth.credential_scheme", "plaintext")?
        .set_default("log.filter", defaults.log.filter)?;
    Ok(builder)
}

fn finish(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Settings> {
    builder
        .build()
        .context("unable to build configuration")?
        .try_deserialize::<Settings>()
        .context("invalid configuration")
}

/// The TOML file to layer in: `EDUSMART_CONFIG` when set, otherwise
/// `./edusmart.toml` if it exists.
pub fn config_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }
    let candidate = std::env::current_dir().ok()?.join(DEFAULT_CONFIG_FILE);
    candidate.exists().then_some(candidate)
}

/// Defaults, then `file` when given, then `EDUSMART_*` environment
/// overrides with `__` between nested keys.
pub fn load(file: Option<&Path>) -> anyhow::Result<Settings> {
    let mut builder = base_builder()?;

    if let Some(path) = file {
        builder = builder.add_source(config::File::from(path));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("EDUSMART")
            .prefix_separator("_")
            .separator("__"),
    );

    finish(builder)
}
