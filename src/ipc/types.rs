use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

use crate::db;
use crate::settings::Settings;
use crate::storage::SqliteKv;
use crate::users::UserStore;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub settings: Settings,
    pub workspace: Option<PathBuf>,
    pub store: Option<UserStore<SqliteKv>>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            workspace: None,
            store: None,
        }
    }

    /// Open (or create) the workspace database and make it the active store.
    /// Returns whether demo users were seeded.
    pub fn open_workspace(&mut self, path: PathBuf) -> anyhow::Result<bool> {
        let conn = db::open_db(&path)?;
        let scheme = self.settings.auth.credential_scheme.build();
        let mut store = UserStore::new(SqliteKv::new(conn), scheme);

        let seeded = if self.settings.store.seed_demo_data {
            store
                .initialize()
                .with_context(|| format!("initialize users in {}", path.display()))?
        } else {
            false
        };

        tracing::info!(
            workspace = %path.display(),
            seeded,
            scheme = store.scheme().name(),
            "workspace opened"
        );
        self.workspace = Some(path);
        self.store = Some(store);
        Ok(seeded)
    }
}
