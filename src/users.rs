//! User collection and session, persisted as JSON under two storage keys.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::credentials::CredentialScheme;
use crate::error::{StoreError, StoreResult};
use crate::seed;
use crate::storage::{KeyValueStore, SESSION_KEY, USERS_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
    Parent,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "teacher" => Some(Self::Teacher),
            "student" => Some(Self::Student),
            "parent" => Some(Self::Parent),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Teacher => "teacher",
            Self::Student => "student",
            Self::Parent => "parent",
        }
    }
}

/// One account. Role-specific fields (`grade`, `subject`, `children`, ...)
/// live in `extra` and round-trip untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub role: Role,
    /// `Some(None)` is an explicit `null`; `None` means the key is absent.
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<Option<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn present_or_null<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Option<i64>>, D::Error> {
    Option::<i64>::deserialize(d).map(Some)
}

impl UserRecord {
    /// Ids listed under `children`; non-integer entries are ignored.
    pub fn children(&self) -> Vec<i64> {
        self.extra
            .get("children")
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
            .unwrap_or_default()
    }
}

/// Issues time-derived ids that never repeat.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    /// Next id: the current Unix time in ms, bumped past both the last id
    /// issued here and `floor`.
    pub fn next(&mut self, floor: i64) -> i64 {
        let now = Utc::now().timestamp_millis();
        let id = now.max(self.last.saturating_add(1)).max(floor);
        self.last = id;
        id
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn non_empty_str<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

pub struct UserStore<S: KeyValueStore> {
    kv: S,
    scheme: Box<dyn CredentialScheme>,
    ids: IdGenerator,
}

impl<S: KeyValueStore> UserStore<S> {
    pub fn new(kv: S, scheme: Box<dyn CredentialScheme>) -> Self {
        Self {
            kv,
            scheme,
            ids: IdGenerator::default(),
        }
    }

    pub fn scheme(&self) -> &dyn CredentialScheme {
        self.scheme.as_ref()
    }

    /// Seed the demo accounts if the collection is empty. Returns whether
    /// seeding happened.
    pub fn initialize(&mut self) -> StoreResult<bool> {
        if !self.list_users()?.is_empty() {
            debug!("user collection present; skipping seed");
            return Ok(false);
        }
        self.seed_demo_users()?;
        Ok(true)
    }

    fn seed_demo_users(&mut self) -> StoreResult<()> {
        let mut users = seed::demo_users(&now_timestamp());
        for user in &mut users {
            user.password = self.scheme.hash(&user.password)?;
        }
        self.write_users(&users)?;
        info!(count = users.len(), scheme = self.scheme.name(), "seeded demo users");
        Ok(())
    }

    pub fn list_users(&self) -> StoreResult<Vec<UserRecord>> {
        let Some(raw) = self.kv.get(USERS_KEY)? else {
            return Ok(Vec::new());
        };
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|source| StoreError::Malformed {
            key: USERS_KEY.to_string(),
            source,
        })
    }

    fn write_users(&mut self, users: &[UserRecord]) -> StoreResult<()> {
        let raw = serde_json::to_string(users).map_err(StoreError::Serialize)?;
        self.kv.set(USERS_KEY, &raw)
    }

    /// Append a new account built from `fields`.
    ///
    /// `id` and `createdAt` are always assigned here; `fullName` falls back
    /// to the username and `email` to `<username>@edumart.com`. Username
    /// uniqueness is the caller's concern.
    pub fn create_user(&mut self, mut fields: Map<String, Value>) -> StoreResult<UserRecord> {
        let username = non_empty_str(&fields, "username")
            .ok_or_else(|| StoreError::Validation("username is required".into()))?
            .to_string();
        let password = fields
            .get("password")
            .and_then(Value::as_str)
            .ok_or_else(|| StoreError::Validation("password is required".into()))?;
        let stored = self.scheme.hash(password)?;

        let mut users = self.list_users()?;
        let floor = users.iter().map(|u| u.id).max().map_or(0, |m| m.saturating_add(1));
        let id = self.ids.next(floor);

        if non_empty_str(&fields, "fullName").is_none() {
            fields.insert("fullName".into(), Value::String(username.clone()));
        }
        if non_empty_str(&fields, "email").is_none() {
            fields.insert(
                "email".into(),
                Value::String(format!("{}@edumart.com", username)),
            );
        }
        fields.insert("password".into(), Value::String(stored));
        fields.insert("id".into(), Value::from(id));
        fields.insert("createdAt".into(), Value::String(now_timestamp()));

        let user: UserRecord = serde_json::from_value(Value::Object(fields))
            .map_err(|e| StoreError::Validation(e.to_string()))?;

        users.push(user.clone());
        self.write_users(&users)?;
        debug!(id, username = %user.username, role = user.role.as_str(), "created user");
        Ok(user)
    }

    /// Shallow-merge `updates` over the record with `id`.
    ///
    /// Top-level keys replace the stored value wholesale; nested arrays and
    /// objects are not merged. The `id` key is ignored and a `password`
    /// string goes through the credential scheme. Returns `None` when no
    /// record has `id`.
    pub fn update_user(
        &mut self,
        id: i64,
        updates: &Map<String, Value>,
    ) -> StoreResult<Option<UserRecord>> {
        let mut users = self.list_users()?;
        let Some(pos) = users.iter().position(|u| u.id == id) else {
            debug!(id, "update_user: no such user");
            return Ok(None);
        };

        let Value::Object(mut merged) =
            serde_json::to_value(&users[pos]).map_err(StoreError::Serialize)?
        else {
            return Err(StoreError::Validation("user record is not an object".into()));
        };
        for (key, value) in updates {
            match key.as_str() {
                "id" => continue,
                "password" => {
                    let value = match value.as_str() {
                        Some(p) => Value::String(self.scheme.hash(p)?),
                        None => value.clone(),
                    };
                    merged.insert(key.clone(), value);
                }
                _ => {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }

        let user: UserRecord = serde_json::from_value(Value::Object(merged))
            .map_err(|e| StoreError::Validation(e.to_string()))?;
        users[pos] = user.clone();
        self.write_users(&users)?;
        debug!(id, fields = updates.len(), "updated user");
        Ok(Some(user))
    }

    /// Remove the record with `id` if present. Always acknowledges with
    /// `true`; a missing id is not an error.
    pub fn delete_user(&mut self, id: i64) -> StoreResult<bool> {
        let mut users = self.list_users()?;
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() != before {
            self.write_users(&users)?;
            debug!(id, "deleted user");
        } else {
            debug!(id, "delete_user: no such user");
        }
        Ok(true)
    }

    pub fn get_user_by_id(&self, id: i64) -> StoreResult<Option<UserRecord>> {
        Ok(self.list_users()?.into_iter().find(|u| u.id == id))
    }

    pub fn get_users_by_role(&self, role: Role) -> StoreResult<Vec<UserRecord>> {
        Ok(self
            .list_users()?
            .into_iter()
            .filter(|u| u.role == role)
            .collect())
    }

    /// Records whose ids appear in the `children` list of user `id`, in
    /// list order. Dangling ids are skipped.
    pub fn children_of(&self, id: i64) -> StoreResult<Vec<UserRecord>> {
        let users = self.list_users()?;
        let Some(parent) = users.iter().find(|u| u.id == id) else {
            return Ok(Vec::new());
        };
        Ok(parent
            .children()
            .into_iter()
            .filter_map(|child| users.iter().find(|u| u.id == child).cloned())
            .collect())
    }

    /// Overwrite the session with a copy of `user`. The copy is not linked to
    /// the collection: later updates or deletes leave it as written.
    pub fn set_session(&mut self, user: &UserRecord) -> StoreResult<()> {
        let raw = serde_json::to_string(user).map_err(StoreError::Serialize)?;
        self.kv.set(SESSION_KEY, &raw)?;
        debug!(id = user.id, "session set");
        Ok(())
    }

    pub fn get_session(&self) -> StoreResult<Option<UserRecord>> {
        let Some(raw) = self.kv.get(SESSION_KEY)? else {
            return Ok(None);
        };
        if raw.is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<Option<UserRecord>>(&raw) {
            Ok(session) => Ok(session),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable session value");
                Ok(None)
            }
        }
    }

    pub fn clear_session(&mut self) -> StoreResult<()> {
        self.kv.remove(SESSION_KEY)?;
        debug!("session cleared");
        Ok(())
    }

    /// Wipe both keys and reseed the demo accounts.
    pub fn reset_demo_data(&mut self) -> StoreResult<()> {
        self.kv.remove(USERS_KEY)?;
        self.kv.remove(SESSION_KEY)?;
        info!("demo data reset");
        self.seed_demo_users()
    }
}
