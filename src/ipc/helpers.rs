use serde_json::{Map, Value};

use crate::ipc::error::HandlerErr;
use crate::ipc::types::AppState;
use crate::storage::SqliteKv;
use crate::users::{Role, UserStore};

pub fn store_ref(state: &AppState) -> Result<&UserStore<SqliteKv>, HandlerErr> {
    state
        .store
        .as_ref()
        .ok_or_else(|| HandlerErr::new("no_workspace", "select a workspace first"))
}

pub fn store_mut(state: &mut AppState) -> Result<&mut UserStore<SqliteKv>, HandlerErr> {
    state
        .store
        .as_mut()
        .ok_or_else(|| HandlerErr::new("no_workspace", "select a workspace first"))
}

pub fn get_required_str<'a>(params: &'a Value, key: &str) -> Result<&'a str, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_required_id(params: &Value, key: &str) -> Result<i64, HandlerErr> {
    let v = params
        .get(key)
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))?;
    v.as_i64()
        .ok_or_else(|| HandlerErr::bad_params(format!("{} must be integer", key)))
}

pub fn get_required_object<'a>(
    params: &'a Value,
    key: &str,
) -> Result<&'a Map<String, Value>, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_object())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing object {}", key)))
}

pub fn parse_role(raw: &str) -> Result<Role, HandlerErr> {
    Role::parse(raw.trim()).ok_or_else(|| {
        HandlerErr::bad_params("role must be one of: admin, teacher, student, parent")
    })
}
