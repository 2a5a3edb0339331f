use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::{store_mut, store_ref};
use crate::ipc::types::{AppState, Request};
use crate::users::UserRecord;
use serde_json::json;

fn handle_get(state: &mut AppState, _req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let session = store_ref(state)?.get_session()?;
    Ok(json!({ "session": session }))
}

fn handle_set(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let raw = req
        .params
        .get("user")
        .cloned()
        .ok_or_else(|| HandlerErr::bad_params("missing user"))?;
    let user: UserRecord = serde_json::from_value(raw)
        .map_err(|e| HandlerErr::bad_params(format!("invalid user: {}", e)))?;
    store_mut(state)?.set_session(&user)?;
    Ok(json!({ "session": user }))
}

fn handle_clear(state: &mut AppState, _req: &Request) -> Result<serde_json::Value, HandlerErr> {
    store_mut(state)?.clear_session()?;
    Ok(json!({}))
}

fn handle_demo_reset(state: &mut AppState, _req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let store = store_mut(state)?;
    store.reset_demo_data()?;
    let count = store.list_users()?.len();
    Ok(json!({ "userCount": count }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "session.get" => handle_get(state, req),
        "session.set" => handle_set(state, req),
        "session.clear" => handle_clear(state, req),
        "demo.reset" => handle_demo_reset(state, req),
        _ => return None,
    };
    Some(match res {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    })
}
