use crate::auth;
use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::{parse_role, store_mut};
use crate::ipc::types::{AppState, Request};
use crate::users::Role;
use serde_json::json;

// Missing strings are passed through as "" so the form rules report them.
fn param_str<'a>(req: &'a Request, key: &str) -> &'a str {
    req.params.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

fn handle_login(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let username = param_str(req, "username");
    let password = param_str(req, "password");
    let user = auth::login(store_mut(state)?, username, password)?;
    Ok(json!({ "user": user }))
}

fn handle_signup(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let username = param_str(req, "username");
    let password = param_str(req, "password");
    let role = match req.params.get("role") {
        None | Some(serde_json::Value::Null) => Role::Student,
        Some(v) => parse_role(
            v.as_str()
                .ok_or_else(|| HandlerErr::bad_params("role must be string"))?,
        )?,
    };
    let user = auth::signup(store_mut(state)?, username, password, role)?;
    Ok(json!({ "user": user }))
}

fn handle_logout(state: &mut AppState, _req: &Request) -> Result<serde_json::Value, HandlerErr> {
    auth::logout(store_mut(state)?)?;
    Ok(json!({}))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "auth.login" => handle_login(state, req),
        "auth.signup" => handle_signup(state, req),
        "auth.logout" => handle_logout(state, req),
        _ => return None,
    };
    Some(match res {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    })
}
