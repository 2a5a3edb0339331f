use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::{
    get_required_id, get_required_object, get_required_str, parse_role, store_mut, store_ref,
};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_list(state: &mut AppState, _req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let users = store_ref(state)?.list_users()?;
    Ok(json!({ "users": users }))
}

fn handle_get(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_id(&req.params, "id")?;
    let user = store_ref(state)?.get_user_by_id(id)?;
    Ok(json!({ "user": user }))
}

fn handle_by_role(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let role = parse_role(get_required_str(&req.params, "role")?)?;
    let users = store_ref(state)?.get_users_by_role(role)?;
    Ok(json!({ "users": users }))
}

fn handle_create(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let fields = get_required_object(&req.params, "user")?.clone();
    let user = store_mut(state)?.create_user(fields)?;
    Ok(json!({ "user": user }))
}

fn handle_update(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_id(&req.params, "id")?;
    let patch = get_required_object(&req.params, "patch")?;
    let user = store_mut(state)?.update_user(id, patch)?;
    Ok(json!({ "user": user }))
}

fn handle_delete(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_id(&req.params, "id")?;
    let deleted = store_mut(state)?.delete_user(id)?;
    Ok(json!({ "deleted": deleted }))
}

fn handle_children(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_id(&req.params, "id")?;
    let children = store_ref(state)?.children_of(id)?;
    Ok(json!({ "children": children }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "users.list" => handle_list(state, req),
        "users.get" => handle_get(state, req),
        "users.byRole" => handle_by_role(state, req),
        "users.create" => handle_create(state, req),
        "users.update" => handle_update(state, req),
        "users.delete" => handle_delete(state, req),
        "users.children" => handle_children(state, req),
        _ => return None,
    };
    Some(match res {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    })
}
