use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_edusmartd");
    let mut child = Command::new(exe)
        .env_remove("EDUSMART_CONFIG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn edusmartd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn error_code(value: &serde_json::Value) -> Option<&str> {
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
}

#[test]
fn session_copy_outlives_deleted_user() {
    let workspace = temp_dir("edusmart-session-orphan");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let empty = request_ok(&mut stdin, &mut reader, "2", "session.get", json!({}));
    assert!(empty.get("session").map(|v| v.is_null()).unwrap_or(false));

    let student = request_ok(&mut stdin, &mut reader, "3", "users.get", json!({ "id": 6 }));
    let user = student.get("user").cloned().expect("user");
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "session.set",
        json!({ "user": user }),
    );
    let _ = request_ok(&mut stdin, &mut reader, "5", "users.delete", json!({ "id": 6 }));

    let session = request_ok(&mut stdin, &mut reader, "6", "session.get", json!({}));
    assert_eq!(session.get("session"), Some(&user));

    let _ = request_ok(&mut stdin, &mut reader, "7", "session.clear", json!({}));
    let cleared = request_ok(&mut stdin, &mut reader, "8", "session.get", json!({}));
    assert!(cleared.get("session").map(|v| v.is_null()).unwrap_or(false));

    let bad = request(
        &mut stdin,
        &mut reader,
        "9",
        "session.set",
        json!({ "user": { "username": "no-id" } }),
    );
    assert_eq!(error_code(&bad), Some("bad_params"));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn demo_reset_restores_canonical_users() {
    let workspace = temp_dir("edusmart-demo-reset");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let canonical = request_ok(&mut stdin, &mut reader, "2", "users.list", json!({}));

    let _ = request_ok(&mut stdin, &mut reader, "3", "users.delete", json!({ "id": 1 }));
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "users.update",
        json!({ "id": 2, "patch": { "subject": "Art" } }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "users.create",
        json!({ "user": { "username": "extra", "password": "secret1", "role": "parent" } }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "auth.login",
        json!({ "username": "admin", "password": "password" }),
    );

    let reset = request_ok(&mut stdin, &mut reader, "7", "demo.reset", json!({}));
    assert_eq!(reset.get("userCount").and_then(|v| v.as_i64()), Some(7));

    let after = request_ok(&mut stdin, &mut reader, "8", "users.list", json!({}));
    let strip = |v: &serde_json::Value| -> Vec<serde_json::Value> {
        v.get("users")
            .and_then(|u| u.as_array())
            .expect("users")
            .iter()
            .map(|u| {
                let mut u = u.clone();
                if let Some(obj) = u.as_object_mut() {
                    obj.remove("createdAt");
                }
                u
            })
            .collect()
    };
    assert_eq!(strip(&after), strip(&canonical));

    let session = request_ok(&mut stdin, &mut reader, "9", "session.get", json!({}));
    assert!(session.get("session").map(|v| v.is_null()).unwrap_or(false));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
