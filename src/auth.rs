//! Login and signup flows on top of the user store.

use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::storage::KeyValueStore;
use crate::users::{Role, UserRecord, UserStore};

const MIN_USERNAME_CHARS: usize = 3;
const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("form validation failed")]
    Form(Vec<FieldError>),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Username already exists")]
    UsernameTaken,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Field rules of the sign-in form. Every failing field is reported.
pub fn validate_credentials_form(username: &str, password: &str) -> Result<(), AuthError> {
    let mut errors = Vec::new();

    if username.trim().is_empty() {
        errors.push(FieldError {
            field: "username",
            message: "Username is required",
        });
    } else if username.chars().count() < MIN_USERNAME_CHARS {
        errors.push(FieldError {
            field: "username",
            message: "Username must be at least 3 characters",
        });
    }

    if password.trim().is_empty() {
        errors.push(FieldError {
            field: "password",
            message: "Password is required",
        });
    } else if password.chars().count() < MIN_PASSWORD_CHARS {
        errors.push(FieldError {
            field: "password",
            message: "Password must be at least 6 characters",
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AuthError::Form(errors))
    }
}

pub fn login<S: KeyValueStore>(
    store: &mut UserStore<S>,
    username: &str,
    password: &str,
) -> Result<UserRecord, AuthError> {
    validate_credentials_form(username, password)?;

    let mut found = None;
    for user in store.list_users()? {
        if user.username == username && store.scheme().verify(password, &user.password)? {
            found = Some(user);
            break;
        }
    }
    let Some(user) = found else {
        debug!(username, "login rejected");
        return Err(AuthError::InvalidCredentials);
    };

    store.set_session(&user)?;
    info!(id = user.id, role = user.role.as_str(), "login");
    Ok(user)
}

/// Register a new account and sign it in. The session holds the stored
/// record, defaults included.
pub fn signup<S: KeyValueStore>(
    store: &mut UserStore<S>,
    username: &str,
    password: &str,
    role: Role,
) -> Result<UserRecord, AuthError> {
    validate_credentials_form(username, password)?;

    if store.list_users()?.iter().any(|u| u.username == username) {
        return Err(AuthError::UsernameTaken);
    }

    let mut fields = Map::new();
    fields.insert("username".into(), json!(username));
    fields.insert("password".into(), json!(password));
    fields.insert("role".into(), json!(role.as_str()));
    fields.insert("parentId".into(), Value::Null);
    let user = store.create_user(fields)?;

    store.set_session(&user)?;
    info!(id = user.id, role = role.as_str(), "signup");
    Ok(user)
}

pub fn logout<S: KeyValueStore>(store: &mut UserStore<S>) -> Result<(), AuthError> {
    store.clear_session()?;
    Ok(())
}
