//! Password storage schemes.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::Deserialize;

use crate::error::{StoreError, StoreResult};

/// Turns a submitted password into its stored form and checks it later.
pub trait CredentialScheme {
    fn name(&self) -> &'static str;
    fn hash(&self, password: &str) -> StoreResult<String>;
    fn verify(&self, password: &str, stored: &str) -> StoreResult<bool>;
}

/// Stores passwords as given. Compatible with data written by the browser
/// dashboard, which never hashed anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaintextScheme;

impl CredentialScheme for PlaintextScheme {
    fn name(&self) -> &'static str {
        "plaintext"
    }

    fn hash(&self, password: &str) -> StoreResult<String> {
        Ok(password.to_string())
    }

    fn verify(&self, password: &str, stored: &str) -> StoreResult<bool> {
        Ok(password == stored)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Scheme;

impl CredentialScheme for Argon2Scheme {
    fn name(&self) -> &'static str {
        "argon2"
    }

    fn hash(&self, password: &str) -> StoreResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| StoreError::Credential(e.to_string()))
    }

    fn verify(&self, password: &str, stored: &str) -> StoreResult<bool> {
        // A value that is not a PHC string can never match.
        let Ok(parsed) = PasswordHash::new(stored) else {
            return Ok(false);
        };
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemeKind {
    #[default]
    Plaintext,
    Argon2,
}

impl SchemeKind {
    pub fn build(self) -> Box<dyn CredentialScheme> {
        match self {
            Self::Plaintext => Box::new(PlaintextScheme),
            Self::Argon2 => Box::new(Argon2Scheme),
        }
    }
}
