//! Account service: signup, login, and header-based user resolution.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::info;
use uuid::Uuid;

use crate::domain::entities::UserRecord;
use crate::domain::users::{Credentials, NewUser};

use super::error::AppError;
use super::repos::{CreateUserParams, RepoError, UsersRepo};

const SOURCE: &str = "application::auth";

pub struct AuthService {
    users: Arc<dyn UsersRepo>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UsersRepo>) -> Self {
        Self { users }
    }

    pub async fn signup(&self, user: NewUser) -> Result<UserRecord, AppError> {
        user.validate().map_err(AppError::validation)?;

        let digest = hash_password(&user.password);
        let record = self
            .users
            .create_user(CreateUserParams {
                username: user.username,
                name: user.name,
                email: user.email,
                password_digest: digest,
                department: user.department,
            })
            .await
            .map_err(|err| match err {
                RepoError::Duplicate { .. } => {
                    AppError::validation_one("Username already taken")
                }
                other => AppError::from(other),
            })?;

        info!(target = SOURCE, user_id = %record.id, "user registered");
        Ok(record)
    }

    pub async fn login(&self, credentials: Credentials) -> Result<UserRecord, AppError> {
        credentials.validate().map_err(AppError::validation)?;

        let record = self
            .users
            .find_by_username(&credentials.username)
            .await?
            .ok_or(AppError::Unauthorized("invalid username or password"))?;

        if !verify_password(&credentials.password, &record.password_digest) {
            return Err(AppError::Unauthorized("invalid username or password"));
        }
        Ok(record)
    }

    /// Resolve the `X-User-ID` header value into a stored user.
    pub async fn require_user(&self, user_id: Uuid) -> Result<UserRecord, AppError> {
        self.users
            .find_user_by_id(user_id)
            .await?
            .ok_or(AppError::Unauthorized("invalid user ID"))
    }
}

/// `<salt>$<base64(sha256(salt || password))>`.
fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{salt}${}", digest_with_salt(&salt, password))
}

fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, expected)) = stored.split_once('$') else {
        return false;
    };
    let computed = digest_with_salt(salt, password);
    computed.as_bytes().ct_eq(expected.as_bytes()).into()
}

fn digest_with_salt(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    STANDARD_NO_PAD.encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let digest = hash_password("correct horse battery staple");
        assert!(verify_password("correct horse battery staple", &digest));
        assert!(!verify_password("wrong password", &digest));
    }

    #[test]
    fn distinct_salts_produce_distinct_digests() {
        let a = hash_password("same password");
        let b = hash_password("same password");
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_stored_digest_never_verifies() {
        assert!(!verify_password("anything", "no-dollar-separator"));
        assert!(!verify_password("anything", ""));
    }
}
