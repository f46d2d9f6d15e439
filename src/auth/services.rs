use std::sync::Arc;

use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::dto::{normalize_email, UserPayload};
use super::jwt::JwtKeys;
use super::password::{hash_password, needs_rehash, verify_dummy, verify_password};
use super::repo_types::{NewUser, User, UserLookup, UserUpdate};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::store::UserStore;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Owns user creation, lookup and credential checks.
#[derive(Clone)]
pub struct CredentialService {
    users: Arc<dyn UserStore>,
    keys: JwtKeys,
}

impl FromRef<AppState> for CredentialService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.users.clone(), JwtKeys::from_ref(state))
    }
}

impl CredentialService {
    pub fn new(users: Arc<dyn UserStore>, keys: JwtKeys) -> Self {
        Self { users, keys }
    }

    /// Inserts the record as given; duplicate emails are not rejected.
    pub async fn create_user(&self, user: NewUser) -> AppResult<User> {
        self.users.insert(user).await
    }

    pub async fn find_user(&self, lookup: &UserLookup) -> AppResult<Option<User>> {
        self.users.find_one(lookup).await
    }

    pub async fn update_user(&self, lookup: &UserLookup, update: &UserUpdate) -> AppResult<()> {
        match self.users.update_one(lookup, update).await? {
            0 => Err(AppError::not_found("User not found.")),
            _ => Ok(()),
        }
    }

    pub fn generate_token(&self, user: &User) -> AppResult<String> {
        Ok(self.keys.sign(user.id, &user.email)?)
    }

    /// Validates the payload, hashes the password and stores the user.
    /// Nothing is written when validation fails.
    pub async fn register(&self, payload: UserPayload) -> AppResult<User> {
        let password = payload.password.clone().unwrap_or_default();
        if password.is_empty() {
            return Err(AppError::validation("Password is required."));
        }
        if payload.confirm_password.as_deref() != Some(password.as_str()) {
            return Err(AppError::validation("Passwords do not match!"));
        }
        let email = payload.email();
        if !is_valid_email(&email) {
            return Err(AppError::validation("Invalid email."));
        }

        let hash = hash_password(&password)?;
        let user = self.create_user(payload.into_new_user(hash)).await?;
        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Returns a token and the stored profile. Unknown email and wrong
    /// password both produce [`AppError::Unauthorized`].
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let email = normalize_email(email);
        let Some(mut user) = self.find_user(&UserLookup::ByEmail(email)).await? else {
            verify_dummy(password);
            warn!("login unknown email");
            return Err(AppError::Unauthorized);
        };

        let valid = verify_password(password, &user.password_hash).unwrap_or_else(|e| {
            error!(user_id = %user.id, error = %e, "stored password hash unreadable");
            false
        });
        if !valid {
            warn!(user_id = %user.id, "login invalid password");
            return Err(AppError::Unauthorized);
        }

        if needs_rehash(&user.password_hash) {
            let upgraded = hash_password(password)?;
            self.users.set_password_hash(user.id, &upgraded).await?;
            user.password_hash = upgraded;
            info!(user_id = %user.id, "legacy password hash upgraded");
        }

        let token = self.generate_token(&user)?;
        info!(user_id = %user.id, "user logged in");
        Ok((token, user))
    }

    pub async fn profile(&self, user_id: Uuid) -> AppResult<Option<User>> {
        self.users.find_by_id(user_id).await
    }
}
