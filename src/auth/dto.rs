use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::{NewUser, User, UserLookup, UserUpdate};

/// User fields as sent by the client, for both registration and update.
/// Every field is optional on the wire; absent values become empty strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPayload {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub date_of_birth: Option<String>,
    pub seller_title: Option<String>,
    pub phone_number: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl UserPayload {
    pub fn email(&self) -> String {
        normalize_email(self.email.as_deref().unwrap_or_default())
    }

    pub fn into_new_user(self, password_hash: String) -> NewUser {
        let email = self.email();
        NewUser {
            username: self.username.unwrap_or_default(),
            email,
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            region: self.region.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
            postal_code: self.postal_code.unwrap_or_default(),
            street: self.street.unwrap_or_default(),
            house_number: self.house_number.unwrap_or_default(),
            date_of_birth: self.date_of_birth.unwrap_or_default(),
            seller_title: self.seller_title.unwrap_or_default(),
            phone_number: self.phone_number.unwrap_or_default(),
            password_hash,
        }
    }

    /// Identity predicate (email + first name + last name) used to find the user to update.
    pub fn identity(&self) -> UserLookup {
        UserLookup::ByIdentity {
            email: self.email(),
            first_name: self.first_name.clone().unwrap_or_default(),
            last_name: self.last_name.clone().unwrap_or_default(),
        }
    }

    pub fn into_update(self) -> UserUpdate {
        let email = self.email();
        UserUpdate {
            email,
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            region: self.region.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
            postal_code: self.postal_code.unwrap_or_default(),
            street: self.street.unwrap_or_default(),
            house_number: self.house_number.unwrap_or_default(),
            date_of_birth: self.date_of_birth.unwrap_or_default(),
            phone_number: self.phone_number.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub old_user: Option<UserPayload>,
    pub updated_user: Option<UserPayload>,
}

/// Response returned after login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Profile returned to the client. Never includes the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub region: String,
    pub country: String,
    pub postal_code: String,
    pub street: String,
    pub house_number: String,
    pub date_of_birth: String,
    pub seller_title: String,
    pub phone_number: String,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            region: u.region,
            country: u.country,
            postal_code: u.postal_code,
            street: u.street,
            house_number: u.house_number,
            date_of_birth: u.date_of_birth,
            seller_title: u.seller_title,
            phone_number: u.phone_number,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
