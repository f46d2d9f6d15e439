use sqlx::FromRow;
use uuid::Uuid;

/// User record in the `users` collection.
#[derive(Debug, Clone, FromRow)]
pub struct User {
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
    pub date_of_birth: String, // free-form, never parsed
    pub seller_title: String,
    pub phone_number: String,
    pub password_hash: String, // PHC string (or legacy base64 SHA-256)
}

/// Fields written on registration; the store assigns `id`.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
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
    pub password_hash: String,
}

/// Profile fields overwritten by an update. Username, seller title and
/// password hash are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub region: String,
    pub country: String,
    pub postal_code: String,
    pub street: String,
    pub house_number: String,
    pub date_of_birth: String,
    pub phone_number: String,
}

impl UserUpdate {
    pub fn apply_to(&self, user: &mut User) {
        user.email = self.email.clone();
        user.first_name = self.first_name.clone();
        user.last_name = self.last_name.clone();
        user.region = self.region.clone();
        user.country = self.country.clone();
        user.postal_code = self.postal_code.clone();
        user.street = self.street.clone();
        user.house_number = self.house_number.clone();
        user.date_of_birth = self.date_of_birth.clone();
        user.phone_number = self.phone_number.clone();
    }
}

/// Predicate selecting users. Email compares case-insensitively, names exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    ByEmail(String),
    ByIdentity {
        email: String,
        first_name: String,
        last_name: String,
    },
}

fn same_email(stored: &str, wanted: &str) -> bool {
    stored.to_lowercase() == wanted.to_lowercase()
}

impl UserLookup {
    pub fn matches(&self, user: &User) -> bool {
        match self {
            Self::ByEmail(email) => same_email(&user.email, email),
            Self::ByIdentity {
                email,
                first_name,
                last_name,
            } => {
                same_email(&user.email, email)
                    && user.first_name == *first_name
                    && user.last_name == *last_name
            }
        }
    }
}
