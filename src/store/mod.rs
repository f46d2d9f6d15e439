//! Record store: the `users` and `listings` collections behind traits so the
//! services never see which backend they run on.

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User, UserLookup, UserUpdate};
use crate::error::AppResult;
use crate::listings::filter::ListingFilter;
use crate::listings::repo_types::{Listing, ListingKey, NewListing};

pub mod memory;
pub mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: NewUser) -> AppResult<User>;

    /// First match in insertion order.
    async fn find_one(&self, lookup: &UserLookup) -> AppResult<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Overwrites the first match. Returns the number of matched users (0 or 1).
    async fn update_one(&self, lookup: &UserLookup, update: &UserUpdate) -> AppResult<u64>;

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> AppResult<()>;
}

#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn insert(&self, listing: NewListing) -> AppResult<Listing>;

    /// Matching listings sorted by ascending price, ties in insertion order.
    async fn query(&self, filter: &ListingFilter) -> AppResult<Vec<Listing>>;

    /// Deletes the first match in insertion order. Returns the number deleted (0 or 1).
    async fn delete_one(&self, key: &ListingKey) -> AppResult<u64>;
}
