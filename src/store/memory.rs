use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ListingStore, UserStore};
use crate::auth::repo_types::{NewUser, User, UserLookup, UserUpdate};
use crate::error::AppResult;
use crate::listings::filter::ListingFilter;
use crate::listings::repo_types::{Listing, ListingKey, NewListing};

/// Process-local store. Vectors keep insertion order, which is what the
/// first-match and stable-sort rules rely on.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    listings: RwLock<Vec<Listing>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    #[cfg(test)]
    pub async fn listing_count(&self) -> usize {
        self.listings.read().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, u: NewUser) -> AppResult<User> {
        let user = User {
            id: Uuid::new_v4(),
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
            password_hash: u.password_hash,
        };
        self.users.write().await.push(user.clone());
        Ok(user)
    }

    async fn find_one(&self, lookup: &UserLookup) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| lookup.matches(u)).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn update_one(&self, lookup: &UserLookup, update: &UserUpdate) -> AppResult<u64> {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| lookup.matches(u)) {
            Some(user) => {
                update.apply_to(user);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        let mut users = self.users.write().await;
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.password_hash = password_hash.to_string();
        }
        Ok(())
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn insert(&self, l: NewListing) -> AppResult<Listing> {
        let listing = Listing {
            id: Uuid::new_v4(),
            brand: l.brand,
            model: l.model,
            price: l.price,
            year: l.year,
            color: l.color,
            body_style: l.body_style,
            fuel: l.fuel,
            transmission: l.transmission,
            doors: l.doors,
            seats: l.seats,
            vehicle_condition: l.vehicle_condition,
            offer_type: l.offer_type,
            owner: l.owner,
            location: l.location,
            region: l.region,
            phone: l.phone,
        };
        self.listings.write().await.push(listing.clone());
        Ok(listing)
    }

    async fn query(&self, filter: &ListingFilter) -> AppResult<Vec<Listing>> {
        let snapshot = self.listings.read().await.clone();
        Ok(filter.apply(snapshot))
    }

    async fn delete_one(&self, key: &ListingKey) -> AppResult<u64> {
        let mut listings = self.listings.write().await;
        match listings.iter().position(|l| key.matches(l)) {
            Some(idx) => {
                listings.remove(idx);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_listing(brand: &str, price: i32, owner: &str) -> NewListing {
        NewListing {
            brand: brand.into(),
            model: "Clio".into(),
            price,
            year: 2015,
            owner: owner.into(),
            ..Default::default()
        }
    }

    fn key(brand: &str, price: i32, owner: &str) -> ListingKey {
        ListingKey {
            brand: brand.into(),
            model: "Clio".into(),
            price,
            year: 2015,
            owner: owner.into(),
        }
    }

    #[tokio::test]
    async fn delete_removes_first_duplicate_only() {
        let store = MemoryStore::new();
        let first = ListingStore::insert(&store, new_listing("Renault", 4000, "jan"))
            .await
            .unwrap();
        let second = ListingStore::insert(&store, new_listing("Renault", 4000, "jan"))
            .await
            .unwrap();

        assert_eq!(store.delete_one(&key("Renault", 4000, "jan")).await.unwrap(), 1);
        let left = store.query(&ListingFilter::default()).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, second.id);
        assert_ne!(left[0].id, first.id);
    }

    #[tokio::test]
    async fn delete_then_redelete_reports_zero() {
        let store = MemoryStore::new();
        ListingStore::insert(&store, new_listing("Kia", 9000, "eva"))
            .await
            .unwrap();

        assert_eq!(store.delete_one(&key("Kia", 9000, "ana")).await.unwrap(), 0);
        assert_eq!(store.delete_one(&key("Kia", 9000, "eva")).await.unwrap(), 1);
        assert_eq!(store.delete_one(&key("Kia", 9000, "eva")).await.unwrap(), 0);
        assert_eq!(store.listing_count().await, 0);
    }

    #[tokio::test]
    async fn update_with_no_match_leaves_users_untouched() {
        let store = MemoryStore::new();
        let user = UserStore::insert(
            &store,
            NewUser {
                email: "a@b.si".into(),
                first_name: "Ana".into(),
                last_name: "Novak".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let lookup = UserLookup::ByIdentity {
            email: "a@b.si".into(),
            first_name: "Ana".into(),
            last_name: "Kos".into(),
        };
        let update = UserUpdate {
            email: "new@b.si".into(),
            ..Default::default()
        };
        assert_eq!(store.update_one(&lookup, &update).await.unwrap(), 0);

        let unchanged = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(unchanged.email, "a@b.si");
        assert_eq!(unchanged.last_name, "Novak");
    }

    #[tokio::test]
    async fn find_one_returns_first_inserted_match() {
        let store = MemoryStore::new();
        let first = UserStore::insert(
            &store,
            NewUser {
                email: "dup@b.si".into(),
                username: "first".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        UserStore::insert(
            &store,
            NewUser {
                email: "dup@b.si".into(),
                username: "second".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let found = store
            .find_one(&UserLookup::ByEmail("dup@b.si".into()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, first.id);
        assert_eq!(store.user_count().await, 2);
    }

    #[tokio::test]
    async fn email_lookup_ignores_stored_case() {
        let store = MemoryStore::new();
        let user = UserStore::insert(
            &store,
            NewUser {
                email: "Mixed@B.si".into(),
                first_name: "Ana".into(),
                last_name: "Novak".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let found = store
            .find_one(&UserLookup::ByEmail("mixed@b.si".into()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, user.id);

        let lookup = UserLookup::ByIdentity {
            email: "mixed@b.si".into(),
            first_name: "Ana".into(),
            last_name: "Novak".into(),
        };
        assert_eq!(store.update_one(&lookup, &UserUpdate::default()).await.unwrap(), 1);
    }
}
