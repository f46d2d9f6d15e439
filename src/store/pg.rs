use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use super::{ListingStore, UserStore};
use crate::auth::repo_types::{NewUser, User, UserLookup, UserUpdate};
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::listings::filter::ListingFilter;
use crate::listings::repo_types::{Listing, ListingKey, NewListing};

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, region, country, \
     postal_code, street, house_number, date_of_birth, seller_title, phone_number, \
     password_hash";

const LISTING_COLUMNS: &str = "id, brand, model, price, year, color, body_style, fuel, \
     transmission, doors, seats, vehicle_condition, offer_type, owner, location, region, \
     phone";

/// Postgres-backed store. Each table carries a `seq` column that records
/// insertion order.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}

fn push_lookup(qb: &mut QueryBuilder<'_, Postgres>, lookup: &UserLookup) {
    match lookup {
        UserLookup::ByEmail(email) => {
            qb.push("lower(email) = lower(").push_bind(email.clone()).push(")");
        }
        UserLookup::ByIdentity {
            email,
            first_name,
            last_name,
        } => {
            qb.push("lower(email) = lower(")
                .push_bind(email.clone())
                .push(") AND first_name = ")
                .push_bind(first_name.clone())
                .push(" AND last_name = ")
                .push_bind(last_name.clone());
        }
    }
}

/// SELECT for a listing filter, with the conjunction and ordering pushed into SQL.
pub(crate) fn listing_query(filter: &ListingFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {LISTING_COLUMNS} FROM listings WHERE TRUE"
    ));
    // column names come from a fixed list, only values are bound
    for (column, value) in filter.text_constraints() {
        qb.push(" AND ")
            .push(column)
            .push(" = ")
            .push_bind(value.to_string());
    }
    if let Some(min) = filter.min_price {
        qb.push(" AND price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        qb.push(" AND price <= ").push_bind(max);
    }
    if let Some(min) = filter.min_year {
        qb.push(" AND year >= ").push_bind(min);
    }
    if let Some(max) = filter.max_year {
        qb.push(" AND year <= ").push_bind(max);
    }
    qb.push(" ORDER BY price ASC, seq ASC");
    qb
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert(&self, u: NewUser) -> AppResult<User> {
        let sql = format!(
            r#"
            INSERT INTO users (id, username, email, first_name, last_name, region, country,
                               postal_code, street, house_number, date_of_birth, seller_title,
                               phone_number, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(u.username)
            .bind(u.email)
            .bind(u.first_name)
            .bind(u.last_name)
            .bind(u.region)
            .bind(u.country)
            .bind(u.postal_code)
            .bind(u.street)
            .bind(u.house_number)
            .bind(u.date_of_birth)
            .bind(u.seller_title)
            .bind(u.phone_number)
            .bind(u.password_hash)
            .fetch_one(&self.db)
            .await?;
        debug!(user_id = %user.id, "user inserted");
        Ok(user)
    }

    async fn find_one(&self, lookup: &UserLookup) -> AppResult<Option<User>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {USER_COLUMNS} FROM users WHERE "));
        push_lookup(&mut qb, lookup);
        qb.push(" ORDER BY seq ASC LIMIT 1");
        let user = qb.build_query_as::<User>().fetch_optional(&self.db).await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn update_one(&self, lookup: &UserLookup, update: &UserUpdate) -> AppResult<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE users SET email = ");
        qb.push_bind(update.email.clone())
            .push(", first_name = ")
            .push_bind(update.first_name.clone())
            .push(", last_name = ")
            .push_bind(update.last_name.clone())
            .push(", region = ")
            .push_bind(update.region.clone())
            .push(", country = ")
            .push_bind(update.country.clone())
            .push(", postal_code = ")
            .push_bind(update.postal_code.clone())
            .push(", street = ")
            .push_bind(update.street.clone())
            .push(", house_number = ")
            .push_bind(update.house_number.clone())
            .push(", date_of_birth = ")
            .push_bind(update.date_of_birth.clone())
            .push(", phone_number = ")
            .push_bind(update.phone_number.clone())
            .push(" WHERE seq = (SELECT seq FROM users WHERE ");
        push_lookup(&mut qb, lookup);
        qb.push(" ORDER BY seq ASC LIMIT 1)");

        let matched = qb.build().execute(&self.db).await?.rows_affected();
        Ok(matched)
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ListingStore for PgStore {
    async fn insert(&self, l: NewListing) -> AppResult<Listing> {
        let sql = format!(
            r#"
            INSERT INTO listings (id, brand, model, price, year, color, body_style, fuel,
                                  transmission, doors, seats, vehicle_condition, offer_type,
                                  owner, location, region, phone)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {LISTING_COLUMNS}
            "#
        );
        let listing = sqlx::query_as::<_, Listing>(&sql)
            .bind(Uuid::new_v4())
            .bind(l.brand)
            .bind(l.model)
            .bind(l.price)
            .bind(l.year)
            .bind(l.color)
            .bind(l.body_style)
            .bind(l.fuel)
            .bind(l.transmission)
            .bind(l.doors)
            .bind(l.seats)
            .bind(l.vehicle_condition)
            .bind(l.offer_type)
            .bind(l.owner)
            .bind(l.location)
            .bind(l.region)
            .bind(l.phone)
            .fetch_one(&self.db)
            .await?;
        Ok(listing)
    }

    async fn query(&self, filter: &ListingFilter) -> AppResult<Vec<Listing>> {
        let mut qb = listing_query(filter);
        let rows = qb.build_query_as::<Listing>().fetch_all(&self.db).await?;
        Ok(rows)
    }

    async fn delete_one(&self, key: &ListingKey) -> AppResult<u64> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM listings
             WHERE seq = (
                SELECT seq FROM listings
                 WHERE brand = $1 AND model = $2 AND price = $3 AND year = $4 AND owner = $5
                 ORDER BY seq ASC
                 LIMIT 1)
            "#,
        )
        .bind(&key.brand)
        .bind(&key.model)
        .bind(key.price)
        .bind(key.year)
        .bind(&key.owner)
        .execute(&self.db)
        .await?
        .rows_affected();
        Ok(deleted)
    }
}
