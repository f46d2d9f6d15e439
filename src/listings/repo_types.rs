use sqlx::FromRow;
use uuid::Uuid;

/// Listing record in the `listings` collection.
#[derive(Debug, Clone, FromRow)]
pub struct Listing {
    pub id: Uuid,
    pub brand: String,
    pub model: String,
    pub price: i32,
    pub year: i32,
    pub color: String,
    pub body_style: String,
    pub fuel: String,
    pub transmission: String,
    pub doors: String,
    pub seats: String,
    pub vehicle_condition: String,
    pub offer_type: String,
    pub owner: String,
    pub location: String,
    pub region: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewListing {
    pub brand: String,
    pub model: String,
    pub price: i32,
    pub year: i32,
    pub color: String,
    pub body_style: String,
    pub fuel: String,
    pub transmission: String,
    pub doors: String,
    pub seats: String,
    pub vehicle_condition: String,
    pub offer_type: String,
    pub owner: String,
    pub location: String,
    pub region: String,
    pub phone: String,
}

/// Composite key used to pick a listing for deletion. Not unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingKey {
    pub brand: String,
    pub model: String,
    pub price: i32,
    pub year: i32,
    pub owner: String,
}

impl ListingKey {
    pub fn matches(&self, listing: &Listing) -> bool {
        listing.brand == self.brand
            && listing.model == self.model
            && listing.price == self.price
            && listing.year == self.year
            && listing.owner == self.owner
    }
}
