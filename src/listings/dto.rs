use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::{Listing, ListingKey, NewListing};

/// Listing body as sent by the client. Nothing is required.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingPayload {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub price: Option<i32>,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub body_style: Option<String>,
    pub fuel: Option<String>,
    pub transmission: Option<String>,
    pub doors: Option<String>,
    pub seats: Option<String>,
    pub vehicle_condition: Option<String>,
    pub offer_type: Option<String>,
    pub owner: Option<String>,
    pub location: Option<String>,
    pub region: Option<String>,
    pub phone: Option<String>,
}

impl From<ListingPayload> for NewListing {
    fn from(p: ListingPayload) -> Self {
        Self {
            brand: p.brand.unwrap_or_default(),
            model: p.model.unwrap_or_default(),
            price: p.price.unwrap_or_default(),
            year: p.year.unwrap_or_default(),
            color: p.color.unwrap_or_default(),
            body_style: p.body_style.unwrap_or_default(),
            fuel: p.fuel.unwrap_or_default(),
            transmission: p.transmission.unwrap_or_default(),
            doors: p.doors.unwrap_or_default(),
            seats: p.seats.unwrap_or_default(),
            vehicle_condition: p.vehicle_condition.unwrap_or_default(),
            offer_type: p.offer_type.unwrap_or_default(),
            owner: p.owner.unwrap_or_default(),
            location: p.location.unwrap_or_default(),
            region: p.region.unwrap_or_default(),
            phone: p.phone.unwrap_or_default(),
        }
    }
}

/// Body of `DELETE /listings`: the composite key.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteListingRequest {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub price: Option<i32>,
    pub year: Option<i32>,
    pub owner: Option<String>,
}

impl From<DeleteListingRequest> for ListingKey {
    fn from(r: DeleteListingRequest) -> Self {
        Self {
            brand: r.brand.unwrap_or_default(),
            model: r.model.unwrap_or_default(),
            price: r.price.unwrap_or_default(),
            year: r.year.unwrap_or_default(),
            owner: r.owner.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
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

impl From<Listing> for ListingResponse {
    fn from(l: Listing) -> Self {
        Self {
            id: l.id,
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
        }
    }
}
