use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::get,
    Json, Router,
};
use tracing::{debug, info, instrument, warn};

use super::{
    dto::{DeleteListingRequest, ListingPayload, ListingResponse},
    filter::ListingFilter,
    repo_types::{ListingKey, NewListing},
};
use crate::{
    auth::dto::MessageResponse,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn listing_routes() -> Router<AppState> {
    Router::new().route(
        "/listings",
        get(list_listings).post(create_listing).delete(delete_listing),
    )
}

#[instrument(skip(state, filter))]
pub async fn list_listings(
    State(state): State<AppState>,
    filter: Result<Query<ListingFilter>, QueryRejection>,
) -> AppResult<Json<Vec<ListingResponse>>> {
    let Query(filter) = filter?;
    let filter = filter.normalized();
    debug!(?filter, unfiltered = filter.is_empty(), "listing query");

    let rows = state.listings.query(&filter).await?;
    Ok(Json(rows.into_iter().map(ListingResponse::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_listing(
    State(state): State<AppState>,
    payload: Result<Json<ListingPayload>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(payload) = payload?;
    let listing = state.listings.insert(NewListing::from(payload)).await?;
    info!(listing_id = %listing.id, "listing created");
    Ok(Json(MessageResponse::new("Listing published successfully!")))
}

#[instrument(skip(state, payload))]
pub async fn delete_listing(
    State(state): State<AppState>,
    payload: Result<Json<DeleteListingRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(payload) = payload?;
    let key = ListingKey::from(payload);
    if state.listings.delete_one(&key).await? == 0 {
        warn!(brand = %key.brand, model = %key.model, "listing to delete not found");
        return Err(AppError::not_found("Listing not found."));
    }
    info!(brand = %key.brand, model = %key.model, "listing deleted");
    Ok(Json(MessageResponse::new("Listing deleted successfully!")))
}
