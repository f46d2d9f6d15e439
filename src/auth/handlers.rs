use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{AuthResponse, LoginRequest, MessageResponse, PublicUser, UpdateUserRequest, UserPayload},
    jwt::AuthUser,
    services::CredentialService,
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/update", put(update_user))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(svc, payload))]
pub async fn register(
    State(svc): State<CredentialService>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(payload) = payload?;
    if let Err(e) = svc.register(payload).await {
        warn!(error = %e, "registration rejected");
        return Err(e);
    }
    Ok(Json(MessageResponse::new("User registered successfully!")))
}

#[instrument(skip(svc, payload))]
pub async fn login(
    State(svc): State<CredentialService>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<AuthResponse>> {
    // a body we cannot read is still just a failed login
    let Ok(Json(payload)) = payload else {
        return Err(AppError::Unauthorized);
    };
    let (token, user) = svc.login(&payload.email, &payload.password).await?;
    Ok(Json(AuthResponse {
        token,
        user: PublicUser::from(user),
    }))
}

#[instrument(skip(svc, payload))]
pub async fn update_user(
    State(svc): State<CredentialService>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(request) = payload?;
    let (Some(old_user), Some(updated_user)) = (request.old_user, request.updated_user) else {
        return Err(AppError::validation("Invalid request payload."));
    };

    let lookup = old_user.identity();
    svc.update_user(&lookup, &updated_user.into_update())
        .await
        .map_err(|e| {
            warn!(error = %e, "update rejected");
            e
        })?;

    info!("user profile updated");
    Ok(Json(MessageResponse::new("User data updated successfully!")))
}

#[instrument(skip(svc))]
pub async fn get_me(
    State(svc): State<CredentialService>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, Response> {
    let user = svc
        .profile(user_id)
        .await
        .map_err(IntoResponse::into_response)?;
    let Some(user) = user else {
        warn!(user_id = %user_id, "token for missing user");
        return Err((StatusCode::UNAUTHORIZED, "User not found").into_response());
    };
    Ok(Json(PublicUser::from(user)))
}
