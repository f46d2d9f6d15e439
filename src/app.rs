use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::state::AppState;
use crate::{auth, listings};

fn cors_layer(config: &AppConfig) -> anyhow::Result<CorsLayer> {
    let Some(origin) = config.cors_allowed_origin.as_deref() else {
        return Ok(CorsLayer::permissive());
    };
    let origin: HeaderValue = origin
        .parse()
        .with_context(|| format!("invalid CORS_ALLOWED_ORIGIN {origin:?}"))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true))
}

pub fn build_app(state: AppState) -> anyhow::Result<Router> {
    let cors = cors_layer(&state.config)?;
    Ok(Router::new()
        .nest(
            "/api/v1",
            Router::new()
                .merge(auth::router())
                .merge(listings::router())
                .route("/health", get(|| async { "ok" })),
        )
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        ))
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::store::MemoryStore;

    fn app() -> (Router, Arc<MemoryStore>) {
        let (state, store) = AppState::fake();
        (build_app(state).unwrap(), store)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, String) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header(CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn registration() -> Value {
        json!({
            "username": "ana",
            "email": "ana@example.com",
            "firstName": "Ana",
            "lastName": "Novak",
            "region": "Gorenjska",
            "country": "SI",
            "postalCode": "4000",
            "street": "Glavna",
            "houseNumber": "12a",
            "dateOfBirth": "01.02.1990",
            "phoneNumber": "041000000",
            "password": "pa55word",
            "confirmPassword": "pa55word"
        })
    }

    fn listing(brand: &str, price: i32, owner: &str) -> Value {
        json!({
            "brand": brand,
            "model": "Octavia",
            "price": price,
            "year": 2018,
            "fuel": "diesel",
            "owner": owner
        })
    }

    #[tokio::test]
    async fn health() {
        let (app, _) = app();
        let (status, body) = send(&app, Method::GET, "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn register_login_and_me() {
        let (app, store) = app();

        let (status, _) = send(&app, Method::POST, "/api/v1/register", Some(registration())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(store.user_count().await, 1);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/login",
            Some(json!({ "email": "ana@example.com", "password": "pa55word" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["user"]["firstName"], "Ana");
        assert_eq!(body["user"]["houseNumber"], "12a");
        assert!(body["user"].get("passwordHash").is_none());
        let token = body["token"].as_str().unwrap().to_string();

        let req = Request::builder()
            .uri("/api/v1/me")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let (status, _) = send(&app, Method::GET, "/api/v1/me", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn register_rejects_mismatched_passwords() {
        let (app, store) = app();
        let mut body = registration();
        body["confirmPassword"] = json!("different");

        let (status, _) = send(&app, Method::POST, "/api/v1/register", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(store.user_count().await, 0);
    }

    #[tokio::test]
    async fn login_failures_look_the_same() {
        let (app, _) = app();
        send(&app, Method::POST, "/api/v1/register", Some(registration())).await;

        let wrong = send(
            &app,
            Method::POST,
            "/api/v1/login",
            Some(json!({ "email": "ana@example.com", "password": "bad" })),
        )
        .await;
        let unknown = send(
            &app,
            Method::POST,
            "/api/v1/login",
            Some(json!({ "email": "nobody@example.com", "password": "pa55word" })),
        )
        .await;

        assert_eq!(wrong.0, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong, unknown);
    }

    #[tokio::test]
    async fn update_user_flow() {
        let (app, _) = app();
        send(&app, Method::POST, "/api/v1/register", Some(registration())).await;

        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/v1/update",
            Some(json!({ "oldUser": { "email": "ana@example.com" } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/v1/update",
            Some(json!({
                "oldUser": { "email": "ana@example.com", "firstName": "Ana", "lastName": "Kos" },
                "updatedUser": { "email": "ana@new.si", "firstName": "Ana", "lastName": "Kos" }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/v1/update",
            Some(json!({
                "oldUser": { "email": "ana@example.com", "firstName": "Ana", "lastName": "Novak" },
                "updatedUser": { "email": "ana@new.si", "firstName": "Ana", "lastName": "Kos", "street": "Nova" }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // password survives the update, email moved
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/login",
            Some(json!({ "email": "ana@new.si", "password": "pa55word" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["user"]["lastName"], "Kos");
        assert_eq!(body["user"]["street"], "Nova");
        assert_eq!(body["user"]["username"], "ana");
    }

    #[tokio::test]
    async fn listings_filter_and_sort() {
        let (app, store) = app();
        for (brand, price) in [("a", 10000), ("b", 5000), ("c", 20000), ("d", 5000)] {
            let (status, _) =
                send(&app, Method::POST, "/api/v1/listings", Some(listing(brand, price, "jan"))).await;
            assert_eq!(status, StatusCode::OK);
        }
        assert_eq!(store.listing_count().await, 4);

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/v1/listings?minPrice=5000&maxPrice=15000",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let rows: Vec<Value> = serde_json::from_str(&body).unwrap();
        let brands: Vec<&str> = rows.iter().map(|r| r["brand"].as_str().unwrap()).collect();
        assert_eq!(brands, vec!["b", "d", "a"]);

        let (_, body) = send(&app, Method::GET, "/api/v1/listings?brand=&fuel=diesel", None).await;
        let rows: Vec<Value> = serde_json::from_str(&body).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[3]["price"], 20000);
        assert_eq!(rows[0]["color"], "");

        let (status, _) = send(&app, Method::GET, "/api/v1/listings?minPrice=cheap", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn blank_numeric_filters_return_everything() {
        let (app, _) = app();
        for (brand, price) in [("a", 300), ("b", 100)] {
            send(&app, Method::POST, "/api/v1/listings", Some(listing(brand, price, "jan"))).await;
        }

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/v1/listings?brand=&minPrice=&maxPrice=&maxYear=",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let rows: Vec<Value> = serde_json::from_str(&body).unwrap();
        let brands: Vec<&str> = rows.iter().map(|r| r["brand"].as_str().unwrap()).collect();
        assert_eq!(brands, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn empty_listing_is_accepted() {
        let (app, store) = app();
        let (status, _) = send(&app, Method::POST, "/api/v1/listings", Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(store.listing_count().await, 1);
    }

    #[tokio::test]
    async fn delete_listing_by_composite_key() {
        let (app, _) = app();
        send(&app, Method::POST, "/api/v1/listings", Some(listing("Skoda", 7000, "eva"))).await;
        let key = json!({
            "brand": "Skoda", "model": "Octavia", "price": 7000, "year": 2018, "owner": "eva"
        });

        let (status, _) = send(
            &app,
            Method::DELETE,
            "/api/v1/listings",
            Some(json!({ "brand": "Skoda", "model": "Octavia", "price": 7000, "year": 2018, "owner": "ana" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, "/api/v1/listings", Some(key.clone())).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, Method::DELETE, "/api/v1/listings", Some(key)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_cors_origin_fails_startup() {
        let mut config = AppConfig::for_tests();
        config.cors_allowed_origin = Some("http://bad\norigin".into());
        assert!(cors_layer(&config).is_err());

        config.cors_allowed_origin = Some("http://localhost:4200".into());
        assert!(cors_layer(&config).is_ok());
    }
}
