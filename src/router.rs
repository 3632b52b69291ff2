//! HTTP routing

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{api, AppState};

/// Mount point of every API route
pub const API_PREFIX: &str = "/api/v1";

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Home
        .route("/home", get(api::home::home))
        // Books
        .route("/books", get(api::books::list_books).post(api::books::create_book))
        .route(
            "/books/:id",
            get(api::books::get_book)
                .put(api::books::update_book)
                .delete(api::books::delete_book),
        )
        // Authors
        .route("/authors", get(api::authors::list_authors).post(api::authors::create_author))
        .route(
            "/authors/:id",
            get(api::authors::get_author)
                .put(api::authors::update_author)
                .delete(api::authors::delete_author),
        )
        // Genres
        .route("/genres", get(api::genres::list_genres).post(api::genres::create_genre))
        .route(
            "/genres/:id",
            get(api::genres::get_genre)
                .put(api::genres::update_genre)
                .delete(api::genres::delete_genre),
        )
        // Languages
        .route(
            "/languages",
            get(api::languages::list_languages).post(api::languages::create_language),
        )
        .route(
            "/languages/:id",
            get(api::languages::get_language)
                .put(api::languages::update_language)
                .delete(api::languages::delete_language),
        )
        // Copies
        .route("/instances", post(api::instances::create_instance))
        .route(
            "/instances/:id",
            get(api::instances::get_instance)
                .put(api::instances::update_instance)
                .delete(api::instances::delete_instance),
        )
        .route(
            "/instances/:id/renew",
            get(api::loans::get_renewal).post(api::loans::renew_instance),
        )
        // Loans
        .route("/loans", get(api::loans::all_loans))
        .route("/loans/mine", get(api::loans::my_loans))
        .with_state(state);

    Router::new()
        .nest(API_PREFIX, api_v1)
        .merge(api::openapi::create_openapi_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use chrono::{Duration, Utc};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::AppConfig,
        models::{Permission, UserClaims},
        repository::Repository,
        services::{session::RedisSessionStore, Services},
    };

    /// State whose pool and Redis client never connect unless used
    fn lazy_state() -> AppState {
        let config = AppConfig::default();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .unwrap();
        let store = RedisSessionStore::new(&config.redis.url, config.redis.session_ttl_seconds).unwrap();
        let services = Services::new(Repository::new(pool), config.catalog.clone(), Arc::new(store));
        AppState {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }

    fn token(state: &AppState, permissions: &[&str]) -> String {
        let now = Utc::now();
        UserClaims {
            sub: "patron".to_string(),
            user_id: 3,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        }
        .create_token(&state.config.auth.jwt_secret)
        .unwrap()
    }

    fn request(method: Method, uri: &str, bearer: Option<&str>, json: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        match json {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    const AUTHOR_JSON: &str = r#"{"first_name":"Ursula","last_name":"Le Guin"}"#;
    const BOOK_JSON: &str = r#"{"title":"The Dispossessed","author_id":1}"#;

    #[tokio::test]
    async fn health_needs_no_backend() {
        let app = create_router(lazy_state());
        let response = app
            .oneshot(request(Method::GET, "/api/v1/health", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn catalog_mutations_without_token_are_unauthorized() {
        let state = lazy_state();
        let cases = [
            (Method::POST, "/api/v1/authors", Some(AUTHOR_JSON)),
            (Method::DELETE, "/api/v1/authors/1", None),
            (Method::POST, "/api/v1/books", Some(BOOK_JSON)),
            (Method::GET, "/api/v1/loans/mine", None),
        ];

        for (method, uri, body) in cases {
            let response = create_router(state.clone())
                .oneshot(request(method.clone(), uri, None, body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        }
    }

    #[tokio::test]
    async fn catalog_mutations_without_permission_are_forbidden() {
        let state = lazy_state();
        let patron = token(&state, &[]);
        let copy = uuid::Uuid::new_v4();
        let renew_uri = format!("/api/v1/instances/{}/renew", copy);
        let cases = [
            (Method::POST, "/api/v1/authors".to_string(), Some(AUTHOR_JSON)),
            (Method::PUT, "/api/v1/authors/1".to_string(), Some(AUTHOR_JSON)),
            (Method::DELETE, "/api/v1/authors/1".to_string(), None),
            (Method::POST, "/api/v1/books".to_string(), Some(BOOK_JSON)),
            (Method::PUT, "/api/v1/books/1".to_string(), Some(BOOK_JSON)),
            (Method::DELETE, "/api/v1/books/1".to_string(), None),
            (Method::GET, "/api/v1/loans".to_string(), None),
            (Method::GET, renew_uri.clone(), None),
            (Method::POST, renew_uri, Some("{}")),
        ];

        for (method, uri, body) in cases {
            let response = create_router(state.clone())
                .oneshot(request(method.clone(), &uri, Some(&patron), body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{} {}", method, uri);
        }
    }

    #[tokio::test]
    async fn permission_is_checked_before_the_body_is_parsed() {
        let state = lazy_state();
        let patron = token(&state, &[]);
        let cases = [
            (Method::POST, "/api/v1/authors", Some(r#"{"first_name":1}"#)),
            (Method::PUT, "/api/v1/books/1", Some("not json")),
            (Method::POST, "/api/v1/authors", None),
            (Method::POST, "/api/v1/instances", Some("[]")),
            (Method::PUT, "/api/v1/genres/1", Some("{")),
        ];

        for (method, uri, body) in cases {
            let response = create_router(state.clone())
                .oneshot(request(method.clone(), uri, Some(&patron), body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{} {}", method, uri);
        }
    }

    #[tokio::test]
    async fn malformed_body_from_librarian_uses_error_format() {
        let state = lazy_state();
        let librarian = token(&state, &[Permission::ManageCatalog.as_str()]);
        let cases = [
            (Method::POST, "/api/v1/authors", Some(r#"{"first_name":1}"#)),
            (Method::PUT, "/api/v1/books/1", Some("not json")),
            (Method::POST, "/api/v1/authors", None),
        ];

        for (method, uri, body) in cases {
            let response = create_router(state.clone())
                .oneshot(request(method.clone(), uri, Some(&librarian), body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{} {}", method, uri);

            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body["error"], "BadValue");
            assert_eq!(body["code"], 5);
            assert!(body["message"].is_string());
        }
    }

    #[tokio::test]
    async fn forbidden_body_reports_permission_denied() {
        let state = lazy_state();
        let patron = token(&state, &["catalog.other"]);
        let response = create_router(state)
            .oneshot(request(Method::DELETE, "/api/v1/books/1", Some(&patron), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "PermissionDenied");
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains(Permission::ManageCatalog.as_str()));
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_rejected() {
        let state = lazy_state();
        let now = Utc::now();
        let forged = UserClaims {
            sub: "mallory".to_string(),
            user_id: 9,
            permissions: vec![Permission::ManageCatalog.to_string()],
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        }
        .create_token("not-the-server-secret")
        .unwrap();

        let response = create_router(state)
            .oneshot(request(Method::DELETE, "/api/v1/books/1", Some(&forged), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
