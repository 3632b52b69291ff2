//! API integration tests against a running server
//!
//! Start the server with its database and Redis, then run
//! `cargo test -- --ignored`. Tokens are signed with `JWT_SECRET`
//! (or the default secret) so both sides must agree on it. Borrowers are
//! inserted directly through `DATABASE_URL` since the API does not manage
//! users.

use catalog_server::{
    config::AppConfig,
    models::{Permission, UserClaims},
};
use chrono::{Duration, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn token(permissions: &[Permission]) -> String {
    token_for(1, permissions)
}

fn token_for(user_id: i32, permissions: &[Permission]) -> String {
    let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| AppConfig::default().auth.jwt_secret);
    let now = Utc::now();
    UserClaims {
        sub: "integration".to_string(),
        user_id,
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
        exp: (now + Duration::hours(1)).timestamp(),
        iat: now.timestamp(),
    }
    .create_token(&secret)
    .expect("Failed to sign token")
}

fn librarian() -> String {
    token(&[Permission::ManageCatalog])
}

async fn create(client: &Client, path: &str, body: Value) -> Value {
    let response = client
        .post(format!("{}{}", BASE_URL, path))
        .bearer_auth(librarian())
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED, "POST {}", path);
    assert!(response.headers().contains_key("location"));
    response.json().await.expect("Failed to parse response")
}

async fn create_copy(client: &Client, book_id: i64, due_back: Option<String>) -> String {
    create_copy_with(client, book_id, due_back, "on_loan", None).await
}

async fn create_copy_with(
    client: &Client,
    book_id: i64,
    due_back: Option<String>,
    status: &str,
    borrower_id: Option<i32>,
) -> String {
    let copy = create(
        client,
        "/instances",
        json!({
            "book_id": book_id,
            "imprint": "Integration Press, 2024",
            "status": status,
            "due_back": due_back,
            "borrower_id": borrower_id,
        }),
    )
    .await;
    copy["id"].as_str().expect("copy id").to_string()
}

/// Insert a borrower and return its id
async fn create_user(username_prefix: &str) -> i32 {
    let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| AppConfig::default().database.url);
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await
        .expect("Failed to connect to database");

    sqlx::query_scalar("INSERT INTO users (username) VALUES ($1) RETURNING id")
        .bind(format!("{}-{}", username_prefix, uuid::Uuid::new_v4()))
        .fetch_one(&pool)
        .await
        .expect("Failed to insert user")
}

fn copy_ids_of_book(page: &Value, book_id: i64) -> Vec<String> {
    page["items"]
        .as_array()
        .expect("items")
        .iter()
        .filter(|item| item["book_id"].as_i64() == Some(book_id))
        .filter_map(|item| item["id"].as_str().map(str::to_string))
        .collect()
}

fn in_days(days: i64) -> String {
    (Utc::now().date_naive() + Duration::days(days)).to_string()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_home_counts_visits_per_session() {
    let client = Client::new();

    let first = client
        .get(format!("{}/home", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(first.status().is_success());
    let session = first
        .headers()
        .get("x-session-id")
        .and_then(|v| v.to_str().ok())
        .expect("session header")
        .to_string();
    let body: Value = first.json().await.expect("Failed to parse response");
    assert_eq!(body["num_visits"], 0);
    assert!(body["num_books"].is_i64());

    let second: Value = client
        .get(format!("{}/home", BASE_URL))
        .header("x-session-id", &session)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(second["num_visits"], 1);
}

#[tokio::test]
#[ignore]
async fn test_deleting_author_keeps_book() {
    let client = Client::new();

    let author = create(
        &client,
        "/authors",
        json!({ "first_name": "Octavia", "last_name": "Butler", "date_of_birth": "1947-06-22" }),
    )
    .await;
    let author_id = author["id"].as_i64().unwrap();
    assert!(author["date_of_death"].is_null());

    let book = create(
        &client,
        "/books",
        json!({ "title": "Kindred", "author_id": author_id, "isbn": "9780807083697" }),
    )
    .await;
    let book_id = book["id"].as_i64().unwrap();

    let response = client
        .delete(format!("{}/authors/{}", BASE_URL, author_id))
        .bearer_auth(librarian())
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let detail: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(detail["book"]["title"], "Kindred");
    assert!(detail["book"]["author_id"].is_null());
    assert!(detail["author"].is_null());

    let missing = client
        .get(format!("{}/authors/{}", BASE_URL, author_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_patron_cannot_create_author() {
    let client = Client::new();

    let response = client
        .post(format!("{}/authors", BASE_URL))
        .bearer_auth(token(&[]))
        .json(&json!({ "first_name": "A", "last_name": "B" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_renewal_window() {
    let client = Client::new();

    let book = create(&client, "/books", json!({ "title": "The Left Hand of Darkness" })).await;
    let copy = create_copy(&client, book["id"].as_i64().unwrap(), Some(in_days(-10))).await;
    let renew_url = format!("{}/instances/{}/renew", BASE_URL, copy);

    let proposal: Value = client
        .get(&renew_url)
        .bearer_auth(librarian())
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(proposal["proposed_renewal_date"], in_days(21));
    assert_eq!(proposal["instance"]["is_overdue"], true);

    for rejected in [in_days(-1), in_days(29)] {
        let response = client
            .post(&renew_url)
            .bearer_auth(librarian())
            .json(&json!({ "renewal_date": rejected }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["field"], "renewal_date");
    }

    let response = client
        .post(&renew_url)
        .bearer_auth(librarian())
        .json(&json!({ "renewal_date": in_days(28) }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["instance"]["due_back"], in_days(28));
    assert_eq!(body["instance"]["is_overdue"], false);
    assert_eq!(body["redirect_to"], "/api/v1/loans");
}

#[tokio::test]
#[ignore]
async fn test_all_loans_soonest_due_first() {
    let client = Client::new();

    let book = create(&client, "/books", json!({ "title": "Parable of the Sower" })).await;
    let book_id = book["id"].as_i64().unwrap();
    let later = create_copy(&client, book_id, Some(in_days(5))).await;
    let undated = create_copy(&client, book_id, None).await;
    let sooner = create_copy(&client, book_id, Some(in_days(1))).await;
    for status in ["maintenance", "available", "reserved"] {
        create_copy_with(&client, book_id, Some(in_days(-3)), status, None).await;
    }

    let page: Value = client
        .get(format!("{}/loans?per_page=100", BASE_URL))
        .bearer_auth(librarian())
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert!(page["items"]
        .as_array()
        .expect("items")
        .iter()
        .all(|item| item["status"] == "on_loan"));
    let ours = copy_ids_of_book(&page, book_id);
    assert_eq!(ours, vec![undated, sooner, later]);

    let response = client
        .get(format!("{}/loans", BASE_URL))
        .bearer_auth(token(&[]))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_my_loans_only_lists_own_copies() {
    let client = Client::new();

    let reader = create_user("reader").await;
    let other = create_user("other").await;

    let book = create(&client, "/books", json!({ "title": "A Wizard of Earthsea" })).await;
    let book_id = book["id"].as_i64().unwrap();
    let mine_later = create_copy_with(&client, book_id, Some(in_days(9)), "on_loan", Some(reader)).await;
    let mine_sooner = create_copy_with(&client, book_id, Some(in_days(2)), "on_loan", Some(reader)).await;
    create_copy_with(&client, book_id, Some(in_days(1)), "on_loan", Some(other)).await;
    create_copy_with(&client, book_id, Some(in_days(1)), "reserved", Some(reader)).await;

    let response = client
        .get(format!("{}/loans/mine?per_page=100", BASE_URL))
        .bearer_auth(token_for(reader, &[]))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let page: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(page["total"], 2);
    assert!(page["items"]
        .as_array()
        .expect("items")
        .iter()
        .all(|item| item["borrower_id"].as_i64() == Some(reader as i64)));
    assert_eq!(copy_ids_of_book(&page, book_id), vec![mine_sooner, mine_later]);

    let anonymous = client
        .get(format!("{}/loans/mine", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_book_list_is_paged_by_two() {
    let client = Client::new();

    let page: Value = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(page["per_page"], 2);
    assert!(page["items"].as_array().expect("items").len() <= 2);
}
