//! End-to-end tests against a running server with a migrated database.
//!
//! Run with: cargo test -- --ignored
//! Expects the server started with
//! LOCALLIBRARY_AUTH__ADMIN_USERNAME=admin and
//! LOCALLIBRARY_AUTH__ADMIN_PASSWORD=adminpassword.

use chrono::{Duration, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080";

fn unique(prefix: &str) -> String {
    format!("{}{}", prefix, Utc::now().timestamp_micros())
}

async fn login(client: &Client, username: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/accounts/login", BASE_URL))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn admin_token(client: &Client) -> String {
    login(client, "admin", "adminpassword").await
}

/// Sign up a new member, create their profile and return (username, token)
async fn new_member(client: &Client) -> (String, String) {
    let username = unique("member");
    let response = client
        .post(format!("{}/accounts/signup", BASE_URL))
        .json(&json!({ "username": username, "password": "correct horse" }))
        .send()
        .await
        .expect("Failed to sign up");
    assert_eq!(response.status(), StatusCode::CREATED);

    let token = login(client, &username, "correct horse").await;
    let response = client
        .post(format!("{}/catalog/profiles", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "first_name": "Tenar" }))
        .send()
        .await
        .expect("Failed to create profile");
    assert_eq!(response.status(), StatusCode::CREATED);

    // Permissions are baked into the token: log in again to pick up the group
    let token = login(client, &username, "correct horse").await;
    (username, token)
}

async fn create_book(client: &Client, token: &str) -> Value {
    let response = client
        .post(format!("{}/catalog/authors", BASE_URL))
        .bearer_auth(token)
        .json(&json!({ "first_name": "Ursula", "last_name": unique("LeGuin") }))
        .send()
        .await
        .expect("Failed to create author");
    assert_eq!(response.status(), StatusCode::CREATED);
    let author: Value = response.json().await.unwrap();

    let isbn = format!("{:013}", Utc::now().timestamp_micros() % 10_000_000_000_000);
    let response = client
        .post(format!("{}/catalog/books", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "title": "A Wizard of Earthsea",
            "summary": "A young mage learns the cost of power",
            "pubdate": "1968-11-01",
            "isbn": isbn,
            "author_id": author["id"],
        }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

#[tokio::test]
#[ignore]
async fn test_ready() {
    let client = Client::new();
    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_catalog_summary() {
    let client = Client::new();
    let response = client
        .get(format!("{}/catalog/", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert!(body["num_books"].is_number());
    assert!(body["num_instances_available"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_book_slug_derived_from_title_and_author() {
    let client = Client::new();
    let token = admin_token(&client).await;
    let book = create_book(&client, &token).await;

    let slug = book["slug"].as_str().unwrap();
    assert!(slug.starts_with("a-wizard-of-earthsea-ursulaleguin"));

    let response = client
        .get(format!("{}/catalog/books/{}", BASE_URL, slug))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_book_with_copies_cannot_be_deleted() {
    let client = Client::new();
    let token = admin_token(&client).await;
    let book = create_book(&client, &token).await;
    let slug = book["slug"].as_str().unwrap();

    let response = client
        .post(format!("{}/catalog/books/{}/instances", BASE_URL, slug))
        .bearer_auth(&token)
        .json(&json!({ "imprint": "Parnassus Press, 1968", "status": "a" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .delete(format!("{}/catalog/books/{}", BASE_URL, slug))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore]
async fn test_loan_cycle() {
    let client = Client::new();
    let token = admin_token(&client).await;
    let (member, member_token) = new_member(&client).await;
    let book = create_book(&client, &token).await;
    let slug = book["slug"].as_str().unwrap();

    let response = client
        .post(format!("{}/catalog/books/{}/instances", BASE_URL, slug))
        .bearer_auth(&token)
        .json(&json!({ "imprint": "Parnassus Press, 1968", "status": "a" }))
        .send()
        .await
        .unwrap();
    let instance: Value = response.json().await.unwrap();
    let id = instance["id"].as_str().unwrap().to_string();

    // Members may not renew
    let due = Utc::now().date_naive() + Duration::days(14);
    let response = client
        .post(format!("{}/catalog/instances/{}/renew", BASE_URL, id))
        .bearer_auth(&member_token)
        .json(&json!({ "renewal_date": due, "borrower": member }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .post(format!("{}/catalog/instances/{}/renew", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({ "renewal_date": due, "borrower": member }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let lent: Value = response.json().await.unwrap();
    assert_eq!(lent["status"], "o");
    assert_eq!(lent["borrower_username"], member.as_str());

    let response = client
        .get(format!("{}/catalog/mybooks", BASE_URL))
        .bearer_auth(&member_token)
        .send()
        .await
        .unwrap();
    let mine: Vec<Value> = response.json().await.unwrap();
    assert!(mine.iter().any(|c| c["id"] == id.as_str()));

    let response = client
        .post(format!("{}/catalog/instances/{}/return", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let returned: Value = response.json().await.unwrap();
    assert_eq!(returned["status"], "a");
    assert!(returned["borrower_id"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_profile_delete_releases_loans() {
    let client = Client::new();
    let token = admin_token(&client).await;
    let (member, member_token) = new_member(&client).await;
    let book = create_book(&client, &token).await;
    let slug = book["slug"].as_str().unwrap();

    let response = client
        .post(format!("{}/catalog/books/{}/instances", BASE_URL, slug))
        .bearer_auth(&token)
        .json(&json!({ "imprint": "Ace, 1970", "status": "a" }))
        .send()
        .await
        .unwrap();
    let instance: Value = response.json().await.unwrap();
    let id = instance["id"].as_str().unwrap().to_string();

    client
        .post(format!("{}/catalog/instances/{}/renew", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({ "renewal_date": Utc::now().date_naive(), "borrower": member }))
        .send()
        .await
        .unwrap();

    let response = client
        .get(format!("{}/accounts/me", BASE_URL))
        .bearer_auth(&member_token)
        .send()
        .await
        .unwrap();
    let me: Value = response.json().await.unwrap();
    let profile_slug = me["profile_slug"].as_str().unwrap().to_string();

    let response = client
        .delete(format!("{}/catalog/profiles/{}", BASE_URL, profile_slug))
        .bearer_auth(&member_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .get(format!("{}/catalog/instances/{}", BASE_URL, id))
        .send()
        .await
        .unwrap();
    let copy: Value = response.json().await.unwrap();
    assert_eq!(copy["status"], "a");
    assert!(copy["borrower_id"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_superuser_promotes_librarian() {
    let client = Client::new();
    let token = admin_token(&client).await;
    let (member, member_token) = new_member(&client).await;

    let response = client
        .get(format!("{}/accounts/me", BASE_URL))
        .bearer_auth(&member_token)
        .send()
        .await
        .unwrap();
    let me: Value = response.json().await.unwrap();
    assert_eq!(me["groups"], json!(["Library Member"]));
    let user_id = me["id"].as_i64().unwrap();

    let response = client
        .put(format!("{}/accounts/users/{}/groups", BASE_URL, user_id))
        .bearer_auth(&token)
        .json(&json!({ "groups": ["Librarian", "Library Member"] }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let info: Value = response.json().await.unwrap();
    assert!(info["permissions"]
        .as_array()
        .unwrap()
        .contains(&json!("can_mark_returned")));

    // The old token still carries member permissions only
    let response = client
        .get(format!("{}/catalog/borrowed", BASE_URL))
        .bearer_auth(&member_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let librarian_token = login(&client, &member, "correct horse").await;
    let response = client
        .get(format!("{}/catalog/borrowed", BASE_URL))
        .bearer_auth(&librarian_token)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_book_slug_kept_on_rename() {
    let client = Client::new();
    let token = admin_token(&client).await;
    let book = create_book(&client, &token).await;
    let slug = book["slug"].as_str().unwrap().to_string();

    // New title and no author, slug omitted
    let response = client
        .put(format!("{}/catalog/books/{}", BASE_URL, slug))
        .bearer_auth(&token)
        .json(&json!({
            "title": "The Tombs of Atuan",
            "summary": book["summary"],
            "pubdate": book["pubdate"],
            "isbn": book["isbn"],
        }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["title"], "The Tombs of Atuan");
    assert_eq!(updated["slug"], slug.as_str());
    assert!(updated["author"].is_null());

    let response = client
        .get(format!("{}/catalog/books/{}", BASE_URL, slug))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let fetched: Value = response.json().await.unwrap();
    assert_eq!(fetched["title"], "The Tombs of Atuan");
}

#[tokio::test]
#[ignore]
async fn test_copy_borrower_must_own_profile() {
    let client = Client::new();
    let token = admin_token(&client).await;
    let book = create_book(&client, &token).await;
    let slug = book["slug"].as_str().unwrap();

    let response = client
        .post(format!("{}/accounts/signup", BASE_URL))
        .json(&json!({ "username": unique("visitor"), "password": "correct horse" }))
        .send()
        .await
        .unwrap();
    let visitor: Value = response.json().await.unwrap();

    let response = client
        .post(format!("{}/catalog/books/{}/instances", BASE_URL, slug))
        .bearer_auth(&token)
        .json(&json!({ "imprint": "Ace, 1970", "status": "a" }))
        .send()
        .await
        .unwrap();
    let instance: Value = response.json().await.unwrap();
    let id = instance["id"].as_str().unwrap();

    let response = client
        .put(format!("{}/catalog/instances/{}", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({
            "imprint": "Ace, 1970",
            "status": "o",
            "borrower_id": visitor["id"],
            "due_back": Utc::now().date_naive() + Duration::days(7),
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().starts_with("borrower_id:"));
}
