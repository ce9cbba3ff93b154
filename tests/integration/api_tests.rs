//! API integration tests
//!
//! These run against a live server with its database:
//! `cargo test --test api_tests -- --ignored`

use reqwest::{multipart, Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api";

async fn create_equipment(client: &Client, name: &str, quantity: i32) -> String {
    let response = client
        .post(format!("{}/equipments", BASE_URL))
        .json(&json!({
            "name": name,
            "location": "Integration shelf",
            "quantity": quantity
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_str().expect("No id in response").to_string()
}

async fn delete_equipment(client: &Client, id: &str) {
    client
        .delete(format!("{}/equipments", BASE_URL))
        .json(&json!({ "items": [id] }))
        .send()
        .await
        .expect("Failed to send request");
}

async fn available(client: &Client, id: &str) -> i64 {
    let list: Value = client
        .get(format!("{}/equipments", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    list.as_array()
        .expect("Expected an array")
        .iter()
        .find(|e| e["id"] == id)
        .and_then(|e| e["available"].as_i64())
        .expect("Equipment missing from list")
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
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
#[ignore]
async fn test_checkout_and_checkin_round_trip() {
    let client = Client::new();
    let id = create_equipment(&client, "Integration drill", 5).await;

    let response = client
        .post(format!("{}/checkout", BASE_URL))
        .json(&json!({
            "userId": "it-user",
            "project": "Integration",
            "items": [{ "equipmentId": id, "quantity": 2 }]
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    assert_eq!(available(&client, &id).await, 3);

    let overdraw = client
        .post(format!("{}/checkout", BASE_URL))
        .json(&json!({
            "userId": "it-user",
            "project": "Integration",
            "items": [{ "equipmentId": id, "quantity": 4 }]
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(overdraw.status(), StatusCode::CONFLICT);

    let response = client
        .post(format!("{}/checkin", BASE_URL))
        .json(&json!({
            "userId": "it-user",
            "project": "Integration",
            "items": [{ "equipmentId": id, "quantity": 2 }]
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    assert_eq!(available(&client, &id).await, 5);

    let history: Value = client
        .get(format!("{}/history", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let rows: Vec<&Value> = history
        .as_array()
        .expect("Expected an array")
        .iter()
        .filter(|row| row["id"].as_str().is_some_and(|s| s.ends_with(&id)))
        .collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["activity"], "Check-In");

    delete_equipment(&client, &id).await;
}

#[tokio::test]
#[ignore]
async fn test_update_rejects_available_above_quantity() {
    let client = Client::new();
    let id = create_equipment(&client, "Integration saw", 5).await;

    let response = client
        .put(format!("{}/equipments", BASE_URL))
        .json(&json!({
            "id": id,
            "name": "Integration saw",
            "location": "Integration shelf",
            "quantity": 5,
            "available": 6,
            "unique": false
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    delete_equipment(&client, &id).await;
}

#[tokio::test]
#[ignore]
async fn test_image_upload_rejects_unsupported_type() {
    let client = Client::new();
    let id = create_equipment(&client, "Integration camera", 1).await;

    let part = multipart::Part::bytes(b"GIF89a".to_vec())
        .file_name("anim.gif")
        .mime_str("image/gif")
        .expect("Invalid mime type");
    let form = multipart::Form::new()
        .text("equipmentId", id.clone())
        .part("images", part);

    let response = client
        .post(format!("{}/equipments/images", BASE_URL))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    delete_equipment(&client, &id).await;
}

#[tokio::test]
#[ignore]
async fn test_unknown_image_is_not_found() {
    let client = Client::new();

    let response = client
        .get(format!(
            "{}/equipments/images/{}?type=thumbnail",
            BASE_URL, "00000000-0000-0000-0000-000000000000"
        ))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
