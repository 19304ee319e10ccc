use blog_api::{AppConfig, AppState, InMemoryRepository, RepositoryState, create_router};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
}

/// Serves the full router over the seeded in-memory store on a random port.
async fn spawn_app() -> TestApp {
    let repo = Arc::new(InMemoryRepository::with_fixtures()) as RepositoryState;
    let config = AppConfig::default();

    let state = AppState { repo, config };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address }
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let response = client
        .get(&format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_tag_creation_scenarios() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let url = format!("{}/tag", app.address);

    // New name
    let response = client
        .post(&url)
        .json(&json!({"name": "fancyTag"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({"status": true, "data": {"id": 104, "name": "fancyTag"}})
    );

    // Missing name
    let response = client.post(&url).json(&json!({})).send().await.unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], json!(false));
    assert_eq!(
        body["message"],
        json!(["This value should not be blank. [name]"])
    );

    // Existing name
    let response = client
        .post(&url)
        .json(&json!({"name": "fancyTag"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["message"],
        json!(["This value is already used. [name]"])
    );

    let list: Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(list["data"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_comment_delete_scenarios() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let url = format!("{}/comment/1001", app.address);

    // Unauthenticated
    let response = client.delete(&url).send().await.unwrap();
    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"status": false, "message": null}));

    // Authenticated as johndoe, who did not write it
    let response = client
        .delete(&url)
        .header("x-user-id", "3")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    // The creator
    let response = client
        .delete(&url)
        .header("x-user-id", "1")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);
    assert!(response.bytes().await.unwrap().is_empty());

    let response = client.get(&url).send().await.unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_patch_post_replaces_tag_set() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let url = format!("{}/post/10", app.address);

    let response = client
        .patch(&url)
        .header("x-user-id", "1")
        .json(&json!({"tags": [{"id": 102}, {"id": 103}]}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["id"], json!(10));
    assert_eq!(body["data"]["title"], json!("First steps"));
    assert_eq!(
        body["data"]["tags"],
        json!([{"id": 102, "name": "rust"}, {"id": 103, "name": "news"}])
    );
    assert!(body["data"].get("createdBy").is_none());

    // Persisted, and still visible with its comments.
    let shown: Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(shown["data"]["tags"][1]["name"], json!("news"));
    assert_eq!(shown["data"]["comments"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_patch_post_with_unknown_tag_is_bad_request() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .patch(&format!("{}/post/10", app.address))
        .header("x-user-id", "1")
        .json(&json!({"tags": [{"id": 999}]}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], json!("Tag is not found [999]."));
}

#[tokio::test]
async fn test_post_lifecycle() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    // Create as johnsmith
    let response = client
        .post(&format!("{}/post", app.address))
        .header("x-user-id", "2")
        .json(&json!({"title": "Lifecycle", "content": "Body", "tags": [{"id": 102}]}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.unwrap();
    let id = created["data"]["id"].as_i64().unwrap();
    assert_eq!(id, 12);

    // Comment as johndoe
    let response = client
        .post(&format!("{}/post/{}/comment", app.address, id))
        .header("x-user-id", "3")
        .json(&json!({"content": "First!"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let comment: Value = response.json().await.unwrap();
    assert_eq!(comment["data"]["postId"], json!(id));
    let comment_id = comment["data"]["id"].as_i64().unwrap();

    let listed: Value = client
        .get(&format!("{}/post/{}/comment", app.address, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed["data"][0]["createdBy"]["username"], json!("johndoe"));

    // Delete the post; its comment goes with it.
    let response = client
        .delete(&format!("{}/post/{}", app.address, id))
        .header("x-user-id", "2")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let response = client
        .get(&format!("{}/comment/{}", app.address, comment_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["message"],
        json!(format!("Comment is not found [{}].", comment_id))
    );
}

#[tokio::test]
async fn test_non_numeric_id_is_bare_not_found() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/post/abc", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    assert!(response.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/tag", app.address))
        .header("content-type", "application/json")
        .body("{\"name\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"status": false, "message": "Can not create a tag."}));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/api-docs/openapi.json", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let doc: Value = response.json().await.unwrap();
    assert!(doc["paths"].get("/post/{id}").is_some());
}
