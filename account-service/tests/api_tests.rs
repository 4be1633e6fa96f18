mod common;

use auth::Claims;
use chrono::Duration;
use chrono::Utc;
use common::TestApp;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_root_reports_liveness() {
    let app = TestApp::spawn().await;

    let response = app.get("/").send().await.expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.expect("Failed to read body");
    assert!(body.contains("API is working"));
}

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/users/register")
        .json(&json!({
            "name": "Ann",
            "email": "a@x.com",
            "password": "secret123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "User registered!");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_register_missing_field() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/users/register")
        .json(&json!({
            "name": "Ann",
            "email": "a@x.com"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["message"].as_str().unwrap().contains("password"));
}

#[tokio::test]
async fn test_register_empty_field() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/users/register")
        .json(&json!({
            "name": "",
            "email": "a@x.com",
            "password": "secret123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_malformed_json() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/users/register")
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_duplicate_email_is_storage_error() {
    let app = TestApp::spawn().await;
    app.register("Ann", "a@x.com", "secret123").await;

    let response = app
        .post("/users/register")
        .json(&json!({
            "name": "Other Ann",
            "email": "a@x.com",
            "password": "another"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Internal server error");
}

#[tokio::test]
async fn test_register_then_login() {
    let app = TestApp::spawn().await;
    app.register("Ann", "a@x.com", "secret123").await;

    let response = app
        .post("/users/login")
        .json(&json!({
            "email": "a@x.com",
            "password": "secret123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["user"], json!({ "name": "Ann", "email": "a@x.com" }));
    assert!(!body.to_string().contains("password"));

    let claims = app
        .jwt_handler
        .decode(body["token"].as_str().unwrap())
        .expect("Issued token is invalid");
    assert_eq!(claims.exp - claims.iat, 60 * 60);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::spawn().await;
    app.register("Ann", "a@x.com", "secret123").await;

    let response = app
        .post("/users/login")
        .json(&json!({
            "email": "a@x.com",
            "password": "wrong_password"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_login_unknown_email() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/users/login")
        .json(&json!({
            "email": "nobody@x.com",
            "password": "secret123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_list_users() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login("Ann", "a@x.com", "secret123").await;
    app.register("Bob", "b@x.com", "hunter22").await;

    let response = app
        .get_authenticated("/users", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    let users = body.as_array().expect("Expected an array");
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["id"], 1);
    assert_eq!(users[0]["name"], "Ann");
    assert_eq!(users[1]["email"], "b@x.com");
    assert!(users[0]["created_at"].is_string());
    for user in users {
        assert!(user.get("password").is_none());
        assert!(user.get("password_hash").is_none());
    }
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::spawn().await;
    app.register("Ann", "a@x.com", "secret123").await;

    let list = app.get("/users").send().await.unwrap();
    let update = app
        .put("/users/1")
        .json(&json!({ "name": "Eve", "email": "e@x.com" }))
        .send()
        .await
        .unwrap();
    let update_bad_payload = app
        .put("/users/1")
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    let delete = app.delete("/users/1").send().await.unwrap();

    for response in [list, update, update_bad_payload, delete] {
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["message"], "Access denied: no token provided");
    }
}

#[tokio::test]
async fn test_invalid_token_is_forbidden() {
    let app = TestApp::spawn().await;

    let response = app
        .get_authenticated("/users", "not.a.token")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_expired_token_is_forbidden() {
    let app = TestApp::spawn().await;
    app.register("Ann", "a@x.com", "secret123").await;

    let past = Utc::now().timestamp() - 60;
    let claims = Claims::for_subject(1, Duration::hours(1))
        .unwrap()
        .with_issued_at(past - 3600)
        .with_expiration(past);
    let token = app.jwt_handler.encode(&claims).unwrap();

    let response = app
        .get_authenticated("/users", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_update_user() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login("Ann", "a@x.com", "secret123").await;

    let response = app
        .put_authenticated("/users/1", &token)
        .json(&json!({ "name": "Annie", "email": "annie@x.com" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "User updated successfully!");

    // The old email no longer logs in; the password is untouched.
    let response = app
        .post("/users/login")
        .json(&json!({ "email": "a@x.com", "password": "secret123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    app.login("annie@x.com", "secret123").await;
}

#[tokio::test]
async fn test_update_other_user_is_permitted() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login("Ann", "a@x.com", "secret123").await;
    app.register("Bob", "b@x.com", "hunter22").await;

    let response = app
        .put_authenticated("/users/2", &token)
        .json(&json!({ "name": "Robert", "email": "b@x.com" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_update_missing_user() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login("Ann", "a@x.com", "secret123").await;

    let response = app
        .put_authenticated("/users/999", &token)
        .json(&json!({ "name": "Ghost", "email": "g@x.com" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_missing_field() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login("Ann", "a@x.com", "secret123").await;

    let response = app
        .put_authenticated("/users/1", &token)
        .json(&json!({ "name": "Annie" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_user_id() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login("Ann", "a@x.com", "secret123").await;

    let response = app
        .delete_authenticated("/users/abc", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_user_then_list() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login("Ann", "a@x.com", "secret123").await;
    app.register("Bob", "b@x.com", "hunter22").await;

    let response = app
        .delete_authenticated("/users/2", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "User deleted successfully!");

    let body: serde_json::Value = app
        .get_authenticated("/users", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["name"], "Ann");
}

#[tokio::test]
async fn test_delete_missing_user() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login("Ann", "a@x.com", "secret123").await;

    let response = app
        .delete_authenticated("/users/999", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn test_token_outlives_deleted_account() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login("Ann", "a@x.com", "secret123").await;

    let response = app
        .delete_authenticated("/users/1", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Tokens are self-contained; there is no session to revoke.
    let response = app.get_authenticated("/users", &token).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_concurrent_registrations() {
    let app = TestApp::spawn().await;

    let requests = (0..8).map(|i| {
        app.post("/users/register")
            .json(&json!({
                "name": format!("user{}", i),
                "email": format!("user{}@x.com", i),
                "password": "secret123"
            }))
            .send()
    });

    for response in spawn_all(requests).await {
        assert_eq!(response.unwrap().status(), StatusCode::CREATED);
    }

    let token = app.login("user0@x.com", "secret123").await;
    let body: serde_json::Value = app
        .get_authenticated("/users", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body.as_array().unwrap().len(), 8);
}

async fn spawn_all<F: std::future::Future + Send + 'static>(
    futures: impl Iterator<Item = F>,
) -> Vec<F::Output>
where
    F::Output: Send + 'static,
{
    let handles: Vec<_> = futures.map(tokio::spawn).collect();
    let mut outputs = Vec::with_capacity(handles.len());
    for handle in handles {
        outputs.push(handle.await.expect("Task panicked"));
    }
    outputs
}
