//! HTTP tests for user creation, listing and search.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use ostaa_core::{SearchMode, User};
use ostaa_integration_tests::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_add_user_then_list_returns_same_password() {
    let app = TestApp::new();

    let res = app
        .post_json("/add/user", &json!({"username": "alice", "password": "secret"}))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.text(), "User added successfully");

    let res = app.get("/get/users/").await;
    assert_eq!(res.status, StatusCode::OK);
    let users: Vec<User> = res.json();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "alice");
    assert_eq!(users[0].password, "secret");
    assert!(users[0].listings.is_empty());
    assert!(users[0].purchases.is_empty());
}

#[tokio::test]
async fn test_add_user_accepts_url_encoded_form() {
    let app = TestApp::new();

    let res = app
        .post_form("/add/user", "username=carol&password=p%40ss")
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let users = app.market().list_users().await.unwrap();
    assert_eq!(users[0].username, "carol");
    assert_eq!(users[0].password, "p@ss");
}

#[tokio::test]
async fn test_add_user_missing_field_is_rejected() {
    let app = TestApp::new();

    let res = app.post_json("/add/user", &json!({"username": "alice"})).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .post_json("/add/user", &json!({"username": "", "password": "x"}))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json();
    assert!(body["error"].as_str().unwrap().contains("username"));

    assert!(app.market().list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_usernames_are_not_rejected() {
    let app = TestApp::new();
    let body = json!({"username": "alice", "password": "one"});

    assert_eq!(app.post_json("/add/user", &body).await.status, StatusCode::OK);
    assert_eq!(app.post_json("/add/user", &body).await.status, StatusCode::OK);

    let users: Vec<User> = app.get("/get/users").await.json();
    assert_eq!(users.len(), 2);
}

#[tokio::test]
async fn test_search_users_is_case_insensitive_substring() {
    let app = TestApp::new();
    for name in ["alice", "Malice", "bob"] {
        app.market().create_user(name, "pw").await.unwrap();
    }

    let res = app.get("/search/users/LIC").await;
    assert_eq!(res.status, StatusCode::OK);
    let users: Vec<User> = res.json();
    let mut names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["Malice", "alice"]);
}

#[tokio::test]
async fn test_search_users_without_match_is_empty_array() {
    let app = TestApp::new();
    app.market().create_user("alice", "pw").await.unwrap();

    let res = app.get("/search/users/zed").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.text(), "[]");
}

#[tokio::test]
async fn test_search_users_escapes_metacharacters_by_default() {
    let app = TestApp::new();
    app.market().create_user("alice", "pw").await.unwrap();
    app.market().create_user("a.b", "pw").await.unwrap();

    let users: Vec<User> = app.get("/search/users/a.b").await.json();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "a.b");

    let users: Vec<User> = app.get("/search/users/.*").await.json();
    assert!(users.is_empty());
}

#[tokio::test]
async fn test_search_users_pattern_mode() {
    let app = TestApp::with_search_mode(SearchMode::Pattern);
    app.market().create_user("alice", "pw").await.unwrap();
    app.market().create_user("bob", "pw").await.unwrap();

    let users: Vec<User> = app.get("/search/users/.*").await.json();
    assert_eq!(users.len(), 2);

    let res = app.get("/search/users/(").await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
}
