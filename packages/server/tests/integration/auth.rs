use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn login_issues_token_for_current_user() {
    let app = TestApp::spawn().await;
    let id = app
        .create_user("alice", "alice@example.com", "password123")
        .await;

    let res = app
        .post_json(
            routes::LOGIN,
            &json!({ "email": "alice@example.com", "password": "password123" }),
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.body["data"]["token_type"], "Bearer");
    assert_eq!(res.body["data"]["user"]["id"], id);
    assert!(res.body["data"]["user"].get("password").is_none());

    let token = res.body["data"]["token"].as_str().unwrap();
    let me = app.get_with_token(routes::ME, token).await;
    assert_eq!(me.status, 200, "{}", me.text);
    assert_eq!(me.body["id"], id);
    assert_eq!(me.body["email"], "alice@example.com");
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = TestApp::spawn().await;
    app.create_user("alice", "alice@example.com", "password123")
        .await;

    let res = app
        .post_json(
            routes::LOGIN,
            &json!({ "email": "alice@example.com", "password": "wrong-password" }),
        )
        .await;

    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn unknown_email_is_rejected_the_same_way() {
    let app = TestApp::spawn().await;

    let res = app
        .post_json(
            routes::LOGIN,
            &json!({ "email": "nobody@example.com", "password": "password123" }),
        )
        .await;

    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn login_requires_fields() {
    let app = TestApp::spawn().await;

    let res = app.post_json(routes::LOGIN, &json!({})).await;

    assert_eq!(res.status, 422);
    assert_eq!(res.body["email"][0], "The email field is required.");
    assert_eq!(res.body["password"][0], "The password field is required.");
}

#[tokio::test]
async fn current_user_requires_token() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::ME).await;
    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "TOKEN_MISSING");

    let res = app.get_with_token(routes::ME, "not-a-jwt").await;
    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "TOKEN_INVALID");
}

#[tokio::test]
async fn token_of_deleted_user_is_invalid() {
    let app = TestApp::spawn().await;
    let id = app
        .create_user("alice", "alice@example.com", "password123")
        .await;
    let token = app.login("alice@example.com", "password123").await;

    app.delete(&routes::user(id)).await;

    let res = app.get_with_token(routes::ME, &token).await;
    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "TOKEN_INVALID");
}

#[tokio::test]
async fn token_signed_with_other_secret_is_invalid() {
    let app = TestApp::spawn().await;
    let token = warta_server::utils::jwt::sign(1, "x@example.com", "other-secret", 1).unwrap();

    let res = app.get_with_token(routes::ME, &token).await;

    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "TOKEN_INVALID");
}
