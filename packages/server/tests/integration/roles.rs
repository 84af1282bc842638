use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn create_role_returns_envelope() {
    let app = TestApp::spawn().await;

    let res = app.post_json(routes::ROLES, &json!({ "name": "editor" })).await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.body["message"], "Role created successfully");
    assert_eq!(res.body["data"]["id"], 1);
    assert_eq!(res.body["data"]["name"], "editor");
    assert!(res.body["data"]["created_at"].is_string());
    assert!(res.body["data"]["updated_at"].is_string());
}

#[tokio::test]
async fn create_role_without_name_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app.post_json(routes::ROLES, &json!({})).await;

    assert_eq!(res.status, 422, "{}", res.text);
    assert_eq!(res.body["name"][0], "The name field is required.");

    let list = app.get(routes::ROLES).await;
    assert_eq!(list.body["data"]["total"], 0);
}

#[tokio::test]
async fn role_name_longer_than_255_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app
        .post_json(routes::ROLES, &json!({ "name": "r".repeat(256) }))
        .await;

    assert_eq!(res.status, 422);
    assert_eq!(
        res.body["name"][0],
        "The name field must not be greater than 255 characters."
    );
}

#[tokio::test]
async fn create_role_from_urlencoded_form() {
    let app = TestApp::spawn().await;

    let res = app.post_form(routes::ROLES, &[("name", "  admin  ")]).await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["data"]["name"], "admin");
}

#[tokio::test]
async fn list_roles_paginates_newest_first() {
    let app = TestApp::spawn().await;
    for i in 0..10 {
        let res = app
            .post_json(routes::ROLES, &json!({ "name": format!("role-{i}") }))
            .await;
        assert_eq!(res.status, 201);
    }

    let first = app.get(routes::ROLES).await;
    assert_eq!(first.status, 200);
    assert_eq!(first.body["message"], "List Data Roles");
    let page = &first.body["data"];
    assert_eq!(page["data"].as_array().unwrap().len(), 8);
    assert_eq!(page["data"][0]["name"], "role-9");
    assert_eq!(page["data"][7]["name"], "role-2");
    assert_eq!(page["total"], 10);
    assert_eq!(page["per_page"], 8);
    assert_eq!(page["current_page"], 1);
    assert_eq!(page["last_page"], 2);
    assert_eq!(page["from"], 1);
    assert_eq!(page["to"], 8);
    assert_eq!(page["next_page_url"], "/api/roles?page=2");
    assert!(page["prev_page_url"].is_null());

    let second = app.get(&format!("{}?page=2", routes::ROLES)).await;
    let page = &second.body["data"];
    assert_eq!(page["data"].as_array().unwrap().len(), 2);
    assert_eq!(page["data"][0]["name"], "role-1");
    assert_eq!(page["data"][1]["name"], "role-0");
    assert_eq!(page["from"], 9);
    assert_eq!(page["to"], 10);
    assert!(page["next_page_url"].is_null());
}

#[tokio::test]
async fn invalid_page_falls_back_to_first() {
    let app = TestApp::spawn().await;
    app.post_json(routes::ROLES, &json!({ "name": "only" })).await;

    let res = app.get(&format!("{}?page=abc", routes::ROLES)).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["data"]["current_page"], 1);
    assert_eq!(res.body["data"]["data"][0]["name"], "only");
}

#[tokio::test]
async fn huge_page_number_returns_an_empty_page() {
    let app = TestApp::spawn().await;
    app.post_json(routes::ROLES, &json!({ "name": "only" })).await;

    for page in ["18446744073709551615", "99999999999999999999999"] {
        let res = app.get(&format!("{}?page={page}", routes::ROLES)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["success"], true);
        assert_eq!(res.body["data"]["total"], 1);
        assert_eq!(res.body["data"]["data"], json!([]));
        assert!(res.body["data"]["from"].is_null());
        assert!(res.body["data"]["next_page_url"].is_null());
    }
}

#[tokio::test]
async fn get_update_delete_role() {
    let app = TestApp::spawn().await;
    let created = app.post_json(routes::ROLES, &json!({ "name": "editor" })).await;
    let id = created.body["data"]["id"].as_i64().unwrap();

    let shown = app.get(&routes::role(id)).await;
    assert_eq!(shown.status, 200);
    assert_eq!(shown.body["message"], "Role Detail!");
    assert_eq!(shown.body["data"], created.body["data"]);

    let updated = app
        .put_json(&routes::role(id), &json!({ "name": "author" }))
        .await;
    assert_eq!(updated.status, 200, "{}", updated.text);
    assert_eq!(updated.body["message"], "Role updated successfully");
    assert_eq!(updated.body["data"]["name"], "author");

    let patched = app
        .patch_json(&routes::role(id), &json!({ "name": "writer" }))
        .await;
    assert_eq!(patched.status, 200);
    assert_eq!(patched.body["data"]["name"], "writer");

    let deleted = app.delete(&routes::role(id)).await;
    assert_eq!(deleted.status, 200);
    assert_eq!(deleted.body["success"], true);
    assert_eq!(deleted.body["message"], "Role deleted successfully");
    assert!(deleted.body["data"].is_null());

    let gone = app.get(&routes::role(id)).await;
    assert_eq!(gone.status, 404);
}

#[tokio::test]
async fn missing_role_is_not_found() {
    let app = TestApp::spawn().await;

    let res = app.get(&routes::role(42)).await;
    assert_eq!(res.status, 404);
    assert_eq!(res.body["success"], false);
    assert_eq!(res.body["code"], "NOT_FOUND");
    assert_eq!(res.body["message"], "Role not found");
    assert!(res.body["data"].is_null());

    let res = app.put_json(&routes::role(42), &json!({ "name": "x" })).await;
    assert_eq!(res.status, 404);

    let res = app.delete(&routes::role(42)).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn non_integer_id_is_not_found() {
    let app = TestApp::spawn().await;

    let res = app.get(&routes::role("abc")).await;

    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
    assert_eq!(res.body["message"], "Role not found");
}

#[tokio::test]
async fn update_validates_before_lookup() {
    let app = TestApp::spawn().await;

    let res = app.put_json(&routes::role(42), &json!({})).await;

    assert_eq!(res.status, 422);
    assert_eq!(res.body["name"][0], "The name field is required.");
}

#[tokio::test]
async fn role_write_failure_reports_context() {
    let app = TestApp::spawn().await;
    app.fail_writes("role", "INSERT").await;

    let res = app.post_json(routes::ROLES, &json!({ "name": "editor" })).await;

    assert_eq!(res.status, 500);
    assert_eq!(res.body["success"], false);
    assert_eq!(res.body["code"], "PERSISTENCE_FAILED");
    assert_eq!(res.body["message"], "Role creation failed");
    assert!(
        res.body["detail"]
            .as_str()
            .unwrap()
            .contains("injected failure")
    );
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = TestApp::spawn().await;

    let res = app
        .client
        .post(format!("http://{}{}", app.addr, routes::ROLES))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 400);
}
