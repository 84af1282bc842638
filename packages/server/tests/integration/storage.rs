use reqwest::header::CONTENT_TYPE;

use crate::common::{PNG, TestApp, file_part, routes, text_form};

#[tokio::test]
async fn uploaded_image_is_served_back() {
    let app = TestApp::spawn().await;
    let form = text_form(&[("title", "Pic"), ("description", "d"), ("status", "s")])
        .part("image", file_part(PNG, "pic.png", "image/png"));
    let created = app.post_multipart(routes::POSTS, form).await;
    let image_url = created.body["data"]["image_url"].as_str().unwrap().to_string();

    let res = app.get_raw(&image_url).await;

    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(res.headers()[CONTENT_TYPE], "image/png");
    assert_eq!(res.bytes().await.unwrap().as_ref(), PNG);
}

#[tokio::test]
async fn unknown_files_are_not_found() {
    let app = TestApp::spawn().await;

    let missing = app.get(&routes::storage("posts", "nope-1.png")).await;
    assert_eq!(missing.status, 404);
    assert_eq!(missing.body["code"], "NOT_FOUND");

    let bad_namespace = app.get(&routes::storage("secrets", "a.png")).await;
    assert_eq!(bad_namespace.status, 404);

    let hidden = app.get(&routes::storage("posts", ".env")).await;
    assert_eq!(hidden.status, 404);

    let traversal = app.get(&routes::storage("posts", "..%2Ftest.db")).await;
    assert_eq!(traversal.status, 404);
}

#[tokio::test]
async fn openapi_document_lists_resource_paths() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::OPENAPI).await;

    assert_eq!(res.status, 200);
    let paths = &res.body["paths"];
    for path in [
        "/api/posts",
        "/api/posts/{id}",
        "/api/roles",
        "/api/roles/{id}",
        "/api/users",
        "/api/users/{id}",
        "/api/auth/login",
        "/api/user",
    ] {
        assert!(paths.get(path).is_some(), "missing {path}");
    }
}
