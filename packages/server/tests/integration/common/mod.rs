use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use ::common::storage::{BlobKey, BlobStore, FilesystemBlobStore, StorageError};
use reqwest::{Client, Method, RequestBuilder};
use reqwest::multipart::{Form, Part};
use sea_orm::{ConnectionTrait, DatabaseConnection};
use serde_json::Value;
use tempfile::TempDir;

use warta_server::config::{
    AppConfig, AuthConfig, CorsConfig, DatabaseConfig, ServerConfig, StorageConfig,
};
use warta_server::state::AppState;
use warta_server::utils::hash::Argon2Hashing;

pub const JWT_SECRET: &str = "test-secret-for-integration-tests";

/// Smallest byte sequence our sniffer accepts as PNG.
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01\x08\x06\0\0\0";
pub const GIF: &[u8] = b"GIF89a\x01\0\x01\0\x80\0\0\0\0\0\xff\xff\xff";
pub const JPEG: &[u8] = b"\xff\xd8\xff\xe0\0\x10JFIF\0\x01\x01\0\0\x01\0\x01\0\0";

pub mod routes {
    pub const POSTS: &str = "/api/posts";
    pub const ROLES: &str = "/api/roles";
    pub const USERS: &str = "/api/users";
    pub const LOGIN: &str = "/api/auth/login";
    pub const ME: &str = "/api/user";
    pub const OPENAPI: &str = "/api-docs/openapi.json";

    pub fn post(id: impl std::fmt::Display) -> String {
        format!("/api/posts/{id}")
    }

    pub fn role(id: impl std::fmt::Display) -> String {
        format!("/api/roles/{id}")
    }

    pub fn user(id: impl std::fmt::Display) -> String {
        format!("/api/users/{id}")
    }

    pub fn storage(namespace: &str, filename: &str) -> String {
        format!("/storage/{namespace}/{filename}")
    }
}

/// Blob store whose writes always fail; reads and deletes see an empty store.
pub struct FailingBlobStore;

#[async_trait]
impl BlobStore for FailingBlobStore {
    async fn put(&self, _key: &BlobKey, _data: &[u8]) -> Result<(), StorageError> {
        Err(StorageError::Io(std::io::Error::other("disk full")))
    }

    async fn get(&self, key: &BlobKey) -> Result<Vec<u8>, StorageError> {
        Err(StorageError::NotFound(key.path()))
    }

    async fn delete(&self, _key: &BlobKey) -> Result<bool, StorageError> {
        Ok(false)
    }
}

/// A running test server backed by a temp-file SQLite database and a temp
/// blob directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub storage_root: PathBuf,
    _dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        Self {
            status,
            body: serde_json::from_str(&text).unwrap_or(Value::Null),
            text,
        }
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_store(None).await
    }

    /// Spawn with a custom blob store instead of the filesystem one.
    pub async fn spawn_with_store(store: Option<Arc<dyn BlobStore>>) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let storage_root = dir.path().join("public");

        let db = warta_server::database::init_db(&db_url)
            .await
            .expect("Failed to initialize test database");

        let max_upload_bytes = 8 * 1024 * 1024;
        let blob_store = match store {
            Some(store) => store,
            None => Arc::new(
                FilesystemBlobStore::new(storage_root.clone(), max_upload_bytes)
                    .await
                    .expect("Failed to create blob store"),
            ),
        };

        let config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig::default(),
            },
            database: DatabaseConfig { url: db_url },
            auth: AuthConfig {
                jwt_secret: JWT_SECRET.to_string(),
                token_ttl_hours: 1,
            },
            storage: StorageConfig {
                root: storage_root.clone(),
                max_upload_bytes,
            },
        };

        let state = AppState {
            db: db.clone(),
            config,
            blob_store,
            hasher: Arc::new(Argon2Hashing::default()),
        };

        let app = warta_server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            storage_root,
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    async fn send(req: RequestBuilder) -> TestResponse {
        let res = req.send().await.expect("request did not reach the server");
        TestResponse::from_response(res).await
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        Self::send(self.request(Method::GET, path)).await
    }

    pub async fn get_with_token(&self, path: &str, token: &str) -> TestResponse {
        Self::send(self.request(Method::GET, path).bearer_auth(token)).await
    }

    /// GET returning the raw response, for binary bodies and headers.
    pub async fn get_raw(&self, path: &str) -> reqwest::Response {
        self.request(Method::GET, path)
            .send()
            .await
            .expect("request did not reach the server")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> TestResponse {
        Self::send(self.request(Method::POST, path).json(body)).await
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> TestResponse {
        Self::send(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn patch_json(&self, path: &str, body: &Value) -> TestResponse {
        Self::send(self.request(Method::PATCH, path).json(body)).await
    }

    /// POST as `application/x-www-form-urlencoded`.
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        Self::send(self.request(Method::POST, path).form(fields)).await
    }

    pub async fn post_multipart(&self, path: &str, form: Form) -> TestResponse {
        Self::send(self.request(Method::POST, path).multipart(form)).await
    }

    pub async fn put_multipart(&self, path: &str, form: Form) -> TestResponse {
        Self::send(self.request(Method::PUT, path).multipart(form)).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        Self::send(self.request(Method::DELETE, path)).await
    }

    /// Make every subsequent write of `op` on `table` fail inside the database.
    pub async fn fail_writes(&self, table: &str, op: &str) {
        let sql = format!(
            "CREATE TRIGGER fail_{table}_{op} BEFORE {op} ON \"{table}\" \
             BEGIN SELECT RAISE(ABORT, 'injected failure'); END;"
        );
        self.db
            .execute_unprepared(&sql)
            .await
            .expect("Failed to install failure trigger");
    }

    pub fn blob_path(&self, namespace: &str, filename: &str) -> PathBuf {
        self.storage_root.join(namespace).join(filename)
    }

    /// Filenames currently stored under a namespace.
    pub fn stored_files(&self, namespace: &str) -> Vec<String> {
        list_files(&self.storage_root.join(namespace))
    }

    /// Create a user through the API and return its id.
    pub async fn create_user(&self, username: &str, email: &str, password: &str) -> i64 {
        let res = self
            .post_json(
                routes::USERS,
                &serde_json::json!({
                    "nomor_induk": "1201200123",
                    "fullname": format!("{username} test"),
                    "username": username,
                    "email": email,
                    "password": password,
                }),
            )
            .await;
        assert_eq!(res.status, 201, "User creation failed: {}", res.text);
        res.body["data"]["id"].as_i64().unwrap()
    }

    /// Log in and return the bearer token.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let res = self
            .post_json(
                routes::LOGIN,
                &serde_json::json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(res.status, 200, "Login failed: {}", res.text);
        res.body["data"]["token"].as_str().unwrap().to_string()
    }
}

fn list_files(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Multipart file part with a client filename.
pub fn file_part(bytes: &[u8], file_name: &str, mime: &str) -> Part {
    Part::bytes(bytes.to_vec())
        .file_name(file_name.to_string())
        .mime_str(mime)
        .expect("Failed to set MIME type")
}

/// Multipart form from text fields.
pub fn text_form(fields: &[(&str, &str)]) -> Form {
    fields.iter().fold(Form::new(), |form, (name, value)| {
        form.text(name.to_string(), value.to_string())
    })
}
