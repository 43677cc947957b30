use std::net::SocketAddr;

use reqwest::Client;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tempfile::TempDir;

use recipe_server::config::{AppConfig, CorsConfig, DatabaseConfig, MediaConfig, ServerConfig};
use recipe_server::state::AppState;

/// Upload limit used by every test server.
pub const MAX_UPLOAD_SIZE: usize = 64 * 1024;

pub mod routes {
    pub const TAGS: &str = "/api/v1/tags";
    pub const INGREDIENTS: &str = "/api/v1/ingredients";
    pub const RECIPES: &str = "/api/v1/recipes";

    pub fn tag(id: i32) -> String {
        format!("/api/v1/tags/{id}")
    }

    pub fn ingredient(id: i32) -> String {
        format!("/api/v1/ingredients/{id}")
    }

    pub fn recipe(id: i32) -> String {
        format!("/api/v1/recipes/{id}")
    }

    pub fn recipe_image(id: i32) -> String {
        format!("/api/v1/recipes/{id}/upload-image")
    }
}

/// A running test server backed by its own SQLite database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    /// Holds the database file and media root; removed on drop.
    pub dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = dir.path().join("recipes.db");

        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig {
                url: format!("sqlite://{}?mode=rwc", db_path.display()),
                max_connections: 1,
                min_connections: 1,
            },
            media: MediaConfig {
                root: dir.path().join("media"),
                max_upload_size: MAX_UPLOAD_SIZE,
            },
        };

        let db = recipe_server::database::init_db(&app_config.database)
            .await
            .expect("Failed to initialize test database");

        let state = AppState {
            db: db.clone(),
            config: app_config,
        };
        let app = recipe_server::build_router(state);

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
            dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send PUT request");

        TestResponse::from_response(res).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .patch(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send PATCH request");

        TestResponse::from_response(res).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    pub async fn upload(
        &self,
        path: &str,
        field: &str,
        file_name: &str,
        file_bytes: Vec<u8>,
    ) -> TestResponse {
        let part = reqwest::multipart::Part::bytes(file_bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part(field.to_string(), part);

        let res = self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart upload request");

        TestResponse::from_response(res).await
    }

    /// Create a tag via the API and return its `id`.
    pub async fn create_tag(&self, name: &str) -> i32 {
        let res = self
            .post(routes::TAGS, &serde_json::json!({ "name": name }))
            .await;
        assert_eq!(res.status, 201, "create_tag failed: {}", res.text);
        res.id()
    }

    /// Create an ingredient via the API and return its `id`.
    pub async fn create_ingredient(&self, name: &str, calories: f64) -> i32 {
        let res = self
            .post(
                routes::INGREDIENTS,
                &serde_json::json!({ "name": name, "calories": calories }),
            )
            .await;
        assert_eq!(res.status, 201, "create_ingredient failed: {}", res.text);
        res.id()
    }

    /// Create a recipe via the API and return its `id`.
    pub async fn create_recipe(&self, title: &str, ingredients: &[i32], tags: &[i32]) -> i32 {
        let res = self
            .post(
                routes::RECIPES,
                &serde_json::json!({
                    "title": title,
                    "time_minutes": 20,
                    "price": 7.5,
                    "ingredients": ingredients,
                    "tags": tags,
                }),
            )
            .await;
        assert_eq!(res.status, 201, "create_recipe failed: {}", res.text);
        res.id()
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    pub fn id(&self) -> i32 {
        self.body["id"]
            .as_i64()
            .expect("response body should contain 'id'") as i32
    }

    /// The `code` of the first field error reported for `field`.
    pub fn field_code(&self, field: &str) -> Option<&str> {
        self.body["fields"]
            .as_array()?
            .iter()
            .find(|f| f["field"] == field)
            .and_then(|f| f["code"].as_str())
    }
}
