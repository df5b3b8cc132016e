use std::net::SocketAddr;

use reqwest::Client;
use reqwest::header::COOKIE;
use serde_json::Value;
use tempfile::TempDir;

use filechanger::config::{
    AppConfig, AuthConfig, CorsConfig, PresenceConfig, ServerConfig, StorageConfig,
};
use filechanger::extractors::session::SESSION_COOKIE;
use filechanger::state::AppState;

pub mod routes {
    pub const DASHBOARD: &str = "/";
    pub const LOGIN: &str = "/login";
    pub const SET_USERNAME: &str = "/set_username";
    pub const LOGOUT: &str = "/logout";
    pub const UPLOAD: &str = "/upload";
    pub const SAVE_LINK: &str = "/save_link";
    pub const DELETE_LINK: &str = "/delete_link";
    pub const CONNECTED_DEVICES: &str = "/get_connected_devices";
    pub const SAVE_SETTINGS: &str = "/save_settings";
    pub const OPENAPI: &str = "/api-docs/openapi.json";

    pub fn download(filename: &str) -> String {
        format!("/download/{filename}")
    }

    pub fn delete_file(filename: &str) -> String {
        format!("/delete_file/{filename}")
    }

    pub fn device_info(ip: &str) -> String {
        format!("/get_device_info/{ip}")
    }
}

/// A running test server backed by a scratch directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub state: AppState,
    pub dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
    /// Session token set by the response, if any.
    pub session: Option<String>,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let session = res
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .map(|c| c.value().to_string());
        let text = res.text().await.expect("Failed to read response body");
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self {
            status,
            text,
            body,
            session,
        }
    }
}

pub fn test_config(dir: &TempDir) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors: CorsConfig {
                allow_origins: vec![],
                max_age: 3600,
            },
        },
        storage: StorageConfig {
            data_dir: dir.path().join("Base"),
            upload_dir: dir.path().join("uploads"),
            state_file: "state.json".to_string(),
        },
        auth: AuthConfig {
            jwt_secret: "test-secret-for-integration-tests".to_string(),
            session_ttl_days: 30,
        },
        presence: PresenceConfig {
            ttl_secs: 300,
            track_loopback: true,
            resolve_hostnames: false,
        },
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let state = AppState::init(test_config(&dir))
            .await
            .expect("Failed to initialize state");

        let app = filechanger::build_router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to build HTTP client");

        Self {
            addr,
            client,
            state,
            dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    fn session_header(token: &str) -> String {
        format!("{SESSION_COOKIE}={token}")
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.header(COOKIE, Self::session_header(token));
        }
        let res = req.send().await.expect("Failed to send GET request");
        TestResponse::from_response(res).await
    }

    pub async fn get_with_user_agent(&self, path: &str, token: &str, user_agent: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .header(COOKIE, Self::session_header(token))
            .header(reqwest::header::USER_AGENT, user_agent)
            .send()
            .await
            .expect("Failed to send GET request");
        TestResponse::from_response(res).await
    }

    pub async fn post_form(
        &self,
        path: &str,
        form: &[(&str, &str)],
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = self.client.post(self.url(path)).form(form);
        if let Some(token) = token {
            req = req.header(COOKIE, Self::session_header(token));
        }
        let res = req.send().await.expect("Failed to send POST request");
        TestResponse::from_response(res).await
    }

    pub async fn post_json(&self, path: &str, body: &Value, token: Option<&str>) -> TestResponse {
        let mut req = self.client.post(self.url(path)).json(body);
        if let Some(token) = token {
            req = req.header(COOKIE, Self::session_header(token));
        }
        let res = req.send().await.expect("Failed to send POST request");
        TestResponse::from_response(res).await
    }

    pub async fn post_empty(&self, path: &str, token: Option<&str>) -> TestResponse {
        let mut req = self.client.post(self.url(path));
        if let Some(token) = token {
            req = req.header(COOKIE, Self::session_header(token));
        }
        let res = req.send().await.expect("Failed to send POST request");
        TestResponse::from_response(res).await
    }

    pub async fn upload(&self, file_name: &str, file_bytes: Vec<u8>, token: Option<&str>) -> TestResponse {
        let part = reqwest::multipart::Part::bytes(file_bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let mut req = self.client.post(self.url(routes::UPLOAD)).multipart(form);
        if let Some(token) = token {
            req = req.header(COOKIE, Self::session_header(token));
        }
        let res = req
            .send()
            .await
            .expect("Failed to send multipart upload request");
        TestResponse::from_response(res).await
    }

    /// Log in under the given name fields, returning the session token.
    pub async fn login(&self, lastname: &str, firstname: &str, patronymic: &str) -> String {
        let res = self
            .post_form(
                routes::SET_USERNAME,
                &[
                    ("lastname", lastname),
                    ("firstname", firstname),
                    ("patronymic", patronymic),
                ],
                None,
            )
            .await;
        assert_eq!(res.status, 200, "Login failed: {}", res.text);
        res.session.expect("Login should set the session cookie")
    }

    /// Log in the first user, who becomes the owner.
    pub async fn login_owner(&self) -> String {
        self.login("Иванов", "Иван", "Иванович").await
    }

    /// Upload a file and assert it was stored, returning the stored name.
    pub async fn upload_ok(&self, file_name: &str, bytes: &[u8], token: &str) -> String {
        let res = self.upload(file_name, bytes.to_vec(), Some(token)).await;
        assert_eq!(res.status, 201, "Upload failed: {}", res.text);
        res.body["filename"]
            .as_str()
            .expect("Upload response should name the file")
            .to_string()
    }
}
