//! HTTP client for the todo REST API.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use todo_core::{
    Category, CategoryDraft, CategoryId, Credentials, SubtaskDraft, SubtaskId, Task, TaskDraft,
    TaskId, TaskQuery, UserInfo, decode_categories, decode_tasks,
};

/// Join a base URL and a path with exactly one slash between them.
pub(crate) fn join_url_segments(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}

/// Body of a successful `POST /login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,

    #[serde(default = "bearer")]
    pub token_type: String,
}

fn bearer() -> String {
    "bearer".to_string()
}

/// Acknowledgement returned by mutating endpoints, `{"id": 3, "ok": true}` or `{"ok": true}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub id: Option<i64>,

    #[serde(default = "acknowledged")]
    pub ok: bool,
}

fn acknowledged() -> bool {
    true
}

impl Default for Ack {
    fn default() -> Self {
        Self { id: None, ok: true }
    }
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Client for the todo API.
///
/// Cloning is cheap; clones share the connection pool but carry their own bearer token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    config: ClientConfig,
    bearer_token: Option<String>,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        Url::parse(&config.base_url)?;

        let mut builder = reqwest::Client::builder();

        // Timeout and user agent are not supported in WASM builds
        #[cfg(not(target_arch = "wasm32"))]
        {
            builder = builder.user_agent(config.user_agent.clone());
            if let Some(timeout) = config.timeout {
                builder = builder.timeout(timeout);
            }
        }

        Ok(Self {
            client: builder.build()?,
            config,
            bearer_token: None,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn set_bearer_token(&mut self, token: Option<impl Into<String>>) {
        self.bearer_token = token.map(|t| t.into());
    }

    pub fn clear_bearer_token(&mut self) {
        self.bearer_token = None;
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(%method, path, "Sending request");

        let url = join_url_segments(&self.config.base_url, path);
        let mut request = self.client.request(method, url);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn send(request: RequestBuilder) -> ClientResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        debug!(status = status.as_u16(), %body, "Request failed");
        Err(ClientError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn read_ack(response: Response) -> ClientResult<Ack> {
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Ack::default());
        }

        match serde_json::from_slice::<serde_json::Value>(&bytes)? {
            serde_json::Value::Null => Ok(Ack::default()),
            value => Ok(serde_json::from_value(value)?),
        }
    }

    /// `POST /login` with the OAuth2 password form. Does not store the token.
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<LoginResponse> {
        let request = self
            .request(Method::POST, "login")
            .form(&credentials.as_login_form());

        match Self::send(request).await {
            Ok(response) => Self::read_json(response).await,
            Err(ClientError::Status { status, .. })
                if status == StatusCode::UNAUTHORIZED.as_u16() =>
            {
                Err(ClientError::Authentication)
            }
            Err(e) => Err(e),
        }
    }

    /// `POST /register`. A 400 means the email is taken.
    pub async fn register(&self, credentials: &Credentials) -> ClientResult<Ack> {
        let request = self
            .request(Method::POST, "register")
            .json(&RegisterRequest {
                email: &credentials.email,
                password: &credentials.password,
            });

        match Self::send(request).await {
            Ok(response) => Self::read_ack(response).await,
            Err(ClientError::Status { status, .. })
                if status == StatusCode::BAD_REQUEST.as_u16() =>
            {
                Err(ClientError::Authentication)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn current_user(&self) -> ClientResult<UserInfo> {
        let response = Self::send(self.request(Method::GET, "me")).await?;
        Self::read_json(response).await
    }

    pub async fn list_tasks(&self, query: &TaskQuery) -> ClientResult<Vec<Task>> {
        let mut request = self.request(Method::GET, "tasks");
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = Self::send(request).await?;
        let rows: Vec<serde_json::Value> = Self::read_json(response).await?;
        Ok(decode_tasks(rows))
    }

    pub async fn create_task(&self, draft: &TaskDraft) -> ClientResult<Ack> {
        let request = self.request(Method::POST, "tasks").json(draft);
        Self::read_ack(Self::send(request).await?).await
    }

    pub async fn update_task(&self, id: TaskId, draft: &TaskDraft) -> ClientResult<Ack> {
        let request = self.request(Method::PUT, &format!("tasks/{id}")).json(draft);
        Self::read_ack(Self::send(request).await?).await
    }

    pub async fn delete_task(&self, id: TaskId) -> ClientResult<Ack> {
        let request = self.request(Method::DELETE, &format!("tasks/{id}"));
        Self::read_ack(Self::send(request).await?).await
    }

    pub async fn list_categories(&self) -> ClientResult<Vec<Category>> {
        let response = Self::send(self.request(Method::GET, "categories")).await?;
        let rows: Vec<serde_json::Value> = Self::read_json(response).await?;
        Ok(decode_categories(rows))
    }

    pub async fn create_category(&self, draft: &CategoryDraft) -> ClientResult<Ack> {
        let request = self.request(Method::POST, "categories").json(draft);
        Self::read_ack(Self::send(request).await?).await
    }

    pub async fn update_category(&self, id: CategoryId, draft: &CategoryDraft) -> ClientResult<Ack> {
        let request = self
            .request(Method::PUT, &format!("categories/{id}"))
            .json(draft);
        Self::read_ack(Self::send(request).await?).await
    }

    pub async fn delete_category(&self, id: CategoryId) -> ClientResult<Ack> {
        let request = self.request(Method::DELETE, &format!("categories/{id}"));
        Self::read_ack(Self::send(request).await?).await
    }

    pub async fn create_subtask(&self, task_id: TaskId, draft: &SubtaskDraft) -> ClientResult<Ack> {
        let request = self
            .request(Method::POST, &format!("tasks/{task_id}/subtasks"))
            .json(draft);
        Self::read_ack(Self::send(request).await?).await
    }

    pub async fn update_subtask(&self, id: SubtaskId, draft: &SubtaskDraft) -> ClientResult<Ack> {
        let request = self
            .request(Method::PUT, &format!("subtasks/{id}"))
            .json(draft);
        Self::read_ack(Self::send(request).await?).await
    }

    pub async fn delete_subtask(&self, id: SubtaskId) -> ClientResult<Ack> {
        let request = self.request(Method::DELETE, &format!("subtasks/{id}"));
        Self::read_ack(Self::send(request).await?).await
    }
}
