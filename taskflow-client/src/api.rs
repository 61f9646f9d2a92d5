/// HTTP client for the TaskFlow API
///
/// Thin transport over `reqwest`. The access token returned by signup,
/// login and refresh is kept in memory and sent as a bearer token on every
/// request. The refresh token never surfaces here: the server sets it as
/// the `rt` cookie and the client's cookie store replays it to
/// `/api/auth/refresh`.
///
/// Non-2xx responses become [`ClientError::Api`] carrying the server's
/// `error` message.
///
/// # Example
///
/// ```no_run
/// use taskflow_client::api::ApiClient;
/// use taskflow_client::config::ClientConfig;
///
/// # async fn example() -> Result<(), taskflow_client::api::ClientError> {
/// let client = ApiClient::new(&ClientConfig::from_env())?;
/// let session = client.login("ada@example.com", "password123").await?;
/// println!("signed in as {}", session.user.name);
///
/// for project in client.list_projects().await? {
///     println!("{}", project.name);
/// }
/// # Ok(())
/// # }
/// ```

use crate::config::ClientConfig;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use taskflow_shared::models::project::Project;
use taskflow_shared::models::task::{NewTask, Task, TaskPatch};
use taskflow_shared::models::user::PublicUser;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Client error
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-2xx status
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The request never produced a response, or the body was unreadable
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// HTTP status for server-side failures
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED.as_u16())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Signup/login result
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub access_token: String,
    pub user: PublicUser,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct MeResponse {
    user: PublicUser,
}

#[derive(Deserialize)]
struct OkResponse {
    #[allow(dead_code)]
    ok: bool,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct ProjectBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddMemberBody {
    member_id: Uuid,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateTaskBody<'a> {
    project_id: Uuid,
    #[serde(flatten)]
    task: &'a NewTask,
}

/// Task operations the board depends on
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list_tasks(&self, project_id: Uuid) -> ClientResult<Vec<Task>>;

    async fn create_task(&self, project_id: Uuid, fields: &NewTask) -> ClientResult<Task>;

    async fn update_task(&self, id: Uuid, patch: &TaskPatch) -> ClientResult<Task>;

    async fn delete_task(&self, id: Uuid) -> ClientResult<()>;
}

/// Project operations the workspace depends on
#[async_trait]
pub trait ProjectApi: Send + Sync {
    async fn list_projects(&self) -> ClientResult<Vec<Project>>;

    async fn create_project(&self, name: &str, description: Option<&str>) -> ClientResult<Project>;

    async fn delete_project(&self, id: Uuid) -> ClientResult<()>;
}

/// TaskFlow API client
///
/// Cheap to clone; clones share the HTTP connection pool, the cookie jar
/// and the access token.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    access_token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: Arc::from(config.base_url.as_str()),
            access_token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn access_token(&self) -> Option<String> {
        self.access_token.read().await.clone()
    }

    /// Replaces the stored access token
    pub async fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write().await = token;
    }

    // ------------------------------------------------------------------ auth

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> ClientResult<AuthSession> {
        let body = Credentials {
            name: Some(name),
            email,
            password,
        };
        let session: AuthSession = self
            .send(self.request(Method::POST, "/auth/signup").json(&body))
            .await?;
        self.set_access_token(Some(session.access_token.clone())).await;
        tracing::debug!(user_id = %session.user.id, "Signed up");
        Ok(session)
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<AuthSession> {
        let body = Credentials {
            name: None,
            email,
            password,
        };
        let session: AuthSession = self
            .send(self.request(Method::POST, "/auth/login").json(&body))
            .await?;
        self.set_access_token(Some(session.access_token.clone())).await;
        tracing::debug!(user_id = %session.user.id, "Logged in");
        Ok(session)
    }

    pub async fn me(&self) -> ClientResult<PublicUser> {
        let response: MeResponse = self.send(self.request(Method::GET, "/auth/me")).await?;
        Ok(response.user)
    }

    /// Exchanges the refresh cookie for a new access token
    ///
    /// The server rotates the cookie on every call; the cookie store picks
    /// up the replacement.
    pub async fn refresh(&self) -> ClientResult<String> {
        let response: RefreshResponse = self
            .send(self.request(Method::POST, "/auth/refresh"))
            .await?;
        self.set_access_token(Some(response.access_token.clone())).await;
        Ok(response.access_token)
    }

    /// Revokes the refresh token server-side and forgets the access token
    ///
    /// The local token is cleared even when the request fails.
    pub async fn logout(&self) -> ClientResult<()> {
        let result = self
            .send::<OkResponse>(self.request(Method::POST, "/auth/logout"))
            .await;
        self.set_access_token(None).await;
        result.map(|_| ())
    }

    // -------------------------------------------------------------- projects

    pub async fn list_projects(&self) -> ClientResult<Vec<Project>> {
        self.send(self.request(Method::GET, "/projects")).await
    }

    pub async fn create_project(&self, name: &str, description: Option<&str>) -> ClientResult<Project> {
        let body = ProjectBody {
            name: Some(name),
            description,
        };
        self.send(self.request(Method::POST, "/projects").json(&body))
            .await
    }

    pub async fn get_project(&self, id: Uuid) -> ClientResult<Project> {
        self.send(self.request(Method::GET, &format!("/projects/{}", id)))
            .await
    }

    /// Owner-only rename / re-describe; `None` leaves a field unchanged
    pub async fn update_project(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> ClientResult<Project> {
        let body = ProjectBody { name, description };
        self.send(
            self.request(Method::PATCH, &format!("/projects/{}", id))
                .json(&body),
        )
        .await
    }

    pub async fn add_member(&self, project_id: Uuid, member_id: Uuid) -> ClientResult<Project> {
        self.send(
            self.request(Method::POST, &format!("/projects/{}/add-member", project_id))
                .json(&AddMemberBody { member_id }),
        )
        .await
    }

    pub async fn delete_project(&self, id: Uuid) -> ClientResult<()> {
        self.send::<OkResponse>(self.request(Method::DELETE, &format!("/projects/{}", id)))
            .await
            .map(|_| ())
    }

    // ----------------------------------------------------------------- tasks

    pub async fn list_tasks(&self, project_id: Uuid) -> ClientResult<Vec<Task>> {
        self.send(
            self.request(Method::GET, "/tasks")
                .query(&[("projectId", project_id.to_string())]),
        )
        .await
    }

    pub async fn create_task(&self, project_id: Uuid, fields: &NewTask) -> ClientResult<Task> {
        let body = CreateTaskBody {
            project_id,
            task: fields,
        };
        self.send(self.request(Method::POST, "/tasks").json(&body))
            .await
    }

    pub async fn update_task(&self, id: Uuid, patch: &TaskPatch) -> ClientResult<Task> {
        self.send(
            self.request(Method::PATCH, &format!("/tasks/{}", id))
                .json(patch),
        )
        .await
    }

    pub async fn delete_task(&self, id: Uuid) -> ClientResult<()> {
        self.send::<OkResponse>(self.request(Method::DELETE, &format!("/tasks/{}", id)))
            .await
            .map(|_| ())
    }

    // ------------------------------------------------------------- transport

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let request = match self.access_token.read().await.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl TaskApi for ApiClient {
    async fn list_tasks(&self, project_id: Uuid) -> ClientResult<Vec<Task>> {
        ApiClient::list_tasks(self, project_id).await
    }

    async fn create_task(&self, project_id: Uuid, fields: &NewTask) -> ClientResult<Task> {
        ApiClient::create_task(self, project_id, fields).await
    }

    async fn update_task(&self, id: Uuid, patch: &TaskPatch) -> ClientResult<Task> {
        ApiClient::update_task(self, id, patch).await
    }

    async fn delete_task(&self, id: Uuid) -> ClientResult<()> {
        ApiClient::delete_task(self, id).await
    }
}

#[async_trait]
impl ProjectApi for ApiClient {
    async fn list_projects(&self) -> ClientResult<Vec<Project>> {
        ApiClient::list_projects(self).await
    }

    async fn create_project(&self, name: &str, description: Option<&str>) -> ClientResult<Project> {
        ApiClient::create_project(self, name, description).await
    }

    async fn delete_project(&self, id: Uuid) -> ClientResult<()> {
        ApiClient::delete_project(self, id).await
    }
}

async fn api_error(response: Response) -> ClientError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    ClientError::Api {
        status: status.as_u16(),
        message: error_message(status, &text),
    }
}

/// Server-supplied `error` (or `message`), else the raw body, else the status
fn error_message(status: StatusCode, body: &str) -> String {
    let parsed = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .filter(|m| !m.trim().is_empty());

    match parsed {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => format!("Request failed with status {}", status.as_u16()),
    }
}
