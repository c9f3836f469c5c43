//! HTTP client for the remote todo API.
//!
//! Every `/todo/*` call carries the session token in a `token` header.
//! Requests are single-attempt; nothing here retries.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use todo_types::{
    LoginRequest, LoginResponse, MessageResponse, SignupRequest, Task, TaskListResponse,
    TaskPayload,
};
use url::Url;

pub const USER_AGENT: &str = concat!("todo-cli/", env!("CARGO_PKG_VERSION"));

/// Header carrying the session token.
pub const TOKEN_HEADER: &str = "token";

/// Message the signup endpoint returns for a duplicate account (sic).
pub const DUPLICATE_ACCOUNT_MESSAGE: &str = "user already exsist";

#[derive(Debug)]
pub enum ApiError {
    InvalidUrl(String),
    Transport(reqwest::Error),
    Status { status: StatusCode, body: String },
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidUrl(url) => write!(f, "Invalid API URL: {url}"),
            ApiError::Transport(err) => write!(f, "Request failed: {err}"),
            ApiError::Status { status, body } if body.is_empty() => {
                write!(f, "Server returned {status}")
            }
            ApiError::Status { status, body } => write!(f, "Server returned {status}: {body}"),
            ApiError::Decode(err) => write!(f, "Unexpected response: {err}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Result of `POST /user/signup`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupOutcome {
    Created(String),
    AlreadyExists(String),
}

/// The task endpoints, as the task board sees them.
pub trait TodoApi {
    fn list_tasks(&self, token: &str) -> impl Future<Output = ApiResult<Vec<Task>>> + Send;

    fn create_task(
        &self,
        token: &str,
        payload: &TaskPayload,
    ) -> impl Future<Output = ApiResult<()>> + Send;

    fn update_task(
        &self,
        token: &str,
        id: &str,
        payload: &TaskPayload,
    ) -> impl Future<Output = ApiResult<()>> + Send;

    fn delete_task(&self, token: &str, id: &str) -> impl Future<Output = ApiResult<()>> + Send;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
}

impl ApiClient {
    /// Builds a client for `base_url`.
    ///
    /// # Errors
    /// Returns an error if the URL cannot be a base or the HTTP client
    /// cannot be constructed.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> ApiResult<Self> {
        let base_url =
            Url::parse(base_url).map_err(|err| ApiError::InvalidUrl(format!("{base_url}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url,
            http: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> ApiResult<RequestBuilder> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%method, path = url.path(), "api request");
        Ok(self.http.request(method, url))
    }

    fn authed(&self, method: Method, segments: &[&str], token: &str) -> ApiResult<RequestBuilder> {
        Ok(self.request(method, segments)?.header(TOKEN_HEADER, token))
    }

    /// Registers a new account.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-2xx status or an
    /// undecodable body.
    pub async fn signup(&self, request: &SignupRequest) -> ApiResult<SignupOutcome> {
        let response = self
            .request(Method::POST, &["user", "signup"])?
            .json(request)
            .send()
            .await?;
        let body: MessageResponse = decode(response).await?;

        if body.message == DUPLICATE_ACCOUNT_MESSAGE {
            Ok(SignupOutcome::AlreadyExists(body.message))
        } else {
            Ok(SignupOutcome::Created(body.message))
        }
    }

    /// Exchanges credentials for a token and user profile.
    ///
    /// # Errors
    /// Returns [`ApiError::Status`] for rejected credentials.
    pub async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse> {
        let response = self
            .request(Method::POST, &["user", "login"])?
            .json(request)
            .send()
            .await?;
        decode(response).await
    }
}

impl TodoApi for ApiClient {
    async fn list_tasks(&self, token: &str) -> ApiResult<Vec<Task>> {
        let response = self
            .authed(Method::GET, &["todo", "get-all"], token)?
            .send()
            .await?;
        let body: TaskListResponse = decode(response).await?;
        Ok(body.todos)
    }

    async fn create_task(&self, token: &str, payload: &TaskPayload) -> ApiResult<()> {
        let response = self
            .authed(Method::POST, &["todo", "create"], token)?
            .json(payload)
            .send()
            .await?;
        ensure_success(response).await
    }

    async fn update_task(&self, token: &str, id: &str, payload: &TaskPayload) -> ApiResult<()> {
        let response = self
            .authed(Method::PATCH, &["todo", "update-todo", id], token)?
            .json(payload)
            .send()
            .await?;
        ensure_success(response).await
    }

    async fn delete_task(&self, token: &str, id: &str) -> ApiResult<()> {
        let response = self
            .authed(Method::DELETE, &["todo", "delete-todo", id], token)?
            .send()
            .await?;
        ensure_success(response).await
    }
}

async fn ensure_success(response: reqwest::Response) -> ApiResult<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    tracing::debug!(%status, "api request rejected");
    Err(ApiError::Status { status, body })
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        tracing::debug!(%status, "api request rejected");
        return Err(ApiError::Status { status, body });
    }
    serde_json::from_str(&body).map_err(|err| ApiError::Decode(err.to_string()))
}
