//! Shared data model for the todo client.
//!
//! These types mirror the JSON the remote API sends and accepts. They carry
//! no behavior beyond (de)serialization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single to-do record owned by the remote API.
///
/// The id is assigned by the server (`_id` on the wire); the client never
/// creates one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Profile of the logged-in user, as returned by `POST /user/login`.
///
/// Only `name` is required. Anything else the server sends is kept in
/// `extra` so the persisted record round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            extra: Map::new(),
        }
    }
}

/// Body of `POST /user/signup`.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Body of `POST /user/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful `POST /user/login` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    #[serde(default)]
    pub message: String,
}

/// Any response that only carries a `message`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// `GET /todo/get-all` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskListResponse {
    #[serde(default)]
    pub todos: Vec<Task>,
}

/// Body of `POST /todo/create` and `PATCH /todo/update-todo/:id`.
///
/// Updates always send both fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskPayload {
    pub title: String,
    pub description: String,
}
