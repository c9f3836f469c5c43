//! Core todo client library (session, routes, API client, task board, config).

pub mod account;
pub mod api;
pub mod board;
pub mod busy;
pub mod config;
pub mod forms;
pub mod logging;
pub mod notice;
pub mod routes;
pub mod session;
pub mod storage;
