//! Client for the todo REST API.
//!
//! [`ApiClient`] speaks HTTP, [`TaskBoard`] keeps the authoritative task list of a session
//! and [`TodoApp`] drives the login/register/tasks screens around them.

pub mod api;
pub mod app;
pub mod board;
pub mod config;
pub mod error;

pub use api::{Ack, ApiClient, LoginResponse};
pub use app::TodoApp;
pub use board::{BoardState, TaskBackend, TaskBoard};
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{ClientError, ClientResult};
