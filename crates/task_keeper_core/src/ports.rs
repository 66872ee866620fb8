//! crates/task_keeper_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core depends on.
//! These traits form the boundary of the hexagonal architecture, so the store and
//! the login flow never know which storage medium or identity provider sits behind them.

use async_trait::async_trait;

use crate::domain::{Task, UserProfile};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (filesystem, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Storage failure: {0}")]
    Storage(String),
    #[error("Network failure: {0}")]
    Network(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Persisted Key-Value Medium
//=========================================================================================

/// An asynchronous, crash-durable string-keyed store supplied by the host.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> PortResult<()>;

    /// Removing a key that is absent is not an error.
    async fn remove(&self, key: &str) -> PortResult<()>;
}

//=========================================================================================
// OAuth2 Authorization Code Flow
//=========================================================================================

/// What the user agent is asked to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
    pub redirect_uri: String,
}

/// How the user agent came back from the authorization endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    Success { code: String, state: Option<String> },
    Cancelled,
    Failed(String),
}

/// Opens the authorization page and waits for the redirect.
#[async_trait]
pub trait AuthorizationPrompt: Send + Sync {
    async fn prompt(&self, request: &AuthorizationRequest) -> PortResult<AuthorizationOutcome>;
}

/// Parameters of the `authorization_code` grant.
#[derive(Debug, Clone)]
pub struct CodeExchange {
    pub code: String,
    pub redirect_uri: String,
    pub client_id: String,
    pub client_secret: String,
}

/// The token endpoint's answer, with the profile fields the provider embeds in it.
#[derive(Debug, Clone, Default)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub login: Option<String>,
}

#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    async fn exchange_code(&self, exchange: &CodeExchange) -> PortResult<TokenResponse>;
}

//=========================================================================================
// Collection Creation
//=========================================================================================

/// Produces the initial tasks of a user record the first time it is created.
pub trait TaskSeeder: Send + Sync {
    fn seed_tasks(&self, user: &UserProfile) -> Vec<Task>;
}

/// Brand-new users start with an empty collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSeeding;

impl TaskSeeder for NoSeeding {
    fn seed_tasks(&self, _user: &UserProfile) -> Vec<Task> {
        Vec::new()
    }
}
