//! services/app/src/session.rs
//!
//! The session façade: turns the store's authorization marker into an
//! "authenticated" signal, owns the one-shot OAuth2 authorization-code login, and
//! offers the task operations screens perform on behalf of the active user.
//!
//! Logout contract: logging out only removes the authorization marker and drops
//! the cached users. Persisted tasks stay on the medium, so the same identifier
//! resumes them on its next login. Wiping them is the separate `clear_data`.

use std::sync::Arc;

use task_keeper_core::domain::{DraftRejected, Task, TaskDraft, UserProfile, UserRecord};
use task_keeper_core::listing::{order_for_listing, TaskFilter};
use task_keeper_core::ports::{
    AuthorizationOutcome, AuthorizationPrompt, AuthorizationRequest, CodeExchange, PortError,
    TaskSeeder, TokenEndpoint,
};
use task_keeper_core::seed::SampleTaskSeeder;
use task_keeper_core::store::{StoreError, UserStore};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::OAuthConfig;

//=========================================================================================
// Session Errors
//=========================================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("The login was cancelled")]
    Cancelled,
    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),
    #[error("The authorization response did not match the request")]
    StateMismatch,
    #[error("The token endpoint returned no access token")]
    MissingAccessToken,
    #[error("The token response carried no user identifier")]
    MissingUserId,
    #[error("No user is logged in")]
    NotAuthenticated,
    #[error("Invalid task: {0}")]
    InvalidTask(#[from] DraftRejected),
    #[error("Identity provider error: {0}")]
    Provider(#[from] PortError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl SessionError {
    /// Short text suitable for showing to the person at the screen.
    pub fn user_message(&self) -> &'static str {
        match self {
            SessionError::Cancelled
            | SessionError::AuthorizationFailed(_)
            | SessionError::StateMismatch => "The login was cancelled or failed.",
            SessionError::MissingAccessToken | SessionError::MissingUserId => {
                "Could not obtain an access token."
            }
            SessionError::NotAuthenticated => "You are not logged in. Please log in.",
            SessionError::InvalidTask(_) => "Fill in the title and the description.",
            SessionError::Provider(_) => "An error occurred during login.",
            SessionError::Store(_) => "Your tasks could not be saved or loaded.",
        }
    }
}

/// What a successful login did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub user_id: String,
    /// True when this identifier had never logged in before and got a fresh, seeded record.
    pub created: bool,
}

//=========================================================================================
// SessionService
//=========================================================================================

pub struct SessionService {
    store: Arc<UserStore>,
    prompt: Arc<dyn AuthorizationPrompt>,
    tokens: Arc<dyn TokenEndpoint>,
    seeder: Arc<dyn TaskSeeder>,
    oauth: OAuthConfig,
    redirect_uri: String,
}

impl SessionService {
    /// New users are seeded with `SampleTaskSeeder` unless `with_seeder` says otherwise.
    pub fn new(
        store: Arc<UserStore>,
        prompt: Arc<dyn AuthorizationPrompt>,
        tokens: Arc<dyn TokenEndpoint>,
        oauth: OAuthConfig,
        app_scheme: &str,
    ) -> Self {
        Self {
            store,
            prompt,
            tokens,
            seeder: Arc::new(SampleTaskSeeder::default()),
            oauth,
            redirect_uri: format!("{app_scheme}://redirect"),
        }
    }

    pub fn with_seeder(mut self, seeder: Arc<dyn TaskSeeder>) -> Self {
        self.seeder = seeder;
        self
    }

    pub fn store(&self) -> &Arc<UserStore> {
        &self.store
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Builds the authorization URL with a fresh `state` value.
    pub fn authorization_request(&self) -> AuthorizationRequest {
        let state = Uuid::new_v4().to_string();
        let mut url = self.oauth.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.oauth.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("state", &state);
        AuthorizationRequest {
            url: url.to_string(),
            state,
            redirect_uri: self.redirect_uri.clone(),
        }
    }

    /// Runs the whole authorization-code flow.
    ///
    /// Nothing reaches the store unless the provider hands back both an access
    /// token and a user identifier. A first-time identifier gets a new record
    /// filled by the seeder. A returning one only has its profile refreshed.
    pub async fn login(&self) -> Result<LoginOutcome, SessionError> {
        let request = self.authorization_request();
        let code = match self.prompt.prompt(&request).await? {
            AuthorizationOutcome::Success { code, state } => {
                if state.as_deref() != Some(request.state.as_str()) {
                    warn!("Authorization state mismatch; discarding the code");
                    return Err(SessionError::StateMismatch);
                }
                code
            }
            AuthorizationOutcome::Cancelled => {
                info!("Login cancelled by the user");
                return Err(SessionError::Cancelled);
            }
            AuthorizationOutcome::Failed(reason) => {
                warn!(%reason, "Authorization failed");
                return Err(SessionError::AuthorizationFailed(reason));
            }
        };

        let tokens = self
            .tokens
            .exchange_code(&CodeExchange {
                code,
                redirect_uri: self.redirect_uri.clone(),
                client_id: self.oauth.client_id.clone(),
                client_secret: self.oauth.client_secret.clone(),
            })
            .await?;
        let access_token = tokens.access_token.ok_or(SessionError::MissingAccessToken)?;
        let user_id = tokens.user_id.ok_or(SessionError::MissingUserId)?;

        let profile = UserProfile {
            user_id: user_id.clone(),
            name: tokens.user_name.unwrap_or_default(),
            login: tokens.login.unwrap_or_default(),
            access_token,
            refresh_token: tokens.refresh_token,
        };

        // Logout may have evicted the cache; decide "new or returning" on what is persisted.
        self.store.get_users_data().await?;
        let created = self.store.get_user_data(&user_id).await.is_none();
        if created {
            let tasks = self.seeder.seed_tasks(&profile);
            let count = tasks.len();
            self.store.create_user(profile, tasks).await?;
            info!(user_id = %user_id, tasks = count, "Created user record");
        } else {
            self.store.set_user_data(profile).await?;
        }
        self.store.set_authorized_state(&user_id).await?;

        info!(user_id = %user_id, created, "Login succeeded");
        Ok(LoginOutcome { user_id, created })
    }

    /// Rehydrates the store from the medium at process start and returns the
    /// record of the user who is still logged in, if any.
    pub async fn restore(&self) -> Result<Option<UserRecord>, SessionError> {
        let authorized = self.store.get_authorized_state().await?;
        self.store.get_users_data().await?;
        Ok(match authorized {
            Some(user_id) => self.store.get_user_data(&user_id).await,
            None => None,
        })
    }

    pub async fn is_authenticated(&self) -> bool {
        self.store.authorized_state().await.is_some()
    }

    pub async fn logout(&self) -> Result<(), SessionError> {
        self.store.remove_authorized_state().await?;
        self.store.evict_cached_users().await;
        info!("Logged out");
        Ok(())
    }

    /// Wipes every user's persisted tasks. The authorization marker is untouched.
    pub async fn clear_data(&self) -> Result<(), SessionError> {
        self.store.clear_user_data().await?;
        info!("Cleared all user data");
        Ok(())
    }

    // --- Task operations for the active user ---

    async fn active_user(&self) -> Result<String, SessionError> {
        self.store
            .authorized_state()
            .await
            .ok_or(SessionError::NotAuthenticated)
    }

    pub async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, SessionError> {
        let user_id = self.active_user().await?;
        let tasks = self.store.get_user_tasks(&user_id).await;
        Ok(order_for_listing(tasks, filter))
    }

    pub async fn create_task(&self, draft: TaskDraft) -> Result<Task, SessionError> {
        let user_id = self.active_user().await?;
        let task = draft.into_task()?;
        self.store.add_user_task(&user_id, task.clone()).await?;
        Ok(task)
    }

    pub async fn view_task(&self, task_id: &str) -> Result<Task, SessionError> {
        let user_id = self.active_user().await?;
        Ok(self.store.view_user_task(&user_id, task_id).await?)
    }

    /// Completing or opening a missing id fails with `TaskNotFound`.
    pub async fn complete_task(&self, task_id: &str) -> Result<(), SessionError> {
        let user_id = self.active_user().await?;
        Ok(self.store.complete_user_task(&user_id, task_id).await?)
    }

    pub async fn open_task(&self, task_id: &str) -> Result<(), SessionError> {
        let user_id = self.active_user().await?;
        Ok(self.store.open_user_task(&user_id, task_id).await?)
    }

    /// Removing a missing id is a no-op, as in the store.
    pub async fn remove_task(&self, task_id: &str) -> Result<(), SessionError> {
        let user_id = self.active_user().await?;
        Ok(self.store.remove_user_task(&user_id, task_id).await?)
    }

    /// Bulk actions skip ids the user does not have.
    pub async fn complete_tasks(&self, task_ids: &[String]) -> Result<(), SessionError> {
        let user_id = self.active_user().await?;
        Ok(self.store.complete_user_tasks_bulk(&user_id, task_ids).await?)
    }

    pub async fn remove_tasks(&self, task_ids: &[String]) -> Result<(), SessionError> {
        let user_id = self.active_user().await?;
        Ok(self.store.remove_user_tasks_bulk(&user_id, task_ids).await?)
    }
}
