//! Session-level controller: which screen is shown, and the board behind the task screen.

use crate::api::ApiClient;
use crate::board::TaskBoard;
use crate::error::{ClientError, ClientResult};
use todo_core::validation::validate_credentials;
use todo_core::{Credentials, Screen, ScreenAction, UserInfo};
use todo_session::SessionStore;
use tracing::{info, warn};

const REGISTER_FAILED: &str = "User already exists or registration failed";

pub struct TodoApp<S> {
    api: ApiClient,
    session: S,
    screen: Screen,
    board: Option<TaskBoard<ApiClient>>,
    message: Option<String>,
}

impl<S: SessionStore> TodoApp<S> {
    pub fn new(api: ApiClient, session: S) -> Self {
        Self {
            api,
            session,
            screen: Screen::default(),
            board: None,
            message: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// The task board, present only on the task screen.
    pub fn board(&self) -> Option<&TaskBoard<ApiClient>> {
        self.board.as_ref()
    }

    /// Inline message of the login or register screen.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Resume a stored session. Returns whether a token was found.
    ///
    /// The token is not verified here; the first request that gets a 401 reveals a stale one.
    pub fn restore(&mut self) -> ClientResult<bool> {
        let Some(token) = self.session.load()? else {
            return Ok(false);
        };

        let next = self.screen.apply(ScreenAction::LoginSucceeded)?;
        self.enter_tasks(token, next);
        info!("Restored stored session");
        Ok(true)
    }

    /// Log in, persist the token and load the task list.
    ///
    /// A failed initial load leaves the user logged in with the board's message set.
    pub async fn login(&mut self, credentials: &Credentials) -> ClientResult<()> {
        self.message = None;

        let result = self.try_login(credentials).await;
        if let Err(e) = &result {
            warn!(error = %e, "Login failed");
            self.message = Some(e.user_message());
        }
        result
    }

    async fn try_login(&mut self, credentials: &Credentials) -> ClientResult<()> {
        let next = self.screen.apply(ScreenAction::LoginSucceeded)?;
        validate_credentials(credentials)?;

        let response = self.api.login(credentials).await?;
        self.session.save(&response.access_token)?;
        self.enter_tasks(response.access_token, next);
        info!(email = %credentials.email, "Logged in");

        if let Some(board) = &self.board {
            if let Err(e) = board.refresh().await {
                warn!(error = %e, "Initial task load failed");
            }
        }
        Ok(())
    }

    /// Create an account and return to the login screen.
    pub async fn register(&mut self, credentials: &Credentials) -> ClientResult<()> {
        self.message = None;

        let result = self.try_register(credentials).await;
        if let Err(e) = &result {
            warn!(error = %e, "Registration failed");
            self.message = Some(match e {
                ClientError::Authentication => REGISTER_FAILED.to_string(),
                e => e.user_message(),
            });
        }
        result
    }

    async fn try_register(&mut self, credentials: &Credentials) -> ClientResult<()> {
        let next = self.screen.apply(ScreenAction::RegisterSucceeded)?;
        validate_credentials(credentials)?;

        self.api.register(credentials).await?;
        self.screen = next;
        info!(email = %credentials.email, "Registered");
        Ok(())
    }

    /// Drop the session and return to the login screen. Never fails.
    pub fn logout(&mut self) {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear stored session");
        }
        self.api.clear_bearer_token();
        self.board = None;
        self.message = None;
        self.screen = self
            .screen
            .apply(ScreenAction::Logout)
            .unwrap_or_default();
        info!("Logged out");
    }

    pub fn switch_to_register(&mut self) -> ClientResult<()> {
        self.screen = self.screen.apply(ScreenAction::SwitchToRegister)?;
        self.message = None;
        Ok(())
    }

    pub fn switch_to_login(&mut self) -> ClientResult<()> {
        self.screen = self.screen.apply(ScreenAction::SwitchToLogin)?;
        self.message = None;
        Ok(())
    }

    pub async fn current_user(&self) -> ClientResult<UserInfo> {
        self.api.current_user().await
    }

    fn enter_tasks(&mut self, token: String, next: Screen) {
        self.api.set_bearer_token(Some(token));
        self.board = Some(TaskBoard::new(self.api.clone()));
        self.screen = next;
    }
}
