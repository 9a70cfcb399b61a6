//! Session state and the handlers that drive it
//!
//! Each user interaction is one handler call on [`Dashboard`] with the
//! caller's [`SessionState`]. Handlers never panic on user input; every
//! expected failure comes back as a [`Feedback`] message.

use chrono::NaiveDate;
use credential_store::{CredentialError, CredentialStore, RegisterOutcome, VerifyOutcome};
use price_forecast::{
    DashboardConfig, ForecastError, ForecastPipeline, ForecastReport, ForecastRequest,
};
use thiserror::Error;
use tracing::{info, warn};

/// Errors raised while assembling a dashboard
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error(transparent)]
    Credentials(#[from] CredentialError),

    /// The config requires a login but no credential store was given
    #[error("Login is required but no credential store is available")]
    MissingStore,
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, SessionError>;

/// Screens a session can be on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Welcome,
    Login,
    Register,
    Dashboard,
}

/// The last ticker and horizon a user picked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub symbol: String,
    pub horizon_days: u32,
}

/// Per-user state passed into every handler
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub screen: Screen,
    pub current_user: Option<String>,
    pub last_selection: Option<Selection>,
}

impl SessionState {
    pub fn is_logged_in(&self) -> bool {
        self.current_user.is_some()
    }
}

/// Message shown to the user after an interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Success(String),
    Warning(String),
    Error(String),
}

impl Feedback {
    pub fn message(&self) -> &str {
        match self {
            Feedback::Success(m) | Feedback::Warning(m) | Feedback::Error(m) => m,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Feedback::Success(_))
    }
}

impl std::fmt::Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

const LOGIN_REQUIRED: &str = "Please log in to access the app.";

/// One configured dashboard: pipeline plus optional login gate
#[derive(Debug)]
pub struct Dashboard {
    pipeline: ForecastPipeline,
    store: Option<CredentialStore>,
}

impl Dashboard {
    /// Create a dashboard over a pipeline and an optional credential store
    pub fn new(pipeline: ForecastPipeline, store: Option<CredentialStore>) -> Result<Self> {
        if pipeline.config().require_auth && store.is_none() {
            return Err(SessionError::MissingStore);
        }
        Ok(Self { pipeline, store })
    }

    /// Build the pipeline and, when a login is required, open the store
    pub fn from_config(config: DashboardConfig) -> Result<Self> {
        let store = if config.require_auth {
            Some(CredentialStore::open(&config.credentials_path)?)
        } else {
            None
        };
        let pipeline = ForecastPipeline::from_config(config)?;
        Self::new(pipeline, store)
    }

    pub fn config(&self) -> &DashboardConfig {
        self.pipeline.config()
    }

    pub fn store(&self) -> Option<&CredentialStore> {
        self.store.as_ref()
    }

    fn gated(&self, state: &SessionState) -> bool {
        self.config().require_auth && !state.is_logged_in()
    }

    /// Move to another screen
    ///
    /// Without a login, a gated dashboard redirects to the login screen and
    /// returns a warning.
    pub fn navigate(&self, state: &mut SessionState, screen: Screen) -> Option<Feedback> {
        if screen == Screen::Dashboard && self.gated(state) {
            state.screen = Screen::Login;
            return Some(Feedback::Warning(LOGIN_REQUIRED.to_string()));
        }
        state.screen = screen;
        None
    }

    /// Register a new user; success moves the session to the login screen
    pub fn register(&self, state: &mut SessionState, username: &str, password: &str) -> Feedback {
        let Some(store) = &self.store else {
            return Feedback::Error("Registration is not enabled for this dashboard.".to_string());
        };

        match store.register(username, password) {
            Ok(RegisterOutcome::Registered) => {
                state.screen = Screen::Login;
                Feedback::Success("Registration successful! Please log in.".to_string())
            }
            Ok(RegisterOutcome::UsernameTaken) => {
                Feedback::Error("Username already exists!".to_string())
            }
            Ok(RegisterOutcome::InvalidInput) => {
                Feedback::Warning("Please enter both username and password.".to_string())
            }
            Err(e) => {
                warn!(error = %e, "registration failed");
                Feedback::Error(format!("Error: {}", e))
            }
        }
    }

    /// Log in; success records the user and opens the dashboard
    pub fn login(&self, state: &mut SessionState, username: &str, password: &str) -> Feedback {
        let Some(store) = &self.store else {
            return Feedback::Error("Login is not enabled for this dashboard.".to_string());
        };

        match store.verify(username, password) {
            Ok(VerifyOutcome::Authenticated) => {
                state.current_user = Some(username.trim().to_string());
                state.screen = Screen::Dashboard;
                Feedback::Success("Login successful! Redirecting to app...".to_string())
            }
            Ok(VerifyOutcome::Rejected) => {
                Feedback::Error("Invalid username or password.".to_string())
            }
            Err(e) => {
                warn!(error = %e, "login failed");
                Feedback::Error(format!("Error: {}", e))
            }
        }
    }

    /// Forget the current user and return to the welcome screen
    pub fn logout(&self, state: &mut SessionState) {
        if let Some(user) = state.current_user.take() {
            info!(user = %user, "logged out");
        }
        state.screen = Screen::Welcome;
    }

    /// Run a forecast for the session's selection
    pub fn select(
        &self,
        state: &mut SessionState,
        symbol: &str,
        horizon_days: u32,
        as_of: NaiveDate,
    ) -> std::result::Result<ForecastReport, Feedback> {
        if self.gated(state) {
            state.screen = Screen::Login;
            return Err(Feedback::Warning(LOGIN_REQUIRED.to_string()));
        }

        state.screen = Screen::Dashboard;
        state.last_selection = Some(Selection {
            symbol: symbol.trim().to_string(),
            horizon_days,
        });

        self.pipeline
            .run(&ForecastRequest::new(symbol, horizon_days, as_of))
            .map_err(|e| {
                warn!(symbol, horizon_days, error = %e, "forecast failed");
                Feedback::Error(e.user_message())
            })
    }
}

/// Welcome screen text listing the supported companies
pub fn welcome_text(config: &DashboardConfig) -> String {
    let mut text = format!("Welcome to the {}\n\n", config.title);
    text.push_str(
        "Pick a company and a prediction period to forecast its closing price.\n\n",
    );
    text.push_str(&format!(
        "History: up to {} years of daily data\n",
        config.history_years
    ));
    text.push_str(&format!(
        "Prediction period: {} to {} days (default {})\n\n",
        config.min_horizon_days, config.max_horizon_days, config.default_horizon_days
    ));
    text.push_str("Supported companies:\n");
    for ticker in &config.tickers {
        text.push_str(&format!("  - {} ({})\n", ticker.name, ticker.symbol));
    }
    if config.require_auth {
        text.push_str("\nLog in or register to get started.\n");
    }
    text
}
