//! # Stock Oracle
//!
//! A configurable stock price forecasting dashboard. One [`Dashboard`] wires a
//! [`DashboardConfig`] to the forecasting pipeline and, when the config asks
//! for it, a login gate backed by the credential store.
//!
//! ## Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use stock_oracle::{Dashboard, DashboardConfig, SessionState};
//!
//! # fn main() -> stock_oracle::Result<()> {
//! let dashboard = Dashboard::from_config(DashboardConfig::default())?;
//! let mut session = SessionState::default();
//!
//! let as_of = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
//! match dashboard.select(&mut session, "AAPL", 120, as_of) {
//!     Ok(report) => println!("{}", report.score),
//!     Err(feedback) => eprintln!("{}", feedback),
//! }
//! # Ok(())
//! # }
//! ```

pub mod render;
pub mod session;

pub use crate::render::render_report;
pub use crate::session::{
    welcome_text, Dashboard, Feedback, Result, Screen, Selection, SessionError, SessionState,
};
pub use credential_store::{CredentialStore, RegisterOutcome, VerifyOutcome};
pub use price_forecast::{DashboardConfig, ForecastReport, TickerEntry};

/// `RUST_LOG` fallback for the dashboard binary
pub const DEFAULT_LOG_FILTER: &str = "info";

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
