//! Stock Oracle CLI: forecast tickers and manage users from the terminal.
//!
//! Commands:
//! - `welcome`: describe the dashboard and list supported companies
//! - `tickers`: list configured tickers
//! - `register`: create a user (dashboards with a login)
//! - `forecast`: run the pipeline for one ticker and horizon
//! - `import-users`: migrate a plaintext `username,password` CSV

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use price_forecast::reconcile::write_reconciled_csv;
use std::fs::File;
use std::path::PathBuf;
use stock_oracle::{
    render_report, welcome_text, CredentialStore, Dashboard, DashboardConfig, Feedback,
    SessionState, DEFAULT_LOG_FILTER,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stock_oracle", about = "Stock price forecasting dashboard", version)]
struct Cli {
    /// Dashboard config (TOML). Defaults to the built-in nine-ticker dashboard.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Describe the dashboard.
    Welcome,
    /// List the configured tickers.
    Tickers,
    /// Register a new user.
    Register {
        #[arg(long)]
        username: String,

        #[arg(long, env = "STOCK_ORACLE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forecast one ticker.
    Forecast {
        /// Ticker symbol, e.g. AAPL or RELIANCE.NS.
        #[arg(long)]
        ticker: String,

        /// Days to predict. Defaults to the config's default horizon.
        #[arg(long)]
        horizon: Option<u32>,

        /// Treat this date (YYYY-MM-DD) as today. Defaults to today.
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Log in as this user first.
        #[arg(long)]
        username: Option<String>,

        #[arg(long, env = "STOCK_ORACLE_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Write the reconciled table as CSV (e.g. data.csv).
        #[arg(long)]
        export: Option<PathBuf>,

        /// Print the report as JSON instead of tables.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Import users from a plaintext username,password CSV.
    ImportUsers {
        path: PathBuf,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<DashboardConfig> {
    match path {
        Some(path) => DashboardConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(DashboardConfig::default()),
    }
}

fn show(feedback: &Feedback) -> Result<()> {
    match feedback {
        Feedback::Success(message) => {
            println!("{}", message);
            Ok(())
        }
        Feedback::Warning(message) | Feedback::Error(message) => bail!("{}", message),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Welcome => {
            print!("{}", welcome_text(&config));
        }
        Commands::Tickers => {
            for ticker in &config.tickers {
                println!("{:<16} {}", ticker.symbol, ticker.name);
            }
        }
        Commands::Register { username, password } => {
            let dashboard = Dashboard::from_config(config)?;
            let mut session = SessionState::default();
            show(&dashboard.register(&mut session, &username, &password))?;
        }
        Commands::Forecast {
            ticker,
            horizon,
            as_of,
            username,
            password,
            export,
            json,
        } => {
            let horizon = horizon.unwrap_or(config.default_horizon_days);
            let as_of = as_of.unwrap_or_else(|| chrono::Local::now().date_naive());
            let dashboard = Dashboard::from_config(config)?;
            let mut session = SessionState::default();

            if let Some(username) = username {
                let password = password.unwrap_or_default();
                show(&dashboard.login(&mut session, &username, &password))?;
            }

            let report = match dashboard.select(&mut session, &ticker, horizon, as_of) {
                Ok(report) => report,
                Err(feedback) => bail!("{}", feedback),
            };

            if let Some(path) = export {
                let file = File::create(&path)
                    .with_context(|| format!("failed to create {}", path.display()))?;
                write_reconciled_csv(&report.reconciled, file)?;
                tracing::info!(path = %path.display(), rows = report.reconciled.len(), "exported");
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_report(&report, &dashboard.config().trade_links));
            }
        }
        Commands::ImportUsers { path } => {
            let store = CredentialStore::open(&config.credentials_path)?;
            let summary = store.import_legacy_csv(&path)?;
            println!(
                "Imported {} users, skipped {}",
                summary.imported, summary.skipped
            );
        }
    }

    Ok(())
}
