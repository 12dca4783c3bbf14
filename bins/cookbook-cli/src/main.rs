//! Cookbook CLI
//!
//! Drives the authenticated Cookbook API client from the terminal. Credentials
//! are kept in the durable credential store, so `login` once and the other
//! commands reuse (and transparently refresh) the session.

use clap::{Parser, Subcommand, ValueEnum};
use cookbook_api_client::ApiError;
use cookbook_core::error::exit_codes;
use cookbook_telemetry::TelemetryConfig;
use owo_colors::OwoColorize;
use std::process::ExitCode;

mod commands;
mod output;

use commands::{auth, catalog, token};

/// Command-line client for the Cookbook backend
#[derive(Parser)]
#[command(name = "cookbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Backend origin (overrides COOKBOOK_BACKEND_URL)
    #[arg(long, global = true, env = "COOKBOOK_BACKEND_URL")]
    backend_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Human-readable text
    Text,
    /// Raw JSON bodies
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the access token
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "COOKBOOK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out on the backend and forget local credentials
    Logout,

    /// List recipes
    Recipes {
        /// Filter as key=value; repeat a key to send a list
        #[arg(long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,
    },

    /// Show one recipe
    Recipe {
        /// Recipe identifier
        id: String,
    },

    /// List categories
    Categories,

    /// Inspect or clear the stored access token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Show whether a token is stored
    Show {
        /// Print the full token
        #[arg(long)]
        reveal: bool,
    },

    /// Remove all stored credentials
    Clear,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let telemetry = if cli.verbose {
        TelemetryConfig::verbose()
    } else {
        TelemetryConfig::default()
    };
    if let Err(e) = cookbook_telemetry::init_with_config(telemetry) {
        eprintln!("{} {e}", "Warning:".yellow().bold());
    }

    let backend = cli.backend_url.as_deref();
    let result = match cli.command {
        Commands::Login { email, password } => {
            auth::login(backend, &email, &password, cli.format).await
        }
        Commands::Logout => auth::logout(backend, cli.format).await,
        Commands::Recipes { filters } => catalog::recipes(backend, &filters, cli.format).await,
        Commands::Recipe { id } => catalog::recipe(backend, &id, cli.format).await,
        Commands::Categories => catalog::categories(backend, cli.format).await,
        Commands::Token { action } => match action {
            TokenAction::Show { reveal } => token::show(backend, reveal, cli.format),
            TokenAction::Clear => token::clear(backend),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "Error:".red().bold());
            if let Some(hint) = hint(&e) {
                eprintln!("  {}", hint.dimmed());
            }
            ExitCode::from(exit_code(&e))
        }
    }
}

fn exit_code(err: &anyhow::Error) -> u8 {
    let code = match err.downcast_ref::<ApiError>() {
        Some(ApiError::SessionEnded) => exit_codes::SESSION_ENDED,
        Some(ApiError::Config(_) | ApiError::MissingEnvVar(_)) => exit_codes::CONFIG_ERROR,
        Some(ApiError::Timeout(_)) => exit_codes::TIMEOUT,
        _ => exit_codes::FAILURE,
    };
    u8::try_from(code).unwrap_or(1)
}

fn hint(err: &anyhow::Error) -> Option<&'static str> {
    let err = err.downcast_ref::<ApiError>()?;
    if err.is_session_error() {
        Some("Sign in again with `cookbook login`")
    } else if err.is_server_error() {
        Some("The backend failed to handle the request; try again later")
    } else if err.is_client_error() {
        Some("The backend rejected the request")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cookbook_api_client::RefreshError;
    use serde_json::json;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&ApiError::SessionEnded.into()), 4);
        assert_eq!(exit_code(&ApiError::config("bad").into()), 3);
        assert_eq!(exit_code(&ApiError::missing_env("X").into()), 3);
        assert_eq!(
            exit_code(&ApiError::Timeout(std::time::Duration::from_secs(1)).into()),
            124
        );
        assert_eq!(exit_code(&anyhow::anyhow!("other")), 1);
    }

    #[test]
    fn test_hints_follow_error_kind() {
        let ended = anyhow::Error::from(ApiError::SessionEnded);
        assert!(hint(&ended).unwrap().contains("login"));

        let refresh = anyhow::Error::from(ApiError::from(RefreshError::MissingToken));
        assert!(hint(&refresh).unwrap().contains("login"));

        let server = anyhow::Error::from(ApiError::api_response(502, "Bad gateway", json!(null)));
        assert!(hint(&server).unwrap().contains("try again"));

        let client = anyhow::Error::from(ApiError::api_response(404, "Not found", json!(null)));
        assert_eq!(hint(&client), Some("The backend rejected the request"));

        assert_eq!(hint(&anyhow::anyhow!("plain")), None);
    }
}
