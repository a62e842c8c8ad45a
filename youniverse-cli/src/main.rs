//! Youniverse CLI and MCP Server.

mod commands;
mod config;
mod handlers;
mod mcp;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{connection, feed, message, notification, student};
use rust_i18n::t;

rust_i18n::i18n!("src/locales", fallback = "en");

/// Youniverse student network CLI and MCP Server
#[derive(Parser)]
#[command(name = "yuv")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "plain")]
    format: output::OutputFormat,

    /// Show verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Language for output
    #[arg(short, long, global = true, default_value = "en")]
    lang: String,

    /// Project URL (overrides the config file)
    #[arg(long, global = true, env = "YOUNIVERSE_URL")]
    url: Option<String>,

    /// Public API key (overrides the config file)
    #[arg(long, global = true, env = "YOUNIVERSE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Run as MCP Server
    #[arg(long)]
    mcp: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage authentication
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Find students
    #[command(alias = "s")]
    Student {
        #[command(subcommand)]
        action: student::StudentAction,
    },

    /// Connection requests
    #[command(alias = "c")]
    Connection {
        #[command(subcommand)]
        action: connection::ConnectionAction,
    },

    /// Direct messages
    #[command(alias = "m")]
    Message {
        #[command(subcommand)]
        action: message::MessageAction,
    },

    /// Posts, comments, likes and shares
    #[command(alias = "f")]
    Feed {
        #[command(subcommand)]
        action: feed::FeedAction,
    },

    /// Notification operations
    #[command(alias = "n")]
    Notification {
        #[command(subcommand)]
        action: notification::NotificationAction,
    },

    /// Show current configuration
    Config,
}

#[derive(Subcommand)]
enum AuthAction {
    /// Login with an access token and user ID
    Login {
        /// Access token
        #[arg(short, long)]
        token: String,
        /// User ID
        #[arg(short, long)]
        user_id: String,
    },
    /// Logout
    Logout,
    /// Show current auth status
    Status,
}

fn init_tracing(level: tracing::Level) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    rust_i18n::set_locale(&cli.lang);
    config::set_overrides(config::Overrides {
        project_url: cli.url.clone(),
        api_key: cli.api_key.clone(),
    });

    if cli.mcp {
        init_tracing(tracing::Level::INFO);
        return mcp::run_server().await;
    }
    if cli.verbose {
        init_tracing(tracing::Level::DEBUG);
    }

    let command = cli
        .command
        .ok_or_else(|| anyhow::anyhow!("{}", t!("no_command")))?;

    match command {
        Commands::Auth { action } => handle_auth(action).await,
        Commands::Student { action } => student::handle(action, cli.format, cli.verbose).await,
        Commands::Connection { action } => {
            connection::handle(action, cli.format, cli.verbose).await
        }
        Commands::Message { action } => message::handle(action, cli.format, cli.verbose).await,
        Commands::Feed { action } => feed::handle(action, cli.format, cli.verbose).await,
        Commands::Notification { action } => {
            notification::handle(action, cli.format, cli.verbose).await
        }
        Commands::Config => {
            let cfg = config::load_config()?;
            println!(
                "{}",
                t!("config_file", path = config::config_path()?.display())
            );
            println!(
                "{}",
                t!(
                    "project_url",
                    url = cfg.effective_url().unwrap_or_else(|| "-".to_string())
                )
            );
            println!(
                "{}",
                t!("api_key_set", status = cfg.effective_api_key().is_some())
            );
            println!("{}", t!("authenticated", status = cfg.auth.is_some()));
            if let Some(auth) = &cfg.auth {
                println!("{}", t!("user_id", uid = &auth.user_id));
            }
            Ok(())
        }
    }
}

async fn handle_auth(action: AuthAction) -> Result<()> {
    match action {
        AuthAction::Login { token, user_id } => {
            if token.trim().is_empty() || user_id.trim().is_empty() {
                anyhow::bail!("{}", t!("login_blank"));
            }
            let mut cfg = config::load_config()?;
            cfg.auth = Some(config::AuthConfig {
                access_token: token,
                user_id: user_id.clone(),
            });
            config::save_config(&cfg)?;
            println!("{}", t!("logged_in_as", uid = &user_id));
            Ok(())
        }
        AuthAction::Logout => {
            let mut cfg = config::load_config()?;
            cfg.auth = None;
            config::save_config(&cfg)?;
            println!("{}", t!("logged_out"));
            Ok(())
        }
        AuthAction::Status => {
            let cfg = config::load_config()?;
            if let Some(auth) = &cfg.auth {
                println!("{}", t!("logged_in_as", uid = &auth.user_id));
            } else {
                println!("{}", t!("not_logged_in"));
            }
            Ok(())
        }
    }
}
