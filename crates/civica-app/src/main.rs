//! Civica application binary - terminal chat front end.
//!
//! 1. Load configuration from TOML
//! 2. Build the knowledge base and the assistant orchestrator
//! 3. Open one conversation session and greet the user
//! 4. Read queries from stdin until `/salir` or end of input

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use civica_assistant::{AssistantOrchestrator, ConversationMessage, Submission, TurnState};
use civica_core::config::CivicaConfig;

/// Command that ends the conversation.
const EXIT_COMMAND: &str = "/salir";

/// Shown while a turn is being processed.
const THINKING_INDICATOR: &str = "Analizando consulta...";

#[derive(Parser)]
#[command(name = "civica")]
#[command(author, version, about = "Asistente de consultas ciudadanas", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set (e.g. "debug")
    #[arg(long)]
    log_level: Option<String>,

    /// Override the simulated thinking delay in milliseconds
    #[arg(long)]
    thinking_ms: Option<u64>,

    /// Print the conversation as JSON on exit
    #[arg(long)]
    transcript: bool,
}

/// Resolve the config file path (CIVICA_CONFIG env, or ~/.civica/config.toml).
fn config_path() -> PathBuf {
    if let Ok(p) = std::env::var("CIVICA_CONFIG") {
        return PathBuf::from(p);
    }
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".civica").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".civica").join("config.toml");
    }
    PathBuf::from("config.toml")
}

/// Whether a typed line ends the conversation. Surrounding whitespace is
/// ignored.
fn is_exit_command(line: &str) -> bool {
    line.trim() == EXIT_COMMAND
}

fn render(message: &ConversationMessage) {
    let prefix = if message.is_error { "asistente (!)" } else { "asistente" };
    println!("{}> {}\n", prefix, message.text);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config_file = cli.config.clone().unwrap_or_else(config_path);

    // The log level comes from the config, so it is loaded before the
    // subscriber exists and its own log lines are not shown.
    let mut config = CivicaConfig::load_or_default(&config_file);
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.general.log_level.clone());

    // Tracing goes to stderr so the conversation owns stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Civica v{} starting", env!("CARGO_PKG_VERSION"));
    if config_file.exists() {
        tracing::info!(path = %config_file.display(), "Configuration loaded");
    } else {
        tracing::warn!(path = %config_file.display(), "Config file not found. Using defaults.");
    }
    if let Some(ms) = cli.thinking_ms {
        config.assistant.thinking_delay_ms = ms;
    }

    let orchestrator = AssistantOrchestrator::from_config(&config);
    let session = orchestrator.open_session()?;
    tracing::debug!(session_id = %session.id(), "Session ready");

    for message in session.messages() {
        render(&message);
    }

    let mut state_rx = session.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if is_exit_command(&line) {
            break;
        }

        let outcome = {
            state_rx.borrow_and_update();
            let turn = session.submit_query(&line);
            tokio::pin!(turn);
            loop {
                tokio::select! {
                    outcome = &mut turn => break outcome,
                    Ok(()) = state_rx.changed() => {
                        if *state_rx.borrow_and_update() == TurnState::Thinking {
                            println!("{}", THINKING_INDICATOR);
                        }
                    }
                }
            }
        };

        match outcome {
            Submission::Replied(message) => render(&message),
            Submission::Failed(message) => {
                if let Some(banner) = session.last_error() {
                    eprintln!("[{}]", banner);
                }
                render(&message);
            }
            Submission::Rejected(reason) => {
                tracing::debug!(reason = ?reason, "Query not accepted");
            }
        }
    }

    if cli.transcript {
        println!("{}", serde_json::to_string_pretty(&session.messages())?);
    }

    orchestrator.close_session(session.id())?;
    tracing::info!("Civica stopped");
    Ok(())
}
