use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use infra_assist_core::{telemetry, AskClient, ChatMessage, ChatRole, ChatWidget, Config};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "infra-assist")]
#[command(version, about = "Chat with the IT infrastructure assistant")]
struct Cli {
    /// Base URL of the ask backend (overrides INFRA_ASSIST_ENDPOINT and the config file)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Write logs here instead of the user cache directory
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive chat (default)
    Chat,
    /// Ask a single question and print the answer
    Ask {
        /// Your question
        question: String,
    },
    /// Remember a backend URL in the config file
    SetEndpoint {
        /// Base URL, e.g. http://assist.internal:8000
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = match cli.log_file {
        Some(path) => path,
        None => telemetry::default_log_path()?,
    };
    telemetry::init(&log_path)?;

    let config = Config::load()?;
    let endpoint = config.resolve_endpoint(cli.endpoint.as_deref());
    tracing::info!(%endpoint, "using ask endpoint");

    let client = AskClient::new(&endpoint);

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_tui(client).await,
        Commands::Ask { question } => ask_once(&client, &question).await,
        Commands::SetEndpoint { url } => set_endpoint(&url),
    }
}

fn set_endpoint(url: &str) -> Result<()> {
    let config_path = Config::get_config_path()?;
    let config = remember_endpoint(&config_path, url)?;
    println!(
        "{} {} ({})",
        "Saved endpoint".green(),
        config.endpoint.unwrap_or_default(),
        config_path.display()
    );
    Ok(())
}

/// Store `url` as the endpoint in the config file at `config_path`, keeping
/// anything else already there
fn remember_endpoint(config_path: &Path, url: &str) -> Result<Config> {
    let url = url.trim();
    if url.is_empty() {
        anyhow::bail!("endpoint URL must not be empty");
    }

    let mut config = Config::load_from(config_path)?;
    config.endpoint = Some(url.trim_end_matches('/').to_string());
    config.save_to(config_path)?;
    tracing::info!(path = %config_path.display(), "endpoint saved");
    Ok(config)
}

async fn run_tui(client: AskClient) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let endpoint = client.base_url().to_string();
    let mut app = App::new(Arc::new(client), endpoint);
    let mut events = EventHandler::new();

    let result = run_loop(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    tracing::info!("chat closed");
    result
}

async fn run_loop(terminal: &mut Tui, events: &mut EventHandler, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        let Some(event) = events.next().await else {
            break;
        };
        handler::handle_event(app, event);
        app.poll_ask_task().await;
    }
    Ok(())
}

/// Run one question through a fresh widget and return the exchange
/// (question and answer), or `None` when the question is blank
async fn ask_exchange(client: &AskClient, question: &str) -> Option<Vec<ChatMessage>> {
    let mut widget = ChatWidget::new();
    widget.set_input(question);

    if !widget.submit_question(client).await {
        return None;
    }

    let messages = widget.messages();
    Some(messages[messages.len().saturating_sub(2)..].to_vec())
}

async fn ask_once(client: &AskClient, question: &str) -> Result<()> {
    let Some(exchange) = ask_exchange(client, question).await else {
        println!("{}", "Please enter a valid question.".yellow());
        return Ok(());
    };

    for msg in exchange {
        let label = match msg.role {
            ChatRole::User => msg.role.label().bold().cyan(),
            ChatRole::Assistant => msg.role.label().bold().yellow(),
        };
        println!("{}\n{}\n", label, msg.content);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use infra_assist_core::FALLBACK_MESSAGE;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn server_responding(template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_ask_exchange_returns_question_and_answer() {
        let server = server_responding(
            ResponseTemplate::new(200).set_body_string(r#"{"answer":"Use a hypervisor."}"#),
        )
        .await;
        let client = AskClient::new(&server.uri());

        let exchange = ask_exchange(&client, "  How do I virtualize?  ").await.unwrap();

        assert_eq!(
            exchange,
            vec![
                ChatMessage::user("How do I virtualize?"),
                ChatMessage::assistant("Use a hypervisor."),
            ]
        );
    }

    #[tokio::test]
    async fn test_ask_exchange_falls_back_on_server_error() {
        let server = server_responding(ResponseTemplate::new(500)).await;
        let client = AskClient::new(&server.uri());

        let exchange = ask_exchange(&client, "anything").await.unwrap();

        assert_eq!(exchange[1], ChatMessage::assistant(FALLBACK_MESSAGE));
    }

    #[test]
    fn test_remember_endpoint_persists_and_is_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("infra-assist").join("config.json");

        let saved = remember_endpoint(&path, " http://assist.internal:9000/ ").unwrap();

        assert_eq!(saved.endpoint.as_deref(), Some("http://assist.internal:9000"));
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(
            loaded.resolve_endpoint(Some("http://flag")),
            "http://flag"
        );
    }

    #[test]
    fn test_remember_endpoint_rejects_blank_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        assert!(remember_endpoint(&path, "   ").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_set_endpoint_subcommand_parses() {
        let cli = Cli::parse_from(["infra-assist", "set-endpoint", "http://assist:8000"]);
        assert!(matches!(
            cli.command,
            Some(Commands::SetEndpoint { ref url }) if url == "http://assist:8000"
        ));
    }

    #[tokio::test]
    async fn test_ask_exchange_skips_blank_question() {
        let client = AskClient::new("http://127.0.0.1:9");
        assert!(ask_exchange(&client, " \t ").await.is_none());
    }
}
