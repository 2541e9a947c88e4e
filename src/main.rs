use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use tracing::warn;

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use citechat::config::{ConfigOverrides, ENDPOINT_ENV};
use citechat::{logging, ChatClient, ChatSession, Config, Settings, Submission};
use tui::{EventHandler, Tui, TICK_RATE};

#[derive(Parser)]
#[command(name = "citechat", version)]
#[command(about = "Chat with a knowledge-base endpoint and see the sources behind each answer")]
struct Cli {
    /// Chat endpoint URL (overrides config and CITECHAT_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,
    /// Minimum milliseconds between two sends
    #[arg(long, global = true)]
    rate_limit_ms: Option<u64>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat TUI (default)
    Chat,
    /// Send one message and print the reply
    Ask {
        /// Your message
        message: String,
    },
    /// Print the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match logging::log_path().and_then(|path| logging::init_tracing(&path)) {
        Ok(()) => {}
        Err(e) => eprintln!("Logging disabled: {}", e),
    }

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "could not load config, using defaults");
        Config::new()
    });
    let overrides = ConfigOverrides {
        endpoint: cli.endpoint,
        rate_limit_ms: cli.rate_limit_ms,
    };
    let settings = config.resolve(&overrides, std::env::var(ENDPOINT_ENV).ok());

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_tui(&settings).await,
        Commands::Ask { message } => run_ask(&settings, &message).await,
        Commands::Config { init } => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            if init {
                Config::from(&settings).save()?;
                println!(
                    "{} {}",
                    "Saved to".green(),
                    Config::get_config_path()?.display()
                );
            }
            Ok(())
        }
    }
}

async fn run_tui(settings: &Settings) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut app = App::new(settings);
    let mut events = EventHandler::new(TICK_RATE);
    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
        app.poll_dispatch().await;
    }
    Ok(())
}

async fn run_ask(settings: &Settings, message: &str) -> Result<()> {
    let client = ChatClient::new(&settings.endpoint);
    let mut session = ChatSession::new(settings.rate_limit());

    println!("🤖 Asking {}...\n", settings.endpoint.bold().magenta());

    if session.dispatch(&client, message, Instant::now()).await == Submission::Empty {
        println!("{}", "Nothing to send".yellow());
        return Ok(());
    }

    let Some(reply) = session.conversation().last() else {
        return Ok(());
    };

    if reply.is_error {
        println!("{}", reply.content.red());
        println!("Make sure the chat server is running at: {}", settings.endpoint.bold());
        std::process::exit(1);
    }

    println!("{}", "Response:".bold().green());
    println!("{}", reply.content);

    if !reply.sources.is_empty() {
        println!("\n{}", "Sources:".bold().blue());
        for link in citechat::sources::links(&reply.sources) {
            println!("• {}", link.target.yellow());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_chat() {
        let cli = Cli::try_parse_from(["citechat"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.endpoint.is_none());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "citechat",
            "ask",
            "what is pinned?",
            "--endpoint",
            "http://127.0.0.1:9000/api/chat",
            "--rate-limit-ms",
            "250",
        ])
        .unwrap();

        assert_eq!(cli.endpoint.as_deref(), Some("http://127.0.0.1:9000/api/chat"));
        assert_eq!(cli.rate_limit_ms, Some(250));
        match cli.command {
            Some(Commands::Ask { message }) => assert_eq!(message, "what is pinned?"),
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn config_init_flag() {
        let cli = Cli::try_parse_from(["citechat", "config", "--init"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Config { init: true })));

        let cli = Cli::try_parse_from(["citechat", "config"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Config { init: false })));
    }
}
