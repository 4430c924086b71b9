// Little Genius terminal host
// Reads lines from stdin and answers through a chat session.

use anyhow::{Context, Result};
use littlegenius_core::config::AppConfig;
use littlegenius_core::engines;
use littlegenius_core::fs_manager::PortablePathManager;
use littlegenius_core::prefs::Preferences;
use littlegenius_core::store::ChatStore;
use littlegenius_core::{ChatClient, ChatSession};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const HELP: &str = "Commands: /clear, /history, /dark on|off, /focus on|off, /quit";

/// What the host should do with one line of input.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Clear,
    History,
    Dark(bool),
    Focus(bool),
    Quit,
    Help,
    Say(&'a str),
}

fn parse_toggle(arg: &str) -> Option<bool> {
    match arg.trim() {
        "on" => Some(true),
        "off" => Some(false),
        _ => None,
    }
}

fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Say(line);
    };
    let (name, arg) = rest.split_once(' ').unwrap_or((rest, ""));
    match name {
        "clear" => Command::Clear,
        "history" => Command::History,
        "quit" | "exit" => Command::Quit,
        "dark" => parse_toggle(arg).map(Command::Dark).unwrap_or(Command::Help),
        "focus" => parse_toggle(arg).map(Command::Focus).unwrap_or(Command::Help),
        _ => Command::Help,
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let json = std::env::var("LEO_LOG_JSON").is_ok_and(|v| v.trim() == "1");

    // stdout belongs to the conversation
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let config = AppConfig::from_env().context("Invalid configuration")?;
    init_tracing(&config);
    info!("Little Genius v{} starting with the {} engine", env!("CARGO_PKG_VERSION"), config.engine);

    let paths = PortablePathManager::new(&config.data_dir);
    paths.init().context("Failed to create data directory")?;

    let prefs = Preferences::open(paths.prefs_file()).await;
    let engine = engines::build(config.engine, config.thinking_delay());
    let client = ChatClient::new(engine, config.remote()?);
    if client.is_remote() {
        info!("Replies come from {}", config.api_endpoint);
    }
    let session = ChatSession::open(client, ChatStore::new(paths.chat_history_file()), config.system_prompt.clone())
        .await
        .context("Failed to open chat history")?;

    let mut out = io::stdout();
    for record in session.records() {
        out.write_all(format!("{}\n", render(record.is_user, &record.text)).as_bytes()).await?;
    }
    out.write_all(format!("{}\n", HELP).as_bytes()).await?;
    out.flush().await?;

    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let output = match parse_command(&line) {
            Command::Quit => break,
            Command::Help => HELP.to_string(),
            Command::Clear => {
                session.clear().await?;
                "History cleared.".to_string()
            }
            Command::History => session
                .records()
                .iter()
                .map(|r| render(r.is_user, &r.text))
                .collect::<Vec<_>>()
                .join("\n"),
            Command::Dark(enabled) => {
                prefs.set_dark_mode(enabled).await?;
                format!("Dark mode {}.", if enabled { "on" } else { "off" })
            }
            Command::Focus(enabled) => {
                prefs.set_laser_focus(enabled).await?;
                format!("Laser focus {}.", if enabled { "on" } else { "off" })
            }
            Command::Say(text) => match session.send(text).await {
                Ok(Some(reply)) => render(false, &reply.text),
                Ok(None) => continue,
                Err(e) => {
                    error!("Failed to save the conversation: {}", e);
                    format!("(could not save the conversation: {})", e)
                }
            },
        };
        out.write_all(format!("{}\n", output).as_bytes()).await?;
        out.flush().await?;
    }

    info!("Goodbye");
    Ok(())
}

fn render(is_user: bool, text: &str) -> String {
    if is_user {
        format!("you> {}", text)
    } else {
        format!("leo> {}", text.replace('\n', "\n     "))
    }
}
