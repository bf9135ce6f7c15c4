//! sarufi-chat - talk to a Sarufi bot from the terminal.
//!
//! Usage: `sarufi-chat <bot-id> [--whatsapp]`
//!
//! Credentials come from `SARUFI__AUTH__*` environment variables (or `.env`).
//! Each input line is sent as a message; replies are printed to stdout.
//! `/state` shows the conversation state, `/intent <text>` predicts an intent,
//! `/quit` exits.

use std::process::ExitCode;

use sarufi::{Bot, BotId, Channel, Sarufi, SarufiConfig, SarufiError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match SarufiConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            if let Some(body) = e.body() {
                eprintln!("{}", body);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(config: SarufiConfig) -> Result<(), SarufiError> {
    let mut args = std::env::args().skip(1);
    let bot_id: BotId = args
        .next()
        .ok_or_else(|| SarufiError::config("usage: sarufi-chat <bot-id> [--whatsapp]"))?
        .parse()?;
    let channel = if args.any(|a| a == "--whatsapp") {
        Channel::Whatsapp
    } else {
        Channel::General
    };

    let client = Sarufi::new(config)?;
    let bot = client.get_bot(bot_id).await?;
    tracing::info!(chat_id = %bot.chat_id(), "Chatting with {}", bot);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| SarufiError::transport(format!("stdin: {}", e)))?
    {
        let command = match Command::parse(&line) {
            Some(Command::Quit) => break,
            Some(command) => command,
            None => continue,
        };

        for output in run_command(&bot, command, channel).await? {
            println!("{}", output);
        }
    }

    Ok(())
}

/// One line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command<'a> {
    Quit,
    State,
    Intent(&'a str),
    Say(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        Some(match line {
            "/quit" => Command::Quit,
            "/state" => Command::State,
            _ => match line.strip_prefix("/intent ") {
                Some(text) => Command::Intent(text.trim()),
                None => Command::Say(line),
            },
        })
    }
}

/// Runs one command and returns the lines to print.
///
/// An API error is logged and yields no output so the session continues;
/// any other error ends it.
async fn run_command(
    bot: &Bot,
    command: Command<'_>,
    channel: Channel,
) -> Result<Vec<String>, SarufiError> {
    match execute(bot, command, channel).await {
        Ok(output) => Ok(output),
        Err(e @ SarufiError::Api { .. }) => {
            tracing::warn!("{}", e);
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

async fn execute(
    bot: &Bot,
    command: Command<'_>,
    channel: Channel,
) -> Result<Vec<String>, SarufiError> {
    match command {
        Command::Quit => Ok(Vec::new()),
        Command::State => {
            let status = bot.chat_state(None).await?;
            Ok(vec![status.as_value().to_string()])
        }
        Command::Intent(text) => {
            let prediction = bot.predict_intent(text).await?;
            Ok(vec![format!(
                "{} ({:.2})",
                prediction.intent.as_deref().unwrap_or("unknown"),
                prediction.confidence.unwrap_or_default()
            )])
        }
        Command::Say(text) => {
            let reply = bot.send(bot.message(text).with_channel(channel)).await?;
            Ok(reply.messages())
        }
    }
}
