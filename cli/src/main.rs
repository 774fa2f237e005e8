mod client;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client::DaemonClient;
use shared::ipc::{ChatSender, Command, Response, StatusInfo};
use shared::{InteractionMode, Page};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cashier")]
#[command(about = "CLI tool for the virtual cashier voice daemon")]
struct Cli {
    /// Daemon socket (defaults to $XDG_RUNTIME_DIR/cashierd.sock)
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set the interaction mode (touch, voice-touch)
    Mode { mode: InteractionMode },
    /// Switch between touch-only and voice-and-touch
    Toggle,
    Status,
    /// Restart voice listening after it got stuck or suspended
    Retry,
    /// Navigate the kiosk to a page (home, scanner, catalogue, payment, ...)
    Go { page: Page },
    /// Simulate the shopper saying something
    Say {
        text: Vec<String>,
        /// Send as an in-progress (interim) result
        #[arg(long)]
        interim: bool,
    },
    /// Simulate the recognizer ending its session
    End,
    /// Clear the shown transcript and matched command
    Clear,
    /// Simulate a recognizer error code (e.g. no-speech, network, not-allowed)
    Fault { code: String },
    /// List the voice commands available on the current page
    Commands,
    /// Ask the help assistant a question
    Chat { text: Vec<String> },
    /// Close the help dialog
    ChatClose,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = match cli.socket {
        Some(path) => DaemonClient::with_socket(path),
        None => DaemonClient::new(),
    };

    let command = match cli.command {
        Commands::Mode { mode } => Command::SetMode(mode),
        Commands::Toggle => Command::Toggle,
        Commands::Status => Command::Status,
        Commands::Retry => Command::Retry,
        Commands::Go { page } => Command::Navigate(page),
        Commands::Say { text, interim } => Command::Speak {
            text: text.join(" "),
            is_final: !interim,
        },
        Commands::End => Command::EndSession,
        Commands::Clear => Command::ResetTranscript,
        Commands::Fault { code } => Command::InjectError(code),
        Commands::Commands => Command::Commands,
        Commands::Chat { text } => Command::Chat(text.join(" ")),
        Commands::ChatClose => Command::CloseChat,
    };

    match client.send_command(command).await {
        Ok(Response::Ok) => {
            println!("Success");
        }
        Ok(Response::Status(info)) => print_status(&info),
        Ok(Response::Commands(commands)) => {
            println!("Available voice commands:");
            for command in commands {
                println!("  {:<20} {}", command.label, command.description);
                println!("  {:<20} say: {}", "", command.keywords.join(", "));
            }
        }
        Ok(Response::Chat(lines)) => {
            for line in lines {
                let who = match line.sender {
                    ChatSender::User => "you",
                    ChatSender::Assistant => "assistant",
                };
                println!("[{}] {}: {}", line.id, who, line.text);
            }
        }
        Ok(Response::Error(msg)) => {
            eprintln!("Error: {}", msg);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to talk to cashierd: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_status(info: &StatusInfo) {
    println!("Status:");
    println!("  Mode: {}", info.mode);
    println!("  Listening: {} ({})", info.is_listening, info.state);
    if !info.is_supported {
        println!("  Voice input: unsupported on this platform");
    }
    println!("  Locale: {}", info.locale);
    if !info.transcript.is_empty() {
        println!("  Heard: \"{}\"", info.transcript);
    }
    if !info.interim_transcript.is_empty() {
        println!("  Hearing: \"{}\"...", info.interim_transcript);
    }
    if let Some(command) = &info.matched_command {
        println!("  Matched: {}", command);
    }
    if let Some(error) = &info.last_error {
        println!("  Last error: {}", error);
    }
    println!("  Page: {}", info.page);
    println!("  Cart items: {}", info.cart_items);
    println!("  Filter: {:?}", info.filter);
    if let Some(method) = info.payment_method {
        println!("  Payment method: {:?}", method);
    }
}
