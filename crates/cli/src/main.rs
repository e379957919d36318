mod config;
mod error;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use orchestrator::{AnthropicBackend, McpServer, Session};
use tracing_subscriber::EnvFilter;

use config::Config;
use error::Result;

const CONFIG_FILE: &str = "tiller.toml";

#[derive(Parser)]
#[command(name = "tiller")]
#[command(about = "MCP client that binds prompts to tools around an LLM loop", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the config file.
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat,
    /// List the tools discovered on the server
    Tools,
    /// Run a single query and print the answer
    Query {
        /// The query text
        text: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Some(Commands::Chat) | None => cmd_chat(config).await,
        Some(Commands::Tools) => cmd_tools(config).await,
        Some(Commands::Query { text }) => cmd_query(config, &text).await,
    }
}

/// Spawn the MCP server and open a session against it.
async fn connect(config: &Config) -> Result<Session<AnthropicBackend, McpServer>> {
    let mut builder = AnthropicBackend::builder(config.api_key()?, &config.backend.model);
    if let Some(system) = &config.system {
        builder = builder.system(system);
    }
    let backend = builder.build();

    let server = McpServer::spawn(config.server.clone()).await?;
    Ok(Session::connect(backend, server).await?)
}

/// Idempotent at this boundary: a failed shutdown only warns.
async fn disconnect(session: Session<AnthropicBackend, McpServer>) {
    let server = session.disconnect();
    if let Err(e) = server.shutdown().await {
        tracing::warn!(error = %e, "MCP server shutdown failed");
    }
}

async fn cmd_chat(config: Config) -> Result<()> {
    println!("tiller v{}", env!("CARGO_PKG_VERSION"));

    let mut session = connect(&config).await?;
    println!("Session ID: {}", session.id);
    println!("Model: {}", config.backend.model);
    println!(
        "Server: {} ({} tools)",
        config.server.command,
        session.catalog().len()
    );
    println!("Type 'quit' or Ctrl+D to exit.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "exit" {
            break;
        }

        match session.process_query(input).await {
            Ok(answer) => {
                println!("\n{answer}\n");
            }
            Err(e) => {
                eprintln!("Error: {e}\n");
            }
        }
    }

    disconnect(session).await;
    println!("\nSession ended.");
    Ok(())
}

async fn cmd_tools(config: Config) -> Result<()> {
    let session = connect(&config).await?;

    if session.catalog().is_empty() {
        println!("No tools exposed by {}.", config.server.command);
    } else {
        for spec in session.catalog().specs() {
            println!("{:<24}  {}", spec.name, spec.description);
        }
    }

    disconnect(session).await;
    Ok(())
}

async fn cmd_query(config: Config, text: &str) -> Result<()> {
    let mut session = connect(&config).await?;
    let result = session.process_query(text).await;
    disconnect(session).await;

    println!("{}", result?);
    Ok(())
}
