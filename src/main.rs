//! Context Explainer - word-in-context explanations from an LLM
//!
//! `serve` runs the relay daemon; `session` is a line-driven capture
//! front-end; `explain` and `models` are one-shot helpers.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use context_explainer::capture::{Anchor, CaptureSession, ExplanationRequest};
use context_explainer::config::{self, Settings};
use context_explainer::error::{ExplainerError, RelayError};
use context_explainer::history::ExplanationLog;
use context_explainer::ipc::{self, IpcClient, IpcServer};
use context_explainer::presentation::{render_result, TracingPresenter};
use context_explainer::relay::{ExplanationResult, Relay};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Relay socket path
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the relay daemon
    Serve,

    /// Explain a word in the given context
    Explain {
        #[arg(short, long)]
        word: String,

        #[arg(short, long)]
        context: String,

        /// Call the upstream directly instead of going through the relay
        #[arg(long)]
        direct: bool,
    },

    /// List the models offered by the configured provider
    Models {
        #[arg(long)]
        direct: bool,
    },

    /// Capture words and contexts from stdin ("word ...", "context ...")
    Session {
        #[arg(long)]
        direct: bool,
    },

    /// Inspect the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective settings
    Show,
    /// Print the settings file location
    Path,
    /// Write the default settings if there is no settings file
    Init,
}

/// Route to the upstream: through the relay socket or straight out
#[derive(Clone)]
enum Transport {
    Socket(IpcClient),
    Direct(Relay),
}

impl Transport {
    fn new(direct: bool, socket: PathBuf, settings: &Settings) -> Self {
        if direct {
            Transport::Direct(Relay::from_settings(settings))
        } else {
            Transport::Socket(IpcClient::new(socket))
        }
    }

    async fn explain(&self, request: &ExplanationRequest) -> ExplanationResult {
        match self {
            Transport::Direct(relay) => relay.explain(request).await,
            Transport::Socket(client) => match client.query_llm(request).await {
                Ok(text) => Ok(text),
                Err(ExplainerError::Relay(e)) => Err(e),
                Err(e) => Err(RelayError::Remote(e.to_string())),
            },
        }
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        match self {
            Transport::Direct(relay) => Ok(relay.list_available_models().await?),
            Transport::Socket(client) => Ok(client.check_models().await?),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let socket = args.socket.clone().unwrap_or_else(ipc::socket_path);

    match args.command {
        Command::Serve => serve(socket).await,
        Command::Explain {
            word,
            context,
            direct,
        } => {
            let settings = Settings::load()?;
            let mut session = CaptureSession::new();
            session.capture_word(&word, Anchor::default())?;
            let request = session.capture_context(&context)?;

            let result = Transport::new(direct, socket, &settings)
                .explain(&request)
                .await;
            println!("{}", render_result(&request, &result));
            result?;
            Ok(())
        }
        Command::Models { direct } => {
            let settings = Settings::load()?;
            let models = Transport::new(direct, socket, &settings).list_models().await?;
            if models.is_empty() {
                println!("(no models available)");
            }
            for model in models {
                println!("{}", model);
            }
            Ok(())
        }
        Command::Session { direct } => run_session(direct, socket).await,
        Command::Config { action } => {
            match action {
                ConfigAction::Show => {
                    let settings = Settings::load()?;
                    println!("{}", serde_json::to_string_pretty(&settings)?);
                }
                ConfigAction::Path => println!("{}", config::config_path().display()),
                ConfigAction::Init => {
                    Settings::load_or_init()?;
                    println!("{}", config::config_path().display());
                }
            }
            Ok(())
        }
    }
}

async fn serve(socket: PathBuf) -> Result<()> {
    info!("📚 Context Explainer relay v{} starting...", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load_or_init()?;
    let relay = Relay::from_settings(&settings);
    let mut server = IpcServer::new(relay);
    server.start(&socket)?;

    info!("✅ Relay ready");
    tokio::signal::ctrl_c().await?;

    info!("Shutting down");
    server.stop();
    Ok(())
}

/// Line-driven capture front-end. Each completed capture gets its own task,
/// so a slow upstream never blocks the next capture.
async fn run_session(direct: bool, socket: PathBuf) -> Result<()> {
    let settings = Settings::load()?;
    let transport = Transport::new(direct, socket, &settings);
    let popup_delay = Duration::from_millis(settings.popup_delay);
    let log = ExplanationLog::open_default();

    let mut session = CaptureSession::new();
    session.subscribe(Box::new(TracingPresenter));

    if !settings.enabled {
        warn!("⚠️ Context Explainer is disabled in settings; captures are ignored");
    }

    let mut in_flight = JoinSet::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim_start();

        match command {
            "" => {}
            "quit" | "exit" => break,
            "cancel" => session.cancel(),
            "word" | "context" if !settings.enabled => {}
            // Rejections are reported by the presenter
            "word" => {
                let _ = session.capture_word(rest, Anchor::default());
            }
            "context" => {
                if let Ok(request) = session.capture_context(rest) {
                    let transport = transport.clone();
                    let log = log.clone();
                    in_flight.spawn(async move {
                        let result = transport.explain(&request).await;
                        tokio::time::sleep(popup_delay).await;
                        println!("{}", render_result(&request, &result));
                        if let Err(e) = log.append(&request, &result) {
                            warn!("Failed to write explanation log: {}", e);
                        }
                    });
                }
            }
            other => warn!("Unknown command '{}' (use word, context, cancel, quit)", other),
        }

        // Reap finished explanations so the set stays small
        while in_flight.try_join_next().is_some() {}
    }

    while in_flight.join_next().await.is_some() {}
    Ok(())
}
