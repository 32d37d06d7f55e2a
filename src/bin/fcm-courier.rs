use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use fcm_courier::config::loader;
use fcm_courier::observability::metrics::get_metrics;
use fcm_courier::utils::logging::{self, LogLevel};
use fcm_courier::{FcmError, Messaging, OutboundItem};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "fcm-courier.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// Print collected metrics to stderr before exiting
    #[arg(long)]
    metrics: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send every message of a JSON file
    Send { messages: PathBuf },
    /// Dry-run every message of a JSON file
    Validate { messages: PathBuf },
    /// Print an access token
    Token {
        #[arg(long)]
        force: bool,
    },
    /// Print Instance ID info of a registration token
    Info {
        token: String,
        #[arg(long)]
        details: bool,
    },
    /// Send one message to a topic
    Topic {
        topic: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
    },
    /// Remove registration tokens from a topic
    Unsubscribe {
        topic: String,
        #[arg(required = true)]
        tokens: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config
    // -------------------------------

    let args = Args::parse();
    let show_metrics = args.metrics;
    let service_config = loader::file_to_config(Path::new(&args.config)).await?;
    logging::run(&service_config, args.log_level);

    // -------------------------------
    // 2. Build client
    // -------------------------------

    let messaging = Messaging::from_config(&service_config)?;
    info!(project_id = %messaging.project_id(), "client ready");

    // -------------------------------
    // 3. Run command
    // -------------------------------

    let outcome: Result<()> = async {
        match args.command {
            Command::Send { messages } => {
                let items = read_messages(&messages).await?;
                print_batch(messaging.send_all(&items).await)
            }
            Command::Validate { messages } => {
                let items = read_messages(&messages).await?;
                print_batch(messaging.validate_all(&items).await)
            }
            Command::Token { force } => {
                println!("{}", messaging.get_token(force).await?);
                Ok(())
            }
            Command::Info { token, details } => {
                let info = messaging.get_info(&token, details).await?;
                println!("{}", serde_json::to_string_pretty(&info)?);
                Ok(())
            }
            Command::Topic { topic, title, body } => {
                let item = OutboundItem::to_topic("cli", topic, title, body);
                let sent = messaging.send_to_topic(&item).await?;
                println!("{}", serde_json::json!({ "sent": sent }));
                Ok(())
            }
            Command::Unsubscribe { topic, tokens } => {
                let response = messaging.unsubscribe_from_topic(&tokens, &topic).await?;
                println!("{}", serde_json::to_string_pretty(&response)?);
                Ok(())
            }
        }
    }
    .await;

    if show_metrics {
        eprintln!("{}", get_metrics().await.render()?);
    }
    outcome
}

async fn read_messages(path: &Path) -> Result<Vec<OutboundItem>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read messages file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid messages file {}", path.display()))
}

fn print_batch(outcome: Result<fcm_courier::BatchResult, FcmError>) -> Result<()> {
    match outcome {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(err) => {
            if let Some(partial) = err.partial_result() {
                error!("batch aborted, printing partial result");
                println!("{}", serde_json::to_string_pretty(partial)?);
            }
            Err(anyhow!(err))
        }
    }
}
