use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use voxdemo_call::{
    CallHooks, ClientFactory, NullClient, ProviderClient, ProxyClient, RealtimeClient,
};
use voxdemo_cli::{ApiKeyStore, DemoController};
use voxdemo_core::link::demo_url;
use voxdemo_feedback::FeedbackSubmitter;
use voxdemo_proxy::ProxyConfig;

const PROVIDER_KEY_ENV: &str = "VOXDEMO_PROVIDER_API_KEY";

#[derive(Parser)]
#[command(name = "voxdemo", about = "voxdemo — shareable voice-AI agent demos")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "voxdemo.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the backend call proxy
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run a lifecycle-only demo call against an agent
    Call {
        /// The agent id from the provider dashboard
        agent_id: String,
        /// Use the stored provider key directly instead of the call proxy
        /// (insecure, demo-only)
        #[arg(long)]
        direct: bool,
    },
    /// Print the shareable demo URL for an agent
    Link {
        /// The agent id from the provider dashboard
        agent_id: String,
    },
    /// Submit feedback notes for an agent
    Feedback {
        /// The agent the feedback refers to
        agent_id: String,
        /// The notes to submit
        notes: String,
    },
    /// Manage the stored provider API key (plaintext, demo-only)
    Apikey {
        #[command(subcommand)]
        action: ApikeyAction,
    },
}

#[derive(Subcommand)]
enum ApikeyAction {
    /// Store a provider API key
    Set { key: String },
    /// Show whether a key is stored
    Show,
    /// Remove the stored key
    Clear,
}

#[derive(Deserialize)]
struct VoxdemoConfig {
    /// Origin used for shareable demo links.
    #[serde(default = "default_origin")]
    origin: String,
    /// Base URL of the backend call proxy.
    #[serde(default = "default_proxy_url")]
    proxy_url: String,
    /// Where feedback notes are POSTed.
    #[serde(default = "default_webhook_url")]
    feedback_webhook_url: String,
    #[serde(default = "default_data_dir")]
    data_dir: PathBuf,
    #[serde(default)]
    server: ServerConfig,
    #[serde(default = "default_provider_base_url")]
    provider_base_url: String,
}

#[derive(Deserialize)]
struct ServerConfig {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_origin() -> String {
    "http://localhost:5173".to_string()
}
fn default_proxy_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_webhook_url() -> String {
    "https://webhook.site/your-dummy-url".to_string()
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_provider_base_url() -> String {
    "https://api.retellai.com".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}

async fn load_config(path: &PathBuf) -> anyhow::Result<VoxdemoConfig> {
    if !path.exists() {
        // Every field has a serde default; an absent file means defaults.
        return Ok(toml::from_str("")?);
    }
    let config_str = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
    Ok(toml::from_str(&config_str)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config).await?;

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);

            let key = match std::env::var(PROVIDER_KEY_ENV) {
                Ok(key) if !key.is_empty() => key,
                _ => ApiKeyStore::new(&config.data_dir)
                    .load()
                    .await?
                    .unwrap_or_default(),
            };
            if key.is_empty() {
                anyhow::bail!(
                    "no provider API key: set {PROVIDER_KEY_ENV} or run `voxdemo apikey set`"
                );
            }

            info!("Starting call proxy on {}:{}", host, port);
            let proxy_config = ProxyConfig {
                provider_api_key: key,
                provider_base_url: config.provider_base_url,
            };
            voxdemo_proxy::serve(&format!("{host}:{port}"), proxy_config).await?;
        }

        Commands::Call { agent_id, direct } => {
            run_call(&config, &agent_id, direct).await?;
        }

        Commands::Link { agent_id } => {
            println!("{}", demo_url(&config.origin, &agent_id)?);
        }

        Commands::Feedback { agent_id, notes } => {
            FeedbackSubmitter::new(config.feedback_webhook_url.clone())
                .submit(&agent_id, &notes)
                .await?;
            println!("Feedback submitted successfully!");
        }

        Commands::Apikey { action } => {
            let store = ApiKeyStore::new(&config.data_dir);
            match action {
                ApikeyAction::Set { key } => {
                    store.save(&key).await?;
                    println!(
                        "Provider API key saved to {} (plaintext, demo-only)",
                        store.path().display()
                    );
                }
                ApikeyAction::Show => match store.load().await? {
                    Some(key) => {
                        let tail: String = {
                            let chars: Vec<char> = key.chars().collect();
                            chars[chars.len().saturating_sub(4)..].iter().collect()
                        };
                        println!("Provider API key is set (...{tail})");
                    }
                    None => println!("No provider API key stored"),
                },
                ApikeyAction::Clear => {
                    store.clear().await?;
                    println!("Provider API key cleared");
                }
            }
        }
    }

    Ok(())
}

/// Drives a lifecycle-only demo call: token fetch, connect, live transcript,
/// teardown on Ctrl-C. No audio flows; media belongs to the provider's
/// browser SDK.
async fn run_call(config: &VoxdemoConfig, agent_id: &str, direct: bool) -> anyhow::Result<()> {
    if direct {
        // Legacy path: provider key lives on this machine. Demo-only.
        let store = ApiKeyStore::new(&config.data_dir);
        let key = store.load().await?.ok_or_else(|| {
            anyhow::anyhow!("Please configure your provider API key first (`voxdemo apikey set`)")
        })?;
        let provider = ProviderClient::with_base_url(key, config.provider_base_url.clone());
        let call = provider.create_web_call(agent_id.trim()).await?;
        println!("call_id: {}", call.call_id);
        println!("access_token: {}", call.access_token);
        println!("Use the access token with the provider web SDK to join the call.");
        return Ok(());
    }

    let factory: Arc<dyn ClientFactory> =
        Arc::new(|| Arc::new(NullClient::new()) as Arc<dyn RealtimeClient>);
    let hooks = CallHooks {
        on_call_start: Some(Box::new(|| info!("Connected to your AI agent"))),
        on_call_end: Some(Box::new(|| info!("Call ended"))),
        on_transcript: Some(Box::new(|entry| {
            println!("[{}] {}", entry.role, entry.content);
        })),
        on_error: Some(Box::new(|message| {
            error!(error = %message, "Call error");
        })),
    };

    let controller = DemoController::new(
        agent_id,
        ProxyClient::new(config.proxy_url.clone()),
        factory,
        hooks,
    )?;

    controller.start().await;
    if controller.coordinator().is_call_active() {
        info!(
            status = %controller.coordinator().status_text(),
            "call is live; press Ctrl-C to hang up"
        );
        tokio::signal::ctrl_c().await?;
        controller.end().await;
    }

    Ok(())
}
