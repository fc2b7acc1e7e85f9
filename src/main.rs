use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use actchat::client::{ApiClient, ApiConfig, DEFAULT_API_URL};
use actchat::server::{self, GatewayConfig};
use actchat::ui;

#[derive(Debug, Parser)]
#[command(name = "actchat", version, about = "Chat client and tool gateway for an EU AI Act compliance API")]
struct Cli {
    /// Base URL of the compliance API server.
    #[arg(long, env = "API_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: String,

    /// Model identifier forwarded to the API via the x-model header.
    #[arg(long, env = "MODEL_ID", global = true)]
    model: Option<String>,

    /// Credential forwarded to the API via the x-api-key header.
    #[arg(long, env = "API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive chat with the compliance agent (default).
    Chat,
    /// Serve the compliance tools as an HTTP tool surface.
    Serve {
        #[arg(long, env = "GATEWAY_LISTEN", default_value = "127.0.0.1:7860")]
        listen: String,
    },
    /// List the tools the API server exposes.
    Tools,
    /// Check whether the API server is reachable.
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Logs go to stderr so the TUI keeps stdout to itself.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = ApiConfig::new(cli.api_url);
    config.model = cli.model;
    config.api_key = cli.api_key;
    let client = ApiClient::new(config);

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => ui::run_tui(client),
        Command::Serve { listen } => server::run(GatewayConfig { listen }, client).await,
        Command::Tools => {
            let list = client.list_tools().await?;
            for tool in list.tools {
                if tool.description.is_empty() {
                    println!("{}", tool.name);
                } else {
                    println!("{:<24} {}", tool.name, tool.description);
                }
            }
            Ok(())
        }
        Command::Status => match client.health().await {
            Ok(health) => {
                println!("✅ {} v{}", health.service, health.version);
                Ok(())
            }
            Err(err) => {
                println!("❌ {err}");
                std::process::exit(1);
            }
        },
    }
}
