/// AnonyChat Admin
///
/// `serve` runs the admin gateway over the moderation store;
/// `monitor` runs the terminal dashboard against a running gateway.

use anonychat_admin::{
    config::{ServerConfig, DEFAULT_LOG_FILTER},
    context::AppContext,
    monitor, server,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "anonychat-admin", version, about = "AnonyChat moderation gateway and admin monitor")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the admin gateway (default)
    Serve,
    /// Watch a running gateway and issue ban/unban commands
    Monitor {
        /// Dashboard URL carrying the admin key, e.g. http://localhost:3000/admin?key=...
        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration (also picks up RUST_LOG from .env)
    let config = ServerConfig::from_env()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_new(&config.logging.level)
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let ctx = AppContext::new(config).await?;
            server::serve(ctx).await?;
        }
        Command::Monitor { url } => {
            config.validate()?;
            let url = url.unwrap_or_else(|| config.monitor.dashboard_url.clone());
            monitor::terminal::run(&config.monitor, &url).await?;
        }
    }

    Ok(())
}
