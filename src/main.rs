//! CLI for FrameRelay
//!
//! Subcommands:
//! - `server`: run the relay
//! - `subscribe`: attach to a channel and log received frames (smoke test)
//! - `publish`: send files as frames to a channel (smoke test)

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use framerelay::client::{publish_files, subscribe};
use framerelay::config::load_config;
use framerelay::hub::Hub;
use framerelay::transport::{bind, serve};
use framerelay::utils::{RelayError, logging};
use tracing::{error, info};

const DEFAULT_URL: &str = "ws://127.0.0.1:9000";

#[derive(Parser)]
#[command(name = "framerelay", version, about = "Live binary frame relay")]
enum Command {
    /// Start the relay server
    Server {
        /// Listen address, overriding configuration (e.g. 0.0.0.0:9000)
        #[arg(long)]
        addr: Option<String>,
    },
    /// Attach to a channel and log every received frame
    Subscribe {
        /// Relay base URL
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
        /// Channel identifier
        #[arg(long)]
        channel: String,
    },
    /// Publish each file as one frame on a channel
    Publish {
        /// Relay base URL
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
        /// Channel identifier
        #[arg(long)]
        channel: String,
        /// Pause between frames, in milliseconds
        #[arg(long, default_value_t = 100)]
        interval_ms: u64,
        /// Keep cycling through the files until interrupted
        #[arg(long)]
        repeat: bool,
        /// Files to send, one frame each
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cmd = Command::parse();
    dotenvy::dotenv().ok();

    let settings = match load_config() {
        Ok(settings) => settings,
        Err(e) => {
            logging::init("info");
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init(&settings.log.level);

    let result = match cmd {
        Command::Server { addr } => {
            let addr = addr.unwrap_or_else(|| settings.server.addr());
            run_server(&addr, Hub::new(&settings.relay)).await
        }
        Command::Subscribe { url, channel } => subscribe(&url, &channel).await.map(|summary| {
            info!(
                frames = summary.frames,
                bytes = summary.bytes,
                "subscription ended"
            );
        }),
        Command::Publish {
            url,
            channel,
            interval_ms,
            repeat,
            files,
        } => publish_files(
            &url,
            &channel,
            &files,
            Duration::from_millis(interval_ms),
            repeat,
        )
        .await
        .map(|_| ()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_server(addr: &str, hub: Hub) -> Result<(), RelayError> {
    let listener = bind(addr).await?;

    tokio::select! {
        _ = serve(listener, Arc::new(hub)) => {
            error!("Relay server exited unexpectedly.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    Ok(())
}
