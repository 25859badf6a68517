//! devserve: local development server.
//!
//! # Architecture Overview
//!
//! ```text
//!   Browser GET/HEAD                       Browser WebSocket
//!        │                                        │
//!        ▼                                        ▼
//!  ┌───────────┐   ┌──────────────┐        ┌──────────────┐
//!  │ net bind  │──▶│ http server  │        │ reload server│
//!  │ asset port│   │ favicon      │        │ /livereload  │
//!  └───────────┘   │ routing ─────┼─┐      │ /changed     │
//!                  │ ServeDir     │ │      └──────┬───────┘
//!                  └──────────────┘ │             │
//!                                   ▼             ▼
//!                            ┌──────────┐   ┌──────────────┐
//!                            │ routing  │   │LiveReloadHub │◀── CompileEvents
//!                            │ rules    │   └──────────────┘     (watcher,
//!                            └──────────┘                         compilers)
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use devserve::config::{read_config, ServerConfig};
use devserve::lifecycle::{start, wait_for_signal, Shutdown};
use devserve::observability::{init_logging, init_metrics};
use devserve::CompileEvents;

/// Command-line arguments. Values given here override the config file.
#[derive(Debug, Parser)]
#[command(name = "devserve", version, about = "Development static server with live reload")]
struct Args {
    /// Config file (defaults to ./devserve.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Asset port
    #[arg(short, long)]
    port: Option<u16>,

    /// Live-reload notification port
    #[arg(long)]
    notify_port: Option<u16>,

    /// Directory files are served from
    #[arg(long)]
    root: Option<PathBuf>,

    /// Directory under the root that unmatched URLs map into
    #[arg(long)]
    base: Option<String>,

    /// Publish reloads when files under the base directory change
    #[arg(long)]
    watch: bool,
}

impl Args {
    fn apply(self, config: &mut ServerConfig) {
        if let Some(port) = self.port {
            config.asset_port = port;
        }
        if let Some(port) = self.notify_port {
            config.notify_port = port;
        }
        if let Some(root) = self.root {
            config.root_dir = root;
        }
        if let Some(base) = self.base {
            config.base_dir = base;
        }
        if self.watch {
            config.watch.enabled = true;
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let mut config = match read_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_logging("info");
            fatal(&e)
        }
    };
    args.apply(&mut config);

    init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "devserve starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let events = CompileEvents::default();
    let shutdown = Shutdown::new();

    let server = match start(&config, &events, &shutdown).await {
        Ok(server) => server,
        Err(e) => fatal(&e),
    };

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        trigger.trigger();
    });

    if let Err(e) = server.wait().await {
        fatal(&e);
    }
    tracing::info!("Shutdown complete");
}

fn fatal(error: &dyn std::error::Error) -> ! {
    tracing::error!(error = %error, "Fatal error");
    std::process::exit(1);
}
