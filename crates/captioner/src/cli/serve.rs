//! The `captioner serve` command.

use clap::Args;
use captioner_core::Config;
use tokio::net::TcpListener;

use crate::server;

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides PORT and server.port)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Initialize everything, then serve until Ctrl-C.
///
/// The listener is bound only after the vocabulary and both models loaded.
pub async fn execute(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let processor = super::load_processor(&config).await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Cannot bind {}: {}", addr, e))?;

    let router = server::build_router(processor, &config.limits);
    server::serve(listener, router).await
}
