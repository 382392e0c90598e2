use anyhow::Context;
use log::error;
use playground::{serve, RandomOutcomes, Responder};
use playground_metrics::PlaygroundMetrics;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    //init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        error!("{:#}", e);
        process::exit(1);
    }
    process::exit(0);
}

async fn run() -> anyhow::Result<()> {
    let listen_addr = common_env::listen_addr();
    let addr = tokio::net::lookup_host(listen_addr)
        .await
        .with_context(|| format!("failed to resolve {}", listen_addr))?
        .next()
        .with_context(|| format!("no address found for {}", listen_addr))?;

    let metrics = Arc::new(PlaygroundMetrics::new()?);
    let responder = Arc::new(Responder::new(
        metrics,
        Arc::new(RandomOutcomes::default()),
    ));
    serve(
        addr,
        responder,
        tokio::signal::ctrl_c(),
        common_env::shutdown_timeout(),
    )
    .await?;
    Ok(())
}
