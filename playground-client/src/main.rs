use clap::Parser;
use log::error;
use playground_client::Generator;
use std::num::NonZeroUsize;
use std::process;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Send randomized requests to the playground server")]
struct Args {
    /// the number of concurrent requests to make
    #[arg(long = "cr", default_value_t = default_concurrency())]
    concurrency: NonZeroUsize,

    /// host:port of the playground server
    #[arg(long, default_value_t = common_env::listen_addr().to_string())]
    target: String,
}

fn default_concurrency() -> NonZeroUsize {
    NonZeroUsize::new(common_env::concurrent_requests()).unwrap_or(NonZeroUsize::MIN)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let generator = match Generator::new(args.concurrency, &args.target) {
        Ok(generator) => generator,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    // in-flight requests are abandoned on exit
    let cancel = CancellationToken::new();
    match generator.run_until(cancel, tokio::signal::ctrl_c()).await {
        Ok(_) => process::exit(0),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}
