use clap::Parser;
use health_monitor::{Cli, Shutdown, monitor, shutdown};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "health_monitor=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let target = cli.target();

    let shutdown = Shutdown::new();
    tokio::spawn(shutdown::listen_for_signals(shutdown.clone()));

    if let Err(e) = monitor::run(&target, shutdown).await {
        println!("❌ Fatal error: {e}");
    }
    println!("👋 Terminal monitor stopped");
}
