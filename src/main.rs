use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ticker_watch::{ChromeBrowser, Cli, MentionService, Poller};

#[tokio::main]
async fn main() -> Result<()> {
    // ログ設定（RUST_LOG で上書き可能）
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    info!("Ticker: {}", cli.ticker.as_deref().unwrap_or("<missing>"));
    info!("Interval: {}", cli.interval.as_deref().unwrap_or("<missing>"));

    // 引数エラーはブラウザ起動前に終了コード 1 で終わる
    let config = cli.into_config()?;

    let browser = Arc::new(
        ChromeBrowser::launch(config.headless, config.scrape.navigation_timeout).await?,
    );

    let service = MentionService::new(Arc::clone(&browser), config.scrape.clone());
    Poller::new(service, config).run_until(shutdown_signal()).await;

    match Arc::try_unwrap(browser) {
        Ok(browser) => browser.shutdown().await?,
        Err(_) => warn!("Browser still in use, leaving cleanup to process exit"),
    }

    Ok(())
}

/// Ctrl-C または SIGTERM を待つ
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
