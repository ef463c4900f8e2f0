use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::session::ChromeSession;
use crate::error::ScraperError;
use crate::traits::{RenderSession, Renderer};

/// 省メモリ・高速化のための起動オプション
const LAUNCH_ARGS: &[&str] = &[
    "--disable-dev-shm-usage",
    "--disable-accelerated-2d-canvas",
    "--disable-gpu",
    "--no-first-run",
    "--no-zygote",
    "--disable-background-networking",
    "--disable-default-apps",
    "--disable-extensions",
    "--disable-sync",
    "--disable-translate",
];

/// プロセス全体で共有するヘッドレスブラウザ
///
/// 起動時に一度だけ生成し、終了シグナル受信後に [`ChromeBrowser::shutdown`] で解放する。
pub struct ChromeBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl ChromeBrowser {
    /// ブラウザを起動
    pub async fn launch(headless: bool, request_timeout: Duration) -> Result<Self, ScraperError> {
        info!("Launching browser (headless={})...", headless);

        // ユニークなユーザーデータディレクトリを生成
        let unique_id = format!(
            "{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );
        let user_data_dir = std::env::temp_dir().join(format!("ticker-watch-{}", unique_id));

        let mut builder = BrowserConfig::builder()
            .user_data_dir(&user_data_dir)
            .no_sandbox()
            .request_timeout(request_timeout);

        // Chrome パスの指定がなければ chromiumoxide の自動検出に任せる
        if let Ok(chrome_path) = std::env::var("CHROME_PATH") {
            builder = builder.chrome_executable(chrome_path);
        }

        if !headless {
            builder = builder.with_head();
        }

        for arg in LAUNCH_ARGS {
            builder = builder.arg(*arg);
        }

        let config = builder.build().map_err(ScraperError::BrowserInit)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        // ハンドラータスクを起動
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("Browser event: {:?}", event);
            }
        });

        info!("Browser launched");
        Ok(Self { browser, handler })
    }

    /// ブラウザを閉じてプロセス終了を待つ
    pub async fn shutdown(mut self) -> Result<(), ScraperError> {
        info!("Closing browser...");

        self.browser
            .close()
            .await
            .map_err(|e| ScraperError::Shutdown(e.to_string()))?;

        if let Err(e) = self.browser.wait().await {
            debug!("Failed to wait for browser process: {}", e);
        }
        self.handler.abort();

        info!("Browser closed");
        Ok(())
    }
}

#[async_trait]
impl Renderer for ChromeBrowser {
    async fn new_session(&self) -> Result<Box<dyn RenderSession>, ScraperError> {
        let session = ChromeSession::open(&self.browser).await?;
        Ok(Box::new(session))
    }
}
