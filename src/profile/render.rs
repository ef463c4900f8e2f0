//! ページの読み込み待機
//!
//! ナビゲーション → ネットワークアイドル → コンテンツ要素の出現 の順に待つ。

use serde_json::Value;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info};

use crate::config::ScrapeOptions;
use crate::error::ScraperError;
use crate::traits::RenderSession;

/// 投稿のコンテナ要素
pub const CONTENT_MARKER: &str = "article";

pub const CONTENT_COUNT_SCRIPT: &str = "document.querySelectorAll('article').length";

/// スクリプトの戻り値を非負整数として取り出す
pub(crate) fn as_count(value: &Value, what: &str) -> Result<u64, ScraperError> {
    value.as_u64().ok_or_else(|| {
        ScraperError::ScriptExecution(format!("{}: 数値以外の戻り値 {}", what, value))
    })
}

/// プロフィールページを開き、コンテンツが描画されるまで待機
pub async fn load_profile(
    session: &dyn RenderSession,
    url: &str,
    options: &ScrapeOptions,
) -> Result<(), ScraperError> {
    let navigation = async {
        session.goto(url).await?;
        wait_network_idle(session, options).await
    };

    timeout(options.navigation_timeout, navigation)
        .await
        .map_err(|_| {
            ScraperError::NavigationTimeout(format!(
                "{} did not reach network idle within {:?}",
                url, options.navigation_timeout
            ))
        })??;

    timeout(options.content_timeout, wait_for_content(session, options))
        .await
        .map_err(|_| {
            ScraperError::NavigationTimeout(format!(
                "no {} element on {} within {:?}",
                CONTENT_MARKER, url, options.content_timeout
            ))
        })
}

/// 実行中のリクエストが閾値以下の状態が `network_idle_window` 続くまで待機（タイムアウトは呼び出し側）
async fn wait_network_idle(
    session: &dyn RenderSession,
    options: &ScrapeOptions,
) -> Result<(), ScraperError> {
    let start = Instant::now();
    let mut idle_since: Option<Instant> = None;

    loop {
        match session.inflight_requests().await {
            Ok(inflight) if inflight <= options.max_idle_connections => {
                let since = *idle_since.get_or_insert_with(Instant::now);
                if since.elapsed() >= options.network_idle_window {
                    debug!(
                        "Network idle after {:?} ({} in flight)",
                        start.elapsed(),
                        inflight
                    );
                    return Ok(());
                }
            }
            Ok(inflight) => {
                debug!("Network busy: {} requests in flight", inflight);
                idle_since = None;
            }
            Err(e) => {
                debug!("Network idle check error: {}", e);
                idle_since = None;
            }
        }

        sleep(options.poll_interval).await;
    }
}

/// 少なくとも1つの article 要素が現れるまで待機（タイムアウトは呼び出し側）
async fn wait_for_content(session: &dyn RenderSession, options: &ScrapeOptions) {
    let start = Instant::now();

    loop {
        match session.evaluate(CONTENT_COUNT_SCRIPT).await {
            Ok(value) => {
                let count = as_count(&value, CONTENT_MARKER).unwrap_or(0);
                if count > 0 {
                    info!(
                        "Found {} {} elements after {:?}",
                        count,
                        CONTENT_MARKER,
                        start.elapsed()
                    );
                    return;
                }
            }
            Err(e) => debug!("Content check error: {}", e),
        }

        sleep(options.poll_interval).await;
    }
}
