use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::fetch::{
    EnableParams, EventRequestPaused, FailRequestParams, RequestPattern,
};
use chromiumoxide::cdp::browser_protocol::network::{ErrorReason, ResourceType};
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::debug;

use super::network::NetworkTracker;
use crate::error::ScraperError;
use crate::traits::RenderSession;

/// 読み込み時間短縮のため遮断するリソース種別
pub const BLOCKED_RESOURCE_TYPES: [ResourceType; 3] = [
    ResourceType::Image,
    ResourceType::Stylesheet,
    ResourceType::Font,
];

pub fn is_blocked(resource_type: &ResourceType) -> bool {
    BLOCKED_RESOURCE_TYPES.contains(resource_type)
}

/// chromiumoxide の Page を包んだセッション
pub struct ChromeSession {
    page: Page,
    request_filter: JoinHandle<()>,
    network: NetworkTracker,
}

impl ChromeSession {
    /// 空白ページを開いてリクエストフィルタとネットワーク監視を設定
    pub(crate) async fn open(browser: &Browser) -> Result<Self, ScraperError> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        let request_filter = match install_request_filter(&page).await {
            Ok(request_filter) => request_filter,
            Err(e) => return Err(close_after_error(page, e).await),
        };

        match NetworkTracker::install(&page).await {
            Ok(network) => Ok(Self {
                page,
                request_filter,
                network,
            }),
            Err(e) => {
                request_filter.abort();
                Err(close_after_error(page, e).await)
            }
        }
    }
}

async fn close_after_error(page: Page, error: ScraperError) -> ScraperError {
    if let Err(close_err) = page.close().await {
        debug!("Failed to close page after setup error: {}", close_err);
    }
    error
}

/// Fetch ドメインで対象リソースだけを一時停止させ、停止したものは失敗させる。
/// パターンに一致しないリクエストは停止されずそのまま進む。
async fn install_request_filter(page: &Page) -> Result<JoinHandle<()>, ScraperError> {
    // Fetch.enable より先にリスナーを登録
    let mut paused = page
        .event_listener::<EventRequestPaused>()
        .await
        .map_err(|e| ScraperError::BrowserInit(format!("リクエスト監視の登録: {}", e)))?;

    let patterns: Vec<RequestPattern> = BLOCKED_RESOURCE_TYPES
        .iter()
        .map(|resource_type| {
            RequestPattern::builder()
                .resource_type(resource_type.clone())
                .build()
        })
        .collect();

    page.execute(EnableParams::builder().patterns(patterns).build())
        .await
        .map_err(|e| ScraperError::BrowserInit(format!("リクエストフィルタ設定: {}", e)))?;

    let page = page.clone();
    Ok(tokio::spawn(async move {
        while let Some(event) = paused.next().await {
            if !is_blocked(&event.resource_type) {
                continue;
            }
            debug!(
                "Blocking {:?} request: {}",
                event.resource_type, event.request.url
            );
            let params =
                FailRequestParams::new(event.request_id.clone(), ErrorReason::BlockedByClient);
            if let Err(e) = page.execute(params).await {
                debug!("Failed to abort request: {}", e);
            }
        }
    }))
}

#[async_trait]
impl RenderSession for ChromeSession {
    async fn goto(&self, url: &str) -> Result<(), ScraperError> {
        self.page.goto(url).await.map_err(|e| match e {
            CdpError::Timeout => ScraperError::NavigationTimeout(url.to_string()),
            other => ScraperError::Navigation(other.to_string()),
        })?;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<Value, ScraperError> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| ScraperError::ScriptExecution(e.to_string()))?;

        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn inflight_requests(&self) -> Result<usize, ScraperError> {
        Ok(self.network.inflight().await)
    }

    async fn close(self: Box<Self>) -> Result<(), ScraperError> {
        let ChromeSession {
            page,
            request_filter,
            network,
        } = *self;

        request_filter.abort();
        network.stop();
        page.close()
            .await
            .map_err(|e| ScraperError::Shutdown(format!("ページクローズ: {}", e)))
    }
}
