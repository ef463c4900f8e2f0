use std::collections::HashSet;
use std::sync::Arc;

use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::ScraperError;

/// 送信済みで未完了のリクエストID集合（リダイレクトは同じIDで再送されるので重複しない）
#[derive(Debug, Default)]
pub(crate) struct InflightRequests {
    ids: HashSet<String>,
}

impl InflightRequests {
    pub fn started(&mut self, request_id: &str) {
        self.ids.insert(request_id.to_string());
    }

    pub fn finished(&mut self, request_id: &str) {
        self.ids.remove(request_id);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

/// Network イベントから実行中のリクエスト数を追跡する
pub(crate) struct NetworkTracker {
    inflight: Arc<Mutex<InflightRequests>>,
    task: JoinHandle<()>,
}

impl NetworkTracker {
    pub async fn install(page: &Page) -> Result<Self, ScraperError> {
        let listen_err =
            |e: CdpError| ScraperError::BrowserInit(format!("ネットワーク監視の登録: {}", e));

        // Network.enable より先にリスナーを登録
        let mut sent = page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(listen_err)?;
        let mut finished = page
            .event_listener::<EventLoadingFinished>()
            .await
            .map_err(listen_err)?;
        let mut failed = page
            .event_listener::<EventLoadingFailed>()
            .await
            .map_err(listen_err)?;

        page.execute(EnableParams::default())
            .await
            .map_err(|e| ScraperError::BrowserInit(format!("Network.enable: {}", e)))?;

        let inflight = Arc::new(Mutex::new(InflightRequests::default()));
        let tracked = Arc::clone(&inflight);

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    Some(event) = sent.next() => {
                        tracked.lock().await.started(event.request_id.inner());
                    }
                    Some(event) = finished.next() => {
                        tracked.lock().await.finished(event.request_id.inner());
                    }
                    Some(event) = failed.next() => {
                        debug!(
                            "Request failed: {} ({})",
                            event.request_id.inner(),
                            event.error_text
                        );
                        tracked.lock().await.finished(event.request_id.inner());
                    }
                    else => break,
                }
            }
        });

        Ok(Self { inflight, task })
    }

    pub async fn inflight(&self) -> usize {
        self.inflight.lock().await.len()
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}
