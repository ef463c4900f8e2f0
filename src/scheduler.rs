//! 定期実行ループ
//!
//! `*/N` 分の境界ごとに全アカウントを巡回し、合計をログに出す。

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Local};
use futures::future::poll_fn;
use futures::{stream, StreamExt};
use tokio::time::sleep;
use tower::Service;
use tracing::{debug, info};

use crate::config::WatchConfig;
use crate::service::ScrapeRequest;
use crate::types::{AccountMentions, PollResult};

/// 発火時刻の計算に使う現在時刻
type Clock = Arc<dyn Fn() -> DateTime<Local> + Send + Sync>;

pub struct Poller<S> {
    service: S,
    config: WatchConfig,
    clock: Clock,
}

impl<S> Poller<S>
where
    S: Service<ScrapeRequest, Response = AccountMentions, Error = Infallible> + Clone,
{
    pub fn new(service: S, config: WatchConfig) -> Self {
        Self {
            service,
            config,
            clock: Arc::new(Local::now),
        }
    }

    /// 現在時刻の取得元を差し替える
    pub fn with_clock<C>(mut self, clock: C) -> Self
    where
        C: Fn() -> DateTime<Local> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// 全アカウントを1巡して集計。結果の並びは設定の順序と同じ
    pub async fn run_tick(&mut self) -> PollResult {
        let ticker = self.config.ticker.clone();
        let mut result = PollResult::new(ticker.clone(), self.config.schedule.label());

        let requests = self
            .config
            .accounts
            .iter()
            .cloned()
            .map(|account| ScrapeRequest::new(account, ticker.clone()));

        let service = self.service.clone();
        let mut responses = stream::iter(requests)
            .map(|req| {
                let mut service = service.clone();
                async move {
                    poll_fn(|cx| service.poll_ready(cx)).await?;
                    service.call(req).await
                }
            })
            .buffered(self.config.concurrency.max(1));

        while let Some(response) = responses.next().await {
            let mentions = match response {
                Ok(mentions) => mentions,
                Err(never) => match never {},
            };
            debug!("{}: {} mentions", mentions.account, mentions.count);
            result.record(mentions);
        }

        result
    }

    /// `shutdown` が完了するまでスケジュールに従って実行し続ける
    pub async fn run_until<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!(
            "Scraping for ticker \"{}\" every {} minutes... ({})",
            self.config.ticker,
            self.config.schedule.label(),
            self.config.schedule
        );

        // 時計が戻っても発火済みの境界は再実行しない
        let mut last_fired: Option<DateTime<Local>> = None;

        loop {
            let now = (self.clock)();
            let from = match last_fired {
                Some(fired) if fired > now => fired,
                _ => now,
            };
            let next = self.config.schedule.next_after(&from);
            let wait = (next - now).to_std().unwrap_or_default();
            debug!("Next run at {}", next);

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping scheduler");
                    break;
                }
                _ = sleep(wait) => {}
            }
            last_fired = Some(next);

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested during run, abandoning current tick");
                    break;
                }
                result = self.run_tick() => {
                    info!("{}", result.summary());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::TimeZone;
    use tokio::time::Instant;

    use crate::schedule::MinuteSchedule;
    use crate::service::MentionService;
    use crate::testing::{fast_options, FakeProfile, FakeRenderer};
    use crate::types::{Account, Ticker};

    fn renderer() -> Arc<FakeRenderer> {
        let renderer = FakeRenderer::new()
            .with_profile("first", FakeProfile::with_posts(["AAPL up", "hello"]))
            .with_profile("second", FakeProfile::with_posts(Vec::<String>::new()))
            .with_profile(
                "third",
                FakeProfile::with_posts(["buy AAPL now", "AAPL AAPL"]),
            );
        Arc::new(renderer)
    }

    /// 2024-03-01 12:03:00 から tokio の時計と一緒に進む時計
    fn clock_from_12_03(start: Instant) -> impl Fn() -> DateTime<Local> {
        let base = Local.with_ymd_and_hms(2024, 3, 1, 12, 3, 0).unwrap();
        move || base + chrono::Duration::from_std(start.elapsed()).unwrap()
    }

    fn config() -> WatchConfig {
        WatchConfig::new(
            Ticker::new("AAPL").unwrap(),
            MinuteSchedule::parse("5").unwrap(),
        )
        .with_accounts(["first", "second", "third"])
        .with_scrape_options(
            fast_options().with_content_timeout(Duration::from_millis(20)),
        )
    }

    #[tokio::test]
    async fn test_run_tick_aggregates_accounts() {
        let renderer = renderer();
        let config = config();
        let service = MentionService::new(Arc::clone(&renderer), config.scrape.clone());
        let mut poller = Poller::new(service, config);

        let result = poller.run_tick().await;

        let counts: Vec<u64> = result.per_account.iter().map(|m| m.count).collect();
        assert_eq!(counts, vec![1, 0, 2]);
        assert_eq!(result.total, 3);
        assert_eq!(
            result.summary(),
            "\"AAPL\" was mentioned 3 times in the last 5 minutes."
        );
        assert_eq!(renderer.opened(), 3);
        assert_eq!(renderer.closed(), 3);
    }

    #[tokio::test]
    async fn test_run_tick_isolates_failing_account() {
        let renderer = FakeRenderer::new()
            .with_profile("ok", FakeProfile::with_posts(["AAPL"]))
            .with_profile("down", FakeProfile::default().failing_navigation());
        let renderer = Arc::new(renderer);
        let config = config().with_accounts(["down", "ok", "unknown"]);
        let service = MentionService::new(Arc::clone(&renderer), config.scrape.clone());
        let mut poller = Poller::new(service, config);

        let result = poller.run_tick().await;

        assert_eq!(result.total, 1);
        assert_eq!(result.per_account.len(), 3);
        assert_eq!(result.per_account[1].account, Account::new("ok"));
        assert_eq!(renderer.closed(), 3);
    }

    #[tokio::test]
    async fn test_run_tick_bounded_pool_keeps_order() {
        let renderer = renderer();
        let config = config().with_concurrency(3);
        let service = MentionService::new(Arc::clone(&renderer), config.scrape.clone());
        let mut poller = Poller::new(service, config);

        let result = poller.run_tick().await;

        let accounts: Vec<&str> = result
            .per_account
            .iter()
            .map(|m| m.account.handle())
            .collect();
        assert_eq!(accounts, vec!["first", "second", "third"]);
        assert_eq!(result.total, 3);
    }

    #[tokio::test]
    async fn test_run_until_stops_on_shutdown() {
        let renderer = renderer();
        let config = config();
        let service = MentionService::new(Arc::clone(&renderer), config.scrape.clone());
        let poller = Poller::new(service, config);

        tokio::time::timeout(Duration::from_secs(1), poller.run_until(async {}))
            .await
            .expect("scheduler did not stop");

        assert_eq!(renderer.opened(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_fires_on_boundary() {
        let renderer = renderer();
        let config = config();
        let service = MentionService::new(Arc::clone(&renderer), config.scrape.clone());
        let clock = clock_from_12_03(Instant::now());
        let poller = Poller::new(service, config).with_clock(clock);

        // 12:05 で1回発火し、12:10 より前に停止
        poller.run_until(sleep(Duration::from_secs(150))).await;

        assert_eq!(renderer.opened(), 3);
        assert_eq!(renderer.closed(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_does_not_refire_after_clock_goes_back() {
        let renderer = renderer();
        let config = config();
        let service = MentionService::new(Arc::clone(&renderer), config.scrape.clone());
        let start = Instant::now();
        let ticking = clock_from_12_03(start);
        // 12:05 の発火直後に90秒戻る
        let clock = move || {
            let now = ticking();
            if start.elapsed() >= Duration::from_secs(120) {
                now - chrono::Duration::seconds(90)
            } else {
                now
            }
        };
        let poller = Poller::new(service, config).with_clock(clock);

        poller.run_until(sleep(Duration::from_secs(300))).await;

        assert_eq!(renderer.opened(), 3);
    }
}
