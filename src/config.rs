use std::time::Duration;

use crate::schedule::MinuteSchedule;
use crate::types::{Account, Ticker};

pub const DEFAULT_PROFILE_BASE_URL: &str = "https://twitter.com";

/// 既定の監視対象アカウント
pub const DEFAULT_ACCOUNTS: &[&str] = &[
    "CordovaTrades",
    "Mr_Derivatives",
    "warrior_0719",
    "ChartingProdigy",
    "allstarcharts",
    "yuriymatso",
    "TriggerTrades",
    "AdamMancini4",
    "Barchart",
    "RoyLMattox",
];

/// 1アカウント分のページ取得に関する設定
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// プロフィールURLのベース
    pub profile_base_url: String,
    /// ナビゲーション + ネットワークアイドル待機のタイムアウト
    pub navigation_timeout: Duration,
    /// コンテンツ要素（article）出現待機のタイムアウト
    pub content_timeout: Duration,
    /// この接続数以下ならアイドルとみなす
    pub max_idle_connections: usize,
    /// アイドル状態がこの時間続いたら完了
    pub network_idle_window: Duration,
    /// 待機ループのポーリング間隔
    pub poll_interval: Duration,
    /// スクロール後に遅延ロードを待つ時間
    pub settle_delay: Duration,
    /// スクロールの最大回数
    pub max_scroll_rounds: u32,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            profile_base_url: DEFAULT_PROFILE_BASE_URL.to_string(),
            navigation_timeout: Duration::from_secs(60),
            content_timeout: Duration::from_secs(60),
            max_idle_connections: 2,
            network_idle_window: Duration::from_millis(500),
            poll_interval: Duration::from_millis(100),
            settle_delay: Duration::from_millis(3000),
            max_scroll_rounds: 50,
        }
    }
}

impl ScrapeOptions {
    pub fn with_profile_base_url(mut self, url: impl Into<String>) -> Self {
        self.profile_base_url = url.into();
        self
    }

    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    pub fn with_content_timeout(mut self, timeout: Duration) -> Self {
        self.content_timeout = timeout;
        self
    }

    pub fn with_network_idle_window(mut self, window: Duration) -> Self {
        self.network_idle_window = window;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_max_scroll_rounds(mut self, rounds: u32) -> Self {
        self.max_scroll_rounds = rounds;
        self
    }
}

/// プロセス全体で不変の監視設定
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub ticker: Ticker,
    pub schedule: MinuteSchedule,
    pub accounts: Vec<Account>,
    pub headless: bool,
    /// 同時に処理するアカウント数（1 = 逐次）
    pub concurrency: usize,
    pub scrape: ScrapeOptions,
}

impl WatchConfig {
    pub fn new(ticker: Ticker, schedule: MinuteSchedule) -> Self {
        Self {
            ticker,
            schedule,
            accounts: DEFAULT_ACCOUNTS.iter().map(|h| Account::new(*h)).collect(),
            headless: true,
            concurrency: 1,
            scrape: ScrapeOptions::default(),
        }
    }

    pub fn with_accounts<I, S>(mut self, accounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accounts = accounts.into_iter().map(Account::new).collect();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_scrape_options(mut self, options: ScrapeOptions) -> Self {
        self.scrape = options;
        self
    }
}
