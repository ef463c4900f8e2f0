//! ティッカー言及数ウォッチャー
//!
//! - 固定のSNSプロフィール一覧をヘッドレスブラウザで巡回
//! - 無限スクロールを高さが安定するまで進めて投稿テキストを抽出
//! - ティッカーを含む投稿数を `*/N` 分ごとに集計してログ出力
//!
//! # 使用例
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ticker_watch::{ChromeBrowser, MentionService, MinuteSchedule, Poller, Ticker, WatchConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = WatchConfig::new(Ticker::new("AAPL").unwrap(), MinuteSchedule::new(5).unwrap());
//!     let browser = Arc::new(ChromeBrowser::launch(true, config.scrape.navigation_timeout).await.unwrap());
//!
//!     let service = MentionService::new(Arc::clone(&browser), config.scrape.clone());
//!     let mut poller = Poller::new(service, config);
//!
//!     let result = poller.run_tick().await;
//!     println!("{}", result.summary());
//! }
//! ```

pub mod chrome;
pub mod cli;
pub mod config;
pub mod error;
pub mod profile;
pub mod schedule;
pub mod scheduler;
pub mod service;
pub mod traits;
pub mod types;

#[cfg(test)]
mod testing;

// 主要な型をリエクスポート
pub use chrome::ChromeBrowser;
pub use cli::Cli;
pub use config::{ScrapeOptions, WatchConfig};
pub use error::ScraperError;
pub use profile::{count_mentions, AccountScraper, ScrollOutcome, ScrollReport};
pub use schedule::MinuteSchedule;
pub use scheduler::Poller;
pub use service::{MentionService, ScrapeRequest};
pub use traits::{RenderSession, Renderer};
pub use types::{Account, AccountMentions, Post, PollResult, Ticker};
