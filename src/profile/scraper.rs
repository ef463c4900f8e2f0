//! アカウント単位のスクレイパー
//!
//! タブを開く → 読み込み待機 → スクロール → 抽出 → 件数カウント。
//! 失敗はこの中で握りつぶし、タブは必ず閉じる。

use std::sync::Arc;

use tracing::{debug, error, info};

use super::extract::extract_posts;
use super::render::load_profile;
use super::scroll::scroll_until_stable;
use crate::config::ScrapeOptions;
use crate::error::ScraperError;
use crate::traits::{RenderSession, Renderer};
use crate::types::{Account, Post, Ticker};

/// ティッカーを含む投稿の数（1投稿につき最大1）
pub fn count_mentions(posts: &[Post], ticker: &Ticker) -> u64 {
    posts.iter().filter(|post| post.mentions(ticker)).count() as u64
}

/// 共有ブラウザ上でプロフィールを1件ずつ処理する
pub struct AccountScraper<R: ?Sized> {
    renderer: Arc<R>,
    options: ScrapeOptions,
}

impl<R: ?Sized> Clone for AccountScraper<R> {
    fn clone(&self) -> Self {
        Self {
            renderer: Arc::clone(&self.renderer),
            options: self.options.clone(),
        }
    }
}

impl<R: Renderer + ?Sized> AccountScraper<R> {
    pub fn new(renderer: Arc<R>, options: ScrapeOptions) -> Self {
        Self { renderer, options }
    }

    /// 1アカウントの言及数を返す。失敗時は 0
    pub async fn scrape(&self, account: &Account, ticker: &Ticker) -> u64 {
        let url = account.profile_url(&self.options.profile_base_url);
        info!("Scraping account: {}", url);

        let session = match self.renderer.new_session().await {
            Ok(session) => session,
            Err(e) => {
                error!("Failed to open page for {}: {}", url, e);
                return 0;
            }
        };

        let result = self.scrape_in_session(session.as_ref(), &url, ticker).await;

        if let Err(e) = session.close().await {
            debug!("Failed to close page for {}: {}", url, e);
        }

        match result {
            Ok(count) => {
                debug!("{} mentions of {} on {}", count, ticker, url);
                count
            }
            Err(e) if e.is_page_failure() => {
                error!("Error fetching data from {}: {}", url, e);
                0
            }
            Err(e) => {
                error!("Unexpected error while scraping {}: {}", url, e);
                0
            }
        }
    }

    async fn scrape_in_session(
        &self,
        session: &dyn RenderSession,
        url: &str,
        ticker: &Ticker,
    ) -> Result<u64, ScraperError> {
        load_profile(session, url, &self.options).await?;

        let report = scroll_until_stable(session, &self.options).await;
        debug!("Scroll report for {}: {:?}", url, report);

        let posts = extract_posts(session).await?;
        Ok(count_mentions(&posts, ticker))
    }
}
