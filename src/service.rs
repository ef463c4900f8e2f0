use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tower::Service;
use tracing::debug;

use crate::config::ScrapeOptions;
use crate::profile::AccountScraper;
use crate::traits::Renderer;
use crate::types::{Account, AccountMentions, Ticker};

/// 1アカウント分の集計リクエスト
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub account: Account,
    pub ticker: Ticker,
}

impl ScrapeRequest {
    pub fn new(account: Account, ticker: Ticker) -> Self {
        Self { account, ticker }
    }
}

/// tower::Serviceを実装した言及数カウントサービス
///
/// アカウント単位の失敗は [`AccountScraper`] 内で 0 件として吸収されるので、エラーは発生しない。
pub struct MentionService<R: ?Sized> {
    scraper: AccountScraper<R>,
}

impl<R: ?Sized> Clone for MentionService<R> {
    fn clone(&self) -> Self {
        Self {
            scraper: self.scraper.clone(),
        }
    }
}

impl<R: Renderer + ?Sized> MentionService<R> {
    pub fn new(renderer: Arc<R>, options: ScrapeOptions) -> Self {
        Self {
            scraper: AccountScraper::new(renderer, options),
        }
    }
}

impl<R: Renderer + ?Sized + 'static> Service<ScrapeRequest> for MentionService<R> {
    type Response = AccountMentions;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ScrapeRequest) -> Self::Future {
        debug!("スクレイピングリクエスト受信: account={}", req.account);
        let scraper = self.scraper.clone();

        Box::pin(async move {
            let count = scraper.scrape(&req.account, &req.ticker).await;
            Ok(AccountMentions {
                account: req.account,
                count,
            })
        })
    }
}
