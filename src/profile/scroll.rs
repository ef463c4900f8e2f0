//! 無限スクロールの安定化ループ
//!
//! 最下部までスクロール → 待機 → 高さ計測 を、高さが伸びなくなるまで繰り返す。

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::render::{as_count, CONTENT_COUNT_SCRIPT, CONTENT_MARKER};
use crate::config::ScrapeOptions;
use crate::error::ScraperError;
use crate::traits::RenderSession;

pub const SCROLL_HEIGHT_SCRIPT: &str = "document.scrollingElement.scrollHeight";

pub const SCROLL_TO_BOTTOM_SCRIPT: &str =
    "window.scrollTo(0, document.scrollingElement.scrollHeight)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// 高さが伸びなくなった
    Stabilized { rounds: u32 },
    /// 上限回数に達した（部分的な結果として扱う）
    Exhausted { rounds: u32 },
    /// スクリプトエラー
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollReport {
    pub outcome: ScrollOutcome,
    /// 終了時点の article 要素数（失敗時は 0）
    pub articles: u64,
}

/// 高さが安定するまでスクロールする。エラーは記録して 0 件扱いにする
pub async fn scroll_until_stable(
    session: &dyn RenderSession,
    options: &ScrapeOptions,
) -> ScrollReport {
    match try_scroll(session, options).await {
        Ok(report) => report,
        Err(e) => {
            error!("Error during scrolling: {}", e);
            ScrollReport {
                outcome: ScrollOutcome::Failed,
                articles: 0,
            }
        }
    }
}

async fn try_scroll(
    session: &dyn RenderSession,
    options: &ScrapeOptions,
) -> Result<ScrollReport, ScraperError> {
    let mut previous_height = 0;
    let mut current_height = measure_height(session).await?;
    let mut rounds = 0;

    let outcome = loop {
        if current_height <= previous_height {
            break ScrollOutcome::Stabilized { rounds };
        }
        if rounds >= options.max_scroll_rounds {
            warn!(
                "Page still growing after {} scrolls (height={}), stopping",
                rounds, current_height
            );
            break ScrollOutcome::Exhausted { rounds };
        }

        previous_height = current_height;
        session.evaluate(SCROLL_TO_BOTTOM_SCRIPT).await?;
        sleep(options.settle_delay).await;
        current_height = measure_height(session).await?;
        rounds += 1;

        debug!(
            "Scroll {}: height {} -> {}",
            rounds, previous_height, current_height
        );
    };

    let articles = as_count(
        &session.evaluate(CONTENT_COUNT_SCRIPT).await?,
        CONTENT_MARKER,
    )?;
    info!("Scrolling finished: {:?}, {} articles", outcome, articles);

    Ok(ScrollReport { outcome, articles })
}

async fn measure_height(session: &dyn RenderSession) -> Result<u64, ScraperError> {
    let value = session.evaluate(SCROLL_HEIGHT_SCRIPT).await?;
    as_count(&value, "scrollHeight")
}
