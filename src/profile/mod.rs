//! プロフィールページのスクレイピング
//!
//! 読み込み待機・スクロール安定化・投稿抽出と、それらを束ねるアカウント単位の処理

mod extract;
mod render;
mod scraper;
mod scroll;

pub use extract::{extract_posts, EXTRACT_POSTS_SCRIPT};
pub use render::{load_profile, CONTENT_COUNT_SCRIPT, CONTENT_MARKER};
pub use scraper::{count_mentions, AccountScraper};
pub use scroll::{
    scroll_until_stable, ScrollOutcome, ScrollReport, SCROLL_HEIGHT_SCRIPT,
    SCROLL_TO_BOTTOM_SCRIPT,
};
