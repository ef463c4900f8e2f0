//! 投稿テキストの抽出

use serde_json::Value;
use tracing::debug;

use crate::error::ScraperError;
use crate::traits::RenderSession;
use crate::types::Post;

/// article 内の言語タグ付きテキストブロックを文書順に返す
pub const EXTRACT_POSTS_SCRIPT: &str = r#"
    (() => Array.from(
        document.querySelectorAll('article div[lang]'),
        element => element.innerText
    ))()
"#;

/// 現在のDOMから投稿を抽出（重複は除去しない）
pub async fn extract_posts(session: &dyn RenderSession) -> Result<Vec<Post>, ScraperError> {
    let value = session.evaluate(EXTRACT_POSTS_SCRIPT).await?;
    let posts = posts_from_value(value)?;
    debug!("Extracted {} posts", posts.len());
    Ok(posts)
}

fn posts_from_value(value: Value) -> Result<Vec<Post>, ScraperError> {
    let raw: Vec<Option<String>> = serde_json::from_value(value)
        .map_err(|e| ScraperError::ScriptExecution(format!("投稿の抽出結果: {}", e)))?;

    Ok(raw
        .iter()
        .flatten()
        .filter_map(|text| Post::from_raw(text))
        .collect())
}
