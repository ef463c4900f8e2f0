use async_trait::async_trait;
use serde_json::Value;

use crate::error::ScraperError;

/// ブラウザのタブ1枚分
#[async_trait]
pub trait RenderSession: Send + Sync {
    /// URLへ遷移（ロード完了まで）
    async fn goto(&self, url: &str) -> Result<(), ScraperError>;

    /// ページコンテキストでスクリプトを評価。戻り値がない場合は Null
    async fn evaluate(&self, script: &str) -> Result<Value, ScraperError>;

    /// 送信済みで応答が完了していないリクエスト数
    async fn inflight_requests(&self) -> Result<usize, ScraperError>;

    /// タブを閉じる（消費するので二重クローズは起きない）
    async fn close(self: Box<Self>) -> Result<(), ScraperError>;
}

/// セッションを生成する共有ブラウザ
#[async_trait]
pub trait Renderer: Send + Sync {
    /// 新しいタブを開き、画像・CSS・フォントのリクエストを遮断する
    async fn new_session(&self) -> Result<Box<dyn RenderSession>, ScraperError>;
}
