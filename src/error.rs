use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("ブラウザ初期化エラー: {0}")]
    BrowserInit(String),

    #[error("ナビゲーションエラー: {0}")]
    Navigation(String),

    #[error("ナビゲーションタイムアウト: {0}")]
    NavigationTimeout(String),

    #[error("スクリプト実行エラー: {0}")]
    ScriptExecution(String),

    #[error("Please provide the stock ticker symbol and time interval as arguments.")]
    MissingArguments,

    #[error("不正な間隔(分): {0}")]
    InvalidInterval(String),

    #[error("終了処理エラー: {0}")]
    Shutdown(String),
}

impl ScraperError {
    /// ページ側の一時的な失敗かどうか（次のティックで回復し得る）
    pub fn is_page_failure(&self) -> bool {
        matches!(
            self,
            ScraperError::Navigation(_)
                | ScraperError::NavigationTimeout(_)
                | ScraperError::ScriptExecution(_)
        )
    }
}
