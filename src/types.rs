//! ティッカー集計の型定義

use std::fmt;

use crate::error::ScraperError;

/// 監視対象アカウント（プロフィールのハンドル名）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Account(String);

impl Account {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn handle(&self) -> &str {
        &self.0
    }

    /// プロフィールページのURL
    pub fn profile_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.0)
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 検索するティッカーシンボル（空文字は不可）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticker(String);

impl Ticker {
    pub fn new(symbol: impl Into<String>) -> Result<Self, ScraperError> {
        let symbol = symbol.into();
        if symbol.is_empty() {
            return Err(ScraperError::MissingArguments);
        }
        Ok(Self(symbol))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 抽出した投稿テキスト（改行→空白、前後の空白除去済み、空ではない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post(String);

impl Post {
    /// innerText を正規化して投稿を作る。正規化後に空なら None
    pub fn from_raw(raw: &str) -> Option<Self> {
        let text = raw.replace('\n', " ");
        let text = text.trim();
        if text.is_empty() {
            None
        } else {
            Some(Self(text.to_string()))
        }
    }

    pub fn text(&self) -> &str {
        &self.0
    }

    /// 大文字小文字を区別する単純な部分一致
    pub fn mentions(&self, ticker: &Ticker) -> bool {
        self.0.contains(ticker.as_str())
    }
}

/// アカウント単位の集計
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountMentions {
    pub account: Account,
    pub count: u64,
}

/// 1ティック分の集計結果
#[derive(Debug, Clone)]
pub struct PollResult {
    pub ticker: Ticker,
    /// CLIで指定された間隔（入力の表記のまま）
    pub interval: String,
    pub total: u64,
    pub per_account: Vec<AccountMentions>,
}

impl PollResult {
    pub fn new(ticker: Ticker, interval: impl Into<String>) -> Self {
        Self {
            ticker,
            interval: interval.into(),
            total: 0,
            per_account: Vec::new(),
        }
    }

    pub fn record(&mut self, mentions: AccountMentions) {
        self.total += mentions.count;
        self.per_account.push(mentions);
    }

    /// ティック終了時に出力するサマリー行
    pub fn summary(&self) -> String {
        format!(
            "\"{}\" was mentioned {} times in the last {} minutes.",
            self.ticker, self.total, self.interval
        )
    }
}
