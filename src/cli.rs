use clap::Parser;

use crate::config::WatchConfig;
use crate::error::ScraperError;
use crate::schedule::MinuteSchedule;
use crate::types::Ticker;

/// 引数の欠落は clap ではなく [`Cli::into_config`] で検出する（終了コード 1 にするため）
#[derive(Parser, Debug)]
#[command(
    name = "ticker-watch",
    about = "Count ticker mentions across social profiles on a cron-style interval",
    version
)]
pub struct Cli {
    /// Stock ticker symbol to look for (case-sensitive)
    pub ticker: Option<String>,

    /// Interval in minutes; runs at every minute mark divisible by it
    pub interval: Option<String>,
}

impl Cli {
    pub fn into_config(self) -> Result<WatchConfig, ScraperError> {
        let (Some(ticker), Some(interval)) = (self.ticker, self.interval) else {
            return Err(ScraperError::MissingArguments);
        };

        let ticker = Ticker::new(ticker)?;
        let schedule = MinuteSchedule::parse(&interval)?;
        Ok(WatchConfig::new(ticker, schedule))
    }
}
