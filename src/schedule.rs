//! cron の `*/N * * * *` 相当の分単位スケジュール
//!
//! 起動からN分後ではなく、「分」がNで割り切れる時刻の0秒に発火する。

use std::fmt;

use chrono::{DateTime, Duration, TimeZone, Timelike};

use crate::error::ScraperError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinuteSchedule {
    step: u32,
    label: String,
}

impl MinuteSchedule {
    pub fn new(step: u32) -> Result<Self, ScraperError> {
        if !(1..=59).contains(&step) {
            return Err(ScraperError::InvalidInterval(step.to_string()));
        }
        Ok(Self {
            step,
            label: step.to_string(),
        })
    }

    /// CLIで受け取った文字列をそのまま解釈する。
    /// 表示用の間隔は入力どおり（`"05"` は `"05"` のまま）
    pub fn parse(interval: &str) -> Result<Self, ScraperError> {
        let label = interval.trim();
        let step = label
            .parse::<u32>()
            .map_err(|_| ScraperError::InvalidInterval(interval.to_string()))?;
        let mut schedule = Self::new(step)?;
        schedule.label = label.to_string();
        Ok(schedule)
    }

    pub fn minutes(&self) -> u32 {
        self.step
    }

    /// ログやサマリーに出す間隔の文字列
    pub fn label(&self) -> &str {
        &self.label
    }

    /// `after` より厳密に後の最初の発火時刻
    pub fn next_after<Tz: TimeZone>(&self, after: &DateTime<Tz>) -> DateTime<Tz> {
        let floored = after.clone()
            - Duration::seconds(i64::from(after.second()))
            - Duration::nanoseconds(i64::from(after.nanosecond()));

        let mut candidate = floored + Duration::minutes(1);
        while candidate.minute() % self.step != 0 {
            candidate += Duration::minutes(1);
        }
        candidate
    }
}

impl fmt::Display for MinuteSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "*/{} * * * *", self.step)
    }
}
