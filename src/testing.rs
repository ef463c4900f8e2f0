//! テスト用のフェイクブラウザ
//!
//! スクリプト文字列ごとにプロフィールの状態を返す。

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::{ScrapeOptions, DEFAULT_PROFILE_BASE_URL};
use crate::error::ScraperError;
use crate::profile::{
    CONTENT_COUNT_SCRIPT, EXTRACT_POSTS_SCRIPT, SCROLL_HEIGHT_SCRIPT, SCROLL_TO_BOTTOM_SCRIPT,
};
use crate::traits::{RenderSession, Renderer};

/// 待機を最小にした設定
pub(crate) fn fast_options() -> ScrapeOptions {
    ScrapeOptions::default()
        .with_navigation_timeout(Duration::from_secs(2))
        .with_content_timeout(Duration::from_secs(2))
        .with_network_idle_window(Duration::ZERO)
        .with_poll_interval(Duration::from_millis(1))
        .with_settle_delay(Duration::ZERO)
}

#[derive(Debug, Clone)]
pub(crate) struct FakeProfile {
    posts: Vec<String>,
    heights: Vec<u64>,
    growing: bool,
    busy_polls: usize,
    open_connections: usize,
    content_check_delay: Duration,
    fail_navigation: bool,
    fail_scroll: bool,
    fail_extraction: bool,
}

impl Default for FakeProfile {
    fn default() -> Self {
        Self {
            posts: Vec::new(),
            heights: vec![1000],
            growing: false,
            busy_polls: 0,
            open_connections: 0,
            content_check_delay: Duration::ZERO,
            fail_navigation: false,
            fail_scroll: false,
            fail_extraction: false,
        }
    }
}

impl FakeProfile {
    pub fn with_posts<I, S>(posts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            posts: posts.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// 計測ごとに返す高さ（最後の値を返し続ける）
    pub fn heights<I: IntoIterator<Item = u64>>(mut self, heights: I) -> Self {
        self.heights = heights.into_iter().collect();
        self
    }

    pub fn growing_height(mut self) -> Self {
        self.growing = true;
        self
    }

    pub fn busy_network_polls(mut self, polls: usize) -> Self {
        self.busy_polls = polls;
        self
    }

    /// 完了しないまま残り続けるリクエスト数
    pub fn open_connections(mut self, connections: usize) -> Self {
        self.open_connections = connections;
        self
    }

    /// article 数の評価が返るまでの遅延
    pub fn slow_content_check(mut self, delay: Duration) -> Self {
        self.content_check_delay = delay;
        self
    }

    pub fn failing_navigation(mut self) -> Self {
        self.fail_navigation = true;
        self
    }

    pub fn failing_scroll(mut self) -> Self {
        self.fail_scroll = true;
        self
    }

    pub fn failing_extraction(mut self) -> Self {
        self.fail_extraction = true;
        self
    }
}

pub(crate) struct FakeSession {
    profiles: HashMap<String, FakeProfile>,
    current: Mutex<FakeProfile>,
    visited: Mutex<Vec<String>>,
    measurements: AtomicUsize,
    scrolls: AtomicUsize,
    network_polls: AtomicUsize,
    closed: Option<Arc<AtomicUsize>>,
}

impl FakeSession {
    /// URLに関係なく同じプロフィールを返すセッション
    pub fn new(profile: FakeProfile) -> Self {
        Self {
            profiles: HashMap::new(),
            current: Mutex::new(profile),
            visited: Mutex::new(Vec::new()),
            measurements: AtomicUsize::new(0),
            scrolls: AtomicUsize::new(0),
            network_polls: AtomicUsize::new(0),
            closed: None,
        }
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }

    pub fn scrolls(&self) -> usize {
        self.scrolls.load(Ordering::SeqCst)
    }

    pub fn network_polls(&self) -> usize {
        self.network_polls.load(Ordering::SeqCst)
    }

    fn profile(&self) -> FakeProfile {
        self.current.lock().unwrap().clone()
    }

    fn script_error(script: &str) -> ScraperError {
        ScraperError::ScriptExecution(format!("fake failure: {}", script.trim()))
    }
}

#[async_trait]
impl RenderSession for FakeSession {
    async fn goto(&self, url: &str) -> Result<(), ScraperError> {
        self.visited.lock().unwrap().push(url.to_string());

        if let Some(profile) = self.profiles.get(url) {
            *self.current.lock().unwrap() = profile.clone();
        } else if !self.profiles.is_empty() {
            *self.current.lock().unwrap() = FakeProfile::default();
        }

        if self.profile().fail_navigation {
            return Err(ScraperError::Navigation(format!("net::ERR_FAILED at {}", url)));
        }
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<Value, ScraperError> {
        let profile = self.profile();

        if script == CONTENT_COUNT_SCRIPT {
            if !profile.content_check_delay.is_zero() {
                tokio::time::sleep(profile.content_check_delay).await;
            }
            return Ok(json!(profile.posts.len()));
        }
        if script == SCROLL_HEIGHT_SCRIPT {
            let n = self.measurements.fetch_add(1, Ordering::SeqCst);
            let height = if profile.growing {
                1000 * (n as u64 + 1)
            } else {
                let last = profile.heights.len().saturating_sub(1);
                profile.heights.get(n.min(last)).copied().unwrap_or(0)
            };
            return Ok(json!(height));
        }
        if script == SCROLL_TO_BOTTOM_SCRIPT {
            if profile.fail_scroll {
                return Err(Self::script_error(script));
            }
            self.scrolls.fetch_add(1, Ordering::SeqCst);
            return Ok(Value::Null);
        }
        if script == EXTRACT_POSTS_SCRIPT {
            if profile.fail_extraction {
                return Err(Self::script_error(script));
            }
            return Ok(json!(profile.posts));
        }

        Err(Self::script_error(script))
    }

    async fn inflight_requests(&self) -> Result<usize, ScraperError> {
        let profile = self.profile();
        let poll = self.network_polls.fetch_add(1, Ordering::SeqCst);
        if poll < profile.busy_polls {
            Ok(10)
        } else {
            Ok(profile.open_connections)
        }
    }

    async fn close(self: Box<Self>) -> Result<(), ScraperError> {
        if let Some(closed) = &self.closed {
            closed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// プロフィールURLごとに状態を持つフェイクブラウザ
#[derive(Default)]
pub(crate) struct FakeRenderer {
    profiles: HashMap<String, FakeProfile>,
    fail_sessions: bool,
    opened: AtomicUsize,
    closed: Arc<AtomicUsize>,
}

impl FakeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, handle: &str, profile: FakeProfile) -> Self {
        let url = format!("{}/{}", DEFAULT_PROFILE_BASE_URL, handle);
        self.profiles.insert(url, profile);
        self
    }

    pub fn failing_sessions(mut self) -> Self {
        self.fail_sessions = true;
        self
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn new_session(&self) -> Result<Box<dyn RenderSession>, ScraperError> {
        if self.fail_sessions {
            return Err(ScraperError::BrowserInit("fake browser is gone".into()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);

        let mut session = FakeSession::new(FakeProfile::default());
        session.profiles = self.profiles.clone();
        session.closed = Some(Arc::clone(&self.closed));
        Ok(Box::new(session))
    }
}
