//! chromiumoxide によるブラウザ実装
//!
//! プロセスで1つだけ起動するブラウザと、アカウントごとに開閉するタブ。

mod browser;
mod network;
mod session;

pub use browser::ChromeBrowser;
pub use session::{is_blocked, ChromeSession, BLOCKED_RESOURCE_TYPES};
