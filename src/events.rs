//! 通知（トースト）、副作用の境界、UI状態。

use anyhow::Result;
use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

/// トーストを画面に出しておく時間。
pub const TOAST_TTL: Duration = Duration::from_secs(5);

/// 保持する通知の件数。
const TOAST_BACKLOG: usize = 20;

/// 通知の種類（表示色に対応）。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    /// 成功。
    Success,
    /// 単なるお知らせ。
    Info,
    /// 失敗。
    Failure,
}

/// コントローラーが発行する通知1件。
#[derive(Clone, Debug)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub description: String,
    /// 発行時刻（表示期限の判定用）。
    pub at: Instant,
}

impl Toast {
    pub fn new(kind: ToastKind, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
            at: Instant::now(),
        }
    }

    /// 表示期限内かどうか。
    pub fn is_fresh(&self) -> bool {
        self.at.elapsed() < TOAST_TTL
    }
}

/// コントローラーが呼び出す副作用の受け口。
pub trait Effects {
    /// 通知を出す。
    fn notify(&mut self, toast: Toast);
    /// ダウンロードURLへ遷移する。
    fn open_url(&mut self, url: &str) -> Result<()>;
}

/// 端末アプリ用の実装：通知は履歴として保持し、URLはブラウザで開く。
#[derive(Debug, Default)]
pub struct TerminalEffects {
    toasts: VecDeque<Toast>,
}

impl TerminalEffects {
    /// 表示期限内の最新の通知。
    pub fn current_toast(&self) -> Option<&Toast> {
        self.toasts.front().filter(|t| t.is_fresh())
    }

    /// 新しい順の通知一覧。
    pub fn recent(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }
}

impl Effects for TerminalEffects {
    fn notify(&mut self, toast: Toast) {
        // ログにも残しておく。
        tracing::info!("toast [{:?}] {}: {}", toast.kind, toast.title, toast.description);
        self.toasts.push_front(toast);
        self.toasts.truncate(TOAST_BACKLOG);
    }

    fn open_url(&mut self, url: &str) -> Result<()> {
        tracing::info!("opening {url}");
        webbrowser::open(url)?;
        Ok(())
    }
}

/// 変換サービスの疎通状態。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendState {
    /// 未確認。
    Unknown,
    /// 応答あり。
    Online,
    /// 応答なし（理由付き）。
    Offline(String),
}

/// 描画側と共有するUI状態。
#[derive(Clone, Debug)]
pub struct UiState {
    /// 履歴一覧の選択行。
    pub selected: usize,
    /// 画面下部のステータス文言。
    pub status: String,
    /// 変換サービスの疎通状態。
    pub backend: BackendState,
}
