//! 変換ステータス、音質、変換履歴のモデル。

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, fmt};

/// 履歴に保持する最大件数。
pub const HISTORY_CAPACITY: usize = 5;

/// 出力MP3のビットレート。
///
/// 設定ファイルとリクエストJSONの両方で `"128"` などの文字列として表現する。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    /// 128 kbps。
    #[serde(rename = "128")]
    Kbps128,
    /// 192 kbps（既定値）。
    #[default]
    #[serde(rename = "192")]
    Kbps192,
    /// 320 kbps。
    #[serde(rename = "320")]
    Kbps320,
}

impl Quality {
    /// 選択肢の表示順。
    pub const ALL: [Quality; 3] = [Quality::Kbps128, Quality::Kbps192, Quality::Kbps320];

    /// ワイヤ上の文字列表現。
    pub fn as_str(self) -> &'static str {
        match self {
            Quality::Kbps128 => "128",
            Quality::Kbps192 => "192",
            Quality::Kbps320 => "320",
        }
    }

    /// 選択肢を循環させる。
    pub fn next(self) -> Self {
        match self {
            Quality::Kbps128 => Quality::Kbps192,
            Quality::Kbps192 => Quality::Kbps320,
            Quality::Kbps320 => Quality::Kbps128,
        }
    }

    /// 選択肢の補足説明。
    pub fn describe(self) -> &'static str {
        match self {
            Quality::Kbps128 => "Standard",
            Quality::Kbps192 => "High",
            Quality::Kbps320 => "Best",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} kbps", self.as_str())
    }
}

/// 変換ワークフローの状態。
///
/// タイトルは完了時のみ、失敗時には到達していた進捗だけを持つ。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Status {
    /// 入力待ち。
    #[default]
    Idle,
    /// リクエスト送信済み、応答待ち。
    Fetching,
    /// 成功応答を受信し本文を読み込み中。
    Converting,
    /// 変換完了。
    Complete { title: String },
    /// 失敗（失敗時点の進捗）。
    Error { progress: u8 },
}

impl Status {
    /// 固定のチェックポイント値（実際の転送量とは無関係）。
    pub fn progress(&self) -> u8 {
        match self {
            Status::Idle => 0,
            Status::Fetching => 10,
            Status::Converting => 60,
            Status::Complete { .. } => 100,
            Status::Error { progress } => *progress,
        }
    }

    /// リクエストが処理中かどうか。
    pub fn is_busy(&self) -> bool {
        matches!(self, Status::Fetching | Status::Converting)
    }

    /// 進捗表示の文言。
    pub fn label(&self) -> &'static str {
        match self {
            Status::Idle => "",
            Status::Fetching => "Fetching video information...",
            Status::Converting => "Converting to MP3...",
            Status::Complete { .. } => "Conversion complete!",
            Status::Error { .. } => "Conversion failed",
        }
    }
}

/// 完了した変換1件。作成後は変更しない。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryItem {
    /// サーバーが付けたファイル名（ダウンロードキーを兼ねる）。
    pub id: String,
    /// 動画タイトル。
    pub title: String,
    /// 要求した音質。
    pub quality: Quality,
    /// 作成日時。
    pub timestamp: DateTime<Local>,
}

impl HistoryItem {
    /// 「128 kbps • 3m ago」形式の補足行。
    pub fn subtitle(&self, now: DateTime<Local>) -> String {
        format!("{} • {}", self.quality, relative_age(self.timestamp, now))
    }
}

/// 新しい順に最大 [`HISTORY_CAPACITY`] 件を保持する履歴。
#[derive(Clone, Debug, Default)]
pub struct History {
    items: VecDeque<HistoryItem>,
}

impl History {
    /// 先頭へ追加し、溢れた古い項目を捨てる。
    pub fn push(&mut self, item: HistoryItem) {
        self.items.push_front(item);
        self.items.truncate(HISTORY_CAPACITY);
    }

    pub fn get(&self, idx: usize) -> Option<&HistoryItem> {
        self.items.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// 経過時間を「Just now / 5m ago / 2h ago / 日付」で表す。
pub fn relative_age(ts: DateTime<Local>, now: DateTime<Local>) -> String {
    let minutes = (now - ts).num_minutes();
    if minutes < 1 {
        return "Just now".into();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    ts.format("%Y-%m-%d").to_string()
}
