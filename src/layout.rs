//! レイアウト計算のヘルパー関数

use ratatui::prelude::*;

/// メインレイアウトの4つの領域
pub struct MainLayout {
    /// タイトル行の領域
    pub header: Rect,
    /// 変換カード + サイドパネルの領域
    pub body: Rect,
    /// HELPバーの領域
    pub help_bar: Rect,
    /// STATUSバーの領域
    pub status_bar: Rect,
}

/// ボディ部の3つの領域
pub struct BodyLayout {
    /// 変換カード（URL・音質・進捗）の領域
    pub card: Rect,
    /// 変換履歴の領域
    pub history: Rect,
    /// 通知一覧の領域
    pub notices: Rect,
}

/// 変換カード内の各行
pub struct CardLayout {
    pub first: Rect,
    pub second: Rect,
    pub quality: Rect,
    pub label: Rect,
    pub gauge: Rect,
    pub hint: Rect,
}

/// メイン画面を4つの領域に分割（Header + Body + HELP + STATUS）
pub fn create_main_layout(area: Rect) -> MainLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // ヘッダー
            Constraint::Min(1),    // Body
            Constraint::Length(3), // HELPバー
            Constraint::Length(3), // STATUSバー
        ])
        .split(area);

    MainLayout {
        header: chunks[0],
        body: chunks[1],
        help_bar: chunks[2],
        status_bar: chunks[3],
    }
}

/// Body領域を分割（カード 60% + 右側に履歴と通知）
pub fn create_body_layout(area: Rect) -> BodyLayout {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);
    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2 + crate::model::HISTORY_CAPACITY as u16 + 1), // 枠 + ヘッダー + 行
            Constraint::Min(3),
        ])
        .split(cols[1]);

    BodyLayout {
        card: cols[0],
        history: side[0],
        notices: side[1],
    }
}

/// カードの内側を1行ずつに分割
pub fn create_card_layout(inner: Rect) -> CardLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // URL / タイトル
            Constraint::Length(1), // エラー / ファイル名
            Constraint::Length(1),
            Constraint::Length(1), // 音質
            Constraint::Length(1),
            Constraint::Length(1), // 状態ラベル
            Constraint::Length(1), // ゲージ
            Constraint::Length(1),
            Constraint::Min(1), // 操作ヒント
        ])
        .split(inner);

    CardLayout {
        first: rows[0],
        second: rows[1],
        quality: rows[3],
        label: rows[5],
        gauge: rows[6],
        hint: rows[8],
    }
}
