//! URL入力ポップアップ（InputBox）。

use ratatui::{
    layout::Alignment,
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::shortcuts::{InputBoxShortcuts, format_keys};

/// URL入力欄の編集状態。
///
/// `cursor` は文字単位の位置で、バイト位置への変換は内部で行う。
#[derive(Clone, Debug, Default)]
pub struct UrlField {
    /// 現在の入力値
    value: String,
    /// カーソル位置（文字単位）
    cursor: usize,
}

impl UrlField {
    /// 既存の値を引き継ぎ、カーソルを末尾に置く。
    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.chars().count(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// 文字位置をバイト位置へ変換する。
    fn byte_at(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map_or(self.value.len(), |(i, _)| i)
    }

    /// 文字を挿入
    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_at(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// 貼り付け（改行・制御文字は捨てる）
    pub fn insert_str(&mut self, s: &str) {
        let cleaned: String = s.chars().filter(|c| !c.is_control()).collect();
        let at = self.byte_at(self.cursor);
        self.value.insert_str(at, &cleaned);
        self.cursor += cleaned.chars().count();
    }

    /// Backspace（カーソル前の文字を削除）
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_at(self.cursor);
            self.value.remove(at);
        }
    }

    /// Delete（カーソル位置の文字を削除）
    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let at = self.byte_at(self.cursor);
            self.value.remove(at);
        }
    }

    /// カーソルを左に移動
    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// カーソルを右に移動
    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    /// カーソルを先頭に移動
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// カーソルを末尾に移動
    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    /// 行全体をクリア
    pub fn clear_line(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }
}

/// 表示幅に収まる範囲を切り出し、カーソル位置に `|` を入れる。
fn visible_with_cursor(field: &UrlField, width: usize) -> String {
    // カーソルが見える位置までスクロールする。
    let offset = field.cursor.saturating_sub(width.saturating_sub(2));
    let chars: Vec<char> = field.value.chars().skip(offset).take(width).collect();
    let at = (field.cursor - offset).min(chars.len());
    let before: String = chars[..at].iter().collect();
    let after: String = chars[at..].iter().collect();
    format!("{before}|{after}")
}

/// URL入力ボックスをポップアップとして描画
pub fn render_url_box(
    f: &mut Frame,
    field: &UrlField,
    error: Option<&str>,
    keys: &InputBoxShortcuts,
) {
    // 中央に配置されたポップアップ領域を計算する。
    let popup_area = centered_popup(f.area(), 70, 8);
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("YouTube URL")
        .style(Style::default().bg(Color::DarkGray));
    f.render_widget(block, popup_area);

    // プロンプト + 入力欄 + エラー + ヘルプ
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(popup_area);

    let prompt = Paragraph::new("Paste YouTube URL here...").style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    f.render_widget(prompt, rows[0]);

    let text = visible_with_cursor(field, rows[1].width as usize);
    f.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::Green)),
        rows[1],
    );

    // 入力内容のエラーがあれば赤で表示する。
    if let Some(err) = error {
        f.render_widget(
            Paragraph::new(err.to_string()).style(Style::default().fg(Color::Red)),
            rows[2],
        );
    }

    // 設定されたキー割り当てをそのまま案内する。
    let help = Paragraph::new(format!(
        "{}=変換 | {}=閉じる | {}=クリア | 貼り付け可",
        format_keys(&keys.confirm),
        format_keys(&keys.cancel),
        format_keys(&keys.clear_line)
    ))
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    f.render_widget(help, rows[4]);
}

/// 中央配置のポップアップ領域を計算
fn centered_popup(area: Rect, width_percent: u16, height: u16) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - width_percent) / 2),
            Constraint::Percentage(width_percent),
            Constraint::Percentage((100 - width_percent) / 2),
        ])
        .split(popup_layout[1])[1]
}
