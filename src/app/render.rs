//! TUI描画関連の関数。

use chrono::Local;
use ratatui::{
    Frame,
    prelude::*,
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Row, Table, TableState, Wrap},
};

use crate::{
    events::{BackendState, ToastKind},
    input, layout,
    layout::CardLayout,
    model::{Quality, Status},
    shortcuts::{Shortcuts, format_keys},
};

use super::App;

/// 画面全体のレイアウトを描画する。
pub fn draw(f: &mut Frame, app: &App) {
    let main_layout = layout::create_main_layout(f.area());
    let body_layout = layout::create_body_layout(main_layout.body);

    // ヘッダー（アプリ名と説明）を描画する。
    let header = Paragraph::new(vec![
        Line::from("YouTube to MP3".bold()),
        Line::from("Convert any YouTube video to high-quality MP3 audio".dark_gray()),
    ])
    .alignment(Alignment::Center);
    f.render_widget(header, main_layout.header);

    // 変換カードを描画する（完了時は結果表示）。
    let card = Block::default().borders(Borders::ALL).title("CONVERT");
    let inner = card.inner(body_layout.card);
    f.render_widget(card, body_layout.card);
    let rows = layout::create_card_layout(inner);
    if matches!(app.controller.status(), Status::Complete { .. }) {
        draw_complete_card(f, app, &rows);
    } else {
        draw_form_card(f, app, &rows);
    }

    draw_history(f, app, body_layout.history);
    draw_notices(f, app, body_layout.notices);

    // HELPバー（ショートカット一覧）を描画する。
    let help_bar = Paragraph::new(get_help_text(app, &app.shortcuts))
        .block(Block::default().borders(Borders::ALL).title("HELP"))
        .wrap(Wrap { trim: true });
    f.render_widget(help_bar, main_layout.help_bar);

    f.render_widget(build_status_bar(app), main_layout.status_bar);

    // 入力ボックスが開いていれば重ねて描画する。
    if let Some(field) = &app.url_box {
        input::render_url_box(f, field, app.controller.error(), &app.shortcuts.input_box);
    }
}

/// 入力フォーム（URL・音質・進捗）を描画する。
fn draw_form_card(f: &mut Frame, app: &App, rows: &CardLayout) {
    let c = &app.controller;

    let url_line = if c.url().is_empty() {
        Line::from(vec!["URL: ".into(), "Paste YouTube URL here...".dark_gray()])
    } else {
        Line::from(vec!["URL: ".into(), c.url().to_string().cyan()])
    };
    f.render_widget(Paragraph::new(url_line), rows.first);

    // 入力エラー・変換エラーは赤で表示する。
    if let Some(err) = c.error() {
        f.render_widget(
            Paragraph::new(err.to_string()).style(Style::default().fg(Color::Red)),
            rows.second,
        );
    }

    f.render_widget(Paragraph::new(quality_line(c.quality(), c.is_busy())), rows.quality);

    // 処理中のみ進捗を出す。
    if c.is_busy() {
        draw_progress(f, c.status(), c.progress(), rows);
    } else {
        f.render_widget(
            Paragraph::new(format!(
                "{}: edit URL | {}: Convert to MP3",
                format_keys(&app.shortcuts.main.edit_url),
                format_keys(&app.shortcuts.main.submit)
            ))
            .dark_gray(),
            rows.hint,
        );
    }
}

/// 完了結果を描画する。
fn draw_complete_card(f: &mut Frame, app: &App, rows: &CardLayout) {
    let c = &app.controller;
    f.render_widget(
        Paragraph::new(Line::from(vec!["♪ ".green(), c.video_title().to_string().bold()])),
        rows.first,
    );
    // ブラウザが開けない場合に備えてリンクも出しておく。
    let file_line = match c.download_url() {
        Some(url) => format!("{}.mp3  {}", c.video_title(), url),
        None => format!("{}.mp3", c.video_title()),
    };
    f.render_widget(Paragraph::new(file_line).dark_gray(), rows.second);
    draw_progress(f, c.status(), c.progress(), rows);
    f.render_widget(
        Paragraph::new(format!(
            "{}: Download MP3 | {}: Convert Another Video",
            format_keys(&app.shortcuts.main.download),
            format_keys(&app.shortcuts.main.reset)
        ))
        .green(),
        rows.hint,
    );
}

/// 状態ラベルと進捗ゲージを描画する。
fn draw_progress(f: &mut Frame, status: &Status, progress: u8, rows: &CardLayout) {
    let color = match status {
        Status::Complete { .. } => Color::Green,
        Status::Error { .. } => Color::Red,
        _ => Color::Cyan,
    };
    f.render_widget(
        Paragraph::new(status.label()).style(Style::default().fg(color)),
        rows.label,
    );
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color))
        .percent(u16::from(progress));
    f.render_widget(gauge, rows.gauge);
}

/// 音質の選択肢を1行で表す（選択中を反転）。
fn quality_line(selected: Quality, disabled: bool) -> Line<'static> {
    let mut spans = vec![Span::raw("Quality: ")];
    for q in Quality::ALL {
        let text = format!(" {} ({}) ", q, q.describe());
        let span = if q == selected {
            Span::styled(text, Style::default().fg(Color::Black).bg(Color::Rgb(255, 140, 0)))
        } else {
            Span::raw(text)
        };
        spans.push(span);
    }
    let line = Line::from(spans);
    if disabled { line.dark_gray() } else { line }
}

/// 変換履歴を描画する（完了表示中は隠す）。
fn draw_history(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("RECENT CONVERSIONS");
    let history = app.controller.history();
    let hidden = matches!(app.controller.status(), Status::Complete { .. });
    if history.is_empty() || hidden {
        f.render_widget(block, area);
        return;
    }

    let now = Local::now();
    let rows = history.iter().enumerate().map(|(i, item)| {
        Row::new(vec![
            format!("{}", i + 1),
            item.title.clone(),
            item.subtitle(now),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Min(10),
            Constraint::Length(20),
        ],
    )
    .block(block)
    .header(Row::new(vec!["#", "title", "quality"]).bold())
    .row_highlight_style(
        Style::default()
            .bg(Color::Rgb(255, 140, 0))
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD),
    );

    // 選択中の行をハイライトする。
    let mut state = TableState::default();
    state.select(Some(app.ui.selected.min(history.len() - 1)));
    f.render_stateful_widget(table, area, &mut state);
}

/// 通知一覧を描画する。
fn draw_notices(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .controller
        .effects()
        .recent()
        .map(|t| {
            ListItem::new(format!("{}: {}", t.title, t.description))
                .style(Style::default().fg(toast_color(t.kind)))
        })
        .collect();
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("NOTICES"));
    f.render_widget(list, area);
}

fn toast_color(kind: ToastKind) -> Color {
    match kind {
        ToastKind::Success => Color::Green,
        ToastKind::Info => Color::Cyan,
        ToastKind::Failure => Color::Red,
    }
}

/// ステータスバーを構築する。
fn build_status_bar(app: &App) -> Paragraph<'static> {
    // 表示期限内の通知があれば優先する。
    let (text, color) = match app.controller.effects().current_toast() {
        Some(t) => (format!("{}: {}", t.title, t.description), toast_color(t.kind)),
        None => (app.ui.status.clone(), Color::Reset),
    };

    let backend = match &app.ui.backend {
        BackendState::Unknown => "backend: checking...".to_string(),
        BackendState::Online => format!("backend: {}", app.cfg.server.origin()),
        BackendState::Offline(_) => format!(
            "Make sure you have the backend running at {}",
            app.cfg.server.origin()
        ),
    };

    let line = Line::from(vec![
        Span::styled(text, Style::default().fg(color)),
        Span::raw(" | "),
        if matches!(app.ui.backend, BackendState::Offline(_)) {
            Span::styled(backend, Style::default().fg(Color::Yellow))
        } else {
            Span::raw(backend)
        },
    ]);
    Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL).title("STATUS"))
        .wrap(Wrap { trim: true })
}

/// 現在の状態に応じたヘルプ文字列を返す。
fn get_help_text(app: &App, shortcuts: &Shortcuts) -> String {
    let sc = &shortcuts.main;
    if app.url_box.is_some() {
        let ib = &shortcuts.input_box;
        return format!(
            "{}: convert | {}: close | {}: clear",
            format_keys(&ib.confirm),
            format_keys(&ib.cancel),
            format_keys(&ib.clear_line)
        );
    }
    format!(
        "{}: quit | {}: URL | {}: convert | {}: quality | {}: download | {}: history download | {}/{}: select | {}: new | {}: check backend",
        format_keys(&sc.quit),
        format_keys(&sc.edit_url),
        format_keys(&sc.submit),
        format_keys(&sc.quality),
        format_keys(&sc.download),
        format_keys(&sc.download_selected),
        format_keys(&sc.up),
        format_keys(&sc.down),
        format_keys(&sc.reset),
        format_keys(&sc.check_backend)
    )
}
