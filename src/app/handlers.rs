//! キー入力ハンドラー関数。

use anyhow::{Result, bail};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc::error::TrySendError;

use crate::{
    input::UrlField,
    model::Status,
    shortcuts::{self, format_keys},
    worker::WorkerCmd,
};

use super::App;

/// キー入力を1件処理し、終了すべきならtrueを返す。
pub async fn handle_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    // 入力ボックスが開いていれば最優先で処理する。
    if app.url_box.is_some() {
        handle_url_box_key(app, k).await?;
        return Ok(false);
    }
    handle_main_key(app, k).await
}

/// Ctrl+Cかどうかを判定する。
pub fn is_ctrl_c(k: &KeyEvent) -> bool {
    k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('c')
}

/// 貼り付けを処理する。入力ボックスが閉じていれば貼り付けた値で開く。
pub fn handle_paste(app: &mut App, text: &str) {
    if let Some(field) = app.url_box.as_mut() {
        field.insert_str(text);
        app.controller.set_url(field.value());
        return;
    }
    if !form_editable(app) {
        return;
    }
    // 入力欄の値を貼り付け内容で置き換える。
    let mut field = UrlField::default();
    field.insert_str(text);
    app.controller.set_url(field.value());
    app.url_box = Some(field);
}

/// フォームを操作できる状態か（処理中・完了表示中は不可）。
fn form_editable(app: &mut App) -> bool {
    if app.controller.is_busy() {
        app.ui.status = "Conversion in progress...".into();
        return false;
    }
    if matches!(app.controller.status(), Status::Complete { .. }) {
        app.ui.status = format!(
            "Press {} to convert another video",
            format_keys(&app.shortcuts.main.reset)
        );
        return false;
    }
    true
}

/// メイン画面のキー処理。
async fn handle_main_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    // メイン画面のショートカットを参照する。
    let sc = app.shortcuts.main.clone();

    if shortcuts::matches_shortcut(&k, &sc.quit) {
        return Ok(true);
    } else if shortcuts::matches_shortcut(&k, &sc.edit_url) {
        // 現在のURLを引き継いで入力ボックスを開く。
        if form_editable(app) {
            app.url_box = Some(UrlField::with_value(app.controller.url()));
        }
    } else if shortcuts::matches_shortcut(&k, &sc.submit) {
        if form_editable(app) {
            start_conversion(app).await?;
        }
    } else if shortcuts::matches_shortcut(&k, &sc.quality) {
        // 音質を次の選択肢へ切り替える。
        if form_editable(app) {
            let next = app.controller.quality().next();
            app.controller.set_quality(next);
        }
    } else if shortcuts::matches_shortcut(&k, &sc.download) {
        app.controller.download_current();
    } else if shortcuts::matches_shortcut(&k, &sc.download_selected) {
        // 完了表示中は履歴を出していないので対象外。
        if matches!(app.controller.status(), Status::Complete { .. }) {
            return Ok(false);
        }
        if let Some(id) = app
            .controller
            .history()
            .get(app.ui.selected)
            .map(|h| h.id.clone())
        {
            app.controller.download_by_history_id(&id);
        }
    } else if shortcuts::matches_shortcut(&k, &sc.reset) {
        if app.controller.is_busy() {
            app.ui.status = "Conversion in progress...".into();
        } else {
            app.controller.reset();
            app.ui.status = "Ready".into();
        }
    } else if shortcuts::matches_shortcut(&k, &sc.check_backend) {
        // 変換サービスの疎通を再確認する。Workerが詰まっていても待たない。
        match app.worker_tx.try_send(WorkerCmd::CheckHealth) {
            Ok(()) => app.ui.status = "Checking backend...".into(),
            Err(TrySendError::Full(_)) => app.ui.status = "Backend check already queued".into(),
            Err(TrySendError::Closed(_)) => bail!("worker stopped"),
        }
    } else if shortcuts::matches_shortcut(&k, &sc.down) {
        // 次の行へ移動する。
        if app.ui.selected + 1 < app.controller.history().len() {
            app.ui.selected += 1;
        }
    } else if shortcuts::matches_shortcut(&k, &sc.up) {
        // 前の行へ移動する。
        app.ui.selected = app.ui.selected.saturating_sub(1);
    }

    Ok(false)
}

/// URL入力ボックスのキー処理。
async fn handle_url_box_key(app: &mut App, k: KeyEvent) -> Result<()> {
    let sc = app.shortcuts.input_box.clone();
    let Some(field) = app.url_box.as_mut() else {
        return Ok(());
    };

    if shortcuts::matches_shortcut(&k, &sc.confirm) {
        // 変換を開始し、受け付けられたらボックスを閉じる。
        start_conversion(app).await?;
        if app.controller.is_busy() {
            app.url_box = None;
        }
        return Ok(());
    } else if shortcuts::matches_shortcut(&k, &sc.cancel) {
        app.url_box = None;
        return Ok(());
    } else if shortcuts::matches_shortcut(&k, &sc.backspace) {
        field.backspace();
    } else if shortcuts::matches_shortcut(&k, &sc.delete) {
        field.delete();
    } else if shortcuts::matches_shortcut(&k, &sc.left) {
        field.move_left();
    } else if shortcuts::matches_shortcut(&k, &sc.right) {
        field.move_right();
    } else if shortcuts::matches_shortcut(&k, &sc.home) {
        field.move_home();
    } else if shortcuts::matches_shortcut(&k, &sc.end) {
        field.move_end();
    } else if shortcuts::matches_shortcut(&k, &sc.clear_line) {
        field.clear_line();
    } else if let KeyCode::Char(c) = k.code
        && !k
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        // Shift付きを含む通常の文字は入力として扱う。
        field.insert_char(c);
    } else {
        return Ok(());
    }

    // 編集のたびにURLを反映し、表示中のエラーを消す。
    let value = field.value().to_string();
    app.controller.set_url(value);
    Ok(())
}

/// 入力を検証し、通ればWorkerへ変換を依頼する。
async fn start_conversion(app: &mut App) -> Result<()> {
    match app.controller.submit() {
        Some(sub) => {
            let id = sub.id;
            match app.worker_tx.try_send(WorkerCmd::Convert(sub)) {
                Ok(()) => app.ui.status = "Converting...".into(),
                Err(TrySendError::Full(_)) => {
                    // 受け付けられなかった送信は失敗として戻す。
                    app.controller
                        .on_failed(id, "Worker is busy, please try again".into());
                    app.ui.status = "Ready".into();
                }
                Err(TrySendError::Closed(_)) => bail!("worker stopped"),
            }
        }
        None => {
            if let Some(err) = app.controller.error() {
                app.ui.status = err.to_string();
            }
        }
    }
    Ok(())
}
