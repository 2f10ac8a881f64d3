//! TUIのイベントループ、入力処理、状態管理。

mod handlers;
mod render;

use anyhow::Result;
use crossterm::event::{self, Event};
use std::{path::PathBuf, time::Duration};
use tokio::sync::mpsc;

use crate::{
    config::Config,
    controller::ConversionWorkflowController,
    events::{BackendState, TerminalEffects, UiState},
    input::UrlField,
    shortcuts::Shortcuts,
    ui::Tui,
    worker::{self, WorkerCmd, WorkerEvent},
};

use handlers::{handle_key, handle_paste, is_ctrl_c};
use render::draw;

/// 入力処理と描画で共有するアプリ状態。
pub struct App {
    /// メモリ上の現在設定。
    pub cfg: Config,
    /// 選択位置やステータスなどUI固有の状態。
    pub ui: UiState,
    /// 変換ワークフローの状態を一手に持つコントローラー。
    pub controller: ConversionWorkflowController<TerminalEffects>,
    /// Workerへのコマンド送信チャネル。
    pub worker_tx: mpsc::Sender<WorkerCmd>,
    /// Workerからのイベント受信チャネル。
    pub worker_rx: mpsc::Receiver<WorkerEvent>,
    /// URL入力ボックスの状態（入力中はSome）。
    pub url_box: Option<UrlField>,
    /// ショートカットキー設定。
    pub shortcuts: Shortcuts,
}

impl App {
    /// 設定とチャネルからアプリ状態を組み立てる。
    pub fn new(
        cfg: Config,
        shortcuts: Shortcuts,
        worker_tx: mpsc::Sender<WorkerCmd>,
        worker_rx: mpsc::Receiver<WorkerEvent>,
    ) -> Self {
        let controller = ConversionWorkflowController::new(
            cfg.server.origin(),
            cfg.defaults.quality,
            TerminalEffects::default(),
        );
        Self {
            cfg,
            ui: UiState {
                selected: 0,
                status: "Ready".into(),
                backend: BackendState::Unknown,
            },
            controller,
            worker_tx,
            worker_rx,
            url_box: None,
            shortcuts,
        }
    }
}

/// ユーザーが終了するまでメインTUIループを回す。
pub async fn run_app(terminal: &mut Tui) -> Result<()> {
    // 設定ファイルを読み込む（初回はデフォルトを生成）。
    let cfg = Config::load_or_default(&PathBuf::from("config.toml"))?;
    tracing::info!("conversion service at {}", cfg.server.origin());

    // ショートカット設定を読み込む（無ければデフォルト）。
    let shortcuts = Shortcuts::load_or_default(PathBuf::from("shortcut.toml"))?;

    // Worker通信用のコマンド/イベントチャネルを作る。
    let (tx_cmd, rx_cmd) = mpsc::channel::<WorkerCmd>(16);
    let (tx_ev, rx_ev) = mpsc::channel::<WorkerEvent>(64);

    // HTTPクライアントを作れなければ起動を中止する。
    let http = worker::http_client(&cfg.server)?;
    // サーバー設定のスナップショットでWorkerを起動する。
    tokio::spawn(worker::run(rx_cmd, tx_ev, http, cfg.server.clone()));

    let mut app = App::new(cfg, shortcuts, tx_cmd, rx_ev);

    // 起動時に変換サービスの疎通を確認する。
    app.worker_tx.send(WorkerCmd::CheckHealth).await?;

    loop {
        // 現在の状態を描画する。
        terminal.draw(|f| draw(f, &app))?;

        // 入力処理の前にWorkerイベントを消化する。
        while let Ok(ev) = app.worker_rx.try_recv() {
            handle_worker_event(&mut app, ev);
        }

        // UIの応答性確保のため短いタイムアウトで入力をポーリングする。
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(k) => {
                    // どの状態でもCtrl+Cで終了できるようにする。
                    if is_ctrl_c(&k) {
                        break;
                    }
                    if handle_key(&mut app, k).await? {
                        break;
                    }
                }
                Event::Paste(text) => handle_paste(&mut app, &text),
                _ => {}
            }
        }
    }
    Ok(())
}

/// WorkerイベントをUI状態へ反映する。
fn handle_worker_event(app: &mut App, ev: WorkerEvent) {
    match ev {
        WorkerEvent::Accepted { submission } => {
            app.controller.on_accepted(submission);
        }
        WorkerEvent::Converted {
            submission,
            response,
        } => {
            // 新しい項目が先頭に入るので選択も先頭へ戻す。
            app.controller.on_converted(submission, response);
            app.ui.selected = 0;
            app.ui.status = "Ready".into();
        }
        WorkerEvent::Failed {
            submission,
            message,
        } => {
            app.controller.on_failed(submission, message);
            app.ui.status = "Ready".into();
        }
        WorkerEvent::Health(Ok(())) => {
            app.ui.backend = BackendState::Online;
        }
        WorkerEvent::Health(Err(e)) => {
            app.ui.backend = BackendState::Offline(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::convert::{ConvertResponse, VideoInfo},
        model::Status,
    };

    pub(super) fn test_app() -> (App, mpsc::Receiver<WorkerCmd>, mpsc::Sender<WorkerEvent>) {
        let (tx_cmd, rx_cmd) = mpsc::channel(8);
        let (tx_ev, rx_ev) = mpsc::channel(8);
        let app = App::new(Config::default(), Shortcuts::default(), tx_cmd, rx_ev);
        (app, rx_cmd, tx_ev)
    }

    #[test]
    fn test_worker_events_drive_controller() {
        // Workerイベントがコントローラーへ反映されることを検証する。
        let (mut app, _rx, _tx) = test_app();
        app.controller.set_url("https://youtu.be/abc");
        let sub = app.controller.submit().unwrap();
        app.ui.selected = 3;

        handle_worker_event(&mut app, WorkerEvent::Accepted { submission: sub.id });
        assert_eq!(*app.controller.status(), Status::Converting);

        handle_worker_event(
            &mut app,
            WorkerEvent::Converted {
                submission: sub.id,
                response: ConvertResponse {
                    info: VideoInfo {
                        title: "Song".into(),
                    },
                    download_url: "/download/song.mp3".into(),
                    filename: "song.mp3".into(),
                },
            },
        );
        assert_eq!(app.controller.video_title(), "Song");
        assert_eq!(app.ui.selected, 0);
    }

    #[test]
    fn test_health_events_update_backend_state() {
        // 疎通確認の結果が表示状態へ反映されることを検証する。
        let (mut app, _rx, _tx) = test_app();
        handle_worker_event(&mut app, WorkerEvent::Health(Err("refused".into())));
        assert_eq!(app.ui.backend, BackendState::Offline("refused".into()));
        handle_worker_event(&mut app, WorkerEvent::Health(Ok(())));
        assert_eq!(app.ui.backend, BackendState::Online);
    }
}
