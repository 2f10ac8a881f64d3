//! Background worker handling conversion service calls.

use anyhow::Result;
use reqwest::Client;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    backend::{
        convert::{self, ConvertResponse},
        health,
    },
    config::ServerCfg,
    controller::Submission,
};

/// Commands sent from the UI to the worker.
#[derive(Debug)]
pub enum WorkerCmd {
    /// Run one conversion.
    Convert(Submission),
    /// Probe the service health endpoint.
    CheckHealth,
}

/// Events emitted by the worker for UI updates.
#[derive(Clone, Debug)]
pub enum WorkerEvent {
    /// The service answered 2xx; the body is being read.
    Accepted { submission: Uuid },
    /// Conversion result decoded.
    Converted {
        submission: Uuid,
        response: ConvertResponse,
    },
    /// Conversion failed with a user-facing message.
    Failed { submission: Uuid, message: String },
    /// Outcome of a health probe.
    Health(Result<(), String>),
}

/// HTTP client shared by all calls, bounded by the configured timeout.
pub fn http_client(server: &ServerCfg) -> Result<Client> {
    Ok(Client::builder()
        .timeout(server.request_timeout())
        .build()?)
}

/// Main worker loop: each command runs on its own task so the queue keeps draining.
///
/// Only one conversion is in flight at a time because the controller refuses
/// to submit while busy.
pub async fn run(
    mut rx: mpsc::Receiver<WorkerCmd>,
    tx: mpsc::Sender<WorkerEvent>,
    http: Client,
    server: ServerCfg,
) {
    tracing::info!("worker started for {}", server.origin());

    while let Some(cmd) = rx.recv().await {
        let (http, server, tx) = (http.clone(), server.clone(), tx.clone());
        match cmd {
            WorkerCmd::Convert(sub) => {
                tokio::spawn(async move { convert_one(&http, &server, sub, &tx).await });
            }
            WorkerCmd::CheckHealth => {
                tokio::spawn(async move { probe_health(&http, &server, &tx).await });
            }
        }
    }
    tracing::info!("worker stopped");
}

async fn probe_health(http: &Client, server: &ServerCfg, tx: &mpsc::Sender<WorkerEvent>) {
    let res = health::check(http, server)
        .await
        .map_err(|e| format!("{e:#}"));
    match &res {
        Ok(()) => tracing::info!("backend healthy"),
        Err(e) => tracing::warn!("backend health check failed: {e}"),
    }
    let _ = tx.send(WorkerEvent::Health(res)).await;
}

/// Send one conversion and report each milestone back to the UI.
async fn convert_one(
    http: &Client,
    server: &ServerCfg,
    sub: Submission,
    tx: &mpsc::Sender<WorkerEvent>,
) {
    tracing::info!("convert start: {}", sub.id);
    let result = async {
        let resp = convert::send(http, server, &sub.url, sub.quality).await?;
        let _ = tx
            .send(WorkerEvent::Accepted {
                submission: sub.id,
            })
            .await;
        convert::read_result(resp).await
    }
    .await;

    let ev = match result {
        Ok(response) => {
            tracing::info!("convert done: {}", sub.id);
            WorkerEvent::Converted {
                submission: sub.id,
                response,
            }
        }
        Err(e) => {
            match e.status() {
                Some(status) => tracing::error!("convert failed: {} ({status}): {e}", sub.id),
                None => tracing::error!(error = ?e, "convert failed: {}", sub.id),
            }
            WorkerEvent::Failed {
                submission: sub.id,
                message: e.to_string(),
            }
        }
    };
    let _ = tx.send(ev).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        controller::ConversionWorkflowController,
        model::{Quality, Status},
        testutil::{self, RecordingEffects},
    };
    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::{Value, json};

    /// Spawn a worker against `app`; returns its channels and the origin.
    async fn start(
        app: Router,
    ) -> (
        mpsc::Sender<WorkerCmd>,
        mpsc::Receiver<WorkerEvent>,
        String,
    ) {
        let origin = testutil::spawn(app).await;
        let server = testutil::server_cfg(origin.clone());
        let (tx_cmd, rx_cmd) = mpsc::channel(8);
        let (tx_ev, rx_ev) = mpsc::channel(32);
        let http = http_client(&server).unwrap();
        tokio::spawn(run(rx_cmd, tx_ev, http, server));
        (tx_cmd, rx_ev, origin)
    }

    /// Feed worker events into the controller until the submission settles.
    async fn settle(
        c: &mut ConversionWorkflowController<RecordingEffects>,
        rx: &mut mpsc::Receiver<WorkerEvent>,
    ) {
        while let Some(ev) = rx.recv().await {
            match ev {
                WorkerEvent::Accepted { submission } => c.on_accepted(submission),
                WorkerEvent::Converted {
                    submission,
                    response,
                } => {
                    c.on_converted(submission, response);
                    return;
                }
                WorkerEvent::Failed {
                    submission,
                    message,
                } => {
                    c.on_failed(submission, message);
                    return;
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
    }

    fn echo_service() -> Router {
        Router::new().route(
            "/convert",
            post(|Json(req): Json<Value>| async move {
                let url = req["url"].as_str().unwrap_or_default().to_string();
                let id = url.rsplit('/').next().unwrap_or_default().to_string();
                Json(json!({
                    "info": { "title": format!("Title {id}") },
                    "download_url": format!("/download/{id}.mp3"),
                    "filename": format!("{id}.mp3"),
                }))
            }),
        )
    }

    #[tokio::test]
    async fn worker_reports_accepted_then_converted() {
        let (tx, mut rx, _) = start(echo_service()).await;
        let sub = Submission {
            id: Uuid::new_v4(),
            url: "https://youtu.be/abc".into(),
            quality: Quality::Kbps192,
        };
        tx.send(WorkerCmd::Convert(sub.clone())).await.unwrap();

        match rx.recv().await.unwrap() {
            WorkerEvent::Accepted { submission } => assert_eq!(submission, sub.id),
            other => panic!("unexpected {other:?}"),
        }
        match rx.recv().await.unwrap() {
            WorkerEvent::Converted {
                submission,
                response,
            } => {
                assert_eq!(submission, sub.id);
                assert_eq!(response.filename, "abc.mp3");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn end_to_end_success_updates_controller() {
        let app = Router::new().route(
            "/convert",
            post(|Json(req): Json<Value>| async move {
                assert_eq!(req["quality"], "320");
                Json(json!({
                    "info": { "title": "Song" },
                    "download_url": "/download/song.mp3",
                    "filename": "song.mp3",
                }))
            }),
        );
        let (tx, mut rx, origin) = start(app).await;
        let mut c =
            ConversionWorkflowController::new(&origin, Quality::default(), RecordingEffects::default());
        c.set_url("https://www.youtube.com/watch?v=abc123");
        c.set_quality(Quality::Kbps320);
        let sub = c.submit().unwrap();
        tx.send(WorkerCmd::Convert(sub)).await.unwrap();
        settle(&mut c, &mut rx).await;

        assert_eq!(
            *c.status(),
            Status::Complete {
                title: "Song".into()
            }
        );
        assert_eq!(c.progress(), 100);
        assert_eq!(
            c.download_url(),
            Some(format!("{origin}/download/song.mp3").as_str())
        );
        let first = c.history().get(0).unwrap();
        assert_eq!(
            (first.id.as_str(), first.title.as_str(), first.quality),
            ("song.mp3", "Song", Quality::Kbps320)
        );
    }

    #[tokio::test]
    async fn end_to_end_rejection_sets_error() {
        let app = Router::new().route(
            "/convert",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "video unavailable" })),
                )
            }),
        );
        let (tx, mut rx, origin) = start(app).await;
        let mut c =
            ConversionWorkflowController::new(&origin, Quality::default(), RecordingEffects::default());
        c.set_url("https://youtu.be/abc");
        let sub = c.submit().unwrap();
        tx.send(WorkerCmd::Convert(sub)).await.unwrap();
        settle(&mut c, &mut rx).await;

        assert_eq!(*c.status(), Status::Error { progress: 10 });
        assert_eq!(c.error(), Some("video unavailable"));
        assert!(c.history().is_empty());
    }

    #[tokio::test]
    async fn end_to_end_six_conversions_keep_five() {
        let (tx, mut rx, origin) = start(echo_service()).await;
        let mut c =
            ConversionWorkflowController::new(&origin, Quality::default(), RecordingEffects::default());
        for n in 1..=6 {
            c.set_url(format!("https://youtu.be/v{n}"));
            let sub = c.submit().unwrap();
            tx.send(WorkerCmd::Convert(sub)).await.unwrap();
            settle(&mut c, &mut rx).await;
            assert!(matches!(c.status(), Status::Complete { .. }));
        }
        let ids: Vec<_> = c.history().iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, ["v6.mp3", "v5.mp3", "v4.mp3", "v3.mp3", "v2.mp3"]);
    }

    #[tokio::test]
    async fn unreachable_service_fails_the_submission() {
        let origin = testutil::closed_origin().await;
        let server = testutil::server_cfg(origin.clone());
        let (tx_cmd, rx_cmd) = mpsc::channel(8);
        let (tx_ev, mut rx_ev) = mpsc::channel(8);
        let http = http_client(&server).unwrap();
        tokio::spawn(run(rx_cmd, tx_ev, http, server));

        let mut c =
            ConversionWorkflowController::new(&origin, Quality::default(), RecordingEffects::default());
        c.set_url("https://youtu.be/abc");
        let sub = c.submit().unwrap();
        tx_cmd.send(WorkerCmd::Convert(sub)).await.unwrap();
        settle(&mut c, &mut rx_ev).await;

        assert_eq!(*c.status(), Status::Error { progress: 10 });
        assert!(c.error().unwrap().starts_with("Could not reach"));
    }

    #[tokio::test]
    async fn health_probe_reports_outcome() {
        let app = Router::new().route(
            "/api/health",
            axum::routing::get(|| async { Json(json!({ "status": "ok" })) }),
        );
        let (tx, mut rx, _) = start(app).await;
        tx.send(WorkerCmd::CheckHealth).await.unwrap();
        assert!(matches!(rx.recv().await, Some(WorkerEvent::Health(Ok(())))));
    }

    #[tokio::test]
    async fn health_probe_is_not_held_behind_a_conversion() {
        // /convert never answers within the test; the probe must still come back.
        let app = Router::new()
            .route(
                "/convert",
                post(|| async {
                    tokio::time::sleep(std::time::Duration::from_secs(30)).await;
                    Json(json!({}))
                }),
            )
            .route(
                "/api/health",
                axum::routing::get(|| async { Json(json!({ "status": "ok" })) }),
            );
        let (tx, mut rx, _) = start(app).await;
        let sub = Submission {
            id: Uuid::new_v4(),
            url: "https://youtu.be/abc".into(),
            quality: Quality::Kbps192,
        };
        tx.send(WorkerCmd::Convert(sub)).await.unwrap();
        tx.send(WorkerCmd::CheckHealth).await.unwrap();

        let ev = tokio::time::timeout(std::time::Duration::from_secs(2), rx.recv())
            .await
            .expect("health result arrives while converting");
        assert!(matches!(ev, Some(WorkerEvent::Health(Ok(())))));
    }
}
