//! Test helpers: an in-process stand-in for the conversion service and a
//! recording side-effect sink.

use anyhow::{Result, bail};
use axum::Router;
use tokio::net::TcpListener;

use crate::{
    config::ServerCfg,
    events::{Effects, Toast},
};

/// Side-effect sink that records instead of acting.
#[derive(Debug, Default)]
pub struct RecordingEffects {
    /// Notifications in emission order.
    pub toasts: Vec<Toast>,
    /// URLs that would have been opened.
    pub opened: Vec<String>,
    /// Make every `open_url` fail.
    pub fail_open: bool,
}

impl Effects for RecordingEffects {
    fn notify(&mut self, toast: Toast) {
        self.toasts.push(toast);
    }

    fn open_url(&mut self, url: &str) -> Result<()> {
        if self.fail_open {
            bail!("no browser available");
        }
        self.opened.push(url.to_string());
        Ok(())
    }
}

/// Serve `app` on an ephemeral local port and return its origin.
pub async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Origin of a port that nothing listens on.
pub async fn closed_origin() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Server settings pointing at `origin` with test-friendly timings.
pub fn server_cfg(origin: String) -> ServerCfg {
    ServerCfg {
        base_url: origin,
        request_timeout_secs: 5,
        retries: 0,
        retry_delay_ms: 10,
    }
}
