//! Conversion workflow controller.
//!
//! Owns every piece of workflow state. The UI forwards user intents here and
//! the worker's settlement events are applied through the `on_*` methods; the
//! controller itself never touches the network.

use chrono::Local;
use uuid::Uuid;

use crate::{
    backend::{convert::ConvertResponse, links},
    events::{Effects, Toast, ToastKind},
    model::{History, HistoryItem, Quality, Status},
    validate::validate_url,
};

/// A validated conversion request, ready to hand to the worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    /// Correlates worker events with this attempt.
    pub id: Uuid,
    pub url: String,
    pub quality: Quality,
}

/// The single request currently outstanding.
#[derive(Clone, Copy, Debug)]
struct InFlight {
    id: Uuid,
    quality: Quality,
}

pub struct ConversionWorkflowController<E> {
    url: String,
    quality: Quality,
    status: Status,
    /// Absolute link of the latest completed conversion; survives `reset`.
    download_url: Option<String>,
    error: Option<String>,
    history: History,
    in_flight: Option<InFlight>,
    /// Service origin used to build download links.
    origin: String,
    effects: E,
}

impl<E: Effects> ConversionWorkflowController<E> {
    pub fn new(origin: impl Into<String>, quality: Quality, effects: E) -> Self {
        Self {
            url: String::new(),
            quality,
            status: Status::Idle,
            download_url: None,
            error: None,
            history: History::default(),
            in_flight: None,
            origin: origin.into(),
            effects,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn progress(&self) -> u8 {
        self.status.progress()
    }

    /// Title of the completed conversion, empty otherwise.
    pub fn video_title(&self) -> &str {
        match &self.status {
            Status::Complete { title } => title,
            _ => "",
        }
    }

    pub fn download_url(&self) -> Option<&str> {
        self.download_url.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn effects(&self) -> &E {
        &self.effects
    }

    pub fn is_busy(&self) -> bool {
        self.status.is_busy()
    }

    /// Replace the URL text. Any visible error is dismissed.
    pub fn set_url(&mut self, text: impl Into<String>) {
        self.url = text.into();
        self.error = None;
    }

    pub fn set_quality(&mut self, quality: Quality) {
        self.quality = quality;
    }

    /// Validate the current input and enter `Fetching`.
    ///
    /// Returns the request the caller must send, or `None` when validation
    /// failed (the message is in `error()`) or a request is already running.
    pub fn submit(&mut self) -> Option<Submission> {
        if self.is_busy() {
            tracing::warn!("submit ignored: conversion already in flight");
            return None;
        }
        if let Err(e) = validate_url(&self.url) {
            tracing::info!("submit rejected: {e}");
            self.error = Some(e.to_string());
            return None;
        }

        let submission = Submission {
            id: Uuid::new_v4(),
            url: self.url.trim().to_string(),
            quality: self.quality,
        };
        self.error = None;
        self.status = Status::Fetching;
        self.in_flight = Some(InFlight {
            id: submission.id,
            quality: submission.quality,
        });
        tracing::info!(
            "submit {}: {} @ {}",
            submission.id,
            submission.url,
            submission.quality
        );
        Some(submission)
    }

    /// The service accepted the request; its body is being read.
    pub fn on_accepted(&mut self, id: Uuid) {
        if !self.is_current(id) {
            return;
        }
        if self.status == Status::Fetching {
            self.status = Status::Converting;
        }
    }

    /// The service returned a result.
    pub fn on_converted(&mut self, id: Uuid, resp: ConvertResponse) {
        if !self.is_current(id) {
            return;
        }
        let Some(flight) = self.in_flight.take() else {
            return;
        };
        tracing::info!("conversion {id} complete: {}", resp.filename);

        self.download_url = Some(links::absolute(&self.origin, &resp.download_url));
        self.history.push(HistoryItem {
            id: resp.filename,
            title: resp.info.title.clone(),
            quality: flight.quality,
            timestamp: Local::now(),
        });
        self.status = Status::Complete {
            title: resp.info.title,
        };
        self.effects.notify(Toast::new(
            ToastKind::Success,
            "Conversion Complete!",
            "Your MP3 is ready to download.",
        ));
    }

    /// The request failed; one failure is terminal for this submission.
    pub fn on_failed(&mut self, id: Uuid, message: String) {
        if !self.is_current(id) {
            return;
        }
        self.in_flight = None;
        tracing::warn!("conversion {id} failed: {message}");
        self.status = Status::Error {
            progress: self.status.progress(),
        };
        self.effects
            .notify(Toast::new(ToastKind::Failure, "Error", message.clone()));
        self.error = Some(message);
    }

    /// Open the artifact of the latest completed conversion, if any.
    pub fn download_current(&mut self) {
        match self.download_url.clone() {
            Some(url) => self.start_download(&url),
            None => tracing::debug!("download ignored: nothing converted yet"),
        }
    }

    /// Open a history entry's artifact. An empty id means the current one.
    pub fn download_by_history_id(&mut self, id: &str) {
        if id.is_empty() {
            self.download_current();
            return;
        }
        let url = links::by_filename(&self.origin, id);
        self.start_download(&url);
    }

    /// Back to a blank form. The download link and history are kept.
    pub fn reset(&mut self) {
        if let Some(flight) = self.in_flight.take() {
            tracing::info!("reset drops pending conversion {}", flight.id);
        }
        self.url.clear();
        self.status = Status::Idle;
        self.error = None;
    }

    fn start_download(&mut self, url: &str) {
        match self.effects.open_url(url) {
            Ok(()) => self.effects.notify(Toast::new(
                ToastKind::Info,
                "Download Started",
                "Your MP3 file is being downloaded.",
            )),
            Err(e) => {
                tracing::error!("failed to open {url}: {e}");
                self.effects.notify(Toast::new(
                    ToastKind::Failure,
                    "Download failed",
                    format!("Open {url} manually."),
                ));
            }
        }
    }

    fn is_current(&self, id: Uuid) -> bool {
        let current = self.in_flight.is_some_and(|f| f.id == id);
        if !current {
            tracing::debug!("ignoring event for stale submission {id}");
        }
        current
    }
}
