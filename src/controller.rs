//! Request lifecycle: one analysis request from trigger to rendered result.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::error::{AppError, ErrorCategory, ErrorDescriptor, TransportError};
use crate::field::truthy;
use crate::payload::AnalysisView;
use crate::render::Reconciler;
use crate::view::{StatusClass, StatusLine, UiState};

const ANALYZE_PATH: &str = "analyze/url";

/// Host capability answering "which URL is the user looking at?".
pub trait ActiveTab {
    fn active_url(&self) -> Option<String>;
}

/// The URL given on the command line, if any.
pub struct ArgTab(pub Option<String>);

impl ActiveTab for ArgTab {
    fn active_url(&self) -> Option<String> {
        self.0
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// How the target URL travels to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitMode {
    /// `POST /analyze/url?url=...` with an empty body.
    #[default]
    Query,
    /// `POST /analyze/url` with a form-encoded `url` field.
    Form,
}

/// Where analysis requests go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint(Url);

impl Endpoint {
    /// `base` is the service root, e.g. `http://localhost:10124`.
    pub fn new(base: &str) -> Result<Self, AppError> {
        let mut root = Url::parse(base).map_err(|e| AppError::Endpoint(base.to_string(), e))?;
        if !root.path().ends_with('/') {
            let path = format!("{}/", root.path());
            root.set_path(&path);
        }
        let url = root
            .join(ANALYZE_PATH)
            .map_err(|e| AppError::Endpoint(base.to_string(), e))?;
        Ok(Endpoint(url))
    }

    pub fn url(&self) -> &Url {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeRequest {
    pub endpoint: Endpoint,
    pub target: String,
    pub mode: SubmitMode,
}

impl AnalyzeRequest {
    /// The URL actually posted to; carries the target only in query mode.
    pub fn request_url(&self) -> Url {
        let mut url = self.endpoint.url().clone();
        if self.mode == SubmitMode::Query {
            url.query_pairs_mut().append_pair("url", &self.target);
        }
        url
    }

    /// Form fields sent as the body; empty in query mode.
    pub fn form(&self) -> Vec<(&'static str, &str)> {
        match self.mode {
            SubmitMode::Query => Vec::new(),
            SubmitMode::Form => vec![("url", self.target.as_str())],
        }
    }
}

/// A response whose headers arrived. The body is read separately and may fail on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: Result<String, TransportError>,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn status_text(&self) -> String {
        format!("{} {}", self.status, self.reason).trim_end().to_string()
    }
}

pub trait Transport {
    fn send(&self, request: &AnalyzeRequest) -> Result<HttpReply, TransportError>;
}

/// Blocking HTTP transport. Non-2xx statuses are replies, not errors.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &AnalyzeRequest) -> Result<HttpReply, TransportError> {
        let url = request.request_url();
        let builder = self
            .agent
            .post(url.as_str())
            .header("Accept", "application/json");
        let sent = match request.mode {
            SubmitMode::Query => builder.send_empty(),
            SubmitMode::Form => builder.send_form(request.form()),
        };
        let mut res = sent.map_err(|e| TransportError::Connect(e.to_string()))?;

        let status = res.status();
        let headers = res
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = res
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::Body(e.to_string()));

        Ok(HttpReply {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Preparing,
    Sending,
    Succeeded(Value),
    Failed(ErrorDescriptor),
}

impl RequestState {
    fn allows(&self, next: &RequestState) -> bool {
        use RequestState::*;
        matches!(
            (self, next),
            (Idle | Succeeded(_) | Failed(_), Preparing)
                | (Preparing, Sending | Failed(_))
                | (Sending, Succeeded(_) | Failed(_))
        )
    }

    fn name(&self) -> &'static str {
        match self {
            RequestState::Idle => "idle",
            RequestState::Preparing => "preparing",
            RequestState::Sending => "sending",
            RequestState::Succeeded(_) => "succeeded",
            RequestState::Failed(_) => "failed",
        }
    }
}

pub trait StatusObserver {
    fn status_changed(&mut self, status: &StatusLine);
}

pub struct NoopObserver;

impl StatusObserver for NoopObserver {
    fn status_changed(&mut self, _status: &StatusLine) {}
}

/// Everything the controller may touch on screen.
pub struct ViewHandle {
    reconciler: Reconciler,
    observer: Box<dyn StatusObserver>,
}

impl ViewHandle {
    pub fn new(observer: Box<dyn StatusObserver>) -> Self {
        Self {
            reconciler: Reconciler::new(),
            observer,
        }
    }

    pub fn state(&self) -> &UiState {
        self.reconciler.state()
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn reconciler_mut(&mut self) -> &mut Reconciler {
        &mut self.reconciler
    }

    fn status(&mut self, text: impl Into<String>, class: StatusClass) {
        let status = StatusLine::new(text, class);
        self.observer.status_changed(&status);
        self.reconciler.set_status(status);
    }
}

pub struct Controller<T> {
    transport: T,
    endpoint: Endpoint,
    mode: SubmitMode,
    state: RequestState,
}

impl<T: Transport> Controller<T> {
    pub fn new(transport: T, endpoint: Endpoint, mode: SubmitMode) -> Self {
        Self {
            transport,
            endpoint,
            mode,
            state: RequestState::Idle,
        }
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    fn transition(&mut self, next: RequestState) {
        debug_assert!(
            self.state.allows(&next),
            "illegal transition {} -> {}",
            self.state.name(),
            next.name()
        );
        debug!(from = self.state.name(), to = next.name(), "request state");
        self.state = next;
    }

    /// Enter `Failed`; banner-class failures replace the result view.
    fn fail(&mut self, category: ErrorCategory, view: &mut ViewHandle) {
        let descriptor = ErrorDescriptor::from(category);
        info!(error = %descriptor.message, "analysis failed");
        if descriptor.is_banner() {
            view.reconciler.show_error(&descriptor.message);
        }
        self.transition(RequestState::Failed(descriptor));
    }

    /// Run one analysis attempt to completion and leave the outcome on `view`.
    pub fn analyze(&mut self, tab: &dyn ActiveTab, view: &mut ViewHandle) -> &RequestState {
        self.transition(RequestState::Preparing);
        // Old results go before anything is sent.
        view.reconciler.clear();
        view.status("Preparing…", StatusClass::Muted);

        let Some(target) = tab.active_url() else {
            self.fail(ErrorCategory::NoUrl, view);
            view.status("No URL", StatusClass::Err);
            return &self.state;
        };

        let request = AnalyzeRequest {
            endpoint: self.endpoint.clone(),
            target,
            mode: self.mode,
        };
        self.transition(RequestState::Sending);
        view.status("Sending…", StatusClass::Muted);
        info!(
            target = %request.target,
            endpoint = %request.endpoint.url(),
            mode = ?request.mode,
            "sending analysis request"
        );

        let reply = match self.transport.send(&request) {
            Ok(reply) => reply,
            Err(err) => {
                view.status("Network error", StatusClass::Err);
                self.fail(ErrorCategory::NetworkFailure(err.to_string()), view);
                return &self.state;
            }
        };

        let success = reply.is_success();
        let status = reply.status;
        let class = if success {
            StatusClass::Ok
        } else {
            StatusClass::Err
        };
        view.status(reply.status_text(), class);
        view.reconciler.set_headers(&reply.headers);

        let text = match reply.body {
            Ok(text) => text,
            Err(err) => {
                view.status("Error", StatusClass::Err);
                self.fail(ErrorCategory::NetworkFailure(err.to_string()), view);
                return &self.state;
            }
        };

        if !success {
            let message = server_error_message(&text);
            self.fail(ErrorCategory::ServerError { status, message }, view);
            return &self.state;
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(json) => {
                view.reconciler.reconcile_view(&AnalysisView::from_value(&json));
                self.transition(RequestState::Succeeded(json));
            }
            Err(err) => {
                debug!(%err, "response body is not JSON");
                view.reconciler.show_degraded(status, &text);
                self.fail(ErrorCategory::MalformedResponse { status }, view);
            }
        }
        &self.state
    }
}

/// Pick the most useful message out of an error response body.
///
/// Tried in order: `detail`, then `message` or `error`, then the whole JSON
/// body, then the raw text. An empty body reads as `{}`.
pub fn server_error_message(text: &str) -> String {
    let source = if text.is_empty() { "{}" } else { text };
    let Ok(json) = serde_json::from_str::<Value>(source) else {
        return text.to_string();
    };

    let pick = |key: &str| json.get(key).filter(|v| truthy(v));
    match pick("detail").or_else(|| pick("message")).or_else(|| pick("error")) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => json.to_string(),
    }
}
