//! Testing utilities for Xorb.
//!
//! # Features
//!
//! - [`RecordingHandler`]: records every visit and continues the run
//! - [`FailingHandler`]: reports an error and continues the run
//! - [`MockTransport`]: an in-memory [`Transport`] with scripted responses

use crate::http::{PreparedRequest, Response, Transport, TransportError};
use futures::future::{self, BoxFuture};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use xorb_core::{Data, DispatchContext, Failure, Handler, HandlerError, Next};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Recording Handler
// ============================================================================

/// One visit of a [`RecordingHandler`].
#[derive(Debug, Clone)]
pub struct Visit {
    /// Label of the handler that was visited.
    pub label: String,
    /// Current path seen in the context.
    pub path: String,
    /// Message of the error passed in, if any.
    pub error: Option<String>,
    /// Payload passed in.
    pub data: Data,
}

/// A handler that records every visit and continues with the same payload.
///
/// Clones share their log, so several labelled recorders can write to one
/// ordered log.
///
/// ```rust,ignore
/// let log = RecordingHandler::new("a");
/// table.register("/", Callbacks::one(log.clone()))?;
/// run(ctx, resolve(&table, "/")).wait().await?;
/// assert_eq!(log.labels(), vec!["a"]);
/// ```
#[derive(Clone)]
pub struct RecordingHandler {
    label: String,
    visits: Arc<Mutex<Vec<Visit>>>,
}

impl RecordingHandler {
    /// Create a recorder with its own log.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            visits: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A recorder with another label writing to the same log.
    pub fn labelled(&self, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            visits: self.visits.clone(),
        }
    }

    /// Every recorded visit, in order.
    pub fn visits(&self) -> Vec<Visit> {
        lock(&self.visits).clone()
    }

    /// Labels of every recorded visit, in order.
    pub fn labels(&self) -> Vec<String> {
        lock(&self.visits).iter().map(|visit| visit.label.clone()).collect()
    }

    /// Number of recorded visits.
    pub fn count(&self) -> usize {
        lock(&self.visits).len()
    }

    /// Clear the log.
    pub fn clear(&self) {
        lock(&self.visits).clear();
    }
}

impl Handler for RecordingHandler {
    fn handle(&self, ctx: &DispatchContext, error: Option<HandlerError>, next: Next, data: Data) {
        lock(&self.visits).push(Visit {
            label: self.label.clone(),
            path: ctx.current_path().to_string(),
            error: error.map(|error| error.to_string()),
            data: data.clone(),
        });
        next.send(data);
    }
}

// ============================================================================
// Failing Handler
// ============================================================================

/// A handler that reports an error and lets the run continue.
#[derive(Debug, Clone)]
pub struct FailingHandler {
    message: String,
}

impl FailingHandler {
    /// Report [`Failure`] with `message` on every visit.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Handler for FailingHandler {
    fn handle(&self, _ctx: &DispatchContext, _error: Option<HandlerError>, next: Next, _data: Data) {
        next.fail(Failure::handler(self.message.clone()));
    }
}

// ============================================================================
// Mock Transport
// ============================================================================

#[derive(Default)]
struct MockState {
    response: Option<Response>,
    request_failure: Option<String>,
    requests: Vec<PreparedRequest>,
    scripts: Vec<String>,
    script_failures: HashMap<String, String>,
}

/// An in-memory [`Transport`].
///
/// Answers every request with the scripted response (`200 OK` with an empty
/// body unless told otherwise) and records what was sent. Clones share
/// their state.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a transport answering `200 OK`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every following request with `response`.
    pub fn respond_with(&self, response: Response) {
        let mut state = lock(&self.state);
        state.response = Some(response);
        state.request_failure = None;
    }

    /// Fail every following request with a transport error.
    pub fn fail_requests(&self, message: impl Into<String>) {
        lock(&self.state).request_failure = Some(message.into());
    }

    /// Fail script loads of exactly `url`.
    pub fn fail_script(&self, url: impl Into<String>, message: impl Into<String>) {
        lock(&self.state)
            .script_failures
            .insert(url.into(), message.into());
    }

    /// Every request sent so far.
    pub fn requests(&self) -> Vec<PreparedRequest> {
        lock(&self.state).requests.clone()
    }

    /// Every script URL a load was attempted for, failed loads included.
    pub fn scripts(&self) -> Vec<String> {
        lock(&self.state).scripts.clone()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: PreparedRequest) -> BoxFuture<'static, Result<Response, TransportError>> {
        let mut state = lock(&self.state);
        state.requests.push(request);
        let result = match &state.request_failure {
            Some(message) => Err(TransportError::new(message.clone())),
            None => Ok(state
                .response
                .clone()
                .unwrap_or_else(|| Response::ok_with(Vec::new()))),
        };
        Box::pin(future::ready(result))
    }

    fn load_script(&self, url: &str) -> BoxFuture<'static, Result<(), TransportError>> {
        let mut state = lock(&self.state);
        state.scripts.push(url.to_string());
        let result = match state.script_failures.get(url) {
            Some(message) => Err(TransportError::new(message.clone())),
            None => Ok(()),
        };
        Box::pin(future::ready(result))
    }
}
