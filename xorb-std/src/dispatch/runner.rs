//! Sequential continuation-chain runner.
//!
//! A run walks the resolved handler sequence one handler at a time. A
//! handler advances the run by calling its [`Next`]; the runner never
//! advances on its own.
//!
//! # State machine
//!
//! ```text
//! Idle --start--> Running { index } --end of sequence--> Completed
//! ```
//!
//! Continuation calls are queued and drained by a single driver loop, so a
//! long chain of handlers that continue synchronously runs iteratively
//! instead of nesting one stack frame per handler. A continuation called
//! later (after a timer, from another task) picks up the loop where the run
//! was suspended.
//!
//! The step after the last handler is the terminal step. Only the runner
//! takes it: handlers cannot end a run early.
//!
//! # Errors
//!
//! Errors passed to a continuation are collected and never stop the run.
//! At the terminal step the first collected error becomes the outcome of
//! the run; later errors stay in the accumulator ([`DispatchHandle::errors`])
//! but are never raised.

use futures::channel::oneshot;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use xorb_core::{Advance, Data, DispatchContext, DispatchError, HandlerError, Next, SharedHandler};

/// Where a run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Not started.
    Idle,
    /// Waiting on, or executing, the handler at `index`.
    Running {
        /// Position in the handler sequence.
        index: usize,
    },
    /// The terminal step was reached.
    Completed,
}

type Outcome = Result<Data, HandlerError>;
type CompletionHook = Box<dyn FnOnce(&Result<Data, DispatchError>) + Send>;

struct Step {
    error: Option<HandlerError>,
    data: Data,
}

struct RunState {
    phase: RunPhase,
    errors: Vec<HandlerError>,
    pending: VecDeque<Step>,
    driving: bool,
    outcome: Option<Outcome>,
    completion: Option<oneshot::Sender<Outcome>>,
    hooks: Vec<CompletionHook>,
}

impl RunState {
    /// Close the run. Returns the hooks to call once the lock is released.
    fn complete(&mut self, ctx: &DispatchContext, data: Data) -> Vec<CompletionHook> {
        self.phase = RunPhase::Completed;
        self.pending.clear();
        self.driving = false;
        let outcome = match self.errors.first() {
            Some(first) => Err(first.clone()),
            None => Ok(data),
        };
        if self.errors.len() > 1 {
            tracing::debug!(
                target: "xorb::dispatch",
                errors = self.errors.len(),
                "raising the first of several handler errors"
            );
        }
        tracing::debug!(
            target: "xorb::dispatch",
            path = %ctx.current_path(),
            failed = outcome.is_err(),
            "dispatch run completed"
        );
        self.outcome = Some(outcome.clone());
        if let Some(completion) = self.completion.take() {
            let _ = completion.send(outcome);
        }
        std::mem::take(&mut self.hooks)
    }
}

struct RunShared {
    this: Weak<RunShared>,
    ctx: DispatchContext,
    chain: Vec<SharedHandler>,
    state: Mutex<RunState>,
}

impl RunShared {
    fn state(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next(&self) -> Option<Next> {
        self.this
            .upgrade()
            .map(|shared| Next::new(shared as Arc<dyn Advance>))
    }

    /// Drain queued continuation calls, one handler per call.
    fn drive(&self) {
        loop {
            let (handler, step, index) = {
                let mut state = self.state();
                let index = match state.phase {
                    RunPhase::Completed => {
                        state.pending.clear();
                        state.driving = false;
                        return;
                    }
                    RunPhase::Idle => 0,
                    RunPhase::Running { index } => index + 1,
                };
                let Some(step) = state.pending.pop_front() else {
                    state.driving = false;
                    return;
                };
                match self.chain.get(index).cloned() {
                    Some(handler) => {
                        state.phase = RunPhase::Running { index };
                        (handler, step, index)
                    }
                    None => {
                        let hooks = state.complete(&self.ctx, step.data);
                        let outcome = state.outcome.clone();
                        drop(state);
                        notify(hooks, outcome);
                        return;
                    }
                }
            };

            let Some(next) = self.next() else {
                return;
            };
            tracing::trace!(target: "xorb::dispatch", index, failed = step.error.is_some(), "running handler");
            handler.handle(&self.ctx, step.error, next, step.data);
        }
    }
}

fn notify(hooks: Vec<CompletionHook>, outcome: Option<Outcome>) {
    let Some(outcome) = outcome else {
        return;
    };
    let outcome = outcome.map_err(DispatchError::Handler);
    for hook in hooks {
        hook(&outcome);
    }
}

impl Advance for RunShared {
    fn advance(&self, error: Option<HandlerError>, data: Option<Data>) {
        {
            let mut state = self.state();
            if state.phase == RunPhase::Completed {
                tracing::warn!(
                    target: "xorb::dispatch",
                    path = %self.ctx.current_path(),
                    "continuation called after the run completed"
                );
                return;
            }
            if let Some(error) = &error {
                tracing::debug!(target: "xorb::dispatch", %error, "handler reported an error");
                state.errors.push(error.clone());
            }
            state.pending.push_back(Step {
                error,
                data: data.unwrap_or(Data::Null),
            });
            if state.driving {
                return;
            }
            state.driving = true;
        }
        self.drive();
    }
}

/// A dispatch run over a resolved handler sequence.
///
/// Created [`Idle`](RunPhase::Idle); [`start`](DispatchHandle::start)
/// primes the first continuation call. Use [`run`] to do both at once.
pub struct DispatchHandle {
    shared: Arc<RunShared>,
    completion: Option<oneshot::Receiver<Outcome>>,
}

impl DispatchHandle {
    /// Prepare a run of `handlers`.
    pub fn new(ctx: DispatchContext, handlers: Vec<SharedHandler>) -> Self {
        let (sender, receiver) = oneshot::channel();
        let shared = Arc::new_cyclic(|this| RunShared {
            this: this.clone(),
            ctx,
            chain: handlers,
            state: Mutex::new(RunState {
                phase: RunPhase::Idle,
                errors: Vec::new(),
                pending: VecDeque::new(),
                driving: false,
                outcome: None,
                completion: Some(sender),
                hooks: Vec::new(),
            }),
        });
        Self {
            shared,
            completion: Some(receiver),
        }
    }

    /// Call `hook` with the outcome once the run completes.
    ///
    /// Runs `hook` right away if the run already completed.
    pub fn on_complete<F>(&self, hook: F)
    where
        F: FnOnce(&Result<Data, DispatchError>) + Send + 'static,
    {
        let outcome = {
            let mut state = self.shared.state();
            if state.phase != RunPhase::Completed {
                state.hooks.push(Box::new(hook));
                return;
            }
            state.outcome.clone()
        };
        notify(vec![Box::new(hook)], outcome);
    }

    /// Start the run. Returns `false` if it was already started.
    ///
    /// Handlers that continue synchronously have all run when this returns.
    pub fn start(&self) -> bool {
        {
            let state = self.shared.state();
            if state.phase != RunPhase::Idle || state.driving || !state.pending.is_empty() {
                tracing::warn!(target: "xorb::dispatch", "dispatch run already started");
                return false;
            }
        }
        tracing::debug!(
            target: "xorb::dispatch",
            path = %self.shared.ctx.current_path(),
            handlers = self.shared.chain.len(),
            "dispatch run started"
        );
        self.shared.advance(None, None);
        true
    }

    /// The current phase.
    pub fn phase(&self) -> RunPhase {
        self.shared.state().phase
    }

    /// Whether the terminal step was reached.
    pub fn is_completed(&self) -> bool {
        self.phase() == RunPhase::Completed
    }

    /// The outcome, once the run completed.
    pub fn outcome(&self) -> Option<Result<Data, DispatchError>> {
        self.shared
            .state()
            .outcome
            .clone()
            .map(|outcome| outcome.map_err(DispatchError::Handler))
    }

    /// Every error collected so far, in the order they were reported.
    pub fn errors(&self) -> Vec<HandlerError> {
        self.shared.state().errors.clone()
    }

    /// Number of handlers in the sequence.
    pub fn handler_count(&self) -> usize {
        self.shared.chain.len()
    }

    /// The context handed to every handler.
    pub fn context(&self) -> &DispatchContext {
        &self.shared.ctx
    }

    /// Wait for the run to complete.
    ///
    /// Resolves to the payload carried into the terminal step, or the first
    /// collected error. Resolves to [`DispatchError::Stalled`] when no
    /// continuation of the unfinished run is left to call.
    pub async fn wait(self) -> Result<Data, DispatchError> {
        let DispatchHandle { shared, completion } = self;
        drop(shared);
        let Some(completion) = completion else {
            return Err(DispatchError::Stalled);
        };
        match completion.await {
            Ok(Ok(data)) => Ok(data),
            Ok(Err(error)) => Err(DispatchError::Handler(error)),
            Err(oneshot::Canceled) => Err(DispatchError::Stalled),
        }
    }
}

impl std::fmt::Debug for DispatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchHandle")
            .field("phase", &self.phase())
            .field("handlers", &self.handler_count())
            .finish()
    }
}

/// Run `handlers` against `ctx`, starting immediately.
pub fn run(ctx: DispatchContext, handlers: Vec<SharedHandler>) -> DispatchHandle {
    let handle = DispatchHandle::new(ctx, handlers);
    handle.start();
    handle
}
