//! # Step Tracker Module / 步骤跟踪器模块
//!
//! This module maintains, for one unit of work, the stack of currently open steps.
//! Steps are opened through a guard, a closure, or a future; every exit path
//! (normal return, error, panic, skip, cancellation) closes the step with a terminal status.
//!
//! The tracker is an explicit context handle owned by the report assembler and passed
//! down the call chain. It is `!Send`, so one context never leaks into another thread.
//!
//! 此模块为一个工作单元维护当前打开步骤的栈。
//! 步骤可以通过守卫、闭包或 future 打开；每条退出路径
//! （正常返回、错误、panic、跳过、取消）都会以最终状态关闭步骤。
//!
//! 跟踪器是由报告组装器拥有的显式上下文句柄，沿调用链传递。
//! 它不是 `Send`，因此一个上下文永远不会泄漏到另一个线程。

use futures::FutureExt;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::thread;
use thiserror::Error;

use crate::core::models::{Attachment, Status, Step, now_millis};

/// Usage errors: calling the tracker in a way its contract forbids.
/// 使用错误：以契约禁止的方式调用跟踪器。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// The report was sealed; no more steps or attachments can be recorded.
    /// 报告已封存；不能再记录步骤或附件。
    #[error("report `{0}` is sealed; steps and attachments can no longer be recorded")]
    Sealed(String),
}

/// The skip signal. Return it as an error or raise it with [`skip`].
/// 跳过信号。可以作为错误返回，或通过 [`skip`] 抛出。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("skipped: {reason}")]
pub struct Skip {
    reason: String,
}

impl Skip {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

thread_local! {
    /// Set while the current thread unwinds from [`skip`], so guards dropped on the way
    /// out record `Skipped` instead of `Failed`. Cleared where the unwind is caught.
    static SKIP_UNWINDING: Cell<bool> = const { Cell::new(false) };
}

/// Aborts the current step (and the unit of work) with a skip signal.
///
/// Unwinds with a [`Skip`] payload; every enclosing step, guards included, records `Skipped`.
pub fn skip(reason: impl Into<String>) -> ! {
    SKIP_UNWINDING.with(|flag| flag.set(true));
    panic::panic_any(Skip::new(reason))
}

/// Forgets a skip signal once its unwind has been caught.
pub(crate) fn clear_skip_signal() {
    SKIP_UNWINDING.with(|flag| flag.set(false));
}

/// Re-arms the skip flag from a caught payload that is about to be resumed,
/// so guards further out still see the cause.
fn resume_signal(payload: &(dyn Any + Send)) {
    SKIP_UNWINDING.with(|flag| flag.set(payload.is::<Skip>()));
}

/// Status of a guard released while the thread is panicking.
fn unwinding_status() -> Status {
    if SKIP_UNWINDING.with(Cell::get) {
        Status::Skipped
    } else {
        Status::Failed
    }
}

/// Classifies a caught panic payload: a [`Skip`] payload is a skip, anything else a failure.
pub fn panic_status(payload: &(dyn Any + Send)) -> Status {
    if payload.is::<Skip>() {
        Status::Skipped
    } else {
        Status::Failed
    }
}

/// Extracts a human readable message from a caught panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(skip) = payload.downcast_ref::<Skip>() {
        skip.reason().to_string()
    } else if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unit of work panicked with a non-string payload".to_string()
    }
}

/// Classifies a step result: `Ok` passes, an error wrapping [`Skip`] skips, any other error fails.
///
/// `Skip` is recognised both as the error type itself and inside an `anyhow::Error`.
pub fn outcome_of<T, E: 'static>(result: &Result<T, E>) -> Status {
    match result {
        Ok(_) => Status::Passed,
        Err(err) => error_status(err),
    }
}

fn error_status<E: 'static>(err: &E) -> Status {
    let any: &dyn Any = err;
    if any.is::<Skip>() {
        return Status::Skipped;
    }
    if let Some(err) = any.downcast_ref::<anyhow::Error>() {
        if err.is::<Skip>() {
            return Status::Skipped;
        }
    }
    Status::Failed
}

/// Wall-clock source that never goes backwards within one tracker.
#[derive(Debug, Default)]
struct Clock {
    last: f64,
}

impl Clock {
    fn now(&mut self) -> f64 {
        let now = now_millis().max(self.last);
        self.last = now;
        now
    }
}

#[derive(Debug)]
struct OpenStep {
    id: u64,
    step: Step,
}

#[derive(Debug)]
struct TrackerState {
    report: String,
    sealed: bool,
    interrupted: bool,
    clock: Clock,
    next_id: u64,
    open: Vec<OpenStep>,
    steps: Vec<Step>,
    attachments: Vec<Attachment>,
}

impl TrackerState {
    /// Pops the top open step, closes it and links it into its parent (or the root).
    fn close_top(&mut self, stop: f64, status: Status) {
        let Some(OpenStep { mut step, .. }) = self.open.pop() else {
            return;
        };
        step.close(stop, status);
        match self.open.last_mut() {
            Some(parent) => parent.step.push_child(step),
            None => self.steps.push(step),
        }
    }
}

/// Everything the tracker recorded, returned once when the report is sealed.
#[derive(Debug)]
pub(crate) struct SealedTrace {
    pub(crate) steps: Vec<Step>,
    pub(crate) attachments: Vec<Attachment>,
    pub(crate) stop: f64,
}

/// The per-unit step tracking context.
///
/// Cloning a `Tracker` yields another handle to the same context.
///
/// 每个工作单元的步骤跟踪上下文。克隆 `Tracker` 会得到指向同一上下文的另一个句柄。
#[derive(Clone)]
pub struct Tracker {
    state: Rc<RefCell<TrackerState>>,
}

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Tracker")
            .field("report", &state.report)
            .field("sealed", &state.sealed)
            .field("depth", &state.open.len())
            .finish_non_exhaustive()
    }
}

impl Tracker {
    pub(crate) fn new(report: impl Into<String>) -> Self {
        Self {
            state: Rc::new(RefCell::new(TrackerState {
                report: report.into(),
                sealed: false,
                interrupted: false,
                clock: Clock::default(),
                next_id: 0,
                open: Vec::new(),
                steps: Vec::new(),
                attachments: Vec::new(),
            })),
        }
    }

    /// The name of the report this tracker records into.
    pub fn report_name(&self) -> String {
        self.state.borrow().report.clone()
    }

    /// Number of currently open steps.
    pub fn depth(&self) -> usize {
        self.state.borrow().open.len()
    }

    pub fn is_sealed(&self) -> bool {
        self.state.borrow().sealed
    }

    /// Marks the unit as cut short (timeout, cancellation). Guards released from then on
    /// record `Failed`, whatever their own outcome.
    pub(crate) fn interrupt(&self) {
        self.state.borrow_mut().interrupted = true;
    }

    fn is_interrupted(&self) -> bool {
        self.state
            .try_borrow()
            .map_or(false, |state| state.interrupted)
    }

    pub(crate) fn now(&self) -> f64 {
        self.state.borrow_mut().clock.now()
    }

    /// Opens a step as a child of the current top step (or of the report root).
    ///
    /// The returned guard closes the step when it is finished or dropped.
    /// A guard dropped while unwinding records `Failed` (`Skipped` when the unwind is the
    /// [`skip`] signal), and one dropped after the unit timed out or was cancelled records
    /// `Failed`; otherwise `Passed` unless [`StepGuard::fail`] or [`StepGuard::skip`] was called.
    pub fn try_open(&self, name: impl Into<String>) -> Result<StepGuard, TrackerError> {
        self.open_with_default(name.into(), Status::Passed)
    }

    /// Like [`Tracker::try_open`].
    ///
    /// # Panics
    ///
    /// Panics if the report is already sealed.
    pub fn open(&self, name: impl Into<String>) -> StepGuard {
        self.try_open(name).unwrap_or_else(|err| panic!("{err}"))
    }

    fn open_with_default(
        &self,
        name: String,
        default_status: Status,
    ) -> Result<StepGuard, TrackerError> {
        let mut state = self.state.borrow_mut();
        if state.sealed {
            return Err(TrackerError::Sealed(state.report.clone()));
        }
        if !thread::panicking() {
            // A skip caught outside the tracker leaves the flag set.
            clear_skip_signal();
        }
        let start = state.clock.now();
        let id = state.next_id;
        state.next_id += 1;
        state.open.push(OpenStep {
            id,
            step: Step::open(name, start),
        });
        Ok(StepGuard {
            tracker: self.clone(),
            id,
            outcome: None,
            default_status,
            released: false,
        })
    }

    /// Closes the step `id`. Steps opened after it and still open are abandoned and fail.
    /// Does nothing if the step is no longer open.
    fn release(&self, id: u64, status: Status) {
        let Ok(mut state) = self.state.try_borrow_mut() else {
            return;
        };
        let Some(position) = state.open.iter().position(|open| open.id == id) else {
            return;
        };
        let stop = state.clock.now();
        while state.open.len() > position + 1 {
            state.close_top(stop, Status::Failed);
        }
        state.close_top(stop, status);
    }

    /// Appends an attachment to the top open step, or to the report root when no step is open.
    pub fn try_attach(
        &self,
        title: impl Into<String>,
        content: impl Into<Vec<u8>>,
        mime_type: Option<&str>,
    ) -> Result<(), TrackerError> {
        let mut attachment = Attachment::new(title, content);
        if let Some(mime_type) = mime_type {
            attachment = attachment.with_mime_type(mime_type);
        }
        let mut state = self.state.borrow_mut();
        if state.sealed {
            return Err(TrackerError::Sealed(state.report.clone()));
        }
        match state.open.last_mut() {
            Some(top) => top.step.push_attachment(attachment),
            None => state.attachments.push(attachment),
        }
        Ok(())
    }

    /// Like [`Tracker::try_attach`].
    ///
    /// # Panics
    ///
    /// Panics if the report is already sealed.
    pub fn attach(
        &self,
        title: impl Into<String>,
        content: impl Into<Vec<u8>>,
        mime_type: Option<&str>,
    ) {
        if let Err(err) = self.try_attach(title, content, mime_type) {
            panic!("{err}");
        }
    }

    /// Attaches UTF-8 text as `text/plain`.
    pub fn attach_text(&self, title: impl Into<String>, text: impl Into<String>) {
        self.attach(title, text.into().into_bytes(), Some("text/plain"));
    }

    /// Runs `body` inside a step. The step passes unless `body` panics.
    ///
    /// Panics are recorded (a [`Skip`] payload as `Skipped`, anything else as `Failed`)
    /// and then resumed unchanged.
    pub fn step<R>(&self, name: impl Into<String>, body: impl FnOnce() -> R) -> R {
        self.scoped(name, body, |_| Status::Passed)
    }

    /// Runs a fallible `body` inside a step; `Err` fails (or skips, for [`Skip`]) the step.
    ///
    /// The result is returned unchanged.
    pub fn try_step<T, E: 'static>(
        &self,
        name: impl Into<String>,
        body: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        self.scoped(name, body, outcome_of)
    }

    fn scoped<R>(
        &self,
        name: impl Into<String>,
        body: impl FnOnce() -> R,
        classify: impl FnOnce(&R) -> Status,
    ) -> R {
        let (output, guard) = self.enter(name, body);
        guard.finish(classify(&output));
        output
    }

    /// Runs `body` inside a freshly opened step and hands back the still-open guard.
    ///
    /// If `body` panics the step is closed from the payload and the panic resumes.
    /// Used by `step_fn!`, which classifies the output itself.
    #[doc(hidden)]
    pub fn enter<R>(&self, name: impl Into<String>, body: impl FnOnce() -> R) -> (R, StepGuard) {
        let guard = self
            .open_with_default(name.into(), Status::Failed)
            .unwrap_or_else(|err| panic!("{err}"));
        match panic::catch_unwind(AssertUnwindSafe(body)) {
            Ok(output) => (output, guard),
            Err(payload) => {
                resume_signal(&*payload);
                guard.finish(panic_status(&*payload));
                panic::resume_unwind(payload)
            }
        }
    }

    /// Awaits `future` inside a step. The step passes unless the future panics.
    ///
    /// Dropping the returned future before completion (timeout, cancellation)
    /// closes the step as `Failed`.
    pub async fn step_async<F: Future>(&self, name: impl Into<String>, future: F) -> F::Output {
        self.scoped_async(name.into(), future, |_| Status::Passed)
            .await
    }

    /// Awaits a fallible `future` inside a step, classified like [`Tracker::try_step`].
    pub async fn try_step_async<T, E, F>(&self, name: impl Into<String>, future: F) -> Result<T, E>
    where
        E: 'static,
        F: Future<Output = Result<T, E>>,
    {
        self.scoped_async(name.into(), future, outcome_of).await
    }

    async fn scoped_async<F: Future>(
        &self,
        name: String,
        future: F,
        classify: impl FnOnce(&F::Output) -> Status,
    ) -> F::Output {
        let guard = self
            .open_with_default(name, Status::Failed)
            .unwrap_or_else(|err| panic!("{err}"));
        match AssertUnwindSafe(future).catch_unwind().await {
            Ok(output) => {
                guard.finish(classify(&output));
                output
            }
            Err(payload) => {
                resume_signal(&*payload);
                guard.finish(panic_status(&*payload));
                panic::resume_unwind(payload)
            }
        }
    }

    /// Seals the context: force-closes open steps as `Failed` and hands over the trace.
    pub(crate) fn seal(&self) -> SealedTrace {
        let mut state = self.state.borrow_mut();
        let stop = state.clock.now();
        state.sealed = true;
        while !state.open.is_empty() {
            state.close_top(stop, Status::Failed);
        }
        SealedTrace {
            steps: std::mem::take(&mut state.steps),
            attachments: std::mem::take(&mut state.attachments),
            stop,
        }
    }
}

/// Scoped acquisition of an open step. Releasing it (explicitly or by drop) closes the step.
/// 打开步骤的作用域守卫。释放它（显式或通过 drop）会关闭该步骤。
#[must_use = "dropping the guard immediately closes the step"]
pub struct StepGuard {
    tracker: Tracker,
    id: u64,
    outcome: Option<Status>,
    default_status: Status,
    released: bool,
}

impl fmt::Debug for StepGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepGuard")
            .field("id", &self.id)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

impl StepGuard {
    /// Marks the step as failed; recorded when the guard is released.
    pub fn fail(&mut self) {
        self.outcome = Some(Status::Failed);
    }

    /// Marks the step as skipped; recorded when the guard is released.
    pub fn skip(&mut self) {
        self.outcome = Some(Status::Skipped);
    }

    /// Closes the step now with the given status (a failed child still overrides it).
    pub fn finish(mut self, status: Status) {
        self.released = true;
        self.tracker.release(self.id, status);
    }
}

impl Drop for StepGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let status = if self.tracker.is_interrupted() {
            Status::Failed
        } else if thread::panicking() {
            unwinding_status()
        } else {
            self.outcome.unwrap_or(self.default_status)
        };
        self.tracker.release(self.id, status);
    }
}
