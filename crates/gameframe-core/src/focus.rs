#![forbid(unsafe_code)]

//! Re-focusing the embedded surface after fullscreen transitions.
//!
//! Focus is applied after a short delay so the browser can finish its
//! fullscreen/layout transition first. If the surface hosts a nested document
//! (an iframe), its window is focused too; that can fail cross-origin, in which
//! case the outer element keeps focus and the failure is only logged.

use std::cell::RefCell;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::HarnessError;

/// Element that can receive input focus.
pub trait FocusTarget {
    /// Focus the element itself. Never fails.
    fn focus_outer(&self);

    /// Focus the nested document's window.
    ///
    /// Returns `None` when the element hosts no nested document.
    fn focus_nested(&self) -> Option<Result<(), HarnessError>>;
}

/// Deferred execution on the host event loop.
pub trait Timer {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>);
}

/// Anything that can schedule a refocus of the embedded surface.
pub trait Refocus {
    fn refocus(&self);
}

/// Result of one focus attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusOutcome {
    /// Outer element focused; there was no nested document.
    Outer,
    /// Outer element and nested window focused.
    OuterAndNested,
    /// Outer element focused; the nested window refused.
    NestedDenied,
}

/// Focus `target` now.
pub fn apply_focus<T: FocusTarget + ?Sized>(target: &T) -> FocusOutcome {
    target.focus_outer();
    match target.focus_nested() {
        None => {
            debug!("surface focused");
            FocusOutcome::Outer
        }
        Some(Ok(())) => {
            debug!("surface and nested document focused");
            FocusOutcome::OuterAndNested
        }
        Some(Err(err)) => {
            warn!(error = %err, "failed to focus nested document");
            FocusOutcome::NestedDenied
        }
    }
}

/// Schedules delayed focus attempts on one target.
///
/// Every [`Refocus::refocus`] call schedules its own attempt; overlapping
/// calls are harmless since focusing an already-focused element is a no-op.
#[derive(Debug, Clone)]
pub struct FocusCoordinator<T, S> {
    target: T,
    timer: S,
    delay: Duration,
}

impl<T, S> FocusCoordinator<T, S>
where
    T: FocusTarget + Clone + 'static,
    S: Timer,
{
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(100);

    #[must_use]
    pub fn new(target: T, timer: S, delay: Duration) -> Self {
        Self {
            target,
            timer,
            delay,
        }
    }

    #[must_use]
    pub fn target(&self) -> &T {
        &self.target
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

impl<T, S> Refocus for FocusCoordinator<T, S>
where
    T: FocusTarget + Clone + 'static,
    S: Timer,
{
    fn refocus(&self) {
        let target = self.target.clone();
        self.timer.schedule(
            self.delay,
            Box::new(move || {
                apply_focus(&target);
            }),
        );
    }
}

impl<R: Refocus + ?Sized> Refocus for std::rc::Rc<R> {
    fn refocus(&self) {
        (**self).refocus();
    }
}

/// Host-driven [`Timer`]: tasks run only when the host advances time.
///
/// Useful for deterministic hosts and tests. Clones share the same queue.
#[derive(Clone, Default)]
pub struct ManualTimer {
    inner: std::rc::Rc<RefCell<ManualTimerState>>,
}

#[derive(Default)]
struct ManualTimerState {
    now: Duration,
    tasks: Vec<(Duration, Box<dyn FnOnce()>)>,
}

impl ManualTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks not yet run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    /// Advance time by `dt` and run every task that became due, in deadline
    /// order. Returns how many ran.
    pub fn advance(&self, dt: Duration) -> usize {
        let due = {
            let mut state = self.inner.borrow_mut();
            state.now = state.now.saturating_add(dt);
            let now = state.now;
            let (mut due, rest): (Vec<_>, Vec<_>) =
                state.tasks.drain(..).partition(|(at, _)| *at <= now);
            state.tasks = rest;
            due.sort_by_key(|(at, _)| *at);
            due
        };
        let ran = due.len();
        for (_, task) in due {
            task();
        }
        ran
    }
}

impl core::fmt::Debug for ManualTimer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("ManualTimer")
            .field("now", &state.now)
            .field("pending", &state.tasks.len())
            .finish()
    }
}

impl Timer for ManualTimer {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let mut state = self.inner.borrow_mut();
        let at = state.now.saturating_add(delay);
        state.tasks.push((at, task));
    }
}
