#![forbid(unsafe_code)]

//! Fullscreen request/change lifecycle.
//!
//! ```text
//!            request                 change(target)
//!   Normal ───────────▶ TransitioningToFullscreen ───────────▶ Fullscreen
//!     ▲                        │ rejected                        │ exit key
//!     │                        ▼                                 ▼
//!     └───────── change(other/none) ◀──────────── TransitioningToNormal
//! ```
//!
//! The phase is never cached. It is derived on demand from the adapter's
//! current fullscreen element plus whether a transition is in flight, so a
//! change event always settles the machine to what the browser reports, and
//! spurious or out-of-order events cannot desynchronize it.
//!
//! There is no exit operation: leaving fullscreen is always external (Escape,
//! browser chrome) and only observed.

use tracing::{debug, error, info};

use super::adapter::{ChangeNormalizer, FullscreenAdapter, RequestFuture};
use crate::error::HarnessError;
use crate::focus::Refocus;

/// Observable lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecyclePhase {
    Normal,
    TransitioningToFullscreen,
    Fullscreen,
    TransitioningToNormal,
}

impl LifecyclePhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::TransitioningToFullscreen => "transitioning_to_fullscreen",
            Self::Fullscreen => "fullscreen",
            Self::TransitioningToNormal => "transitioning_to_normal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InFlight {
    Enter,
    Exit,
}

/// Coordinates fullscreen requests, change events and refocusing for one
/// fixed target element.
pub struct FullscreenLifecycle<A: FullscreenAdapter, R> {
    adapter: A,
    target: A::Element,
    focus: R,
    in_flight: Option<InFlight>,
    normalizer: ChangeNormalizer<A::Element>,
}

impl<A, R> FullscreenLifecycle<A, R>
where
    A: FullscreenAdapter,
    R: Refocus,
{
    #[must_use]
    pub fn new(adapter: A, target: A::Element, focus: R) -> Self {
        Self {
            adapter,
            target,
            focus,
            in_flight: None,
            normalizer: ChangeNormalizer::new(),
        }
    }

    #[must_use]
    pub fn target(&self) -> &A::Element {
        &self.target
    }

    #[must_use]
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Whether the target is the current fullscreen element, queried live.
    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.adapter.current_fullscreen_element().as_ref() == Some(&self.target)
    }

    #[must_use]
    pub fn phase(&self) -> LifecyclePhase {
        match (self.in_flight, self.is_fullscreen()) {
            (Some(InFlight::Enter), false) => LifecyclePhase::TransitioningToFullscreen,
            (Some(InFlight::Exit), true) => LifecyclePhase::TransitioningToNormal,
            (_, true) => LifecyclePhase::Fullscreen,
            (_, false) => LifecyclePhase::Normal,
        }
    }

    /// Issue a user-initiated fullscreen request.
    ///
    /// The returned future owns no borrow of `self`; await it, then pass its
    /// output to [`complete_request`](Self::complete_request). Once issued a
    /// request cannot be aborted.
    pub fn begin_request(&mut self) -> RequestFuture {
        if !self.is_fullscreen() {
            self.in_flight = Some(InFlight::Enter);
        }
        info!(target_element = ?self.target, "fullscreen requested");
        self.adapter.request_fullscreen(&self.target)
    }

    /// Settle a request issued by [`begin_request`](Self::begin_request).
    ///
    /// Success and a missing fullscreen API both schedule a refocus. The
    /// phase is read back from the adapter: a resolution that left the target
    /// windowed reports `Normal` until a change event says otherwise.
    /// Rejection is logged once and never retried.
    pub fn complete_request(&mut self, result: Result<(), HarnessError>) -> LifecyclePhase {
        self.in_flight = None;
        match result {
            Ok(()) => self.focus.refocus(),
            Err(HarnessError::FullscreenUnsupported) => {
                debug!("no fullscreen API available; request ignored");
                self.focus.refocus();
            }
            Err(err) => {
                error!(error = %err, kind = err.kind(), "fullscreen request failed");
            }
        }
        self.phase()
    }

    /// Handle a (normalized) fullscreen change event.
    ///
    /// Every event settles the phase to what the adapter reports. Refocus
    /// happens when the target became fullscreen; duplicate vendor events
    /// for one transition do not refocus again.
    pub fn handle_change(&mut self) -> LifecyclePhase {
        self.in_flight = None;
        let current = self.adapter.current_fullscreen_element();
        if !self.normalizer.observe(current.clone()) {
            return self.phase();
        }

        let is_target = current.as_ref() == Some(&self.target);
        info!(is_target, "fullscreen changed");
        if is_target {
            self.focus.refocus();
        }
        self.phase()
    }

    /// Note that the user pressed a key the browser uses to leave fullscreen.
    ///
    /// Only meaningful while fullscreen; the following change event settles
    /// the phase.
    pub fn observe_exit_key(&mut self) -> LifecyclePhase {
        if self.is_fullscreen() {
            self.in_flight = Some(InFlight::Exit);
        }
        self.phase()
    }
}

impl<A, R> core::fmt::Debug for FullscreenLifecycle<A, R>
where
    A: FullscreenAdapter,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FullscreenLifecycle")
            .field("target", &self.target)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use tracing_test::traced_test;

    const TARGET: u32 = 7;
    const OTHER: u32 = 9;

    #[derive(Clone, Default)]
    struct FakeAdapter {
        current: Rc<Cell<Option<u32>>>,
        next_result: Rc<RefCell<Option<Result<(), HarnessError>>>>,
        requests: Rc<Cell<u32>>,
    }

    impl FakeAdapter {
        fn rejecting(msg: &str) -> Self {
            let adapter = Self::default();
            *adapter.next_result.borrow_mut() =
                Some(Err(HarnessError::FullscreenRequestRejected(msg.into())));
            adapter
        }
    }

    impl FullscreenAdapter for FakeAdapter {
        type Element = u32;

        fn request_fullscreen(&self, _element: &u32) -> RequestFuture {
            self.requests.set(self.requests.get() + 1);
            let result = self.next_result.borrow_mut().take().unwrap_or(Ok(()));
            Box::pin(async move { result })
        }

        fn current_fullscreen_element(&self) -> Option<u32> {
            self.current.get()
        }
    }

    #[derive(Clone, Default)]
    struct CountingFocus(Rc<Cell<u32>>);

    impl Refocus for CountingFocus {
        fn refocus(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn lifecycle(
        adapter: &FakeAdapter,
        focus: &CountingFocus,
    ) -> FullscreenLifecycle<FakeAdapter, CountingFocus> {
        FullscreenLifecycle::new(adapter.clone(), TARGET, focus.clone())
    }

    #[test]
    fn starts_normal() {
        let adapter = FakeAdapter::default();
        let lc = lifecycle(&adapter, &CountingFocus::default());
        assert_eq!(lc.phase(), LifecyclePhase::Normal);
    }

    #[test]
    fn request_then_change_reaches_fullscreen_and_refocuses() {
        let adapter = FakeAdapter::default();
        let focus = CountingFocus::default();
        let mut lc = lifecycle(&adapter, &focus);

        let pending = lc.begin_request();
        assert_eq!(lc.phase(), LifecyclePhase::TransitioningToFullscreen);

        adapter.current.set(Some(TARGET));
        assert_eq!(lc.handle_change(), LifecyclePhase::Fullscreen);
        assert_eq!(focus.0.get(), 1);

        let result = pollster::block_on(pending);
        assert_eq!(lc.complete_request(result), LifecyclePhase::Fullscreen);
        assert_eq!(focus.0.get(), 2);
        assert_eq!(adapter.requests.get(), 1);
    }

    #[test]
    fn resolved_request_without_fullscreen_settles_normal() {
        // Legacy prefixed requests resolve at once and report denial only
        // through an error event.
        let adapter = FakeAdapter::default();
        let focus = CountingFocus::default();
        let mut lc = lifecycle(&adapter, &focus);

        let result = pollster::block_on(lc.begin_request());
        assert_eq!(lc.complete_request(result), LifecyclePhase::Normal);
        assert_eq!(focus.0.get(), 1);

        adapter.current.set(Some(TARGET));
        assert_eq!(lc.handle_change(), LifecyclePhase::Fullscreen);
        assert_eq!(focus.0.get(), 2);
    }

    #[test]
    fn repeated_event_after_exit_key_settles_fullscreen() {
        let adapter = FakeAdapter::default();
        let focus = CountingFocus::default();
        let mut lc = lifecycle(&adapter, &focus);
        adapter.current.set(Some(TARGET));
        lc.handle_change();

        assert_eq!(lc.observe_exit_key(), LifecyclePhase::TransitioningToNormal);
        // The browser stayed fullscreen and re-announced the same element.
        assert_eq!(lc.handle_change(), LifecyclePhase::Fullscreen);
        assert_eq!(focus.0.get(), 1);
    }

    #[test]
    fn repeated_windowed_event_after_request_settles_normal() {
        let adapter = FakeAdapter::default();
        let mut lc = lifecycle(&adapter, &CountingFocus::default());
        lc.handle_change();

        let _pending = lc.begin_request();
        assert_eq!(lc.phase(), LifecyclePhase::TransitioningToFullscreen);
        assert_eq!(lc.handle_change(), LifecyclePhase::Normal);
    }

    #[traced_test]
    #[test]
    fn rejected_request_stays_normal_logs_once_and_never_focuses() {
        let adapter = FakeAdapter::rejecting("not triggered by user gesture");
        let focus = CountingFocus::default();
        let mut lc = lifecycle(&adapter, &focus);

        let result = pollster::block_on(lc.begin_request());
        assert_eq!(lc.complete_request(result), LifecyclePhase::Normal);
        assert_eq!(focus.0.get(), 0);
        assert_eq!(adapter.requests.get(), 1);

        logs_assert(|lines: &[&str]| {
            let errors = lines
                .iter()
                .filter(|line| {
                    line.contains("ERROR") && line.contains("fullscreen request failed")
                })
                .count();
            if errors == 1 {
                Ok(())
            } else {
                Err(format!("expected exactly one error line, saw {errors}"))
            }
        });
    }

    #[traced_test]
    #[test]
    fn unsupported_request_degrades_silently_and_refocuses() {
        let adapter = FakeAdapter::default();
        *adapter.next_result.borrow_mut() = Some(Err(HarnessError::FullscreenUnsupported));
        let focus = CountingFocus::default();
        let mut lc = lifecycle(&adapter, &focus);

        let result = pollster::block_on(lc.begin_request());
        assert_eq!(lc.complete_request(result), LifecyclePhase::Normal);
        assert_eq!(focus.0.get(), 1);
        assert!(!logs_contain("fullscreen request failed"));
    }

    #[test]
    fn external_exit_is_observed() {
        let adapter = FakeAdapter::default();
        let focus = CountingFocus::default();
        let mut lc = lifecycle(&adapter, &focus);
        adapter.current.set(Some(TARGET));
        lc.handle_change();

        assert_eq!(lc.observe_exit_key(), LifecyclePhase::TransitioningToNormal);
        adapter.current.set(None);
        assert_eq!(lc.handle_change(), LifecyclePhase::Normal);
        assert_eq!(focus.0.get(), 1);
    }

    #[test]
    fn exit_key_while_normal_is_ignored() {
        let adapter = FakeAdapter::default();
        let mut lc = lifecycle(&adapter, &CountingFocus::default());
        assert_eq!(lc.observe_exit_key(), LifecyclePhase::Normal);
    }

    #[test]
    fn other_element_fullscreen_is_not_ours() {
        let adapter = FakeAdapter::default();
        let focus = CountingFocus::default();
        let mut lc = lifecycle(&adapter, &focus);
        adapter.current.set(Some(OTHER));
        assert_eq!(lc.handle_change(), LifecyclePhase::Normal);
        assert_eq!(focus.0.get(), 0);
    }

    #[test]
    fn duplicate_vendor_events_refocus_once() {
        let adapter = FakeAdapter::default();
        let focus = CountingFocus::default();
        let mut lc = lifecycle(&adapter, &focus);
        adapter.current.set(Some(TARGET));
        lc.handle_change();
        lc.handle_change();
        assert_eq!(focus.0.get(), 1);
    }

    #[test]
    fn phase_is_derived_not_cached() {
        let adapter = FakeAdapter::default();
        let mut lc = lifecycle(&adapter, &CountingFocus::default());
        adapter.current.set(Some(TARGET));
        lc.handle_change();
        // Browser state moves without an event reaching us.
        adapter.current.set(None);
        assert_eq!(lc.phase(), LifecyclePhase::Normal);
    }
}
