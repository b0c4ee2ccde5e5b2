//! Property-based invariant tests for the fullscreen lifecycle.
//!
//! Verifies:
//! 1. After any sequence of change events the phase is `Fullscreen` iff the
//!    last observed fullscreen element is the target
//! 2. Refocus is scheduled exactly once per transition into the target
//! 3. Interleaved requests and exit keys never leave the machine stuck
//!    mid-transition once a change event has been observed, even when that
//!    event repeats the previous element

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use gameframe_core::error::HarnessError;
use gameframe_core::focus::{FocusCoordinator, FocusTarget, ManualTimer};
use gameframe_core::fullscreen::{
    FullscreenAdapter, FullscreenLifecycle, LifecyclePhase, RequestFuture,
};
use proptest::prelude::*;

const TARGET: u8 = 0;

#[derive(Clone, Default)]
struct SimAdapter {
    current: Rc<Cell<Option<u8>>>,
}

impl FullscreenAdapter for SimAdapter {
    type Element = u8;

    fn request_fullscreen(&self, _element: &u8) -> RequestFuture {
        Box::pin(async { Ok::<(), HarnessError>(()) })
    }

    fn current_fullscreen_element(&self) -> Option<u8> {
        self.current.get()
    }
}

#[derive(Clone, Default)]
struct CountingSurface {
    focused: Rc<Cell<u32>>,
}

impl FocusTarget for CountingSurface {
    fn focus_outer(&self) {
        self.focused.set(self.focused.get() + 1);
    }

    fn focus_nested(&self) -> Option<Result<(), HarnessError>> {
        None
    }
}

#[derive(Debug, Clone)]
enum Step {
    /// A change event reporting this fullscreen element.
    Change(Option<u8>),
    /// A user request (issued, awaited and completed).
    Request,
    /// An Escape key press.
    Exit,
}

fn arb_element() -> impl Strategy<Value = Option<u8>> {
    prop_oneof![Just(None), (0u8..3).prop_map(Some)]
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => arb_element().prop_map(Step::Change),
        1 => Just(Step::Request),
        1 => Just(Step::Exit),
    ]
}

fn machine() -> (
    SimAdapter,
    CountingSurface,
    ManualTimer,
    FullscreenLifecycle<SimAdapter, FocusCoordinator<CountingSurface, ManualTimer>>,
) {
    let adapter = SimAdapter::default();
    let surface = CountingSurface::default();
    let timer = ManualTimer::new();
    let focus = FocusCoordinator::new(surface.clone(), timer.clone(), Duration::from_millis(100));
    let lifecycle = FullscreenLifecycle::new(adapter.clone(), TARGET, focus);
    (adapter, surface, timer, lifecycle)
}

proptest! {
    #[test]
    fn phase_tracks_last_change_event(events in prop::collection::vec(arb_element(), 1..40)) {
        let (adapter, _surface, _timer, mut lifecycle) = machine();
        for current in &events {
            adapter.current.set(*current);
            lifecycle.handle_change();
        }
        let last = *events.last().unwrap();
        prop_assert_eq!(
            lifecycle.phase() == LifecyclePhase::Fullscreen,
            last == Some(TARGET)
        );
    }

    #[test]
    fn refocus_once_per_entry(events in prop::collection::vec(arb_element(), 1..40)) {
        let (adapter, surface, timer, mut lifecycle) = machine();
        let mut previous = None;
        let mut entries = 0u32;
        for current in &events {
            if *current != previous && *current == Some(TARGET) {
                entries += 1;
            }
            previous = *current;
            adapter.current.set(*current);
            lifecycle.handle_change();
        }
        timer.advance(Duration::from_millis(100));
        prop_assert_eq!(surface.focused.get(), entries);
    }

    #[test]
    fn change_event_settles_any_history(
        steps in prop::collection::vec(arb_step(), 0..30),
        last in arb_element(),
    ) {
        let (adapter, _surface, _timer, mut lifecycle) = machine();
        for step in steps {
            match step {
                Step::Change(current) => {
                    adapter.current.set(current);
                    lifecycle.handle_change();
                }
                Step::Request => {
                    let result = pollster::block_on(lifecycle.begin_request());
                    lifecycle.complete_request(result);
                }
                Step::Exit => {
                    lifecycle.observe_exit_key();
                }
            }
        }
        adapter.current.set(last);
        let phase = lifecycle.handle_change();

        let expected = if last == Some(TARGET) {
            LifecyclePhase::Fullscreen
        } else {
            LifecyclePhase::Normal
        };
        prop_assert_eq!(phase, expected);
    }
}
