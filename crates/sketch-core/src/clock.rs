//! Frame scheduling: resolves a "run before the next repaint" primitive
//! from an injected host, with a fixed 60 Hz timer as fallback.
//!
//! A clock resolves its primitive lazily, on the first request, and reuses
//! it for every later request. Clocks are plain values handed to surfaces,
//! so several can coexist and tests can drive a [`ManualFrameHost`].

use crate::error::{AnimResult, CallbackError};
use std::cell::{Cell, OnceCell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// Host names probed for a native frame primitive, in preference order.
pub const NATIVE_FRAME_PRIMITIVES: [&str; 5] = [
    "requestAnimationFrame",
    "webkitRequestAnimationFrame",
    "mozRequestAnimationFrame",
    "oRequestAnimationFrame",
    "msRequestAnimationFrame",
];

/// Interval of the timer fallback (60 ticks per second).
pub const FALLBACK_INTERVAL_MS: f64 = 1000.0 / 60.0;

/// Single-shot work item handed to a scheduler.
pub type FrameCallback = Box<dyn FnOnce() -> AnimResult>;

/// A resolved scheduling primitive.
///
/// Invokes the callback once, asynchronously, with no arguments. An `Err`
/// from the callback belongs to the host's unhandled-error channel.
pub trait FrameScheduler {
    fn request_frame(&self, callback: FrameCallback);
}

/// The environment a clock resolves its primitive from.
pub trait FrameHost {
    /// Native vsync-aligned primitive exposed under `name`, if any.
    fn native_scheduler(&self, name: &str) -> Option<Rc<dyn FrameScheduler>>;

    /// Fixed-interval timer firing after `interval_ms`.
    fn interval_scheduler(&self, interval_ms: f64) -> Rc<dyn FrameScheduler>;

    /// Current host time in milliseconds.
    fn now_ms(&self) -> f64;
}

/// Which primitive a clock ended up with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameSource {
    Native(&'static str),
    Fallback { interval_ms: f64 },
}

impl fmt::Display for FrameSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameSource::Native(name) => write!(f, "{name}"),
            FrameSource::Fallback { interval_ms } => write!(f, "timer({interval_ms:.2}ms)"),
        }
    }
}

struct ClockInner {
    host: Box<dyn FrameHost>,
    resolved: OnceCell<(FrameSource, Rc<dyn FrameScheduler>)>,
    last_now: Cell<f64>,
}

/// Shared frame clock. Cloning yields another handle to the same clock.
#[derive(Clone)]
pub struct AnimationClock {
    inner: Rc<ClockInner>,
}

impl AnimationClock {
    pub fn new(host: impl FrameHost + 'static) -> Self {
        Self {
            inner: Rc::new(ClockInner {
                host: Box::new(host),
                resolved: OnceCell::new(),
                last_now: Cell::new(f64::NEG_INFINITY),
            }),
        }
    }

    /// Schedule `callback` for the next frame. Non-blocking.
    pub fn schedule_next_frame(&self, callback: impl FnOnce() -> AnimResult + 'static) {
        let (_, scheduler) = self.resolve();
        scheduler.request_frame(Box::new(callback));
    }

    /// The primitive this clock uses, resolving it if needed.
    pub fn source(&self) -> FrameSource {
        self.resolve().0
    }

    /// Host time in ms, never earlier than a previously returned value.
    pub fn now_ms(&self) -> f64 {
        let now = self.inner.host.now_ms().max(self.inner.last_now.get());
        self.inner.last_now.set(now);
        now
    }

    fn resolve(&self) -> &(FrameSource, Rc<dyn FrameScheduler>) {
        self.inner.resolved.get_or_init(|| {
            let host = &self.inner.host;
            let resolved = NATIVE_FRAME_PRIMITIVES
                .iter()
                .find_map(|name| {
                    host.native_scheduler(name)
                        .map(|scheduler| (FrameSource::Native(*name), scheduler))
                })
                .unwrap_or_else(|| {
                    (
                        FrameSource::Fallback {
                            interval_ms: FALLBACK_INTERVAL_MS,
                        },
                        host.interval_scheduler(FALLBACK_INTERVAL_MS),
                    )
                });
            log::debug!("frame clock resolved to {}", resolved.0);
            resolved
        })
    }
}

impl fmt::Debug for AnimationClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationClock")
            .field("source", &self.inner.resolved.get().map(|(s, _)| *s))
            .finish()
    }
}

// ─── Manual host ─────────────────────────────────────────────────────────

struct PendingFrame {
    delay_ms: f64,
    callback: FrameCallback,
}

#[derive(Default)]
struct ManualState {
    natives: Vec<String>,
    native_delay_ms: f64,
    now_ms: Cell<f64>,
    queue: RefCell<VecDeque<PendingFrame>>,
    errors: RefCell<Vec<CallbackError>>,
    queried: RefCell<Vec<String>>,
}

/// Deterministic frame host driven by hand.
///
/// Scheduled frames queue up until [`run_next_frame`](Self::run_next_frame)
/// pops one, advances the host time by the frame's delay, and runs it.
/// Callback errors are collected instead of being raised. Useful for
/// headless rendering and tests.
#[derive(Clone)]
pub struct ManualFrameHost {
    state: Rc<ManualState>,
}

impl ManualFrameHost {
    /// Host exposing no native primitive; clocks fall back to the timer.
    pub fn new() -> Self {
        Self::with_natives(&[])
    }

    /// Host exposing the given native primitive names, each firing after
    /// a 16 ms frame.
    pub fn with_natives(names: &[&str]) -> Self {
        Self {
            state: Rc::new(ManualState {
                natives: names.iter().map(|n| n.to_string()).collect(),
                native_delay_ms: 16.0,
                ..ManualState::default()
            }),
        }
    }

    pub fn set_now(&self, now_ms: f64) {
        self.state.now_ms.set(now_ms);
    }

    pub fn advance(&self, ms: f64) {
        self.state.now_ms.set(self.state.now_ms.get() + ms);
    }

    /// Number of frames waiting to run.
    pub fn pending(&self) -> usize {
        self.state.queue.borrow().len()
    }

    /// Run the oldest pending frame. Returns `false` if none was queued.
    pub fn run_next_frame(&self) -> bool {
        let next = self.state.queue.borrow_mut().pop_front();
        let Some(frame) = next else {
            return false;
        };
        self.advance(frame.delay_ms);
        if let Err(err) = (frame.callback)() {
            log::error!("unhandled frame error: {err}");
            self.state.errors.borrow_mut().push(err);
        }
        true
    }

    /// Run up to `max` frames, including frames scheduled while running.
    /// Returns how many ran.
    pub fn run_frames(&self, max: usize) -> usize {
        let mut ran = 0;
        while ran < max && self.run_next_frame() {
            ran += 1;
        }
        ran
    }

    /// Errors raised by frame callbacks so far.
    pub fn errors(&self) -> Vec<CallbackError> {
        self.state.errors.borrow().clone()
    }

    /// Native names the clock asked for, in order.
    pub fn queried(&self) -> Vec<String> {
        self.state.queried.borrow().clone()
    }

    fn scheduler(&self, delay_ms: f64) -> Rc<dyn FrameScheduler> {
        Rc::new(ManualScheduler {
            state: Rc::clone(&self.state),
            delay_ms,
        })
    }
}

impl Default for ManualFrameHost {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameHost for ManualFrameHost {
    fn native_scheduler(&self, name: &str) -> Option<Rc<dyn FrameScheduler>> {
        self.state.queried.borrow_mut().push(name.to_string());
        if self.state.natives.iter().any(|n| n == name) {
            Some(self.scheduler(self.state.native_delay_ms))
        } else {
            None
        }
    }

    fn interval_scheduler(&self, interval_ms: f64) -> Rc<dyn FrameScheduler> {
        self.scheduler(interval_ms)
    }

    fn now_ms(&self) -> f64 {
        self.state.now_ms.get()
    }
}

struct ManualScheduler {
    state: Rc<ManualState>,
    delay_ms: f64,
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self, callback: FrameCallback) {
        self.state.queue.borrow_mut().push_back(PendingFrame {
            delay_ms: self.delay_ms,
            callback,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn falls_back_to_sixty_hz_timer() {
        let host = ManualFrameHost::new();
        let clock = AnimationClock::new(host.clone());
        assert_eq!(
            clock.source(),
            FrameSource::Fallback {
                interval_ms: 1000.0 / 60.0
            }
        );
        assert_eq!(host.queried(), NATIVE_FRAME_PRIMITIVES.to_vec());
    }

    #[test]
    fn prefers_earliest_native_name() {
        let host = ManualFrameHost::with_natives(&["mozRequestAnimationFrame", "requestAnimationFrame"]);
        let clock = AnimationClock::new(host.clone());
        assert_eq!(clock.source(), FrameSource::Native("requestAnimationFrame"));
        assert_eq!(host.queried(), vec!["requestAnimationFrame".to_string()]);
    }

    #[test]
    fn vendor_prefixed_name_is_used_when_standard_missing() {
        let host = ManualFrameHost::with_natives(&["msRequestAnimationFrame", "webkitRequestAnimationFrame"]);
        let clock = AnimationClock::new(host);
        assert_eq!(clock.source(), FrameSource::Native("webkitRequestAnimationFrame"));
    }

    #[test]
    fn resolves_only_once() {
        let host = ManualFrameHost::new();
        let clock = AnimationClock::new(host.clone());
        clock.schedule_next_frame(|| Ok(()));
        clock.schedule_next_frame(|| Ok(()));
        let _ = clock.source();
        assert_eq!(host.queried().len(), NATIVE_FRAME_PRIMITIVES.len());
        assert_eq!(host.pending(), 2);
    }

    #[test]
    fn scheduled_callback_runs_once_later() {
        let host = ManualFrameHost::new();
        let clock = AnimationClock::new(host.clone());
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        clock.schedule_next_frame(move || {
            counter.set(counter.get() + 1);
            Ok(())
        });
        assert_eq!(hits.get(), 0, "must not run synchronously");
        assert_eq!(host.run_frames(10), 1);
        assert_eq!(hits.get(), 1);
        assert!((host.now_ms() - FALLBACK_INTERVAL_MS).abs() < 1e-9);
    }

    #[test]
    fn callback_errors_reach_the_host() {
        let host = ManualFrameHost::new();
        let clock = AnimationClock::new(host.clone());
        clock.schedule_next_frame(|| Err("boom".into()));
        host.run_next_frame();
        assert_eq!(host.errors(), vec![CallbackError::new("boom")]);
    }

    #[test]
    fn now_never_goes_backwards() {
        let host = ManualFrameHost::new();
        let clock = AnimationClock::new(host.clone());
        host.set_now(100.0);
        assert_eq!(clock.now_ms(), 100.0);
        host.set_now(40.0);
        assert_eq!(clock.now_ms(), 100.0);
    }

    #[test]
    fn independent_clocks_do_not_share_resolution() {
        let native = AnimationClock::new(ManualFrameHost::with_natives(&["requestAnimationFrame"]));
        let fallback = AnimationClock::new(ManualFrameHost::new());
        assert_eq!(native.source(), FrameSource::Native("requestAnimationFrame"));
        assert!(matches!(fallback.source(), FrameSource::Fallback { .. }));
    }
}
