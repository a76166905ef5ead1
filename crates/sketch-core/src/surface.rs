//! Per-target surface state and the animation loop.
//!
//! A [`Surface`] owns one drawing context plus the loop bookkeeping:
//! running flag, frame counter, and tick timestamps. The loop is a chain
//! of single-shot frames requested from an [`AnimationClock`]; each tick
//! runs the callback and, if the surface is still running, requests the
//! next one.
//!
//! `stop()` only clears the running flag. A frame that is already queued
//! still ticks once more (callback included) and then ends the chain.
//! `start()` while running begins a new chain; frames queued by the old
//! one are dropped when they fire.

use crate::clock::AnimationClock;
use crate::context::{DrawContext, apply_options};
use crate::error::{AnimResult, CallbackError};
use crate::model::{PaintStyle, Point, ShapeSize, SurfaceOptions};
use crate::shapes;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type AnimationCallback = Rc<RefCell<dyn FnMut() -> AnimResult>>;

struct SurfaceState<C> {
    ctx: C,
    width: u32,
    height: u32,
    options: SurfaceOptions,
    running: bool,
    frame: u64,
    start_ms: f64,
    last_tick_ms: f64,
    interval_ms: f64,
    /// Bumped by every `start()`; frames carry the value they were
    /// scheduled under and are dropped when it no longer matches.
    generation: u64,
    callback: Option<AnimationCallback>,
}

struct SurfaceInner<C> {
    state: RefCell<SurfaceState<C>>,
    clock: AnimationClock,
}

/// Handle to the state bound to one drawing target.
///
/// Cloning is cheap and yields the same surface. Drawing methods return
/// `&Self` so calls chain. Callbacks that need their own surface should
/// capture a [`WeakSurface`] to avoid a reference cycle.
pub struct Surface<C: DrawContext + 'static> {
    inner: Rc<SurfaceInner<C>>,
}

impl<C: DrawContext + 'static> Clone for Surface<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<C: DrawContext + 'static> Surface<C> {
    /// Bind state to a context of `width` x `height` pixels and apply the
    /// global paint options to it.
    pub fn new(
        mut ctx: C,
        width: u32,
        height: u32,
        options: SurfaceOptions,
        clock: AnimationClock,
    ) -> Self {
        let options = options.sanitized();
        apply_options(&mut ctx, &options);
        log::debug!("surface created {width}x{height}");
        Self {
            inner: Rc::new(SurfaceInner {
                state: RefCell::new(SurfaceState {
                    ctx,
                    width,
                    height,
                    options,
                    running: false,
                    frame: 0,
                    start_ms: 0.0,
                    last_tick_ms: 0.0,
                    interval_ms: 0.0,
                    generation: 0,
                    callback: None,
                }),
                clock,
            }),
        }
    }

    // ─── Drawing ─────────────────────────────────────────────────────────

    pub fn draw_circle(&self, pos: impl Into<Point>, radius: f64, style: &PaintStyle) -> &Self {
        shapes::draw_circle(&mut self.inner.state.borrow_mut().ctx, pos.into(), radius, style);
        self
    }

    pub fn draw_rectangle(
        &self,
        pos: impl Into<Point>,
        size: impl Into<ShapeSize>,
        style: &PaintStyle,
    ) -> &Self {
        shapes::draw_rectangle(
            &mut self.inner.state.borrow_mut().ctx,
            pos.into(),
            size.into(),
            style,
        );
        self
    }

    pub fn draw_triangle(
        &self,
        pos: impl Into<Point>,
        size: impl Into<ShapeSize>,
        style: &PaintStyle,
    ) -> &Self {
        shapes::draw_triangle(
            &mut self.inner.state.borrow_mut().ctx,
            pos.into(),
            size.into(),
            style,
        );
        self
    }

    /// Clear the whole surface. Does not touch the loop.
    pub fn clear(&self) -> &Self {
        let mut state = self.inner.state.borrow_mut();
        let (w, h) = (f64::from(state.width), f64::from(state.height));
        state.ctx.clear_rect(0.0, 0.0, w, h);
        self
    }

    /// Run `f` with the drawing context for custom drawing.
    ///
    /// Panics if `f` calls back into this surface.
    pub fn with_context<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        f(&mut self.inner.state.borrow_mut().ctx)
    }

    // ─── Animation loop ──────────────────────────────────────────────────

    /// Store the per-tick callback. Takes effect on the next invocation.
    pub fn set_animation_callback(&self, callback: impl FnMut() -> AnimResult + 'static) -> &Self {
        self.inner.state.borrow_mut().callback = Some(Rc::new(RefCell::new(callback)));
        self
    }

    pub fn clear_animation_callback(&self) -> &Self {
        self.inner.state.borrow_mut().callback = None;
        self
    }

    /// Start the loop: stamp the start time, run the callback once right
    /// away, then request the first frame.
    ///
    /// If that first invocation fails the surface is left stopped and the
    /// error is returned.
    pub fn start(&self) -> Result<&Self, CallbackError> {
        let now = self.inner.clock.now_ms();
        let generation = {
            let mut state = self.inner.state.borrow_mut();
            if state.running {
                log::warn!("surface restarted while running, dropping previous frame chain");
            }
            state.running = true;
            state.start_ms = now;
            state.last_tick_ms = now;
            state.generation += 1;
            state.generation
        };
        log::debug!("animation started at {now}ms");

        if let Err(err) = self.invoke_callback() {
            self.halt(generation);
            return Err(err);
        }
        if self.is_current(generation) {
            self.request_tick(generation);
        }
        Ok(self)
    }

    /// Clear the running flag. Idempotent; an already queued frame still
    /// ticks once.
    pub fn stop(&self) -> &Self {
        let mut state = self.inner.state.borrow_mut();
        if state.running {
            log::debug!("animation stopped after frame {}", state.frame);
        }
        state.running = false;
        self
    }

    fn tick(&self, generation: u64) -> AnimResult {
        let now = self.inner.clock.now_ms();
        {
            let mut state = self.inner.state.borrow_mut();
            if state.generation != generation {
                log::trace!("stale frame from chain {generation} dropped");
                return Ok(());
            }
            state.frame += 1;
            state.interval_ms = now - state.last_tick_ms;
            state.last_tick_ms = now;
            log::trace!("tick {} ({:.2}ms)", state.frame, state.interval_ms);
        }

        if let Err(err) = self.invoke_callback() {
            log::error!("animation callback failed on frame {}: {err}", self.frame());
            self.halt(generation);
            return Err(err);
        }

        let keep_going = {
            let state = self.inner.state.borrow();
            state.running && state.generation == generation
        };
        if keep_going {
            self.request_tick(generation);
        } else {
            log::debug!("frame chain {generation} ended");
        }
        Ok(())
    }

    fn request_tick(&self, generation: u64) {
        let weak = Rc::downgrade(&self.inner);
        self.inner
            .clock
            .schedule_next_frame(move || match weak.upgrade() {
                Some(inner) => Surface { inner }.tick(generation),
                None => Ok(()),
            });
    }

    /// Call the stored callback without holding the state borrow, so the
    /// callback may use this surface.
    fn invoke_callback(&self) -> AnimResult {
        let callback = self.inner.state.borrow().callback.clone();
        let Some(callback) = callback else {
            return Ok(());
        };
        let Ok(mut f) = callback.try_borrow_mut() else {
            log::warn!("animation callback re-entered, skipping nested call");
            return Ok(());
        };
        (&mut *f)()
    }

    fn is_current(&self, generation: u64) -> bool {
        self.inner.state.borrow().generation == generation
    }

    /// Stop after a callback failure, unless a newer chain took over.
    fn halt(&self, generation: u64) {
        let mut state = self.inner.state.borrow_mut();
        if state.generation == generation {
            state.running = false;
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn width(&self) -> u32 {
        self.inner.state.borrow().width
    }

    pub fn height(&self) -> u32 {
        self.inner.state.borrow().height
    }

    pub fn options(&self) -> SurfaceOptions {
        self.inner.state.borrow().options.clone()
    }

    pub fn is_running(&self) -> bool {
        self.inner.state.borrow().running
    }

    /// Ticks since creation. Not reset by `start()`.
    pub fn frame(&self) -> u64 {
        self.inner.state.borrow().frame
    }

    /// Time between the last two ticks, in ms.
    pub fn interval_ms(&self) -> f64 {
        self.inner.state.borrow().interval_ms
    }

    pub fn start_time_ms(&self) -> f64 {
        self.inner.state.borrow().start_ms
    }

    pub fn last_tick_ms(&self) -> f64 {
        self.inner.state.borrow().last_tick_ms
    }

    /// Time from the last `start()` to the last tick, in ms.
    pub fn elapsed_ms(&self) -> f64 {
        let state = self.inner.state.borrow();
        state.last_tick_ms - state.start_ms
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.inner.clock
    }

    pub fn downgrade(&self) -> WeakSurface<C> {
        WeakSurface {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether both handles refer to the same surface.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<C: DrawContext + 'static> fmt::Debug for Surface<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.state.try_borrow() {
            Ok(state) => f
                .debug_struct("Surface")
                .field("width", &state.width)
                .field("height", &state.height)
                .field("running", &state.running)
                .field("frame", &state.frame)
                .finish(),
            Err(_) => f.write_str("Surface { <borrowed> }"),
        }
    }
}

/// Non-owning surface handle.
pub struct WeakSurface<C: DrawContext + 'static> {
    inner: Weak<SurfaceInner<C>>,
}

impl<C: DrawContext + 'static> Clone for WeakSurface<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<C: DrawContext + 'static> WeakSurface<C> {
    pub fn upgrade(&self) -> Option<Surface<C>> {
        self.inner.upgrade().map(|inner| Surface { inner })
    }
}
