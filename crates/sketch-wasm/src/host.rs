//! Frame host backed by the browser `window`.
//!
//! Native primitives are looked up by name on `window` (so vendor-prefixed
//! variants are found on old engines); the fallback is `setTimeout`.

use sketch_core::clock::{FrameCallback, FrameHost, FrameScheduler};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Window;

pub struct WindowFrameHost {
    window: Window,
}

impl WindowFrameHost {
    /// `None` outside a browser main thread (no `window`).
    pub fn new() -> Option<Self> {
        web_sys::window().map(|window| Self { window })
    }
}

impl FrameHost for WindowFrameHost {
    fn native_scheduler(&self, name: &str) -> Option<Rc<dyn FrameScheduler>> {
        let value = js_sys::Reflect::get(self.window.as_ref(), &JsValue::from_str(name)).ok()?;
        let function = value.dyn_into::<js_sys::Function>().ok()?;
        Some(Rc::new(NativeScheduler {
            window: self.window.clone(),
            function,
        }))
    }

    fn interval_scheduler(&self, interval_ms: f64) -> Rc<dyn FrameScheduler> {
        Rc::new(TimeoutScheduler {
            window: self.window.clone(),
            interval_ms: interval_ms.round() as i32,
        })
    }

    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

/// `requestAnimationFrame` or one of its prefixed variants.
struct NativeScheduler {
    window: Window,
    function: js_sys::Function,
}

impl FrameScheduler for NativeScheduler {
    fn request_frame(&self, callback: FrameCallback) {
        if let Err(err) = self.function.call1(self.window.as_ref(), &into_js(callback)) {
            log::error!("frame request failed: {}", crate::js_message(&err));
        }
    }
}

struct TimeoutScheduler {
    window: Window,
    interval_ms: i32,
}

impl FrameScheduler for TimeoutScheduler {
    fn request_frame(&self, callback: FrameCallback) {
        let js = into_js(callback);
        if let Err(err) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(js.unchecked_ref(), self.interval_ms)
        {
            log::error!("timer request failed: {}", crate::js_message(&err));
        }
    }
}

/// Wrap a frame callback as a one-shot JS function. A callback error is
/// thrown as a JS `Error`, so it reaches `window.onerror`.
fn into_js(callback: FrameCallback) -> JsValue {
    Closure::once_into_js(move || -> Result<(), JsValue> {
        callback().map_err(|err| {
            log::error!("{err}");
            JsError::new(&err.to_string()).into()
        })
    })
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use sketch_core::CallbackError;
    use wasm_bindgen_test::wasm_bindgen_test;

    fn call(callback: FrameCallback) -> Result<JsValue, JsValue> {
        into_js(callback)
            .unchecked_into::<js_sys::Function>()
            .call0(&JsValue::NULL)
    }

    #[wasm_bindgen_test]
    fn failing_frame_throws_an_error() {
        let thrown = call(Box::new(|| Err(CallbackError::new("sprite sheet missing"))))
            .expect_err("callback error must be thrown");
        let error = thrown
            .dyn_into::<js_sys::Error>()
            .expect("thrown value is an Error");
        assert_eq!(
            String::from(error.message()),
            "animation callback failed: sprite sheet missing"
        );
    }

    #[wasm_bindgen_test]
    fn successful_frame_returns_normally() {
        assert!(call(Box::new(|| Ok(()))).is_ok());
    }

    #[wasm_bindgen_test]
    fn window_host_prefers_request_animation_frame() {
        let host = WindowFrameHost::new().expect("browser window");
        assert!(host.native_scheduler("requestAnimationFrame").is_some());
        assert!(host.native_scheduler("noSuchFrameFunction").is_none());
    }
}
