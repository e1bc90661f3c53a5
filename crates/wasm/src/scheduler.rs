use folio_core::scheduler::{FrameScheduler, FrameToken};
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Window;

/// `requestAnimationFrame` behind [`FrameScheduler`].
///
/// Every request reuses one installed callback. The browser does not tell the
/// callback which request fired, so the scheduler remembers the single
/// outstanding token and hands it back through [`RafScheduler::take_fired`].
pub struct RafScheduler {
    window: Window,
    callback: Option<Closure<dyn FnMut(f64)>>,
    pending: Option<FrameToken>,
}

impl RafScheduler {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            callback: None,
            pending: None,
        }
    }

    pub fn install(&mut self, callback: Closure<dyn FnMut(f64)>) {
        self.callback = Some(callback);
    }

    pub fn take_fired(&mut self) -> Option<FrameToken> {
        self.pending.take()
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) -> FrameToken {
        let handle = match &self.callback {
            Some(callback) => self
                .window
                .request_animation_frame(callback.as_ref().unchecked_ref()),
            None => Err(JsValue::from_str("frame callback not installed")),
        };
        let token = match handle {
            Ok(id) => FrameToken(u64::from(id.unsigned_abs())),
            Err(err) => {
                warn!(?err, "requestAnimationFrame failed; animation stalls");
                FrameToken(0)
            }
        };
        self.pending = Some(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if self.pending == Some(token) {
            self.pending = None;
        }
        if let Ok(id) = i32::try_from(token.0)
            && let Err(err) = self.window.cancel_animation_frame(id)
        {
            warn!(?err, "cancelAnimationFrame failed");
        }
    }
}
