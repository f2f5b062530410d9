//! Waiting out a retry delay on native and WASM targets.

use std::time::Duration;

/// Waits for `delay` before a request is re-issued.
///
/// Native targets sleep on the tokio timer. WASM targets have no tokio timer,
/// so the wait is a JS `setTimeout` wrapped in a promise.
#[cfg(not(target_arch = "wasm32"))]
pub(crate) async fn wait(delay: Duration) {
    tokio::time::sleep(delay).await;
}

#[cfg(target_arch = "wasm32")]
pub(crate) async fn wait(delay: Duration) {
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_name = setTimeout)]
        fn set_timeout(handler: &js_sys::Function, timeout: i32) -> JsValue;
    }

    let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        set_timeout(&resolve, millis);
    });
    // setTimeout never rejects.
    let _ = JsFuture::from(promise).await;
}
