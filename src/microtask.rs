#![cfg(target_arch = "wasm32")]

use wasm_bindgen::prelude::*;

use crate::Runtime;

#[wasm_bindgen]
extern "C" {
	#[wasm_bindgen(js_name = queueMicrotask)]
	fn queue_microtask(closure: &JsValue);
}

/// Runs `runtime.flush()` once the current JS task yields.
pub(crate) fn queue_flush(runtime: Runtime, done: impl FnOnce(&Runtime) + 'static) {
	let task = Closure::once_into_js(move || {
		done(&runtime);
		runtime.flush();
	});
	queue_microtask(&task);
}
