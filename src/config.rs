/// Runtime switches read by [`Dep::notify`](crate::Dep::notify) and
/// [`Dep::depend`](crate::Dep::depend).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
	/// Notifications are queued by an external async scheduler that owns
	/// ordering. When off, `notify` dispatches in ascending subscriber id.
	pub async_dispatch: bool,

	/// Fire `on_track` / `on_trigger` debug hooks.
	pub debug_hooks: bool,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			async_dispatch: true,
			debug_hooks: cfg!(debug_assertions),
		}
	}
}

impl Config {
	pub fn with_async_dispatch(mut self, async_dispatch: bool) -> Self {
		self.async_dispatch = async_dispatch;
		self
	}

	pub fn with_debug_hooks(mut self, debug_hooks: bool) -> Self {
		self.debug_hooks = debug_hooks;
		self
	}
}
