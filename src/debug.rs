use crate::{DepId, SubscriberId};

/// Kind of access or mutation a debug event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugOp {
	Get,
	Has,
	Iterate,
	Touch,
	Set,
	Add,
	Delete,
	Clear,
	ArrayMutation,
}

/// Diagnostic metadata passed to `depend` / `notify` and forwarded to the
/// hooks untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugInfo {
	pub op: DebugOp,
	pub target: Option<DepId>,
	pub key: Option<String>,
	pub new_value: Option<String>,
	pub old_value: Option<String>,
}

impl DebugInfo {
	pub fn new(op: DebugOp) -> Self {
		DebugInfo {
			op,
			target: None,
			key: None,
			new_value: None,
			old_value: None,
		}
	}

	pub fn target(mut self, target: DepId) -> Self {
		self.target = Some(target);
		self
	}

	pub fn key(mut self, key: impl Into<String>) -> Self {
		self.key = Some(key.into());
		self
	}

	pub fn new_value(mut self, value: impl Into<String>) -> Self {
		self.new_value = Some(value.into());
		self
	}

	pub fn old_value(mut self, value: impl Into<String>) -> Self {
		self.old_value = Some(value.into());
		self
	}
}

#[derive(Debug, Clone, Copy)]
pub struct DebuggerEvent<'a> {
	/// The subscriber the event is delivered to.
	pub effect: SubscriberId,
	pub info: &'a DebugInfo,
}

/// Optional hooks a [`Subscriber`](crate::Subscriber) can expose through
/// [`Subscriber::debug_hooks`](crate::Subscriber::debug_hooks).
pub trait DebugHooks {
	/// A dependency edge was recorded while this subscriber was evaluating.
	fn on_track(&self, _event: &DebuggerEvent<'_>) {}

	/// Fired right before `update`.
	fn on_trigger(&self, _event: &DebuggerEvent<'_>) {}
}
