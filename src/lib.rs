//! Fine-grained reactive dependency tracking.
//!
//! A [`Dep`] is attached to every piece of reactive state. Reading the state
//! inside a tracked computation calls [`Dep::depend`], which reports the
//! dependency to whichever [`Subscriber`] is on top of the [`Runtime`]
//! evaluator stack. Writing the state calls [`Dep::notify`], which updates
//! every live subscriber.
//!
//! Removing a subscriber only tombstones its slot. Compaction is deferred to
//! [`Runtime::flush`], which the surrounding scheduler calls between units
//! of work.

mod addr;
mod cleanup;
mod config;
mod debug;
mod dep;
mod dependencies;
mod evaluation;
mod runtime;
mod slots;

#[cfg(target_arch = "wasm32")]
mod microtask;

use std::sync::atomic::{AtomicU64, Ordering};

pub use config::Config;
pub use debug::{DebugHooks, DebugInfo, DebugOp, DebuggerEvent};
pub use dep::{Dep, DepId, WeakDep};
pub use dependencies::Dependencies;
pub use evaluation::Evaluation;
pub use runtime::Runtime;

/// A computation that can depend on [`Dep`]s and be notified when they change.
pub trait Subscriber: 'static {
	/// Identity used to order synchronous dispatch.
	fn id(&self) -> SubscriberId;

	/// Called by [`Dep::depend`] while this subscriber is the active
	/// evaluator. Implementations usually record the dep and call
	/// [`Dep::add_sub`] with a handle to themselves.
	fn add_dep(&self, dep: &Dep);

	/// One of the dependencies changed.
	fn update(&self);

	/// Optional tracing hooks.
	fn debug_hooks(&self) -> Option<&dyn DebugHooks> {
		None
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
	/// Allocates a fresh id. Ids grow with construction order.
	pub fn next() -> Self {
		static COUNTER: AtomicU64 = AtomicU64::new(0);
		SubscriberId(COUNTER.fetch_add(1, Ordering::Relaxed))
	}

	pub fn get(self) -> u64 {
		self.0
	}
}

impl From<u64> for SubscriberId {
	fn from(id: u64) -> Self {
		SubscriberId(id)
	}
}

impl std::fmt::Display for SubscriberId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "#{}", self.0)
	}
}
