use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::cleanup::CleanupQueue;
use crate::evaluation::Evaluation;
use crate::{Config, Subscriber};

thread_local! {
	static CURRENT: Runtime = Runtime::new();
}

/// Evaluator stack, cleanup queue and config shared by a group of deps.
///
/// Cloning is cheap and yields a handle to the same runtime. Deps bind to
/// the runtime they were created with.
#[derive(Clone, Default)]
pub struct Runtime {
	inner: Rc<RuntimeInner>,
}

#[derive(Default)]
struct RuntimeInner {
	stack: RefCell<Vec<Option<Rc<dyn Subscriber>>>>,
	cleanup: CleanupQueue,
	config: Cell<Config>,
	#[cfg(target_arch = "wasm32")]
	microtask: Cell<bool>,
}

impl Runtime {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_config(config: Config) -> Self {
		let runtime = Self::new();
		runtime.set_config(config);
		runtime
	}

	/// The runtime of the current thread.
	pub fn current() -> Runtime {
		CURRENT.with(Runtime::clone)
	}

	pub fn config(&self) -> Config {
		self.inner.config.get()
	}

	pub fn set_config(&self, config: Config) {
		self.inner.config.set(config);
	}

	/// Makes `evaluator` the active one until the matching [`exit`](Self::exit).
	/// `None` suspends tracking.
	pub fn enter(&self, evaluator: Option<Rc<dyn Subscriber>>) {
		if let Some(evaluator) = &evaluator {
			tracing::trace!(evaluator = %evaluator.id(), "enter");
		}
		self.inner.stack.borrow_mut().push(evaluator);
	}

	pub fn exit(&self) {
		// release the borrow before the evaluator drops, its `Drop` may use us
		let popped = self.inner.stack.borrow_mut().pop();
		if popped.is_none() {
			tracing::warn!("exit without a matching enter");
		}
	}

	pub fn active(&self) -> Option<Rc<dyn Subscriber>> {
		self.inner.stack.borrow().last().cloned().flatten()
	}

	pub fn is_tracking(&self) -> bool {
		matches!(self.inner.stack.borrow().last(), Some(Some(_)))
	}

	pub fn depth(&self) -> usize {
		self.inner.stack.borrow().len()
	}

	/// Enters `evaluator`; the returned guard exits on drop.
	#[must_use]
	pub fn track(&self, evaluator: Rc<dyn Subscriber>) -> Evaluation {
		Evaluation::new(self.clone(), Some(evaluator))
	}

	/// Runs `func` with `evaluator` active.
	pub fn evaluate<R>(&self, evaluator: Rc<dyn Subscriber>, func: impl FnOnce() -> R) -> R {
		let _guard = self.track(evaluator);
		func()
	}

	/// Runs `func` with tracking suspended.
	pub fn untracked<R>(&self, func: impl FnOnce() -> R) -> R {
		let _guard = Evaluation::new(self.clone(), None);
		func()
	}

	/// Compacts every dep with removed subscribers.
	///
	/// Meant to be called by the scheduler between units of work, never
	/// from inside a `notify` dispatch.
	pub fn flush(&self) {
		self.inner.cleanup.flush();
	}

	/// Number of deps waiting for [`flush`](Self::flush).
	pub fn pending_cleanup(&self) -> usize {
		self.inner.cleanup.len()
	}

	pub(crate) fn cleanup(&self) -> &CleanupQueue {
		&self.inner.cleanup
	}

	/// Queues a [`flush`](Self::flush) on the JS microtask queue, once per turn.
	#[cfg(target_arch = "wasm32")]
	pub fn flush_in_microtask(&self) {
		if self.inner.microtask.replace(true) {
			return;
		}

		crate::microtask::queue_flush(self.clone(), |runtime| {
			runtime.inner.microtask.set(false);
		});
	}
}

impl std::fmt::Debug for Runtime {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Runtime")
			.field("depth", &self.depth())
			.field("pending_cleanup", &self.pending_cleanup())
			.field("config", &self.config())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{Dep, SubscriberId};

	struct Nop(SubscriberId);

	impl Subscriber for Nop {
		fn id(&self) -> SubscriberId {
			self.0
		}
		fn add_dep(&self, _dep: &Dep) {}
		fn update(&self) {}
	}

	fn nop() -> Rc<dyn Subscriber> {
		Rc::new(Nop(SubscriberId::next()))
	}

	#[test]
	fn enter_exit_restores_previous() {
		let runtime = Runtime::new();
		let (a, b) = (nop(), nop());

		assert!(runtime.active().is_none());

		runtime.enter(Some(a.clone()));
		assert_eq!(runtime.active().map(|s| s.id()), Some(a.id()));

		runtime.enter(Some(b.clone()));
		assert_eq!(runtime.active().map(|s| s.id()), Some(b.id()));

		runtime.exit();
		assert_eq!(runtime.active().map(|s| s.id()), Some(a.id()));

		runtime.exit();
		assert!(runtime.active().is_none());
		assert_eq!(runtime.depth(), 0);
	}

	#[test]
	fn explicit_none_suspends_tracking() {
		let runtime = Runtime::new();
		let a = nop();

		runtime.enter(Some(a.clone()));
		runtime.enter(None);
		assert!(!runtime.is_tracking());
		assert_eq!(runtime.depth(), 2);

		runtime.exit();
		assert!(runtime.is_tracking());
		runtime.exit();
	}

	#[test]
	fn unbalanced_exit_is_tolerated() {
		let runtime = Runtime::new();
		runtime.exit();
		assert_eq!(runtime.depth(), 0);
		assert!(runtime.active().is_none());
	}

	#[test]
	fn guard_exits_on_drop() {
		let runtime = Runtime::new();
		{
			let _guard = runtime.track(nop());
			assert!(runtime.is_tracking());
		}
		assert!(!runtime.is_tracking());
	}

	#[test]
	fn guard_exits_on_panic() {
		let runtime = Runtime::new();
		let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
			let _: () = runtime.evaluate(nop(), || panic!("evaluation failed"));
		}));

		assert!(result.is_err());
		assert_eq!(runtime.depth(), 0);
	}

	#[test]
	fn untracked_inside_evaluation() {
		let runtime = Runtime::new();
		runtime.evaluate(nop(), || {
			assert!(runtime.is_tracking());
			runtime.untracked(|| assert!(runtime.active().is_none()));
			assert!(runtime.is_tracking());
		});
	}

	struct Disposing {
		id: SubscriberId,
		runtime: Runtime,
	}

	impl Subscriber for Disposing {
		fn id(&self) -> SubscriberId {
			self.id
		}
		fn add_dep(&self, _dep: &Dep) {}
		fn update(&self) {}
	}

	impl Drop for Disposing {
		fn drop(&mut self) {
			self.runtime.untracked(|| ());
		}
	}

	#[test]
	fn evaluator_dropped_on_exit_may_use_runtime() {
		let runtime = Runtime::new();
		let evaluator = Rc::new(Disposing {
			id: SubscriberId::next(),
			runtime: runtime.clone(),
		});

		runtime.evaluate(evaluator, || ());

		assert_eq!(runtime.depth(), 0);
		assert!(runtime.active().is_none());
	}

	#[test]
	fn current_is_shared_per_thread() {
		let a = Runtime::current();
		let b = Runtime::current();
		a.enter(Some(nop()));
		assert!(b.is_tracking());
		a.exit();
		assert!(!b.is_tracking());
	}
}
