use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::slots::Slots;
use crate::{DebugInfo, DebuggerEvent, Runtime, Subscriber};

static DEP_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DepId(u64);

impl DepId {
	fn next() -> Self {
		DepId(DEP_ID.fetch_add(1, Ordering::Relaxed))
	}

	pub fn get(self) -> u64 {
		self.0
	}
}

impl std::fmt::Display for DepId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Observable cell: the set of subscribers depending on one piece of state.
#[derive(Clone)]
pub struct Dep {
	body: Rc<DepBody>,
}

/// Non-owning handle to a [`Dep`], for subscribers tracking what they read.
#[derive(Clone)]
pub struct WeakDep {
	body: Weak<DepBody>,
}

pub(crate) struct DepBody {
	id: DepId,
	subs: RefCell<Slots>,
	cleanup_pending: Cell<bool>,
	runtime: Runtime,
	this: Weak<DepBody>,
}

impl Default for Dep {
	fn default() -> Self {
		Dep::new(&Runtime::current())
	}
}

impl Dep {
	pub fn new(runtime: &Runtime) -> Self {
		Dep {
			body: Rc::new_cyclic(|this| DepBody {
				id: DepId::next(),
				subs: RefCell::new(Slots::new()),
				cleanup_pending: Cell::new(false),
				runtime: runtime.clone(),
				this: this.clone(),
			}),
		}
	}

	pub fn id(&self) -> DepId {
		self.body.id
	}

	pub fn runtime(&self) -> &Runtime {
		&self.body.runtime
	}

	pub fn downgrade(&self) -> WeakDep {
		WeakDep {
			body: Rc::downgrade(&self.body),
		}
	}

	#[inline]
	pub fn depend(&self, info: Option<&DebugInfo>) {
		self.body.depend(self, info)
	}

	#[inline]
	pub fn add_sub(&self, sub: Weak<dyn Subscriber>) {
		self.body.add_sub(sub)
	}

	#[inline]
	pub fn remove_sub(&self, sub: &Weak<dyn Subscriber>) {
		self.body.remove_sub(sub)
	}

	#[inline]
	pub fn notify(&self, info: Option<&DebugInfo>) {
		self.body.notify(info)
	}

	/// Slot count, tombstones included.
	pub fn len(&self) -> usize {
		self.body.subs.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn live_count(&self) -> usize {
		self.body.subs.borrow().live()
	}

	pub fn tombstones(&self) -> usize {
		self.body.subs.borrow().tombstones()
	}

	pub fn is_cleanup_pending(&self) -> bool {
		self.body.cleanup_pending.get()
	}

	/// Number of live slots holding `sub`.
	pub fn subscribed(&self, sub: &Weak<dyn Subscriber>) -> usize {
		self.body.subs.borrow().count(sub)
	}

	pub fn has_sub(&self, sub: &Weak<dyn Subscriber>) -> bool {
		self.body.subs.borrow().contains(sub)
	}
}

impl DepBody {
	fn depend(&self, dep: &Dep, info: Option<&DebugInfo>) {
		// clone out of the stack so `add_dep` may enter nested evaluations
		let Some(target) = self.runtime.active() else {
			return;
		};

		tracing::trace!(dep = %self.id, evaluator = %target.id(), "depend");
		target.add_dep(dep);

		if let Some(info) = info.filter(|_| self.runtime.config().debug_hooks) {
			if let Some(hooks) = target.debug_hooks() {
				hooks.on_track(&DebuggerEvent {
					effect: target.id(),
					info,
				});
			}
		}
	}

	fn add_sub(&self, sub: Weak<dyn Subscriber>) {
		self.subs.borrow_mut().push(sub);
	}

	fn remove_sub(&self, sub: &Weak<dyn Subscriber>) {
		if !self.subs.borrow_mut().tombstone(sub) {
			return;
		}

		tracing::trace!(dep = %self.id, "subscriber removed");
		self.schedule_cleanup();
	}

	fn schedule_cleanup(&self) {
		if !self.cleanup_pending.replace(true) {
			self.runtime.cleanup().push(self.this.clone());
		}
	}

	fn notify(&self, info: Option<&DebugInfo>) {
		let config = self.runtime.config();

		// subscribers may add or remove subscriptions while we dispatch
		let (mut subs, dropped) = {
			let slots = self.subs.borrow();
			let subs = slots.snapshot();
			let dropped = slots.len() - slots.tombstones() - subs.len();
			(subs, dropped)
		};

		// slots of subscribers dropped without unsubscribing
		if dropped > 0 {
			self.schedule_cleanup();
		}

		if !config.async_dispatch {
			subs.sort_by_key(|sub| sub.id());
		}

		tracing::trace!(dep = %self.id, subscribers = subs.len(), "notify");

		for sub in subs {
			if let Some(info) = info.filter(|_| config.debug_hooks) {
				if let Some(hooks) = sub.debug_hooks() {
					hooks.on_trigger(&DebuggerEvent {
						effect: sub.id(),
						info,
					});
				}
			}
			sub.update();
		}
	}

	pub(crate) fn compact(&self) -> usize {
		let reclaimed = self.subs.borrow_mut().compact();
		self.cleanup_pending.set(false);
		reclaimed
	}
}

impl WeakDep {
	pub fn upgrade(&self) -> Option<Dep> {
		self.body.upgrade().map(|body| Dep { body })
	}
}

impl PartialEq for Dep {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.body, &other.body)
	}
}

impl Eq for Dep {}

impl std::fmt::Debug for Dep {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Dep")
			.field("id", &self.body.id)
			.field("slots", &self.len())
			.field("cleanup_pending", &self.is_cleanup_pending())
			.finish()
	}
}

impl std::fmt::Debug for WeakDep {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self.upgrade() {
			Some(dep) => f.debug_tuple("WeakDep").field(&dep.id()).finish(),
			None => f.write_str("WeakDep(<dropped>)"),
		}
	}
}
