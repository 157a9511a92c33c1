use std::rc::Weak;

use fxhash::FxHashMap;

use crate::{Dep, DepId, Subscriber, WeakDep};

/// Subscriber-side record of the deps read during evaluation.
///
/// A subscriber embeds this to implement [`Subscriber::add_dep`]: deps read
/// several times in one pass are subscribed once, and deps not read again
/// in the next pass are unsubscribed by [`swap`](Self::swap). Only weak
/// handles are kept, so deps may be dropped independently.
#[derive(Default)]
pub struct Dependencies {
	current: FxHashMap<DepId, WeakDep>,
	next: FxHashMap<DepId, WeakDep>,
}

impl Dependencies {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records `dep` for the running pass. Returns `true` if `sub` was
	/// subscribed to it as a result.
	pub fn add(&mut self, dep: &Dep, sub: &Weak<dyn Subscriber>) -> bool {
		let id = dep.id();
		if self.next.contains_key(&id) {
			return false;
		}

		self.next.insert(id, dep.downgrade());
		if self.current.contains_key(&id) {
			return false;
		}

		dep.add_sub(sub.clone());
		true
	}

	/// Ends a pass: unsubscribes from deps that were not read again and
	/// keeps the ones that were.
	pub fn swap(&mut self, sub: &Weak<dyn Subscriber>) {
		let next = std::mem::take(&mut self.next);
		let prev = std::mem::replace(&mut self.current, next);

		// Diff the keys
		prev.iter()
			.filter(|(id, _)| !self.current.contains_key(*id))
			.filter_map(|(_, dep)| dep.upgrade())
			.for_each(|dep| dep.remove_sub(sub));
	}

	/// Unsubscribes from everything, e.g. when the subscriber is torn down.
	pub fn clear(&mut self, sub: &Weak<dyn Subscriber>) {
		self.next.clear();
		for dep in self.current.drain().filter_map(|(_, dep)| dep.upgrade()) {
			dep.remove_sub(sub);
		}
	}

	pub fn contains(&self, id: DepId) -> bool {
		self.current.contains_key(&id)
	}

	pub fn len(&self) -> usize {
		self.current.len()
	}

	pub fn is_empty(&self) -> bool {
		self.current.is_empty()
	}

	/// Deps of the last completed pass that are still alive.
	pub fn deps(&self) -> impl Iterator<Item = Dep> + '_ {
		self.current.values().filter_map(WeakDep::upgrade)
	}
}
