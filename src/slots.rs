use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::addr::WeakAddr;
use crate::Subscriber;

/// Snapshot of live subscribers taken before dispatch.
pub(crate) type Snapshot = SmallVec<[Rc<dyn Subscriber>; 8]>;

/// Subscriber arena with index-stable tombstones.
///
/// Removal empties a slot in place; `compact` drops empty slots later.
#[derive(Default)]
pub(crate) struct Slots {
	slots: Vec<Option<WeakAddr<dyn Subscriber>>>,
	tombstones: usize,
}

impl Slots {
	pub fn new() -> Self {
		Slots {
			slots: Vec::new(),
			tombstones: 0,
		}
	}

	pub fn push(&mut self, sub: Weak<dyn Subscriber>) {
		self.slots.push(Some(WeakAddr::new(sub)));
	}

	/// Empties the first live slot holding `sub`. Returns whether one was found.
	pub fn tombstone(&mut self, sub: &Weak<dyn Subscriber>) -> bool {
		let found = self
			.slots
			.iter_mut()
			.find(|slot| matches!(slot, Some(addr) if addr.is(sub)));

		match found {
			Some(slot) => {
				*slot = None;
				self.tombstones += 1;
				true
			}
			None => false,
		}
	}

	/// Live subscribers in slot order.
	pub fn snapshot(&self) -> Snapshot {
		self.slots
			.iter()
			.flatten()
			.filter_map(|addr| addr.upgrade())
			.collect()
	}

	/// Drops tombstones and handles to dropped subscribers, keeping the
	/// relative order of the rest. Returns the number of slots reclaimed.
	pub fn compact(&mut self) -> usize {
		let before = self.slots.len();
		self.slots
			.retain(|slot| matches!(slot, Some(addr) if addr.strong_count() > 0));
		self.tombstones = 0;
		before - self.slots.len()
	}

	pub fn len(&self) -> usize {
		self.slots.len()
	}

	pub fn tombstones(&self) -> usize {
		self.tombstones
	}

	pub fn live(&self) -> usize {
		self.slots
			.iter()
			.flatten()
			.filter(|addr| addr.strong_count() > 0)
			.count()
	}

	pub fn contains(&self, sub: &Weak<dyn Subscriber>) -> bool {
		self.count(sub) > 0
	}

	pub fn count(&self, sub: &Weak<dyn Subscriber>) -> usize {
		self.slots.iter().flatten().filter(|addr| addr.is(sub)).count()
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

	fn nop(id: u64) -> Rc<dyn Subscriber> {
		Rc::new(Nop(SubscriberId::from(id)))
	}

	#[test]
	fn tombstone_keeps_indices() {
		let (a, b, c) = (nop(1), nop(2), nop(3));
		let mut slots = Slots::new();
		slots.push(Rc::downgrade(&a));
		slots.push(Rc::downgrade(&b));
		slots.push(Rc::downgrade(&c));

		assert!(slots.tombstone(&Rc::downgrade(&b)));
		assert_eq!(slots.len(), 3);
		assert_eq!(slots.tombstones(), 1);

		let ids: Vec<_> = slots.snapshot().iter().map(|s| s.id().get()).collect();
		assert_eq!(ids, vec![1, 3]);
	}

	#[test]
	fn tombstone_only_first_duplicate() {
		let a = nop(1);
		let mut slots = Slots::new();
		slots.push(Rc::downgrade(&a));
		slots.push(Rc::downgrade(&a));

		assert!(slots.tombstone(&Rc::downgrade(&a)));
		assert_eq!(slots.count(&Rc::downgrade(&a)), 1);
	}

	#[test]
	fn tombstone_missing_is_noop() {
		let (a, b) = (nop(1), nop(2));
		let mut slots = Slots::new();
		slots.push(Rc::downgrade(&a));

		assert!(!slots.tombstone(&Rc::downgrade(&b)));
		assert_eq!(slots.tombstones(), 0);
		assert_eq!(slots.live(), 1);
	}

	#[test]
	fn compact_preserves_order() {
		let subs: Vec<_> = (1..=5).map(nop).collect();
		let mut slots = Slots::new();
		for sub in &subs {
			slots.push(Rc::downgrade(sub));
		}
		slots.tombstone(&Rc::downgrade(&subs[0]));
		slots.tombstone(&Rc::downgrade(&subs[3]));

		assert_eq!(slots.compact(), 2);
		assert_eq!(slots.len(), 3);
		assert_eq!(slots.tombstones(), 0);

		let ids: Vec<_> = slots.snapshot().iter().map(|s| s.id().get()).collect();
		assert_eq!(ids, vec![2, 3, 5]);
	}

	#[test]
	fn dropped_subscribers_are_not_live() {
		let a = nop(1);
		let b = nop(2);
		let mut slots = Slots::new();
		slots.push(Rc::downgrade(&a));
		slots.push(Rc::downgrade(&b));
		drop(a);

		assert_eq!(slots.live(), 1);
		assert_eq!(slots.snapshot().len(), 1);
		assert_eq!(slots.compact(), 1);
	}
}
