use std::cell::RefCell;
use std::rc::Weak;

use crate::dep::DepBody;

/// Deps holding tombstoned slots, compacted together on flush.
///
/// A dep enqueues itself at most once; its `cleanup_pending` flag guards
/// the push.
#[derive(Default)]
pub(crate) struct CleanupQueue {
	pending: RefCell<Vec<Weak<DepBody>>>,
}

impl CleanupQueue {
	pub fn push(&self, dep: Weak<DepBody>) {
		self.pending.borrow_mut().push(dep);
	}

	pub fn len(&self) -> usize {
		self.pending.borrow().len()
	}

	pub fn flush(&self) {
		let pending = std::mem::take(&mut *self.pending.borrow_mut());
		if pending.is_empty() {
			return;
		}

		let mut compacted = 0;
		let mut reclaimed = 0;
		for dep in pending {
			// deps dropped since removal have nothing left to compact
			if let Some(dep) = dep.upgrade() {
				reclaimed += dep.compact();
				compacted += 1;
			}
		}

		tracing::debug!(compacted, reclaimed, "flushed subscriber cleanup");
	}
}
