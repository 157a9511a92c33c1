use std::rc::Rc;

use crate::{Runtime, Subscriber};

/// Scope of one evaluation on a [`Runtime`] stack.
///
/// Created by [`Runtime::track`]; pops the evaluator when dropped, also
/// while unwinding.
#[must_use]
pub struct Evaluation {
	runtime: Runtime,
}

impl Evaluation {
	pub(crate) fn new(runtime: Runtime, evaluator: Option<Rc<dyn Subscriber>>) -> Self {
		runtime.enter(evaluator);
		Evaluation { runtime }
	}
}

impl Drop for Evaluation {
	fn drop(&mut self) {
		self.runtime.exit();
	}
}
