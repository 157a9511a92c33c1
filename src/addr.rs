use std::ops::Deref;
use std::rc::Weak;

/// Non-owning subscriber handle compared by address.
///
/// Only the data pointer takes part in comparisons, so two handles to the
/// same allocation are equal even when their vtables differ.
pub struct WeakAddr<T: ?Sized> {
	ptr: Weak<T>,
}

impl<T: ?Sized> WeakAddr<T> {
	pub fn new(ptr: Weak<T>) -> Self {
		WeakAddr { ptr }
	}

	pub fn addr(&self) -> *const () {
		Weak::as_ptr(&self.ptr).cast::<()>()
	}

	pub fn is(&self, other: &Weak<T>) -> bool {
		self.addr() == Weak::as_ptr(other).cast::<()>()
	}
}

impl<T: ?Sized> Clone for WeakAddr<T> {
	fn clone(&self) -> Self {
		WeakAddr {
			ptr: self.ptr.clone(),
		}
	}
}

impl<T: ?Sized> Deref for WeakAddr<T> {
	type Target = Weak<T>;
	fn deref(&self) -> &Self::Target {
		&self.ptr
	}
}

impl<T: ?Sized> PartialEq for WeakAddr<T> {
	fn eq(&self, other: &Self) -> bool {
		self.addr() == other.addr()
	}
}

impl<T: ?Sized> Eq for WeakAddr<T> {}
