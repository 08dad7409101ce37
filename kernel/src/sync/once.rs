/*
 * Copyright 2025 ferrite contributors
 *
 * This file is part of ferrite.
 *
 * ferrite is free software: you can redistribute it and/or modify it under the
 * terms of the GNU General Public License as published by the Free Software
 * Foundation, either version 3 of the License, or (at your option) any later
 * version.
 *
 * ferrite is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR
 * A PARTICULAR PURPOSE. See the GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License along with
 * ferrite. If not, see <https://www.gnu.org/licenses/>.
 */

//! Once-initialized objects.

use core::{
	cell::UnsafeCell,
	mem::MaybeUninit,
	ops::Deref,
	sync::atomic::{AtomicBool, Ordering::Relaxed},
};

/// An object that is meant to be initialized once at boot, then accessed in
/// read-only.
///
/// The value **must** be initialized with `init` before calling `get`.
pub struct OnceInit<T> {
	/// Tells whether the object is initialized.
	init: AtomicBool,
	/// The object.
	val: UnsafeCell<MaybeUninit<T>>,
}

impl<T> OnceInit<T> {
	/// Creates a new instance waiting to be initialized.
	pub const fn new() -> Self {
		Self {
			init: AtomicBool::new(false),
			val: UnsafeCell::new(MaybeUninit::uninit()),
		}
	}

	/// Initializes with the given value.
	///
	/// # Panics
	///
	/// The structures guarded by this type are one-shot boot singletons:
	/// initializing twice is a kernel bug and panics.
	pub fn init(&self, val: T) -> &T {
		if self.init.swap(true, Relaxed) {
			panic!("boot singleton initialized twice");
		}
		unsafe {
			let inner = &mut *self.val.get();
			inner.write(val);
			inner.assume_init_ref()
		}
	}

	/// Returns the inner value.
	///
	/// # Panics
	///
	/// Panics if the object has not been initialized yet.
	pub fn get(&self) -> &T {
		if !self.init.load(Relaxed) {
			panic!("boot singleton accessed before initialization");
		}
		unsafe { (*self.val.get()).assume_init_ref() }
	}
}

impl<T> Deref for OnceInit<T> {
	type Target = T;

	fn deref(&self) -> &Self::Target {
		self.get()
	}
}

unsafe impl<T> Sync for OnceInit<T> {}
