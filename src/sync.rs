/*
 * Copyright 2024 Luc Lenôtre
 *
 * This file is part of Maestro.
 *
 * Maestro is free software: you can redistribute it and/or modify it under the
 * terms of the GNU General Public License as published by the Free Software
 * Foundation, either version 3 of the License, or (at your option) any later
 * version.
 *
 * Maestro is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR
 * A PARTICULAR PURPOSE. See the GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License along with
 * Maestro. If not, see <https://www.gnu.org/licenses/>.
 */

//! Mutual exclusion for the swap engine's shared state.
//!
//! The slot table, the process table scan, and the adaptive controller's state are all
//! documented (§5) as spinlock-guarded: none of them are ever held across a sleeping block-device
//! operation. This is a plain busy-wait spinlock in the same shape as this codebase's own
//! interrupt-masking spinlock, minus the interrupt masking itself: a host kernel embedding this
//! crate is expected to wrap [`Spin`] with its own interrupt discipline if its ISRs can contend
//! for the same lock.

use core::{
	cell::UnsafeCell,
	fmt,
	fmt::Formatter,
	hint,
	ops::{Deref, DerefMut},
	sync::atomic::{AtomicBool, Ordering::{Acquire, Release}},
};

/// Wraps a value which may be accessed by only one context at a time.
pub struct Spin<T: ?Sized> {
	locked: AtomicBool,
	data: UnsafeCell<T>,
}

impl<T> Spin<T> {
	/// Creates a new instance wrapping `data`.
	pub const fn new(data: T) -> Self {
		Self {
			locked: AtomicBool::new(false),
			data: UnsafeCell::new(data),
		}
	}
}

impl<T: ?Sized> Spin<T> {
	/// Acquires the spinlock, busy-waiting if it is already held.
	pub fn lock(&self) -> SpinGuard<'_, T> {
		while self.locked.swap(true, Acquire) {
			hint::spin_loop();
		}
		SpinGuard {
			spin: self,
		}
	}
}

unsafe impl<T: ?Sized + Send> Sync for Spin<T> {}
unsafe impl<T: ?Sized + Send> Send for Spin<T> {}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Spin<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&*self.lock(), f)
	}
}

/// Unlocks the associated [`Spin`] when dropped.
pub struct SpinGuard<'s, T: ?Sized> {
	spin: &'s Spin<T>,
}

impl<T: ?Sized> Deref for SpinGuard<'_, T> {
	type Target = T;

	fn deref(&self) -> &Self::Target {
		unsafe { &*self.spin.data.get() }
	}
}

impl<T: ?Sized> DerefMut for SpinGuard<'_, T> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		unsafe { &mut *self.spin.data.get() }
	}
}

impl<T: ?Sized> Drop for SpinGuard<'_, T> {
	fn drop(&mut self) {
		self.spin.locked.store(false, Release);
	}
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for SpinGuard<'_, T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(self.deref(), f)
	}
}
