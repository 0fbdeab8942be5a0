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

//! Error taxonomy for the swap engine.
//!
//! The original engine returns a binary OK/ERR from every entry point. Here each operation
//! returns a [`SwapResult`], a `Result` whose error side is the closed set of kinds the engine
//! can actually produce.

use core::fmt;

use crate::slot::SlotIndex;

/// An error produced by the swap engine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SwapError {
	/// The slot table is exhausted.
	NoSlot,
	/// The physical allocator has no free frame.
	NoFrame,
	/// A page-table walk found no entry where one was expected.
	PteMissing,
	/// A PTE was in a state the caller did not expect (e.g. already present).
	PteState,
	/// A block I/O operation on the swap region failed.
	IoFail,
	/// The slot index decoded from a PTE or supplied by a caller is out of range or not
	/// currently allocated.
	BadSlot(SlotIndex),
}

impl fmt::Display for SwapError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::NoSlot => write!(f, "swap slot table exhausted"),
			Self::NoFrame => write!(f, "no free physical frame"),
			Self::PteMissing => write!(f, "page table walk returned no entry"),
			Self::PteState => write!(f, "page table entry in unexpected state"),
			Self::IoFail => write!(f, "swap block I/O failure"),
			Self::BadSlot(i) => write!(f, "invalid or unallocated swap slot {i}"),
		}
	}
}

#[cfg(feature = "std")]
impl std::error::Error for SwapError {}

/// Result type returned by every engine entry point.
pub type SwapResult<T> = Result<T, SwapError>;
