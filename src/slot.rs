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

//! The swap slot table (C1): a fixed-size array of on-disk page slots, allocated first-fit under
//! a single spinlock. Mirrors the shape of this codebase's own frame metadata tables (a flat
//! array of fixed-size records protected by one lock, e.g. the buddy allocator's zone
//! bookkeeping) rather than a heap-allocated free list.

use core::fmt;

use crate::{
	config::SLOT_COUNT,
	errno::{SwapError, SwapResult},
	sync::Spin,
};

/// Identifies one swap slot by its position in the table.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SlotIndex(u32);

impl From<u32> for SlotIndex {
	fn from(value: u32) -> Self {
		Self(value)
	}
}

impl From<SlotIndex> for u32 {
	fn from(value: SlotIndex) -> Self {
		value.0
	}
}

impl From<SlotIndex> for usize {
	fn from(value: SlotIndex) -> Self {
		value.0 as usize
	}
}

impl fmt::Display for SlotIndex {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// One entry of the slot table (§3).
#[derive(Clone, Copy, Debug, Default)]
struct Slot {
	/// The low 12 bits of the PTE captured at eviction time. Meaningless while free.
	page_perm: u32,
	/// Whether the slot currently holds the bytes of an evicted page.
	is_free: bool,
}

impl Slot {
	const fn new() -> Self {
		Self {
			page_perm: 0,
			is_free: true,
		}
	}
}

/// The fixed-size table of `N` = [`SLOT_COUNT`] swap slots (§3, §4.1).
pub struct SlotTable {
	slots: Spin<alloc::vec::Vec<Slot>>,
}

impl SlotTable {
	/// Creates a table of `SLOT_COUNT` slots, all initially free.
	pub fn new() -> Self {
		Self {
			slots: Spin::new(alloc::vec![Slot::new(); SLOT_COUNT]),
		}
	}

	/// The number of slots in the table.
	pub fn len(&self) -> usize {
		SLOT_COUNT
	}

	/// Scans for the first free slot, first-fit, and marks it allocated.
	///
	/// Fails with [`SwapError::NoSlot`] when the table is full. The whole scan-and-mark runs
	/// under the table's spinlock (§4.1): there is no window where two callers can observe and
	/// claim the same slot.
	pub fn allocate(&self) -> SwapResult<SlotIndex> {
		let mut slots = self.slots.lock();
		let found = slots.iter().position(|s| s.is_free);
		match found {
			Some(i) => {
				slots[i].is_free = false;
				slots[i].page_perm = 0;
				Ok(SlotIndex::from(i as u32))
			}
			None => Err(SwapError::NoSlot),
		}
	}

	/// Marks `index` free and clears its saved permissions.
	///
	/// A no-op if `index` is out of range (defensive against a corrupted PTE decode); idempotent
	/// if the slot is already free (§8).
	pub fn free(&self, index: SlotIndex) {
		let mut slots = self.slots.lock();
		if let Some(slot) = slots.get_mut(usize::from(index)) {
			slot.is_free = true;
			slot.page_perm = 0;
		}
	}

	/// Tells whether `index` names an in-range, currently allocated slot.
	pub fn is_allocated(&self, index: SlotIndex) -> bool {
		self.slots
			.lock()
			.get(usize::from(index))
			.is_some_and(|s| !s.is_free)
	}

	/// Reads the saved permission bits of an allocated slot.
	pub fn read_perm(&self, index: SlotIndex) -> SwapResult<u32> {
		let slots = self.slots.lock();
		let slot = slots.get(usize::from(index)).ok_or(SwapError::BadSlot(index))?;
		if slot.is_free {
			return Err(SwapError::BadSlot(index));
		}
		Ok(slot.page_perm)
	}

	/// Writes the saved permission bits of an allocated slot.
	pub fn write_perm(&self, index: SlotIndex, flags: u32) -> SwapResult<()> {
		let mut slots = self.slots.lock();
		let slot = slots.get_mut(usize::from(index)).ok_or(SwapError::BadSlot(index))?;
		if slot.is_free {
			return Err(SwapError::BadSlot(index));
		}
		slot.page_perm = flags;
		Ok(())
	}
}

impl Default for SlotTable {
	fn default() -> Self {
		Self::new()
	}
}
