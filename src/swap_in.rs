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

//! The page-in path (C3): on a page fault for a swapped PTE, allocates a frame, reads the slot
//! back, and restores the mapping.

use crate::{
	addr::{BLOCKS_PER_SLOT, PAGE_SIZE, PRESENT, VirtAddr},
	errno::{SwapError, SwapResult},
	interfaces::{BlockDevice, FrameAllocator, PageTable},
	slot::SlotTable,
	swap_out::slot_base_block,
};

/// Faults the page at `va` in `handle` back into memory, per §4.3.
///
/// Returns `Ok(true)` if a page was actually faulted in, or `Ok(false)` if the PTE was already
/// present (the benign race described in §4.3) — callers use this to decide whether to increment
/// the owning process's `rss` exactly once per fault serviced.
pub fn swap_in<BD: BlockDevice, FA: FrameAllocator, PT: PageTable>(
	slots: &SlotTable,
	block_device: &BD,
	frame_alloc: &FA,
	page_table: &PT,
	handle: PT::Handle,
	va: VirtAddr,
) -> SwapResult<bool> {
	// 1. Round down to the page boundary.
	let va = va.page_round_down();
	// 2. Walk the PTE.
	let pte = page_table.walk(handle, va).ok_or(SwapError::PteMissing)?;
	if pte.is_present() {
		// Benign race: another thread already faulted this page in.
		return Ok(false);
	}
	if pte.is_unmapped() {
		return Err(SwapError::PteState);
	}
	// 3. Decode and validate the slot.
	let slot = pte.slot();
	if !slots.is_allocated(slot) {
		return Err(SwapError::BadSlot(slot));
	}
	// 4. Allocate a physical frame.
	let Some(frame) = frame_alloc.alloc_frame() else {
		return Err(SwapError::NoFrame);
	};
	// 5. Read the slot's 8 blocks into the frame.
	if let Err(e) = read_slot_into_frame(block_device, slot, frame_alloc, frame) {
		frame_alloc.free_frame(frame);
		return Err(e);
	}
	// 6. Reconstruct protection and install the mapping.
	let saved_perm = pte.flags();
	if let Err(e) = page_table.map(handle, va, frame, saved_perm | PRESENT) {
		frame_alloc.free_frame(frame);
		return Err(e);
	}
	// 7. Free the slot.
	slots.free(slot);
	Ok(true)
}

fn read_slot_into_frame<BD: BlockDevice, FA: FrameAllocator>(
	block_device: &BD,
	slot: crate::slot::SlotIndex,
	frame_alloc: &FA,
	frame: crate::addr::PhysAddr,
) -> SwapResult<()> {
	let base = slot_base_block(slot);
	let mut data = [0u8; PAGE_SIZE];
	for k in 0..BLOCKS_PER_SLOT as u64 {
		let block = block_device.acquire(base + k)?;
		let off = (k as usize) * crate::addr::BLOCK_SIZE;
		data[off..off + crate::addr::BLOCK_SIZE].copy_from_slice(&block);
	}
	frame_alloc.write_frame(frame, &data);
	Ok(())
}
