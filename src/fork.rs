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

//! Fork-time slot duplication (C6): copies one parent swap slot into a fresh child slot.

use crate::{
	addr::{BLOCKS_PER_SLOT, PAGE_SIZE},
	controller,
	engine::SwapEngine,
	errno::{SwapError, SwapResult},
	interfaces::{BlockDevice, FrameAllocator, PageTable, ProcessHandle, ProcessTable},
	slot::SlotIndex,
	swap_out::slot_base_block,
};

/// Duplicates `parent_index` into a newly allocated child slot, per §4.6.
///
/// Called once per swapped PTE while copying a parent address space at fork time. Retries
/// allocation through the adaptive controller up to twice on [`SwapError::NoSlot`]. Leaves no
/// slot leaked: any freshly allocated child slot is freed before an error is returned.
pub fn dup_slot<BD, FA, PT, PTab>(
	engine: &SwapEngine<BD, FA, PT, PTab>,
	parent_index: SlotIndex,
) -> SwapResult<SlotIndex>
where
	BD: BlockDevice,
	FA: FrameAllocator,
	PT: PageTable,
	PTab: ProcessTable,
	PTab::Handle: ProcessHandle<PageTableHandle = PT::Handle>,
{
	if !engine.slots.is_allocated(parent_index) {
		return Err(SwapError::BadSlot(parent_index));
	}
	let mut attempts = 0u32;
	let child = loop {
		match engine.slots.allocate() {
			Ok(index) => break index,
			Err(SwapError::NoSlot) if attempts < 2 => {
				attempts += 1;
				controller::check_and_swap(engine);
			}
			Err(e) => return Err(e),
		}
	};
	if let Err(e) = copy_slot(engine, parent_index, child) {
		engine.slots.free(child);
		return Err(e);
	}
	Ok(child)
}

fn copy_slot<BD, FA, PT, PTab>(
	engine: &SwapEngine<BD, FA, PT, PTab>,
	parent_index: SlotIndex,
	child_index: SlotIndex,
) -> SwapResult<()>
where
	BD: BlockDevice,
	FA: FrameAllocator,
	PT: PageTable,
	PTab: ProcessTable,
	PTab::Handle: ProcessHandle<PageTableHandle = PT::Handle>,
{
	let perm = engine.slots.read_perm(parent_index)?;
	engine.slots.write_perm(child_index, perm)?;
	let parent_base = slot_base_block(parent_index);
	let child_base = slot_base_block(child_index);
	let mut page = [0u8; PAGE_SIZE];
	for k in 0..BLOCKS_PER_SLOT as u64 {
		let block = engine.block_device.acquire(parent_base + k)?;
		let off = (k as usize) * crate::addr::BLOCK_SIZE;
		page[off..off + crate::addr::BLOCK_SIZE].copy_from_slice(&block);
	}
	for k in 0..BLOCKS_PER_SLOT as u64 {
		let off = (k as usize) * crate::addr::BLOCK_SIZE;
		let mut block = [0u8; crate::addr::BLOCK_SIZE];
		block.copy_from_slice(&page[off..off + crate::addr::BLOCK_SIZE]);
		engine.block_device.write(child_base + k, &block)?;
	}
	Ok(())
}
