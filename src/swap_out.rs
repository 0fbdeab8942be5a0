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

//! The page-out path (C2): evicts one resident user page into a swap slot and rewrites its PTE.

use crate::{
	addr::{BLOCKS_PER_SLOT, PhysAddr, Pte, VirtAddr},
	errno::{SwapError, SwapResult},
	interfaces::{BlockDevice, FrameAllocator, PageTable},
	slot::{SlotIndex, SlotTable},
};

/// Translates a slot index to the first disk block of its region (§6: blocks `[2, 2 + 8N)`,
/// slot `i` at `[S0 + i*8, S0 + i*8 + 8)`).
pub fn slot_base_block(index: SlotIndex) -> u64 {
	const S0: u64 = 2;
	S0 + u64::from(u32::from(index)) * BLOCKS_PER_SLOT as u64
}

/// Moves the page at `(va, pa)` in `handle` to disk, per §4.2.
///
/// On success the PTE at `va` is rewritten to a non-present, slot-encoded entry and the TLB for
/// `handle` has been flushed. The caller remains responsible for releasing the frame `pa` back to
/// the physical allocator and decrementing the owning process's `rss` (§4.2 post-condition).
pub fn swap_out<BD: BlockDevice, FA: FrameAllocator, PT: PageTable>(
	slots: &SlotTable,
	block_device: &BD,
	frame_alloc: &FA,
	page_table: &PT,
	handle: PT::Handle,
	va: VirtAddr,
	pa: PhysAddr,
) -> SwapResult<()> {
	// 1. Allocate a slot.
	let slot = slots.allocate()?;
	// 2. Walk to the PTE without creating new tables; it must already be present.
	let pte = match page_table.walk(handle, va) {
		Some(pte) if pte.is_present() => pte,
		_ => {
			slots.free(slot);
			return Err(SwapError::PteMissing);
		}
	};
	// 3. Capture the low 12 bits into the slot's saved permissions.
	slots.write_perm(slot, pte.flags())?;
	// 4. Write the frame to disk, 8 blocks of BLOCK_SIZE bytes each.
	let data = frame_alloc.read_frame(pa);
	if let Err(e) = write_frame_to_slot(block_device, slot, &data) {
		slots.free(slot);
		return Err(e);
	}
	// 5. Only now rewrite the PTE: present bit clear, slot index in the high bits, old flags
	//    preserved minus PRESENT. No partial commit before this point.
	page_table.set_pte(handle, va, Pte::swapped(slot, pte.flags()));
	// 6. Invalidate the TLB for this address space.
	page_table.tlb_flush(handle);
	Ok(())
}

fn write_frame_to_slot<BD: BlockDevice>(
	block_device: &BD,
	slot: SlotIndex,
	data: &[u8; crate::addr::PAGE_SIZE],
) -> SwapResult<()> {
	let base = slot_base_block(slot);
	for k in 0..BLOCKS_PER_SLOT as u64 {
		let mut block = [0u8; crate::addr::BLOCK_SIZE];
		let off = (k as usize) * crate::addr::BLOCK_SIZE;
		block.copy_from_slice(&data[off..off + crate::addr::BLOCK_SIZE]);
		block_device.write(base + k, &block)?;
	}
	Ok(())
}
