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

//! The six concrete scenarios and boundary behaviors of §8, run against the fakes of this module.

use alloc::vec::Vec;

use super::fakes::{FakeBlockDevice, FakeFrameAllocator, FakePageTable, FakeProcessTable};
use crate::{
	addr::{PAGE_SIZE, PhysAddr, Pte, USER, VirtAddr, WRITE},
	engine::SwapEngine,
	interfaces::ProcessHandle,
	slot::SlotIndex,
	victim::UserRange,
};

type TestEngine = SwapEngine<FakeBlockDevice, FakeFrameAllocator, FakePageTable, FakeProcessTable>;

fn new_engine(frames: &[PhysAddr]) -> TestEngine {
	SwapEngine::new(
		FakeBlockDevice::new(),
		FakeFrameAllocator::new(frames),
		FakePageTable::new(),
		FakeProcessTable::new(),
		UserRange {
			kernbase: VirtAddr(16 * PAGE_SIZE),
		},
	)
}

fn fill_pattern() -> [u8; PAGE_SIZE] {
	let mut data = [0u8; PAGE_SIZE];
	for (i, byte) in data.iter_mut().enumerate() {
		*byte = (i % 256) as u8;
	}
	data
}

/// Scenario 1: simple evict/restore.
#[test]
fn simple_evict_and_restore() {
	let frame = PhysAddr(0x4000);
	let engine = new_engine(&[]);
	let proc = engine.process_table.add(1, 1, 1);
	let va = VirtAddr(0x1000);
	let data = fill_pattern();
	engine.frame_alloc.write_frame(frame, &data);
	engine.page_table.map(1, va, frame, USER | WRITE).unwrap();

	engine.check_and_swap();

	assert_eq!(proc.rss(), 0);
	let pte = engine.page_table.walk(1, va).unwrap();
	assert!(!pte.is_present());
	assert_eq!(u32::from(pte.slot()), 0);
	assert!(engine.slots.is_allocated(SlotIndex::from(0)));

	engine.swap_in(&proc, va).unwrap();

	assert_eq!(proc.rss(), 1);
	assert!(!engine.slots.is_allocated(SlotIndex::from(0)));
	let pte = engine.page_table.walk(1, va).unwrap();
	assert!(pte.is_present());
	assert_eq!(engine.frame_alloc.read_frame(pte.frame()), data);
}

/// Scenario 2: adaptive growth across two triggers.
#[test]
fn adaptive_growth() {
	let engine = new_engine(&[]);
	// No live processes: check_and_swap still walks the controller math even though
	// swap_out_batch reclaims nothing.
	engine.check_and_swap();
	let state = engine.controller_state();
	assert_eq!(state.threshold, 90);
	assert_eq!(state.n_swap, 5);

	engine.check_and_swap();
	let state = engine.controller_state();
	assert_eq!(state.threshold, 81);
	assert_eq!(state.n_swap, 6);
}

/// Scenario 3: victim tie-break on smallest pid among equal rss.
#[test]
fn victim_tie_break() {
	let engine = new_engine(&[]);
	engine.process_table.add(7, 3, 7);
	engine.process_table.add(4, 5, 4);
	engine.process_table.add(9, 5, 9);

	let victim = crate::victim::select_victim_process(&engine.process_table);
	assert_eq!(victim, Some(4));
}

/// Scenario 4: fork duplication leaves parent and child referencing distinct slots with
/// identical content.
#[test]
fn fork_duplication() {
	let engine = new_engine(&[]);
	let parent = engine.process_table.add(1, 1, 1);
	let va = VirtAddr(0x2000);
	let frame = PhysAddr(0x8000);
	let data = fill_pattern();
	engine.frame_alloc.write_frame(frame, &data);
	engine.page_table.map(parent.pgdir(), va, frame, USER | WRITE).unwrap();
	engine.check_and_swap(); // evicts the only present page into slot 0

	let parent_slot = engine.page_table.walk(parent.pgdir(), va).unwrap().slot();
	assert!(engine.slots.is_allocated(parent_slot));

	let child_slot = engine.dup_slot(parent_slot).unwrap();
	assert_ne!(child_slot, parent_slot);
	assert!(engine.slots.is_allocated(parent_slot));
	assert!(engine.slots.is_allocated(child_slot));
	assert_eq!(
		engine.slots.read_perm(parent_slot).unwrap(),
		engine.slots.read_perm(child_slot).unwrap(),
	);
}

/// Scenario 5: exit cleanup frees exactly the slots referenced by the exiting process.
#[test]
fn exit_cleanup() {
	let engine = new_engine(&[]);
	let handle: u32 = 1;
	// First-fit allocation on a fresh table hands out 0, 1, 2 in order; each stands in for one
	// of the scenario's three swapped pages.
	let referenced: Vec<SlotIndex> = (0..3).map(|_| engine.slots.allocate().unwrap()).collect();
	let untouched = engine.slots.allocate().unwrap();
	for (i, &slot) in referenced.iter().enumerate() {
		let va = VirtAddr(i * PAGE_SIZE);
		engine.page_table.set_pte(handle, va, Pte::swapped(slot, USER | WRITE));
	}
	for &slot in &referenced {
		assert!(engine.slots.is_allocated(slot));
	}

	engine.swap_free_process(handle);

	for &slot in &referenced {
		assert!(!engine.slots.is_allocated(slot));
	}
	// Teardown only ever frees slots it finds referenced by a PTE in range; an unrelated
	// allocated slot is untouched.
	assert!(engine.slots.is_allocated(untouched));
}

/// Scenario 6: second-chance reset returns the lowest-VA page once every accessed bit is set.
#[test]
fn second_chance_reset() {
	let engine = new_engine(&[]);
	let handle: u32 = 1;
	for i in 0..4u32 {
		let va = VirtAddr(i as usize * PAGE_SIZE);
		let pte = Pte::present(PhysAddr(0x1000 * (i as usize + 1)), USER | WRITE);
		// Mark every page as accessed so the first pass finds nothing.
		let accessed = Pte(pte.0 | crate::addr::ACCESSED);
		engine.page_table.set_pte(handle, va, accessed);
	}

	let range = UserRange {
		kernbase: VirtAddr(16 * PAGE_SIZE),
	};
	let picked = crate::victim::select_victim_page(&engine.page_table, handle, &range);
	assert_eq!(picked.map(|(_, va)| va), Some(VirtAddr(0)));
	assert!(*engine.page_table.flush_count.lock() >= 1);
}

/// Boundary: all processes at rss == 0 yields no victim.
#[test]
fn no_victim_when_all_idle() {
	let engine = new_engine(&[]);
	engine.process_table.add(1, 0, 1);
	engine.process_table.add(2, 0, 2);
	assert_eq!(crate::victim::select_victim_process(&engine.process_table), None);
}

/// Boundary: `free_slot` is idempotent.
#[test]
fn free_slot_idempotent() {
	let engine = new_engine(&[]);
	let slot = engine.slots.allocate().unwrap();
	engine.slots.free(slot);
	engine.slots.free(slot);
	assert!(!engine.slots.is_allocated(slot));
}

/// Boundary: `swap_in` on an already-present PTE is a no-op, including for `rss`.
#[test]
fn swap_in_already_present_is_noop() {
	let engine = new_engine(&[PhysAddr(0x5000)]);
	let proc = engine.process_table.add(1, 1, 1);
	let va = VirtAddr(0x3000);
	let frame = engine.frame_alloc.alloc_frame().unwrap();
	engine.page_table.map(proc.pgdir(), va, frame, USER | WRITE).unwrap();

	engine.swap_in(&proc, va).unwrap();

	assert_eq!(proc.rss(), 1);
}

/// `PRESENT`/all-zero PTE is never mistaken for a swap reference during teardown.
#[test]
fn teardown_ignores_unmapped_and_present() {
	let engine = new_engine(&[PhysAddr(0x6000)]);
	let handle: u32 = 1;
	// VA 0 has no page-table entry at all; `walk` returns `None` and teardown skips it exactly
	// as it would an explicit all-zero PTE.
	let present_va = VirtAddr(PAGE_SIZE);
	let frame = engine.frame_alloc.alloc_frame().unwrap();
	engine.page_table.map(handle, present_va, frame, USER).unwrap();
	let swapped_va = VirtAddr(2 * PAGE_SIZE);
	let slot = engine.slots.allocate().unwrap();
	engine.page_table.set_pte(handle, swapped_va, Pte::swapped(slot, USER));

	engine.swap_free_process(handle);

	assert!(!engine.slots.is_allocated(slot));
	assert!(engine.page_table.walk(handle, present_va).unwrap().is_present());
}

#[test]
fn threshold_and_n_swap_stay_within_bounds() {
	let engine = new_engine(&[]);
	for _ in 0..50 {
		engine.check_and_swap();
	}
	let state = engine.controller_state();
	assert!(state.threshold >= 1);
	assert!(state.n_swap >= 1 && state.n_swap <= state.limit);
}

#[test]
fn rss_sum_matches_mapped_frames_after_batch_eviction() {
	let frames: Vec<PhysAddr> = Vec::new();
	let engine = new_engine(&frames);
	let proc = engine.process_table.add(1, 2, 1);
	for i in 0..2u32 {
		let va = VirtAddr(i as usize * PAGE_SIZE);
		let frame = PhysAddr(0x9000 + i as usize * PAGE_SIZE);
		engine.frame_alloc.write_frame(frame, &fill_pattern());
		engine.page_table.map(proc.pgdir(), va, frame, USER | WRITE).unwrap();
	}

	engine.check_and_swap();

	assert_eq!(proc.rss(), 0);
	for i in 0..2u32 {
		let va = VirtAddr(i as usize * PAGE_SIZE);
		assert!(!engine.page_table.walk(proc.pgdir(), va).unwrap().is_present());
	}
}
