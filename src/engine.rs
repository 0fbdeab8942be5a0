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

//! The swap engine: wires the slot table, controller state, and collaborator instances named in
//! §6 into the operations a host kernel calls.

use core::sync::atomic::AtomicBool;

use crate::{
	config::SLOT_COUNT,
	controller::{self, ControllerState},
	errno::SwapResult,
	fork,
	interfaces::{BlockDevice, FrameAllocator, PageTable, ProcessHandle, ProcessTable},
	slot::{SlotIndex, SlotTable},
	swap_in, swap_println,
	sync::Spin,
	teardown,
	victim::UserRange,
};

/// The swap engine, generic over its four collaborators (§4.8).
///
/// One instance is expected per kernel; all exported operations take `&self`, matching the
/// collaborator traits' own shared-reference, lock-internally shape.
pub struct SwapEngine<BD, FA, PT, PTab>
where
	BD: BlockDevice,
	FA: FrameAllocator,
	PT: PageTable,
	PTab: ProcessTable,
	PTab::Handle: ProcessHandle<PageTableHandle = PT::Handle>,
{
	pub(crate) slots: SlotTable,
	pub(crate) controller: Spin<ControllerState>,
	/// Guards against recursing back into [`Self::check_and_swap`] from within itself (§9).
	pub(crate) in_reclaim: AtomicBool,
	pub(crate) block_device: BD,
	pub(crate) frame_alloc: FA,
	pub(crate) page_table: PT,
	pub(crate) process_table: PTab,
	pub(crate) user_range: UserRange,
}

impl<BD, FA, PT, PTab> SwapEngine<BD, FA, PT, PTab>
where
	BD: BlockDevice,
	FA: FrameAllocator,
	PT: PageTable,
	PTab: ProcessTable,
	PTab::Handle: ProcessHandle<PageTableHandle = PT::Handle>,
{
	/// Builds an engine over the given collaborators, with default controller tunables (§4.5).
	pub fn new(block_device: BD, frame_alloc: FA, page_table: PT, process_table: PTab, user_range: UserRange) -> Self {
		Self {
			slots: SlotTable::new(),
			controller: Spin::new(ControllerState::from_build_config()),
			in_reclaim: AtomicBool::new(false),
			block_device,
			frame_alloc,
			page_table,
			process_table,
			user_range,
		}
	}

	/// Logs the boot diagnostic line (§6, §4.9). Call once at boot.
	pub fn swap_init(&self) {
		swap_println!("Swap area initialized with {} slots", SLOT_COUNT);
	}

	/// Runs one low-watermark eviction check (§4.5).
	pub fn check_and_swap(&self) {
		controller::check_and_swap(self);
	}

	/// Faults the page at `va` back into `proc`'s address space (§4.3).
	///
	/// Increments `proc`'s `rss` exactly when a page was actually faulted in (not on the benign
	/// already-present race, §4.3). On `NoFrame`, invokes the adaptive controller and retries the
	/// fault once before surfacing the error (§4.3 step 4, §7): the retry is what the `in_reclaim`
	/// guard exists for, since `check_and_swap` below is this same engine instance's.
	pub fn swap_in(&self, proc: &PTab::Handle, va: crate::addr::VirtAddr) -> SwapResult<()> {
		let handle = proc.pgdir();
		let attempt = |eng: &Self| {
			swap_in::swap_in(&eng.slots, &eng.block_device, &eng.frame_alloc, &eng.page_table, handle, va)
		};
		let serviced = match attempt(self) {
			Err(crate::errno::SwapError::NoFrame) => {
				controller::check_and_swap(self);
				attempt(self)?
			}
			result => result?,
		};
		if serviced {
			proc.inc_rss();
		}
		Ok(())
	}

	/// Duplicates a parent's swap slot into a new child slot at fork time (§4.6).
	pub fn dup_slot(&self, parent_index: SlotIndex) -> SwapResult<SlotIndex> {
		fork::dup_slot(self, parent_index)
	}

	/// Frees every slot an exiting process still references (§4.7). Call before its page tables
	/// are freed.
	pub fn swap_free_process(&self, handle: PT::Handle) {
		teardown::swap_free_process(&self.slots, &self.page_table, handle, &self.user_range);
	}

	/// A read-only snapshot of the controller's tunables, for diagnostics and tests.
	pub fn controller_state(&self) -> ControllerState {
		*self.controller.lock()
	}
}
