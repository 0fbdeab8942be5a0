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

//! The adaptive controller (C5): the eager, low-watermark-triggered eviction policy described in
//! §4.5, plus its growth/shrink tuning.

use crate::{
	config::{ALPHA, BETA, LIMIT_DEFAULT, N_SWAP_DEFAULT, THRESHOLD_DEFAULT},
	engine::SwapEngine,
	interfaces::{BlockDevice, FrameAllocator, PageTable, ProcessHandle, ProcessTable},
	swap_println,
	victim::{find_process, select_victim_page, select_victim_process},
};

/// The controller's process-wide tunables (§3, §4.5). A single owned record guarded by the
/// engine's spinlock, not scattered globals (§9).
#[derive(Clone, Copy, Debug)]
pub struct ControllerState {
	/// Free-frame low-watermark: eviction triggers when `free_frame_count() <= threshold`.
	pub threshold: u32,
	/// Number of pages to reclaim on the next trigger.
	pub n_swap: u32,
	/// Percentage by which `n_swap` grows after a trigger.
	pub alpha: u32,
	/// Percentage by which `threshold` shrinks after a trigger.
	pub beta: u32,
	/// Upper bound on `n_swap`.
	pub limit: u32,
}

impl ControllerState {
	/// Builds the default controller state from the build-time configuration (§4.5, §6).
	pub fn from_build_config() -> Self {
		Self {
			threshold: THRESHOLD_DEFAULT,
			n_swap: N_SWAP_DEFAULT,
			alpha: ALPHA,
			beta: BETA,
			limit: LIMIT_DEFAULT,
		}
	}
}

impl Default for ControllerState {
	fn default() -> Self {
		Self::from_build_config()
	}
}

/// Runs one low-watermark check (§4.5).
///
/// A no-op, including with respect to the engine-wide "in reclaim" guard, if called while this
/// engine instance is already inside a `check_and_swap` call — this is what keeps the
/// allocator/engine cyclic dependency from recursing unboundedly (§9).
pub fn check_and_swap<BD, FA, PT, PTab>(engine: &SwapEngine<BD, FA, PT, PTab>)
where
	BD: BlockDevice,
	FA: FrameAllocator,
	PT: PageTable,
	PTab: ProcessTable,
	PTab::Handle: ProcessHandle<PageTableHandle = PT::Handle>,
{
	use core::sync::atomic::Ordering::{Acquire, Release};
	if engine.in_reclaim.swap(true, Acquire) {
		return;
	}
	run_check_and_swap(engine);
	engine.in_reclaim.store(false, Release);
}

fn run_check_and_swap<BD, FA, PT, PTab>(engine: &SwapEngine<BD, FA, PT, PTab>)
where
	BD: BlockDevice,
	FA: FrameAllocator,
	PT: PageTable,
	PTab: ProcessTable,
	PTab::Handle: ProcessHandle<PageTableHandle = PT::Handle>,
{
	// 1. Compute free frame count.
	let free = engine.frame_alloc.free_frame_count();
	let n_swap = {
		let state = engine.controller.lock();
		// 2. Nothing to do if there is headroom.
		if free > state.threshold as usize {
			return;
		}
		// 3. Diagnostic line.
		swap_println!("Current Threshold = {}, Swapping {} pages", state.threshold, state.n_swap);
		state.n_swap
		// lock released here, before any I/O in swap_out_batch (§5)
	};
	// 4. Reclaim.
	swap_out_batch(engine, n_swap);
	// 5./6. Shrink threshold, grow n_swap; both clamped.
	let mut state = engine.controller.lock();
	let shrink = (u64::from(state.threshold) * u64::from(state.beta) / 100) as u32;
	state.threshold = state.threshold.saturating_sub(shrink).max(1);
	let grow = (u64::from(state.n_swap) * u64::from(state.alpha) / 100) as u32;
	state.n_swap = (state.n_swap + grow).min(state.limit);
}

/// Reclaims up to `k` pages from a single victim process (§4.5).
///
/// Picks one victim process via [`select_victim_process`] and makes up to `2*k` page-selection
/// attempts against it, stopping early once `k` pages have been reclaimed or no further page can
/// be found. Returns the number of pages actually reclaimed.
pub fn swap_out_batch<BD, FA, PT, PTab>(engine: &SwapEngine<BD, FA, PT, PTab>, k: u32) -> u32
where
	BD: BlockDevice,
	FA: FrameAllocator,
	PT: PageTable,
	PTab: ProcessTable,
	PTab::Handle: ProcessHandle<PageTableHandle = PT::Handle>,
{
	let Some(pid) = select_victim_process(&engine.process_table) else {
		return 0;
	};
	let Some(proc) = find_process(&engine.process_table, pid) else {
		return 0;
	};
	let handle = proc.pgdir();
	let max_attempts = k.saturating_mul(2);
	let mut reclaimed = 0u32;
	for _ in 0..max_attempts {
		if reclaimed >= k {
			break;
		}
		let Some((pa, va)) = select_victim_page(&engine.page_table, handle, &engine.user_range) else {
			break;
		};
		let result = crate::swap_out::swap_out(
			&engine.slots,
			&engine.block_device,
			&engine.frame_alloc,
			&engine.page_table,
			handle,
			va,
			pa,
		);
		if result.is_ok() {
			engine.frame_alloc.free_frame(pa);
			proc.dec_rss();
			reclaimed += 1;
		}
	}
	reclaimed
}
