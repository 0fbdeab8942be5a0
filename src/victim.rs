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

//! Victim selection (C4): choosing which process to evict from, and which of its pages.

use crate::{
	addr::VirtAddr,
	interfaces::{PageTable, Pid, ProcessHandle, ProcessTable},
};

/// The userspace virtual-address range scanned by page selection (§4.4): `[0, KERNBASE)`. Tests
/// and hosts configure `kernbase`; there is no fixed platform constant in this crate.
pub struct UserRange {
	pub kernbase: VirtAddr,
}

/// Picks the process with the largest `rss`, tie-breaking on the smallest `pid` (§4.4).
///
/// Returns `None` if every live process has `rss == 0` (nothing to swap) or if there are no live
/// processes at all.
pub fn select_victim_process<PTab: ProcessTable>(processes: &PTab) -> Option<Pid> {
	let mut best: Option<(usize, Pid)> = None;
	processes.for_each(&mut |proc| {
		use crate::interfaces::ProcState;
		if proc.state() == ProcState::Unused {
			return;
		}
		let rss = proc.rss();
		let pid = proc.pid();
		if pid < 1 {
			return;
		}
		best = Some(match best {
			None => (rss, pid),
			Some((best_rss, best_pid)) => {
				if rss > best_rss || (rss == best_rss && pid < best_pid) {
					(rss, pid)
				} else {
					(best_rss, best_pid)
				}
			}
		});
	});
	match best {
		Some((rss, pid)) if rss > 0 => Some(pid),
		_ => None,
	}
}

/// Selects one page to evict from `handle`'s address space using the two-pass approximated-LRU
/// (second-chance/clock) policy of §4.4.
///
/// Returns `(physical_address, virtual_address)` of the chosen page, or `None` if the process has
/// no present user pages at all. "No page found" is always this explicit `None`, never a sentinel
/// physical address (§9).
pub fn select_victim_page<PT: PageTable>(
	page_table: &PT,
	handle: PT::Handle,
	range: &UserRange,
) -> Option<(crate::addr::PhysAddr, VirtAddr)> {
	let pages = range.kernbase.page_index();
	// First pass: first present, user, accessed-bit-clear page.
	for index in 0..pages {
		let va = VirtAddr(index * crate::addr::PAGE_SIZE);
		if let Some(pte) = page_table.walk(handle, va) {
			if pte.is_present() && pte.is_user() && !pte.is_accessed() {
				return Some((pte.frame(), va));
			}
		}
	}
	// No candidate: give every present user page a second chance by clearing its accessed bit,
	// then scan again. If there is no present user page at all, there is nothing to evict.
	let mut any_present = false;
	for index in 0..pages {
		let va = VirtAddr(index * crate::addr::PAGE_SIZE);
		if let Some(pte) = page_table.walk(handle, va) {
			if pte.is_present() && pte.is_user() {
				any_present = true;
				page_table.set_pte(handle, va, pte.with_accessed_cleared());
			}
		}
	}
	if !any_present {
		return None;
	}
	page_table.tlb_flush(handle);
	for index in 0..pages {
		let va = VirtAddr(index * crate::addr::PAGE_SIZE);
		if let Some(pte) = page_table.walk(handle, va) {
			if pte.is_present() && pte.is_user() {
				return Some((pte.frame(), va));
			}
		}
	}
	None
}

/// Looks up a process handle by pid via a linear scan under the table's lock.
///
/// Exposed for the controller (C5), which selects a victim pid and then needs its handle to read
/// and mutate `rss`.
pub fn find_process<PTab: ProcessTable>(processes: &PTab, pid: Pid) -> Option<PTab::Handle> {
	let mut found = None;
	processes.for_each(&mut |proc| {
		if proc.pid() == pid {
			found = Some(proc.clone());
		}
	});
	found
}
