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

//! Process teardown (C7): frees every swap slot an exiting process still references.

use crate::{
	addr::{PAGE_SIZE, VirtAddr},
	interfaces::PageTable,
	slot::SlotTable,
	victim::UserRange,
};

/// Walks `handle`'s user address range and frees every slot referenced by a non-present,
/// non-zero PTE (§4.7). Must run before the process's page tables themselves are freed.
pub fn swap_free_process<PT: PageTable>(slots: &SlotTable, page_table: &PT, handle: PT::Handle, range: &UserRange) {
	let pages = range.kernbase.page_index();
	for index in 0..pages {
		let va = VirtAddr(index * PAGE_SIZE);
		let Some(pte) = page_table.walk(handle, va) else {
			continue;
		};
		if pte.is_unmapped() || pte.is_present() {
			continue;
		}
		slots.free(pte.slot());
	}
}
