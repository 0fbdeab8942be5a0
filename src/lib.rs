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

//! Demand-paging swap subsystem for a small teaching-style kernel.
//!
//! The engine ([`engine::SwapEngine`]) owns a fixed-size table of on-disk swap slots and
//! implements eviction, page-fault restoration, victim selection, an adaptive low-watermark
//! controller, fork-time slot duplication, and process teardown on top of four collaborator
//! traits ([`interfaces`]) a host kernel supplies. Everything else named in the original
//! subsystem — the physical frame allocator, block buffer cache, page-table walker, and process
//! table — stays external by design.
//!
//! `no_std` by default; the `std` feature (on by default for hosted builds and tests) additionally
//! enables a stderr-backed [`print::Console`] and `core::error::Error` on [`errno::SwapError`].

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod addr;
pub mod config;
pub mod controller;
pub mod engine;
pub mod errno;
pub mod fork;
pub mod interfaces;
pub mod print;
pub mod slot;
pub mod swap_in;
pub mod swap_out;
pub mod sync;
pub mod teardown;
pub mod victim;

pub use engine::SwapEngine;
pub use errno::{SwapError, SwapResult};

#[cfg(test)]
mod tests;
