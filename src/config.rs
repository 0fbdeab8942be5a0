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

//! Build-time configuration.
//!
//! `build.rs` reads `swap-config.toml` (falling back to `default.swap-config.toml`) and bakes
//! each tunable into its own generated file under `OUT_DIR`, the same convention this codebase's
//! own kernel build script uses for its debug/memory configuration section. [`build_cfg`] pulls
//! one such generated constant into scope.

/// Includes a build-generated config constant from `OUT_DIR`.
#[macro_export]
macro_rules! build_cfg {
	($config_name:ident) => {{
		include!(concat!(env!("OUT_DIR"), "/", stringify!($config_name), ".rs"))
	}};
}

/// Growth percentage applied to `n_swap` after a trigger (§4.5, §6).
pub const ALPHA: u32 = build_cfg!(alpha);
/// Shrink percentage applied to `threshold` after a trigger (§4.5, §6).
pub const BETA: u32 = build_cfg!(beta);
/// Initial free-frame low-watermark (§4.5).
pub const THRESHOLD_DEFAULT: u32 = build_cfg!(threshold);
/// Initial number of pages reclaimed per trigger (§4.5).
pub const N_SWAP_DEFAULT: u32 = build_cfg!(n_swap);
/// Upper bound on `n_swap` (§4.5).
pub const LIMIT_DEFAULT: u32 = build_cfg!(limit);
/// Number of swap slots in the table (§3, §6).
pub const SLOT_COUNT: usize = build_cfg!(slot_count);
