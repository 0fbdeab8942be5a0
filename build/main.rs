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

//! Build script: reads the swap engine's TOML configuration and generates the `OUT_DIR` constant
//! files consumed through [`swapd::build_cfg`](../src/config.rs).

mod config;

use std::process::exit;

use config::Config;

fn main() {
	let config = Config::read().unwrap_or_else(|e| {
		eprintln!("Failed to read swap engine build configuration: {e}");
		exit(1);
	});
	config.generate().unwrap_or_else(|e| {
		eprintln!("Failed to generate swap engine build configuration: {e}");
		exit(1);
	});
}
