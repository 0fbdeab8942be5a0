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

//! The TOML configuration file read by the build script, in the same shape as this codebase's
//! own `build/config.rs`: a `serde`-derived struct, read with `toml`, turned into generated
//! `OUT_DIR` const files.

use std::{fs, io, io::Write, path::Path};

use serde::Deserialize;

/// The swap engine's build-time configuration.
#[derive(Deserialize)]
pub struct Config {
	alpha: u32,
	beta: u32,
	threshold: u32,
	n_swap: u32,
	limit: u32,
	slot_count: usize,
}

/// Generates a single `{name}.rs` file in `OUT_DIR` containing `value` as a Rust literal.
macro_rules! generate_const_file {
	($out_dir:expr, $name:literal, $value:expr) => {{
		let dest = Path::new($out_dir).join(concat!($name, ".rs"));
		let mut file = fs::File::create(&dest)?;
		write!(file, "{}", $value)?;
	}};
}

impl Config {
	/// Reads the configuration file, preferring `swap-config.toml` over the checked-in default.
	pub fn read() -> io::Result<Self> {
		const FILE_DEFAULT: &str = "default.swap-config.toml";
		const FILE: &str = "swap-config.toml";

		println!("cargo:rerun-if-changed={FILE_DEFAULT}");
		println!("cargo:rerun-if-changed={FILE}");

		let config_str = match fs::read_to_string(FILE) {
			Ok(s) => s,
			Err(e) if e.kind() == io::ErrorKind::NotFound => fs::read_to_string(FILE_DEFAULT)?,
			Err(e) => return Err(e),
		};
		toml::from_str(&config_str).map_err(|e| io::Error::other(e.to_string()))
	}

	/// Writes each tunable as a generated const file under `OUT_DIR`.
	pub fn generate(&self) -> io::Result<()> {
		let out_dir = std::env::var("OUT_DIR").map_err(io::Error::other)?;
		generate_const_file!(&out_dir, "alpha", self.alpha);
		generate_const_file!(&out_dir, "beta", self.beta);
		generate_const_file!(&out_dir, "threshold", self.threshold);
		generate_const_file!(&out_dir, "n_swap", self.n_swap);
		generate_const_file!(&out_dir, "limit", self.limit);
		generate_const_file!(&out_dir, "slot_count", self.slot_count);
		Ok(())
	}
}
