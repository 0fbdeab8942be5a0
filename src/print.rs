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

//! Diagnostic output for the swap engine.
//!
//! The engine logs exactly two kinds of line (§6): one at [`crate::swap_init`] and one at each
//! controller trigger. Output is routed through a single locked [`Console`] sink, mirroring how
//! this codebase funnels all kernel output through one logger behind a lock rather than writing
//! to a device directly — the host kernel supplies the sink; this crate never touches a VGA
//! buffer or serial port itself.

use core::fmt;

use crate::sync::Spin;

/// A destination for the engine's diagnostic lines.
///
/// A host kernel implements this over its own console/log buffer. The `std`-gated default
/// forwards to standard error, which is adequate for tests and for hosted (non-`no_std`) uses of
/// this crate.
pub trait Console: Send {
	/// Writes a formatted line (without a trailing newline; the caller's macro appends one).
	fn write_line(&mut self, args: fmt::Arguments<'_>);
}

#[cfg(feature = "std")]
struct StderrConsole;

#[cfg(feature = "std")]
impl Console for StderrConsole {
	fn write_line(&mut self, args: fmt::Arguments<'_>) {
		eprintln!("{args}");
	}
}

/// A console that discards everything; useful for tests that don't care about diagnostics.
pub struct NullConsole;

impl Console for NullConsole {
	fn write_line(&mut self, _args: fmt::Arguments<'_>) {}
}

static CONSOLE: Spin<Option<alloc::boxed::Box<dyn Console>>> = Spin::new(None);

/// Installs the console sink used by [`swap_println`]. Call once at boot; later calls replace the
/// sink.
pub fn set_console(console: alloc::boxed::Box<dyn Console>) {
	*CONSOLE.lock() = Some(console);
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments<'_>) {
	let mut guard = CONSOLE.lock();
	match guard.as_mut() {
		Some(console) => console.write_line(args),
		#[cfg(feature = "std")]
		None => StderrConsole.write_line(args),
		#[cfg(not(feature = "std"))]
		None => {}
	}
}

/// Prints a diagnostic line through the installed [`Console`].
#[macro_export]
macro_rules! swap_println {
	($($arg:tt)*) => {{
		$crate::print::_print(format_args!($($arg)*));
	}};
}
