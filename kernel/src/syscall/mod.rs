/*
 * Copyright 2025 ferrite contributors
 *
 * This file is part of ferrite.
 *
 * ferrite is free software: you can redistribute it and/or modify it under the
 * terms of the GNU General Public License as published by the Free Software
 * Foundation, either version 3 of the License, or (at your option) any later
 * version.
 *
 * ferrite is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR
 * A PARTICULAR PURPOSE. See the GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License along with
 * ferrite. If not, see <https://www.gnu.org/licenses/>.
 */

//! A system call is a "function" that allows to communicate between userspace
//! and kernelspace.
//!
//! User code raises `INT 0x80` with the call number in `eax` and up to five
//! arguments in `ebx`, `ecx`, `edx`, `esi` and `edi`. The result is returned
//! in `eax`; `(u32)-1` reports a failure, including out-of-range or
//! unregistered call numbers.

mod getdents;
mod write;

use crate::{arch::x86::idt::IntFrame, int, println};

/// The value returned in `eax` on failure.
pub const ERROR_RETURN: u32 = u32::MAX;

/// The number of slots in the system call table.
pub const SYSCALLS_MAX: usize = 512;

/// System call number of `write`.
pub const SYS_WRITE: usize = 4;
/// System call number of `getdents`.
pub const SYS_GETDENTS: usize = 141;

/// A system call handler.
///
/// The five arguments come from `ebx`, `ecx`, `edx`, `esi` and `edi`, in that
/// order; the return value goes back in `eax`.
pub type Handler = fn(u32, u32, u32, u32, u32) -> u32;

/// A registered system call.
#[derive(Clone, Copy)]
struct Entry {
	/// The handler.
	handler: Handler,
	/// The name, for logging.
	name: &'static str,
}

/// The system call table.
///
/// Filled once at boot; see `int::register_callback` for the discipline.
static mut SYSCALLS: [Option<Entry>; SYSCALLS_MAX] = [None; SYSCALLS_MAX];

/// Registers the handler for the system call `number`.
///
/// Returns `false` if the number is out of range.
pub fn register(number: usize, handler: Handler, name: &'static str) -> bool {
	if number >= SYSCALLS_MAX {
		return false;
	}
	unsafe {
		SYSCALLS[number] = Some(Entry {
			handler,
			name,
		});
	}
	true
}

/// The `INT 0x80` dispatcher.
///
/// Reads the call number from `eax`, runs the registered handler and writes
/// the result back into the frame's `eax`.
fn syscall_handler(frame: &mut IntFrame) {
	let number = frame.get_syscall_id();
	let entry = if number < SYSCALLS_MAX {
		unsafe { SYSCALLS[number] }
	} else {
		None
	};
	let Some(entry) = entry else {
		frame.eax = ERROR_RETURN;
		return;
	};
	frame.eax = (entry.handler)(
		frame.get_syscall_arg(0),
		frame.get_syscall_arg(1),
		frame.get_syscall_arg(2),
		frame.get_syscall_arg(3),
		frame.get_syscall_arg(4),
	);
}

/// Installs the system call dispatcher and the default handlers.
pub(crate) fn init() {
	int::register_callback(0x80, syscall_handler);
	register(SYS_WRITE, write::sys_write, "write");
	register(SYS_GETDENTS, getdents::sys_getdents, "getdents");
	println!("syscall: vector 0x80 ready, {SYSCALLS_MAX} slots");
}

#[cfg(test)]
mod test {
	use super::*;

	fn nop_handler(a: u32, _: u32, _: u32, _: u32, _: u32) -> u32 {
		a
	}

	#[test_case]
	fn register_out_of_range() {
		assert!(!register(SYSCALLS_MAX, nop_handler, "nop"));
		assert!(register(SYSCALLS_MAX - 1, nop_handler, "nop"));
		unsafe {
			SYSCALLS[SYSCALLS_MAX - 1] = None;
		}
	}

	#[test_case]
	fn dispatch_unregistered() {
		let mut frame = IntFrame {
			eax: 511,
			..Default::default()
		};
		syscall_handler(&mut frame);
		assert_eq!(frame.eax, ERROR_RETURN);
	}

	#[test_case]
	fn dispatch_out_of_range() {
		let mut frame = IntFrame {
			eax: SYSCALLS_MAX as u32,
			..Default::default()
		};
		syscall_handler(&mut frame);
		assert_eq!(frame.eax, ERROR_RETURN);
	}
}
