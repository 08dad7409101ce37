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

//! This module implements kernel panics handling.
//!
//! A kernel panic occurs when an error is raised that the kernel cannot
//! recover from. This is an undesirable state which requires to reboot the
//! host machine.

use crate::{
	arch::x86::{cli, idt::IntFrame},
	int::ERROR_MESSAGES,
	logger::LOGGER,
	memory::VirtAddr,
	power, println, register_get,
};
use core::{
	fmt,
	panic::{Location, PanicInfo},
};

fn panic_impl(msg: impl fmt::Display, loc: Option<&Location>, frame: Option<&IntFrame>) -> ! {
	cli();
	LOGGER.lock().silent = false;
	println!("-- KERNEL PANIC! --");
	if let Some(loc) = loc {
		println!("Reason: {msg} Location: {loc}");
	} else {
		println!("Reason: {msg}");
	}
	if let Some(frame) = frame {
		println!("{frame}");
		let cr2 = VirtAddr(register_get!("cr2"));
		let cr3 = VirtAddr(register_get!("cr3"));
		println!("CR2: {cr2:?} CR3: {cr3:?}");
	}
	println!("-- end trace --");
	power::halt();
}

/// Called on Rust panic.
#[panic_handler]
fn panic(panic_info: &PanicInfo) -> ! {
	panic_impl(panic_info.message(), panic_info.location(), None);
}

/// Panics with the information of an interrupt frame.
///
/// Used for CPU exceptions that no handler claimed.
pub fn with_frame(frame: &IntFrame) -> ! {
	let error = ERROR_MESSAGES.get(frame.int as usize).unwrap_or(&"Unknown");
	panic_impl(error, None, Some(frame));
}

#[lang = "eh_personality"]
fn eh_personality() {}
