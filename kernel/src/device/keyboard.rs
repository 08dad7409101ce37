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

//! PS/2 keyboard driver.
//!
//! The driver listens on IRQ 1, reads scancodes from the controller's data
//! port and maps set 1 make codes through a flat UK layout table. Break codes
//! and extended sequences are ignored.

use crate::{arch::x86::idt::IntFrame, arch::x86::io::inb, irq, print};

/// The PS/2 controller's data port.
const DATA_PORT: u16 = 0x60;

/// The IRQ line of the keyboard.
const KEYBOARD_IRQ: u8 = 1;

/// Flat UK layout for set 1 make codes below `0x60`.
///
/// A zero entry means the key produces no character.
static KEYMAP_UK: [u8; 0x60] = [
	0, 0x1b, b'1', b'2', b'3', b'4', b'5', b'6', // 0x00
	b'7', b'8', b'9', b'0', b'-', b'=', 0x08, b'\t', // 0x08
	b'q', b'w', b'e', b'r', b't', b'y', b'u', b'i', // 0x10
	b'o', b'p', b'[', b']', b'\n', 0, b'a', b's', // 0x18
	b'd', b'f', b'g', b'h', b'j', b'k', b'l', b';', // 0x20
	b'\'', b'`', 0, b'#', b'z', b'x', b'c', b'v', // 0x28
	b'b', b'n', b'm', b',', b'.', b'/', 0, b'*', // 0x30
	0, b' ', 0, 0, 0, 0, 0, 0, // 0x38
	0, 0, 0, 0, 0, 0, 0, b'7', // 0x40
	b'8', b'9', b'-', b'4', b'5', b'6', b'+', b'1', // 0x48
	b'2', b'3', b'0', b'.', 0, 0, b'\\', 0, // 0x50
	0, 0, 0, 0, 0, 0, 0, 0, // 0x58
];

/// The keyboard interrupt handler.
///
/// The scancode must be read even if it is discarded, otherwise the
/// controller stops raising interrupts.
fn keyboard_handler(_frame: &mut IntFrame) {
	let scancode = unsafe { inb(DATA_PORT) };
	if scancode >= 0x60 {
		return;
	}
	let c = KEYMAP_UK[scancode as usize];
	if c != 0 {
		print!("{}", c as char);
	}
}

/// Registers the keyboard interrupt handler.
pub(crate) fn init() {
	irq::register_handler(KEYBOARD_IRQ, keyboard_handler);
}
