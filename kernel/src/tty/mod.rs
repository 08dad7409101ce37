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

//! The text console on top of the VGA text buffer.
//!
//! The console tracks a cursor position, scrolls the screen when the bottom
//! line overflows and keeps the hardware cursor in step.

pub mod vga;

use crate::sync::spin::IntSpin;

/// The size of a tabulation in space-equivalent.
const TAB_SIZE: usize = 4;

/// The kernel's console.
pub static TTY: IntSpin<Tty> = IntSpin::new(Tty::new());

/// Structure representing the text console.
pub struct Tty {
	/// The X position of the cursor.
	cursor_x: usize,
	/// The Y position of the cursor.
	cursor_y: usize,
	/// The attribute applied to written characters.
	attr: u8,
}

impl Tty {
	/// Creates a new instance.
	pub const fn new() -> Self {
		Self {
			cursor_x: 0,
			cursor_y: 0,
			attr: vga::ATTR_DEFAULT,
		}
	}

	/// Clears the screen and resets the cursor.
	pub fn clear(&mut self) {
		for y in 0..vga::HEIGHT {
			vga::clear_row(y, self.attr);
		}
		self.cursor_x = 0;
		self.cursor_y = 0;
		vga::set_cursor(0, 0);
	}

	/// Scrolls the screen up by one line.
	fn scroll(&mut self) {
		for y in 1..vga::HEIGHT {
			vga::copy_row(y - 1, y);
		}
		vga::clear_row(vga::HEIGHT - 1, self.attr);
		self.cursor_y -= 1;
	}

	/// Moves the cursor forward, wrapping and scrolling when needed.
	fn cursor_forward(&mut self) {
		self.cursor_x += 1;
		if self.cursor_x >= vga::WIDTH {
			self.newline();
		}
	}

	/// Moves the cursor to the beginning of the next line.
	fn newline(&mut self) {
		self.cursor_x = 0;
		self.cursor_y += 1;
		if self.cursor_y >= vga::HEIGHT {
			self.scroll();
		}
	}

	/// Writes a single character at the cursor.
	pub fn putchar(&mut self, c: u8) {
		match c {
			b'\n' => self.newline(),
			b'\r' => self.cursor_x = 0,
			b'\t' => {
				let n = TAB_SIZE - (self.cursor_x % TAB_SIZE);
				for _ in 0..n {
					self.putchar(b' ');
				}
				return;
			}
			0x08 => {
				// Backspace
				if self.cursor_x > 0 {
					self.cursor_x -= 1;
					vga::write_cell(self.cursor_x, self.cursor_y, b' ', self.attr);
				}
			}
			c => {
				vga::write_cell(self.cursor_x, self.cursor_y, c, self.attr);
				self.cursor_forward();
			}
		}
		vga::set_cursor(self.cursor_x, self.cursor_y);
	}

	/// Writes the given buffer to the console.
	pub fn write(&mut self, buf: &[u8]) {
		for b in buf {
			self.putchar(*b);
		}
	}
}

/// Initializes the console.
pub(crate) fn init() {
	TTY.lock().clear();
}
