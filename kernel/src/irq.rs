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

//! Hardware interrupt (IRQ) dispatch.
//!
//! The PIC delivers its sixteen lines on vectors `0x20..0x30`. This module
//! fans them out to per-line handlers and acknowledges the controller after
//! the handler returns.
//!
//! Handlers run through interrupt gates: interruptions are disabled for their
//! whole duration and nesting is not supported.

use crate::{
	arch::x86,
	arch::x86::{idt, idt::IntFrame, pic},
	int, println,
};

/// The number of IRQ lines.
pub const LINES_COUNT: usize = 16;

/// A hardware interrupt handler.
pub type IrqHandler = fn(&mut IntFrame);

/// Per-line handlers.
///
/// Registrations happen once at boot before interruptions are enabled (see
/// [`int::register_callback`] for the discipline).
static mut HANDLERS: [Option<IrqHandler>; LINES_COUNT] = [None; LINES_COUNT];

/// Registers the handler for the IRQ line `n` and unmasks the line.
pub fn register_handler(n: u8, handler: IrqHandler) {
	unsafe {
		HANDLERS[n as usize] = Some(handler);
	}
	pic::enable_irq(n);
}

/// Dispatches the IRQ held by `frame` to its line handler.
///
/// The PIC is acknowledged in every case, after the handler has run.
pub(crate) fn dispatch(frame: &mut IntFrame) {
	let irq = (frame.int as u8).wrapping_sub(idt::PIC_OFFSET);
	if let Some(handler) = unsafe { HANDLERS.get(irq as usize).copied().flatten() } {
		handler(frame);
	} else {
		println!("warning: unhandled IRQ {irq}, ignoring");
	}
	pic::end_of_interrupt(irq);
}

/// Finalizes interrupt setup and enables maskable interruptions.
///
/// This is the only place the kernel executes `sti` during boot; after this
/// call, handler tables are sealed.
pub(crate) fn init() {
	int::seal();
	x86::sti();
}
