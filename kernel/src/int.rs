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

//! Interrupt callback register interface.
//!
//! Every vector of the IDT can be routed to a callback registered here. IRQ
//! vectors are forwarded to the per-line dispatcher in `crate::irq`, which
//! also acknowledges the PIC.

use crate::{arch::x86::idt, arch::x86::idt::IntFrame, irq, panic, println};
use core::sync::atomic::{AtomicBool, Ordering::Relaxed};

/// The list of interrupt error messages ordered by index of the corresponding
/// interrupt vector.
pub(crate) static ERROR_MESSAGES: &[&str] = &[
	"Divide-by-zero Error",
	"Debug",
	"Non-maskable Interrupt",
	"Breakpoint",
	"Overflow",
	"Bound Range Exceeded",
	"Invalid Opcode",
	"Device Not Available",
	"Double Fault",
	"Coprocessor Segment Overrun",
	"Invalid TSS",
	"Segment Not Present",
	"Stack-Segment Fault",
	"General Protection Fault",
	"Page Fault",
	"Unknown",
	"x87 Floating-Point Exception",
	"Alignment Check",
	"Machine Check",
	"SIMD Floating-Point Exception",
	"Virtualization Exception",
	"Unknown",
	"Unknown",
	"Unknown",
	"Unknown",
	"Unknown",
	"Unknown",
	"Unknown",
	"Unknown",
	"Unknown",
	"Security Exception",
	"Unknown",
];

/// A callback to handle an interruption.
///
/// The callback receives the saved register file and may modify it; the
/// modified state is restored when the interrupt returns.
pub type Callback = fn(&mut IntFrame);

/// Callbacks for every vector of the IDT.
///
/// Registrations happen once at boot before interruptions are enabled, so the
/// table is not locked; the [`SEALED`] flag enforces the discipline.
static mut CALLBACKS: [Option<Callback>; idt::ENTRIES_COUNT] = [None; idt::ENTRIES_COUNT];

/// Set once interruptions have been enabled; registrations are refused
/// afterwards.
static SEALED: AtomicBool = AtomicBool::new(false);

/// Registers a callback for the interrupt vector `vec`.
///
/// A previous registration for the same vector is replaced.
///
/// # Panics
///
/// Panics if called after interruptions have been enabled: the table is only
/// written while the kernel is still single-flow.
pub fn register_callback(vec: usize, callback: Callback) {
	if SEALED.load(Relaxed) {
		panic!("interrupt callback registered after boot (vector {vec:#x})");
	}
	unsafe {
		CALLBACKS[vec] = Some(callback);
	}
}

/// Forbids further callback registrations.
///
/// Called right before interruptions are enabled for the first time.
pub(crate) fn seal() {
	SEALED.store(true, Relaxed);
}

/// Called by the assembly stubs whenever an interruption is triggered.
///
/// `frame` is the stack frame of the interruption, with registers saved.
#[no_mangle]
extern "C" fn interrupt_handler(frame: &mut IntFrame) {
	let id = frame.int as usize;
	// IRQs always fan out to the per-line handlers, which acknowledge the PIC
	if (0x20..0x30).contains(&id) {
		irq::dispatch(frame);
		return;
	}
	let callback = unsafe { CALLBACKS[id] };
	match callback {
		Some(callback) => callback(frame),
		// An unhandled exception is not recoverable
		None if id < ERROR_MESSAGES.len() => panic::with_frame(frame),
		None => println!("warning: unhandled interrupt {id:#x}, ignoring"),
	}
}
