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

//! The PIT (Programmable Interval Timer) fires IRQ 0 at a fixed rate, giving
//! the kernel its tick.

use crate::{arch::x86::idt::IntFrame, arch::x86::io::outb, irq};
use core::sync::atomic::{AtomicUsize, Ordering::Relaxed};

/// The PIT's channel 0 data port.
const CHANNEL_0_PORT: u16 = 0x40;
/// The PIT's command port.
const COMMAND_PORT: u16 = 0x43;

/// Command: channel 0, lobyte/hibyte access, rate generator mode.
const COMMAND_RATE_GENERATOR: u8 = 0x36;

/// The PIT's input clock frequency in Hz.
const BASE_FREQUENCY: u32 = 1193182;

/// The tick frequency programmed at boot, in Hz.
pub const TICK_FREQUENCY: u32 = 100;

/// The number of ticks since boot.
static TICKS: AtomicUsize = AtomicUsize::new(0);

/// The timer interrupt handler.
fn tick_handler(_frame: &mut IntFrame) {
	TICKS.fetch_add(1, Relaxed);
}

/// Returns the number of ticks since boot.
pub fn ticks() -> usize {
	TICKS.load(Relaxed)
}

/// Programs the PIT and registers the tick handler on IRQ 0.
pub(crate) fn init() {
	let divisor = (BASE_FREQUENCY / TICK_FREQUENCY) as u16;
	unsafe {
		outb(COMMAND_PORT, COMMAND_RATE_GENERATOR);
		outb(CHANNEL_0_PORT, (divisor & 0xff) as u8);
		outb(CHANNEL_0_PORT, (divisor >> 8) as u8);
	}
	irq::register_handler(0, tick_handler);
}
