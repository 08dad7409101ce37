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

//! The Integrated Drive Electronics (IDE) is a controller allowing to access
//! storage drives.
//!
//! A controller drives two channels (primary and secondary), each supporting
//! up to two drives (master and slave). Each channel has a command port range
//! and a control port, taken either from the PCI BARs or, for a channel in
//! compatibility mode, from the standardized legacy ports.

use crate::{
	arch::x86::io::{inb, iowait, outb},
	device::storage,
	device::storage::pata::PataDrive,
	println,
};
use utils::boxed::Box;

/// The beginning of the port range for the primary ATA bus (compatibility
/// mode).
const PRIMARY_ATA_BUS_PORT_BEGIN: u16 = 0x1f0;
/// The port for the primary disk's device control register (compatibility
/// mode).
const PRIMARY_DEVICE_CONTROL_PORT: u16 = 0x3f6;

/// The beginning of the port range for the secondary ATA bus (compatibility
/// mode).
const SECONDARY_ATA_BUS_PORT_BEGIN: u16 = 0x170;
/// The port for the secondary disk's device control register (compatibility
/// mode).
const SECONDARY_DEVICE_CONTROL_PORT: u16 = 0x376;

/// Control register bit: software reset.
const CONTROL_SRST: u8 = 1 << 2;
/// Control register bit: disable interrupts from the drive.
const CONTROL_NIEN: u8 = 1 << 1;

/// A channel on an IDE controller, with the I/O port bases used to reach its
/// drives.
#[derive(Clone, Copy, Debug)]
pub struct Channel {
	/// The base of the command port range.
	pub io_base: u16,
	/// The control port.
	pub ctrl_base: u16,
}

impl Channel {
	/// Decodes an I/O BAR: if bit 0 is set the low 16 bits (with the bottom
	/// two bits cleared) are the port base, otherwise the channel is in
	/// compatibility mode and `legacy` is used.
	fn port_from_bar(bar: u32, legacy: u16) -> u16 {
		if bar & 1 != 0 {
			(bar & 0xfffc) as u16
		} else {
			legacy
		}
	}

	/// Builds the channel from its two BARs, falling back to the legacy ports.
	fn new(command_bar: u32, control_bar: u32, secondary: bool) -> Self {
		let (legacy_io, legacy_ctrl) = if secondary {
			(SECONDARY_ATA_BUS_PORT_BEGIN, SECONDARY_DEVICE_CONTROL_PORT)
		} else {
			(PRIMARY_ATA_BUS_PORT_BEGIN, PRIMARY_DEVICE_CONTROL_PORT)
		};
		Self {
			io_base: Self::port_from_bar(command_bar, legacy_io),
			// The control port is at offset 2 of the control block
			ctrl_base: if control_bar & 1 != 0 {
				(control_bar & 0xfffc) as u16 + 2
			} else {
				legacy_ctrl
			},
		}
	}

	/// Resets both drives of the channel by pulsing the SRST bit.
	pub(super) fn soft_reset(&self) {
		unsafe {
			outb(self.ctrl_base, CONTROL_SRST | CONTROL_NIEN);
			for _ in 0..4 {
				iowait();
			}
			outb(self.ctrl_base, CONTROL_NIEN);
		}
		// Let the drives settle before selecting one
		for _ in 0..4 {
			unsafe {
				inb(self.ctrl_base);
			}
		}
	}
}

/// Called by the PCI scan for each IDE controller found.
///
/// Both channels are reset and probed; each responding ATA drive registers
/// itself with the block layer.
pub(crate) fn on_controller_found(
	bus: u8,
	device: u8,
	func: u8,
	prog_if: u8,
	bars: [u32; 6],
	interrupt_line: u8,
) {
	println!(
		"ide {bus:02x}:{device:02x}.{func}: controller prog-if {prog_if:#04x}, irq {interrupt_line}"
	);
	let channels = [
		Channel::new(bars[0], bars[1], false),
		Channel::new(bars[2], bars[3], true),
	];
	for (i, channel) in channels.iter().enumerate() {
		channel.soft_reset();
		for slave in [false, true] {
			let drive = match PataDrive::probe(*channel, slave) {
				Ok(Some(drive)) => drive,
				Ok(None) => continue,
				Err(e) => {
					println!(
						"ide {bus:02x}:{device:02x}.{func}: channel {i} drive {}: {e}",
						slave as u8
					);
					continue;
				}
			};
			println!(
				"ide {bus:02x}:{device:02x}.{func}: channel {i} drive {}: {} ({} sectors)",
				slave as u8,
				drive.model(),
				drive.total_sectors()
			);
			let Ok(interface) = Box::try_new(drive) else {
				println!("ide: out of memory while registering drive");
				continue;
			};
			if let Err(e) = storage::register(interface) {
				println!("ide: cannot register drive: {e}");
			}
		}
	}
}
