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

//! The block layer.
//!
//! Every storage drive is registered here as a named block device (`hd0`,
//! `hd1`, ...) offering a polymorphic sector-read operation. The registry is
//! a fixed-size table filled once at boot.

pub mod ide;
pub mod partition;
pub mod pata;

use crate::{dev_name, device::DevName, println, sync::spin::IntSpin};
use utils::{boxed::Box, errno, errno::EResult};

/// The maximum number of registered block devices.
pub const DEVICES_MAX: usize = 16;

/// Operations offered by a storage drive.
pub trait StorageInterface: Send {
	/// Returns the size of a sector in bytes.
	fn sector_size(&self) -> u32;

	/// Returns the number of sectors on the drive.
	fn sector_count(&self) -> u64;

	/// Reads `buf.len() / sector_size` sectors starting at `lba` into `buf`.
	///
	/// `buf`'s length must be a multiple of the sector size.
	fn read(&mut self, lba: u64, buf: &mut [u8]) -> EResult<()>;
}

/// A registered block device.
struct BlkDev {
	/// The device's name.
	name: DevName,
	/// The driver.
	interface: Box<dyn StorageInterface>,
}

/// The block device registry.
static DEVICES: IntSpin<[Option<BlkDev>; DEVICES_MAX]> =
	IntSpin::new([const { None }; DEVICES_MAX]);

/// Registers a block device, naming it `hd<N>`.
///
/// Returns the index of the device in the registry.
pub fn register(interface: Box<dyn StorageInterface>) -> EResult<usize> {
	let mut devices = DEVICES.lock();
	let index = devices
		.iter()
		.position(|slot| slot.is_none())
		.ok_or_else(|| errno!(ENOMEM))?;
	let name = dev_name!("hd{index}");
	println!(
		"{name}: {} sectors of {} bytes",
		interface.sector_count(),
		interface.sector_size()
	);
	devices[index] = Some(BlkDev {
		name,
		interface,
	});
	Ok(index)
}

/// Returns the name of the device at `index`.
pub fn device_name(index: usize) -> Option<DevName> {
	DEVICES.lock().get(index)?.as_ref().map(|dev| dev.name)
}

/// Returns the sector size of the device at `index`.
pub fn device_sector_size(index: usize) -> EResult<u32> {
	let devices = DEVICES.lock();
	let dev = devices
		.get(index)
		.and_then(Option::as_ref)
		.ok_or_else(|| errno!(ENODEV))?;
	Ok(dev.interface.sector_size())
}

/// Reads sectors from the device at `index`.
///
/// `buf`'s length must be a multiple of the device's sector size.
pub fn read(index: usize, lba: u64, buf: &mut [u8]) -> EResult<()> {
	let mut devices = DEVICES.lock();
	let dev = devices
		.get_mut(index)
		.and_then(Option::as_mut)
		.ok_or_else(|| errno!(ENODEV))?;
	dev.interface.read(lba, buf)
}

/// Scans the partition table of every registered device, probing each
/// partition for a filesystem.
pub(crate) fn scan_partitions() -> EResult<()> {
	for index in 0..DEVICES_MAX {
		if device_name(index).is_none() {
			continue;
		}
		if let Err(e) = partition::scan(index) {
			println!("hd{index}: partition scan failed: {e}");
		}
	}
	Ok(())
}
