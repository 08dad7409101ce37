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

//! Filesystem detection and mounting.
//!
//! A partition is probed by signature, in order: FAT16, then ext2, then
//! ISO9660. On a successful probe the mount is registered and the
//! filesystem-specific mount routine runs (currently ext2 only); if that
//! routine fails the mount slot is cleared again.

pub mod ext2;

use crate::{
	dev_name,
	device::storage,
	device::storage::partition::Partition,
	file,
	file::Mount,
	println,
};
use core::fmt;
use utils::{errno, errno::EResult};

/// The kind of filesystem detected on a partition.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FsKind {
	/// FAT16.
	Fat16,
	/// ext2.
	Ext2,
	/// ISO9660.
	Iso9660,
	/// Unrecognized filesystem.
	Unknown,
}

impl fmt::Display for FsKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			Self::Fat16 => "fat16",
			Self::Ext2 => "ext2",
			Self::Iso9660 => "iso9660",
			Self::Unknown => "unknown",
		};
		f.write_str(s)
	}
}

/// Reads a byte range from a partition, handling sector alignment.
///
/// Arguments:
/// - `dev` is the index of the block device.
/// - `lba_start` is the first sector of the partition.
/// - `off` is the byte offset from the beginning of the partition.
/// - `len` is the number of bytes to read.
/// - `scratch` is the scratch buffer the sectors are read into.
///
/// Returns the requested range as a sub-slice of `scratch`.
pub fn read_bytes<'b>(
	dev: usize,
	lba_start: u64,
	off: u64,
	len: usize,
	scratch: &'b mut [u8],
) -> EResult<&'b [u8]> {
	let sector_size = storage::device_sector_size(dev)? as u64;
	let first_sector = off / sector_size;
	let shift = (off % sector_size) as usize;
	let need = (shift + len).next_multiple_of(sector_size as usize);
	if scratch.len() < need {
		return Err(errno!(EINVAL));
	}
	storage::read(dev, lba_start + first_sector, &mut scratch[..need])?;
	Ok(&scratch[shift..shift + len])
}

/// Tells whether the partition starts with a FAT16 boot sector.
fn detect_fat16(dev: usize, partition: &Partition) -> EResult<bool> {
	let mut scratch = [0u8; 512];
	let sector = read_bytes(dev, partition.lba_start, 0, 512, &mut scratch)?;
	if sector[510] != 0x55 || sector[511] != 0xaa {
		return Ok(false);
	}
	let bytes_per_sector = u16::from_le_bytes([sector[11], sector[12]]);
	let fat_size = u16::from_le_bytes([sector[22], sector[23]]);
	if bytes_per_sector == 0 || fat_size == 0 {
		return Ok(false);
	}
	Ok(&sector[54..62] == b"FAT16   ")
}

/// Tells whether the partition carries an ext2 superblock.
fn detect_ext2(dev: usize, partition: &Partition) -> EResult<bool> {
	let mut scratch = [0u8; 1024];
	let superblock = read_bytes(dev, partition.lba_start, 1024, 1024, &mut scratch)?;
	let magic = u16::from_le_bytes([superblock[56], superblock[57]]);
	Ok(magic == ext2::EXT2_MAGIC)
}

/// Tells whether the partition carries an ISO9660 volume descriptor.
fn detect_iso9660(dev: usize, partition: &Partition) -> EResult<bool> {
	let mut scratch = [0u8; 2048];
	let desc = read_bytes(dev, partition.lba_start, 32768, 2048, &mut scratch)?;
	Ok(desc[0] == 0x01 && &desc[1..6] == b"CD001")
}

/// Probes the filesystem on the given partition.
fn detect(dev: usize, partition: &Partition) -> EResult<FsKind> {
	if detect_fat16(dev, partition)? {
		return Ok(FsKind::Fat16);
	}
	if detect_ext2(dev, partition)? {
		return Ok(FsKind::Ext2);
	}
	if detect_iso9660(dev, partition)? {
		return Ok(FsKind::Iso9660);
	}
	Ok(FsKind::Unknown)
}

/// Probes the given partition and registers a mount for it if a filesystem is
/// recognized.
pub(crate) fn probe_and_mount(dev: usize, partition: Partition) -> EResult<()> {
	let dev_name = storage::device_name(dev).ok_or_else(|| errno!(ENODEV))?;
	let name = dev_name!("{dev_name}p{}", partition.index);
	let kind = detect(dev, &partition)?;
	if kind == FsKind::Unknown {
		println!(
			"{name}: unrecognized filesystem (type {:#04x})",
			partition.type_
		);
		return Ok(());
	}
	file::register_mount(Mount {
		name,
		kind,
		dev,
		lba_start: partition.lba_start,
		sector_count: partition.sector_count,
		partition_index: partition.index,
		ops: None,
	})?;
	if kind == FsKind::Ext2 {
		match ext2::mount(dev, &partition) {
			Ok(ops) => file::set_mount_ops(&name, ops),
			Err(e) => {
				file::clear_mount(&name);
				return Err(e);
			}
		}
	}
	Ok(())
}
