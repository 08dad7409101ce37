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

//! The virtual filesystem.
//!
//! Mounted filesystems live in a process-wide registry keyed by mount name
//! (`<device>p<partition>`). Each mount carries an operation table
//! (`list_root`, `open`, `close`) dispatching into the filesystem driver.

pub mod fs;

use crate::{device::DevName, println, sync::spin::IntSpin};
use core::any::Any;
use fs::FsKind;
use utils::{boxed::Box, errno, errno::EResult};

/// The maximum number of mounted filesystems.
pub const MOUNTS_MAX: usize = 8;

/// A directory entry, as reported by a filesystem driver.
#[derive(Debug)]
pub struct DirEntry<'n> {
	/// The inode number.
	pub inode: u32,
	/// The entry type, as stored by the filesystem (`0` if unknown).
	pub file_type: u8,
	/// The entry's name.
	pub name: &'n [u8],
}

/// An open file.
pub struct File {
	/// The size of the file in bytes.
	pub size: u64,
	/// The current position in the file.
	pub pos: u64,
	/// Filesystem-specific state.
	pub(crate) node: Box<dyn Any + Send>,
}

/// Operations offered by a mounted filesystem.
pub trait FilesystemOps: Send {
	/// Returns the name of the filesystem type.
	fn fs_name(&self) -> &'static str;

	/// Calls `f` for each entry of the root directory.
	///
	/// Iteration stops early if `f` returns `false`.
	fn list_root(&self, f: &mut dyn FnMut(&DirEntry) -> bool) -> EResult<()>;

	/// Opens the file at `path`, relative to the root of the filesystem.
	fn open(&self, path: &[u8]) -> EResult<File>;

	/// Closes the given file, releasing its resources.
	fn close(&self, file: File) {
		drop(file);
	}
}

/// A mounted (or at least recognized) filesystem on a partition.
pub struct Mount {
	/// The mount name, following `<device>p<1-based partition>`.
	pub name: DevName,
	/// The kind of filesystem detected on the partition.
	pub kind: FsKind,
	/// The index of the underlying block device.
	pub dev: usize,
	/// The LBA of the partition's first sector.
	pub lba_start: u64,
	/// The number of sectors in the partition.
	pub sector_count: u64,
	/// The 1-based index of the partition on its device.
	pub partition_index: usize,
	/// The driver's operation table. `None` until the filesystem-specific
	/// mount routine has run (and stays `None` for recognized-but-unsupported
	/// filesystems).
	pub(crate) ops: Option<Box<dyn FilesystemOps>>,
}

/// The mount registry.
static MOUNTS: IntSpin<[Option<Mount>; MOUNTS_MAX]> = IntSpin::new([const { None }; MOUNTS_MAX]);

/// Registers a mount.
///
/// Mount names must be unique; a duplicate is refused.
pub(crate) fn register_mount(mount: Mount) -> EResult<()> {
	let mut mounts = MOUNTS.lock();
	if mounts
		.iter()
		.flatten()
		.any(|m| m.name == mount.name)
	{
		return Err(errno!(EBUSY));
	}
	let slot = mounts
		.iter_mut()
		.find(|slot| slot.is_none())
		.ok_or_else(|| errno!(ENOMEM))?;
	println!(
		"{}: {} filesystem, {} sectors at lba {}",
		mount.name, mount.kind, mount.sector_count, mount.lba_start
	);
	*slot = Some(mount);
	Ok(())
}

/// Attaches the operation table of a freshly mounted filesystem.
pub(crate) fn set_mount_ops(name: &DevName, ops: Box<dyn FilesystemOps>) {
	let mut mounts = MOUNTS.lock();
	if let Some(mount) = mounts.iter_mut().flatten().find(|m| m.name == *name) {
		mount.ops = Some(ops);
	}
}

/// Clears the mount with the given name, after a failed filesystem mount.
pub(crate) fn clear_mount(name: &DevName) {
	let mut mounts = MOUNTS.lock();
	for slot in mounts.iter_mut() {
		if matches!(slot, Some(m) if m.name == *name) {
			*slot = None;
		}
	}
}

/// Runs `f` on the mount named `name`.
fn with_mount<T>(name: &str, f: impl FnOnce(&Mount) -> EResult<T>) -> EResult<T> {
	let mounts = MOUNTS.lock();
	let mount = mounts
		.iter()
		.flatten()
		.find(|m| m.name.as_str() == name)
		.ok_or_else(|| errno!(ENODEV))?;
	f(mount)
}

/// Lists the root directory of the mount named `name`, calling `f` on each
/// entry.
///
/// Iteration stops early if `f` returns `false`.
pub fn list_root(name: &str, f: &mut dyn FnMut(&DirEntry) -> bool) -> EResult<()> {
	with_mount(name, |mount| {
		let ops = mount.ops.as_ref().ok_or_else(|| errno!(ENOSYS))?;
		ops.list_root(f)
	})
}

/// Opens the file at `path` on the mount named `name`.
pub fn open(name: &str, path: &[u8]) -> EResult<File> {
	with_mount(name, |mount| {
		let ops = mount.ops.as_ref().ok_or_else(|| errno!(ENOSYS))?;
		ops.open(path)
	})
}

/// Closes the given file.
pub fn close(file: File) {
	drop(file);
}

/// Prints the root directory of every mounted filesystem.
pub fn list_mount_roots() {
	let mounts = MOUNTS.lock();
	for mount in mounts.iter().flatten() {
		let Some(ops) = mount.ops.as_ref() else {
			continue;
		};
		println!("{}:", mount.name);
		let res = ops.list_root(&mut |ent| {
			let name = core::str::from_utf8(ent.name).unwrap_or("?");
			println!("  {name} (inode {})", ent.inode);
			true
		});
		if let Err(e) = res {
			println!("{}: cannot list root directory: {e}", mount.name);
			continue;
		}
		match ops.open(b"/") {
			Ok(file) => {
				println!("{}: root inode opened, size {}", mount.name, file.size);
				ops.close(file);
			}
			Err(e) => println!("{}: cannot open root: {e}", mount.name),
		}
	}
}

/// Prints the mount table.
pub fn print_mounts() {
	let mounts = MOUNTS.lock();
	for mount in mounts.iter().flatten() {
		println!(
			"{}: {} (device hd{}, partition {}, lba {}..{})",
			mount.name,
			mount.kind,
			mount.dev,
			mount.partition_index,
			mount.lba_start,
			mount.lba_start + mount.sector_count
		);
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::dev_name;

	fn sample_mount() -> Mount {
		Mount {
			name: dev_name!("hd9p1"),
			kind: FsKind::Ext2,
			dev: 9,
			lba_start: 2048,
			sector_count: 4096,
			partition_index: 1,
			ops: None,
		}
	}

	#[test_case]
	fn mount_registry_roundtrip() {
		let name = dev_name!("hd9p1");
		register_mount(sample_mount()).unwrap();
		// The registered mount is found back by name
		with_mount("hd9p1", |m| {
			assert_eq!(m.lba_start, 2048);
			assert_eq!(m.sector_count, 4096);
			assert_eq!(m.kind, FsKind::Ext2);
			Ok(())
		})
		.unwrap();
		clear_mount(&name);
		assert!(with_mount("hd9p1", |_| Ok(())).is_err());
	}

	#[test_case]
	fn mount_names_unique() {
		let name = dev_name!("hd9p1");
		register_mount(sample_mount()).unwrap();
		assert!(register_mount(sample_mount()).is_err());
		clear_mount(&name);
	}

	#[test_case]
	fn missing_ops_reported() {
		let name = dev_name!("hd9p1");
		register_mount(sample_mount()).unwrap();
		// Recognized but not mounted: operations must fail cleanly
		assert!(list_root("hd9p1", &mut |_| true).is_err());
		assert!(open("hd9p1", b"/").is_err());
		clear_mount(&name);
	}

	#[test_case]
	fn unknown_mount_reported() {
		assert!(open("nope", b"/").is_err());
		assert!(list_root("nope", &mut |_| true).is_err());
	}
}
