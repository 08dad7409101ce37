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

//! The ext2 filesystem is a classical filesystem used in Unix systems.
//!
//! The filesystem divides the storage device into several substructures:
//! - Block Group: stored in the Block Group Descriptor Table (BGDT)
//! - Block: stored inside of block groups
//! - INode: represents a file in the filesystem
//! - Directory entry: an entry stored into the inode's content
//!
//! This is a read-only implementation covering what the kernel needs to list
//! and open files: superblock and group descriptor parsing, inode reads,
//! directory iteration over the direct block pointers and path resolution.

mod bgd;
mod dirent;
mod inode;

use crate::{
	device::storage,
	device::storage::partition::Partition,
	file::{fs, DirEntry, File, FilesystemOps},
};
use bgd::BlockGroupDescriptor;
use inode::{Ext2INode, DIRECT_BLOCKS_COUNT, ROOT_DIRECTORY_INODE};
use macros::AnyRepr;
use utils::{boxed::Box, bytes, errno, errno::EResult};

/// The filesystem's magic number.
pub const EXT2_MAGIC: u16 = 0xef53;

/// The maximum supported block size.
///
/// Directory blocks are read into stack buffers of this size.
const MAX_BLOCK_SIZE: usize = 4096;

/// The default size of an inode, for revision 0 filesystems.
const DEFAULT_INODE_SIZE: u16 = 128;

/// The ext2 superblock, as laid out on disk (fields past `s_inode_size` are
/// not used by this reader).
#[repr(C, packed)]
#[derive(AnyRepr, Clone, Copy)]
struct Superblock {
	/// Total number of inodes.
	s_inodes_count: u32,
	/// Total number of blocks.
	s_blocks_count: u32,
	/// Number of blocks reserved for the superuser.
	s_r_blocks_count: u32,
	/// Number of unallocated blocks.
	s_free_blocks_count: u32,
	/// Number of unallocated inodes.
	s_free_inodes_count: u32,
	/// The block containing the superblock.
	s_first_data_block: u32,
	/// `block_size = 1024 << s_log_block_size`.
	s_log_block_size: u32,
	/// The fragment size shift.
	s_log_frag_size: u32,
	/// The number of blocks per group.
	s_blocks_per_group: u32,
	/// The number of fragments per group.
	s_frags_per_group: u32,
	/// The number of inodes per group.
	s_inodes_per_group: u32,
	/// Timestamp of the last mount.
	s_mtime: u32,
	/// Timestamp of the last write.
	s_wtime: u32,
	/// Mounts since the last check.
	s_mnt_count: u16,
	/// Mounts allowed between checks.
	s_max_mnt_count: u16,
	/// The magic number.
	s_magic: u16,
	/// The filesystem's state.
	s_state: u16,
	/// The action to take on error.
	s_errors: u16,
	/// Minor revision level.
	s_minor_rev_level: u16,
	/// Timestamp of the last check.
	s_lastcheck: u32,
	/// Interval between checks.
	s_checkinterval: u32,
	/// The OS that created the filesystem.
	s_creator_os: u32,
	/// Major revision level.
	s_rev_level: u32,
	/// Default user id for reserved blocks.
	s_def_resuid: u16,
	/// Default group id for reserved blocks.
	s_def_resgid: u16,
	/// First non-reserved inode.
	s_first_ino: u32,
	/// The size of an inode structure.
	s_inode_size: u16,
}

/// In-memory state of a mounted ext2 filesystem.
pub struct Ext2Fs {
	/// The index of the underlying block device.
	dev: usize,
	/// The LBA of the partition's first sector.
	lba_start: u64,

	/// The size of a block in bytes.
	block_size: u32,
	/// The number of blocks per group.
	blocks_per_group: u32,
	/// The number of inodes per group.
	inodes_per_group: u32,
	/// The size of an inode structure on disk.
	inode_size: u16,
	/// The block containing the superblock.
	first_data_block: u32,
	/// The byte offset of the block group descriptor table.
	group_desc_off: u64,
	/// The number of block groups.
	groups_count: u32,
}

/// Per-open-file state: a copy of the inode.
struct Ext2File {
	/// The inode of the file.
	#[allow(dead_code)]
	inode: Ext2INode,
}

impl Ext2Fs {
	/// Reads a byte range of the partition into `scratch`.
	fn read_bytes<'b>(&self, off: u64, len: usize, scratch: &'b mut [u8]) -> EResult<&'b [u8]> {
		fs::read_bytes(self.dev, self.lba_start, off, len, scratch)
	}

	/// Reads the whole block `blk` into `buf`.
	fn read_block(&self, blk: u32, buf: &mut [u8]) -> EResult<()> {
		let sector_size = storage::device_sector_size(self.dev)? as u64;
		let sectors_per_block = self.block_size as u64 / sector_size;
		let lba = self.lba_start + blk as u64 * sectors_per_block;
		storage::read(self.dev, lba, &mut buf[..self.block_size as usize])
	}

	/// Reads the descriptor of the block group `group`.
	fn read_group_descriptor(&self, group: u32) -> EResult<BlockGroupDescriptor> {
		if group >= self.groups_count {
			return Err(errno!(EINVAL));
		}
		let off = self.group_desc_off + group as u64 * size_of::<BlockGroupDescriptor>() as u64;
		let mut scratch = [0u8; 1024];
		let raw = self.read_bytes(off, size_of::<BlockGroupDescriptor>(), &mut scratch)?;
		Ok(*bytes::from_bytes(raw).unwrap())
	}

	/// Returns the byte offset of the inode at `local` in the table starting
	/// at block `inode_table`.
	fn inode_location(&self, inode_table: u32, local: u32) -> u64 {
		inode_table as u64 * self.block_size as u64 + local as u64 * self.inode_size as u64
	}

	/// Reads the inode `i`.
	///
	/// Inode indices start at `1`.
	fn read_inode(&self, i: u32) -> EResult<Ext2INode> {
		if i < 1 {
			return Err(errno!(EINVAL));
		}
		let group = (i - 1) / self.inodes_per_group;
		let local = (i - 1) % self.inodes_per_group;
		let desc = self.read_group_descriptor(group)?;
		let off = self.inode_location(desc.bg_inode_table, local);
		let len = (self.inode_size as usize).min(size_of::<Ext2INode>());
		let mut scratch = [0u8; 1024];
		let raw = self.read_bytes(off, len, &mut scratch)?;
		Ok(Ext2INode::from_raw(raw))
	}

	/// Iterates over the entries of the directory `dir`, calling `f` on each.
	///
	/// Only the direct block pointers are followed. Iteration stops early if
	/// `f` returns `false`.
	fn iter_directory(
		&self,
		dir: &Ext2INode,
		f: &mut dyn FnMut(&dirent::DirentView) -> bool,
	) -> EResult<()> {
		if !dir.is_directory() {
			return Err(errno!(ENOTDIR));
		}
		// Copy the pointers out of the packed structure
		let blocks = dir.i_block;
		let mut block = [0u8; MAX_BLOCK_SIZE];
		for blk in blocks.into_iter().take(DIRECT_BLOCKS_COUNT) {
			if blk == 0 {
				continue;
			}
			self.read_block(blk, &mut block)?;
			for ent in dirent::iter(&block[..self.block_size as usize]) {
				if !f(&ent) {
					return Ok(());
				}
			}
		}
		Ok(())
	}

	/// Looks up the entry `name` in the directory `dir`, returning its inode
	/// number.
	fn find_in_directory(&self, dir: &Ext2INode, name: &[u8]) -> EResult<Option<u32>> {
		let mut found = None;
		self.iter_directory(dir, &mut |ent| {
			if ent.name == name {
				found = Some(ent.header.inode);
				false
			} else {
				true
			}
		})?;
		Ok(found)
	}

	/// Resolves the file at `path`, relative to the root of the filesystem.
	///
	/// An empty path (after stripping leading slashes) resolves to the root
	/// directory.
	fn resolve_path(&self, path: &[u8]) -> EResult<Ext2INode> {
		let mut inode = self.read_inode(ROOT_DIRECTORY_INODE)?;
		for segment in path.split(|b| *b == b'/') {
			if segment.is_empty() {
				continue;
			}
			let next = self
				.find_in_directory(&inode, segment)?
				.ok_or_else(|| errno!(ENOENT))?;
			inode = self.read_inode(next)?;
		}
		Ok(inode)
	}
}

impl FilesystemOps for Ext2Fs {
	fn fs_name(&self) -> &'static str {
		"ext2"
	}

	fn list_root(&self, f: &mut dyn FnMut(&DirEntry) -> bool) -> EResult<()> {
		let root = self.read_inode(ROOT_DIRECTORY_INODE)?;
		self.iter_directory(&root, &mut |ent| {
			f(&DirEntry {
				inode: ent.header.inode,
				file_type: ent.header.file_type,
				name: ent.name,
			})
		})
	}

	fn open(&self, path: &[u8]) -> EResult<File> {
		let inode = self.resolve_path(path)?;
		let node = Box::try_new(Ext2File {
			inode,
		})?;
		Ok(File {
			size: inode.i_size as u64,
			pos: 0,
			node,
		})
	}
}

/// Mounts the ext2 filesystem on the given partition, returning its operation
/// table.
pub(super) fn mount(dev: usize, partition: &Partition) -> EResult<Box<dyn FilesystemOps>> {
	let mut scratch = [0u8; 2048];
	let raw = fs::read_bytes(
		dev,
		partition.lba_start,
		1024,
		size_of::<Superblock>(),
		&mut scratch,
	)?;
	let sp: Superblock = *bytes::from_bytes(raw).unwrap();
	if sp.s_magic != EXT2_MAGIC {
		return Err(errno!(EINVAL));
	}
	let block_size = 1024u32 << sp.s_log_block_size;
	if block_size as usize > MAX_BLOCK_SIZE {
		return Err(errno!(EINVAL));
	}
	let inode_size = if sp.s_rev_level >= 1 {
		sp.s_inode_size
	} else {
		DEFAULT_INODE_SIZE
	};
	let fs = Ext2Fs {
		dev,
		lba_start: partition.lba_start,
		block_size,
		blocks_per_group: sp.s_blocks_per_group,
		inodes_per_group: sp.s_inodes_per_group,
		inode_size,
		first_data_block: sp.s_first_data_block,
		group_desc_off: (sp.s_first_data_block as u64 + 1) * block_size as u64,
		groups_count: sp.s_blocks_count.div_ceil(sp.s_blocks_per_group),
	};
	let ops: Box<dyn FilesystemOps> = Box::try_new(fs)?;
	Ok(ops)
}

#[cfg(test)]
mod test {
	use super::*;

	#[test_case]
	fn superblock_layout() {
		assert_eq!(core::mem::offset_of!(Superblock, s_magic), 56);
		assert_eq!(core::mem::offset_of!(Superblock, s_inode_size), 88);
	}

	fn sample_fs() -> Ext2Fs {
		Ext2Fs {
			dev: 0,
			lba_start: 2048,
			block_size: 1024,
			blocks_per_group: 8192,
			inodes_per_group: 8192,
			inode_size: 128,
			first_data_block: 1,
			group_desc_off: 2048,
			groups_count: 1,
		}
	}

	#[test_case]
	fn inode_location_block_one() {
		// With 1024-byte blocks and 128-byte inodes, inode 2 sits one inode
		// into the table
		let fs = sample_fs();
		let local = (2u32 - 1) % fs.inodes_per_group;
		assert_eq!(fs.inode_location(5, local), 5 * 1024 + 128);
	}

	#[test_case]
	fn groups_count_rounds_up() {
		let sp_blocks = 8193u32;
		assert_eq!(sp_blocks.div_ceil(8192), 2);
	}
}
