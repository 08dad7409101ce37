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

//! Inodes.
//!
//! An inode represents a file on the filesystem. Only the twelve direct block
//! pointers are used by this reader; indirect blocks are not followed.

use macros::AnyRepr;
use utils::bytes;

/// The inode of the root directory.
pub const ROOT_DIRECTORY_INODE: u32 = 2;

/// The number of direct block pointers in an inode.
pub const DIRECT_BLOCKS_COUNT: usize = 12;

/// The mask extracting the file type out of `i_mode`.
pub const MODE_TYPE_MASK: u16 = 0xf000;
/// File type: directory.
pub const MODE_TYPE_DIRECTORY: u16 = 0x4000;

/// An inode, as laid out on disk (128 bytes).
#[repr(C, packed)]
#[derive(AnyRepr, Clone, Copy)]
pub struct Ext2INode {
	/// The file's type and permissions.
	pub i_mode: u16,
	/// The owner's user id.
	pub i_uid: u16,
	/// The size of the file in bytes (lower 32 bits).
	pub i_size: u32,
	/// Timestamp of the last access.
	pub i_atime: u32,
	/// Timestamp of creation.
	pub i_ctime: u32,
	/// Timestamp of the last modification.
	pub i_mtime: u32,
	/// Timestamp of deletion.
	pub i_dtime: u32,
	/// The owner's group id.
	pub i_gid: u16,
	/// The number of hard links to the inode.
	pub i_links_count: u16,
	/// The number of 512-byte sectors used by the file's content.
	pub i_blocks: u32,
	/// Flags.
	pub i_flags: u32,
	/// OS-specific.
	pub i_osd1: u32,
	/// Block pointers: 12 direct, then singly, doubly and triply indirect.
	pub i_block: [u32; 15],
	/// Generation number.
	pub i_generation: u32,
	/// Extended attributes block.
	pub i_file_acl: u32,
	/// Higher size bits or directory ACL.
	pub i_dir_acl: u32,
	/// Fragment address.
	pub i_faddr: u32,
	/// OS-specific.
	pub i_osd2: [u8; 12],
}

impl Ext2INode {
	/// Builds an inode from its on-disk representation.
	///
	/// If `raw` is shorter than the structure, the remaining fields are
	/// zeroed.
	pub fn from_raw(raw: &[u8]) -> Self {
		let mut buf = [0u8; size_of::<Self>()];
		let n = raw.len().min(buf.len());
		buf[..n].copy_from_slice(&raw[..n]);
		*bytes::from_bytes::<Self>(&buf).unwrap()
	}

	/// Tells whether the inode is a directory.
	pub fn is_directory(&self) -> bool {
		self.i_mode & MODE_TYPE_MASK == MODE_TYPE_DIRECTORY
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use core::mem::size_of;

	#[test_case]
	fn inode_layout() {
		assert_eq!(size_of::<Ext2INode>(), 128);
	}

	#[test_case]
	fn inode_from_short_raw() {
		let mut raw = [0u8; 64];
		raw[0] = 0x00;
		raw[1] = 0x40;
		let inode = Ext2INode::from_raw(&raw);
		assert!(inode.is_directory());
		assert_eq!({ inode.i_generation }, 0);
	}
}
