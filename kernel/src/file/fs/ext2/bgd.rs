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

//! Block group descriptors.
//!
//! Blocks and inodes are grouped; the descriptor of each group tells where
//! its bitmaps and inode table live. The descriptor table starts on the block
//! right after the superblock.

use macros::AnyRepr;

/// A block group descriptor, as laid out on disk (32 bytes).
#[repr(C, packed)]
#[derive(AnyRepr, Clone, Copy)]
pub struct BlockGroupDescriptor {
	/// The block containing the block usage bitmap.
	pub bg_block_bitmap: u32,
	/// The block containing the inode usage bitmap.
	pub bg_inode_bitmap: u32,
	/// The starting block of the inode table.
	pub bg_inode_table: u32,
	/// The number of unallocated blocks in the group.
	pub bg_free_blocks_count: u16,
	/// The number of unallocated inodes in the group.
	pub bg_free_inodes_count: u16,
	/// The number of directories in the group.
	pub bg_used_dirs_count: u16,
	/// Padding.
	pub bg_pad: u16,
	/// Reserved.
	pub bg_reserved: [u8; 12],
}

#[cfg(test)]
mod test {
	use super::*;
	use core::mem::size_of;

	#[test_case]
	fn bgd_layout() {
		assert_eq!(size_of::<BlockGroupDescriptor>(), 32);
	}
}
