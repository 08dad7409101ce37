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

//! The `getdents` system call.
//!
//! The kernel has no per-process file descriptor table; as a placeholder the
//! call prints the mount table of the virtual filesystem to the console.

use crate::file;

/// `getdents(fd, dirp, count)`.
pub(super) fn sys_getdents(_fd: u32, _dirp: u32, _count: u32, _: u32, _: u32) -> u32 {
	file::print_mounts();
	0
}
