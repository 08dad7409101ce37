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

//! System limits.

/// The size of a page of memory in bytes.
pub const PAGE_SIZE: usize = 4096;
/// The maximum length of a file name.
pub const NAME_MAX: usize = 255;
/// The maximum length of a path.
pub const PATH_MAX: usize = 4096;
