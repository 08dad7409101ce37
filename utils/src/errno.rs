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

//! Kernel error codes.
//!
//! Errors are represented by an integer code in the style of Unix `errno`
//! values. Driver and filesystem functions return [`EResult`], reserving the
//! error branch for the codes defined here.

use core::fmt;

/// Operation not permitted
pub const EPERM: i32 = 1;
/// No such file or directory
pub const ENOENT: i32 = 2;
/// I/O error
pub const EIO: i32 = 5;
/// Bad file descriptor
pub const EBADF: i32 = 9;
/// Out of memory
pub const ENOMEM: i32 = 12;
/// Permission denied
pub const EACCES: i32 = 13;
/// Block device required
pub const ENOTBLK: i32 = 15;
/// Device or resource busy
pub const EBUSY: i32 = 16;
/// No such device
pub const ENODEV: i32 = 19;
/// Not a directory
pub const ENOTDIR: i32 = 20;
/// Is a directory
pub const EISDIR: i32 = 21;
/// Invalid argument
pub const EINVAL: i32 = 22;
/// Function not implemented
pub const ENOSYS: i32 = 38;
/// File name too long
pub const ENAMETOOLONG: i32 = 36;
/// No space left on device
pub const ENOSPC: i32 = 28;
/// Value too large for defined data type
pub const EOVERFLOW: i32 = 75;
/// Timer expired
pub const ETIME: i32 = 62;

/// An error code.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Errno(i32);

impl Errno {
	/// Creates a new instance from the given integer code.
	pub const fn new(errno: i32) -> Self {
		Self(errno)
	}

	/// Returns the integer representation of the error.
	pub const fn as_int(self) -> i32 {
		self.0
	}

	/// Returns the name of the error.
	pub const fn name(self) -> &'static str {
		match self.0 {
			EPERM => "EPERM",
			ENOENT => "ENOENT",
			EIO => "EIO",
			EBADF => "EBADF",
			ENOMEM => "ENOMEM",
			EACCES => "EACCES",
			ENOTBLK => "ENOTBLK",
			EBUSY => "EBUSY",
			ENODEV => "ENODEV",
			ENOTDIR => "ENOTDIR",
			EISDIR => "EISDIR",
			EINVAL => "EINVAL",
			ENOSYS => "ENOSYS",
			ENAMETOOLONG => "ENAMETOOLONG",
			ENOSPC => "ENOSPC",
			EOVERFLOW => "EOVERFLOW",
			ETIME => "ETIME",
			_ => "unknown",
		}
	}
}

impl From<AllocError> for Errno {
	fn from(_: AllocError) -> Self {
		Self(ENOMEM)
	}
}

impl fmt::Debug for Errno {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(self, f)
	}
}

impl fmt::Display for Errno {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} ({})", self.name(), self.0)
	}
}

/// Builds an [`Errno`] from its constant name.
#[macro_export]
macro_rules! errno {
	($name:ident) => {
		$crate::errno::Errno::new($crate::errno::$name)
	};
}

/// A result whose error branch is an [`Errno`].
pub type EResult<T> = Result<T, Errno>;

/// A memory allocation failure.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AllocError;

impl fmt::Display for AllocError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "memory allocation failure")
	}
}

/// A result whose error branch is an allocation failure.
pub type AllocResult<T> = Result<T, AllocError>;

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn errno_name() {
		assert_eq!(errno!(EIO).name(), "EIO");
		assert_eq!(errno!(EIO).as_int(), 5);
	}

	#[test]
	fn alloc_error_conversion() {
		let e: Errno = AllocError.into();
		assert_eq!(e, errno!(ENOMEM));
	}
}
