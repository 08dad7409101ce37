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

//! The Multiboot standard specifies an interface to load and boot the kernel
//! image. It provides essential information such as the memory mapping and
//! the framebuffer set up by the bootloader.
//!
//! The bootloader hands over a stream of 8-byte aligned tags, starting 8
//! bytes after the given pointer. The kernel walks the stream once at boot
//! and caches what it needs.

use crate::{memory::PhysAddr, sync::once::OnceInit};
use core::ffi::c_void;

/// The magic number passed by a Multiboot2-compliant bootloader.
pub const BOOTLOADER_MAGIC: u32 = 0x36d76289;

/// Tag: end of the tag stream.
pub const TAG_TYPE_END: u32 = 0;
/// Tag: basic memory information.
pub const TAG_TYPE_BASIC_MEMINFO: u32 = 4;
/// Tag: memory map.
pub const TAG_TYPE_MMAP: u32 = 6;
/// Tag: framebuffer information.
pub const TAG_TYPE_FRAMEBUFFER: u32 = 8;

/// Memory map entry type: available memory.
pub const MEMORY_AVAILABLE: u32 = 1;

/// Framebuffer type: direct RGB color.
pub const FRAMEBUFFER_TYPE_RGB: u8 = 1;
/// Framebuffer type: EGA text mode.
pub const FRAMEBUFFER_TYPE_EGA_TEXT: u8 = 2;

/// A tag header.
#[repr(C)]
struct Tag {
	type_: u32,
	size: u32,
}

/// A memory map entry.
#[repr(C)]
pub struct MmapEntry {
	/// The physical base address of the region.
	pub addr: u64,
	/// The length of the region in bytes.
	pub len: u64,
	/// The type of the region.
	pub type_: u32,
	zero: u32,
}

impl MmapEntry {
	/// Returns the string describing the memory region according to its type.
	pub fn get_type_string(&self) -> &'static str {
		match self.type_ {
			MEMORY_AVAILABLE => "Available",
			3 => "ACPI",
			4 => "Hibernate",
			5 => "Bad RAM",
			_ => "Reserved",
		}
	}
}

#[repr(C)]
struct TagBasicMeminfo {
	type_: u32,
	size: u32,
	mem_lower: u32,
	mem_upper: u32,
}

#[repr(C)]
struct TagMmap {
	type_: u32,
	size: u32,
	entry_size: u32,
	entry_version: u32,
	entries: [MmapEntry; 0],
}

#[repr(C)]
struct TagFramebuffer {
	type_: u32,
	size: u32,
	framebuffer_addr: u64,
	framebuffer_pitch: u32,
	framebuffer_width: u32,
	framebuffer_height: u32,
	framebuffer_bpp: u8,
	framebuffer_type: u8,
	reserved: u16,
}

impl Tag {
	/// Returns the pointer to the next Multiboot tag after the current tag.
	fn next(&self) -> *const Self {
		((self as *const _ as usize) + (((self.size + 7) & !7) as usize)) as *const _
	}
}

/// Framebuffer information, as set up by the bootloader.
#[derive(Clone, Copy, Debug)]
pub struct FramebufferInfo {
	/// The physical address of the buffer.
	pub addr: u64,
	/// The number of bytes per scanline.
	pub pitch: u32,
	/// The width in pixels (or characters in EGA text mode).
	pub width: u32,
	/// The height in pixels (or characters in EGA text mode).
	pub height: u32,
	/// The number of bits per pixel.
	pub bpp: u8,
	/// The type of the framebuffer.
	pub type_: u8,
}

/// Kernel boot information provided by Multiboot, structured and filtered.
pub struct BootInfo {
	/// The lower memory size in KiB.
	pub mem_lower: u32,
	/// The upper memory size in KiB.
	pub mem_upper: u32,

	/// The size in bytes of the memory map tag.
	pub memory_maps_size: usize,
	/// The size of a memory map entry.
	pub memory_maps_entry_size: usize,
	/// The list of physical memory mappings.
	pub memory_maps: *const MmapEntry,

	/// Framebuffer information, if the bootloader set one up.
	pub framebuffer: Option<FramebufferInfo>,
}

// The pointers inside are only read at boot
unsafe impl Sync for BootInfo {}

/// The field storing the information given to the kernel at boot time.
static BOOT_INFO: OnceInit<BootInfo> = OnceInit::new();

/// Returns boot information provided by Multiboot.
pub fn get_boot_info() -> &'static BootInfo {
	BOOT_INFO.get()
}

/// Returns an iterator over the cached memory map entries.
pub fn mmap_iter(boot_info: &BootInfo) -> impl Iterator<Item = &'static MmapEntry> {
	// Subtract the tag header
	let entries_size = boot_info.memory_maps_size.saturating_sub(16);
	let entry_size = boot_info.memory_maps_entry_size;
	let count = if entry_size != 0 {
		entries_size / entry_size
	} else {
		0
	};
	let base = boot_info.memory_maps as usize;
	(0..count).map(move |i| unsafe { &*((base + i * entry_size) as *const MmapEntry) })
}

/// Reinterprets a tag with the given type.
unsafe fn reinterpret_tag<T>(tag: &Tag) -> &'static T {
	&*(tag as *const _ as *const T)
}

/// Reads the given `tag` and fills the boot information structure
/// accordingly. Unknown tags are skipped.
fn handle_tag(boot_info: &mut BootInfo, tag: &Tag) {
	match tag.type_ {
		TAG_TYPE_BASIC_MEMINFO => {
			let t: &TagBasicMeminfo = unsafe { reinterpret_tag(tag) };
			boot_info.mem_lower = t.mem_lower;
			boot_info.mem_upper = t.mem_upper;
		}

		TAG_TYPE_MMAP => {
			let t: &TagMmap = unsafe { reinterpret_tag(tag) };
			boot_info.memory_maps_size = t.size as usize;
			boot_info.memory_maps_entry_size = t.entry_size as usize;
			boot_info.memory_maps = t.entries.as_ptr();
		}

		TAG_TYPE_FRAMEBUFFER => {
			let t: &TagFramebuffer = unsafe { reinterpret_tag(tag) };
			boot_info.framebuffer = Some(FramebufferInfo {
				addr: t.framebuffer_addr,
				pitch: t.framebuffer_pitch,
				width: t.framebuffer_width,
				height: t.framebuffer_height,
				bpp: t.framebuffer_bpp,
				type_: t.framebuffer_type,
			});
		}

		_ => {}
	}
}

/// Reads the Multiboot tags from the physical pointer `ptr` and fills the
/// boot information structure.
///
/// # Safety
///
/// The caller must ensure the given pointer is valid and points to Multiboot
/// tags. The boot mappings covering the structure must still be in place.
pub(crate) unsafe fn read(magic: u32, ptr: *const c_void) -> &'static BootInfo {
	if magic != BOOTLOADER_MAGIC {
		panic!("invalid Multiboot magic number: {magic:#x}");
	}
	let ptr = PhysAddr(ptr as usize)
		.kernel_to_virtual()
		.unwrap()
		.as_ptr::<c_void>();
	let mut boot_info = BootInfo {
		mem_lower: 0,
		mem_upper: 0,
		memory_maps_size: 0,
		memory_maps_entry_size: 0,
		memory_maps: core::ptr::null(),
		framebuffer: None,
	};
	let mut tag = ptr.offset(8) as *const Tag;
	while (*tag).type_ != TAG_TYPE_END {
		handle_tag(&mut boot_info, &*tag);
		tag = (*tag).next();
	}
	BOOT_INFO.init(boot_info)
}
