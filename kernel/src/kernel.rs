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

//! ferrite is a small 32-bit x86 kernel booted by a Multiboot2-compliant
//! loader.
//!
//! It takes over physical and virtual memory, installs interrupt handling,
//! enumerates the PCI bus, drives IDE/ATA disks over PIO and exposes a
//! minimal virtual filesystem over MBR-partitioned disks with an ext2
//! reader. A ring 3 demonstration reaches back into the kernel through the
//! `INT 0x80` system call gate.

#![no_std]
#![no_main]
#![feature(alloc_layout_extra)]
#![feature(allow_internal_unstable)]
#![feature(custom_test_frameworks)]
#![feature(lang_items)]
#![feature(negative_impls)]
#![deny(missing_docs)]
#![allow(dead_code)]
#![allow(internal_features)]
#![allow(static_mut_refs)]
#![allow(unsafe_op_in_unsafe_fn)]
#![allow(clippy::tabs_in_doc_comments)]
#![test_runner(crate::selftest::runner)]
#![reexport_test_harness_main = "kernel_selftest"]

pub mod arch;
mod boot;
pub mod device;
pub mod file;
pub mod int;
pub mod irq;
pub mod logger;
pub mod memory;
pub mod multiboot;
pub mod panic;
pub mod power;
#[macro_use]
pub mod print;
pub mod selftest;
pub mod sync;
pub mod syscall;
pub mod time;
pub mod tty;
pub mod usermode;

use crate::{
	arch::x86::{gdt, idt, tss},
	memory::{vmem, PhysAddr, FRAMEBUFFER_BEGIN},
};
use core::ffi::c_void;
pub use utils;

/// The kernel's name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Current kernel version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tells whether boot ends with the ring 3 demonstration.
const USERMODE_DEMO: bool = true;

/// Maps the linear framebuffer, if the bootloader set one up.
fn map_framebuffer() {
	let Some(fb) = multiboot::get_boot_info().framebuffer else {
		return;
	};
	// 4 MiB pages require a 4 MiB aligned base
	let base = PhysAddr(fb.addr as usize).down_align_to(4 << 20);
	let span = (fb.addr as usize - base.0) + fb.pitch as usize * fb.height as usize;
	let size_mib = span.div_ceil(1 << 20);
	vmem::map_4mb_physical_to_virtual(base, FRAMEBUFFER_BEGIN, size_mib);
	println!(
		"framebuffer: {}x{} bpp {} at {:#x}, type {}",
		fb.width, fb.height, fb.bpp, fb.addr, fb.type_
	);
}

/// This is the main function of the Rust source code, responsible for the
/// initialization of the kernel.
///
/// When calling this function, the CPU must be in Protected Mode with paging
/// enabled and the kernel mapped in the higher half.
///
/// Arguments:
/// - `magic` is the magic number passed by Multiboot.
/// - `multiboot_ptr` is the physical pointer to the Multiboot boot
///   information structure.
#[no_mangle]
pub extern "C" fn kernel_main(magic: u32, multiboot_ptr: *const c_void) -> ! {
	// Read multiboot information
	let boot_info = unsafe { multiboot::read(magic, multiboot_ptr) };

	// Initialize memory management
	memory::memmap::init(boot_info);
	vmem::init();
	map_framebuffer();

	// From now on, the kernel considers that memory management has been fully
	// initialized

	tty::init();
	println!("Boot {NAME} version {VERSION}");

	// Protection structures: full GDT with userspace segments, the TSS, then
	// the IDT with the PIC remapped
	gdt::init();
	tss::init();
	idt::init();

	// Register the initial interrupt handlers
	int::register_callback(0x0e, vmem::page_fault_handler);

	// Perform kernel self-tests. The heap relies on demand mapping, so the
	// page fault handler must be in place
	#[cfg(test)]
	kernel_selftest();

	time::init();
	device::keyboard::init();
	syscall::init();
	// Handler tables are complete: let interruptions in
	irq::init();

	// Discover devices, scan partitions, mount filesystems
	device::init().expect("device initialization failed");
	file::list_mount_roots();

	if USERMODE_DEMO {
		usermode::enter(usermode::user_program);
	}
	power::idle();
}
