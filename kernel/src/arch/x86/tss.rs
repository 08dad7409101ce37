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

//! Under the x86 architecture, the TSS (Task State Segment) is a structure
//! that is mostly deprecated but that must still be used to switch the stack
//! on a privilege transition.
//!
//! Whenever an interruption fires while running in ring 3, the CPU loads
//! `ss0`/`esp0` from the TSS before pushing the interrupted context.
//!
//! The structure has to be registered into the GDT into the TSS segment, and
//! must be loaded using instruction `ltr`.

use crate::arch::x86::gdt;
use core::{arch::asm, mem, mem::size_of, ptr::addr_of};

/// Task State Segment.
#[repr(C)]
#[allow(missing_docs)]
pub struct Tss {
	pub prev_tss: u32,
	pub esp0: u32,
	pub ss0: u32,
	pub esp1: u32,
	pub ss1: u32,
	pub esp2: u32,
	pub ss2: u32,
	pub cr3: u32,
	pub eip: u32,
	pub eflags: u32,
	pub eax: u32,
	pub ecx: u32,
	pub edx: u32,
	pub ebx: u32,
	pub esp: u32,
	pub ebp: u32,
	pub esi: u32,
	pub edi: u32,
	pub es: u32,
	pub cs: u32,
	pub ss: u32,
	pub ds: u32,
	pub fs: u32,
	pub gs: u32,
	pub ldt: u32,
	pub trap: u16,
	pub iomap_base: u16,
}

/// The Task State Segment.
static mut TSS: Tss = unsafe { mem::zeroed() };

/// Initializes the TSS.
///
/// Must be called after [`gdt::init`].
pub(crate) fn init() {
	let base = unsafe { addr_of!(TSS) } as usize as u32;
	let limit = size_of::<Tss>() as u32 - 1;
	// Present, ring 0, 32-bit available TSS
	let entry = gdt::Entry::new(base, limit, 0x89, 0);
	unsafe {
		TSS.ss0 = gdt::KERNEL_DS as u32;
		TSS.iomap_base = size_of::<Tss>() as u16;
		gdt::update_entry(gdt::TSS_OFFSET, entry);
	}
	gdt::flush();
	unsafe {
		asm!(
			"mov ax, {off}",
			"ltr ax",
			off = const gdt::TSS_OFFSET,
			out("ax") _,
		);
	}
}

/// Sets the kernel stack pointer used on the next ring 3 to ring 0 transition.
///
/// # Safety
///
/// This function is **not** reentrant.
pub unsafe fn set_kernel_stack(kernel_stack: *mut u8) {
	TSS.esp0 = kernel_stack as _;
}
