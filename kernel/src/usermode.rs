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

//! Ring 3 demonstration.
//!
//! The kernel has no processes; this module only demonstrates the privilege
//! machinery. It drops to ring 3 over an `iret` with a crafted user frame and
//! runs a small program that reaches back into the kernel through
//! `INT 0x80`.
//!
//! Before the transition, the TSS receives the kernel stack to switch to on
//! the next interrupt, and the pages holding the demo code and its stack are
//! flipped user-accessible.

use crate::{
	arch::x86::{gdt, tss, DEFAULT_FLAGS},
	memory::{vmem, VirtAddr},
};
use core::{
	arch::asm,
	ptr::{addr_of, addr_of_mut},
};
use utils::limits::PAGE_SIZE;

/// The size of the demo's user stack.
const USER_STACK_SIZE: usize = 8192;
/// The size of the kernel stack used when an interrupt preempts the demo.
const KERNEL_STACK_SIZE: usize = 8192;

/// A page-able stack area.
#[repr(C, align(16))]
struct Stack<const N: usize>([u8; N]);

/// The demo's user stack.
static mut USER_STACK: Stack<USER_STACK_SIZE> = Stack([0; USER_STACK_SIZE]);
/// The kernel stack for interrupts raised while in ring 3.
static mut KERNEL_STACK: Stack<KERNEL_STACK_SIZE> = Stack([0; KERNEL_STACK_SIZE]);

/// The demo program, running in ring 3.
///
/// It issues a `write` system call, then spins.
pub extern "C" fn user_program() -> ! {
	const MSG: &[u8] = b"Hello from user mode via syscall write!\n";
	unsafe {
		asm!(
			"int 0x80",
			inout("eax") 4u32 => _,
			in("ebx") 1u32,
			in("ecx") MSG.as_ptr(),
			in("edx") MSG.len(),
		);
		loop {
			asm!("pause");
		}
	}
}

/// Makes every page of the range `[begin, begin + len)` user-accessible.
fn allow_user(begin: VirtAddr, len: usize) {
	let mut page = begin.down_align_to(PAGE_SIZE);
	while page.0 < begin.0 + len {
		vmem::set_user(page);
		page = page + PAGE_SIZE;
	}
}

/// Drops to ring 3 and runs `entry`.
///
/// This function never returns: the demo spins in userspace and the kernel
/// only runs again to service interrupts and system calls.
pub fn enter(entry: extern "C" fn() -> !) -> ! {
	let user_cs = gdt::make_segment_selector(gdt::USER_CS as u32, 3) as u32;
	let user_ds = gdt::make_segment_selector(gdt::USER_DS as u32, 3) as u32;
	unsafe {
		// The stack the CPU switches to on the next ring 3 to ring 0
		// transition
		let kernel_stack_top = addr_of_mut!(KERNEL_STACK.0)
			.cast::<u8>()
			.add(KERNEL_STACK_SIZE);
		tss::set_kernel_stack(kernel_stack_top);
		// The demo's code and stack must be reachable from ring 3
		allow_user(VirtAddr(entry as usize), 2 * PAGE_SIZE);
		let stack_bottom = VirtAddr(addr_of!(USER_STACK.0) as usize);
		allow_user(stack_bottom, USER_STACK_SIZE);
		let stack_top = stack_bottom.0 + USER_STACK_SIZE;
		asm!(
			"mov ds, {ds:x}",
			"mov es, {ds:x}",
			"push {ds}",
			"push {sp}",
			"push {flags}",
			"push {cs}",
			"push {ip}",
			"iretd",
			ds = in(reg) user_ds,
			sp = in(reg) stack_top,
			flags = in(reg) DEFAULT_FLAGS,
			cs = in(reg) user_cs,
			ip = in(reg) entry as usize,
			options(noreturn),
		);
	}
}
