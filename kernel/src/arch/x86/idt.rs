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

//! The IDT (Interrupt Descriptor Table) is a table under the x86 architecture
//! storing the list of interrupt handlers, allowing to catch and handle
//! interruptions.
//!
//! The assembly stubs in this module build an [`IntFrame`] on the stack and
//! hand it to the language-level dispatcher (`crate::int`). The push order of
//! the stubs and the field order of the structure must stay in lockstep.

use crate::arch::x86::{cli, gdt, pic};
use core::{
	arch::{asm, global_asm},
	ffi::c_void,
	fmt,
	mem::size_of,
	ptr::addr_of,
};

/// The IDT vector index for system calls.
pub const SYSCALL_ENTRY: usize = 0x80;
/// The number of entries into the IDT.
pub const ENTRIES_COUNT: usize = 256;

/// The offset at which the PIC's IRQs are remapped.
pub const PIC_OFFSET: u8 = 0x20;

/// Gate flags: 32-bit interrupt gate, present, ring 0.
pub const FLAG_INT_GATE: u8 = 0x8e;
/// Gate flags: 32-bit interrupt gate, present, callable from ring 3.
pub const FLAG_INT_GATE_USER: u8 = 0xee;
/// The present bit in the gate flags.
const FLAG_PRESENT: u8 = 0x80;

/// Interruption stack frame, with saved registers state.
///
/// The layout matches the stub push order exactly.
#[repr(C)]
#[allow(missing_docs)]
#[derive(Clone, Debug, Default)]
pub struct IntFrame {
	pub eax: u32,
	pub ebx: u32,
	pub ecx: u32,
	pub edx: u32,
	pub esi: u32,
	pub edi: u32,
	pub ebp: u32,

	pub gs: u32,
	pub fs: u32,

	/// Interruption number.
	pub int: u32,
	/// Error code, if any.
	pub code: u32,

	pub eip: u32,
	pub cs: u32,
	pub eflags: u32,
	/// Only pushed by the CPU on a privilege transition.
	pub esp: u32,
	/// Only pushed by the CPU on a privilege transition.
	pub ss: u32,
}

impl IntFrame {
	/// Tells the ring at which the interrupted code was running.
	pub const fn ring(&self) -> u8 {
		(self.cs & 0b11) as u8
	}

	/// Returns the ID of the system call being executed.
	#[inline]
	pub const fn get_syscall_id(&self) -> usize {
		self.eax as usize
	}

	/// Returns the value of the `n`th argument of the syscall being executed.
	///
	/// If `n` exceeds the number of argument registers, the function returns
	/// `0`.
	#[inline]
	pub const fn get_syscall_arg(&self, n: u8) -> u32 {
		match n {
			0 => self.ebx,
			1 => self.ecx,
			2 => self.edx,
			3 => self.esi,
			4 => self.edi,
			_ => 0,
		}
	}
}

impl fmt::Display for IntFrame {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(
			f,
			"eax: {:08x} ebx: {:08x} ecx: {:08x} edx: {:08x}",
			self.eax, self.ebx, self.ecx, self.edx
		)?;
		writeln!(
			f,
			"esi: {:08x} edi: {:08x} ebp: {:08x} esp: {:08x}",
			self.esi, self.edi, self.ebp, self.esp
		)?;
		writeln!(
			f,
			"eip: {:08x} eflags: {:08x} cs: {:04x} ss: {:04x} gs: {:04x} fs: {:04x}",
			self.eip, self.eflags, self.cs, self.ss, self.gs, self.fs
		)?;
		write!(f, "int: {:02x} code: {:08x}", self.int, self.code)
	}
}

/// An IDT header.
#[repr(C, packed)]
struct InterruptDescriptorTable {
	/// The size of the IDT in bytes, minus 1.
	size: u16,
	/// The pointer to the beginning of the IDT.
	offset: u32,
}

/// An IDT entry.
#[repr(C, packed)]
#[derive(Clone, Copy)]
struct InterruptDescriptor {
	/// Bits 0..15 of the address to the handler for the interrupt.
	offset: u16,
	/// The code segment selector to execute the interrupt.
	selector: u16,
	/// Must be set to zero.
	zero: u8,
	/// Interrupt handler flags.
	flags: u8,
	/// Bits 16..31 of the address to the handler for the interrupt.
	offset_2: u16,
}

impl InterruptDescriptor {
	/// Returns a placeholder entry.
	const fn placeholder() -> Self {
		Self {
			offset: 0,
			selector: 0,
			zero: 0,
			flags: 0,
			offset_2: 0,
		}
	}

	/// Creates an IDT entry.
	///
	/// Arguments:
	/// - `address` is the address of the handler.
	/// - `selector` is the segment selector to be used to handle the interrupt.
	/// - `flags` is the set of flags for the entry (see Intel documentation).
	fn new(address: *const c_void, selector: u16, flags: u8) -> Self {
		Self {
			offset: ((address as u32) & 0xffff) as u16,
			selector,
			zero: 0,
			flags,
			offset_2: (((address as u32) >> 16) & 0xffff) as u16,
		}
	}
}

// Interrupt stubs. Every stub normalizes the stack to hold a dummy error code
// for the vectors the CPU does not push one for, then the vector number, and
// finally the saved register file making up `IntFrame`.
global_asm!(
	r#"
.section .text

.macro STUB_NOCODE n
.global error\n
error\n:
	push 0
	push \n
	jmp int_common
.endm

.macro STUB_CODE n
.global error\n
error\n:
	push \n
	jmp int_common
.endm

.macro STUB_IRQ n
.global irq\n
irq\n:
	push 0
	push (0x20 + \n)
	jmp int_common
.endm

STUB_NOCODE 0
STUB_NOCODE 1
STUB_NOCODE 2
STUB_NOCODE 3
STUB_NOCODE 4
STUB_NOCODE 5
STUB_NOCODE 6
STUB_NOCODE 7
STUB_CODE 8
STUB_NOCODE 9
STUB_CODE 10
STUB_CODE 11
STUB_CODE 12
STUB_CODE 13
STUB_CODE 14
STUB_NOCODE 15
STUB_NOCODE 16
STUB_CODE 17
STUB_NOCODE 18
STUB_NOCODE 19
STUB_NOCODE 20
STUB_CODE 21
STUB_NOCODE 22
STUB_NOCODE 23
STUB_NOCODE 24
STUB_NOCODE 25
STUB_NOCODE 26
STUB_NOCODE 27
STUB_NOCODE 28
STUB_NOCODE 29
STUB_CODE 30
STUB_NOCODE 31

STUB_IRQ 0
STUB_IRQ 1
STUB_IRQ 2
STUB_IRQ 3
STUB_IRQ 4
STUB_IRQ 5
STUB_IRQ 6
STUB_IRQ 7
STUB_IRQ 8
STUB_IRQ 9
STUB_IRQ 10
STUB_IRQ 11
STUB_IRQ 12
STUB_IRQ 13
STUB_IRQ 14
STUB_IRQ 15

.global syscall_stub
syscall_stub:
	push 0
	push 0x80
	jmp int_common

int_common:
	push fs
	push gs
	push ebp
	push edi
	push esi
	push edx
	push ecx
	push ebx
	push eax

	# Switch to the kernel data segments
	mov ax, 16
	mov ds, ax
	mov es, ax

	push esp
	call interrupt_handler
	add esp, 4

	# Restore the data segments matching the interrupted ring
	mov eax, [esp + 48]
	and eax, 3
	jz 3f
	mov ax, 35
	jmp 4f
3:
	mov ax, 16
4:
	mov ds, ax
	mov es, ax

	pop eax
	pop ebx
	pop ecx
	pop edx
	pop esi
	pop edi
	pop ebp
	pop gs
	pop fs
	add esp, 8
	iretd
"#
);

extern "C" {
	fn error0();
	fn error1();
	fn error2();
	fn error3();
	fn error4();
	fn error5();
	fn error6();
	fn error7();
	fn error8();
	fn error9();
	fn error10();
	fn error11();
	fn error12();
	fn error13();
	fn error14();
	fn error15();
	fn error16();
	fn error17();
	fn error18();
	fn error19();
	fn error20();
	fn error21();
	fn error22();
	fn error23();
	fn error24();
	fn error25();
	fn error26();
	fn error27();
	fn error28();
	fn error29();
	fn error30();
	fn error31();

	fn irq0();
	fn irq1();
	fn irq2();
	fn irq3();
	fn irq4();
	fn irq5();
	fn irq6();
	fn irq7();
	fn irq8();
	fn irq9();
	fn irq10();
	fn irq11();
	fn irq12();
	fn irq13();
	fn irq14();
	fn irq15();

	fn syscall_stub();
}

/// The list of IDT entries.
static mut IDT_ENTRIES: [InterruptDescriptor; ENTRIES_COUNT] =
	[InterruptDescriptor::placeholder(); ENTRIES_COUNT];

/// Loads the given Interrupt Descriptor Table.
unsafe fn idt_load(idt: *const InterruptDescriptorTable) {
	asm!("lidt [{idt}]", idt = in(reg) idt);
}

/// Fills the gate for vector `vec`.
///
/// Arguments:
/// - `handler` is the address of the assembly stub.
/// - `selector` is the code segment selector to execute the handler with.
/// - `flags` is the set of gate flags.
pub(crate) fn set_gate(vec: usize, handler: *const c_void, selector: u16, flags: u8) {
	// Gates are only touched at boot, before interruptions are enabled
	unsafe {
		IDT_ENTRIES[vec] = InterruptDescriptor::new(handler, selector, flags);
	}
}

/// Sets the present bit of the gate for vector `vec`.
pub(crate) fn enable_gate(vec: usize) {
	unsafe {
		IDT_ENTRIES[vec].flags |= FLAG_PRESENT;
	}
}

/// Clears the present bit of the gate for vector `vec`.
pub(crate) fn disable_gate(vec: usize) {
	unsafe {
		IDT_ENTRIES[vec].flags &= !FLAG_PRESENT;
	}
}

/// Initializes the IDT.
///
/// This function must be called only once at kernel initialization.
///
/// When returning, maskable interrupts are disabled by default.
pub(crate) fn init() {
	cli();
	pic::init(PIC_OFFSET, PIC_OFFSET + 8);

	let sel = gdt::KERNEL_CS as u16;
	// CPU exceptions
	set_gate(0x00, error0 as _, sel, FLAG_INT_GATE);
	set_gate(0x01, error1 as _, sel, FLAG_INT_GATE);
	set_gate(0x02, error2 as _, sel, FLAG_INT_GATE);
	set_gate(0x03, error3 as _, sel, FLAG_INT_GATE);
	set_gate(0x04, error4 as _, sel, FLAG_INT_GATE);
	set_gate(0x05, error5 as _, sel, FLAG_INT_GATE);
	set_gate(0x06, error6 as _, sel, FLAG_INT_GATE);
	set_gate(0x07, error7 as _, sel, FLAG_INT_GATE);
	set_gate(0x08, error8 as _, sel, FLAG_INT_GATE);
	set_gate(0x09, error9 as _, sel, FLAG_INT_GATE);
	set_gate(0x0a, error10 as _, sel, FLAG_INT_GATE);
	set_gate(0x0b, error11 as _, sel, FLAG_INT_GATE);
	set_gate(0x0c, error12 as _, sel, FLAG_INT_GATE);
	set_gate(0x0d, error13 as _, sel, FLAG_INT_GATE);
	set_gate(0x0e, error14 as _, sel, FLAG_INT_GATE);
	set_gate(0x0f, error15 as _, sel, FLAG_INT_GATE);
	set_gate(0x10, error16 as _, sel, FLAG_INT_GATE);
	set_gate(0x11, error17 as _, sel, FLAG_INT_GATE);
	set_gate(0x12, error18 as _, sel, FLAG_INT_GATE);
	set_gate(0x13, error19 as _, sel, FLAG_INT_GATE);
	set_gate(0x14, error20 as _, sel, FLAG_INT_GATE);
	set_gate(0x15, error21 as _, sel, FLAG_INT_GATE);
	set_gate(0x16, error22 as _, sel, FLAG_INT_GATE);
	set_gate(0x17, error23 as _, sel, FLAG_INT_GATE);
	set_gate(0x18, error24 as _, sel, FLAG_INT_GATE);
	set_gate(0x19, error25 as _, sel, FLAG_INT_GATE);
	set_gate(0x1a, error26 as _, sel, FLAG_INT_GATE);
	set_gate(0x1b, error27 as _, sel, FLAG_INT_GATE);
	set_gate(0x1c, error28 as _, sel, FLAG_INT_GATE);
	set_gate(0x1d, error29 as _, sel, FLAG_INT_GATE);
	set_gate(0x1e, error30 as _, sel, FLAG_INT_GATE);
	set_gate(0x1f, error31 as _, sel, FLAG_INT_GATE);
	// PIC interruptions
	set_gate(0x20, irq0 as _, sel, FLAG_INT_GATE);
	set_gate(0x21, irq1 as _, sel, FLAG_INT_GATE);
	set_gate(0x22, irq2 as _, sel, FLAG_INT_GATE);
	set_gate(0x23, irq3 as _, sel, FLAG_INT_GATE);
	set_gate(0x24, irq4 as _, sel, FLAG_INT_GATE);
	set_gate(0x25, irq5 as _, sel, FLAG_INT_GATE);
	set_gate(0x26, irq6 as _, sel, FLAG_INT_GATE);
	set_gate(0x27, irq7 as _, sel, FLAG_INT_GATE);
	set_gate(0x28, irq8 as _, sel, FLAG_INT_GATE);
	set_gate(0x29, irq9 as _, sel, FLAG_INT_GATE);
	set_gate(0x2a, irq10 as _, sel, FLAG_INT_GATE);
	set_gate(0x2b, irq11 as _, sel, FLAG_INT_GATE);
	set_gate(0x2c, irq12 as _, sel, FLAG_INT_GATE);
	set_gate(0x2d, irq13 as _, sel, FLAG_INT_GATE);
	set_gate(0x2e, irq14 as _, sel, FLAG_INT_GATE);
	set_gate(0x2f, irq15 as _, sel, FLAG_INT_GATE);
	// System calls
	set_gate(SYSCALL_ENTRY, syscall_stub as _, sel, FLAG_INT_GATE_USER);

	let idt = InterruptDescriptorTable {
		size: (size_of::<InterruptDescriptor>() * ENTRIES_COUNT - 1) as u16,
		offset: unsafe { IDT_ENTRIES.as_ptr() } as _,
	};
	unsafe {
		idt_load(addr_of!(idt));
	}
}
