/*
    z80core: a cycle-counting Z80 CPU emulation library.
    Copyright (C) 2024-2026  Rafal Michalski

    z80core is free software: you can redistribute it and/or modify it under
    the terms of the GNU Lesser General Public License (LGPL) as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    z80core is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Lesser General Public License for more details.

    You should have received a copy of the GNU Lesser General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.

    Author contact information: see Cargo.toml file, section [package.authors].
*/
/*! # z80core

`z80core` emulates a Zilog Z80 CPU together with the two resources it owns:
a byte-addressable memory and a bank of I/O ports.

```text
  _______
=|       |=      _____________
=|       |=     |             |
=|  Z80  |= <==>|  Ram + Io   |=:::::
=|       |=     |_____________|
=|_______|=
```

Each call to [`Z80::step`] fetches, decodes and executes exactly one
instruction — across all of the `CB`, `ED`, `DD`, `FD`, `DD CB` and `FD CB`
prefix pages — and returns the nominal number of T-states it consumed. The
same count accumulates into a monotonic cycle counter.

The emulated machine is seeded through [`Z80::poke`] and the register
setters, and observed through [`Z80::peek`] and the register getters.
External device models plug in through the [`Io`] trait; the default
[`IoPorts`] implementation is a plain port → byte map.

## Example

```
use z80core::Z80;

// Compute a Fibonacci number the Z80 way.
const FIB_N: u8 = 24;
let program = [
    0x21, 0x00, 0x00, // 0x0000 LD   HL, 0x0000
    0x11, 0x01, 0x00, // 0x0003 LD   DE, 0x0001
    0xEB,             // 0x0006 EX   DE, HL
    0x19,             // 0x0007 ADD  HL, DE
    0x10, 0xFC,       // 0x0008 DJNZ 0x0006
    0x76,             // 0x000A HALT
];

let mut cpu = Z80::new(0x1_0000);
for (addr, byte) in program.iter().enumerate() {
    cpu.poke(addr as u16, *byte);
}
cpu.set_bc(u16::from(FIB_N) << 8); // B = FIB_N

while !cpu.halted() {
    cpu.step();
}
assert_eq!(cpu.hl(), 46368); // Fib(24)
assert_eq!(cpu.cycles(), 10 + 10 + u64::from(FIB_N) * (4 + 11 + 13) - 5 + 4);
```

The T-state tally above reads: two 10-cycle loads, `FIB_N` loop runs of
`EX`+`ADD`+`DJNZ` (4+11+13), the final `DJNZ` falling through 5 cycles
cheaper, and the `HALT` itself.
*/
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod alu;
mod bus;
mod cpu;
mod flags;
mod parse;
mod registers;

pub use bus::{Io, IoPorts, Ram};
pub use cpu::Z80;
pub use flags::CpuFlags;
pub use parse::{Condition, Prefix, Reg8, Reg16, StkReg16};
pub use registers::{GeneralRegisters, InterruptMode, RegisterPair};

/// Selected Z80 opcodes, convenient for assembling test programs.
pub mod opconsts {
    /// Bit operations prefix.
    pub const CB_PREFIX: u8 = 0xCB;
    /// Extended instructions prefix.
    pub const ED_PREFIX: u8 = 0xED;
    /// `IX` instructions prefix.
    pub const DD_PREFIX: u8 = 0xDD;
    /// `IY` instructions prefix.
    pub const FD_PREFIX: u8 = 0xFD;
    /// No operation.
    pub const NOP_OPCODE: u8 = 0x00;
    /// Halt execution.
    pub const HALT_OPCODE: u8 = 0x76;
    /// Disable interrupts.
    pub const DI_OPCODE: u8 = 0xF3;
    /// Enable interrupts.
    pub const EI_OPCODE: u8 = 0xFB;
    /// Return from subroutine.
    pub const RET_OPCODE: u8 = 0xC9;
    /// Call a subroutine.
    pub const CALL_OPCODE: u8 = 0xCD;
    /// Branch to an absolute address.
    pub const JP_OPCODE: u8 = 0xC3;
    /// Branch to a relative address.
    pub const JR_OPCODE: u8 = 0x18;
    /// Decrement `B` and branch to a relative address unless `B` = 0.
    pub const DJNZ_OPCODE: u8 = 0x10;
}
