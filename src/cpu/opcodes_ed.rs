/*
    z80core: a cycle-counting Z80 CPU emulation library.
    Copyright (C) 2024-2026  Rafal Michalski

    For the full copyright notice, see the lib.rs file.
*/
//! The `ED` page: extended arithmetic, interrupt plumbing, `I`/`R` traffic,
//! nibble rotations and the sixteen block operations.
//!
//! Entries the page leaves undefined execute as 4 T-state no-ops and bump
//! the undefined-instruction counter; the CPU never aborts.
use crate::alu;
use crate::bus::Io;
use crate::parse::{Reg8, Reg16};
use crate::registers::InterruptMode;
use crate::Z80;

/// Which way a block operation walks through memory.
#[derive(Clone, Copy, PartialEq, Eq)]
enum BlockDelta {
    Inc,
    Dec,
}

impl BlockDelta {
    #[inline]
    fn apply(self, val: u16) -> u16 {
        match self {
            BlockDelta::Inc => val.wrapping_add(1),
            BlockDelta::Dec => val.wrapping_sub(1),
        }
    }

    #[inline]
    fn apply8(self, val: u8) -> u8 {
        match self {
            BlockDelta::Inc => val.wrapping_add(1),
            BlockDelta::Dec => val.wrapping_sub(1),
        }
    }
}

impl<D: Io> Z80<D> {
    /// `LDI`/`LDD`/`LDIR`/`LDDR`: one `(HL)` → `(DE)` byte per pass.
    /// 16 T-states, 21 when a repeating form loops.
    fn block_transfer(&mut self, delta: BlockDelta, repeat: bool) -> u16 {
        let hl = self.regs.hl.get16();
        let de = self.regs.de.get16();
        let val = self.ram.read8(hl);
        self.ram.write8(de, val);
        self.regs.hl.set16(delta.apply(hl));
        self.regs.de.set16(delta.apply(de));
        let bc_nonzero = !self.regs.bc.dec16_is_zero();
        let mut flags = self.flags();
        alu::block_ld_flags(self.af.get8hi(), val, bc_nonzero, &mut flags);
        self.set_flags(flags);
        if repeat && bc_nonzero {
            // rewind over the two opcode bytes, the instruction re-runs
            self.pc.add16(0xFFFE);
            21
        } else {
            16
        }
    }

    /// `CPI`/`CPD`/`CPIR`/`CPDR`: one `A - (HL)` compare per pass.
    /// 16 T-states, 21 when a repeating form loops.
    fn block_compare(&mut self, delta: BlockDelta, repeat: bool) -> u16 {
        let hl = self.regs.hl.get16();
        let val = self.ram.read8(hl);
        self.regs.hl.set16(delta.apply(hl));
        let bc_nonzero = !self.regs.bc.dec16_is_zero();
        let mut flags = self.flags();
        let stop = alu::block_cp_flags(self.af.get8hi(), val, bc_nonzero, &mut flags);
        self.set_flags(flags);
        if repeat && !stop {
            self.pc.add16(0xFFFE);
            21
        } else {
            16
        }
    }

    /// `INI`/`IND`/`INIR`/`INDR`: reads the port `BC` selects before `B` is
    /// decremented. 16 T-states, 21 when a repeating form loops.
    fn block_input(&mut self, delta: BlockDelta, repeat: bool) -> u16 {
        let port = self.regs.bc.get16();
        let val = self.io.read_io(port);
        self.ram.write8(self.regs.hl.get16(), val);
        let b = self.regs.bc.get8hi().wrapping_sub(1);
        self.regs.bc.set8hi(b);
        self.regs.hl.set16(delta.apply(self.regs.hl.get16()));
        let m = delta.apply8(self.regs.bc.get8lo());
        let mut flags = self.flags();
        alu::block_io_flags(val, b, m, &mut flags);
        self.set_flags(flags);
        if repeat && b != 0 {
            self.pc.add16(0xFFFE);
            21
        } else {
            16
        }
    }

    /// `OUTI`/`OUTD`/`OTIR`/`OTDR`: writes to the port `BC` selects after
    /// `B` was decremented. 16 T-states, 21 when a repeating form loops.
    fn block_output(&mut self, delta: BlockDelta, repeat: bool) -> u16 {
        let val = self.ram.read8(self.regs.hl.get16());
        let b = self.regs.bc.get8hi().wrapping_sub(1);
        self.regs.bc.set8hi(b);
        self.io.write_io(self.regs.bc.get16(), val);
        let hl = delta.apply(self.regs.hl.get16());
        self.regs.hl.set16(hl);
        let mut flags = self.flags();
        alu::block_io_flags(val, b, hl as u8, &mut flags);
        self.set_flags(flags);
        if repeat && b != 0 {
            self.pc.add16(0xFFFE);
            21
        } else {
            16
        }
    }

    pub(super) fn exec_ed(&mut self) -> u16 {
        self.inc_r();
        let code = self.fetch8();
        match code {
            // IN r,(C) and the value probe IN (C) (0x70): flags, 12 T-states
            0x40 | 0x48 | 0x50 | 0x58 | 0x60 | 0x68 | 0x70 | 0x78 => {
                let val = self.io.read_io(self.regs.bc.get16());
                if let Ok(reg) = Reg8::from_b5_3(code) {
                    self.set_reg8(reg, val);
                }
                let mut flags = self.flags();
                alu::in8_flags(val, &mut flags);
                self.set_flags(flags);
                12
            }
            // OUT (C),r and OUT (C),0 (0x71); 12 T-states
            0x41 | 0x49 | 0x51 | 0x59 | 0x61 | 0x69 | 0x71 | 0x79 => {
                let val = match Reg8::from_b5_3(code) {
                    Ok(reg) => self.get_reg8(reg),
                    Err(_) => 0,
                };
                self.io.write_io(self.regs.bc.get16(), val);
                12
            }
            // SBC HL,dd; 15 T-states
            0x42 | 0x52 | 0x62 | 0x72 => {
                let src = self.get_reg16(Reg16::from(code));
                let mut hl = self.regs.hl.get16();
                let mut flags = self.flags();
                let ts = alu::sbc16(&mut hl, src, &mut flags);
                self.regs.hl.set16(hl);
                self.set_flags(flags);
                ts
            }
            // ADC HL,dd; 15 T-states
            0x4A | 0x5A | 0x6A | 0x7A => {
                let src = self.get_reg16(Reg16::from(code));
                let mut hl = self.regs.hl.get16();
                let mut flags = self.flags();
                let ts = alu::adc16(&mut hl, src, &mut flags);
                self.regs.hl.set16(hl);
                self.set_flags(flags);
                ts
            }
            // LD (nn),dd; 20 T-states
            0x43 | 0x53 | 0x63 | 0x73 => {
                let addr = self.fetch16();
                self.ram.write16(addr, self.get_reg16(Reg16::from(code)));
                20
            }
            // LD dd,(nn); 20 T-states
            0x4B | 0x5B | 0x6B | 0x7B => {
                let addr = self.fetch16();
                let val = self.ram.read16(addr);
                self.reg16_mut(Reg16::from(code)).set16(val);
                20
            }
            // NEG and its shadow opcodes; 8 T-states
            0x44 | 0x4C | 0x54 | 0x5C | 0x64 | 0x6C | 0x74 | 0x7C => {
                let mut acc = self.af.get8hi();
                let mut flags = self.flags();
                alu::neg8(&mut acc, &mut flags);
                self.af.set8hi(acc);
                self.set_flags(flags);
                8
            }
            // RETN/RETI family: IFF1 follows IFF2; 14 T-states
            0x45 | 0x4D | 0x55 | 0x5D | 0x65 | 0x6D | 0x75 | 0x7D => {
                self.iff1 = self.iff2;
                let addr = self.pop16();
                self.pc.set16(addr);
                14
            }
            // IM 0; 8 T-states
            0x46 | 0x4E | 0x66 | 0x6E => {
                self.im = InterruptMode::Mode0;
                8
            }
            // IM 1; 8 T-states
            0x56 | 0x76 => {
                self.im = InterruptMode::Mode1;
                8
            }
            // IM 2; 8 T-states
            0x5E | 0x7E => {
                self.im = InterruptMode::Mode2;
                8
            }
            // LD I,A; 9 T-states
            0x47 => {
                self.ir.set8hi(self.af.get8hi());
                9
            }
            // LD R,A; 9 T-states
            0x4F => {
                self.ir.set8lo(self.af.get8hi());
                9
            }
            // LD A,I; 9 T-states
            0x57 => {
                let val = self.ir.get8hi();
                self.af.set8hi(val);
                let mut flags = self.flags();
                alu::ld_a_ir_flags(val, self.iff2, &mut flags);
                self.set_flags(flags);
                9
            }
            // LD A,R; 9 T-states
            0x5F => {
                let val = self.ir.get8lo();
                self.af.set8hi(val);
                let mut flags = self.flags();
                alu::ld_a_ir_flags(val, self.iff2, &mut flags);
                self.set_flags(flags);
                9
            }
            // RRD; 18 T-states
            0x67 => {
                let addr = self.regs.hl.get16();
                let mut acc = self.af.get8hi();
                let mut mem = self.ram.read8(addr);
                let mut flags = self.flags();
                let ts = alu::rrd8(&mut acc, &mut mem, &mut flags);
                self.af.set8hi(acc);
                self.ram.write8(addr, mem);
                self.set_flags(flags);
                ts
            }
            // RLD; 18 T-states
            0x6F => {
                let addr = self.regs.hl.get16();
                let mut acc = self.af.get8hi();
                let mut mem = self.ram.read8(addr);
                let mut flags = self.flags();
                let ts = alu::rld8(&mut acc, &mut mem, &mut flags);
                self.af.set8hi(acc);
                self.ram.write8(addr, mem);
                self.set_flags(flags);
                ts
            }
            // block transfers
            0xA0 => self.block_transfer(BlockDelta::Inc, false),
            0xA8 => self.block_transfer(BlockDelta::Dec, false),
            0xB0 => self.block_transfer(BlockDelta::Inc, true),
            0xB8 => self.block_transfer(BlockDelta::Dec, true),
            // block compares
            0xA1 => self.block_compare(BlockDelta::Inc, false),
            0xA9 => self.block_compare(BlockDelta::Dec, false),
            0xB1 => self.block_compare(BlockDelta::Inc, true),
            0xB9 => self.block_compare(BlockDelta::Dec, true),
            // block port input
            0xA2 => self.block_input(BlockDelta::Inc, false),
            0xAA => self.block_input(BlockDelta::Dec, false),
            0xB2 => self.block_input(BlockDelta::Inc, true),
            0xBA => self.block_input(BlockDelta::Dec, true),
            // block port output
            0xA3 => self.block_output(BlockDelta::Inc, false),
            0xAB => self.block_output(BlockDelta::Dec, false),
            0xB3 => self.block_output(BlockDelta::Inc, true),
            0xBB => self.block_output(BlockDelta::Dec, true),
            // every other entry is undefined: no-op, 4 T-states, counted
            _ => {
                self.undefined = self.undefined.wrapping_add(1);
                4
            }
        }
    }
}
