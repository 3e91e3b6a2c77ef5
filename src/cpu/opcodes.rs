/*
    z80core: a cycle-counting Z80 CPU emulation library.
    Copyright (C) 2024-2026  Rafal Michalski

    For the full copyright notice, see the lib.rs file.
*/
//! The unprefixed opcode page.
//!
//! The page is dispatched as a flat match. Row-patterned instructions (the
//! `LD r,r'` quarter, the arithmetic quarter, the conditional column) are
//! folded through the bit-field enums of [crate::parse]; every arm returns
//! the nominal T-state cost of its instruction, with memory-operand forms
//! paying their surcharge on top of the ALU's register cost.
use crate::alu;
use crate::bus::Io;
use crate::parse::{restart_address, Condition, Ops8, Prefix, Reg8, Reg16, StkReg16};
use crate::Z80;

impl<D: Io> Z80<D> {
    /// `INC r`; 4 T-states.
    fn inc8_reg(&mut self, reg: Reg8) -> u16 {
        let mut val = self.get_reg8(reg);
        let mut flags = self.flags();
        let ts = alu::inc8(&mut val, &mut flags);
        self.set_reg8(reg, val);
        self.set_flags(flags);
        ts
    }

    /// `DEC r`; 4 T-states.
    fn dec8_reg(&mut self, reg: Reg8) -> u16 {
        let mut val = self.get_reg8(reg);
        let mut flags = self.flags();
        let ts = alu::dec8(&mut val, &mut flags);
        self.set_reg8(reg, val);
        self.set_flags(flags);
        ts
    }

    /// `INC (addr)`/`DEC (addr)`, shared with the indexed page; the cost is
    /// the caller's.
    pub(super) fn inc_dec_mem(&mut self, addr: u16, dec: bool) {
        let mut val = self.ram.read8(addr);
        let mut flags = self.flags();
        if dec {
            alu::dec8(&mut val, &mut flags);
        } else {
            alu::inc8(&mut val, &mut flags);
        }
        self.ram.write8(addr, val);
        self.set_flags(flags);
    }

    /// `ADD HL,dd` and the indexed `ADD ii,pp`; 11 T-states (the prefix
    /// surcharge is the caller's).
    pub(super) fn add16_into(&mut self, prefix: Option<Prefix>, src: u16) -> u16 {
        let mut flags = self.flags();
        let ts = match prefix {
            None => {
                let mut hl = self.regs.hl.get16();
                let ts = alu::add16(&mut hl, src, &mut flags);
                self.regs.hl.set16(hl);
                ts
            }
            Some(prefix) => {
                let mut ii = self.index(prefix).get16();
                let ts = alu::add16(&mut ii, src, &mut flags);
                self.index_mut(prefix).set16(ii);
                ts
            }
        };
        self.set_flags(flags);
        ts
    }

    /// One accumulator rotate of the `RLCA`/`RRCA`/`RLA`/`RRA` group.
    fn acc_rotate(&mut self, code: u8) -> u16 {
        let mut acc = self.af.get8hi();
        let mut flags = self.flags();
        let ts = match code {
            0x07 => alu::rlca8(&mut acc, &mut flags),
            0x0F => alu::rrca8(&mut acc, &mut flags),
            0x17 => alu::rla8(&mut acc, &mut flags),
            _ => alu::rra8(&mut acc, &mut flags),
        };
        self.af.set8hi(acc);
        self.set_flags(flags);
        ts
    }

    /// `EX (SP),rr` for `HL` and the index registers; the cost is the
    /// caller's.
    pub(super) fn ex_sp_with(&mut self, val: u16) -> u16 {
        let sp = self.sp.get16();
        let from_stack = self.ram.read16(sp);
        self.ram.write16(sp, val);
        from_stack
    }

    pub(super) fn exec_main(&mut self, code: u8) -> u16 {
        match code {
            // NOP
            0x00 => 4,
            // LD dd,nn
            0x01 | 0x11 | 0x21 | 0x31 => {
                let nn = self.fetch16();
                self.reg16_mut(Reg16::from(code)).set16(nn);
                10
            }
            // LD (BC),A
            0x02 => {
                self.ram.write8(self.regs.bc.get16(), self.af.get8hi());
                7
            }
            // INC dd
            0x03 | 0x13 | 0x23 | 0x33 => {
                self.reg16_mut(Reg16::from(code)).inc16();
                6
            }
            // DEC dd
            0x0B | 0x1B | 0x2B | 0x3B => {
                self.reg16_mut(Reg16::from(code)).dec16();
                6
            }
            // INC r
            0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x3C => {
                match Reg8::from_b5_3(code) {
                    Ok(reg) => self.inc8_reg(reg),
                    Err(_) => 4,
                }
            }
            // INC (HL)
            0x34 => {
                self.inc_dec_mem(self.regs.hl.get16(), false);
                11
            }
            // DEC r
            0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x3D => {
                match Reg8::from_b5_3(code) {
                    Ok(reg) => self.dec8_reg(reg),
                    Err(_) => 4,
                }
            }
            // DEC (HL)
            0x35 => {
                self.inc_dec_mem(self.regs.hl.get16(), true);
                11
            }
            // LD r,n
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x3E => {
                let n = self.fetch8();
                if let Ok(reg) = Reg8::from_b5_3(code) {
                    self.set_reg8(reg, n);
                }
                7
            }
            // LD (HL),n
            0x36 => {
                let n = self.fetch8();
                self.ram.write8(self.regs.hl.get16(), n);
                10
            }
            // RLCA, RRCA, RLA, RRA
            0x07 | 0x0F | 0x17 | 0x1F => self.acc_rotate(code),
            // EX AF,AF'
            0x08 => {
                self.ex_af_af();
                4
            }
            // ADD HL,dd
            0x09 | 0x19 | 0x29 | 0x39 => {
                let src = self.get_reg16(Reg16::from(code));
                self.add16_into(None, src)
            }
            // LD A,(BC)
            0x0A => {
                let val = self.ram.read8(self.regs.bc.get16());
                self.af.set8hi(val);
                7
            }
            // DJNZ e
            0x10 => {
                let b = self.regs.bc.get8hi().wrapping_sub(1);
                self.regs.bc.set8hi(b);
                let d = self.fetch8() as i8;
                if b != 0 {
                    self.pc.add16(d as u16);
                    13
                } else {
                    8
                }
            }
            // LD (DE),A
            0x12 => {
                self.ram.write8(self.regs.de.get16(), self.af.get8hi());
                7
            }
            // JR e
            0x18 => self.jump_rel(true),
            // LD A,(DE)
            0x1A => {
                let val = self.ram.read8(self.regs.de.get16());
                self.af.set8hi(val);
                7
            }
            // JR cc,e
            0x20 | 0x28 | 0x30 | 0x38 => {
                let cond = Condition::from_jr_subset(code).is_satisfied(self.flags());
                self.jump_rel(cond)
            }
            // LD (nn),HL
            0x22 => {
                let addr = self.fetch16();
                self.ram.write16(addr, self.regs.hl.get16());
                16
            }
            // LD HL,(nn)
            0x2A => {
                let addr = self.fetch16();
                let val = self.ram.read16(addr);
                self.regs.hl.set16(val);
                16
            }
            // DAA
            0x27 => {
                let mut acc = self.af.get8hi();
                let mut flags = self.flags();
                let ts = alu::daa8(&mut acc, &mut flags);
                self.af.set8hi(acc);
                self.set_flags(flags);
                ts
            }
            // CPL
            0x2F => {
                let mut acc = self.af.get8hi();
                let mut flags = self.flags();
                let ts = alu::cpl8(&mut acc, &mut flags);
                self.af.set8hi(acc);
                self.set_flags(flags);
                ts
            }
            // LD (nn),A
            0x32 => {
                let addr = self.fetch16();
                self.ram.write8(addr, self.af.get8hi());
                13
            }
            // LD A,(nn)
            0x3A => {
                let addr = self.fetch16();
                let val = self.ram.read8(addr);
                self.af.set8hi(val);
                13
            }
            // SCF
            0x37 => {
                let mut flags = self.flags();
                let ts = alu::scf(self.af.get8hi(), &mut flags);
                self.set_flags(flags);
                ts
            }
            // CCF
            0x3F => {
                let mut flags = self.flags();
                let ts = alu::ccf(self.af.get8hi(), &mut flags);
                self.set_flags(flags);
                ts
            }
            // LD r,r' | LD r,(HL) | LD (HL),r | HALT
            0x40..=0x7F => match Reg8::tuple_from_b5_3_and_b2_0(code) {
                (Ok(dst), Ok(src)) => {
                    let val = self.get_reg8(src);
                    self.set_reg8(dst, val);
                    4
                }
                (Ok(dst), Err(_)) => {
                    let val = self.ram.read8(self.regs.hl.get16());
                    self.set_reg8(dst, val);
                    7
                }
                (Err(_), Ok(src)) => {
                    let val = self.get_reg8(src);
                    self.ram.write8(self.regs.hl.get16(), val);
                    7
                }
                (Err(_), Err(_)) => {
                    self.halt();
                    4
                }
            },
            // ADD/ADC/SUB/SBC/AND/XOR/OR/CP A,r|(HL)
            0x80..=0xBF => {
                let op = Ops8::from(code);
                match Reg8::from_b2_0(code) {
                    Ok(src) => {
                        let val = self.get_reg8(src);
                        self.op8_acc(op, val)
                    }
                    Err(_) => {
                        let val = self.ram.read8(self.regs.hl.get16());
                        self.op8_acc(op, val) + 3
                    }
                }
            }
            // RET cc
            0xC0 | 0xC8 | 0xD0 | 0xD8 | 0xE0 | 0xE8 | 0xF0 | 0xF8 => {
                let cond = Condition::from(code).is_satisfied(self.flags());
                self.ret(cond)
            }
            // POP qq
            0xC1 | 0xD1 | 0xE1 | 0xF1 => {
                let val = self.pop16();
                match StkReg16::from(code) {
                    StkReg16::BC => self.regs.bc.set16(val),
                    StkReg16::DE => self.regs.de.set16(val),
                    StkReg16::HL => self.regs.hl.set16(val),
                    StkReg16::AF => self.af.set16(val),
                }
                10
            }
            // JP cc,nn
            0xC2 | 0xCA | 0xD2 | 0xDA | 0xE2 | 0xEA | 0xF2 | 0xFA => {
                let cond = Condition::from(code).is_satisfied(self.flags());
                self.jump(cond)
            }
            // JP nn
            0xC3 => self.jump(true),
            // CALL cc,nn
            0xC4 | 0xCC | 0xD4 | 0xDC | 0xE4 | 0xEC | 0xF4 | 0xFC => {
                let cond = Condition::from(code).is_satisfied(self.flags());
                self.call(cond)
            }
            // PUSH qq
            0xC5 | 0xD5 | 0xE5 | 0xF5 => {
                let val = match StkReg16::from(code) {
                    StkReg16::BC => self.regs.bc.get16(),
                    StkReg16::DE => self.regs.de.get16(),
                    StkReg16::HL => self.regs.hl.get16(),
                    StkReg16::AF => self.af.get16(),
                };
                self.push16(val);
                11
            }
            // ADD/ADC/SUB/SBC/AND/XOR/OR/CP A,n
            0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => {
                let n = self.fetch8();
                self.op8_acc(Ops8::from(code), n) + 3
            }
            // RST p
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
                self.restart(restart_address(code))
            }
            // RET
            0xC9 => {
                let addr = self.pop16();
                self.pc.set16(addr);
                10
            }
            // CALL nn
            0xCD => self.call(true),
            // OUT (n),A: the accumulator rides the high half of the port
            0xD3 => {
                let n = self.fetch8();
                let acc = self.af.get8hi();
                let port = u16::from_be_bytes([acc, n]);
                self.io.write_io(port, acc);
                11
            }
            // EXX
            0xD9 => {
                self.exx();
                4
            }
            // IN A,(n): no flags on this form
            0xDB => {
                let n = self.fetch8();
                let port = u16::from_be_bytes([self.af.get8hi(), n]);
                let val = self.io.read_io(port);
                self.af.set8hi(val);
                11
            }
            // EX (SP),HL
            0xE3 => {
                let val = self.ex_sp_with(self.regs.hl.get16());
                self.regs.hl.set16(val);
                19
            }
            // JP (HL)
            0xE9 => {
                self.pc.set16(self.regs.hl.get16());
                4
            }
            // EX DE,HL
            0xEB => {
                core::mem::swap(&mut self.regs.de, &mut self.regs.hl);
                4
            }
            // DI
            0xF3 => {
                self.iff1 = false;
                self.iff2 = false;
                4
            }
            // EI
            0xFB => {
                self.iff1 = true;
                self.iff2 = true;
                4
            }
            // LD SP,HL
            0xF9 => {
                self.sp.set16(self.regs.hl.get16());
                6
            }
            // prefix bytes are dispatched in step() and never reach this
            // page; a bare fetch is charged if one does
            0xCB | 0xDD | 0xED | 0xFD => 4,
        }
    }
}
