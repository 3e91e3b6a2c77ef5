/*
    z80core: a cycle-counting Z80 CPU emulation library.
    Copyright (C) 2024-2026  Rafal Michalski

    For the full copyright notice, see the lib.rs file.
*/
//! The `DD`/`FD` pages: every `HL`, `H`, `L` or `(HL)` reference of the
//! unprefixed page redirected to `IX`/`IY`, their byte halves, or `(IX+d)`.
//!
//! Opcodes with no `HL` involvement fall through to the unprefixed page and
//! only pay the 4 T-states of the prefix fetch. A second prefix (or an `ED`)
//! terminates the instruction: the stray prefix stands alone for 4 T-states
//! and decoding resumes at the following byte on the next step.
//!
//! On the doubly-prefixed `DD CB`/`FD CB` pages the displacement byte comes
//! *before* the final opcode; all of their operations work on `(IX+d)`, and
//! the rotate/`RES`/`SET` forms additionally copy the result into the
//! register their low bits name.
use crate::alu;
use crate::bus::Io;
use crate::parse::{BitOps, Ops8, Prefix, Reg8, Reg16};
use crate::Z80;

impl<D: Io> Z80<D> {
    pub(super) fn exec_index(&mut self, prefix: Prefix) -> u16 {
        self.inc_r();
        let code = self.fetch8();
        match code {
            // a chained prefix or an ED opcode ignores this prefix: charge
            // the prefix fetch alone and re-dispatch next step
            0xDD | 0xFD | 0xED => {
                self.pc.dec16();
                4
            }
            0xCB => self.exec_index_cb(prefix),
            // ADD ii,pp; 15 T-states
            0x09 | 0x19 | 0x29 | 0x39 => {
                let src = match Reg16::from(code) {
                    Reg16::HL => self.index(prefix).get16(),
                    reg => self.get_reg16(reg),
                };
                self.add16_into(Some(prefix), src) + 4
            }
            // LD ii,nn; 14 T-states
            0x21 => {
                let nn = self.fetch16();
                self.index_mut(prefix).set16(nn);
                14
            }
            // LD (nn),ii; 20 T-states
            0x22 => {
                let addr = self.fetch16();
                self.ram.write16(addr, self.index(prefix).get16());
                20
            }
            // INC ii; 10 T-states
            0x23 => {
                self.index_mut(prefix).inc16();
                10
            }
            // LD ii,(nn); 20 T-states
            0x2A => {
                let addr = self.fetch16();
                let val = self.ram.read16(addr);
                self.index_mut(prefix).set16(val);
                20
            }
            // DEC ii; 10 T-states
            0x2B => {
                self.index_mut(prefix).dec16();
                10
            }
            // INC/DEC IXH, IXL (and the IY halves); 8 T-states
            0x24 | 0x25 | 0x2C | 0x2D => {
                if let Ok(reg) = Reg8::from_b5_3(code) {
                    let mut val = self.get_reg8_prefixed(reg, prefix);
                    let mut flags = self.flags();
                    let ts = if code & 1 == 0 {
                        alu::inc8(&mut val, &mut flags)
                    } else {
                        alu::dec8(&mut val, &mut flags)
                    };
                    self.set_reg8_prefixed(reg, prefix, val);
                    self.set_flags(flags);
                    ts + 4
                } else {
                    8
                }
            }
            // LD IXH,n / LD IXL,n; 11 T-states
            0x26 | 0x2E => {
                let n = self.fetch8();
                if let Ok(reg) = Reg8::from_b5_3(code) {
                    self.set_reg8_prefixed(reg, prefix, n);
                }
                11
            }
            // INC (ii+d) / DEC (ii+d); 23 T-states
            0x34 | 0x35 => {
                let addr = self.fetch_index_addr(prefix);
                self.inc_dec_mem(addr, code == 0x35);
                23
            }
            // LD (ii+d),n: the displacement precedes the immediate;
            // 19 T-states
            0x36 => {
                let addr = self.fetch_index_addr(prefix);
                let n = self.fetch8();
                self.ram.write8(addr, n);
                19
            }
            // the LD quarter. With a memory operand the *register* side
            // stays unprefixed: LD H,(IX+d) really loads H.
            0x40..=0x7F => match Reg8::tuple_from_b5_3_and_b2_0(code) {
                // LD r,r' over index halves; 8 T-states
                (Ok(dst), Ok(src)) => {
                    let val = self.get_reg8_prefixed(src, prefix);
                    self.set_reg8_prefixed(dst, prefix, val);
                    8
                }
                // LD r,(ii+d); 19 T-states
                (Ok(dst), Err(_)) => {
                    let addr = self.fetch_index_addr(prefix);
                    let val = self.ram.read8(addr);
                    self.set_reg8(dst, val);
                    19
                }
                // LD (ii+d),r; 19 T-states
                (Err(_), Ok(src)) => {
                    let addr = self.fetch_index_addr(prefix);
                    let val = self.get_reg8(src);
                    self.ram.write8(addr, val);
                    19
                }
                // a prefixed HALT still halts; 8 T-states
                (Err(_), Err(_)) => {
                    self.halt();
                    8
                }
            },
            // the arithmetic quarter over index halves or (ii+d)
            0x80..=0xBF => {
                let op = Ops8::from(code);
                match Reg8::from_b2_0(code) {
                    // 8 T-states
                    Ok(src) => {
                        let val = self.get_reg8_prefixed(src, prefix);
                        self.op8_acc(op, val) + 4
                    }
                    // 19 T-states
                    Err(_) => {
                        let addr = self.fetch_index_addr(prefix);
                        let val = self.ram.read8(addr);
                        self.op8_acc(op, val) + 15
                    }
                }
            }
            // POP ii; 14 T-states
            0xE1 => {
                let val = self.pop16();
                self.index_mut(prefix).set16(val);
                14
            }
            // EX (SP),ii; 23 T-states
            0xE3 => {
                let val = self.ex_sp_with(self.index(prefix).get16());
                self.index_mut(prefix).set16(val);
                23
            }
            // PUSH ii; 15 T-states
            0xE5 => {
                let val = self.index(prefix).get16();
                self.push16(val);
                15
            }
            // JP (ii); 8 T-states
            0xE9 => {
                self.pc.set16(self.index(prefix).get16());
                8
            }
            // LD SP,ii; 10 T-states
            0xF9 => {
                self.sp.set16(self.index(prefix).get16());
                10
            }
            // no HL involvement: the prefix only cost its fetch
            _ => self.exec_main(code) + 4,
        }
    }

    /// The `DD CB`/`FD CB` page: `d` was encoded before the final opcode.
    fn exec_index_cb(&mut self, prefix: Prefix) -> u16 {
        let addr = self.fetch_index_addr(prefix);
        let code = self.fetch8();
        match BitOps::from(code) {
            // rot (ii+d) with the undocumented register copy; 23 T-states
            BitOps::Rot(rot, reg) => {
                let mut val = self.ram.read8(addr);
                self.rotate_val(rot, &mut val);
                self.ram.write8(addr, val);
                if let Ok(reg) = reg {
                    self.set_reg8(reg, val);
                }
                23
            }
            // BIT n,(ii+d): the register field is ignored; 20 T-states
            BitOps::Bit(n, _) => {
                let val = self.ram.read8(addr);
                let mut flags = self.flags();
                alu::bit8(n, val, &mut flags);
                self.set_flags(flags);
                20
            }
            // RES n,(ii+d) with the register copy; 23 T-states
            BitOps::Res(n, reg) => {
                let mut val = self.ram.read8(addr);
                alu::res8(n, &mut val);
                self.ram.write8(addr, val);
                if let Ok(reg) = reg {
                    self.set_reg8(reg, val);
                }
                23
            }
            // SET n,(ii+d) with the register copy; 23 T-states
            BitOps::Set(n, reg) => {
                let mut val = self.ram.read8(addr);
                alu::set8(n, &mut val);
                self.ram.write8(addr, val);
                if let Ok(reg) = reg {
                    self.set_reg8(reg, val);
                }
                23
            }
        }
    }
}
