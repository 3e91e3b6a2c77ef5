/*
    z80core: a cycle-counting Z80 CPU emulation library.
    Copyright (C) 2024-2026  Rafal Michalski

    For the full copyright notice, see the lib.rs file.
*/
//! The `CB` page: rotates, shifts and single-bit operations.
use crate::alu;
use crate::bus::Io;
use crate::parse::{BitOps, Rot};
use crate::Z80;

impl<D: Io> Z80<D> {
    /// Applies one rotate/shift of the `CB` group to a byte; 8 T-states.
    /// Shared with the `DD CB`/`FD CB` pages.
    pub(super) fn rotate_val(&mut self, rot: Rot, val: &mut u8) -> u16 {
        let mut flags = self.flags();
        let ts = match rot {
            Rot::RLC => alu::rlc8(val, &mut flags),
            Rot::RRC => alu::rrc8(val, &mut flags),
            Rot::RL => alu::rl8(val, &mut flags),
            Rot::RR => alu::rr8(val, &mut flags),
            Rot::SLA => alu::sla8(val, &mut flags),
            Rot::SRA => alu::sra8(val, &mut flags),
            Rot::SLL => alu::sll8(val, &mut flags),
            Rot::SRL => alu::srl8(val, &mut flags),
        };
        self.set_flags(flags);
        ts
    }

    pub(super) fn exec_cb(&mut self) -> u16 {
        self.inc_r();
        let code = self.fetch8();
        match BitOps::from(code) {
            // rot r; 8 T-states
            BitOps::Rot(rot, Ok(reg)) => {
                let mut val = self.get_reg8(reg);
                let ts = self.rotate_val(rot, &mut val);
                self.set_reg8(reg, val);
                ts
            }
            // rot (HL); 15 T-states
            BitOps::Rot(rot, Err(_)) => {
                let addr = self.regs.hl.get16();
                let mut val = self.ram.read8(addr);
                self.rotate_val(rot, &mut val);
                self.ram.write8(addr, val);
                15
            }
            // BIT n,r; 8 T-states
            BitOps::Bit(n, Ok(reg)) => {
                let mut flags = self.flags();
                let ts = alu::bit8(n, self.get_reg8(reg), &mut flags);
                self.set_flags(flags);
                ts
            }
            // BIT n,(HL); 12 T-states
            BitOps::Bit(n, Err(_)) => {
                let val = self.ram.read8(self.regs.hl.get16());
                let mut flags = self.flags();
                alu::bit8(n, val, &mut flags);
                self.set_flags(flags);
                12
            }
            // RES n,r; 8 T-states
            BitOps::Res(n, Ok(reg)) => {
                let mut val = self.get_reg8(reg);
                let ts = alu::res8(n, &mut val);
                self.set_reg8(reg, val);
                ts
            }
            // RES n,(HL); 15 T-states
            BitOps::Res(n, Err(_)) => {
                let addr = self.regs.hl.get16();
                let mut val = self.ram.read8(addr);
                alu::res8(n, &mut val);
                self.ram.write8(addr, val);
                15
            }
            // SET n,r; 8 T-states
            BitOps::Set(n, Ok(reg)) => {
                let mut val = self.get_reg8(reg);
                let ts = alu::set8(n, &mut val);
                self.set_reg8(reg, val);
                ts
            }
            // SET n,(HL); 15 T-states
            BitOps::Set(n, Err(_)) => {
                let addr = self.regs.hl.get16();
                let mut val = self.ram.read8(addr);
                alu::set8(n, &mut val);
                self.ram.write8(addr, val);
                15
            }
        }
    }
}
