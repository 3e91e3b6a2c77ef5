/*
    z80core: a cycle-counting Z80 CPU emulation library.
    Copyright (C) 2024-2026  Rafal Michalski

    For the full copyright notice, see the lib.rs file.
*/
//! The CPU proper: architectural state, the fetch/execute loop and the
//! control-flow primitives every page of the dispatcher shares.
mod opcodes;
mod opcodes_cb;
mod opcodes_ed;
mod opcodes_index;

use core::mem::swap;

use crate::alu;
use crate::bus::{Io, IoPorts, Ram};
use crate::flags::CpuFlags;
use crate::parse::{Ops8, Prefix, Reg8, Reg16};
use crate::registers::{GeneralRegisters, InterruptMode, RegisterPair};

/// T-states of an opcode fetch, also the cost of idling in the HALT state.
const M1_TS: u16 = 4;

/// A Zilog Z80 with its memory and I/O port bank on board.
///
/// The CPU is generic over its I/O device model; the default [IoPorts] keeps
/// a plain port → byte map. [`Z80::step`] runs exactly one instruction and
/// returns its T-state cost; everything else is seeding and observing state.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Z80<D: Io = IoPorts> {
    af: RegisterPair,
    af_alt: RegisterPair,
    regs: GeneralRegisters,
    regs_alt: GeneralRegisters,
    pc: RegisterPair,
    sp: RegisterPair,
    ix: RegisterPair,
    iy: RegisterPair,
    /// Interrupt page `I` in the high half, refresh `R` in the low half.
    ir: RegisterPair,
    im: InterruptMode,
    iff1: bool,
    iff2: bool,
    halted: bool,
    cycles: u64,
    undefined: u32,
    ram: Ram,
    io: D,
}

impl Default for Z80 {
    fn default() -> Self {
        Z80::new(0x1_0000)
    }
}

impl Z80 {
    /// Creates a CPU owning a zero-filled memory of `ram_size` bytes
    /// (canonically 65 536) and an empty [IoPorts] bank.
    pub fn new(ram_size: usize) -> Self {
        Z80::with_io(ram_size, IoPorts::new())
    }

    /// Makes `port` appear in the port bank, reading 0 until written.
    pub fn register_port(&mut self, port: u16) {
        self.io.register(port);
    }
}

impl<D: Io> Z80<D> {
    /// Creates a CPU owning a zero-filled memory of `ram_size` bytes and the
    /// given I/O device model.
    pub fn with_io(ram_size: usize, io: D) -> Self {
        Z80 {
            af: RegisterPair::default(),
            af_alt: RegisterPair::default(),
            regs: GeneralRegisters::default(),
            regs_alt: GeneralRegisters::default(),
            pc: RegisterPair::default(),
            sp: RegisterPair::default(),
            ix: RegisterPair::default(),
            iy: RegisterPair::default(),
            ir: RegisterPair::default(),
            im: InterruptMode::default(),
            iff1: false,
            iff2: false,
            halted: false,
            cycles: 0,
            undefined: 0,
            ram: Ram::new(ram_size),
            io,
        }
    }

    /// Returns the CPU to its power-on state: every register, flip-flop and
    /// counter zeroed. Memory contents and port latches are left alone.
    pub fn reset(&mut self) {
        self.af = RegisterPair::default();
        self.af_alt = RegisterPair::default();
        self.regs = GeneralRegisters::default();
        self.regs_alt = GeneralRegisters::default();
        self.pc = RegisterPair::default();
        self.sp = RegisterPair::default();
        self.ix = RegisterPair::default();
        self.iy = RegisterPair::default();
        self.ir = RegisterPair::default();
        self.im = InterruptMode::default();
        self.iff1 = false;
        self.iff2 = false;
        self.halted = false;
        self.cycles = 0;
        self.undefined = 0;
    }

    /// Executes one instruction and returns the T-states it consumed.
    ///
    /// In the HALT state nothing is fetched: the step charges the 4 T-states
    /// of the idle refresh cycle and leaves `PC` where `HALT` put it.
    pub fn step(&mut self) -> u16 {
        self.inc_r();
        let ts = if self.halted {
            M1_TS
        } else {
            let code = self.fetch8();
            match code {
                0xCB => self.exec_cb(),
                0xED => self.exec_ed(),
                0xDD => self.exec_index(Prefix::Xdd),
                0xFD => self.exec_index(Prefix::Yfd),
                _ => self.exec_main(code),
            }
        };
        self.cycles += u64::from(ts);
        ts
    }

    //##############################//
    //      fetching & stack        //
    //##############################//

    /// Reads the byte at `PC` and advances `PC` past it.
    #[inline]
    fn fetch8(&mut self) -> u8 {
        let byte = self.ram.read8(self.pc.get16());
        self.pc.inc16();
        byte
    }

    /// Reads the little-endian word at `PC` and advances `PC` past it.
    #[inline]
    fn fetch16(&mut self) -> u16 {
        let lo = self.fetch8();
        let hi = self.fetch8();
        u16::from_le_bytes([lo, hi])
    }

    /// Fetches a displacement byte and forms the `(IX+d)`/`(IY+d)` address.
    #[inline]
    fn fetch_index_addr(&mut self, prefix: Prefix) -> u16 {
        let d = self.fetch8() as i8;
        self.index(prefix).get16().wrapping_add(d as u16)
    }

    /// Pushes a word: high byte at `SP-1`, low byte at `SP-2`.
    fn push16(&mut self, val: u16) {
        let [lo, hi] = val.to_le_bytes();
        self.sp.dec16();
        self.ram.write8(self.sp.get16(), hi);
        self.sp.dec16();
        self.ram.write8(self.sp.get16(), lo);
    }

    /// Pops a word: low byte from `SP`, high byte from `SP+1`.
    fn pop16(&mut self) -> u16 {
        let lo = self.ram.read8(self.sp.get16());
        self.sp.inc16();
        let hi = self.ram.read8(self.sp.get16());
        self.sp.inc16();
        u16::from_le_bytes([lo, hi])
    }

    /// Bumps the 7-bit refresh counter, preserving bit 7 of `R`.
    #[inline]
    fn inc_r(&mut self) {
        let r = self.ir.get8lo();
        self.ir.set8lo(r & 0x80 | r.wrapping_add(1) & 0x7F);
    }

    //##############################//
    //      register plumbing       //
    //##############################//

    #[inline]
    fn get_reg8(&self, reg: Reg8) -> u8 {
        match reg {
            Reg8::B => self.regs.bc.get8hi(),
            Reg8::C => self.regs.bc.get8lo(),
            Reg8::D => self.regs.de.get8hi(),
            Reg8::E => self.regs.de.get8lo(),
            Reg8::H => self.regs.hl.get8hi(),
            Reg8::L => self.regs.hl.get8lo(),
            Reg8::A => self.af.get8hi(),
        }
    }

    #[inline]
    fn set_reg8(&mut self, reg: Reg8, val: u8) {
        match reg {
            Reg8::B => self.regs.bc.set8hi(val),
            Reg8::C => self.regs.bc.set8lo(val),
            Reg8::D => self.regs.de.set8hi(val),
            Reg8::E => self.regs.de.set8lo(val),
            Reg8::H => self.regs.hl.set8hi(val),
            Reg8::L => self.regs.hl.set8lo(val),
            Reg8::A => self.af.set8hi(val),
        }
    }

    /// Like [Z80::get_reg8] but `H`/`L` address the index register halves,
    /// the way a `DD`/`FD` prefix redirects them.
    #[inline]
    fn get_reg8_prefixed(&self, reg: Reg8, prefix: Prefix) -> u8 {
        match reg {
            Reg8::H => self.index(prefix).get8hi(),
            Reg8::L => self.index(prefix).get8lo(),
            _ => self.get_reg8(reg),
        }
    }

    #[inline]
    fn set_reg8_prefixed(&mut self, reg: Reg8, prefix: Prefix, val: u8) {
        match reg {
            Reg8::H => self.index_mut(prefix).set8hi(val),
            Reg8::L => self.index_mut(prefix).set8lo(val),
            _ => self.set_reg8(reg, val),
        }
    }

    #[inline]
    fn get_reg16(&self, reg: Reg16) -> u16 {
        match reg {
            Reg16::BC => self.regs.bc.get16(),
            Reg16::DE => self.regs.de.get16(),
            Reg16::HL => self.regs.hl.get16(),
            Reg16::SP => self.sp.get16(),
        }
    }

    #[inline]
    fn reg16_mut(&mut self, reg: Reg16) -> &mut RegisterPair {
        match reg {
            Reg16::BC => &mut self.regs.bc,
            Reg16::DE => &mut self.regs.de,
            Reg16::HL => &mut self.regs.hl,
            Reg16::SP => &mut self.sp,
        }
    }

    #[inline]
    fn index(&self, prefix: Prefix) -> RegisterPair {
        match prefix {
            Prefix::Xdd => self.ix,
            Prefix::Yfd => self.iy,
        }
    }

    #[inline]
    fn index_mut(&mut self, prefix: Prefix) -> &mut RegisterPair {
        match prefix {
            Prefix::Xdd => &mut self.ix,
            Prefix::Yfd => &mut self.iy,
        }
    }

    /// The current flags, decoded from the low half of `AF`.
    #[inline]
    pub fn flags(&self) -> CpuFlags {
        CpuFlags::from_bits_retain(self.af.get8lo())
    }

    /// Replaces the flag byte.
    #[inline]
    pub fn set_flags(&mut self, flags: CpuFlags) {
        self.af.set8lo(flags.bits());
    }

    /// Runs one accumulator ALU operation; the flag work happens in [alu].
    fn op8_acc(&mut self, op: Ops8, val: u8) -> u16 {
        let mut acc = self.af.get8hi();
        let mut flags = self.flags();
        let ts = match op {
            Ops8::ADD => alu::add8(&mut acc, val, &mut flags),
            Ops8::ADC => alu::adc8(&mut acc, val, &mut flags),
            Ops8::SUB => alu::sub8(&mut acc, val, &mut flags),
            Ops8::SBC => alu::sbc8(&mut acc, val, &mut flags),
            Ops8::AND => alu::and8(&mut acc, val, &mut flags),
            Ops8::XOR => alu::xor8(&mut acc, val, &mut flags),
            Ops8::OR => alu::or8(&mut acc, val, &mut flags),
            Ops8::CP => alu::cp8(acc, val, &mut flags),
        };
        self.af.set8hi(acc);
        self.set_flags(flags);
        ts
    }

    //##############################//
    //      control primitives      //
    //##############################//

    /// `JP cc,nn`: 10 T-states taken or not.
    fn jump(&mut self, cond: bool) -> u16 {
        let target = self.fetch16();
        if cond {
            self.pc.set16(target);
        }
        10
    }

    /// `JR cc,e`: the signed displacement applies after its byte was
    /// consumed; 12 T-states taken, 7 not.
    fn jump_rel(&mut self, cond: bool) -> u16 {
        let d = self.fetch8() as i8;
        if cond {
            self.pc.add16(d as u16);
            12
        } else {
            7
        }
    }

    /// `CALL cc,nn`: pushes the address after the immediate; 17 T-states
    /// taken, 10 not.
    fn call(&mut self, cond: bool) -> u16 {
        let target = self.fetch16();
        if cond {
            let ret_addr = self.pc.get16();
            self.push16(ret_addr);
            self.pc.set16(target);
            17
        } else {
            10
        }
    }

    /// `RET cc`: 11 T-states taken, 5 not. (Unconditional `RET` is a plain
    /// 10 T-state pop at the dispatch site.)
    fn ret(&mut self, cond: bool) -> u16 {
        if cond {
            let addr = self.pop16();
            self.pc.set16(addr);
            11
        } else {
            5
        }
    }

    /// `RST p`: pushes the address past the opcode, jumps to page zero;
    /// 11 T-states.
    fn restart(&mut self, addr: u16) -> u16 {
        let ret_addr = self.pc.get16();
        self.push16(ret_addr);
        self.pc.set16(addr);
        11
    }

    /// `EX AF,AF'`.
    fn ex_af_af(&mut self) {
        swap(&mut self.af, &mut self.af_alt);
    }

    /// `EXX`.
    fn exx(&mut self) {
        swap(&mut self.regs, &mut self.regs_alt);
    }

    /// `HALT`: idempotent; leaving it is the embedder's business.
    fn halt(&mut self) {
        self.halted = true;
    }

    //##############################//
    //        public surface        //
    //##############################//

    /// Reads the byte at `addr` without running the clock.
    #[inline]
    pub fn peek(&self, addr: u16) -> u8 {
        self.ram.read8(addr)
    }

    /// Writes the byte at `addr` without running the clock.
    #[inline]
    pub fn poke(&mut self, addr: u16, value: u8) {
        self.ram.write8(addr, value);
    }

    /// Reads the little-endian word at `addr`.
    #[inline]
    pub fn peek16(&self, addr: u16) -> u16 {
        self.ram.read16(addr)
    }

    /// Writes the little-endian word at `addr`.
    #[inline]
    pub fn poke16(&mut self, addr: u16, value: u16) {
        self.ram.write16(addr, value);
    }

    /// Reads a byte from the I/O device at `port`, as `IN` would.
    #[inline]
    pub fn in_port(&mut self, port: u16) -> u8 {
        self.io.read_io(port)
    }

    /// Writes a byte to the I/O device at `port`, as `OUT` would.
    #[inline]
    pub fn out_port(&mut self, port: u16, value: u8) {
        self.io.write_io(port, value);
    }

    /// The owned memory.
    pub fn ram(&self) -> &Ram {
        &self.ram
    }

    /// The owned memory, mutably.
    pub fn ram_mut(&mut self) -> &mut Ram {
        &mut self.ram
    }

    /// The owned I/O device model.
    pub fn io(&self) -> &D {
        &self.io
    }

    /// The owned I/O device model, mutably.
    pub fn io_mut(&mut self) -> &mut D {
        &mut self.io
    }

    /// Cumulative T-states executed so far; never decreases.
    #[inline]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// How many undefined opcode page entries were stepped over.
    #[inline]
    pub fn undefined_ops(&self) -> u32 {
        self.undefined
    }

    /// `true` while the CPU sits in the HALT state.
    #[inline]
    pub fn halted(&self) -> bool {
        self.halted
    }

    #[inline]
    pub fn pc(&self) -> u16 {
        self.pc.get16()
    }

    #[inline]
    pub fn set_pc(&mut self, pc: u16) {
        self.pc.set16(pc);
    }

    #[inline]
    pub fn sp(&self) -> u16 {
        self.sp.get16()
    }

    #[inline]
    pub fn set_sp(&mut self, sp: u16) {
        self.sp.set16(sp);
    }

    /// `AF` of the current bank; the low byte is the flag register.
    #[inline]
    pub fn af(&self) -> u16 {
        self.af.get16()
    }

    #[inline]
    pub fn set_af(&mut self, af: u16) {
        self.af.set16(af);
    }

    /// `AF` of the alternate bank.
    #[inline]
    pub fn af_alt(&self) -> u16 {
        self.af_alt.get16()
    }

    #[inline]
    pub fn set_af_alt(&mut self, af: u16) {
        self.af_alt.set16(af);
    }

    #[inline]
    pub fn bc(&self) -> u16 {
        self.regs.bc.get16()
    }

    #[inline]
    pub fn set_bc(&mut self, bc: u16) {
        self.regs.bc.set16(bc);
    }

    #[inline]
    pub fn bc_alt(&self) -> u16 {
        self.regs_alt.bc.get16()
    }

    #[inline]
    pub fn set_bc_alt(&mut self, bc: u16) {
        self.regs_alt.bc.set16(bc);
    }

    #[inline]
    pub fn de(&self) -> u16 {
        self.regs.de.get16()
    }

    #[inline]
    pub fn set_de(&mut self, de: u16) {
        self.regs.de.set16(de);
    }

    #[inline]
    pub fn de_alt(&self) -> u16 {
        self.regs_alt.de.get16()
    }

    #[inline]
    pub fn set_de_alt(&mut self, de: u16) {
        self.regs_alt.de.set16(de);
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        self.regs.hl.get16()
    }

    #[inline]
    pub fn set_hl(&mut self, hl: u16) {
        self.regs.hl.set16(hl);
    }

    #[inline]
    pub fn hl_alt(&self) -> u16 {
        self.regs_alt.hl.get16()
    }

    #[inline]
    pub fn set_hl_alt(&mut self, hl: u16) {
        self.regs_alt.hl.set16(hl);
    }

    #[inline]
    pub fn ix(&self) -> u16 {
        self.ix.get16()
    }

    #[inline]
    pub fn set_ix(&mut self, ix: u16) {
        self.ix.set16(ix);
    }

    #[inline]
    pub fn iy(&self) -> u16 {
        self.iy.get16()
    }

    #[inline]
    pub fn set_iy(&mut self, iy: u16) {
        self.iy.set16(iy);
    }

    /// The interrupt page register `I`.
    #[inline]
    pub fn i(&self) -> u8 {
        self.ir.get8hi()
    }

    #[inline]
    pub fn set_i(&mut self, i: u8) {
        self.ir.set8hi(i);
    }

    /// The memory refresh register `R`.
    #[inline]
    pub fn r(&self) -> u8 {
        self.ir.get8lo()
    }

    #[inline]
    pub fn set_r(&mut self, r: u8) {
        self.ir.set8lo(r);
    }

    /// Both interrupt flip-flops as `(IFF1, IFF2)`.
    #[inline]
    pub fn iffs(&self) -> (bool, bool) {
        (self.iff1, self.iff2)
    }

    #[inline]
    pub fn set_iffs(&mut self, iff1: bool, iff2: bool) {
        self.iff1 = iff1;
        self.iff2 = iff2;
    }

    #[inline]
    pub fn im(&self) -> InterruptMode {
        self.im
    }

    #[inline]
    pub fn set_im(&mut self, im: InterruptMode) {
        self.im = im;
    }
}
