/*
    z80core: a cycle-counting Z80 CPU emulation library.
    Copyright (C) 2024-2026  Rafal Michalski

    For the full copyright notice, see the lib.rs file.
*/
//! Flag register bits and the mask constructors the ALU composes its results from.
use bitflags::bitflags;

bitflags! {
    /// The Z80 flag register byte, the low half of `AF`.
    ///
    /// With the `serde` feature the type serializes through the impls the
    /// `bitflags` crate provides.
    #[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
    pub struct CpuFlags: u8 {
        /// Sign flag, a copy of the result's bit 7.
        const S  = 0b1000_0000;
        /// Zero flag.
        const Z  = 0b0100_0000;
        /// Undocumented bit 5 of the flag register.
        const Y  = 0b0010_0000;
        /// Half-carry flag, a carry between bits 3 and 4.
        const H  = 0b0001_0000;
        /// Undocumented bit 3 of the flag register.
        const X  = 0b0000_1000;
        /// Parity/overflow flag.
        const PV = 0b0000_0100;
        /// Add/subtract flag, consumed by `DAA`.
        const N  = 0b0000_0010;
        /// Carry flag.
        const C  = 0b0000_0001;
        /// An alias of [CpuFlags::PV].
        const P  = Self::PV.bits();
        /// An alias of [CpuFlags::PV].
        const V  = Self::PV.bits();
        /// Both undocumented bits.
        const XY = Self::X.bits() | Self::Y.bits();
    }
}

impl CpuFlags {
    /// Returns the value of the Carry flag.
    #[inline]
    pub fn cf(self) -> bool {
        self.contains(CpuFlags::C)
    }

    /// Returns the value of the Add/Subtract flag.
    #[inline]
    pub fn nf(self) -> bool {
        self.contains(CpuFlags::N)
    }

    /// Returns the value of the Parity/Overflow flag.
    #[inline]
    pub fn pvf(self) -> bool {
        self.contains(CpuFlags::PV)
    }

    /// Returns the value of the Half Carry flag.
    #[inline]
    pub fn hf(self) -> bool {
        self.contains(CpuFlags::H)
    }

    /// Returns the value of the Zero flag.
    #[inline]
    pub fn zf(self) -> bool {
        self.contains(CpuFlags::Z)
    }

    /// Returns the value of the Sign flag.
    #[inline]
    pub fn sf(self) -> bool {
        self.contains(CpuFlags::S)
    }

    /// `S` from bit 7 of `res`.
    #[inline]
    pub fn mask_sign(res: u8) -> Self {
        Self::from_bits_truncate(res) & CpuFlags::S
    }

    /// `Z` if `res` is zero.
    #[inline]
    pub fn mask_zero(res: u8) -> Self {
        if res == 0 { CpuFlags::Z } else { CpuFlags::empty() }
    }

    /// `X` and `Y` copied from bits 3 and 5 of `res`.
    #[inline]
    pub fn mask_xy(res: u8) -> Self {
        Self::from_bits_truncate(res) & CpuFlags::XY
    }

    /// `S`, `X` and `Y` copied from `res`.
    #[inline]
    pub fn mask_sxy(res: u8) -> Self {
        Self::from_bits_truncate(res) & (CpuFlags::S | CpuFlags::XY)
    }

    /// `S`, `X`, `Y` copied from `res` and `Z` if `res` is zero.
    #[inline]
    pub fn mask_szxy(res: u8) -> Self {
        Self::mask_sxy(res) | Self::mask_zero(res)
    }

    /// `C` when `cf` holds.
    #[inline]
    pub fn mask_carry(cf: bool) -> Self {
        if cf { CpuFlags::C } else { CpuFlags::empty() }
    }

    /// `H` when `hf` holds.
    #[inline]
    pub fn mask_hf(hf: bool) -> Self {
        if hf { CpuFlags::H } else { CpuFlags::empty() }
    }

    /// `N` when `nf` holds.
    #[inline]
    pub fn mask_nf(nf: bool) -> Self {
        if nf { CpuFlags::N } else { CpuFlags::empty() }
    }

    /// `PV` when `pvf` holds.
    #[inline]
    pub fn mask_pvf(pvf: bool) -> Self {
        if pvf { CpuFlags::PV } else { CpuFlags::empty() }
    }

    /// `PV` from the even parity of `res`.
    #[inline]
    pub fn parity(res: u8) -> Self {
        Self::mask_pvf(res.count_ones() & 1 == 0)
    }

    /// The full flag set of the logic group: `S`/`Z`/`X`/`Y` and parity from
    /// `res`, `H` as given, `N` and `C` cleared.
    #[inline]
    pub fn mask_logic(res: u8, hf: bool) -> Self {
        Self::mask_szxy(res) | Self::parity(res) | Self::mask_hf(hf)
    }

    /// The full flag set of the rotate/shift group: `S`/`Z`/`X`/`Y` and parity
    /// from `res`, `C` as given, `H` and `N` cleared.
    #[inline]
    pub fn mask_shift(res: u8, cf: bool) -> Self {
        Self::mask_szxy(res) | Self::parity(res) | Self::mask_carry(cf)
    }

    /// `X` from bit 3 and `Y` from bit 1 of `n`, the block-op convention.
    #[inline]
    pub fn mask_block_xy(n: u8) -> Self {
        Self::from_bits_truncate(n & CpuFlags::X.bits() | n << 4 & CpuFlags::Y.bits())
    }
}
