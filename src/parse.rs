/*
    z80core: a cycle-counting Z80 CPU emulation library.
    Copyright (C) 2024-2026  Rafal Michalski

    For the full copyright notice, see the lib.rs file.
*/
//! Op-code bit field parsing and the enums the dispatcher works with.
//!
//! A Z80 op-code byte packs its operands into three bit fields:
//! `0b_xx_yyy_zzz`. The `yyy` and `zzz` fields select 8-bit registers, `yy0`/
//! `yy1` pairs select 16-bit registers, conditions or operation kinds. The
//! enums below name those selections; their `From`/`TryFrom` impls do the
//! masking.
use core::fmt;

use crate::flags::CpuFlags;

/// An index register prefix, modifying how the next op-code treats `HL`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Prefix {
    /// `0xDD`: `HL` becomes `IX`.
    Xdd = 0xDD,
    /// `0xFD`: `HL` becomes `IY`.
    Yfd = 0xFD,
}

impl TryFrom<u8> for Prefix {
    type Error = ();

    #[inline]
    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0xDD => Ok(Prefix::Xdd),
            0xFD => Ok(Prefix::Yfd),
            _ => Err(()),
        }
    }
}

/// Displays the prefix as the index register it selects.
impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Prefix::Xdd => "IX",
            Prefix::Yfd => "IY",
        })
    }
}

/// An 8-bit register operand. The `0b110` encoding is `(HL)` and has no
/// variant here; parsers return `Err(())` for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Reg8 {
    B = 0b000,
    C = 0b001,
    D = 0b010,
    E = 0b011,
    H = 0b100,
    L = 0b101,
    A = 0b111,
}

impl TryFrom<u8> for Reg8 {
    type Error = ();

    #[inline]
    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code & 0b111 {
            0b000 => Ok(Reg8::B),
            0b001 => Ok(Reg8::C),
            0b010 => Ok(Reg8::D),
            0b011 => Ok(Reg8::E),
            0b100 => Ok(Reg8::H),
            0b101 => Ok(Reg8::L),
            0b111 => Ok(Reg8::A),
            _ => Err(()),
        }
    }
}

impl Reg8 {
    /// Parses bits 3..=5 of `code`, the destination field.
    #[inline]
    pub(crate) fn from_b5_3(code: u8) -> Result<Reg8, ()> {
        Reg8::try_from(code >> 3)
    }

    /// Parses bits 0..=2 of `code`, the source field.
    #[inline]
    pub(crate) fn from_b2_0(code: u8) -> Result<Reg8, ()> {
        Reg8::try_from(code)
    }

    /// Parses both register fields of `code` at once.
    #[inline]
    pub(crate) fn tuple_from_b5_3_and_b2_0(code: u8) -> (Result<Reg8, ()>, Result<Reg8, ()>) {
        (Reg8::from_b5_3(code), Reg8::from_b2_0(code))
    }
}

impl fmt::Display for Reg8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Reg8::B => "B",
            Reg8::C => "C",
            Reg8::D => "D",
            Reg8::E => "E",
            Reg8::H => "H",
            Reg8::L => "L",
            Reg8::A => "A",
        })
    }
}

macro_rules! pair_enum_from_b5_4 {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $bits:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum $name {
            $($variant = $bits,)+
        }

        impl From<u8> for $name {
            /// Parses bits 4..=5 of an op-code.
            #[inline]
            fn from(code: u8) -> Self {
                match code & 0b0011_0000 {
                    $($bits => $name::$variant,)+
                    _ => unreachable!(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(match self {
                    $($name::$variant => stringify!($variant),)+
                })
            }
        }
    };
}

pair_enum_from_b5_4! {
    /// A 16-bit register operand of the `dd` kind (`SP` column).
    Reg16 {
        BC = 0b0000_0000,
        DE = 0b0001_0000,
        HL = 0b0010_0000,
        SP = 0b0011_0000,
    }
}

pair_enum_from_b5_4! {
    /// A 16-bit register operand of the `qq` kind (`AF` column, PUSH/POP).
    StkReg16 {
        BC = 0b0000_0000,
        DE = 0b0001_0000,
        HL = 0b0010_0000,
        AF = 0b0011_0000,
    }
}

macro_rules! op_enum_from_b5_3 {
    ($(#[$meta:meta])* $vis:vis $name:ident { $($variant:ident = $bits:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(u8)]
        $vis enum $name {
            $($variant = $bits,)+
        }

        impl From<u8> for $name {
            /// Parses bits 3..=5 of an op-code.
            #[inline]
            fn from(code: u8) -> Self {
                match code & 0b0011_1000 {
                    $($bits => $name::$variant,)+
                    _ => unreachable!(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(match self {
                    $($name::$variant => stringify!($variant),)+
                })
            }
        }
    };
}

op_enum_from_b5_3! {
    /// An accumulator arithmetic/logic operation selector.
    pub(crate) Ops8 {
        ADD = 0b0000_0000,
        ADC = 0b0000_1000,
        SUB = 0b0001_0000,
        SBC = 0b0001_1000,
        AND = 0b0010_0000,
        XOR = 0b0010_1000,
        OR  = 0b0011_0000,
        CP  = 0b0011_1000,
    }
}

op_enum_from_b5_3! {
    /// A rotate/shift operation selector of the `CB` page.
    pub(crate) Rot {
        RLC = 0b0000_0000,
        RRC = 0b0000_1000,
        RL  = 0b0001_0000,
        RR  = 0b0001_1000,
        SLA = 0b0010_0000,
        SRA = 0b0010_1000,
        SLL = 0b0011_0000,
        SRL = 0b0011_1000,
    }
}

op_enum_from_b5_3! {
    /// A branch condition code.
    pub Condition {
        NZ = 0b0000_0000,
        Z  = 0b0000_1000,
        NC = 0b0001_0000,
        C  = 0b0001_1000,
        PO = 0b0010_0000,
        PE = 0b0010_1000,
        P  = 0b0011_0000,
        M  = 0b0011_1000,
    }
}

impl Condition {
    /// Parses a `JR cc` op-code, which only encodes `NZ`, `Z`, `NC` and `C`.
    #[inline]
    pub(crate) fn from_jr_subset(code: u8) -> Self {
        Condition::from(code & 0b0001_1000)
    }

    /// Evaluates the condition against the given flags.
    #[inline]
    pub fn is_satisfied(self, flags: CpuFlags) -> bool {
        match self {
            Condition::NZ => !flags.zf(),
            Condition::Z => flags.zf(),
            Condition::NC => !flags.cf(),
            Condition::C => flags.cf(),
            Condition::PO => !flags.pvf(),
            Condition::PE => flags.pvf(),
            Condition::P => !flags.sf(),
            Condition::M => flags.sf(),
        }
    }
}

/// A decoded `CB`-page op-code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BitOps {
    /// A rotate or shift; `Err(())` in the register slot selects `(HL)`.
    Rot(Rot, Result<Reg8, ()>),
    /// `BIT b, r|(HL)`.
    Bit(u32, Result<Reg8, ()>),
    /// `RES b, r|(HL)`.
    Res(u32, Result<Reg8, ()>),
    /// `SET b, r|(HL)`.
    Set(u32, Result<Reg8, ()>),
}

#[inline]
fn bit_number(code: u8) -> u32 {
    u32::from(code >> 3) & 7
}

impl From<u8> for BitOps {
    #[inline]
    fn from(code: u8) -> Self {
        let arg = Reg8::from_b2_0(code);
        match code & 0b1100_0000 {
            0b0000_0000 => BitOps::Rot(Rot::from(code), arg),
            0b0100_0000 => BitOps::Bit(bit_number(code), arg),
            0b1000_0000 => BitOps::Res(bit_number(code), arg),
            _ => BitOps::Set(bit_number(code), arg),
        }
    }
}

/// Extracts the absolute target address encoded in a `RST p` op-code.
#[inline]
pub(crate) fn restart_address(code: u8) -> u16 {
    u16::from(code & 0b0011_1000)
}
