//! The cross-cutting machine invariants, randomized where that buys
//! coverage.
use rand::prelude::*;
use z80core::{CpuFlags, Z80};

fn cpu_with(program: &[u8]) -> Z80 {
    let mut cpu = Z80::new(0x1_0000);
    cpu.ram_mut().load(0, program);
    cpu
}

#[test]
fn cycles_are_monotonic_over_random_programs() {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    for _ in 0..16 {
        let mut cpu = Z80::new(0x1_0000);
        for addr in 0..=0xFFFFu16 {
            cpu.poke(addr, rng.gen());
        }
        let mut last = 0u64;
        for _ in 0..5_000 {
            let ts = cpu.step();
            assert!(ts >= 4, "every instruction costs at least one M1");
            assert!(cpu.cycles() >= last);
            last = cpu.cycles();
        }
    }
}

#[test]
fn push_pop_round_trips_randomized() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..256 {
        let val: u16 = rng.gen();
        // keep the stack clear of the two program bytes at 0..2
        let sp: u16 = rng.gen::<u16>().max(0x0010);
        // PUSH BC; POP BC
        let mut cpu = cpu_with(&[0xC5, 0xC1]);
        cpu.set_sp(sp);
        cpu.set_bc(val);
        cpu.step();
        cpu.step();
        assert_eq!(cpu.bc(), val);
        assert_eq!(cpu.sp(), sp);
        // the scratch below SP holds the pair, little end first
        assert_eq!(cpu.peek(sp.wrapping_sub(2)), (val & 0xFF) as u8);
        assert_eq!(cpu.peek(sp.wrapping_sub(1)), (val >> 8) as u8);
    }
}

#[test]
fn exchange_twice_is_identity() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..64 {
        let seed: [u16; 8] = core::array::from_fn(|_| rng.gen());
        // EX AF,AF' twice; EXX twice
        let mut cpu = cpu_with(&[0x08, 0x08, 0xD9, 0xD9]);
        cpu.set_af(seed[0]);
        cpu.set_bc(seed[1]);
        cpu.set_de(seed[2]);
        cpu.set_hl(seed[3]);
        cpu.set_af_alt(seed[4]);
        cpu.set_bc_alt(seed[5]);
        cpu.set_de_alt(seed[6]);
        cpu.set_hl_alt(seed[7]);
        for _ in 0..4 {
            cpu.step();
        }
        assert_eq!(
            [
                cpu.af(),
                cpu.bc(),
                cpu.de(),
                cpu.hl(),
                cpu.af_alt(),
                cpu.bc_alt(),
                cpu.de_alt(),
                cpu.hl_alt()
            ],
            seed
        );
    }
}

#[test]
fn cp_orders_unsigned_and_preserves_operands() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..512 {
        let a: u8 = rng.gen();
        let b: u8 = rng.gen();
        let mut cpu = cpu_with(&[0xB8]); // CP B
        cpu.set_af(u16::from(a) << 8);
        cpu.set_bc(u16::from(b) << 8);
        cpu.step();
        assert_eq!((cpu.af() >> 8) as u8, a, "CP leaves A");
        assert_eq!((cpu.bc() >> 8) as u8, b, "CP leaves B");
        assert_eq!(cpu.flags().zf(), a == b, "Z iff equal ({a} vs {b})");
        assert_eq!(cpu.flags().cf(), a < b, "C iff borrow ({a} vs {b})");
        assert!(cpu.flags().nf());
    }
}

#[test]
fn logic_ops_set_even_parity() {
    let mut rng = StdRng::seed_from_u64(13);
    for code in [0xA0u8, 0xB0, 0xA8] {
        // AND B, OR B, XOR B
        for _ in 0..256 {
            let a: u8 = rng.gen();
            let b: u8 = rng.gen();
            let mut cpu = cpu_with(&[code]);
            cpu.set_af(u16::from(a) << 8);
            cpu.set_bc(u16::from(b) << 8);
            cpu.step();
            let res = (cpu.af() >> 8) as u8;
            assert_eq!(
                cpu.flags().pvf(),
                res.count_ones() % 2 == 0,
                "parity of {res:#04x} after {code:#04x}"
            );
            assert!(!cpu.flags().cf() && !cpu.flags().nf());
        }
    }
}

#[test]
fn flagless_instructions_keep_the_flag_byte() {
    // a sample of "flags: none" instructions across the pages
    let cases: &[&[u8]] = &[
        &[0x00],             // NOP
        &[0x01, 0x34, 0x12], // LD BC,nn
        &[0x03],             // INC BC
        &[0x41],             // LD B,C
        &[0x06, 0x7F],       // LD B,n
        &[0xC5],             // PUSH BC
        &[0xEB],             // EX DE,HL
        &[0xD9],             // EXX
        &[0xC3, 0x00, 0x10], // JP nn
        &[0xDD, 0x21, 0x00, 0x10], // LD IX,nn
        &[0xCB, 0x80],       // RES 0,B
        &[0xED, 0x43, 0x00, 0x90], // LD (nn),BC
    ];
    for program in cases {
        for bits in [0x00u8, 0xFF, 0xA5, 0x5A] {
            let mut cpu = cpu_with(program);
            cpu.set_sp(0x8000);
            cpu.set_flags(CpuFlags::from_bits_retain(bits));
            cpu.step();
            assert_eq!(
                cpu.flags().bits(),
                bits,
                "program {program:02x?} must not touch flags"
            );
        }
    }
}

#[test]
fn relative_jump_is_signed() {
    // JR 0xFE from X+2 lands back at X for a few X
    for base in [0x0010u16, 0x1234, 0x8000] {
        let mut cpu = Z80::new(0x1_0000);
        cpu.ram_mut().load(base, &[0x18, 0xFE]);
        cpu.set_pc(base);
        cpu.step();
        assert_eq!(cpu.pc(), base);
    }
}

#[test]
fn pc_and_sp_wrap_modulo_64k() {
    // a fetch at the top of memory wraps PC to 0
    let mut cpu = Z80::new(0x1_0000);
    cpu.poke(0xFFFF, 0x00); // NOP
    cpu.set_pc(0xFFFF);
    cpu.step();
    assert_eq!(cpu.pc(), 0x0000);

    // an immediate straddling the top wraps too
    let mut cpu = Z80::new(0x1_0000);
    cpu.poke(0xFFFF, 0x01); // LD BC,nn
    cpu.poke(0x0000, 0x34);
    cpu.poke(0x0001, 0x12);
    cpu.set_pc(0xFFFF);
    cpu.step();
    assert_eq!(cpu.bc(), 0x1234);
    assert_eq!(cpu.pc(), 0x0002);

    // stack underflow is a wrap, not an error
    let mut cpu = cpu_with(&[0xC1]); // POP BC
    cpu.set_sp(0xFFFF);
    cpu.poke(0xFFFF, 0xCD);
    cpu.poke(0x0000, 0xAB);
    cpu.step();
    assert_eq!(cpu.bc(), 0xABCD);
    assert_eq!(cpu.sp(), 0x0001);
}

#[test]
fn halted_steps_are_idempotent() {
    let mut cpu = cpu_with(&[0x76, 0x00, 0x00]);
    cpu.step();
    assert!(cpu.halted());
    let pc = cpu.pc();
    let r = cpu.r();
    for n in 1..=8u64 {
        assert_eq!(cpu.step(), 4);
        assert_eq!(cpu.pc(), pc);
        assert_eq!(cpu.cycles(), 4 + 4 * n);
    }
    // refresh keeps running while halted
    assert_ne!(cpu.r(), r);
}

#[test]
fn memory_seeding_survives_execution() {
    // the test-harness contract: poke, run, read back
    let mut cpu = Z80::new(0x1_0000);
    cpu.poke(0x4000, 0xAB);
    cpu.poke(0, 0x00);
    cpu.step();
    assert_eq!(cpu.peek(0x4000), 0xAB);
}
