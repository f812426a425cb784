use chip8term::diagnostics::Status;
use chip8term::framebuffer::Framebuffer;
use chip8term::interpreter::Chip8Interpreter;
use chip8term::memory::{Chip8MemoryMap, CHIP8_FONT};
use chip8term::{Chip8Error, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded() -> Chip8Interpreter {
    Chip8Interpreter::with_rng(StdRng::seed_from_u64(8))
}

#[test]
fn test_add_two_registers() -> Result<()> {
    let mut i = seeded();
    i.load_program(&[0x60, 0x0a, 0x61, 0x05, 0x80, 0x14])?;
    for _ in 0..3 {
        let ev = i.step()?;
        assert!(ev.fault.is_none());
    }
    assert_eq!(i.registers()[0], 15);
    assert_eq!(i.registers()[0xf], 0);
    assert_eq!(i.program_counter(), 0x206);
    Ok(())
}

#[test]
fn test_jump_to_self() -> Result<()> {
    let mut i = seeded();
    i.load_program(&[0x12, 0x00])?;
    i.step()?;
    assert_eq!(i.program_counter(), 0x200);
    Ok(())
}

#[test]
fn test_return_with_empty_stack() {
    let mut i = seeded();
    i.reset();
    i.load_program(&[0x00, 0xee]).unwrap();
    assert!(matches!(i.step(), Err(Chip8Error::StackUnderflow)));
    assert_eq!(i.program_counter(), 0x200);
}

#[test]
fn test_reset_restores_font_only_memory() -> Result<()> {
    let mut i = seeded();
    i.load_program(&[0xde, 0xad, 0xbe, 0xef])?;
    i.step()?;
    i.reset();
    assert_eq!(i.program_counter(), 0x200);
    assert_eq!(i.memory()[0x50..0xa0], CHIP8_FONT);
    assert!(i.memory()[0x200..].iter().all(|b| *b == 0));
    assert_eq!(i.memory(), Chip8MemoryMap::new().as_slice());
    assert_eq!(i.framebuffer(), &Framebuffer::new());
    Ok(())
}

#[test]
fn test_oversized_program_is_rejected() {
    let mut i = seeded();
    let res = i.load_program(&vec![0xaa; 4096 - 0x200 + 1]);
    assert!(matches!(res, Err(Chip8Error::ProgramTooLarge { .. })));
    assert!(i.memory()[0x200..].iter().all(|b| *b == 0));
}

#[test]
fn test_all_zero_sprite_draws_nothing() -> Result<()> {
    // LD I, 0x400; LD V0, 60; LD V1, 30; DRW V0, V1, 15
    let mut i = seeded();
    i.load_program(&[0xa4, 0x00, 0x60, 0x3c, 0x61, 0x1e, 0xd0, 0x1f])?;
    for _ in 0..4 {
        i.step()?;
    }
    assert_eq!(i.registers()[0xf], 0);
    assert_eq!(i.framebuffer().lit(), 0);
    Ok(())
}

#[test]
fn test_sprite_wraps_round_the_corner() -> Result<()> {
    // LD V0, 60; LD V1, 30; LD V2, 0; LD F, V2; DRW V0, V1, 5
    let mut i = seeded();
    i.load_program(&[0x60, 0x3c, 0x61, 0x1e, 0x62, 0x00, 0xf2, 0x29, 0xd0, 0x15])?;
    for _ in 0..5 {
        i.step()?;
    }
    // "0" is F0 90 90 90 F0; its bottom-right corner lands at (63, 2)
    let fb = i.framebuffer();
    assert!(fb.pixel(60, 30));
    assert!(fb.pixel(63, 31));
    assert!(fb.pixel(60, 0));
    assert!(fb.pixel(63, 2));
    assert!(!fb.pixel(0, 2));
    assert_eq!(fb.lit(), 14);
    Ok(())
}

#[test]
fn test_wait_for_key_round_trip() -> Result<()> {
    // LD V5, K; ADD V5, 1
    let mut i = seeded();
    i.load_program(&[0xf5, 0x0a, 0x75, 0x01])?;
    assert!(i.step()?.is_awaiting_key());
    assert_eq!(i.status(), Status::AwaitingKey { register: 5 });
    for _ in 0..10 {
        assert!(i.step()?.is_awaiting_key());
    }
    assert_eq!(i.program_counter(), 0x200);
    assert!(i.resume(0xe));
    i.step()?;
    assert_eq!(i.registers()[5], 0xf);
    assert_eq!(i.program_counter(), 0x204);
    Ok(())
}

#[test]
fn test_random_depends_only_on_the_seed() -> Result<()> {
    let program = [0xc0, 0xff, 0xc1, 0xff, 0xc2, 0xff];
    let mut a = seeded();
    let mut b = seeded();
    a.load_program(&program)?;
    b.load_program(&program)?;
    for _ in 0..3 {
        a.step()?;
        b.step()?;
    }
    assert_eq!(a.registers(), b.registers());
    Ok(())
}

#[test]
fn test_timers_are_independent_of_steps() -> Result<()> {
    // LD V0, 3; LD DT, V0; LD V1, 1; LD ST, V1
    let mut i = seeded();
    i.load_program(&[0x60, 0x03, 0xf0, 0x15, 0x61, 0x01, 0xf1, 0x18])?;
    for _ in 0..4 {
        i.step()?;
    }
    i.tick();
    assert_eq!((i.delay_timer(), i.sound_timer()), (2, 0));
    i.tick();
    i.tick();
    i.tick();
    assert_eq!((i.delay_timer(), i.sound_timer()), (0, 0));
    Ok(())
}
