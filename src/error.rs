use std::io;
use thiserror::Error;

/// Everything that can go wrong while loading or running a CHIP-8 program.
///
/// Only `UnknownOpcode` is tolerated by the interpreter: it is reported in the
/// step's diagnostics and execution carries on. The rest are handed back to
/// whoever called `step()` or `load_program()`.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("program is too large ({size} bytes), max size is {max_size} bytes")]
    ProgramTooLarge { size: usize, max_size: usize },

    #[error("memory access out of bounds at address {address:#06X}")]
    OutOfBounds { address: u16 },

    #[error("stack underflow: return with an empty call stack")]
    StackUnderflow,

    #[error("stack overflow: call stack already holds {depth} return addresses")]
    StackOverflow { depth: usize },

    #[error("unknown opcode: {opcode:#06X}")]
    UnknownOpcode { opcode: u16 },

    #[error("display wants {expected} bytes per frame, framebuffer has {actual}")]
    DisplayMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Chip8Error>;
