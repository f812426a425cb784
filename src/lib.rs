//! A CHIP-8 interpreter with a terminal front end.
//!
//! ## Design
//!
//! * the interpreter is a plain state machine: `step()` runs one instruction,
//!   `tick()` counts the timers down, and neither knows what time it is
//! * nothing in the interpreter blocks; Fx0A parks it until the host calls
//!   `resume(key)`
//! * the framebuffer is a 64x32 torus of bits, drawn by XOR with collision
//!   reporting into VF
//! * each step hands back a `StepEvent` describing what ran and anything that
//!   went wrong, for the host to log or show
//! * abstract display so can plug alternatives; starting with TUI in-console
//! * input device, with trait for reading key-presses
//!
//! Model
//!
//! Environment
//!  |-- display, input, config
//!  |-- interpreter
//!  |    |-- memory map (font, program)
//!  |    |-- framebuffer
//!  |    `-- instruction set
//!  `-- main loop, once per 60Hz frame
//!       |-- read keys; only the latest one counts as held
//!       |-- run instructions_per_second / 60 instructions
//!       |-- interrupt: tick timers, redraw
//!       `-- sleep off the rest of the frame
pub mod config;
pub mod diagnostics;
pub mod display;
pub mod environment;
pub mod error;
pub mod framebuffer;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;

pub use error::{Chip8Error, Result};
