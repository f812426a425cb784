//! The environment sets everything up and runs the main loop. It's the only
//! part that knows about wall-clock time: once per 60Hz frame it reads the
//! keyboard, runs a batch of instructions, fires the timer interrupt and
//! redraws.
use crate::config::{Config, TIMER_HZ};
use crate::diagnostics::{Status, StepEvent};
use crate::display::Display;
use crate::error::{Chip8Error, Result};
use crate::input::Input;
use crate::interpreter::Chip8Interpreter;
use log::{error, info, trace, warn};
use std::fmt;
use std::fs;
use std::time::{Duration, Instant};

/// things worth showing under the screen
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// 1..=60, wrapping once a second
    pub frame_count: u8,
    pub rom: String,
    pub opcode: Option<u16>,
    pub error: String,
    pub waiting_for_key: bool,
}

impl StatusLine {
    fn next_frame(&mut self) {
        self.frame_count = self.frame_count % TIMER_HZ as u8 + 1;
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame: {:02} | rom: {} | opcode: ", self.frame_count, self.rom)?;
        match self.opcode {
            Some(op) => write!(f, "{:04X}", op)?,
            None => write!(f, "----")?,
        }
        if self.waiting_for_key {
            write!(f, " | waiting for key")?;
        }
        write!(f, " | error: {}", self.error)
    }
}

pub struct Environment<'a> {
    interpreter: Chip8Interpreter,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    config: Config,
    status: StatusLine,
    halted: bool,
    frames: u64,
    faults: u64,
}

impl<'a> Environment<'a> {
    pub fn new(
        interpreter: Chip8Interpreter,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        config: Config,
    ) -> Environment<'a> {
        let status = StatusLine {
            rom: config.rom_name(),
            ..StatusLine::default()
        };
        Environment {
            interpreter,
            display,
            input,
            config,
            status,
            halted: false,
            frames: 0,
            faults: 0,
        }
    }

    /// read the configured ROM, if any, into the interpreter
    pub fn load_rom(&mut self) -> Result<()> {
        if let Some(path) = &self.config.rom {
            let program = fs::read(path)?;
            self.interpreter.load_program(&program)?;
            info!("loaded {} ({} bytes)", path.display(), program.len());
            self.status.rom = format!("{} loaded", self.config.rom_name());
        }
        Ok(())
    }

    /// Only the most recent key of the frame counts as held; a frame with no
    /// keys releases everything. A pending Fx0A takes that key too.
    fn read_keys(&mut self) -> Result<()> {
        let latest = self.input.peek_keys()?.last().copied();
        self.input.flush_keys()?;

        self.interpreter.clear_keys();
        if let Some(key) = latest {
            self.interpreter.set_key_state(key, true);
            if let Status::AwaitingKey { .. } = self.interpreter.status() {
                self.interpreter.resume(key);
                self.status.waiting_for_key = false;
            }
        }
        Ok(())
    }

    fn record(&mut self, event: &StepEvent) {
        trace!("{}", event);
        self.status.opcode = Some(event.opcode);
        self.status.waiting_for_key = event.is_awaiting_key();
        if let Some(fault) = &event.fault {
            self.faults += 1;
            let message = fault.to_string();
            warn!("{:04X}: {}", event.address, message);
            // programs tend to hit the same bad opcode over and over
            if message != self.status.error {
                self.status.error = message;
            }
        }
    }

    /// run one frame's worth of instructions, stopping early on a key wait
    fn run_instructions(&mut self) {
        for _ in 0..self.config.steps_per_frame() {
            if self.halted {
                return;
            }
            match self.interpreter.step() {
                Ok(event) => {
                    self.record(&event);
                    if event.is_awaiting_key() {
                        return;
                    }
                }
                Err(e) => {
                    error!(
                        "halted at {:04X}: {}",
                        self.interpreter.program_counter(),
                        e
                    );
                    self.status.error = e.to_string();
                    self.halted = true;
                }
            }
        }
    }

    /// external interrupt: count the timers down and redraw
    pub fn interrupt(&mut self) -> Result<()> {
        self.interpreter.tick();
        self.status.next_frame();
        let frame = self.interpreter.framebuffer().as_bytes();
        let expected = self.display.get_display_size_bytes();
        if frame.len() != expected {
            return Err(Chip8Error::DisplayMismatch {
                expected,
                actual: frame.len(),
            });
        }
        self.display.draw(frame, &self.status.to_string())?;
        Ok(())
    }

    /// one 60Hz frame; false once it's time to stop
    pub fn run_frame(&mut self) -> Result<bool> {
        self.read_keys()?;
        self.run_instructions();
        self.interrupt()?;
        self.frames += 1;

        if self.input.quit_requested() {
            info!("quit after {} frames, {} faults", self.frames, self.faults);
            return Ok(false);
        }
        if let Some(max) = self.config.max_frames {
            if self.frames >= max {
                info!("frame limit of {} reached, {} faults", max, self.faults);
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// run frames at 60Hz until told to stop. CHIP-8 instructions run as fast
    /// as they can and then we sleep off the rest of the frame.
    pub fn main_loop(&mut self) -> Result<()> {
        let frame = Duration::from_secs(1) / TIMER_HZ;
        loop {
            let started = Instant::now();
            if !self.run_frame()? {
                return Ok(());
            }
            if let Some(rest) = frame.checked_sub(started.elapsed()) {
                spin_sleep::sleep(rest);
            }
        }
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// every fault seen so far, repeats included
    pub fn faults(&self) -> u64 {
        self.faults
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DummyDisplay;
    use crate::input::DummyInput;

    fn config(frames: u64) -> Config {
        Config {
            max_frames: Some(frames),
            ..Config::default()
        }
    }

    fn machine(program: &[u8]) -> Chip8Interpreter {
        let mut i = Chip8Interpreter::new();
        i.load_program(program).unwrap();
        i
    }

    #[test]
    fn test_frame_limit() -> Result<()> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut env = Environment::new(machine(&[0x12, 0x00]), &mut display, &mut input, config(3));
        env.main_loop()?;
        assert_eq!(env.frames(), 3);
        assert!(!env.is_halted());
        drop(env);
        assert_eq!(display.frames, 3);
        assert_eq!(display.last_frame.len(), 256);
        Ok(())
    }

    #[test]
    fn test_timers_tick_once_per_frame() -> Result<()> {
        // LD V0, 10; LD DT, V0; JP 204
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let program = [0x60, 0x0a, 0xf0, 0x15, 0x12, 0x04];
        let mut env = Environment::new(machine(&program), &mut display, &mut input, config(4));
        env.main_loop()?;
        assert_eq!(env.interpreter().delay_timer(), 6);
        Ok(())
    }

    #[test]
    fn test_halts_on_fatal_error() -> Result<()> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut env = Environment::new(machine(&[0x00, 0xee]), &mut display, &mut input, config(2));
        env.main_loop()?;
        assert!(env.is_halted());
        assert_eq!(env.interpreter().program_counter(), 0x200);
        assert!(env.status().error.contains("stack underflow"));
        drop(env);
        assert!(display.last_status.contains("stack underflow"));
        Ok(())
    }

    #[test]
    fn test_unknown_opcode_keeps_running() -> Result<()> {
        // 0x0123 isn't a thing; then LD V1, 1; JP 204
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let program = [0x01, 0x23, 0x61, 0x01, 0x12, 0x04];
        let mut env = Environment::new(machine(&program), &mut display, &mut input, config(1));
        env.main_loop()?;
        assert!(!env.is_halted());
        assert_eq!(env.interpreter().registers()[1], 1);
        assert_eq!(env.status().error, "unknown opcode: 0x0123");
        Ok(())
    }

    #[test]
    fn test_repeated_fault_counted_every_time() -> Result<()> {
        // 0x0123 then JP 200, forever
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let program = [0x01, 0x23, 0x12, 0x00];
        let mut env = Environment::new(machine(&program), &mut display, &mut input, config(2));
        env.main_loop()?;
        // 8 steps a frame, every other one faults
        assert_eq!(env.faults(), 8);
        assert_eq!(env.status().error, "unknown opcode: 0x0123");
        Ok(())
    }

    struct NarrowDisplay {
        frames: usize,
    }

    impl Display for NarrowDisplay {
        fn draw(&mut self, _data: &[u8], _status: &str) -> std::result::Result<(), std::io::Error> {
            self.frames += 1;
            Ok(())
        }

        fn get_display_size_bytes(&self) -> usize {
            0x80
        }
    }

    #[test]
    fn test_display_size_mismatch() {
        let mut display = NarrowDisplay { frames: 0 };
        let mut input = DummyInput::new(&[]);
        let mut env = Environment::new(machine(&[0x12, 0x00]), &mut display, &mut input, config(1));
        assert!(matches!(
            env.main_loop(),
            Err(Chip8Error::DisplayMismatch {
                expected: 0x80,
                actual: 256
            })
        ));
        drop(env);
        assert_eq!(display.frames, 0);
    }

    #[test]
    fn test_key_wait_resumes_with_next_key() -> Result<()> {
        // LD V2, K; JP 202
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::scripted(&[&[], &[], &[0x7], &[]]);
        let program = [0xf2, 0x0a, 0x12, 0x02];
        let mut env = Environment::new(machine(&program), &mut display, &mut input, Config::default());
        env.main_loop()?;
        assert_eq!(env.frames(), 4);
        assert_eq!(env.interpreter().registers()[2], 0x7);
        assert_eq!(env.interpreter().program_counter(), 0x202);
        Ok(())
    }

    #[test]
    fn test_only_latest_key_is_held() -> Result<()> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::scripted(&[&[0x1, 0x2], &[]]);
        let mut env = Environment::new(machine(&[0x12, 0x00]), &mut display, &mut input, Config::default());
        env.run_frame()?;
        assert!(env.interpreter().is_key_pressed(0x2));
        assert!(!env.interpreter().is_key_pressed(0x1));
        env.run_frame()?;
        assert!(!env.interpreter().is_key_pressed(0x2));
        Ok(())
    }

    #[test]
    fn test_status_line() {
        let mut s = StatusLine {
            rom: "pong.ch8 loaded".to_string(),
            opcode: Some(0x6a02),
            ..StatusLine::default()
        };
        for _ in 0..61 {
            s.next_frame();
        }
        assert_eq!(s.frame_count, 1);
        assert_eq!(
            s.to_string(),
            "frame: 01 | rom: pong.ch8 loaded | opcode: 6A02 | error: "
        );
    }
}
