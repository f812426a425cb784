/// # interpreter
///
/// The CHIP-8 virtual machine as the program sees it:
///  * 4K of RAM; font at 0x050, program loaded at 0x200
///  * V0-VF, sixteen 8-bit registers. VF doubles as the flag output for
///    carry/borrow/shift/collision and gets stomped by those instructions
///  * I, a 16-bit address register
///  * PC, starts at 0x200; opcodes are two bytes, big-endian
///  * a call stack of return addresses, at most 16 deep
///  * delay and sound timers, counted down by `tick()`
///  * sixteen keys, pressed or not, set by whoever drives us
///
/// There's no notion of wall-clock time in here. The host calls `step()` as
/// often as it likes and `tick()` at 60Hz, and reads the framebuffer whenever
/// it wants to draw. Fx0A doesn't block: it parks the interpreter in
/// `Status::AwaitingKey` until the host calls `resume(key)`.
use crate::diagnostics::{Status, StepEvent};
use crate::error::{Chip8Error, Result};
use crate::framebuffer::Framebuffer;
use crate::instruction::{AluOp, Instruction};
use crate::memory::{Chip8MemoryMap, MemoryMap, CHIP8_PROGRAM_ADDR};
use log::debug;
use rand::{Rng, RngCore};

/// how many return addresses fit on the call stack
pub const CHIP8_STACK_DEPTH: usize = 16;

/// number of keys on the hex keypad
pub const CHIP8_KEY_COUNT: usize = 16;

const VF: usize = 0xF;

/// what to do with the program counter once an instruction has run
enum ProgramCounter {
    Next,
    Skip,
    Jump(u16),
    Hold,
}

impl ProgramCounter {
    fn skip_if(condition: bool) -> ProgramCounter {
        if condition {
            ProgramCounter::Skip
        } else {
            ProgramCounter::Next
        }
    }
}

pub struct Chip8Interpreter {
    memory: Chip8MemoryMap,
    framebuffer: Framebuffer,
    registers: [u8; 16],
    i: u16,
    program_counter: u16,
    stack: Vec<u16>,
    delay_timer: u8,
    sound_timer: u8,
    keys: [bool; CHIP8_KEY_COUNT],
    status: Status,
    rng: Box<dyn RngCore>,
}

impl Default for Chip8Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip8Interpreter {
    /// a freshly reset machine using the thread-local random number generator
    pub fn new() -> Self {
        Self::with_rng(rand::rng())
    }

    /// a freshly reset machine drawing Cxkk's random bytes from `rng`
    pub fn with_rng(rng: impl RngCore + 'static) -> Self {
        Chip8Interpreter {
            memory: Chip8MemoryMap::new(),
            framebuffer: Framebuffer::new(),
            registers: [0; 16],
            i: 0,
            program_counter: CHIP8_PROGRAM_ADDR,
            stack: Vec::with_capacity(CHIP8_STACK_DEPTH),
            delay_timer: 0,
            sound_timer: 0,
            keys: [false; CHIP8_KEY_COUNT],
            status: Status::Running,
            rng: Box::new(rng),
        }
    }

    /// back to power-on state: font only in RAM, everything else zeroed
    pub fn reset(&mut self) {
        self.memory.reset();
        self.framebuffer.clear();
        self.registers = [0; 16];
        self.i = 0;
        self.program_counter = CHIP8_PROGRAM_ADDR;
        self.stack.clear();
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.keys = [false; CHIP8_KEY_COUNT];
        self.status = Status::Running;
        debug!("reset");
    }

    /// load a chip8 program at 0x200; nothing is written if it's too big
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        self.memory.load_program(program)?;
        debug!("loaded {} byte program", program.len());
        Ok(())
    }

    /// the opcode at the program counter
    pub fn fetch(&self) -> Result<u16> {
        self.memory.get_word(self.program_counter)
    }

    /// Run one instruction. Fatal problems come back as `Err` with the machine
    /// untouched; an opcode that doesn't decode is reported in the event and
    /// skipped over.
    pub fn step(&mut self) -> Result<StepEvent> {
        let address = self.program_counter;
        let opcode = self.fetch()?;
        let instruction = Instruction::decode(opcode);

        if let Status::AwaitingKey { .. } = self.status {
            return Ok(self.event(address, opcode, instruction, None));
        }

        let instruction = match instruction {
            Some(i) => i,
            None => {
                self.program_counter = address.wrapping_add(2);
                let fault = Chip8Error::UnknownOpcode { opcode };
                return Ok(self.event(address, opcode, None, Some(fault)));
            }
        };

        match self.execute(instruction)? {
            ProgramCounter::Next => self.program_counter = address.wrapping_add(2),
            ProgramCounter::Skip => self.program_counter = address.wrapping_add(4),
            ProgramCounter::Jump(addr) => self.program_counter = addr,
            ProgramCounter::Hold => {
                if let Instruction::WaitKey { x } = instruction {
                    self.status = Status::AwaitingKey { register: x };
                    debug!("waiting for a key to land in V{:X}", x);
                }
            }
        }
        Ok(self.event(address, opcode, Some(instruction), None))
    }

    fn event(
        &self,
        address: u16,
        opcode: u16,
        instruction: Option<Instruction>,
        fault: Option<Chip8Error>,
    ) -> StepEvent {
        StepEvent {
            address,
            opcode,
            instruction,
            fault,
            status: self.status,
        }
    }

    /// Every check that can fail happens before anything is written, so an
    /// `Err` leaves the machine as it was.
    fn execute(&mut self, instruction: Instruction) -> Result<ProgramCounter> {
        let v = &mut self.registers;
        let pc = match instruction {
            Instruction::ClearScreen => {
                self.framebuffer.clear();
                ProgramCounter::Next
            }
            Instruction::Return => match self.stack.pop() {
                Some(addr) => ProgramCounter::Jump(addr),
                None => return Err(Chip8Error::StackUnderflow),
            },
            Instruction::Jump { addr } => ProgramCounter::Jump(addr),
            Instruction::Call { addr } => {
                if self.stack.len() >= CHIP8_STACK_DEPTH {
                    return Err(Chip8Error::StackOverflow {
                        depth: self.stack.len(),
                    });
                }
                self.stack.push(self.program_counter.wrapping_add(2));
                ProgramCounter::Jump(addr)
            }
            Instruction::SkipIfEqual { x, kk } => ProgramCounter::skip_if(v[x] == kk),
            Instruction::SkipIfNotEqual { x, kk } => ProgramCounter::skip_if(v[x] != kk),
            Instruction::SkipIfRegistersEqual { x, y } => ProgramCounter::skip_if(v[x] == v[y]),
            Instruction::SkipIfRegistersNotEqual { x, y } => {
                ProgramCounter::skip_if(v[x] != v[y])
            }
            Instruction::Load { x, kk } => {
                v[x] = kk;
                ProgramCounter::Next
            }
            Instruction::Add { x, kk } => {
                v[x] = v[x].wrapping_add(kk);
                ProgramCounter::Next
            }
            Instruction::Alu { op, x, y } => {
                alu(v, op, x, y);
                ProgramCounter::Next
            }
            Instruction::LoadIndex { addr } => {
                self.i = addr;
                ProgramCounter::Next
            }
            Instruction::JumpOffset { addr } => ProgramCounter::Jump(addr + v[0] as u16),
            Instruction::Random { x, kk } => {
                v[x] = self.rng.random::<u8>() & kk;
                ProgramCounter::Next
            }
            Instruction::Draw { x, y, n } => {
                let sprite = self.memory.get_ro_slice(self.i, n as usize)?;
                let collision = self.framebuffer.blit_sprite(v[x], v[y], sprite);
                v[VF] = collision as u8;
                ProgramCounter::Next
            }
            Instruction::SkipIfKey { x } => ProgramCounter::skip_if(key_down(&self.keys, v[x])),
            Instruction::SkipIfNotKey { x } => {
                ProgramCounter::skip_if(!key_down(&self.keys, v[x]))
            }
            Instruction::ReadDelay { x } => {
                v[x] = self.delay_timer;
                ProgramCounter::Next
            }
            Instruction::WaitKey { .. } => ProgramCounter::Hold,
            Instruction::SetDelay { x } => {
                self.delay_timer = v[x];
                ProgramCounter::Next
            }
            Instruction::SetSound { x } => {
                self.sound_timer = v[x];
                ProgramCounter::Next
            }
            Instruction::AddIndex { x } => {
                self.i = self.i.wrapping_add(v[x] as u16);
                ProgramCounter::Next
            }
            Instruction::LoadGlyph { x } => {
                self.i = Chip8MemoryMap::glyph_addr(v[x]);
                ProgramCounter::Next
            }
            Instruction::StoreBcd { x } => {
                let digits = self.memory.get_rw_slice(self.i, 3)?;
                digits[0] = v[x] / 100;
                digits[1] = (v[x] / 10) % 10;
                digits[2] = v[x] % 10;
                ProgramCounter::Next
            }
            Instruction::StoreRegisters { x } => {
                self.memory.write(self.i, &v[..=x])?;
                ProgramCounter::Next
            }
            Instruction::LoadRegisters { x } => {
                let bytes = self.memory.get_ro_slice(self.i, x + 1)?;
                v[..=x].copy_from_slice(bytes);
                ProgramCounter::Next
            }
        };
        Ok(pc)
    }

    /// count both timers down by one, stopping at zero
    pub fn tick(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// Finish a pending Fx0A with `key`. Returns false, and does nothing, if
    /// no Fx0A is pending or the key isn't one of 0x0-0xF.
    pub fn resume(&mut self, key: u8) -> bool {
        let register = match self.status {
            Status::AwaitingKey { register } => register,
            Status::Running => return false,
        };
        if key as usize >= CHIP8_KEY_COUNT {
            return false;
        }
        self.registers[register] = key;
        self.program_counter = self.program_counter.wrapping_add(2);
        self.status = Status::Running;
        debug!("resumed with key {:X}", key);
        true
    }

    /// press or release one key; keys outside 0x0-0xF are ignored
    pub fn set_key_state(&mut self, key: u8, pressed: bool) {
        if let Some(k) = self.keys.get_mut(key as usize) {
            *k = pressed;
        }
    }

    /// release every key
    pub fn clear_keys(&mut self) {
        self.keys = [false; CHIP8_KEY_COUNT];
    }

    pub fn is_key_pressed(&self, key: u8) -> bool {
        key_down(&self.keys, key)
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn memory(&self) -> &[u8] {
        self.memory.as_slice()
    }

    pub fn registers(&self) -> &[u8; 16] {
        &self.registers
    }

    pub fn index_register(&self) -> u16 {
        self.i
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn status(&self) -> Status {
        self.status
    }
}

fn key_down(keys: &[bool; CHIP8_KEY_COUNT], key: u8) -> bool {
    keys.get(key as usize).copied().unwrap_or(false)
}

/// 8xyN. The flag goes into VF before the result is stored, so VF as a
/// destination ends up holding the result.
fn alu(v: &mut [u8; 16], op: AluOp, x: usize, y: usize) {
    let (vx, vy) = (v[x], v[y]);
    let (result, flag) = match op {
        AluOp::Assign => (vy, None),
        AluOp::Or => (vx | vy, None),
        AluOp::And => (vx & vy, None),
        AluOp::Xor => (vx ^ vy, None),
        AluOp::Add => {
            let (sum, carry) = vx.overflowing_add(vy);
            (sum, Some(carry as u8))
        }
        AluOp::Sub => (vx.wrapping_sub(vy), Some((vx >= vy) as u8)),
        AluOp::ShiftRight => (vx >> 1, Some(vx & 1)),
        AluOp::SubReverse => (vy.wrapping_sub(vx), Some((vy >= vx) as u8)),
        AluOp::ShiftLeft => (vx << 1, Some(vx >> 7)),
    };
    if let Some(flag) = flag {
        v[VF] = flag;
    }
    v[x] = result;
}
