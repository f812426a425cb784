use std::fmt;

/// register-register operations of the 8xyN family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    /// 8xy0 - Vx = Vy
    Assign,
    /// 8xy1 - Vx |= Vy
    Or,
    /// 8xy2 - Vx &= Vy
    And,
    /// 8xy3 - Vx ^= Vy
    Xor,
    /// 8xy4 - Vx += Vy, VF = carry
    Add,
    /// 8xy5 - Vx -= Vy, VF = not borrow
    Sub,
    /// 8xy6 - Vx >>= 1, VF = bit shifted out
    ShiftRight,
    /// 8xy7 - Vx = Vy - Vx, VF = not borrow
    SubReverse,
    /// 8xyE - Vx <<= 1, VF = bit shifted out
    ShiftLeft,
}

impl AluOp {
    fn from_nibble(n: u16) -> Option<AluOp> {
        match n {
            0x0 => Some(AluOp::Assign),
            0x1 => Some(AluOp::Or),
            0x2 => Some(AluOp::And),
            0x3 => Some(AluOp::Xor),
            0x4 => Some(AluOp::Add),
            0x5 => Some(AluOp::Sub),
            0x6 => Some(AluOp::ShiftRight),
            0x7 => Some(AluOp::SubReverse),
            0xE => Some(AluOp::ShiftLeft),
            _ => None,
        }
    }

    fn mnemonic(&self) -> &'static str {
        match self {
            AluOp::Assign => "LD",
            AluOp::Or => "OR",
            AluOp::And => "AND",
            AluOp::Xor => "XOR",
            AluOp::Add => "ADD",
            AluOp::Sub => "SUB",
            AluOp::ShiftRight => "SHR",
            AluOp::SubReverse => "SUBN",
            AluOp::ShiftLeft => "SHL",
        }
    }
}

/// One decoded CHIP-8 instruction. Register operands are indices 0x0-0xF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1nnn
    Jump { addr: u16 },
    /// 2nnn
    Call { addr: u16 },
    /// 3xkk
    SkipIfEqual { x: usize, kk: u8 },
    /// 4xkk
    SkipIfNotEqual { x: usize, kk: u8 },
    /// 5xy0
    SkipIfRegistersEqual { x: usize, y: usize },
    /// 6xkk
    Load { x: usize, kk: u8 },
    /// 7xkk - no carry
    Add { x: usize, kk: u8 },
    /// 8xyN
    Alu { op: AluOp, x: usize, y: usize },
    /// 9xy0
    SkipIfRegistersNotEqual { x: usize, y: usize },
    /// Annn
    LoadIndex { addr: u16 },
    /// Bnnn - jump to nnn + V0
    JumpOffset { addr: u16 },
    /// Cxkk
    Random { x: usize, kk: u8 },
    /// Dxyn
    Draw { x: usize, y: usize, n: u8 },
    /// Ex9E
    SkipIfKey { x: usize },
    /// ExA1
    SkipIfNotKey { x: usize },
    /// Fx07
    ReadDelay { x: usize },
    /// Fx0A
    WaitKey { x: usize },
    /// Fx15
    SetDelay { x: usize },
    /// Fx18
    SetSound { x: usize },
    /// Fx1E
    AddIndex { x: usize },
    /// Fx29
    LoadGlyph { x: usize },
    /// Fx33
    StoreBcd { x: usize },
    /// Fx55
    StoreRegisters { x: usize },
    /// Fx65
    LoadRegisters { x: usize },
}

impl Instruction {
    /// Split the opcode into nibbles and work out what it means. `None` means
    /// there's no such instruction.
    pub fn decode(opcode: u16) -> Option<Instruction> {
        let x = ((opcode >> 8) & 0xF) as usize;
        let y = ((opcode >> 4) & 0xF) as usize;
        let n = opcode & 0xF;
        let kk = (opcode & 0xFF) as u8;
        let addr = opcode & 0x0FFF;

        let i = match opcode >> 12 {
            0x0 => match opcode {
                0x00E0 => Instruction::ClearScreen,
                0x00EE => Instruction::Return,
                _ => return None,
            },
            0x1 => Instruction::Jump { addr },
            0x2 => Instruction::Call { addr },
            0x3 => Instruction::SkipIfEqual { x, kk },
            0x4 => Instruction::SkipIfNotEqual { x, kk },
            0x5 if n == 0 => Instruction::SkipIfRegistersEqual { x, y },
            0x6 => Instruction::Load { x, kk },
            0x7 => Instruction::Add { x, kk },
            0x8 => Instruction::Alu {
                op: AluOp::from_nibble(n)?,
                x,
                y,
            },
            0x9 if n == 0 => Instruction::SkipIfRegistersNotEqual { x, y },
            0xA => Instruction::LoadIndex { addr },
            0xB => Instruction::JumpOffset { addr },
            0xC => Instruction::Random { x, kk },
            0xD => Instruction::Draw { x, y, n: n as u8 },
            0xE => match kk {
                0x9E => Instruction::SkipIfKey { x },
                0xA1 => Instruction::SkipIfNotKey { x },
                _ => return None,
            },
            0xF => match kk {
                0x07 => Instruction::ReadDelay { x },
                0x0A => Instruction::WaitKey { x },
                0x15 => Instruction::SetDelay { x },
                0x18 => Instruction::SetSound { x },
                0x1E => Instruction::AddIndex { x },
                0x29 => Instruction::LoadGlyph { x },
                0x33 => Instruction::StoreBcd { x },
                0x55 => Instruction::StoreRegisters { x },
                0x65 => Instruction::LoadRegisters { x },
                _ => return None,
            },
            _ => return None,
        };
        Some(i)
    }
}

/// Cowgod-style assembly, e.g. `LD V0, 0x0A` or `DRW V1, V2, 5`
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::ClearScreen => write!(f, "CLS"),
            Instruction::Return => write!(f, "RET"),
            Instruction::Jump { addr } => write!(f, "JP {:#05X}", addr),
            Instruction::Call { addr } => write!(f, "CALL {:#05X}", addr),
            Instruction::SkipIfEqual { x, kk } => write!(f, "SE V{:X}, {:#04X}", x, kk),
            Instruction::SkipIfNotEqual { x, kk } => write!(f, "SNE V{:X}, {:#04X}", x, kk),
            Instruction::SkipIfRegistersEqual { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            Instruction::Load { x, kk } => write!(f, "LD V{:X}, {:#04X}", x, kk),
            Instruction::Add { x, kk } => write!(f, "ADD V{:X}, {:#04X}", x, kk),
            Instruction::Alu { op, x, y } => match op {
                AluOp::ShiftRight | AluOp::ShiftLeft => write!(f, "{} V{:X}", op.mnemonic(), x),
                _ => write!(f, "{} V{:X}, V{:X}", op.mnemonic(), x, y),
            },
            Instruction::SkipIfRegistersNotEqual { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            Instruction::LoadIndex { addr } => write!(f, "LD I, {:#05X}", addr),
            Instruction::JumpOffset { addr } => write!(f, "JP V0, {:#05X}", addr),
            Instruction::Random { x, kk } => write!(f, "RND V{:X}, {:#04X}", x, kk),
            Instruction::Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Instruction::SkipIfKey { x } => write!(f, "SKP V{:X}", x),
            Instruction::SkipIfNotKey { x } => write!(f, "SKNP V{:X}", x),
            Instruction::ReadDelay { x } => write!(f, "LD V{:X}, DT", x),
            Instruction::WaitKey { x } => write!(f, "LD V{:X}, K", x),
            Instruction::SetDelay { x } => write!(f, "LD DT, V{:X}", x),
            Instruction::SetSound { x } => write!(f, "LD ST, V{:X}", x),
            Instruction::AddIndex { x } => write!(f, "ADD I, V{:X}", x),
            Instruction::LoadGlyph { x } => write!(f, "LD F, V{:X}", x),
            Instruction::StoreBcd { x } => write!(f, "LD B, V{:X}", x),
            Instruction::StoreRegisters { x } => write!(f, "LD [I], V{:X}", x),
            Instruction::LoadRegisters { x } => write!(f, "LD V{:X}, [I]", x),
        }
    }
}
