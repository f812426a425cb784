use crate::error::{Chip8Error, Result};

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents the addressable RAM of the machine
pub trait MemoryMap {
    /// write a chunk of bytes into "RAM"; nothing is written if it won't fit
    fn write(&mut self, addr: u16, data: &[u8]) -> Result<()> {
        let bytes = self.get_rw_slice(addr, data.len())?;
        bytes.copy_from_slice(data);
        Ok(())
    }

    /// get a two-byte big-endian word (opcodes)
    fn get_word(&self, addr: u16) -> Result<u16> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(((word[0] as u16) << 8) | (word[1] as u16))
    }

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8]>;

    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8]>;
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded, and where execution starts
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// where the hex digit glyphs live; each glyph is 5 bytes tall
pub const CHIP8_FONT_ADDR: u16 = 0x050;
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;

/// Defines the CHIP-8 memory map:
///   0x0000-0x004f  unused, zeroed
///   0x0050-0x009f  font
///   0x00a0-0x01ff  unused, zeroed
///   0x0200-0x0fff  program
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
}

impl MemoryMap for Chip8MemoryMap {
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8]> {
        let a = addr as usize;
        self.bytes
            .get_mut(a..a + len)
            .ok_or(Chip8Error::OutOfBounds { address: addr })
    }

    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8]> {
        let a = addr as usize;
        self.bytes
            .get(a..a + len)
            .ok_or(Chip8Error::OutOfBounds { address: addr })
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip8MemoryMap {
    /// zeroed RAM with the font baked in
    pub fn new() -> Self {
        let mut mm = Chip8MemoryMap {
            bytes: vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice(),
        };
        mm.reset();
        mm
    }

    /// wipe everything, then put the font back
    pub fn reset(&mut self) {
        self.bytes.fill(0);
        let font = CHIP8_FONT_ADDR as usize;
        self.bytes[font..font + CHIP8_FONT.len()].copy_from_slice(&CHIP8_FONT);
    }

    /// largest program that fits above the program address
    pub fn max_program_size(&self) -> usize {
        CHIP8_RAM_SIZE_BYTES - CHIP8_PROGRAM_ADDR as usize
    }

    /// load a CHIP-8 program at 0x200
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        if program.len() > self.max_program_size() {
            return Err(Chip8Error::ProgramTooLarge {
                size: program.len(),
                max_size: self.max_program_size(),
            });
        }
        self.write(CHIP8_PROGRAM_ADDR, program)
    }

    /// address of the glyph for hex digit `digit`
    pub fn glyph_addr(digit: u8) -> u16 {
        CHIP8_FONT_ADDR + digit as u16 * CHIP8_FONT_GLYPH_BYTES
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

pub const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
