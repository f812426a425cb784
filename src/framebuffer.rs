/// display width in pixels
pub const FRAMEBUFFER_WIDTH: usize = 64;
/// display height in pixels
pub const FRAMEBUFFER_HEIGHT: usize = 32;
/// bytes needed to hold one bitplane, 8 pixels per byte
pub const FRAMEBUFFER_BYTES: usize = FRAMEBUFFER_WIDTH * FRAMEBUFFER_HEIGHT / 8;

/// Monochrome 64x32 pixel grid, stored one bit per pixel row-major with the
/// leftmost pixel in the most significant bit, the same way the COSMAC VIP
/// laid out its display page. Coordinates wrap on every access, so the grid
/// is really a torus.
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    bits: [u8; FRAMEBUFFER_BYTES],
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for y in 0..FRAMEBUFFER_HEIGHT {
            for x in 0..FRAMEBUFFER_WIDTH {
                f.write_str(if self.pixel(x as i32, y as i32) { "#" } else { "." })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            bits: [0; FRAMEBUFFER_BYTES],
        }
    }

    pub fn clear(&mut self) {
        self.bits = [0; FRAMEBUFFER_BYTES];
    }

    // (byte index, bit mask) for a wrapped coordinate
    fn locate(x: i32, y: i32) -> (usize, u8) {
        let x = x.rem_euclid(FRAMEBUFFER_WIDTH as i32) as usize;
        let y = y.rem_euclid(FRAMEBUFFER_HEIGHT as i32) as usize;
        let n = y * FRAMEBUFFER_WIDTH + x;
        (n / 8, 0x80 >> (n % 8))
    }

    /// is the pixel at (x, y) lit
    pub fn pixel(&self, x: i32, y: i32) -> bool {
        let (byte, mask) = Self::locate(x, y);
        self.bits[byte] & mask != 0
    }

    /// flip one pixel and return its new state
    pub fn toggle_pixel(&mut self, x: i32, y: i32) -> bool {
        let (byte, mask) = Self::locate(x, y);
        self.bits[byte] ^= mask;
        self.bits[byte] & mask != 0
    }

    /// XOR a sprite onto the grid, one byte per row, MSB leftmost. Returns
    /// true if any set bit landed on a pixel that was already lit.
    pub fn blit_sprite(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let mut collision = false;
        for (row, data) in sprite.iter().enumerate() {
            let py = y as i32 + row as i32;
            for col in 0..8 {
                if data & (0x80 >> col) == 0 {
                    continue;
                }
                let px = x as i32 + col;
                // read before the toggle; the toggle result can't tell us
                collision |= self.pixel(px, py);
                self.toggle_pixel(px, py);
            }
        }
        collision
    }

    /// the packed bitplane, row-major, MSB first; suitable for renderers
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// count of lit pixels
    pub fn lit(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }
}
