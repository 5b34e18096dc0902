use crate::chip::chip8::constants::{CHIP8_DISPLAY_HEIGHT, CHIP8_DISPLAY_SIZE, CHIP8_DISPLAY_WIDTH};

/// The logical 64x32 display of the CHIP-8. Each pixel is stored as one byte
/// holding either 0 or 1.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Framebuffer {
    pixels: [u8; CHIP8_DISPLAY_SIZE],

    /// Set by every draw and clear, reset only by `clear_changed`.
    changed: bool,
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            pixels: [0; CHIP8_DISPLAY_SIZE],
            changed: false,
        }
    }

    /// Rebuilds a framebuffer from raw parts. Callers must make sure every
    /// pixel is 0 or 1.
    pub(crate) fn from_parts(pixels: [u8; CHIP8_DISPLAY_SIZE], changed: bool) -> Self {
        Framebuffer { pixels, changed }
    }

    /// Turns every pixel off.
    pub fn clear(&mut self) {
        self.pixels = [0; CHIP8_DISPLAY_SIZE];
        self.changed = true;
    }

    /// XORs an 8 pixel wide sprite onto the display, one byte per row, with
    /// its top left corner at `(x, y)`. Pixels leaving the display on the right
    /// or bottom wrap around to the opposite edge.
    ///
    /// Returns true if any pixel was turned off by the draw.
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        let mut collision = false;

        for (y_pos, row) in rows.iter().enumerate() {
            let mut pixel_mask = 0x80;

            for x_pos in 0..8 {
                if row & pixel_mask != 0 {
                    let pixel_pos = translate(x as usize + x_pos, y as usize + y_pos);
                    if self.pixels[pixel_pos] == 1 {
                        collision = true;
                    }
                    self.pixels[pixel_pos] ^= 1;
                }
                pixel_mask >>= 1;
            }
        }

        self.changed = true;
        collision
    }

    /// Returns the pixel at `(x, y)`, wrapping coordinates outside the display.
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[translate(x, y)]
    }

    pub fn pixels(&self) -> &[u8; CHIP8_DISPLAY_SIZE] {
        &self.pixels
    }

    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn clear_changed(&mut self) {
        self.changed = false;
    }

    /// Copies the current contents out of the framebuffer.
    pub fn snapshot(&self) -> Frame {
        Frame {
            pixels: self.pixels,
        }
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Framebuffer::new()
    }
}

fn translate(x: usize, y: usize) -> usize {
    (x % CHIP8_DISPLAY_WIDTH) + (y % CHIP8_DISPLAY_HEIGHT) * CHIP8_DISPLAY_WIDTH
}

/// A copy of the display contents handed to the host for rendering.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Frame {
    pixels: [u8; CHIP8_DISPLAY_SIZE],
}

impl Frame {
    pub const WIDTH: usize = CHIP8_DISPLAY_WIDTH;
    pub const HEIGHT: usize = CHIP8_DISPLAY_HEIGHT;

    /// Whether the pixel at `(x, y)` is lit. Coordinates outside the display
    /// are reported as unlit.
    pub fn is_lit(&self, x: usize, y: usize) -> bool {
        x < Self::WIDTH && y < Self::HEIGHT && self.pixels[x + y * Self::WIDTH] == 1
    }

    /// Row-major pixel values, one byte (0 or 1) per pixel.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl Default for Frame {
    fn default() -> Self {
        Frame {
            pixels: [0; CHIP8_DISPLAY_SIZE],
        }
    }
}
