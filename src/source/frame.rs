use crate::foundation::core::Size;
use crate::foundation::error::{MirrorError, MirrorResult};

/// One camera snapshot: straight-alpha RGBA8, tightly packed, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> MirrorResult<Self> {
        let expected = Size::new(width, height).rgba_len();
        if pixels.len() != expected {
            return Err(MirrorError::validation(format!(
                "frame byte length {} does not match {width}x{height}x4",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// All-zero (transparent black) frame.
    pub fn blank(size: Size) -> Self {
        Self {
            width: size.width,
            height: size.height,
            pixels: vec![0; size.rgba_len()],
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// RGBA of the pixel at `(x, y)`. Out-of-bounds reads return `None`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.pixels[i..i + 4].copy_from_slice(&rgba);
    }

    /// Overwrite this frame's pixels with `other`'s, reusing the allocation.
    pub fn copy_from(&mut self, other: &Frame) -> MirrorResult<()> {
        if self.size() != other.size() {
            return Err(MirrorError::dimension_mismatch(format!(
                "cannot copy {} frame into {} frame",
                other.size(),
                self.size()
            )));
        }
        self.pixels.copy_from_slice(&other.pixels);
        Ok(())
    }
}
