use crate::foundation::core::Size;
use crate::foundation::error::{MirrorError, MirrorResult};

/// A rendered surface as RGBA8 pixels, **premultiplied alpha**, tightly packed, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl FrameRGBA {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> MirrorResult<Self> {
        if data.len() != Size::new(width, height).rgba_len() {
            return Err(MirrorError::validation(format!(
                "surface byte length {} does not match {width}x{height}x4",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Surface filled with one premultiplied color.
    pub fn filled(size: Size, rgba: [u8; 4]) -> Self {
        Self {
            width: size.width,
            height: size.height,
            data: rgba.repeat((size.width as usize) * (size.height as usize)),
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Copy of the pixels with alpha un-premultiplied, as image encoders expect.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = u32::from(px[3]);
            if a == 0 {
                px[0] = 0;
                px[1] = 0;
                px[2] = 0;
                continue;
            }
            if a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }
}
