use std::io::Cursor;

use crate::foundation::error::{MirrorError, MirrorResult};
use crate::render::surface::FrameRGBA;

pub const PNG_MIME: &str = "image/png";

/// Encode a premultiplied surface as a PNG byte stream.
pub fn encode_png(surface: &FrameRGBA) -> MirrorResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(surface.width, surface.height, surface.to_straight_rgba8())
        .ok_or_else(|| MirrorError::encode("surface buffer does not match its dimensions"))?;
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| MirrorError::encode(format!("png encode failed: {e}")))?;
    Ok(out.into_inner())
}
