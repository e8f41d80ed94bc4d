//! Hand-rolled premultiplied RGBA8 raster ops used by the trail buffer.

use crate::foundation::core::{Line, Point, Size};
use crate::foundation::error::{MirrorError, MirrorResult};
use crate::foundation::math::{mul_div255_floor_u8, mul_div255_u8};

pub type PremulRgba8 = [u8; 4];

/// Source-over an opaque black rectangle at `alpha` covering the whole surface.
///
/// Color channels are truncated, so every non-zero channel strictly decreases when `alpha > 0`
/// and nothing ever brightens.
pub fn fade_toward_black_in_place(data: &mut [u8], alpha: u8) -> MirrorResult<()> {
    if !data.len().is_multiple_of(4) {
        return Err(MirrorError::validation(
            "fade_toward_black_in_place expects an rgba8 buffer",
        ));
    }
    if alpha == 0 {
        return Ok(());
    }
    let inv = 255u16 - u16::from(alpha);
    for px in data.chunks_exact_mut(4) {
        px[0] = mul_div255_floor_u8(u16::from(px[0]), inv);
        px[1] = mul_div255_floor_u8(u16::from(px[1]), inv);
        px[2] = mul_div255_floor_u8(u16::from(px[2]), inv);
        px[3] = alpha.saturating_add(mul_div255_u8(u16::from(px[3]), inv));
    }
    Ok(())
}

/// Additively composite an anti-aliased, round-capped line segment of width `weight`.
///
/// Coverage per pixel is the distance from the pixel center to the segment, resolved over a
/// one-pixel ramp. Channels saturate at 255.
pub fn stroke_add_in_place(
    data: &mut [u8],
    size: Size,
    line: Line,
    weight: f64,
    color: PremulRgba8,
) -> MirrorResult<()> {
    if data.len() != size.rgba_len() {
        return Err(MirrorError::validation(
            "stroke_add_in_place expects a buffer matching width*height*4",
        ));
    }
    if size.is_empty() || !(weight.is_finite() && weight > 0.0) {
        return Ok(());
    }

    let r = weight * 0.5;
    let reach = r + 1.0;
    let x0 = (line.p0.x.min(line.p1.x) - reach).floor().max(0.0);
    let y0 = (line.p0.y.min(line.p1.y) - reach).floor().max(0.0);
    let x1 = (line.p0.x.max(line.p1.x) + reach)
        .ceil()
        .min(f64::from(size.width));
    let y1 = (line.p0.y.max(line.p1.y) + reach)
        .ceil()
        .min(f64::from(size.height));
    if x0 >= x1 || y0 >= y1 {
        return Ok(());
    }

    let w = size.width as usize;
    for y in (y0 as u32)..(y1 as u32) {
        for x in (x0 as u32)..(x1 as u32) {
            let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            let coverage = (r + 0.5 - distance_to_segment(line, center)).clamp(0.0, 1.0);
            if coverage <= 0.0 {
                continue;
            }
            let i = ((y as usize) * w + (x as usize)) * 4;
            for c in 0..4 {
                let add = (f64::from(color[c]) * coverage).round() as u8;
                data[i + c] = data[i + c].saturating_add(add);
            }
        }
    }
    Ok(())
}

fn distance_to_segment(line: Line, p: Point) -> f64 {
    let ab = line.p1 - line.p0;
    let len2 = ab.hypot2();
    if len2 <= f64::EPSILON {
        return (p - line.p0).hypot();
    }
    let t = ((p - line.p0).dot(ab) / len2).clamp(0.0, 1.0);
    (p - (line.p0 + ab * t)).hypot()
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
