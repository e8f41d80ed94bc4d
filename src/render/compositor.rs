//! Aspect-preserving, mirrored blit of the trail buffer onto the visible output surface.

use std::sync::Arc;

use crate::foundation::core::{Affine, Size};
use crate::foundation::error::{MirrorError, MirrorResult};
use crate::render::surface::FrameRGBA;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Whole buffer visible; bars on the non-binding axis.
    #[default]
    Letterbox,
    /// Viewport fully covered; overflow cropped.
    Cover,
}

/// Integer destination rectangle of the (unmirrored) buffer inside the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Where a `buffer`-sized image lands in `viewport` under `mode`. All values are floored.
pub fn fit(buffer: Size, viewport: Size, mode: FitMode) -> Placement {
    if buffer.is_empty() || viewport.is_empty() {
        return Placement {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
        };
    }
    let (bw, bh) = (f64::from(buffer.width), f64::from(buffer.height));
    let (vw, vh) = (f64::from(viewport.width), f64::from(viewport.height));
    let sx = vw / bw;
    let sy = vh / bh;
    let scale = match mode {
        FitMode::Letterbox => sx.min(sy),
        FitMode::Cover => sx.max(sy),
    };

    // Snap the binding axis to the viewport edge so rounding never leaves a one-pixel seam.
    let (draw_w, draw_h) = if scale == sx {
        (vw, (bh * scale).floor())
    } else {
        ((bw * scale).floor(), vh)
    };
    Placement {
        x: ((vw - draw_w) / 2.0).floor() as i32,
        y: ((vh - draw_h) / 2.0).floor() as i32,
        width: draw_w as u32,
        height: draw_h as u32,
    }
}

/// Buffer space to viewport space, flipped about the viewport's vertical center axis.
pub fn mirrored_transform(buffer: Size, viewport: Size, placement: Placement) -> Affine {
    let sx = f64::from(placement.width) / f64::from(buffer.width.max(1));
    let sy = f64::from(placement.height) / f64::from(buffer.height.max(1));
    let vw = f64::from(viewport.width);
    Affine::new([
        -sx,
        0.0,
        0.0,
        sy,
        vw - f64::from(placement.x),
        f64::from(placement.y),
    ])
}

/// Owns the visible output surface. Bars (letterbox) stay transparent.
pub struct Compositor {
    mode: FitMode,
    output: FrameRGBA,
    ctx: Option<vello_cpu::RenderContext>,
    pixmap: Option<vello_cpu::Pixmap>,
}

impl Compositor {
    pub fn new(viewport: Size, mode: FitMode) -> MirrorResult<Self> {
        surface_dims(viewport)?;
        Ok(Self {
            mode,
            output: FrameRGBA::filled(viewport, [0, 0, 0, 0]),
            ctx: None,
            pixmap: None,
        })
    }

    pub fn mode(&self) -> FitMode {
        self.mode
    }

    pub fn viewport(&self) -> Size {
        self.output.size()
    }

    /// The most recently composited surface; what a capture stream reads.
    pub fn output(&self) -> &FrameRGBA {
        &self.output
    }

    pub fn resize(&mut self, viewport: Size) -> MirrorResult<()> {
        if viewport == self.viewport() {
            return Ok(());
        }
        surface_dims(viewport)?;
        self.output = FrameRGBA::filled(viewport, [0, 0, 0, 0]);
        self.ctx = None;
        self.pixmap = None;
        Ok(())
    }

    /// Fit, mirror and draw `trail` into the output surface, replacing its previous content.
    pub fn compose(&mut self, trail: &FrameRGBA) -> MirrorResult<()> {
        let viewport = self.viewport();
        let (vw, vh) = surface_dims(viewport)?;
        let placement = fit(trail.size(), viewport, self.mode);
        if placement.width == 0 || placement.height == 0 {
            self.output.data.fill(0);
            return Ok(());
        }

        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap_from_premul_bytes(
                &trail.data,
                trail.width,
                trail.height,
            )?)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == vw && ctx.height() == vh => ctx,
            _ => vello_cpu::RenderContext::new(vw, vh),
        };
        ctx.reset();
        ctx.set_transform(affine_to_cpu(mirrored_transform(
            trail.size(),
            viewport,
            placement,
        )));
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(trail.width),
            f64::from(trail.height),
        ));
        ctx.flush();

        let mut pixmap = match self.pixmap.take() {
            Some(p) if p.width() == vw && p.height() == vh => p,
            _ => vello_cpu::Pixmap::new(vw, vh),
        };
        ctx.render_to_pixmap(&mut pixmap);
        self.output.data.copy_from_slice(pixmap.data_as_u8_slice());

        self.ctx = Some(ctx);
        self.pixmap = Some(pixmap);
        Ok(())
    }
}

fn surface_dims(size: Size) -> MirrorResult<(u16, u16)> {
    if size.is_empty() {
        return Err(MirrorError::validation(format!(
            "output surface must be non-empty, got {size}"
        )));
    }
    let w: u16 = size
        .width
        .try_into()
        .map_err(|_| MirrorError::validation("output surface width exceeds u16"))?;
    let h: u16 = size
        .height
        .try_into()
        .map_err(|_| MirrorError::validation("output surface height exceeds u16"))?;
    Ok((w, h))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> MirrorResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| MirrorError::validation("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| MirrorError::validation("pixmap height exceeds u16"))?;
    if bytes.len() != Size::new(width, height).rgba_len() {
        return Err(MirrorError::validation("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
