//! Output-side rendering: the premultiplied surface type, raster helpers and the compositor.

pub mod compositor;
pub mod raster;
pub mod surface;

pub use compositor::{Compositor, FitMode, Placement, fit};
pub use surface::FrameRGBA;
