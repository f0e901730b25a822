//! `glint-format` is the pixel-format layer of the glint renderer.
//!
//! It provides:
//! - The [`DxgiFormat`] registry: per-format block geometry and byte sizes
//!   (see [`FormatInfo`]).
//! - The surface-layout calculator used by texture ingestion and upload
//!   sizing (see [`surface_layout`]).

mod format;
mod surface;

pub use format::{DxgiFormat, FormatInfo};
pub use surface::{mip_extent, surface_layout, SurfaceLayout, UnsupportedFormat};
