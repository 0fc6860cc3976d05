//! Canvas preparation, caption placement and rasterization.

pub mod canvas;
pub mod compositor;
pub mod draw;
