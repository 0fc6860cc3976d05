//! Measuring, wrapping and size fitting of captions.

pub mod fit;
pub mod measure;
pub mod wrap;
