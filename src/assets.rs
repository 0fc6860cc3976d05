//! Background decoding and font loading.

pub mod decode;
pub mod font;
