pub mod skin_tone;

pub use skin_tone::{classify, decode_rgb, ImageDecodeError, ToneCategory};
