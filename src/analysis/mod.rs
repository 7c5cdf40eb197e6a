pub mod difference;
pub mod ela;
pub mod recompress;
