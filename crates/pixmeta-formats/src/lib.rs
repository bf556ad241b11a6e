pub mod decoder;
pub mod metadata;
mod probe;

pub use decoder::{DecodeFailure, ImageDecoder, SourceBytes, read_source};
pub use metadata::{ImageHandle, ImageInfo, Palette, TagTable, TagValue};
