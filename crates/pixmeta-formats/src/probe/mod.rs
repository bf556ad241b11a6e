//! Header probes that read the metadata side-channel the `image` crate does
//! not expose: densities, compression codes, palettes, tag tables.
//!
//! Probes never fail. Anything they cannot read is left unset, and the engine
//! falls back to its defaults.

pub(crate) mod bmp;
pub(crate) mod gif;
pub(crate) mod jpeg;
pub(crate) mod pcx;
pub(crate) mod png;
pub(crate) mod tags;
pub(crate) mod tiff;

use crate::metadata::{ImageInfo, TagTable};
use pixmeta_common::ImageFormat;

/// Facts a probe extracted from the raw container
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ProbeResult {
    /// Header dimensions, used when `image` identifies the container but
    /// cannot decode its pixel layout
    pub dimensions: Option<(u32, u32)>,
    pub mode: Option<String>,
    pub bits: Option<u32>,
    pub info: ImageInfo,
    pub tags: Option<TagTable>,
}

impl ProbeResult {
    /// Dispatch to the format-specific parser. Magic bytes are not checked;
    /// the caller has already identified the format.
    pub(crate) fn for_format(data: &[u8], format: ImageFormat) -> Self {
        match format {
            ImageFormat::Png => png::probe(data),
            ImageFormat::Jpeg => jpeg::probe(data),
            ImageFormat::Gif => gif::probe(data),
            ImageFormat::Bmp => bmp::probe(data),
            ImageFormat::Tiff => tiff::probe(data),
            ImageFormat::Pcx => pcx::probe(data),
        }
    }
}

pub(crate) fn be_u16(data: &[u8], offset: usize) -> Option<u16> {
    data.get(offset..offset + 2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
}

pub(crate) fn be_u32(data: &[u8], offset: usize) -> Option<u32> {
    data.get(offset..offset + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

pub(crate) fn le_u16(data: &[u8], offset: usize) -> Option<u16> {
    data.get(offset..offset + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
}

pub(crate) fn le_u32(data: &[u8], offset: usize) -> Option<u32> {
    data.get(offset..offset + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

pub(crate) fn le_i32(data: &[u8], offset: usize) -> Option<i32> {
    data.get(offset..offset + 4)
        .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_readers_bounds() {
        let data = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(be_u16(&data, 0), Some(0x0102));
        assert_eq!(le_u16(&data, 2), Some(0x0403));
        assert_eq!(be_u32(&data, 0), Some(0x01020304));
        assert_eq!(le_u32(&data, 1), None);
        assert_eq!(le_i32(&[0xFF, 0xFF, 0xFF, 0xFF], 0), Some(-1));
    }

    #[test]
    fn test_probe_for_format_tolerates_garbage() {
        let garbage = [0u8; 7];
        for format in ImageFormat::SUPPORTED {
            let result = ProbeResult::for_format(&garbage, format);
            assert_eq!(result.info.dpi, None);
        }
    }
}
