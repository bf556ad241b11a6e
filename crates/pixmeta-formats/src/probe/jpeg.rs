use std::collections::BTreeMap;
use std::io::Cursor;

use super::tags::{primary_tags, resolution_dpi};
use super::{ProbeResult, be_u16};

/// IJG reference luminance table (any order; only its sum is used)
const STD_LUMINANCE: [u16; 64] = [
    16, 11, 10, 16, 24, 40, 51, 61, 12, 12, 14, 19, 26, 58, 60, 55, 14, 13, 16, 24, 40, 57, 69, 56,
    14, 17, 22, 29, 51, 87, 80, 62, 18, 22, 37, 56, 68, 109, 103, 77, 24, 35, 55, 64, 81, 104, 113,
    92, 49, 64, 78, 87, 103, 121, 120, 101, 72, 92, 95, 98, 112, 100, 103, 99,
];

#[derive(Default)]
struct Segments {
    jfif_dpi: Option<(f64, f64)>,
    precision: Option<u8>,
    components: Option<u8>,
    dimensions: Option<(u32, u32)>,
    /// Quantization tables by destination id, last definition wins
    tables: BTreeMap<u8, Vec<u16>>,
}

pub(crate) fn probe(data: &[u8]) -> ProbeResult {
    let segments = scan(data);
    let mut result = ProbeResult::default();

    result.dimensions = segments.dimensions;
    result.bits = segments.precision.map(u32::from);
    result.mode = segments.components.and_then(mode).map(str::to_string);

    if !segments.tables.is_empty() {
        result.info.quantization_tables = Some(segments.tables.len());
        result.info.quality = segments.tables.get(&0).and_then(|t| estimate_quality(t));
    }

    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(data))
        .ok()
        .map(|exif| primary_tags(&exif));

    result.info.dpi = segments
        .jfif_dpi
        .or_else(|| exif.as_ref().and_then(resolution_dpi));
    result.info.exif = exif.filter(|tags| !tags.is_empty());

    result
}

/// Walk marker segments up to the start of scan
fn scan(data: &[u8]) -> Segments {
    let mut segments = Segments::default();
    // skip SOI
    let mut pos = 2;

    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            break;
        }
        // fill bytes
        while pos + 1 < data.len() && data[pos + 1] == 0xFF {
            pos += 1;
        }
        let Some(&marker) = data.get(pos + 1) else {
            break;
        };
        pos += 2;

        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            continue;
        }
        if marker == 0xDA || marker == 0xD9 {
            break;
        }

        let Some(len) = be_u16(data, pos).map(usize::from) else {
            break;
        };
        if len < 2 {
            break;
        }
        let Some(body) = data.get(pos + 2..pos + len) else {
            break;
        };

        match marker {
            0xE0 => read_jfif(body, &mut segments),
            0xDB => read_quantization(body, &mut segments),
            0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF if body.len() >= 6 => {
                segments.precision = Some(body[0]);
                segments.components = Some(body[5]);
                if let (Some(height), Some(width)) = (be_u16(body, 1), be_u16(body, 3)) {
                    segments.dimensions = Some((width.into(), height.into()));
                }
            }
            _ => {}
        }
        pos += len;
    }

    segments
}

fn read_jfif(body: &[u8], segments: &mut Segments) {
    if body.len() < 12 || !body.starts_with(b"JFIF\0") {
        return;
    }
    let unit = body[7];
    let x = be_u16(body, 8).unwrap_or(0) as f64;
    let y = be_u16(body, 10).unwrap_or(0) as f64;

    segments.jfif_dpi = match unit {
        1 => Some((x, y)),
        2 => Some((x * 2.54, y * 2.54)),
        _ => None,
    };
}

fn read_quantization(body: &[u8], segments: &mut Segments) {
    let mut pos = 0;
    while let Some(&spec) = body.get(pos) {
        let wide = spec >> 4 != 0;
        let id = spec & 0x0F;
        let size = if wide { 128 } else { 64 };
        let Some(raw) = body.get(pos + 1..pos + 1 + size) else {
            break;
        };

        let table = if wide {
            raw.chunks_exact(2)
                .map(|b| u16::from_be_bytes([b[0], b[1]]))
                .collect()
        } else {
            raw.iter().map(|&v| u16::from(v)).collect()
        };
        segments.tables.insert(id, table);
        pos += 1 + size;
    }
}

fn mode(components: u8) -> Option<&'static str> {
    match components {
        1 => Some("L"),
        3 => Some("RGB"),
        4 => Some("CMYK"),
        _ => None,
    }
}

/// Invert the IJG quality scaling against the reference luminance table
fn estimate_quality(table: &[u16]) -> Option<u8> {
    let sum: u32 = table.iter().map(|&v| u32::from(v)).sum();
    if table.len() != STD_LUMINANCE.len() || sum == 0 {
        return None;
    }
    let reference: u32 = STD_LUMINANCE.iter().map(|&v| u32::from(v)).sum();
    let scale = f64::from(sum) * 100.0 / f64::from(reference);

    let quality = if scale <= 100.0 {
        (200.0 - scale) / 2.0
    } else {
        5000.0 / scale
    };
    Some(quality.round().clamp(1.0, 100.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::tiff::tests::{Entry, tiff_bytes};
    use image::codecs::jpeg::JpegEncoder;
    use image::{DynamicImage, ImageEncoder};

    fn encode(quality: u8, width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::new_rgb8(width, height);
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, quality)
            .write_image(img.as_bytes(), width, height, img.color().into())
            .unwrap();
        out
    }

    /// Splice an EXIF APP1 segment in right after SOI
    fn with_exif(jpeg: &[u8], tiff: &[u8]) -> Vec<u8> {
        let mut out = jpeg[..2].to_vec();
        out.extend_from_slice(&[0xFF, 0xE1]);
        out.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
        out.extend_from_slice(b"Exif\0\0");
        out.extend_from_slice(tiff);
        out.extend_from_slice(&jpeg[2..]);
        out
    }

    #[test]
    fn test_sof_and_tables() {
        let result = probe(&encode(75, 16, 8));
        assert_eq!(result.dimensions, Some((16, 8)));
        assert_eq!(result.mode.as_deref(), Some("RGB"));
        assert_eq!(result.bits, Some(8));
        assert_eq!(result.info.quantization_tables, Some(2));
    }

    #[test]
    fn test_quality_estimate_tracks_encoder_setting() {
        for quality in [50u8, 75, 90] {
            let estimated = probe(&encode(quality, 8, 8)).info.quality.unwrap();
            assert!(
                estimated.abs_diff(quality) <= 2,
                "encoded at {quality}, estimated {estimated}"
            );
        }
    }

    #[test]
    fn test_jfif_density_units() {
        let mut segments = Segments::default();
        read_jfif(b"JFIF\0\x01\x01\x01\x00\x96\x00\x96", &mut segments);
        assert_eq!(segments.jfif_dpi, Some((150.0, 150.0)));

        read_jfif(b"JFIF\0\x01\x01\x00\x00\x01\x00\x01", &mut segments);
        assert_eq!(segments.jfif_dpi, None);
    }

    #[test]
    fn test_exif_resolution_without_jfif_density() {
        let tiff = tiff_bytes(&[
            (282, Entry::Rational(300, 1)),
            (283, Entry::Rational(300, 1)),
            (296, Entry::Short(2)),
        ]);
        // the encoder writes an aspect-ratio-only JFIF header
        let plain = encode(90, 8, 8);
        assert_eq!(probe(&plain).info.dpi, None);

        let result = probe(&with_exif(&plain, &tiff));
        assert_eq!(result.info.dpi, Some((300.0, 300.0)));
        assert!(result.info.exif.is_some());
    }

    #[test]
    fn test_jfif_density_wins_over_exif() {
        let tiff = tiff_bytes(&[
            (282, Entry::Rational(300, 1)),
            (283, Entry::Rational(300, 1)),
        ]);
        let mut data = with_exif(&encode(90, 8, 8), &tiff);
        // find the JFIF segment and switch it to 96 dots per inch
        let jfif = data.windows(5).position(|w| w == b"JFIF\0").unwrap();
        data[jfif + 7] = 1;
        data[jfif + 8..jfif + 10].copy_from_slice(&96u16.to_be_bytes());
        data[jfif + 10..jfif + 12].copy_from_slice(&96u16.to_be_bytes());

        assert_eq!(probe(&data).info.dpi, Some((96.0, 96.0)));
    }

    #[test]
    fn test_reference_table_estimates_fifty() {
        assert_eq!(estimate_quality(&STD_LUMINANCE), Some(50));
        assert_eq!(estimate_quality(&[1; 64]), Some(99));
        assert_eq!(estimate_quality(&[]), None);
    }

    #[test]
    fn test_garbage_yields_empty_probe() {
        let result = probe(b"\xFF\xD8\x00\x00garbage");
        assert_eq!(result.mode, None);
        assert_eq!(result.info.exif, None);
    }
}
