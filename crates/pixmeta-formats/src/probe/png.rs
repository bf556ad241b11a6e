use std::io::{Cursor, Read};

use flate2::read::ZlibDecoder;
use png::{BitDepth, ColorType, Unit};

use super::{ProbeResult, be_u32};

const SIGNATURE_LEN: usize = 8;
const METERS_PER_INCH: f64 = 0.0254;
const GAMMA_SCALE: f64 = 100_000.0;
/// Enough compressed data to inflate the first scanline's filter byte
const IDAT_PREFIX_LIMIT: usize = 64 * 1024;

pub(crate) fn probe(data: &[u8]) -> ProbeResult {
    let mut result = ProbeResult::default();

    match png::Decoder::new(Cursor::new(data)).read_info() {
        Ok(reader) => {
            let info = reader.info();
            result.dimensions = Some((info.width, info.height));
            result.bits = Some(u32::from(info.bit_depth as u8));
            result.mode = Some(mode(info.color_type, info.bit_depth).to_string());
            result.info.interlace = Some(info.interlaced);
            result.info.gamma = info
                .gama_chunk
                .map(|gamma| f64::from(gamma.into_scaled()) / GAMMA_SCALE);

            // unit 0 only carries the aspect ratio
            if let Some(dims) = info.pixel_dims.as_ref().filter(|d| d.unit == Unit::Meter) {
                result.info.dpi = Some((
                    f64::from(dims.xppu) * METERS_PER_INCH,
                    f64::from(dims.yppu) * METERS_PER_INCH,
                ));
            }
        }
        Err(e) => tracing::debug!("PNG header unreadable: {}", e),
    }

    result.info.compression = first_filter_type(&idat_prefix(data));
    result
}

fn mode(color_type: ColorType, bit_depth: BitDepth) -> &'static str {
    match (color_type, bit_depth) {
        (ColorType::Grayscale, BitDepth::One) => "1",
        (ColorType::Grayscale, BitDepth::Sixteen) => "I;16",
        (ColorType::Grayscale, _) => "L",
        (ColorType::Rgb, _) => "RGB",
        (ColorType::Indexed, _) => "P",
        (ColorType::GrayscaleAlpha, _) => "LA",
        (ColorType::Rgba, _) => "RGBA",
    }
}

/// Leading IDAT bytes. The png crate only hands out unfiltered rows, so the
/// chunks are collected here and inflated just far enough for the filter byte.
fn idat_prefix(data: &[u8]) -> Vec<u8> {
    let mut idat = Vec::new();
    let mut pos = SIGNATURE_LEN;

    while idat.len() < IDAT_PREFIX_LIMIT {
        let Some(len) = be_u32(data, pos).map(|len| len as usize) else {
            break;
        };
        let Some(kind) = data.get(pos + 4..pos + 8) else {
            break;
        };
        let body_end = (pos + 8).saturating_add(len);
        match kind {
            b"IDAT" => {
                // a truncated chunk still contributes what is there
                let end = body_end.min(data.len());
                idat.extend_from_slice(&data[pos + 8..end]);
            }
            b"IEND" => break,
            _ if !idat.is_empty() => break,
            _ => {}
        }
        // 4 length + 4 type + body + 4 CRC
        pos = body_end.saturating_add(4);
    }
    idat
}

/// Filter type byte that prefixes the first scanline of the image data
fn first_filter_type(idat: &[u8]) -> Option<u32> {
    if idat.is_empty() {
        return None;
    }

    let mut filter = [0u8; 1];
    ZlibDecoder::new(idat).read_exact(&mut filter).ok()?;
    Some(filter[0].into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::{Compression, Crc};
    use std::io::Write;

    fn chunk(kind: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut out = (body.len() as u32).to_be_bytes().to_vec();
        out.extend_from_slice(kind);
        out.extend_from_slice(body);

        let mut crc = Crc::new();
        crc.update(kind);
        crc.update(body);
        out.extend_from_slice(&crc.sum().to_be_bytes());
        out
    }

    /// 2x1 RGB image, interlace flag set, with the given ancillary chunks
    fn png(extra: &[Vec<u8>], rows: &[u8]) -> Vec<u8> {
        let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
        let mut ihdr = Vec::new();
        ihdr.extend_from_slice(&2u32.to_be_bytes());
        ihdr.extend_from_slice(&1u32.to_be_bytes());
        ihdr.extend_from_slice(&[8, 2, 0, 0, 1]);
        data.extend(chunk(b"IHDR", &ihdr));
        for c in extra {
            data.extend_from_slice(c);
        }
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(rows).unwrap();
        data.extend(chunk(b"IDAT", &encoder.finish().unwrap()));
        data.extend(chunk(b"IEND", &[]));
        data
    }

    #[test]
    fn test_ihdr_fields() {
        let result = probe(&png(&[], &[0, 1, 2, 3, 4, 5, 6]));
        assert_eq!(result.mode.as_deref(), Some("RGB"));
        assert_eq!(result.bits, Some(8));
        assert_eq!(result.dimensions, Some((2, 1)));
        assert_eq!(result.info.interlace, Some(true));
    }

    #[test]
    fn test_phys_meter_converts_to_dpi() {
        let mut phys = Vec::new();
        phys.extend_from_slice(&3780u32.to_be_bytes());
        phys.extend_from_slice(&3780u32.to_be_bytes());
        phys.push(1);
        let result = probe(&png(&[chunk(b"pHYs", &phys)], &[0; 7]));

        let (x, y) = result.info.dpi.unwrap();
        assert!((x - 96.012).abs() < 1e-9);
        assert!((y - 96.012).abs() < 1e-9);
    }

    #[test]
    fn test_phys_without_unit_is_ignored() {
        let mut phys = vec![0, 0, 0, 1, 0, 0, 0, 1];
        phys.push(0);
        let result = probe(&png(&[chunk(b"pHYs", &phys)], &[0; 7]));
        assert_eq!(result.info.dpi, None);
    }

    #[test]
    fn test_gamma_and_filter() {
        let gama = 45455u32.to_be_bytes();
        let result = probe(&png(&[chunk(b"gAMA", &gama)], &[4, 9, 9, 9, 9, 9, 9]));
        assert!((result.info.gamma.unwrap() - 0.45455).abs() < 1e-9);
        assert_eq!(result.info.compression, Some(4));
    }

    #[test]
    fn test_truncated_stream_leaves_fields_unset() {
        let data = png(&[], &[0; 7]);
        let result = probe(&data[..30]);
        assert_eq!(result.mode, None);
        assert_eq!(result.info.compression, None);
    }

    #[test]
    fn test_mode_table() {
        assert_eq!(mode(ColorType::Grayscale, BitDepth::One), "1");
        assert_eq!(mode(ColorType::Grayscale, BitDepth::Sixteen), "I;16");
        assert_eq!(mode(ColorType::Indexed, BitDepth::Four), "P");
        assert_eq!(mode(ColorType::GrayscaleAlpha, BitDepth::Eight), "LA");
    }
}
