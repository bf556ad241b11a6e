use super::{ProbeResult, le_i32, le_u16, le_u32};

const FILE_HEADER_LEN: usize = 14;
const CORE_HEADER_LEN: u32 = 12;
const INFO_HEADER_MIN_LEN: u32 = 40;

pub(crate) fn probe(data: &[u8]) -> ProbeResult {
    let mut result = ProbeResult::default();
    let Some(header_len) = le_u32(data, FILE_HEADER_LEN) else {
        return result;
    };

    let bpp = if header_len == CORE_HEADER_LEN {
        // OS/2 BITMAPCOREHEADER: no compression or resolution fields
        if let (Some(w), Some(h)) = (le_u16(data, 18), le_u16(data, 20)) {
            result.dimensions = Some((w.into(), h.into()));
        }
        le_u16(data, 24)
    } else if header_len >= INFO_HEADER_MIN_LEN {
        // negative height marks a top-down bitmap
        if let (Some(w), Some(h)) = (le_i32(data, 18), le_i32(data, 22)) {
            result.dimensions = Some((w.unsigned_abs(), h.unsigned_abs()));
        }
        result.info.compression = le_u32(data, 30);
        if let (Some(x), Some(y)) = (le_i32(data, 38), le_i32(data, 42)) {
            result.info.resolution = Some((x as f64, y as f64));
        }
        le_u16(data, 28)
    } else {
        return result;
    };

    let Some(bpp) = bpp else {
        return result;
    };
    result.info.bits = Some(bpp.into());
    result.mode = mode(bpp).map(str::to_string);
    result
}

/// Modes for indexed depths; direct-color depths take the decoder's color type
fn mode(bpp: u16) -> Option<&'static str> {
    match bpp {
        1 => Some("1"),
        4 | 8 => Some("P"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal BITMAPINFOHEADER file
    fn info_header(bpp: u16, compression: u32, ppm: (i32, i32)) -> Vec<u8> {
        let mut data = b"BM".to_vec();
        data.extend_from_slice(&[0; 12]);
        data.extend_from_slice(&40u32.to_le_bytes());
        data.extend_from_slice(&2i32.to_le_bytes());
        data.extend_from_slice(&2i32.to_le_bytes());
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&bpp.to_le_bytes());
        data.extend_from_slice(&compression.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&ppm.0.to_le_bytes());
        data.extend_from_slice(&ppm.1.to_le_bytes());
        data.extend_from_slice(&[0; 8]);
        data
    }

    #[test]
    fn test_info_header_fields() {
        let result = probe(&info_header(24, 0, (3937, 3937)));
        assert_eq!(result.dimensions, Some((2, 2)));
        assert_eq!(result.info.bits, Some(24));
        assert_eq!(result.info.compression, Some(0));
        assert_eq!(result.info.resolution, Some((3937.0, 3937.0)));
        assert_eq!(result.mode, None);
    }

    #[test]
    fn test_indexed_modes() {
        assert_eq!(probe(&info_header(1, 0, (0, 0))).mode.as_deref(), Some("1"));
        assert_eq!(probe(&info_header(4, 0, (0, 0))).mode.as_deref(), Some("P"));
    }

    #[test]
    fn test_rle_compression_code() {
        let result = probe(&info_header(8, 1, (0, 0)));
        assert_eq!(result.info.compression, Some(1));
        assert_eq!(result.mode.as_deref(), Some("P"));
    }
}
