use super::tags::{
    BITS_PER_SAMPLE, COMPRESSION, IMAGE_LENGTH, IMAGE_WIDTH, PHOTOMETRIC_INTERPRETATION,
    RESOLUTION_UNIT, SAMPLES_PER_PIXEL, primary_tags, resolution_dpi, resolution_pair,
};
use super::{ProbeResult, be_u16, be_u32, le_u16, le_u32};
use crate::metadata::TagValue;

const UNIT_NONE: u32 = 1;
/// Exif, GPS and Interoperability sub-IFD pointers
const SUB_IFD_TAGS: [u16; 3] = [34665, 34853, 40965];
const ENTRY_LEN: usize = 12;

pub(crate) fn probe(data: &[u8]) -> ProbeResult {
    let mut result = ProbeResult::default();

    let Some(raw) = tag_region(data) else {
        tracing::debug!("TIFF header unreadable");
        return result;
    };
    let exif = match exif::Reader::new().read_raw(raw) {
        Ok(exif) => exif,
        Err(e) => {
            tracing::debug!("TIFF tag table unreadable: {}", e);
            return result;
        }
    };
    let tags = primary_tags(&exif);

    let width = tags.get(&IMAGE_WIDTH).and_then(TagValue::as_u32);
    let height = tags.get(&IMAGE_LENGTH).and_then(TagValue::as_u32);
    result.dimensions = width.zip(height);

    let bits = tags.get(&BITS_PER_SAMPLE).and_then(TagValue::as_u32);
    let samples = tags
        .get(&SAMPLES_PER_PIXEL)
        .and_then(TagValue::as_u32)
        .unwrap_or(1);

    result.bits = bits;
    result.mode = tags
        .get(&PHOTOMETRIC_INTERPRETATION)
        .and_then(TagValue::as_u32)
        .and_then(|photometric| mode(photometric, samples, bits.unwrap_or(1)))
        .map(str::to_string);
    result.info.compression = tags.get(&COMPRESSION).and_then(TagValue::as_u32);

    // unitless resolution is reported raw rather than as dpi
    let unit = tags.get(&RESOLUTION_UNIT).and_then(TagValue::as_u32);
    if unit == Some(UNIT_NONE) {
        result.info.resolution = resolution_pair(&tags);
    } else {
        result.info.dpi = resolution_dpi(&tags);
    }

    result.tags = Some(tags);
    result
}

/// Copy of the leading bytes that hold IFD0, its out-of-line values and its
/// sub-IFDs. Strip data past that point is left behind, and IFD0's link to
/// the next IFD is cleared so thumbnails are not followed.
fn tag_region(data: &[u8]) -> Option<Vec<u8>> {
    let layout = Layout {
        data,
        big_endian: match data.get(..2)? {
            b"II" => false,
            b"MM" => true,
            _ => return None,
        },
    };

    let ifd0 = layout.u32(4)? as usize;
    let mut end = 8;
    let link = layout.walk(ifd0, &mut end, 0)?;

    let mut raw = data[..end.min(data.len())].to_vec();
    if let Some(next) = raw.get_mut(link..link + 4) {
        next.fill(0);
    }
    Some(raw)
}

struct Layout<'a> {
    data: &'a [u8],
    big_endian: bool,
}

impl Layout<'_> {
    fn u16(&self, offset: usize) -> Option<u16> {
        if self.big_endian {
            be_u16(self.data, offset)
        } else {
            le_u16(self.data, offset)
        }
    }

    fn u32(&self, offset: usize) -> Option<u32> {
        if self.big_endian {
            be_u32(self.data, offset)
        } else {
            le_u32(self.data, offset)
        }
    }

    /// Grow `end` over the IFD at `offset`; returns where its next-IFD link sits
    fn walk(&self, offset: usize, end: &mut usize, depth: u8) -> Option<usize> {
        let count = usize::from(self.u16(offset)?);
        let link = offset + 2 + count * ENTRY_LEN;
        *end = (*end).max(link + 4);

        for i in 0..count {
            let entry = offset + 2 + i * ENTRY_LEN;
            let tag = self.u16(entry)?;
            let size = (self.u32(entry + 4)? as usize).saturating_mul(value_size(self.u16(entry + 2)?));
            let value = self.u32(entry + 8)? as usize;

            if size > 4 {
                *end = (*end).max(value.saturating_add(size));
            }
            if depth < 2 && SUB_IFD_TAGS.contains(&tag) {
                // a broken sub-IFD does not hide the primary tags
                let _ = self.walk(value, end, depth + 1);
            }
        }
        Some(link)
    }
}

/// Bytes per value for each TIFF field type
fn value_size(kind: u16) -> usize {
    match kind {
        3 | 8 => 2,
        4 | 9 | 11 => 4,
        5 | 10 | 12 => 8,
        _ => 1,
    }
}

fn mode(photometric: u32, samples: u32, bits: u32) -> Option<&'static str> {
    match (photometric, samples, bits) {
        (0 | 1, _, 1) => Some("1"),
        (0 | 1, 2, _) => Some("LA"),
        (0 | 1, _, 16) => Some("I;16"),
        (0 | 1, _, 32) => Some("I"),
        (0 | 1, _, _) => Some("L"),
        (2, 4.., _) => Some("RGBA"),
        (2, _, _) => Some("RGB"),
        (3, _, _) => Some("P"),
        (5, _, _) => Some("CMYK"),
        (6, _, _) => Some("YCbCr"),
        (8, _, _) => Some("LAB"),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) enum Entry {
        Short(u16),
        Shorts(Vec<u16>),
        Rational(u32, u32),
    }

    /// Little-endian single-IFD TIFF with the given entries (sorted by tag)
    pub(crate) fn tiff_bytes(entries: &[(u16, Entry)]) -> Vec<u8> {
        let ifd_len = 2 + entries.len() * 12 + 4;
        let mut extra_offset = 8 + ifd_len;
        let mut ifd = (entries.len() as u16).to_le_bytes().to_vec();
        let mut extra = Vec::new();

        for (tag, entry) in entries {
            ifd.extend_from_slice(&tag.to_le_bytes());
            match entry {
                Entry::Short(v) => {
                    ifd.extend_from_slice(&3u16.to_le_bytes());
                    ifd.extend_from_slice(&1u32.to_le_bytes());
                    ifd.extend_from_slice(&v.to_le_bytes());
                    ifd.extend_from_slice(&[0, 0]);
                }
                Entry::Shorts(values) => {
                    ifd.extend_from_slice(&3u16.to_le_bytes());
                    ifd.extend_from_slice(&(values.len() as u32).to_le_bytes());
                    ifd.extend_from_slice(&(extra_offset as u32).to_le_bytes());
                    for v in values {
                        extra.extend_from_slice(&v.to_le_bytes());
                    }
                    extra_offset += values.len() * 2;
                }
                Entry::Rational(num, den) => {
                    ifd.extend_from_slice(&5u16.to_le_bytes());
                    ifd.extend_from_slice(&1u32.to_le_bytes());
                    ifd.extend_from_slice(&(extra_offset as u32).to_le_bytes());
                    extra.extend_from_slice(&num.to_le_bytes());
                    extra.extend_from_slice(&den.to_le_bytes());
                    extra_offset += 8;
                }
            }
        }
        ifd.extend_from_slice(&0u32.to_le_bytes());

        let mut data = b"II*\0".to_vec();
        data.extend_from_slice(&8u32.to_le_bytes());
        data.extend(ifd);
        data.extend(extra);
        data
    }

    #[test]
    fn test_tags_and_inch_resolution() {
        let data = tiff_bytes(&[
            (256, Entry::Short(64)),
            (257, Entry::Short(32)),
            (258, Entry::Shorts(vec![8, 8, 8])),
            (259, Entry::Short(5)),
            (262, Entry::Short(2)),
            (277, Entry::Short(3)),
            (282, Entry::Rational(300, 1)),
            (283, Entry::Rational(600, 2)),
            (296, Entry::Short(2)),
        ]);
        let result = probe(&data);

        assert_eq!(result.dimensions, Some((64, 32)));
        assert_eq!(result.mode.as_deref(), Some("RGB"));
        assert_eq!(result.bits, Some(8));
        assert_eq!(result.info.compression, Some(5));
        assert_eq!(result.info.dpi, Some((300.0, 300.0)));

        let tags = result.tags.unwrap();
        assert_eq!(tags.get(&256), Some(&TagValue::Unsigned(64)));
    }

    #[test]
    fn test_unitless_resolution_is_not_dpi() {
        let data = tiff_bytes(&[
            (262, Entry::Short(1)),
            (282, Entry::Rational(72, 1)),
            (283, Entry::Rational(72, 1)),
            (296, Entry::Short(1)),
        ]);
        let result = probe(&data);

        assert_eq!(result.mode.as_deref(), Some("1"));
        assert_eq!(result.info.dpi, None);
        assert_eq!(result.info.resolution, Some((72.0, 72.0)));
    }

    #[test]
    fn test_mode_table() {
        assert_eq!(mode(1, 1, 8), Some("L"));
        assert_eq!(mode(1, 2, 8), Some("LA"));
        assert_eq!(mode(2, 4, 8), Some("RGBA"));
        assert_eq!(mode(5, 4, 8), Some("CMYK"));
        assert_eq!(mode(32844, 1, 8), None);
    }

    #[test]
    fn test_region_stops_before_strip_data() {
        let mut data = tiff_bytes(&[
            (256, Entry::Short(2)),
            (257, Entry::Short(2)),
            (262, Entry::Short(3)),
            (282, Entry::Rational(72, 1)),
        ]);
        let tag_len = data.len();
        data.extend(std::iter::repeat_n(0xAB, 4096));

        let raw = tag_region(&data).unwrap();
        assert_eq!(raw.len(), tag_len);

        let result = probe(&data);
        assert_eq!(result.dimensions, Some((2, 2)));
        assert_eq!(result.mode.as_deref(), Some("P"));
    }

    #[test]
    fn test_next_ifd_link_is_cleared() {
        let mut data = tiff_bytes(&[(256, Entry::Short(2)), (257, Entry::Short(2))]);
        // IFD0 link sits after the two entries; point it far past the end
        let link = 8 + 2 + 2 * ENTRY_LEN;
        data[link..link + 4].copy_from_slice(&0xFFFFu32.to_le_bytes());

        let raw = tag_region(&data).unwrap();
        assert_eq!(&raw[link..link + 4], &[0, 0, 0, 0]);
        assert_eq!(probe(&data).dimensions, Some((2, 2)));
    }

    #[test]
    fn test_not_a_tiff() {
        assert_eq!(probe(b"definitely not a tiff"), ProbeResult::default());
    }
}
