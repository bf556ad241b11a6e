use exif::{Context, In, Value};

use crate::metadata::{TagTable, TagValue};

pub(crate) const IMAGE_WIDTH: u16 = 256;
pub(crate) const IMAGE_LENGTH: u16 = 257;
pub(crate) const COMPRESSION: u16 = 259;
pub(crate) const BITS_PER_SAMPLE: u16 = 258;
pub(crate) const PHOTOMETRIC_INTERPRETATION: u16 = 262;
pub(crate) const SAMPLES_PER_PIXEL: u16 = 277;
pub(crate) const X_RESOLUTION: u16 = 282;
pub(crate) const Y_RESOLUTION: u16 = 283;
pub(crate) const RESOLUTION_UNIT: u16 = 296;

const UNIT_INCH: u32 = 2;
const UNIT_CENTIMETER: u32 = 3;

/// Tags of the primary image (TIFF IFD0 plus its Exif sub-IFD)
pub(crate) fn primary_tags(exif: &exif::Exif) -> TagTable {
    exif.fields()
        .filter(|field| field.ifd_num == In::PRIMARY)
        .filter(|field| matches!(field.tag.context(), Context::Tiff | Context::Exif))
        .filter_map(|field| tag_value(&field.value).map(|value| (field.tag.number(), value)))
        .collect()
}

pub(crate) fn tag_value(value: &Value) -> Option<TagValue> {
    let mut values: Vec<TagValue> = match value {
        Value::Byte(v) => v.iter().map(|&x| TagValue::Unsigned(x.into())).collect(),
        Value::Short(v) => v.iter().map(|&x| TagValue::Unsigned(x.into())).collect(),
        Value::Long(v) => v.iter().map(|&x| TagValue::Unsigned(x.into())).collect(),
        Value::SByte(v) => v.iter().map(|&x| TagValue::Signed(x.into())).collect(),
        Value::SShort(v) => v.iter().map(|&x| TagValue::Signed(x.into())).collect(),
        Value::SLong(v) => v.iter().map(|&x| TagValue::Signed(x.into())).collect(),
        Value::Rational(v) => v.iter().map(|r| TagValue::Float(r.to_f64())).collect(),
        Value::SRational(v) => v.iter().map(|r| TagValue::Float(r.to_f64())).collect(),
        Value::Float(v) => v.iter().map(|&x| TagValue::Float(x.into())).collect(),
        Value::Double(v) => v.iter().map(|&x| TagValue::Float(x)).collect(),
        Value::Ascii(parts) => {
            let text = parts
                .iter()
                .map(|part| String::from_utf8_lossy(part).trim_end_matches('\0').to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Some(TagValue::Text(text));
        }
        Value::Undefined(bytes, _) => return Some(TagValue::Bytes(bytes.clone())),
        _ => return None,
    };

    match values.len() {
        0 => None,
        1 => values.pop(),
        _ => Some(TagValue::Multiple(values)),
    }
}

/// Dots per inch from X/YResolution, honoring ResolutionUnit (inch when absent)
pub(crate) fn resolution_dpi(tags: &TagTable) -> Option<(f64, f64)> {
    let (x, y) = resolution_pair(tags)?;
    let unit = tags
        .get(&RESOLUTION_UNIT)
        .and_then(TagValue::as_u32)
        .unwrap_or(UNIT_INCH);

    match unit {
        UNIT_INCH => Some((x, y)),
        UNIT_CENTIMETER => Some((x * 2.54, y * 2.54)),
        _ => None,
    }
}

pub(crate) fn resolution_pair(tags: &TagTable) -> Option<(f64, f64)> {
    let x = tags.get(&X_RESOLUTION)?.as_f64()?;
    let y = tags.get(&Y_RESOLUTION)?.as_f64()?;
    Some((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_value_conversion() {
        assert_eq!(
            tag_value(&Value::Short(vec![5])),
            Some(TagValue::Unsigned(5))
        );
        assert_eq!(
            tag_value(&Value::Short(vec![8, 8, 8])),
            Some(TagValue::Multiple(vec![
                TagValue::Unsigned(8),
                TagValue::Unsigned(8),
                TagValue::Unsigned(8)
            ]))
        );
        assert_eq!(
            tag_value(&Value::Ascii(vec![b"Canon\0".to_vec()])),
            Some(TagValue::Text("Canon".into()))
        );
        assert_eq!(tag_value(&Value::Long(vec![])), None);
    }

    #[test]
    fn test_resolution_units() {
        let mut tags = TagTable::new();
        tags.insert(X_RESOLUTION, TagValue::Float(100.0));
        tags.insert(Y_RESOLUTION, TagValue::Float(50.0));
        assert_eq!(resolution_dpi(&tags), Some((100.0, 50.0)));

        tags.insert(RESOLUTION_UNIT, TagValue::Unsigned(3));
        let (x, y) = resolution_dpi(&tags).unwrap();
        assert!((x - 254.0).abs() < 1e-9);
        assert!((y - 127.0).abs() < 1e-9);

        tags.insert(RESOLUTION_UNIT, TagValue::Unsigned(1));
        assert_eq!(resolution_dpi(&tags), None);
        assert_eq!(resolution_pair(&tags), Some((100.0, 50.0)));
    }
}
