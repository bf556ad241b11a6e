use std::collections::BTreeMap;
use std::fmt;

use pixmeta_common::{Error, FormatTag, Result};

/// TIFF/EXIF tag id → value
pub type TagTable = BTreeMap<u16, TagValue>;

/// Decoded image as seen by the metadata engine: header facts plus the
/// per-format side-channel the probes managed to read.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageHandle {
    pub format: FormatTag,
    pub width: u32,
    pub height: u32,
    /// Color-mode tag ("1", "L", "P", "RGB", "RGBA", "CMYK", ...)
    pub mode: String,
    /// Explicit bits-per-sample attribute, when the format carries one
    pub bits: Option<u32>,
    pub info: ImageInfo,
    /// IFD0 tag table, TIFF only
    pub tags: Option<TagTable>,
}

impl ImageHandle {
    pub fn new(format: impl Into<FormatTag>, width: u32, height: u32, mode: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            width,
            height,
            mode: mode.into(),
            bits: None,
            info: ImageInfo::default(),
            tags: None,
        }
    }

    pub fn with_bits(mut self, bits: u32) -> Self {
        self.bits = Some(bits);
        self
    }

    pub fn with_info(mut self, info: ImageInfo) -> Self {
        self.info = info;
        self
    }

    pub fn with_tags(mut self, tags: TagTable) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn tag(&self, id: u16) -> Option<&TagValue> {
        self.tags.as_ref().and_then(|tags| tags.get(&id))
    }

    pub fn is_palette_mode(&self) -> bool {
        self.mode == "P"
    }
}

/// Per-format metadata reported by the decoder. Every field is optional;
/// absence means the container did not carry it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageInfo {
    /// Dots per inch, as stored (or converted from dots/cm)
    pub dpi: Option<(f64, f64)>,
    /// Raw resolution pair: pixels per meter for BMP, unitless for TIFF
    pub resolution: Option<(f64, f64)>,
    /// Format-specific compression code (PNG: first-row filter type)
    pub compression: Option<u32>,
    pub quality: Option<u8>,
    pub gamma: Option<f64>,
    pub interlace: Option<bool>,
    /// Bits per pixel as written in the file header (BMP)
    pub bits: Option<u32>,
    pub palette: Option<Palette>,
    pub frame_count: Option<u32>,
    pub quantization_tables: Option<usize>,
    pub exif: Option<TagTable>,
}

impl ImageInfo {
    pub fn is_animated(&self) -> bool {
        self.frame_count.is_some_and(|n| n > 1)
    }
}

/// Raw RGB palette bytes exactly as found in the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    bytes: Vec<u8>,
}

impl Palette {
    pub const MAX_ENTRIES: usize = 256;

    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// RGB triples; fails on truncated or oversized tables
    pub fn entries(&self) -> Result<Vec<[u8; 3]>> {
        if self.bytes.len() % 3 != 0 {
            return Err(Error::malformed(
                "palette",
                format!("{} bytes is not a whole number of RGB entries", self.bytes.len()),
            ));
        }
        if self.bytes.len() / 3 > Self::MAX_ENTRIES {
            return Err(Error::malformed(
                "palette",
                format!("{} entries exceeds {}", self.bytes.len() / 3, Self::MAX_ENTRIES),
            ));
        }

        Ok(self
            .bytes
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect())
    }
}

/// A single TIFF/EXIF tag value, narrowed to what reports need
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Multiple(Vec<TagValue>),
}

impl TagValue {
    /// Numeric view of a scalar tag
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Unsigned(v) => Some(*v as f64),
            Self::Signed(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// First integer of a scalar or list tag
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Unsigned(v) => u32::try_from(*v).ok(),
            Self::Signed(v) => u32::try_from(*v).ok(),
            Self::Multiple(values) => values.first().and_then(TagValue::as_u32),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Bytes(bytes) => bytes.is_empty(),
            Self::Multiple(values) => values.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsigned(v) => write!(f, "{v}"),
            Self::Signed(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(text) => f.write_str(text),
            Self::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Self::Multiple(values) => {
                f.write_str("(")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str(")")
            }
        }
    }
}
