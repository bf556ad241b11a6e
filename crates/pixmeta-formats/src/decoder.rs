use crate::metadata::ImageHandle;
use crate::probe::ProbeResult;
use image::error::ImageError;
use image::{ExtendedColorType, ImageDecoder as _, ImageReader};
use memmap2::Mmap;
use pixmeta_common::{Error, FormatTag, ImageFormat};
use std::fs::File;
use std::io::{self, Cursor};
use std::ops::Deref;
use std::path::Path;
use std::sync::Once;

const TEN_MB_IN_BYTES: u64 = 10 * 1024 * 1024;

static EXTRA_FORMATS: Once = Once::new();

/// Why a byte stream did not become an [`ImageHandle`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeFailure {
    /// No decoder recognized the data, or the header is corrupt
    #[error("unrecognized or corrupted image data")]
    Unidentified,

    #[error("{0}")]
    Other(String),
}

impl From<io::Error> for DecodeFailure {
    fn from(e: io::Error) -> Self {
        Self::Other(e.to_string())
    }
}

impl From<Error> for DecodeFailure {
    fn from(e: Error) -> Self {
        Self::Other(e.to_string())
    }
}

impl From<ImageError> for DecodeFailure {
    fn from(e: ImageError) -> Self {
        match e {
            ImageError::Decoding(_) | ImageError::Unsupported(_) => Self::Unidentified,
            // in-memory readers only fail this way on truncated data
            ImageError::IoError(ref io) if io.kind() == io::ErrorKind::UnexpectedEof => {
                Self::Unidentified
            }
            other => Self::Other(other.to_string()),
        }
    }
}

/// Header-only decoder: identifies the container, reads dimensions and color
/// type, then lets the per-format probe fill in the metadata side-channel.
pub struct ImageDecoder;

impl ImageDecoder {
    pub fn decode(data: &[u8]) -> Result<ImageHandle, DecodeFailure> {
        register_extra_formats();

        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        // hook-registered formats have no built-in variant; image-extras is
        // built with its PCX codec only, so an unnamed guess that decodes is PCX
        let hooked = reader.format().is_none();
        let format = match reader.format() {
            Some(guessed) => FormatTag::from_image_format(guessed),
            None => ImageFormat::Pcx.into(),
        };

        let probe = match format {
            FormatTag::Known(known) => ProbeResult::for_format(data, known),
            FormatTag::Other(_) => ProbeResult::default(),
        };

        let (dimensions, color) = match reader.into_decoder() {
            Ok(decoder) => (decoder.dimensions(), Some(decoder.original_color_type())),
            Err(e) if hooked => {
                tracing::debug!("No decoder claimed the data: {}", e);
                return Err(DecodeFailure::Unidentified);
            }
            // a recognized foreign format is still reportable by name
            Err(e) if matches!(format, FormatTag::Other(_)) => {
                tracing::debug!("No decoder for {}: {}", format, e);
                return Ok(ImageHandle::new(format, 0, 0, ""));
            }
            // the container parsed but its pixel layout is beyond the codec;
            // the header probe still knows the size and mode
            Err(ImageError::Unsupported(e)) if probe.dimensions.is_some() => {
                tracing::debug!("{} pixel layout unsupported, using header: {}", format, e);
                (probe.dimensions.unwrap_or_default(), None)
            }
            Err(e) => {
                tracing::debug!("{} header rejected: {}", format, e);
                return Err(e.into());
            }
        };

        tracing::debug!(
            "Decoded {} header {}x{} ({:?})",
            format,
            dimensions.0,
            dimensions.1,
            color
        );
        let fallback_mode = color.map(color_mode).unwrap_or_default();
        Ok(Self::assemble(format, dimensions, fallback_mode, probe))
    }

    /// Read a file and decode it, memory-mapping large inputs
    pub fn decode_path(path: &Path) -> Result<ImageHandle, DecodeFailure> {
        let source = read_source(path)?;
        Self::decode(&source)
    }

    fn assemble(
        format: FormatTag,
        (width, height): (u32, u32),
        fallback_mode: &str,
        probe: ProbeResult,
    ) -> ImageHandle {
        let mode = probe.mode.unwrap_or_else(|| fallback_mode.to_string());
        let mut handle = ImageHandle::new(format, width, height, mode).with_info(probe.info);
        if let Some(bits) = probe.bits {
            handle = handle.with_bits(bits);
        }
        if let Some(tags) = probe.tags {
            handle = handle.with_tags(tags);
        }
        handle
    }
}

/// Hook the image-extras codecs into `ImageReader` once per process
fn register_extra_formats() {
    EXTRA_FORMATS.call_once(|| {
        image_extras::register();
        tracing::debug!("Registered image-extras decoding hooks");
    });
}

/// Color-mode tag for the color type the decoder reports
fn color_mode(color: ExtendedColorType) -> &'static str {
    match color {
        ExtendedColorType::L1 => "1",
        ExtendedColorType::L16 => "I;16",
        ExtendedColorType::Cmyk8 => "CMYK",
        ExtendedColorType::Rgb32F => "F",
        other => match other.channel_count() {
            1 => "L",
            2 => "LA",
            3 => "RGB",
            _ => "RGBA",
        },
    }
}

/// File contents, either owned or mapped
pub enum SourceBytes {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl Deref for SourceBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Self::Owned(bytes) => bytes,
            Self::Mapped(mmap) => mmap,
        }
    }
}

/// Load a file for decoding; files over 10MB are memory-mapped
pub fn read_source(path: &Path) -> pixmeta_common::Result<SourceBytes> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let file = File::open(path)?;
    if file.metadata()?.len() > TEN_MB_IN_BYTES {
        tracing::debug!("Using memory-mapped I/O for {:?}", path);
        // SAFETY: the map is read-only and dropped with the report's source;
        // a concurrent truncation by another process is outside our control.
        let mmap = unsafe { Mmap::map(&file)? };
        return Ok(SourceBytes::Mapped(mmap));
    }

    Ok(SourceBytes::Owned(std::fs::read(path)?))
}
