use std::collections::BTreeSet;
use std::fmt;

use pixmeta_common::{ImageFormat, Result};
use pixmeta_formats::{ImageHandle, Palette};

const PNG_FILTERS: [&str; 5] = ["none", "Sub", "Up", "Average", "Paeth"];

const TIFF_SCHEMES: [(u32, &str); 6] = [
    (1, "uncompressed"),
    (5, "LZW"),
    (6, "JPEG"),
    (7, "JPEG"),
    (8, "Deflate"),
    (32946, "Deflate"),
];

/// Scheme name with optional details, rendered "scheme (d1, d2)"
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Compression {
    scheme: String,
    details: Vec<String>,
}

impl Compression {
    fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            details: Vec::new(),
        }
    }

    fn detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.scheme)?;
        if !self.details.is_empty() {
            write!(f, " ({})", self.details.join(", "))?;
        }
        Ok(())
    }
}

pub(crate) fn infer(handle: &ImageHandle, format: ImageFormat) -> Compression {
    let info = &handle.info;
    match format {
        ImageFormat::Jpeg => Compression::new("JPEG").detail(match info.quality {
            Some(q) => format!("quality {q}"),
            None => "quality ~75".to_string(),
        }),
        ImageFormat::Png => {
            let deflate = Compression::new("Deflate");
            match info.compression {
                Some(code) => deflate.detail(png_filter(code)),
                None => deflate,
            }
        }
        ImageFormat::Tiff => Compression::new(tiff_scheme(info.compression)),
        ImageFormat::Gif => {
            let lzw = Compression::new("LZW");
            if !handle.is_palette_mode() {
                return lzw;
            }
            match palette_colors(info.palette.as_ref()) {
                Ok(Some(n)) => lzw.detail(format!("{n} colors")),
                Ok(None) => lzw,
                Err(e) => {
                    tracing::debug!("GIF palette unavailable: {}", e);
                    lzw.detail("up to 256 colors")
                }
            }
        }
        ImageFormat::Bmp => match info.compression {
            Some(code) if code != 0 => Compression::new("RLE").detail(format!("type {code}")),
            _ => Compression::new("uncompressed"),
        },
        ImageFormat::Pcx => Compression::new("RLE"),
    }
}

fn png_filter(code: u32) -> String {
    PNG_FILTERS
        .get(code as usize)
        .map(|name| format!("filter {name}"))
        .unwrap_or_else(|| format!("method {code}"))
}

fn tiff_scheme(code: Option<u32>) -> String {
    let Some(code) = code else {
        return "uncompressed".to_string();
    };
    TIFF_SCHEMES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| format!("code {code}"))
}

/// Distinct non-black palette entries, capped at 256. `None` when the image
/// carries no color table at all.
pub(crate) fn palette_colors(palette: Option<&Palette>) -> Result<Option<usize>> {
    let Some(palette) = palette.filter(|p| !p.is_empty()) else {
        return Ok(None);
    };
    let distinct: BTreeSet<[u8; 3]> = palette
        .entries()?
        .into_iter()
        .filter(|rgb| *rgb != [0, 0, 0])
        .collect();
    Ok(Some(distinct.len().min(Palette::MAX_ENTRIES)))
}
