//! Resolution inference. Providers run in order and the first one that
//! produces a value wins; a provider that finds malformed data fails the
//! whole analysis instead of being skipped.

use std::fmt;

use pixmeta_common::{Error, ImageFormat, Result};
use pixmeta_formats::{ImageHandle, TagValue};

const TIFF_X_RESOLUTION: u16 = 282;
const TIFF_Y_RESOLUTION: u16 = 283;
const PIXELS_PER_METER_PER_DPI: f64 = 39.37;

pub(crate) const NOT_SPECIFIED: &str = "Not specified";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dpi {
    pub x: f64,
    pub y: f64,
}

impl Dpi {
    fn positive(x: f64, y: f64) -> Option<Self> {
        (x > 0.0 && y > 0.0).then_some(Self { x, y })
    }

    fn uniform(v: f64) -> Self {
        Self { x: v, y: v }
    }
}

impl fmt::Display for Dpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6} x {:.6} DPI", self.x, self.y)
    }
}

type Provider = fn(&ImageHandle, ImageFormat) -> Result<Option<Dpi>>;

const PROVIDERS: [(&str, Provider); 4] = [
    ("explicit", explicit),
    ("tiff tags", tiff_tags),
    ("bmp resolution", bmp_resolution),
    ("format default", format_default),
];

pub(crate) fn infer(handle: &ImageHandle, format: ImageFormat) -> Result<Option<Dpi>> {
    for (name, provider) in PROVIDERS {
        if let Some(dpi) = provider(handle, format)? {
            tracing::trace!("DPI from {} provider: {}", name, dpi);
            return Ok(Some(dpi));
        }
    }
    Ok(None)
}

fn explicit(handle: &ImageHandle, _: ImageFormat) -> Result<Option<Dpi>> {
    Ok(handle.info.dpi.and_then(|(x, y)| Dpi::positive(x, y)))
}

fn tiff_tags(handle: &ImageHandle, format: ImageFormat) -> Result<Option<Dpi>> {
    if format != ImageFormat::Tiff {
        return Ok(None);
    }
    let (Some(x), Some(y)) = (handle.tag(TIFF_X_RESOLUTION), handle.tag(TIFF_Y_RESOLUTION)) else {
        return Ok(None);
    };
    Ok(Dpi::positive(
        numeric("XResolution", x)?,
        numeric("YResolution", y)?,
    ))
}

fn numeric(field: &str, value: &TagValue) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| Error::malformed(field, format!("expected a number, found \"{value}\"")))
}

fn bmp_resolution(handle: &ImageHandle, format: ImageFormat) -> Result<Option<Dpi>> {
    if format != ImageFormat::Bmp {
        return Ok(None);
    }
    Ok(handle.info.resolution.and_then(|(x, y)| {
        Dpi::positive(x / PIXELS_PER_METER_PER_DPI, y / PIXELS_PER_METER_PER_DPI)
    }))
}

fn format_default(_: &ImageHandle, format: ImageFormat) -> Result<Option<Dpi>> {
    let dpi = match format {
        ImageFormat::Gif | ImageFormat::Jpeg | ImageFormat::Pcx => 72.0,
        ImageFormat::Png | ImageFormat::Bmp => 96.0,
        ImageFormat::Tiff => 300.0,
    };
    Ok(Some(Dpi::uniform(dpi)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixmeta_formats::{ImageInfo, TagTable};

    fn handle(format: ImageFormat, info: ImageInfo) -> ImageHandle {
        ImageHandle::new(format, 10, 10, "RGB").with_info(info)
    }

    fn render(handle: &ImageHandle, format: ImageFormat) -> String {
        infer(handle, format).unwrap().unwrap().to_string()
    }

    #[test]
    fn test_format_defaults() {
        let jpeg = handle(ImageFormat::Jpeg, ImageInfo::default());
        assert_eq!(render(&jpeg, ImageFormat::Jpeg), "72.000000 x 72.000000 DPI");

        let tiff = handle(ImageFormat::Tiff, ImageInfo::default());
        assert_eq!(render(&tiff, ImageFormat::Tiff), "300.000000 x 300.000000 DPI");
    }

    #[test]
    fn test_explicit_dpi_wins() {
        let info = ImageInfo {
            dpi: Some((300.0, 150.0)),
            ..Default::default()
        };
        let png = handle(ImageFormat::Png, info);
        assert_eq!(render(&png, ImageFormat::Png), "300.000000 x 150.000000 DPI");
    }

    #[test]
    fn test_zero_explicit_dpi_falls_through() {
        let info = ImageInfo {
            dpi: Some((0.0, 72.0)),
            ..Default::default()
        };
        let png = handle(ImageFormat::Png, info);
        assert_eq!(render(&png, ImageFormat::Png), "96.000000 x 96.000000 DPI");
    }

    #[test]
    fn test_bmp_pixels_per_meter() {
        let info = ImageInfo {
            resolution: Some((3937.0, 3937.0)),
            ..Default::default()
        };
        let bmp = handle(ImageFormat::Bmp, info);
        assert_eq!(render(&bmp, ImageFormat::Bmp), "100.000000 x 100.000000 DPI");
    }

    #[test]
    fn test_tiff_tags_before_default() {
        let mut tags = TagTable::new();
        tags.insert(TIFF_X_RESOLUTION, TagValue::Float(72.0));
        tags.insert(TIFF_Y_RESOLUTION, TagValue::Unsigned(72));
        let tiff = handle(ImageFormat::Tiff, ImageInfo::default()).with_tags(tags);
        assert_eq!(render(&tiff, ImageFormat::Tiff), "72.000000 x 72.000000 DPI");
    }

    #[test]
    fn test_textual_tiff_resolution_is_an_error() {
        let mut tags = TagTable::new();
        tags.insert(TIFF_X_RESOLUTION, TagValue::Text("high".into()));
        tags.insert(TIFF_Y_RESOLUTION, TagValue::Float(72.0));
        let tiff = handle(ImageFormat::Tiff, ImageInfo::default()).with_tags(tags);

        let err = infer(&tiff, ImageFormat::Tiff).unwrap_err();
        assert!(err.to_string().contains("XResolution"));
    }
}
