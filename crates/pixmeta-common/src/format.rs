/// Formats the metadata engine knows how to analyze
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Gif,
    Tiff,
    Bmp,
    Png,
    Pcx,
}

impl ImageFormat {
    /// Allow-list in reporting order
    pub const SUPPORTED: [ImageFormat; 6] = [
        Self::Jpeg,
        Self::Gif,
        Self::Tiff,
        Self::Bmp,
        Self::Png,
        Self::Pcx,
    ];

    /// Map the `image` crate's format onto the allow-list
    pub fn from_image_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::Gif => Some(Self::Gif),
            image::ImageFormat::Tiff => Some(Self::Tiff),
            image::ImageFormat::Bmp => Some(Self::Bmp),
            image::ImageFormat::Png => Some(Self::Png),
            _ => None,
        }
    }

    /// Upper-case name used in reports
    pub fn name(&self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Gif => "GIF",
            Self::Tiff => "TIFF",
            Self::Bmp => "BMP",
            Self::Png => "PNG",
            Self::Pcx => "PCX",
        }
    }

    /// Comma-separated allow-list, e.g. for rejection messages
    pub fn supported_list() -> String {
        Self::SUPPORTED
            .iter()
            .map(|f| f.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Format as identified by the decoder, which may fall outside the allow-list
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FormatTag {
    Known(ImageFormat),
    Other(String),
}

impl FormatTag {
    pub fn from_image_format(format: image::ImageFormat) -> Self {
        match ImageFormat::from_image_format(format) {
            Some(known) => Self::Known(known),
            None => Self::Other(format!("{format:?}").to_uppercase()),
        }
    }

    /// The allow-listed format, if any
    pub fn supported(&self) -> Option<ImageFormat> {
        match self {
            Self::Known(format) => Some(*format),
            Self::Other(_) => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Known(format) => format.name(),
            Self::Other(name) => name,
        }
    }
}

impl From<ImageFormat> for FormatTag {
    fn from(format: ImageFormat) -> Self {
        Self::Known(format)
    }
}

impl std::fmt::Display for FormatTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
