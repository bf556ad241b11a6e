use pixmeta_common::ImageFormat;
use pixmeta_formats::ImageHandle;

const MODES: [(&str, &str); 13] = [
    ("1", "1 (binary)"),
    ("L", "8 (grayscale)"),
    ("P", "8 (palette)"),
    ("RGB", "24 (True Color)"),
    ("RGBA", "32 (True Color + Alpha)"),
    ("CMYK", "32 (CMYK)"),
    ("YCbCr", "24 (YCbCr)"),
    ("LAB", "24 (LAB)"),
    ("HSV", "24 (HSV)"),
    ("I", "32 (integer)"),
    ("F", "32 (floating point)"),
    ("LA", "16 (grayscale + Alpha)"),
    ("PA", "16 (palette + Alpha)"),
];

pub(crate) fn describe_mode(mode: &str) -> String {
    MODES
        .iter()
        .find(|(tag, _)| *tag == mode)
        .map(|(_, description)| description.to_string())
        .unwrap_or_else(|| format!("{mode} (non-standard)"))
}

/// JPEG precision is always 8 in practice, so only the mode is shown
pub(crate) fn describe(handle: &ImageHandle, format: ImageFormat) -> String {
    let description = describe_mode(&handle.mode);
    match handle.bits {
        Some(bits) if format != ImageFormat::Jpeg => format!("{bits} bits - {description}"),
        _ => description,
    }
}
