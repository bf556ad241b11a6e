use pixmeta_common::ImageFormat;
use pixmeta_formats::{ImageHandle, TagTable};

use super::compression::palette_colors;

pub(crate) const BASIC_METADATA: &str = "Basic metadata";

const EXIF_LABELS: [(u16, &str); 5] = [
    (271, "Camera make"),
    (272, "Camera model"),
    (274, "Orientation"),
    (306, "Date taken"),
    (36867, "Original date taken"),
];
const EXIF_LIMIT: usize = 2;

const TIFF_LABELS: [(u16, &str); 5] = [
    (256, "Width"),
    (257, "Height"),
    (262, "Photometric interpretation"),
    (274, "Orientation"),
    (277, "Samples per pixel"),
];
const TIFF_LIMIT: usize = 3;

/// Format-specific notes joined with "; "
pub(crate) fn collect(handle: &ImageHandle, format: ImageFormat) -> String {
    let info = &handle.info;
    let mut notes = Vec::new();

    match format {
        ImageFormat::Jpeg => {
            if let Some(n) = info.quantization_tables {
                notes.push(format!("Quantization tables: {n}"));
            }
            let exif = info
                .exif
                .as_ref()
                .map(|tags| labeled(tags, &EXIF_LABELS, EXIF_LIMIT))
                .unwrap_or_default();
            if !exif.is_empty() {
                notes.push(format!("EXIF: {}", exif.join("; ")));
            }
        }
        ImageFormat::Gif if handle.is_palette_mode() => {
            // a broken table suppresses the frame note as well
            match palette_colors(info.palette.as_ref()) {
                Ok(present) => {
                    if present.is_some() {
                        notes.push("GIF: palette up to 256 colors".to_string());
                    }
                    if let Some(frames) = info.frame_count.filter(|_| info.is_animated()) {
                        notes.push(format!("Animated ({frames} frames)"));
                    }
                }
                Err(_) => notes.push("GIF: color palette".to_string()),
            }
        }
        ImageFormat::Tiff => {
            let tags = handle
                .tags
                .as_ref()
                .map(|tags| labeled(tags, &TIFF_LABELS, TIFF_LIMIT))
                .unwrap_or_default();
            if !tags.is_empty() {
                notes.push(format!("TIFF tags: {}", tags.join(", ")));
            }
        }
        ImageFormat::Png => {
            let mut parts = Vec::new();
            if let Some(gamma) = info.gamma {
                parts.push(format!("Gamma: {gamma:.3}"));
            }
            if let Some(interlaced) = info.interlace {
                parts.push(if interlaced { "Interlaced" } else { "Not interlaced" }.to_string());
            }
            if !parts.is_empty() {
                notes.push(format!("PNG: {}", parts.join("; ")));
            }
        }
        ImageFormat::Bmp => {
            if let Some(bits) = info.bits {
                notes.push(format!("BMP: {bits} bits/pixel"));
            }
        }
        _ => {}
    }

    if notes.is_empty() {
        BASIC_METADATA.to_string()
    } else {
        notes.join("; ")
    }
}

/// "label: value" for allow-listed tags that are present and non-empty,
/// in allow-list order
fn labeled(tags: &TagTable, labels: &[(u16, &str)], limit: usize) -> Vec<String> {
    labels
        .iter()
        .filter_map(|(id, label)| {
            tags.get(id)
                .filter(|value| !value.is_empty())
                .map(|value| format!("{label}: {value}"))
        })
        .take(limit)
        .collect()
}
