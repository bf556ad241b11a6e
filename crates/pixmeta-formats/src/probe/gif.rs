use std::io::Cursor;

use super::ProbeResult;
use crate::metadata::Palette;

/// Color table and frame count. Frames are walked with LZW decoding
/// switched off, so only their descriptors are read.
pub(crate) fn probe(data: &[u8]) -> ProbeResult {
    let mut result = ProbeResult {
        mode: Some("P".to_string()),
        ..Default::default()
    };

    let mut options = gif::DecodeOptions::new();
    options.check_frame_consistency(false);
    options.skip_frame_decoding(true);

    let mut decoder = match options.read_info(Cursor::new(data)) {
        Ok(decoder) => decoder,
        Err(e) => {
            tracing::debug!("GIF header unreadable: {}", e);
            return result;
        }
    };
    result.dimensions = Some((decoder.width().into(), decoder.height().into()));

    let mut palette = decoder.global_palette().map(|table| Palette::new(table.to_vec()));
    let mut frames = 0u32;
    loop {
        match decoder.next_frame_info() {
            Ok(Some(frame)) => {
                frames += 1;
                if palette.is_none() {
                    palette = frame.palette.clone().map(Palette::new);
                }
            }
            Ok(None) => break,
            // keep the frames whose descriptors were read
            Err(e) => {
                tracing::debug!("GIF frame walk stopped after {} frames: {}", frames, e);
                break;
            }
        }
    }

    result.info.palette = palette;
    if frames > 0 {
        result.info.frame_count = Some(frames);
    }
    result
}
