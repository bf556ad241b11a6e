use super::{ProbeResult, le_u16};

const BITS_PER_PLANE: usize = 3;
const PLANES: usize = 65;

/// Header fields the PCX decoder does not surface: the stored densities and
/// the plane layout that tells palette images from true color.
pub(crate) fn probe(data: &[u8]) -> ProbeResult {
    let mut result = ProbeResult::default();
    let (Some(&bpp), Some(&planes)) = (data.get(BITS_PER_PLANE), data.get(PLANES)) else {
        return result;
    };

    if let (Some(hdpi), Some(vdpi)) = (le_u16(data, 12), le_u16(data, 14)) {
        result.info.dpi = Some((hdpi.into(), vdpi.into()));
    }
    result.info.bits = Some(u32::from(bpp) * u32::from(planes));
    result.mode = Some(
        match (bpp, planes) {
            (1, 1) => "1",
            (8, 3) => "RGB",
            _ => "P",
        }
        .to_string(),
    );
    result
}
