use crate::foundation::error::{StripError, StripResult};

pub type PremulRgba8 = [u8; 4];

/// Source-over of a premultiplied RGBA pixel onto an opaque RGB pixel.
pub fn over_opaque(dst: [u8; 3], src: PremulRgba8) -> [u8; 3] {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return [src[0], src[1], src[2]];
    }

    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 3];
    for i in 0..3 {
        out[i] = src[i].saturating_add(mul_div255(u16::from(dst[i]), inv));
    }
    out
}

/// Linear mix `a*(1-t) + b*t` of two opaque RGB pixels.
pub fn mix(a: [u8; 3], b: [u8; 3], t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    let mut out = [0u8; 3];
    for i in 0..3 {
        let v = f32::from(a[i]) * (1.0 - t) + f32::from(b[i]) * t;
        out[i] = v.round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Flatten a premultiplied RGBA layer onto an RGB buffer of the same dimensions.
pub fn over_rgb_in_place(dst_rgb: &mut [u8], src_premul: &[u8]) -> StripResult<()> {
    if !dst_rgb.len().is_multiple_of(3)
        || !src_premul.len().is_multiple_of(4)
        || dst_rgb.len() / 3 != src_premul.len() / 4
    {
        return Err(StripError::render(
            "over_rgb_in_place expects rgb8 and rgba8 buffers with equal pixel counts",
        ));
    }
    for (d, s) in dst_rgb.chunks_exact_mut(3).zip(src_premul.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let out = over_opaque([d[0], d[1], d[2]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}
