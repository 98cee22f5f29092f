use crate::foundation::error::{StripError, StripResult};

const CHANNELS: usize = 3;

/// Separable Gaussian blur over a packed RGB8 buffer with clamped edges.
pub fn blur_rgb8(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> StripResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(CHANNELS))
        .ok_or_else(|| StripError::filter("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(StripError::filter(
            "blur_rgb8 expects src matching width*height*3",
        ));
    }
    if radius == 0 || expected_len == 0 {
        return Ok(src.to_vec());
    }

    let kernel = kernel_q16(radius, sigma)?;
    let (w, h) = (width as usize, height as usize);
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    // Rows, then columns.
    convolve(src, &mut tmp, &kernel, h, w, w * CHANNELS, CHANNELS);
    convolve(&tmp, &mut out, &kernel, w, h, CHANNELS, w * CHANNELS);
    Ok(out)
}

/// Kernel half-width covering three standard deviations.
pub fn radius_for_sigma(sigma: f32) -> u32 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return 0;
    }
    (sigma * 3.0).ceil() as u32
}

/// Normalized Gaussian taps in 16.16 fixed point, summing to exactly `1 << 16`.
fn kernel_q16(radius: u32, sigma: f32) -> StripResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(StripError::filter("blur sigma must be > 0"));
    }

    let r = radius as i64;
    let two_s2 = 2.0 * f64::from(sigma) * f64::from(sigma);
    let raw: Vec<f64> = (-r..=r)
        .map(|i| (-((i * i) as f64) / two_s2).exp())
        .collect();
    let total: f64 = raw.iter().sum();
    if total <= 0.0 {
        return Err(StripError::filter("gaussian kernel sum is zero"));
    }

    let mut taps: Vec<u32> = raw
        .iter()
        .map(|w| ((w / total) * ONE_Q16 as f64).round().clamp(0.0, ONE_Q16 as f64) as u32)
        .collect();
    let sum: i64 = taps.iter().map(|&t| i64::from(t)).sum();
    let mid = taps.len() / 2;
    taps[mid] = (i64::from(taps[mid]) + ONE_Q16 - sum).clamp(0, ONE_Q16) as u32;
    Ok(taps)
}

const ONE_Q16: i64 = 1 << 16;

/// 1-D convolution along `len` samples spaced `step` bytes apart, repeated for
/// `lines` lines spaced `line_stride` bytes apart. Edges clamp.
fn convolve(
    src: &[u8],
    dst: &mut [u8],
    taps: &[u32],
    lines: usize,
    len: usize,
    line_stride: usize,
    step: usize,
) {
    let radius = (taps.len() / 2) as isize;
    let last = len as isize - 1;
    for line in 0..lines {
        let base = line * line_stride;
        for i in 0..len {
            let mut acc = [0u64; CHANNELS];
            for (k, &t) in taps.iter().enumerate() {
                let j = (i as isize + k as isize - radius).clamp(0, last) as usize;
                let px = &src[base + j * step..base + j * step + CHANNELS];
                for (a, &v) in acc.iter_mut().zip(px) {
                    *a += u64::from(t) * u64::from(v);
                }
            }
            let at = base + i * step;
            for (d, a) in dst[at..at + CHANNELS].iter_mut().zip(acc) {
                *d = ((a + (1 << 15)) >> 16).min(255) as u8;
            }
        }
    }
}
