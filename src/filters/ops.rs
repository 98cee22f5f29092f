use image::RgbImage;
use rand::Rng;

use crate::{
    blur_cpu,
    composite_cpu::mix,
    config::Rgb8,
    foundation::error::{StripError, StripResult},
};

/// One stage of a filter pipeline. Every stage maps an RGB image to a new RGB
/// image of the same dimensions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    /// Rec. 601 luma replicated into all three channels.
    Grayscale,
    /// Map luma linearly from `shadow` (black) to `highlight` (white).
    Duotone { shadow: Rgb8, highlight: Rgb8 },
    /// Blend toward a flat color.
    Tint { color: Rgb8, alpha: f32 },
    /// Blend toward a duotone rendition of the same image.
    DuotoneBlend {
        shadow: Rgb8,
        highlight: Rgb8,
        alpha: f32,
    },
    /// Blend toward a blurred copy of the same image.
    GlowBlend { radius: f32, alpha: f32 },
    Contrast(f32),
    Brightness(f32),
    Saturation(f32),
    Blur { radius: f32 },
    ChannelScale([f32; 3]),
    /// Blend toward per-pixel uniform gray noise.
    Noise { weight: f32 },
}

impl Step {
    fn params_finite(&self) -> bool {
        match *self {
            Self::Grayscale | Self::Duotone { .. } => true,
            Self::Tint { alpha, .. } | Self::DuotoneBlend { alpha, .. } => alpha.is_finite(),
            Self::GlowBlend { radius, alpha } => radius.is_finite() && alpha.is_finite(),
            Self::Contrast(f) | Self::Brightness(f) | Self::Saturation(f) => f.is_finite(),
            Self::Blur { radius } => radius.is_finite(),
            Self::ChannelScale(fs) => fs.iter().all(|f| f.is_finite()),
            Self::Noise { weight } => weight.is_finite(),
        }
    }
}

pub fn run_step<R: Rng + ?Sized>(img: &RgbImage, step: Step, rng: &mut R) -> StripResult<RgbImage> {
    if !step.params_finite() {
        return Err(StripError::filter(format!("{step:?} has non-finite parameters")));
    }

    let out = match step {
        Step::Grayscale => grayscale(img),
        Step::Duotone { shadow, highlight } => duotone(img, shadow, highlight),
        Step::Tint { color, alpha } => {
            let c = color.to_array();
            map_pixels(img, |px| mix(px, c, alpha))
        }
        Step::DuotoneBlend {
            shadow,
            highlight,
            alpha,
        } => blend(img, &duotone(img, shadow, highlight), alpha)?,
        Step::GlowBlend { radius, alpha } => blend(img, &gaussian_blur(img, radius)?, alpha)?,
        Step::Contrast(factor) => contrast(img, factor),
        Step::Brightness(factor) => map_pixels(img, |px| scale(px, [factor; 3])),
        Step::Saturation(factor) => saturation(img, factor),
        Step::Blur { radius } => gaussian_blur(img, radius)?,
        Step::ChannelScale(factors) => map_pixels(img, |px| scale(px, factors)),
        Step::Noise { weight } => noise(img, weight, rng),
    };

    if out.dimensions() != img.dimensions() {
        return Err(StripError::filter(format!(
            "{step:?} changed image size {:?} -> {:?}",
            img.dimensions(),
            out.dimensions()
        )));
    }
    Ok(out)
}

pub fn luma(px: [u8; 3]) -> u8 {
    let [r, g, b] = px.map(u32::from);
    ((r * 19595 + g * 38470 + b * 7471 + 0x8000) >> 16) as u8
}

pub fn mean_luma(img: &RgbImage) -> u8 {
    let n = u64::from(img.width()) * u64::from(img.height());
    if n == 0 {
        return 0;
    }
    let sum: u64 = img.pixels().map(|p| u64::from(luma(p.0))).sum();
    ((sum as f64 / n as f64) + 0.5) as u8
}

fn map_pixels(img: &RgbImage, f: impl Fn([u8; 3]) -> [u8; 3]) -> RgbImage {
    let mut out = img.clone();
    for p in out.pixels_mut() {
        p.0 = f(p.0);
    }
    out
}

fn grayscale(img: &RgbImage) -> RgbImage {
    map_pixels(img, |px| [luma(px); 3])
}

fn duotone(img: &RgbImage, shadow: Rgb8, highlight: Rgb8) -> RgbImage {
    let (s, h) = (shadow.to_array(), highlight.to_array());
    let mut lut = [[0u8; 3]; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        *entry = mix(s, h, i as f32 / 255.0);
    }
    map_pixels(img, |px| lut[usize::from(luma(px))])
}

fn blend(a: &RgbImage, b: &RgbImage, alpha: f32) -> StripResult<RgbImage> {
    if a.dimensions() != b.dimensions() {
        return Err(StripError::filter("blend expects images of equal size"));
    }
    let mut out = a.clone();
    for (o, p) in out.pixels_mut().zip(b.pixels()) {
        o.0 = mix(o.0, p.0, alpha);
    }
    Ok(out)
}

fn contrast(img: &RgbImage, factor: f32) -> RgbImage {
    let mean = mean_luma(img);
    map_pixels(img, |px| extrapolate([mean; 3], px, factor))
}

fn saturation(img: &RgbImage, factor: f32) -> RgbImage {
    map_pixels(img, |px| extrapolate([luma(px); 3], px, factor))
}

fn scale(px: [u8; 3], factors: [f32; 3]) -> [u8; 3] {
    let mut out = [0u8; 3];
    for i in 0..3 {
        out[i] = (f32::from(px[i]) * factors[i]).round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// `base + f*(px-base)`, allowed to overshoot past `px` for `f > 1`.
fn extrapolate(base: [u8; 3], px: [u8; 3], factor: f32) -> [u8; 3] {
    let mut out = [0u8; 3];
    for i in 0..3 {
        let b = f32::from(base[i]);
        let v = b + factor * (f32::from(px[i]) - b);
        out[i] = v.round().clamp(0.0, 255.0) as u8;
    }
    out
}

fn gaussian_blur(img: &RgbImage, sigma: f32) -> StripResult<RgbImage> {
    let (w, h) = img.dimensions();
    let radius = blur_cpu::radius_for_sigma(sigma);
    let data = blur_cpu::blur_rgb8(img.as_raw(), w, h, radius, sigma)?;
    RgbImage::from_raw(w, h, data).ok_or_else(|| StripError::filter("blur output size mismatch"))
}

fn noise<R: Rng + ?Sized>(img: &RgbImage, weight: f32, rng: &mut R) -> RgbImage {
    let mut out = img.clone();
    for p in out.pixels_mut() {
        let n: u8 = rng.random();
        p.0 = mix(p.0, [n; 3], weight);
    }
    out
}
