//! Per-photo normalization and film-stock tone filters.
//!
//! Photos go through [`prepare`] (RGB, centered square crop, working resolution,
//! optional mirror) and then [`apply`]. Filters never fail a composition: a
//! pipeline error is logged and the unfiltered photo is used instead.

mod catalog;
mod ops;

use image::{DynamicImage, RgbImage, imageops::FilterType};
use rand::Rng;

pub use catalog::Filter;
pub use ops::{Step, luma, mean_luma, run_step};

use crate::foundation::error::{StripError, StripResult};

/// Side length photos are normalized to before filtering.
pub const WORKING_SIZE: u32 = 600;

/// Convert to RGB, crop the centered square of side `min(w, h)`, resize to the
/// working resolution and optionally mirror horizontally.
pub fn prepare(image: &DynamicImage, mirror: bool) -> StripResult<RgbImage> {
    let (w, h) = (image.width(), image.height());
    if w == 0 || h == 0 {
        return Err(StripError::validation(format!(
            "photo has zero area ({w}x{h})"
        )));
    }

    let rgb = image.to_rgb8();
    let square = center_square(&rgb);
    let mut out = if square.dimensions() == (WORKING_SIZE, WORKING_SIZE) {
        square
    } else {
        image::imageops::resize(&square, WORKING_SIZE, WORKING_SIZE, FilterType::CatmullRom)
    };
    if mirror {
        image::imageops::flip_horizontal_in_place(&mut out);
    }
    Ok(out)
}

/// Centered square crop; already-square images are returned as a copy.
pub fn center_square(img: &RgbImage) -> RgbImage {
    let (w, h) = img.dimensions();
    let side = w.min(h);
    let x = (w - side) / 2;
    let y = (h - side) / 2;
    image::imageops::crop_imm(img, x, y, side, side).to_image()
}

/// Apply `filter` using the thread-local random source for noise.
pub fn apply(image: &RgbImage, filter: Filter) -> RgbImage {
    apply_with_rng(image, filter, &mut rand::rng())
}

pub fn apply_with_rng<R: Rng + ?Sized>(image: &RgbImage, filter: Filter, rng: &mut R) -> RgbImage {
    apply_steps(image, filter.name(), filter.pipeline(), rng)
}

/// Run `steps`, returning a copy of `image` when any stage fails.
pub fn apply_steps<R: Rng + ?Sized>(
    image: &RgbImage,
    name: &str,
    steps: &[Step],
    rng: &mut R,
) -> RgbImage {
    match try_apply(image, steps, rng) {
        Ok(out) => out,
        Err(err) => {
            tracing::warn!(filter = name, %err, "filter failed, keeping original photo");
            image.clone()
        }
    }
}

/// Run every stage of `steps`, surfacing the first error.
pub fn try_apply<R: Rng + ?Sized>(
    image: &RgbImage,
    steps: &[Step],
    rng: &mut R,
) -> StripResult<RgbImage> {
    let mut steps = steps.iter();
    let Some(first) = steps.next() else {
        return Ok(image.clone());
    };
    let mut current = run_step(image, *first, rng)?;
    for step in steps {
        current = run_step(&current, *step, rng)?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn gradient(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    #[test]
    fn prepare_crops_center_square_before_resize() {
        // Left third red, middle third green, right third blue.
        let img = RgbImage::from_fn(300, 100, |x, _| match x {
            0..100 => image::Rgb([255, 0, 0]),
            100..200 => image::Rgb([0, 255, 0]),
            _ => image::Rgb([0, 0, 255]),
        });
        let sq = center_square(&img);
        assert_eq!(sq.dimensions(), (100, 100));
        assert!(sq.pixels().all(|p| p.0 == [0, 255, 0]));

        let out = prepare(&DynamicImage::ImageRgb8(img), false).unwrap();
        assert_eq!(out.dimensions(), (WORKING_SIZE, WORKING_SIZE));
        assert_eq!(out.get_pixel(300, 300).0, [0, 255, 0]);
    }

    #[test]
    fn prepare_normalizes_pixel_format_and_mirrors() {
        let mut rgba = image::RgbaImage::from_pixel(600, 600, image::Rgba([0, 0, 0, 255]));
        rgba.put_pixel(0, 10, image::Rgba([255, 255, 255, 255]));
        let out = prepare(&DynamicImage::ImageRgba8(rgba), true).unwrap();
        assert_eq!(out.get_pixel(599, 10).0, [255, 255, 255]);
        assert_eq!(out.get_pixel(0, 10).0, [0, 0, 0]);
    }

    #[test]
    fn prepare_rejects_zero_area() {
        let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 10));
        assert!(matches!(
            prepare(&empty, false),
            Err(StripError::Validation(_))
        ));
    }

    #[test]
    fn every_filter_preserves_dimensions() {
        let img = gradient(WORKING_SIZE, WORKING_SIZE);
        let mut rng = StdRng::seed_from_u64(42);
        for f in Filter::ALL {
            let out = apply_with_rng(&img, f, &mut rng);
            assert_eq!(out.dimensions(), img.dimensions(), "{}", f.name());
        }
    }

    #[test]
    fn unknown_filter_name_is_identity() {
        let img = gradient(32, 32);
        let out = apply(&img, Filter::resolve("Definitely Not A Film"));
        assert_eq!(out, img);
    }

    #[test]
    fn failing_pipeline_surfaces_error_to_try_apply() {
        let img = gradient(8, 8);
        let steps = [Step::Grayscale, Step::Saturation(f32::NAN)];
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            try_apply(&img, &steps, &mut rng),
            Err(StripError::Filter(_))
        ));
    }

    #[test]
    fn failing_pipeline_keeps_original_photo() {
        let img = gradient(8, 8);
        let steps = [Step::Grayscale, Step::Saturation(f32::NAN)];
        let out = apply_steps(&img, "broken", &steps, &mut StdRng::seed_from_u64(1));
        assert_eq!(out, img);

        let ok = apply_steps(&img, "gray", &[Step::Grayscale], &mut StdRng::seed_from_u64(1));
        assert_ne!(ok, img);
    }

    #[test]
    fn grayscale_presets_produce_neutral_pixels() {
        let img = gradient(64, 64);
        for f in [Filter::BlackWhite, Filter::DramaticNoir, Filter::HarshNoir] {
            let out = apply(&img, f);
            assert!(out.pixels().all(|p| p.0[0] == p.0[1] && p.0[1] == p.0[2]));
        }
    }

    #[test]
    fn seeded_grain_is_reproducible() {
        let img = gradient(64, 64);
        let a = apply_with_rng(&img, Filter::TriX400, &mut StdRng::seed_from_u64(9));
        let b = apply_with_rng(&img, Filter::TriX400, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
