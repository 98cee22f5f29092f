//! Strip layout, layering and PNG encoding.
//!
//! The canvas is an opaque [`RgbImage`] holding the frame background and the
//! pasted photos. Pattern marks and text are drawn onto a transparent
//! `vello_cpu` overlay which is flattened onto the canvas before encoding.

use std::io::Cursor;

use chrono::NaiveDate;
use image::{DynamicImage, RgbImage, imageops::FilterType};
use rand::Rng;

use crate::{
    composite_cpu,
    config::{FrameStyle, PatternType, Rgb8, StripConfig},
    filters::{self, WORKING_SIZE},
    fonts::{FontRole, FontResolver},
    foundation::error::{StripError, StripResult},
    pattern,
    text::TextPainter,
};

pub const TITLE: &str = "PHOTOBOOTH";
pub const TITLE_SIZE_PX: f32 = 60.0;
pub const FOOTER_SIZE_PX: f32 = 40.0;
pub const DATE_SIZE_PX: f32 = 25.0;
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// White border added around each photo on Film Noir frames.
pub const NOIR_BORDER: u32 = 5;

/// Canvas geometry for a strip of `count` photos.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StripLayout {
    pub count: usize,
    pub width: u32,
    pub height: u32,
}

impl StripLayout {
    pub const PHOTO_SIZE: u32 = WORKING_SIZE;
    pub const PADDING: u32 = 50;
    pub const HEADER: u32 = 100;
    pub const FOOTER: u32 = 150;

    pub fn for_count(count: usize) -> StripResult<Self> {
        let n = u32::try_from(count)
            .map_err(|_| StripError::render(format!("too many photos ({count})")))?;
        let height = n
            .checked_mul(Self::PHOTO_SIZE + Self::PADDING)
            .and_then(|body| body.checked_add(Self::HEADER + Self::FOOTER))
            .ok_or_else(|| StripError::render(format!("canvas height overflows for {count} photos")))?;
        Ok(Self {
            count,
            width: Self::PHOTO_SIZE + 2 * Self::PADDING,
            height,
        })
    }

    /// Top-left corner of photo `index`.
    pub fn photo_origin(&self, index: usize) -> (u32, u32) {
        let i = index as u32;
        (
            Self::PADDING,
            Self::HEADER + i * (Self::PHOTO_SIZE + Self::PADDING),
        )
    }

    pub fn title_center(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, 50.0)
    }

    pub fn footer_center(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 - 100.0)
    }

    pub fn date_center(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 - 50.0)
    }
}

/// Normalize and filter every photo per `config`.
pub fn prepare_photos<R: Rng + ?Sized>(
    photos: &[DynamicImage],
    config: &StripConfig,
    rng: &mut R,
) -> StripResult<Vec<RgbImage>> {
    photos
        .iter()
        .map(|p| {
            let prepared = filters::prepare(p, config.mirror)?;
            Ok(filters::apply_with_rng(&prepared, config.filter, rng))
        })
        .collect()
}

/// Compose with the thread-local random source, today's local date and the
/// default font resolver.
pub fn compose(images: &[RgbImage], config: &StripConfig) -> StripResult<Vec<u8>> {
    let today = chrono::Local::now().date_naive();
    compose_with(
        images,
        config,
        &mut FontResolver::default(),
        &mut rand::rng(),
        today,
    )
}

pub fn compose_with<R: Rng + ?Sized>(
    images: &[RgbImage],
    config: &StripConfig,
    fonts: &mut FontResolver,
    rng: &mut R,
    date: NaiveDate,
) -> StripResult<Vec<u8>> {
    let strip = compose_image(images, config, fonts, rng, date)?;
    encode_png(&strip)
}

#[tracing::instrument(skip_all, fields(photos = images.len(), frame = %config.frame_style))]
pub fn compose_image<R: Rng + ?Sized>(
    images: &[RgbImage],
    config: &StripConfig,
    fonts: &mut FontResolver,
    rng: &mut R,
    date: NaiveDate,
) -> StripResult<RgbImage> {
    let config = config.normalized();
    if let Some((i, img)) = images
        .iter()
        .enumerate()
        .find(|(_, img)| img.width() == 0 || img.height() == 0)
    {
        return Err(StripError::validation(format!(
            "photo {i} has zero area ({}x{})",
            img.width(),
            img.height()
        )));
    }
    if images.len() != usize::from(config.photo_count) {
        tracing::warn!(
            expected = config.photo_count,
            got = images.len(),
            "photo count differs from configuration, sizing canvas to the photos given"
        );
    }

    let layout = StripLayout::for_count(images.len())?;
    let (w16, h16) = overlay_dims(&layout)?;

    let background = config.background_color();
    let mut canvas = RgbImage::from_pixel(layout.width, layout.height, background.to_pixel());

    for (i, img) in images.iter().enumerate() {
        let photo = fit_photo(img, config.frame_style);
        let (x, y) = layout.photo_origin(i);
        image::imageops::replace(&mut canvas, &photo, i64::from(x), i64::from(y));
    }

    let mut ctx = vello_cpu::RenderContext::new(w16, h16);
    if config.pattern != PatternType::None {
        pattern::draw(
            &mut ctx,
            layout.width,
            layout.height,
            config.pattern,
            config.pattern_density,
            rng,
        );
    }
    draw_text(&mut ctx, &layout, &config, fonts, date);

    ctx.flush();
    let mut overlay = vello_cpu::Pixmap::new(w16, h16);
    ctx.render_to_pixmap(&mut overlay);
    composite_cpu::over_rgb_in_place(&mut canvas, overlay.data_as_u8_slice())?;

    tracing::debug!(width = layout.width, height = layout.height, "strip composed");
    Ok(canvas)
}

fn overlay_dims(layout: &StripLayout) -> StripResult<(u16, u16)> {
    let w: u16 = layout
        .width
        .try_into()
        .map_err(|_| StripError::render("canvas width exceeds u16"))?;
    let h: u16 = layout
        .height
        .try_into()
        .map_err(|_| StripError::render("canvas height exceeds u16"))?;
    Ok((w, h))
}

/// Resize to the photo slot; Film Noir frames get a white border first.
fn fit_photo(img: &RgbImage, frame: FrameStyle) -> RgbImage {
    let side = StripLayout::PHOTO_SIZE;
    let sized = if img.dimensions() == (side, side) {
        img.clone()
    } else {
        image::imageops::resize(img, side, side, FilterType::CatmullRom)
    };
    if frame != FrameStyle::FilmNoir {
        return sized;
    }

    let outer = side + 2 * NOIR_BORDER;
    let mut bordered = RgbImage::from_pixel(outer, outer, Rgb8::WHITE.to_pixel());
    image::imageops::replace(
        &mut bordered,
        &sized,
        i64::from(NOIR_BORDER),
        i64::from(NOIR_BORDER),
    );
    image::imageops::resize(&bordered, side, side, FilterType::CatmullRom)
}

fn draw_text(
    ctx: &mut vello_cpu::RenderContext,
    layout: &StripLayout,
    config: &StripConfig,
    fonts: &mut FontResolver,
    date: NaiveDate,
) {
    let color = config.effective_text_color();
    let mut painter = TextPainter::new();

    let title = fonts.resolve(config.font_style, FontRole::Title, TITLE_SIZE_PX);
    painter.draw_centered(ctx, TITLE, &title, color, layout.title_center());

    let body = fonts.resolve(config.font_style, FontRole::Body, FOOTER_SIZE_PX);
    painter.draw_centered(ctx, &config.footer_text, &body, color, layout.footer_center());

    if config.include_date {
        let small = fonts.resolve(config.font_style, FontRole::Body, DATE_SIZE_PX);
        let stamp = date.format(DATE_FORMAT).to_string();
        painter.draw_centered(ctx, &stamp, &small, color, layout.date_center());
    }
}

/// Encode as an 8-bit RGB PNG.
pub fn encode_png(strip: &RgbImage) -> StripResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    strip
        .write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| StripError::encode(format!("png encode failed: {e}")))?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::fonts::FontResolverOptions;

    fn hermetic_fonts() -> FontResolver {
        FontResolver::new(FontResolverOptions {
            asset_dir: std::env::temp_dir().join("photostrip_strip_no_assets"),
            system_fonts: false,
        })
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
    }

    fn compose_test(images: &[RgbImage], config: &StripConfig) -> StripResult<RgbImage> {
        compose_image(
            images,
            config,
            &mut hermetic_fonts(),
            &mut StdRng::seed_from_u64(5),
            day(),
        )
    }

    #[test]
    fn layout_arithmetic() {
        let three = StripLayout::for_count(3).unwrap();
        assert_eq!((three.width, three.height), (700, 2200));
        assert_eq!(StripLayout::for_count(4).unwrap().height, 2850);
        assert_eq!(StripLayout::for_count(0).unwrap().height, 250);
        assert_eq!(three.photo_origin(0), (50, 100));
        assert_eq!(three.photo_origin(2), (50, 1400));
        assert_eq!(three.footer_center(), (350.0, 2100.0));
        assert_eq!(three.date_center(), (350.0, 2150.0));
    }

    #[test]
    fn oversized_canvas_is_a_render_error() {
        let layout = StripLayout::for_count(200).unwrap();
        assert!(matches!(overlay_dims(&layout), Err(StripError::Render(_))));
    }

    #[test]
    fn zero_area_photo_is_rejected() {
        let images = vec![RgbImage::new(600, 600), RgbImage::new(0, 600)];
        assert!(matches!(
            compose_test(&images, &StripConfig::default()),
            Err(StripError::Validation(_))
        ));
    }

    #[test]
    fn photos_are_pasted_into_slots() {
        let red = RgbImage::from_pixel(300, 300, image::Rgb([200, 0, 0]));
        let config = StripConfig {
            footer_text: String::new(),
            ..StripConfig::default()
        };
        let strip = compose_test(&[red.clone(), red.clone(), red], &config).unwrap();
        assert_eq!(strip.get_pixel(350, 400).0, [200, 0, 0]);
        assert_eq!(strip.get_pixel(350, 1700).0, [200, 0, 0]);
        // gap between slots shows the cream frame
        assert_eq!(strip.get_pixel(350, 725).0, [0xF5, 0xF1, 0xE8]);
        assert_eq!(strip.get_pixel(10, 400).0, [0xF5, 0xF1, 0xE8]);
    }

    #[test]
    fn film_noir_adds_white_band() {
        let black = RgbImage::from_pixel(600, 600, image::Rgb([0, 0, 0]));
        let config = StripConfig {
            frame_style: FrameStyle::FilmNoir,
            ..StripConfig::default()
        };
        let strip = compose_test(&[black.clone(), black.clone(), black], &config).unwrap();
        assert_eq!(strip.get_pixel(52, 102).0, [255, 255, 255]);
        assert_eq!(strip.get_pixel(647, 697).0, [255, 255, 255]);
        assert_eq!(strip.get_pixel(350, 400).0, [0, 0, 0]);
        assert_eq!(strip.get_pixel(20, 400).0, [0, 0, 0]);
    }

    #[test]
    fn dark_frames_burn_white_text() {
        let config = StripConfig {
            frame_style: FrameStyle::Black,
            footer_text: "IIII".to_string(),
            ..StripConfig::default()
        };
        let strip = compose_test(&[], &config).unwrap();
        assert_eq!(strip.dimensions(), (700, 250));
        assert!(strip.pixels().any(|p| p.0 == [255, 255, 255]));
        assert!(!strip.pixels().any(|p| p.0 == [0x33, 0x33, 0x33]));
    }

    #[test]
    fn date_is_drawn_only_when_requested() {
        let base = StripConfig {
            footer_text: String::new(),
            ..StripConfig::default()
        };
        let dated = StripConfig {
            include_date: true,
            ..base.clone()
        };
        let without = compose_test(&[], &base).unwrap();
        let with = compose_test(&[], &dated).unwrap();
        let band = |img: &RgbImage| {
            (185..215)
                .flat_map(|y| (0..700).map(move |x| (x, y)))
                .filter(|&(x, y)| img.get_pixel(x, y).0 != [0xF5, 0xF1, 0xE8])
                .count()
        };
        assert_eq!(band(&without), 0);
        assert!(band(&with) > 0);
    }

    #[test]
    fn png_is_rgb8() {
        let img = RgbImage::from_pixel(4, 3, image::Rgb([1, 2, 3]));
        let bytes = encode_png(&img).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
        assert_eq!(decoded.to_rgb8(), img);
    }
}
