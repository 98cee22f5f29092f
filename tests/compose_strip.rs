use chrono::NaiveDate;
use image::{DynamicImage, RgbImage};
use rand::{SeedableRng, rngs::StdRng};

use photostrip::{
    Filter, FontResolver, FontResolverOptions, FontRole, FontStyle, FrameStyle, PatternType, Rgb8,
    StripConfig, StripError, StripLayout,
};

fn hermetic_fonts() -> FontResolver {
    FontResolver::new(FontResolverOptions {
        asset_dir: std::env::temp_dir().join("photostrip_it_no_assets"),
        system_fonts: false,
    })
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
}

fn photo(w: u32, h: u32, seed: u8) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, y| {
        image::Rgb([
            (x as u8).wrapping_add(seed),
            (y as u8).wrapping_mul(3),
            seed,
        ])
    }))
}

fn compose_png(photos: &[DynamicImage], cfg: &StripConfig, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let prepared = photostrip::prepare_photos(photos, cfg, &mut rng).unwrap();
    photostrip::compose_with(&prepared, cfg, &mut hermetic_fonts(), &mut rng, date()).unwrap()
}

#[test]
fn gold_polka_dot_strip_keeps_frame_color_between_photos() {
    let cfg = StripConfig {
        frame_style: FrameStyle::Gold,
        pattern: PatternType::Dots,
        pattern_density: 5,
        footer_text: "Test Strip".to_string(),
        include_date: false,
        photo_count: 3,
        ..StripConfig::default()
    };
    let photos = [photo(800, 600, 1), photo(640, 640, 2), photo(480, 720, 3)];
    let png = compose_png(&photos, &cfg, 2024);

    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!(decoded.color(), image::ColorType::Rgb8);
    let strip = decoded.to_rgb8();
    assert_eq!(strip.dimensions(), (700, 2200));
    assert_eq!(
        strip.get_pixel(350, 725).0,
        Rgb8::parse_hex("#D4AF37").unwrap().to_array()
    );
}

#[test]
fn canvas_height_follows_photo_count() {
    let cfg = StripConfig {
        filter: Filter::Original,
        footer_text: String::new(),
        ..StripConfig::default()
    };
    for (n, height) in [(3usize, 2200u32), (4, 2850), (0, 250)] {
        let photos: Vec<_> = (0..n).map(|i| photo(100, 100, i as u8)).collect();
        let strip = image::load_from_memory(&compose_png(&photos, &cfg, 1))
            .unwrap()
            .to_rgb8();
        assert_eq!(strip.dimensions(), (700, height), "{n} photos");
        assert_eq!(StripLayout::for_count(n).unwrap().height, height);
    }
}

#[test]
fn film_noir_frames_each_photo_in_white() {
    let black = DynamicImage::ImageRgb8(RgbImage::new(600, 600));
    let cfg = StripConfig {
        frame_style: FrameStyle::FilmNoir,
        filter: Filter::Original,
        mirror: false,
        ..StripConfig::default()
    };
    let photos = [black.clone(), black.clone(), black];
    let strip = image::load_from_memory(&compose_png(&photos, &cfg, 7))
        .unwrap()
        .to_rgb8();

    for (x, y) in [(52, 102), (52, 752), (647, 1402), (350, 1997)] {
        assert_eq!(strip.get_pixel(x, y).0, [255, 255, 255], "({x}, {y})");
    }
    assert_eq!(strip.get_pixel(350, 1050).0, [0, 0, 0]);
    assert_eq!(strip.get_pixel(25, 1050).0, [0, 0, 0]);
}

#[test]
fn zero_area_photo_fails_before_composition() {
    let cfg = StripConfig::default();
    let empty = RgbImage::new(0, 0);
    let err = photostrip::compose_image(
        &[empty],
        &cfg,
        &mut hermetic_fonts(),
        &mut StdRng::seed_from_u64(0),
        date(),
    )
    .unwrap_err();
    assert!(matches!(err, StripError::Validation(_)));

    let mut rng = StdRng::seed_from_u64(0);
    let err = photostrip::prepare_photos(
        &[DynamicImage::ImageRgb8(RgbImage::new(10, 0))],
        &cfg,
        &mut rng,
    )
    .unwrap_err();
    assert!(matches!(err, StripError::Validation(_)));
}

#[test]
fn seeded_compositions_are_identical() {
    let cfg = StripConfig {
        pattern: PatternType::Confetti,
        pattern_density: 9,
        filter: Filter::TriX400,
        include_date: true,
        ..StripConfig::default()
    };
    let photos = [photo(300, 200, 4), photo(200, 300, 5), photo(250, 250, 6)];
    assert_eq!(compose_png(&photos, &cfg, 99), compose_png(&photos, &cfg, 99));
}

#[test]
fn config_json_uses_display_names() {
    let cfg: StripConfig = serde_json::from_str(
        r##"{
            "frame_style": "Film Noir",
            "pattern": "polka dots",
            "font_style": "Retro Typewriter",
            "filter": "Kodak Gold",
            "text_color": "#FFAA00",
            "photo_count": 4
        }"##,
    )
    .unwrap();
    assert_eq!(cfg.frame_style, FrameStyle::FilmNoir);
    assert_eq!(cfg.pattern, PatternType::Dots);
    assert_eq!(cfg.filter, Filter::KodakGold);
    assert_eq!(cfg.effective_text_color(), Rgb8::new(0xFF, 0xAA, 0x00));
    assert_eq!(cfg.footer_text, "Little Vintage Photobooth");
    cfg.validate().unwrap();

    let bad: StripConfig = serde_json::from_str(r#"{"photo_count": 5}"#).unwrap();
    assert!(matches!(bad.validate(), Err(StripError::Validation(_))));
}

/// Copy an installed outline font into a private asset dir under a bundled name.
fn bundled_host_font(bundled_as: &str) -> Option<FontResolver> {
    let bytes = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/Library/Fonts/Arial.ttf",
        "C:/Windows/Fonts/arial.ttf",
    ]
    .iter()
    .find_map(|p| std::fs::read(p).ok())?;
    let dir = std::env::temp_dir().join(format!("photostrip_it_assets_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(bundled_as), bytes).unwrap();
    Some(FontResolver::new(FontResolverOptions {
        asset_dir: dir,
        system_fonts: false,
    }))
}

fn ink_bounds(strip: &RgbImage, bg: [u8; 3], rows: std::ops::Range<u32>) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for y in rows {
        for x in 0..strip.width() {
            if strip.get_pixel(x, y).0 == bg {
                continue;
            }
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
    }
    bounds
}

#[test]
fn outline_title_and_footer_are_centered_in_their_bands() {
    let Some(mut fonts) = bundled_host_font("CourierPrime-Regular.ttf") else {
        return;
    };
    let cfg = StripConfig {
        font_style: FontStyle::RetroTypewriter,
        pattern: PatternType::None,
        footer_text: "Test Strip".to_string(),
        include_date: false,
        ..StripConfig::default()
    };
    assert!(
        !fonts
            .resolve(cfg.font_style, FontRole::Title, 60.0)
            .is_builtin()
    );

    let strip = photostrip::compose_image(
        &[],
        &cfg,
        &mut fonts,
        &mut StdRng::seed_from_u64(3),
        date(),
    )
    .unwrap();
    assert_eq!(strip.dimensions(), (700, 250));
    let bg = cfg.background_color().to_array();

    let (x0, y0, x1, y1) = ink_bounds(&strip, bg, 0..100).unwrap();
    assert!(x1 - x0 > 250, "title spans {x0}..{x1}");
    assert!(((x0 + x1) as f32 / 2.0 - 350.0).abs() < 10.0, "title spans {x0}..{x1}");
    assert!(((y0 + y1) as f32 / 2.0 - 50.0).abs() < 12.0, "title rows {y0}..{y1}");
    assert!(y0 > 5, "title rows {y0}..{y1}");

    let (fx0, fy0, fx1, fy1) = ink_bounds(&strip, bg, 100..250).unwrap();
    assert!(fx1 - fx0 > 120, "footer spans {fx0}..{fx1}");
    assert!(((fx0 + fx1) as f32 / 2.0 - 350.0).abs() < 10.0, "footer spans {fx0}..{fx1}");
    assert!(((fy0 + fy1) as f32 / 2.0 - 150.0).abs() < 12.0, "footer rows {fy0}..{fy1}");
}
