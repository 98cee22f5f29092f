use std::path::PathBuf;

use photostrip::{FrameStyle, PatternType, StripConfig};

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_photostrip")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "photostrip.exe"
            } else {
                "photostrip"
            });
            p
        })
}

fn write_photo(path: &PathBuf, w: u32, h: u32) {
    let img = image::RgbImage::from_fn(w, h, |x, y| image::Rgb([x as u8, y as u8, 128]));
    img.save(path).unwrap();
}

#[test]
fn cli_compose_writes_png() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();

    let cfg_path = dir.join("strip.json");
    let out_path = dir.join("strip.png");
    let _ = std::fs::remove_file(&out_path);

    let cfg = StripConfig {
        frame_style: FrameStyle::Rose,
        pattern: PatternType::Stars,
        photo_count: 4,
        ..StripConfig::default()
    };
    let f = std::fs::File::create(&cfg_path).unwrap();
    serde_json::to_writer_pretty(f, &cfg).unwrap();

    let photos: Vec<PathBuf> = (0..4).map(|i| dir.join(format!("photo{i}.png"))).collect();
    for p in &photos {
        write_photo(p, 320, 240);
    }

    let status = std::process::Command::new(exe())
        .args(["compose", "--seed", "7", "--no-system-fonts", "--config"])
        .arg(&cfg_path)
        .arg("--out")
        .arg(&out_path)
        .args(&photos)
        .status()
        .unwrap();

    assert!(status.success());
    let strip = image::open(&out_path).unwrap();
    assert_eq!((strip.width(), strip.height()), (700, 2850));
}

#[test]
fn cli_filter_writes_square_preview() {
    let dir = PathBuf::from("target").join("cli_smoke_filter");
    std::fs::create_dir_all(&dir).unwrap();

    let in_path = dir.join("in.png");
    let out_path = dir.join("out.png");
    let _ = std::fs::remove_file(&out_path);
    write_photo(&in_path, 300, 200);

    let status = std::process::Command::new(exe())
        .args(["filter", "--filter", "Velvia 50", "--mirror", "--out"])
        .arg(&out_path)
        .arg(&in_path)
        .status()
        .unwrap();

    assert!(status.success());
    let out = image::open(&out_path).unwrap();
    assert_eq!((out.width(), out.height()), (600, 600));
}

#[test]
fn cli_rejects_invalid_photo_count() {
    let dir = PathBuf::from("target").join("cli_smoke_invalid");
    std::fs::create_dir_all(&dir).unwrap();
    let cfg_path = dir.join("bad.json");
    std::fs::write(&cfg_path, r#"{"photo_count": 2}"#).unwrap();
    let photo = dir.join("p.png");
    write_photo(&photo, 10, 10);

    let status = std::process::Command::new(exe())
        .args(["compose", "--config"])
        .arg(&cfg_path)
        .arg("--out")
        .arg(dir.join("never.png"))
        .arg(&photo)
        .status()
        .unwrap();

    assert!(!status.success());
}
