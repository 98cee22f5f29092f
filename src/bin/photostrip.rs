use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rand::{SeedableRng, rngs::StdRng};
use sha2::Digest as _;

use photostrip::{
    Filter, FontHandle, FontResolver, FontResolverOptions, FontRole, FontStyle, FrameStyle,
    PatternType, StripConfig,
};

#[derive(Parser, Debug)]
#[command(name = "photostrip", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose a photo strip PNG from photos and a JSON config.
    Compose(ComposeArgs),
    /// Prepare and filter a single photo (preview).
    Filter(FilterArgs),
    /// List filters, frame styles, patterns and font styles.
    List,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Strip configuration JSON. Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Directory holding bundled font files.
    #[arg(long, default_value = "assets")]
    assets: PathBuf,

    /// Seed for grain and pattern placement.
    #[arg(long)]
    seed: Option<u64>,

    /// Only use bundled fonts (and the built-in face).
    #[arg(long)]
    no_system_fonts: bool,

    /// Print which font each text role resolved to (source + SHA-256 of font bytes).
    #[arg(long)]
    dump_fonts: bool,

    /// Input photos, top to bottom.
    #[arg(required = true)]
    photos: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct FilterArgs {
    /// Filter name; unknown names fall back to the original photo.
    #[arg(long, default_value = "Original")]
    filter: String,

    /// Mirror horizontally before filtering.
    #[arg(long)]
    mirror: bool,

    /// Seed for grain.
    #[arg(long)]
    seed: Option<u64>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Input photo.
    input: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Filter(args) => cmd_filter(args),
        Command::List => {
            cmd_list();
            Ok(())
        }
    }
}

fn read_config(path: Option<&Path>) -> anyhow::Result<StripConfig> {
    let Some(path) = path else {
        return Ok(StripConfig::default());
    };
    let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
    let cfg: StripConfig = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse config JSON '{}'", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

fn load_photo(path: &Path) -> anyhow::Result<image::DynamicImage> {
    image::open(path).with_context(|| format!("decode photo '{}'", path.display()))
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let cfg = read_config(args.config.as_deref())?;
    if args.photos.len() != usize::from(cfg.photo_count) {
        tracing::warn!(
            expected = cfg.photo_count,
            got = args.photos.len(),
            "photo count differs from config"
        );
    }

    let photos = args
        .photos
        .iter()
        .map(|p| load_photo(p))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut rng = make_rng(args.seed);
    let prepared = photostrip::prepare_photos(&photos, &cfg, &mut rng)?;

    let mut fonts = FontResolver::new(FontResolverOptions {
        asset_dir: args.assets.clone(),
        system_fonts: !args.no_system_fonts,
    });
    if args.dump_fonts {
        dump_font_diagnostics(&mut fonts, cfg.font_style);
    }

    let today = chrono::Local::now().date_naive();
    let png = photostrip::compose_with(&prepared, &cfg, &mut fonts, &mut rng, today)?;

    ensure_parent(&args.out)?;
    std::fs::write(&args.out, png).with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_filter(args: FilterArgs) -> anyhow::Result<()> {
    let photo = load_photo(&args.input)?;
    let filter = Filter::resolve(&args.filter);
    let prepared = photostrip::filters::prepare(&photo, args.mirror)?;
    let out = photostrip::filters::apply_with_rng(&prepared, filter, &mut make_rng(args.seed));

    ensure_parent(&args.out)?;
    out.save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {} ({filter})", args.out.display());
    Ok(())
}

fn cmd_list() {
    println!("filters:");
    for f in Filter::ALL {
        let tag = if f.is_legacy() { " (legacy)" } else { "" };
        println!("  {f}{tag}");
    }
    println!("frame styles:");
    for s in FrameStyle::ALL {
        println!("  {s}");
    }
    println!("patterns:");
    for p in PatternType::ALL {
        println!("  {p}");
    }
    println!("font styles:");
    for s in FontStyle::ALL {
        println!("  {s}");
    }
}

fn dump_font_diagnostics(fonts: &mut FontResolver, style: FontStyle) {
    eprintln!("text font diagnostics ({style}):");
    for (label, role, size) in [
        ("title", FontRole::Title, photostrip::strip::TITLE_SIZE_PX),
        ("body", FontRole::Body, photostrip::strip::FOOTER_SIZE_PX),
    ] {
        let handle = fonts.resolve(style, role, size);
        eprintln!("  {label}:");
        eprintln!("    font:   {}", handle.describe());
        if let FontHandle::Outline { font_bytes, .. } = &handle {
            eprintln!("    sha256: {}", sha256_hex(font_bytes));
        }
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}
