//! Font style → font bytes resolution with an ordered, never-failing fallback chain.
//!
//! Each [`FontStyle`] declares, per [`FontRole`], the [`FontSource`]s to try:
//! assets bundled next to the app first, then well-known platform paths, then
//! a generic family looked up through the system font database, then a
//! universal sans-serif set. When all of them miss, the built-in bitmap font
//! is used, so [`FontResolver::resolve`] always returns a usable handle.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::config::FontStyle;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontRole {
    Title,
    Body,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GenericFamily {
    SansSerif,
    Serif,
    Monospace,
    Cursive,
    Fantasy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontSource {
    /// File name inside the resolver's asset directory.
    Bundled(&'static str),
    /// Absolute platform path.
    SystemPath(&'static str),
    /// Family name looked up in the system font database.
    Named(&'static str),
    Generic(GenericFamily),
}

impl std::fmt::Display for FontSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bundled(name) => write!(f, "bundled:{name}"),
            Self::SystemPath(path) => write!(f, "path:{path}"),
            Self::Named(family) => write!(f, "family:{family}"),
            Self::Generic(g) => write!(f, "generic:{g:?}"),
        }
    }
}

/// A font ready for shaping at a fixed pixel size.
#[derive(Clone, Debug)]
pub enum FontHandle {
    Outline {
        font_bytes: Arc<Vec<u8>>,
        /// Face within `font_bytes`; non-zero only for collections.
        face_index: u32,
        family: String,
        source: FontSource,
        size_px: f32,
        role: FontRole,
    },
    /// Built-in 5x7 bitmap face, scaled to `size_px`.
    Builtin { size_px: f32, role: FontRole },
}

impl FontHandle {
    pub fn size_px(&self) -> f32 {
        match self {
            Self::Outline { size_px, .. } | Self::Builtin { size_px, .. } => *size_px,
        }
    }

    pub fn role(&self) -> FontRole {
        match self {
            Self::Outline { role, .. } | Self::Builtin { role, .. } => *role,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin { .. })
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Outline { family, source, .. } => format!("{family} ({source})"),
            Self::Builtin { .. } => "built-in bitmap".to_string(),
        }
    }
}

const UNIVERSAL_FALLBACKS: &[FontSource] = &[
    FontSource::SystemPath("C:/Windows/Fonts/arial.ttf"),
    FontSource::SystemPath("/Library/Fonts/Arial.ttf"),
    FontSource::SystemPath("/System/Library/Fonts/Helvetica.ttc"),
    FontSource::SystemPath("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
    FontSource::SystemPath("/usr/share/fonts/TTF/DejaVuSans.ttf"),
    FontSource::SystemPath("/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf"),
    FontSource::Generic(GenericFamily::SansSerif),
];

const SERIF_BODY: &[FontSource] = &[
    FontSource::Bundled("PlayfairDisplay-Bold.ttf"),
    FontSource::SystemPath("C:/Windows/Fonts/georgia.ttf"),
    FontSource::SystemPath("/System/Library/Fonts/Supplemental/Georgia.ttf"),
    FontSource::SystemPath("/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf"),
    FontSource::SystemPath("/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf"),
    FontSource::Generic(GenericFamily::Serif),
];

fn style_sources(style: FontStyle, role: FontRole) -> &'static [FontSource] {
    match (style, role) {
        (FontStyle::ModernSans, _) => &[
            FontSource::SystemPath("C:/Windows/Fonts/arial.ttf"),
            FontSource::SystemPath("/System/Library/Fonts/Helvetica.ttc"),
            FontSource::SystemPath("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
            FontSource::Named("Arial"),
            FontSource::Named("Helvetica"),
            FontSource::Generic(GenericFamily::SansSerif),
        ],
        (FontStyle::ClassicSerif, _) => SERIF_BODY,
        (FontStyle::RetroTypewriter, _) => &[
            FontSource::Bundled("CourierPrime-Regular.ttf"),
            FontSource::SystemPath("C:/Windows/Fonts/cour.ttf"),
            FontSource::SystemPath("/System/Library/Fonts/Courier.ttc"),
            FontSource::SystemPath("/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf"),
            FontSource::SystemPath("/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf"),
            FontSource::Named("Courier New"),
            FontSource::Generic(GenericFamily::Monospace),
        ],
        (FontStyle::ElegantScript, FontRole::Title) => &[
            FontSource::Bundled("GreatVibes-Regular.ttf"),
            FontSource::SystemPath("C:/Windows/Fonts/segoesc.ttf"),
            FontSource::SystemPath("/System/Library/Fonts/Supplemental/SnellRoundhand.ttc"),
            FontSource::Named("Brush Script MT"),
            FontSource::Generic(GenericFamily::Cursive),
            FontSource::Generic(GenericFamily::Serif),
        ],
        (FontStyle::ElegantScript, FontRole::Body) | (FontStyle::Gothic, FontRole::Body) => {
            SERIF_BODY
        }
        (FontStyle::BoldDisplay, _) => &[
            FontSource::Bundled("Oswald-Bold.ttf"),
            FontSource::SystemPath("C:/Windows/Fonts/impact.ttf"),
            FontSource::SystemPath("/System/Library/Fonts/Supplemental/Impact.ttf"),
            FontSource::SystemPath("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"),
            FontSource::Named("Impact"),
            FontSource::Generic(GenericFamily::SansSerif),
        ],
        (FontStyle::Minimal, _) => &[
            FontSource::Bundled("Roboto-Light.ttf"),
            FontSource::SystemPath("C:/Windows/Fonts/segoeuil.ttf"),
            FontSource::SystemPath("/usr/share/fonts/truetype/dejavu/DejaVuSans-ExtraLight.ttf"),
            FontSource::Named("Helvetica Neue"),
            FontSource::Generic(GenericFamily::SansSerif),
        ],
        (FontStyle::Gothic, FontRole::Title) => &[
            FontSource::Bundled("UnifrakturMaguntia-Book.ttf"),
            FontSource::SystemPath("C:/Windows/Fonts/OLDENGL.TTF"),
            FontSource::Named("Old English Text MT"),
            FontSource::Generic(GenericFamily::Fantasy),
            FontSource::Generic(GenericFamily::Serif),
        ],
        (FontStyle::Playful, _) => &[
            FontSource::Bundled("PatrickHand-Regular.ttf"),
            FontSource::SystemPath("C:/Windows/Fonts/comic.ttf"),
            FontSource::SystemPath("/System/Library/Fonts/Supplemental/Comic Sans MS.ttf"),
            FontSource::Named("Comic Sans MS"),
            FontSource::Generic(GenericFamily::Cursive),
            FontSource::Generic(GenericFamily::SansSerif),
        ],
    }
}

/// Full ordered candidate list for a style: style-specific sources, then the
/// universal set (duplicates removed, first occurrence wins).
pub fn candidates(style: FontStyle, role: FontRole) -> Vec<FontSource> {
    let mut out = Vec::<FontSource>::new();
    for src in style_sources(style, role).iter().chain(UNIVERSAL_FALLBACKS) {
        if !out.contains(src) {
            out.push(*src);
        }
    }
    out
}

#[derive(Clone, Debug)]
pub struct FontResolverOptions {
    /// Directory holding bundled font files.
    pub asset_dir: PathBuf,
    /// Look at platform paths and the system font database. Disabled in tests
    /// so resolution does not depend on the host.
    pub system_fonts: bool,
}

impl Default for FontResolverOptions {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("assets"),
            system_fonts: true,
        }
    }
}

/// Resolves font handles for one composition call. Nothing is cached across
/// calls; the system font database is only scanned when a generic or named
/// source is reached.
pub struct FontResolver {
    opts: FontResolverOptions,
    system_db: Option<usvg::fontdb::Database>,
}

impl Default for FontResolver {
    fn default() -> Self {
        Self::new(FontResolverOptions::default())
    }
}

impl FontResolver {
    pub fn new(opts: FontResolverOptions) -> Self {
        Self {
            opts,
            system_db: None,
        }
    }

    pub fn options(&self) -> &FontResolverOptions {
        &self.opts
    }

    /// First candidate that loads and parses wins; never fails.
    pub fn resolve(&mut self, style: FontStyle, role: FontRole, size_px: f32) -> FontHandle {
        for source in candidates(style, role) {
            match self.load(source) {
                Some(face) => {
                    let family = face.family;
                    tracing::debug!(%style, ?role, %source, %family, index = face.index, "resolved font");
                    return FontHandle::Outline {
                        font_bytes: Arc::new(face.bytes),
                        face_index: face.index,
                        family,
                        source,
                        size_px,
                        role,
                    };
                }
                None => tracing::debug!(%style, ?role, %source, "font candidate unavailable"),
            }
        }

        tracing::debug!(%style, ?role, "no outline font found, using built-in bitmap font");
        FontHandle::Builtin { size_px, role }
    }

    fn load(&mut self, source: FontSource) -> Option<LoadedFace> {
        match source {
            FontSource::Bundled(name) => {
                let path = self.opts.asset_dir.join(name);
                load_font_file(&path)
            }
            FontSource::SystemPath(path) => {
                if !self.opts.system_fonts {
                    return None;
                }
                load_font_file(Path::new(path))
            }
            FontSource::Named(family) => {
                self.query_system(usvg::fontdb::Family::Name(family))
            }
            FontSource::Generic(g) => {
                let family = match g {
                    GenericFamily::SansSerif => usvg::fontdb::Family::SansSerif,
                    GenericFamily::Serif => usvg::fontdb::Family::Serif,
                    GenericFamily::Monospace => usvg::fontdb::Family::Monospace,
                    GenericFamily::Cursive => usvg::fontdb::Family::Cursive,
                    GenericFamily::Fantasy => usvg::fontdb::Family::Fantasy,
                };
                self.query_system(family)
            }
        }
    }

    fn query_system(&mut self, family: usvg::fontdb::Family<'_>) -> Option<LoadedFace> {
        if !self.opts.system_fonts {
            return None;
        }
        let db = self.system_db.get_or_insert_with(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            assign_generic_families(&mut db);
            tracing::debug!(faces = db.len(), "loaded system font database");
            db
        });

        let families = [family];
        let query = usvg::fontdb::Query {
            families: &families,
            ..Default::default()
        };
        let id = db.query(&query)?;
        let family = db.face(id)?.families.first()?.0.clone();
        let (bytes, index) = db.with_face_data(id, |data, index| (data.to_vec(), index))?;
        Some(LoadedFace {
            bytes,
            index,
            family,
        })
    }
}

struct LoadedFace {
    bytes: Vec<u8>,
    index: u32,
    family: String,
}

/// Installed families tried, in order, for each generic family. fontdb's own
/// defaults name fonts that are usually absent outside Windows and macOS.
pub const SERIF_FAMILIES: &[&str] = &[
    "Times New Roman",
    "DejaVu Serif",
    "Liberation Serif",
    "Noto Serif",
    "FreeSerif",
    "Georgia",
];
pub const SANS_SERIF_FAMILIES: &[&str] = &[
    "Arial",
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "FreeSans",
    "Helvetica",
];
pub const MONOSPACE_FAMILIES: &[&str] = &[
    "Courier New",
    "DejaVu Sans Mono",
    "Liberation Mono",
    "Noto Sans Mono",
    "FreeMono",
];
pub const CURSIVE_FAMILIES: &[&str] = &["Comic Sans MS", "Brush Script MT", "URW Chancery L", "Z003"];
pub const FANTASY_FAMILIES: &[&str] = &["Impact", "Papyrus", "URW Bookman", "URW Bookman L"];

fn installed_family<'a>(db: &usvg::fontdb::Database, names: &[&'a str]) -> Option<&'a str> {
    names.iter().copied().find(|name| {
        db.faces()
            .any(|face| face.families.iter().any(|(family, _)| family == name))
    })
}

fn assign_generic_families(db: &mut usvg::fontdb::Database) {
    if let Some(name) = installed_family(db, SERIF_FAMILIES) {
        db.set_serif_family(name);
    }
    if let Some(name) = installed_family(db, SANS_SERIF_FAMILIES) {
        db.set_sans_serif_family(name);
    }
    if let Some(name) = installed_family(db, MONOSPACE_FAMILIES) {
        db.set_monospace_family(name);
    }
    if let Some(name) = installed_family(db, CURSIVE_FAMILIES) {
        db.set_cursive_family(name);
    }
    if let Some(name) = installed_family(db, FANTASY_FAMILIES) {
        db.set_fantasy_family(name);
    }
}

fn load_font_file(path: &Path) -> Option<LoadedFace> {
    let bytes = std::fs::read(path).ok()?;
    let family = family_name(&bytes)?;
    Some(LoadedFace {
        bytes,
        index: 0,
        family,
    })
}

/// Family name of the first face in `bytes`; `None` when the bytes do not parse as a font.
pub fn family_name(bytes: &[u8]) -> Option<String> {
    let mut db = usvg::fontdb::Database::new();
    db.load_font_data(bytes.to_vec());
    let face = db.faces().next()?;
    face.families.first().map(|(name, _)| name.clone())
}
