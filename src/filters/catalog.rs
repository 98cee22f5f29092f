use std::fmt;

use super::ops::Step;
use crate::config::{Rgb8, normalize_name};

/// Film-stock presets. Names are resolved once, when configuration is parsed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Filter {
    #[default]
    Original,
    Portra400,
    Velvia50,
    FadedFilm,
    TriX400,
    TealOrange,
    KodakGold,
    CrimsonPop,
    HarshNoir,
    // Historical presets, still reachable by name or substring.
    Sepia,
    BlackWhite,
    WarmRetro,
    Grain1970s,
    SoftGlow,
    CoolCinema,
    VintageRose,
    DramaticNoir,
}

const SEPIA_SHADOW: Rgb8 = Rgb8::new(0x70, 0x42, 0x14);
const SEPIA_HIGHLIGHT: Rgb8 = Rgb8::new(0xC0, 0xC0, 0x80);

const PORTRA_400: &[Step] = &[
    Step::Saturation(1.1),
    Step::Tint {
        color: Rgb8::new(255, 220, 180),
        alpha: 0.12,
    },
    Step::Contrast(1.05),
    Step::Brightness(1.03),
];
const VELVIA_50: &[Step] = &[Step::Saturation(1.6), Step::Contrast(1.15)];
const FADED_FILM: &[Step] = &[
    Step::Blur { radius: 1.0 },
    Step::Saturation(0.7),
    Step::Contrast(0.75),
    Step::Brightness(1.1),
    Step::Tint {
        color: Rgb8::new(240, 230, 210),
        alpha: 0.15,
    },
];
const TRI_X_400: &[Step] = &[
    Step::Grayscale,
    Step::Contrast(1.4),
    Step::Noise { weight: 0.12 },
];
const TEAL_ORANGE: &[Step] = &[
    Step::DuotoneBlend {
        shadow: Rgb8::new(0x0B, 0x4F, 0x5C),
        highlight: Rgb8::new(0xF4, 0xA2, 0x61),
        alpha: 0.45,
    },
    Step::Contrast(1.1),
];
const KODAK_GOLD: &[Step] = &[
    Step::Tint {
        color: Rgb8::new(255, 215, 0),
        alpha: 0.15,
    },
    Step::Contrast(1.3),
    Step::Saturation(1.1),
];
const CRIMSON_POP: &[Step] = &[
    Step::ChannelScale([1.2, 1.0, 1.0]),
    Step::Saturation(1.3),
    Step::Contrast(1.1),
];
const HARSH_NOIR: &[Step] = &[Step::Grayscale, Step::Contrast(2.0), Step::Brightness(0.9)];

const SEPIA: &[Step] = &[Step::Duotone {
    shadow: SEPIA_SHADOW,
    highlight: SEPIA_HIGHLIGHT,
}];
const BLACK_WHITE: &[Step] = &[Step::Grayscale];
const WARM_RETRO: &[Step] = &[
    Step::Saturation(1.2),
    Step::Tint {
        color: Rgb8::new(255, 200, 100),
        alpha: 0.2,
    },
];
const GRAIN_1970S: &[Step] = &[
    Step::Duotone {
        shadow: SEPIA_SHADOW,
        highlight: SEPIA_HIGHLIGHT,
    },
    Step::Contrast(0.8),
];
const SOFT_GLOW: &[Step] = &[Step::GlowBlend {
    radius: 5.0,
    alpha: 0.5,
}];
const COOL_CINEMA: &[Step] = &[
    Step::Saturation(0.6),
    Step::Tint {
        color: Rgb8::new(0, 50, 80),
        alpha: 0.2,
    },
];
const VINTAGE_ROSE: &[Step] = &[
    Step::Tint {
        color: Rgb8::new(255, 192, 203),
        alpha: 0.25,
    },
    Step::Contrast(1.1),
];
const DRAMATIC_NOIR: &[Step] = &[Step::Grayscale, Step::Contrast(1.6)];

/// Substring rules for names that predate the current catalog, checked in order.
const LEGACY_RULES: &[(&[&str], Filter)] = &[
    (&["sepia"], Filter::Sepia),
    (
        &["black & white", "black and white", "b&w", "mono"],
        Filter::BlackWhite,
    ),
    (&["grain"], Filter::Grain1970s),
    (&["glow"], Filter::SoftGlow),
    (&["cool", "cinema"], Filter::CoolCinema),
    (&["rose"], Filter::VintageRose),
    (&["dramatic", "noir"], Filter::DramaticNoir),
    (&["warm", "retro"], Filter::WarmRetro),
];

impl Filter {
    pub const ALL: [Self; 17] = [
        Self::Original,
        Self::Portra400,
        Self::Velvia50,
        Self::FadedFilm,
        Self::TriX400,
        Self::TealOrange,
        Self::KodakGold,
        Self::CrimsonPop,
        Self::HarshNoir,
        Self::Sepia,
        Self::BlackWhite,
        Self::WarmRetro,
        Self::Grain1970s,
        Self::SoftGlow,
        Self::CoolCinema,
        Self::VintageRose,
        Self::DramaticNoir,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Original => "Original",
            Self::Portra400 => "Portra 400",
            Self::Velvia50 => "Velvia 50",
            Self::FadedFilm => "Faded Film",
            Self::TriX400 => "Tri-X 400",
            Self::TealOrange => "Teal & Orange",
            Self::KodakGold => "Kodak Gold",
            Self::CrimsonPop => "Crimson Pop",
            Self::HarshNoir => "Harsh Noir",
            Self::Sepia => "Sepia",
            Self::BlackWhite => "Black & White",
            Self::WarmRetro => "Warm Retro",
            Self::Grain1970s => "1970s Grain",
            Self::SoftGlow => "Soft Glow",
            Self::CoolCinema => "Cool Cinema",
            Self::VintageRose => "Vintage Rose",
            Self::DramaticNoir => "Dramatic Noir",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Original => &["none", "identity"],
            Self::Portra400 => &["portra", "portrait"],
            Self::Velvia50 => &["velvia", "vivid"],
            Self::FadedFilm => &["faded"],
            Self::TriX400 => &["trix"],
            Self::TealOrange => &["tealorange", "duotone"],
            Self::KodakGold => &["gold", "gold200"],
            Self::CrimsonPop => &["crimson", "redboost"],
            Self::HarshNoir => &["harsh"],
            _ => &[],
        }
    }

    pub fn is_legacy(self) -> bool {
        matches!(
            self,
            Self::Sepia
                | Self::BlackWhite
                | Self::WarmRetro
                | Self::Grain1970s
                | Self::SoftGlow
                | Self::CoolCinema
                | Self::VintageRose
                | Self::DramaticNoir
        )
    }

    /// Exact catalog match, then legacy substring match, then [`Filter::Original`].
    pub fn resolve(name: &str) -> Self {
        if let Some(f) = Self::lookup(name) {
            return f;
        }

        let lower = name.trim().to_lowercase();
        for (needles, filter) in LEGACY_RULES {
            if needles.iter().any(|n| lower.contains(n)) {
                tracing::debug!(name, filter = filter.name(), "resolved legacy filter name");
                return *filter;
            }
        }

        if !lower.is_empty() {
            tracing::debug!(name, "unknown filter name, using original");
        }
        Self::Original
    }

    /// Case-insensitive exact match against names and short aliases.
    pub fn lookup(name: &str) -> Option<Self> {
        let key = normalize_name(name);
        if key.is_empty() {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|f| normalize_name(f.name()) == key || f.aliases().contains(&key.as_str()))
    }

    pub fn pipeline(self) -> &'static [Step] {
        match self {
            Self::Original => &[],
            Self::Portra400 => PORTRA_400,
            Self::Velvia50 => VELVIA_50,
            Self::FadedFilm => FADED_FILM,
            Self::TriX400 => TRI_X_400,
            Self::TealOrange => TEAL_ORANGE,
            Self::KodakGold => KODAK_GOLD,
            Self::CrimsonPop => CRIMSON_POP,
            Self::HarshNoir => HARSH_NOIR,
            Self::Sepia => SEPIA,
            Self::BlackWhite => BLACK_WHITE,
            Self::WarmRetro => WARM_RETRO,
            Self::Grain1970s => GRAIN_1970S,
            Self::SoftGlow => SOFT_GLOW,
            Self::CoolCinema => COOL_CINEMA,
            Self::VintageRose => VINTAGE_ROSE,
            Self::DramaticNoir => DRAMATIC_NOIR,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for Filter {
    fn from(value: String) -> Self {
        Self::resolve(&value)
    }
}

impl From<&str> for Filter {
    fn from(value: &str) -> Self {
        Self::resolve(value)
    }
}

impl From<Filter> for String {
    fn from(value: Filter) -> Self {
        value.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_display_name_resolves_to_itself() {
        for f in Filter::ALL {
            assert_eq!(Filter::resolve(f.name()), f, "{}", f.name());
            assert_eq!(Filter::resolve(&f.name().to_uppercase()), f);
        }
    }

    #[test]
    fn aliases_resolve_exactly() {
        assert_eq!(Filter::resolve("tri-x"), Filter::TriX400);
        assert_eq!(Filter::resolve(" Portra "), Filter::Portra400);
        assert_eq!(Filter::resolve("teal-orange"), Filter::TealOrange);
    }

    #[test]
    fn legacy_substrings_fall_through_in_order() {
        assert_eq!(Filter::resolve("Old Sepia Toner"), Filter::Sepia);
        assert_eq!(Filter::resolve("classic b&w"), Filter::BlackWhite);
        assert_eq!(Filter::resolve("Grainy 80s"), Filter::Grain1970s);
        assert_eq!(Filter::resolve("Cool Blue"), Filter::CoolCinema);
        assert_eq!(Filter::resolve("film noir deluxe"), Filter::DramaticNoir);
        assert_eq!(Filter::resolve("retro warmth"), Filter::WarmRetro);
    }

    #[test]
    fn unknown_and_empty_names_are_original() {
        assert_eq!(Filter::resolve("Lomo Fisheye"), Filter::Original);
        assert_eq!(Filter::resolve(""), Filter::Original);
        assert!(Filter::Original.pipeline().is_empty());
    }

    #[test]
    fn legacy_presets_keep_historical_constants() {
        assert_eq!(
            Filter::Sepia.pipeline(),
            &[Step::Duotone {
                shadow: Rgb8::new(0x70, 0x42, 0x14),
                highlight: Rgb8::new(0xC0, 0xC0, 0x80),
            }]
        );
        assert_eq!(
            Filter::DramaticNoir.pipeline(),
            &[Step::Grayscale, Step::Contrast(1.6)]
        );
        assert!(Filter::Sepia.is_legacy());
        assert!(!Filter::HarshNoir.is_legacy());
    }
}
