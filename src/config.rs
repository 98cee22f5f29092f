use std::{fmt, str::FromStr};

use crate::{
    filters::Filter,
    foundation::error::{StripError, StripResult},
};

/// Opaque 8-bit sRGB color, written as `#rrggbb` (or the short `#rgb` form).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn to_pixel(self) -> image::Rgb<u8> {
        image::Rgb(self.to_array())
    }

    pub fn parse_hex(s: &str) -> StripResult<Self> {
        let hex = s.trim().trim_start_matches('#');
        let nibble = |c: u8| -> StripResult<u8> {
            (c as char)
                .to_digit(16)
                .map(|d| d as u8)
                .ok_or_else(|| StripError::validation(format!("invalid hex color '{s}'")))
        };

        let bytes = hex.as_bytes();
        match bytes.len() {
            3 => {
                let r = nibble(bytes[0])?;
                let g = nibble(bytes[1])?;
                let b = nibble(bytes[2])?;
                Ok(Self::new(r * 17, g * 17, b * 17))
            }
            6 => {
                let byte = |i: usize| -> StripResult<u8> {
                    Ok(nibble(bytes[i])? * 16 + nibble(bytes[i + 1])?)
                };
                Ok(Self::new(byte(0)?, byte(2)?, byte(4)?))
            }
            _ => Err(StripError::validation(format!(
                "hex color '{s}' must have 3 or 6 digits"
            ))),
        }
    }
}

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb8 {
    type Err = StripError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl TryFrom<String> for Rgb8 {
    type Error = StripError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&value)
    }
}

impl From<Rgb8> for String {
    fn from(value: Rgb8) -> Self {
        value.to_string()
    }
}

pub(crate) fn normalize_name(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FrameStyle {
    #[default]
    Cream,
    Black,
    FilmNoir,
    Gold,
    Rose,
    Neon,
    Custom,
}

impl FrameStyle {
    pub const ALL: [Self; 7] = [
        Self::Cream,
        Self::Black,
        Self::FilmNoir,
        Self::Gold,
        Self::Rose,
        Self::Neon,
        Self::Custom,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Cream => "Cream",
            Self::Black => "Black",
            Self::FilmNoir => "Film Noir",
            Self::Gold => "Gold",
            Self::Rose => "Rose",
            Self::Neon => "Neon",
            Self::Custom => "Custom",
        }
    }

    /// Fixed background palette. `Custom` has no palette entry of its own.
    pub fn palette_color(self) -> Option<Rgb8> {
        match self {
            Self::Cream => Some(Rgb8::new(0xF5, 0xF1, 0xE8)),
            Self::Black => Some(Rgb8::new(0x11, 0x11, 0x11)),
            Self::FilmNoir => Some(Rgb8::new(0x00, 0x00, 0x00)),
            Self::Gold => Some(Rgb8::new(0xD4, 0xAF, 0x37)),
            Self::Rose => Some(Rgb8::new(0xFF, 0xD1, 0xDC)),
            Self::Neon => Some(Rgb8::new(0x1F, 0x51, 0xFF)),
            Self::Custom => None,
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Self::Black | Self::FilmNoir)
    }
}

impl fmt::Display for FrameStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FrameStyle {
    type Err = StripError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_name(s);
        Self::ALL
            .into_iter()
            .find(|v| normalize_name(v.name()) == key)
            .ok_or_else(|| StripError::validation(format!("unknown frame style '{s}'")))
    }
}

impl TryFrom<String> for FrameStyle {
    type Error = StripError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FrameStyle> for String {
    fn from(value: FrameStyle) -> Self {
        value.name().to_string()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PatternType {
    #[default]
    None,
    Dots,
    Confetti,
    Stars,
    Lines,
}

impl PatternType {
    pub const ALL: [Self; 5] = [
        Self::None,
        Self::Dots,
        Self::Confetti,
        Self::Stars,
        Self::Lines,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Dots => "Polka Dots",
            Self::Confetti => "Confetti",
            Self::Stars => "Stars",
            Self::Lines => "Retro Lines",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::None => &["none", "off"],
            Self::Dots => &["dots", "polka"],
            Self::Confetti => &["confetti"],
            Self::Stars => &["stars", "star"],
            Self::Lines => &["lines", "stripes"],
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PatternType {
    type Err = StripError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_name(s);
        Self::ALL
            .into_iter()
            .find(|v| normalize_name(v.name()) == key || v.aliases().contains(&key.as_str()))
            .ok_or_else(|| StripError::validation(format!("unknown pattern type '{s}'")))
    }
}

impl TryFrom<String> for PatternType {
    type Error = StripError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PatternType> for String {
    fn from(value: PatternType) -> Self {
        value.name().to_string()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FontStyle {
    #[default]
    ModernSans,
    ClassicSerif,
    RetroTypewriter,
    ElegantScript,
    BoldDisplay,
    Minimal,
    Gothic,
    Playful,
}

impl FontStyle {
    pub const ALL: [Self; 8] = [
        Self::ModernSans,
        Self::ClassicSerif,
        Self::RetroTypewriter,
        Self::ElegantScript,
        Self::BoldDisplay,
        Self::Minimal,
        Self::Gothic,
        Self::Playful,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::ModernSans => "Modern Sans",
            Self::ClassicSerif => "Classic Serif",
            Self::RetroTypewriter => "Retro Typewriter",
            Self::ElegantScript => "Elegant Script",
            Self::BoldDisplay => "Bold Display",
            Self::Minimal => "Minimal",
            Self::Gothic => "Gothic",
            Self::Playful => "Playful",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::ModernSans => &["sans", "modern"],
            Self::ClassicSerif => &["serif", "classic"],
            Self::RetroTypewriter => &["typewriter", "monospace", "retromonospace"],
            Self::ElegantScript => &["script", "elegant"],
            Self::BoldDisplay => &["display", "bold"],
            Self::Minimal => &["light"],
            Self::Gothic => &["blackletter"],
            Self::Playful => &["handwritten"],
        }
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FontStyle {
    type Err = StripError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_name(s);
        Self::ALL
            .into_iter()
            .find(|v| normalize_name(v.name()) == key || v.aliases().contains(&key.as_str()))
            .ok_or_else(|| StripError::validation(format!("unknown font style '{s}'")))
    }
}

impl TryFrom<String> for FontStyle {
    type Error = StripError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FontStyle> for String {
    fn from(value: FontStyle) -> Self {
        value.name().to_string()
    }
}

pub const MIN_PATTERN_DENSITY: u8 = 1;
pub const MAX_PATTERN_DENSITY: u8 = 10;

/// Everything one composition call needs, passed by value into the compositor.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StripConfig {
    pub frame_style: FrameStyle,
    /// Background used by [`FrameStyle::Custom`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<Rgb8>,
    pub footer_text: String,
    /// `None` keeps the default text color, which dark frames switch to white.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<Rgb8>,
    pub include_date: bool,
    pub pattern: PatternType,
    pub pattern_density: u8,
    pub font_style: FontStyle,
    pub photo_count: u8,
    pub filter: Filter,
    pub mirror: bool,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            frame_style: FrameStyle::Cream,
            border_color: None,
            footer_text: "Little Vintage Photobooth".to_string(),
            text_color: None,
            include_date: false,
            pattern: PatternType::None,
            pattern_density: 5,
            font_style: FontStyle::ModernSans,
            photo_count: 3,
            filter: Filter::WarmRetro,
            mirror: true,
        }
    }
}

impl StripConfig {
    pub fn validate(&self) -> StripResult<()> {
        if !matches!(self.photo_count, 3 | 4) {
            return Err(StripError::validation(format!(
                "photo_count must be 3 or 4 (got {})",
                self.photo_count
            )));
        }
        if !(MIN_PATTERN_DENSITY..=MAX_PATTERN_DENSITY).contains(&self.pattern_density) {
            return Err(StripError::validation(format!(
                "pattern_density must be in {MIN_PATTERN_DENSITY}..={MAX_PATTERN_DENSITY} (got {})",
                self.pattern_density
            )));
        }
        Ok(())
    }

    /// Copy with out-of-range values pulled back into range.
    pub fn normalized(&self) -> Self {
        let mut out = self.clone();
        out.pattern_density = out
            .pattern_density
            .clamp(MIN_PATTERN_DENSITY, MAX_PATTERN_DENSITY);
        out
    }

    pub fn background_color(&self) -> Rgb8 {
        match self.frame_style {
            FrameStyle::Custom => self
                .border_color
                .or_else(|| FrameStyle::Cream.palette_color())
                .unwrap_or(Rgb8::WHITE),
            style => style.palette_color().unwrap_or(Rgb8::WHITE),
        }
    }

    pub fn effective_text_color(&self) -> Rgb8 {
        match self.text_color {
            Some(c) => c,
            None if self.frame_style.is_dark() => Rgb8::WHITE,
            None => DEFAULT_TEXT_COLOR,
        }
    }
}

pub const DEFAULT_TEXT_COLOR: Rgb8 = Rgb8::new(0x33, 0x33, 0x33);
