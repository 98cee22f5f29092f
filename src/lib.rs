#![forbid(unsafe_code)]

pub mod blur_cpu;
pub mod builtin_font;
pub mod composite_cpu;
pub mod config;
pub mod filters;
pub mod fonts;
pub mod foundation;
pub mod pattern;
pub mod strip;
pub mod text;

pub use config::{FontStyle, FrameStyle, PatternType, Rgb8, StripConfig};
pub use filters::Filter;
pub use fonts::{FontHandle, FontResolver, FontResolverOptions, FontRole, FontSource};
pub use foundation::error::{StripError, StripResult};
pub use pattern::PatternStats;
pub use strip::{StripLayout, compose, compose_image, compose_with, encode_png, prepare_photos};
