//! Decorative marks scattered along the left and right edges of the strip.

use rand::Rng;
use vello_cpu::kurbo::{Affine, BezPath, Circle, Rect, Shape};

use crate::config::{MAX_PATTERN_DENSITY, MIN_PATTERN_DENSITY, PatternType, Rgb8};

/// Width of the band marks are pushed into.
pub const EDGE_BAND: u32 = 60;
/// Marks whose raw position is closer than this to neither edge are discarded.
pub const EDGE_KEEP: u32 = 100;
pub const MIN_MARK: u32 = 5;
pub const MAX_MARK: u32 = 15;
const FORCE_BAND_P: f64 = 0.8;

pub const PALETTE: [Rgb8; 6] = [
    Rgb8::new(0xD4, 0xAF, 0x37),
    Rgb8::new(0xB5, 0x65, 0x1D),
    Rgb8::new(0x8E, 0x3B, 0x46),
    Rgb8::new(0x6B, 0x8E, 0x23),
    Rgb8::new(0x4A, 0x6F, 0xA5),
    Rgb8::new(0xE8, 0xB4, 0xB8),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PatternStats {
    pub attempted: u32,
    pub drawn: u32,
}

/// One filled shape; every shape fits in the box `[x, x+size] x [y, y+size]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarkShape {
    Circle,
    Rect,
    Triangle,
    Cross,
    Dash,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mark {
    pub shape: MarkShape,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: Rgb8,
}

impl Mark {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.size, self.y + self.size)
    }
}

/// Surface that accepts filled marks.
pub trait MarkCanvas {
    fn fill_mark(&mut self, mark: &Mark);
}

impl MarkCanvas for vello_cpu::RenderContext {
    fn fill_mark(&mut self, mark: &Mark) {
        let Mark {
            shape,
            x,
            y,
            size,
            color,
        } = *mark;
        self.set_transform(Affine::IDENTITY);
        self.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, 255,
        ));
        match shape {
            MarkShape::Circle => {
                let r = size / 2.0;
                self.fill_path(&Circle::new((x + r, y + r), r).to_path(0.1));
            }
            MarkShape::Rect => self.fill_rect(&mark.bounds()),
            MarkShape::Triangle => {
                let mut path = BezPath::new();
                path.move_to((x + size / 2.0, y));
                path.line_to((x + size, y + size));
                path.line_to((x, y + size));
                path.close_path();
                self.fill_path(&path);
            }
            MarkShape::Cross => {
                let bar = (size / 3.0).max(1.0);
                let mid = size / 2.0;
                self.fill_rect(&Rect::new(x, y + mid - bar / 2.0, x + size, y + mid + bar / 2.0));
                self.fill_rect(&Rect::new(x + mid - bar / 2.0, y, x + mid + bar / 2.0, y + size));
            }
            MarkShape::Dash => {
                let mid = y + size / 2.0;
                self.fill_rect(&Rect::new(x, mid - 1.0, x + size, mid + 1.0));
            }
        }
    }
}

impl MarkCanvas for Vec<Mark> {
    fn fill_mark(&mut self, mark: &Mark) {
        self.push(*mark);
    }
}

pub fn attempts_for_density(density: u8) -> u32 {
    u32::from(density.clamp(MIN_PATTERN_DENSITY, MAX_PATTERN_DENSITY)) * 5 + 10
}

fn near_edge(x: u32, width: u32) -> bool {
    x < EDGE_KEEP || x > width.saturating_sub(EDGE_KEEP)
}

/// Scatter `pattern` marks over a `width` x `height` canvas.
pub fn draw<C, R>(
    canvas: &mut C,
    width: u32,
    height: u32,
    pattern: PatternType,
    density: u8,
    rng: &mut R,
) -> PatternStats
where
    C: MarkCanvas + ?Sized,
    R: Rng + ?Sized,
{
    if pattern == PatternType::None || width == 0 || height == 0 {
        return PatternStats::default();
    }

    let mut stats = PatternStats {
        attempted: attempts_for_density(density),
        drawn: 0,
    };
    for _ in 0..stats.attempted {
        let mut x = rng.random_range(0..width);
        let y = rng.random_range(0..height);
        if rng.random_bool(FORCE_BAND_P) {
            x = if rng.random_bool(0.5) {
                rng.random_range(0..=EDGE_BAND.min(width - 1))
            } else {
                rng.random_range(width.saturating_sub(EDGE_BAND)..width)
            };
        } else if !near_edge(x, width) {
            continue;
        }

        let shape = match pattern {
            PatternType::None => continue,
            PatternType::Dots => MarkShape::Circle,
            PatternType::Confetti => {
                if rng.random_bool(0.5) {
                    MarkShape::Rect
                } else {
                    MarkShape::Triangle
                }
            }
            PatternType::Stars => MarkShape::Cross,
            PatternType::Lines => {
                if !near_edge(x, width) {
                    continue;
                }
                MarkShape::Dash
            }
        };
        let color = PALETTE[rng.random_range(0..PALETTE.len())];
        let size = rng.random_range(MIN_MARK..=MAX_MARK);

        canvas.fill_mark(&Mark {
            shape,
            x: f64::from(x),
            y: f64::from(y),
            size: f64::from(size),
            color,
        });
        stats.drawn += 1;
    }

    tracing::debug!(?pattern, density, attempted = stats.attempted, drawn = stats.drawn, "pattern drawn");
    stats
}
