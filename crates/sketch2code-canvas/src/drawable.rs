//! Drawable objects placed on a sketch.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right() && p.y >= self.top && p.y <= self.bottom()
    }
}

/// Stable identity of an object within a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj-{}", self.0)
    }
}

/// The shapes a sketch can contain. Rendering and serialization dispatch on the tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Drawable {
    /// Freehand polyline drawn with the pencil or eraser.
    Stroke {
        points: Vec<Point>,
        color: Color,
        width: f32,
    },
    Rectangle {
        left: f32,
        top: f32,
        width: f32,
        height: f32,
        stroke: Color,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fill: Option<Color>,
        stroke_width: f32,
    },
    /// Circle positioned by the top-left corner of its bounding box.
    Circle {
        left: f32,
        top: f32,
        radius: f32,
        stroke: Color,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fill: Option<Color>,
        stroke_width: f32,
    },
    Text {
        left: f32,
        top: f32,
        content: String,
        font_size: f32,
        fill: Color,
    },
}

impl Drawable {
    pub fn kind(&self) -> &'static str {
        match self {
            Drawable::Stroke { .. } => "stroke",
            Drawable::Rectangle { .. } => "rectangle",
            Drawable::Circle { .. } => "circle",
            Drawable::Text { .. } => "text",
        }
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        match self {
            Drawable::Stroke { points, .. } => {
                for p in points.iter_mut() {
                    p.x += dx;
                    p.y += dy;
                }
            }
            Drawable::Rectangle { left, top, .. }
            | Drawable::Circle { left, top, .. }
            | Drawable::Text { left, top, .. } => {
                *left += dx;
                *top += dy;
            }
        }
    }

    /// Scale about the object's top-left corner. Circles and text scale uniformly
    /// by the larger factor.
    pub fn scale(&mut self, sx: f32, sy: f32) {
        let sx = sx.max(0.0);
        let sy = sy.max(0.0);
        match self {
            Drawable::Stroke { points, .. } => {
                let origin = top_left(points);
                for p in points.iter_mut() {
                    p.x = origin.x + (p.x - origin.x) * sx;
                    p.y = origin.y + (p.y - origin.y) * sy;
                }
            }
            Drawable::Rectangle { width, height, .. } => {
                *width *= sx;
                *height *= sy;
            }
            Drawable::Circle { radius, .. } => *radius *= sx.max(sy),
            Drawable::Text { font_size, .. } => *font_size *= sx.max(sy),
        }
    }

    pub fn bounds(&self) -> Bounds {
        match self {
            Drawable::Stroke { points, width, .. } => {
                if points.is_empty() {
                    return Bounds::default();
                }
                let half = width / 2.0;
                let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
                let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
                for p in points {
                    min_x = min_x.min(p.x);
                    min_y = min_y.min(p.y);
                    max_x = max_x.max(p.x);
                    max_y = max_y.max(p.y);
                }
                Bounds {
                    left: min_x - half,
                    top: min_y - half,
                    width: max_x - min_x + width,
                    height: max_y - min_y + width,
                }
            }
            Drawable::Rectangle {
                left,
                top,
                width,
                height,
                ..
            } => Bounds {
                left: *left,
                top: *top,
                width: *width,
                height: *height,
            },
            Drawable::Circle {
                left, top, radius, ..
            } => Bounds {
                left: *left,
                top: *top,
                width: radius * 2.0,
                height: radius * 2.0,
            },
            Drawable::Text {
                left,
                top,
                content,
                font_size,
                ..
            } => Bounds {
                left: *left,
                top: *top,
                // Rough advance estimate; exact metrics depend on the font.
                width: content.chars().count() as f32 * font_size * 0.6,
                height: *font_size,
            },
        }
    }
}

fn top_left(points: &[Point]) -> Point {
    points.iter().fold(
        Point::new(f32::MAX, f32::MAX),
        |acc, p| Point::new(acc.x.min(p.x), acc.y.min(p.y)),
    )
}

/// A drawable with its identity on the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasObject {
    pub id: ObjectId,
    #[serde(flatten)]
    pub drawable: Drawable,
}
