//! Drawing tools and per-surface tool defaults.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::drawable::Drawable;

pub const DEFAULT_TEXT: &str = "Double click to edit";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    #[default]
    Pencil,
    Eraser,
    Rectangle,
    Circle,
    Text,
}

impl Tool {
    pub const ALL: [Tool; 5] = [
        Tool::Pencil,
        Tool::Eraser,
        Tool::Rectangle,
        Tool::Circle,
        Tool::Text,
    ];

    /// Freehand tools draw strokes; the rest place a shape.
    pub fn is_freehand(&self) -> bool {
        matches!(self, Tool::Pencil | Tool::Eraser)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::Pencil => "pencil",
            Tool::Eraser => "eraser",
            Tool::Rectangle => "rectangle",
            Tool::Circle => "circle",
            Tool::Text => "text",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown tool: {s}"))
    }
}

/// The active tool plus the brush it draws with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolState {
    pub tool: Tool,
    pub brush_color: Color,
    pub brush_width: f32,
}

/// Tool defaults for one surface. The primary canvas and the fullscreen
/// canvas place shapes differently and draw with different widths.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceProfile {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub ink: Color,
    pub pencil_width: f32,
    pub eraser_width: f32,
    pub shape_stroke_width: f32,
    pub rect_size: (f32, f32),
    pub rect_origin: (f32, f32),
    pub circle_radius: f32,
    pub circle_origin: (f32, f32),
    pub text_size: f32,
    pub text_origin: (f32, f32),
}

impl SurfaceProfile {
    /// The embedded 600x400 sketch canvas.
    pub fn standard() -> Self {
        Self {
            width: 600,
            height: 400,
            background: Color::WHITE,
            ink: Color::BLACK,
            pencil_width: 2.0,
            eraser_width: 20.0,
            shape_stroke_width: 2.0,
            rect_size: (150.0, 100.0),
            rect_origin: (100.0, 100.0),
            circle_radius: 50.0,
            circle_origin: (100.0, 100.0),
            text_size: 20.0,
            text_origin: (100.0, 100.0),
        }
    }

    /// A viewport-sized canvas with shapes placed around the centre.
    pub fn viewport(width: u32, height: u32) -> Self {
        let cx = width as f32 / 2.0;
        let cy = height as f32 / 2.0;
        Self {
            width,
            height,
            background: Color::WHITE,
            ink: Color::BLACK,
            pencil_width: 3.0,
            eraser_width: 30.0,
            shape_stroke_width: 3.0,
            rect_size: (200.0, 150.0),
            rect_origin: (cx - 100.0, cy - 75.0),
            circle_radius: 75.0,
            circle_origin: (cx - 75.0, cy - 75.0),
            text_size: 28.0,
            text_origin: (cx - 100.0, cy - 20.0),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    /// Brush for a tool. The eraser paints with the background color.
    pub fn tool_state(&self, tool: Tool) -> ToolState {
        let (brush_color, brush_width) = match tool {
            Tool::Eraser => (self.background, self.eraser_width),
            Tool::Pencil => (self.ink, self.pencil_width),
            Tool::Rectangle | Tool::Circle | Tool::Text => (self.ink, self.shape_stroke_width),
        };
        ToolState {
            tool,
            brush_color,
            brush_width,
        }
    }

    /// The object a shape tool places when selected.
    pub fn default_shape(&self, tool: Tool) -> Option<Drawable> {
        match tool {
            Tool::Rectangle => Some(Drawable::Rectangle {
                left: self.rect_origin.0,
                top: self.rect_origin.1,
                width: self.rect_size.0,
                height: self.rect_size.1,
                stroke: self.ink,
                fill: None,
                stroke_width: self.shape_stroke_width,
            }),
            Tool::Circle => Some(Drawable::Circle {
                left: self.circle_origin.0,
                top: self.circle_origin.1,
                radius: self.circle_radius,
                stroke: self.ink,
                fill: None,
                stroke_width: self.shape_stroke_width,
            }),
            Tool::Text => Some(Drawable::Text {
                left: self.text_origin.0,
                top: self.text_origin.1,
                content: DEFAULT_TEXT.to_string(),
                font_size: self.text_size,
                fill: self.ink,
            }),
            Tool::Pencil | Tool::Eraser => None,
        }
    }
}

impl Default for SurfaceProfile {
    fn default() -> Self {
        Self::standard()
    }
}
