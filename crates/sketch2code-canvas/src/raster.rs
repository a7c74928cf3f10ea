//! Rasterize snapshots to PNG.

use std::io::Cursor;
use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage, imageops};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut, draw_line_segment_mut,
    draw_text_mut,
};
use imageproc::rect::Rect;
use tracing::debug;

use sketch2code_core::types::DataUri;

use crate::color::Color;
use crate::drawable::{Drawable, Point};
use crate::error::CanvasError;
use crate::snapshot::CanvasSnapshot;

/// A lossless PNG rendering of a canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl Raster {
    pub fn to_data_uri(&self) -> DataUri {
        DataUri::from_bytes("image/png", &self.png)
    }
}

/// Paints snapshots onto an RGBA buffer. Text needs a font; without one, text
/// objects are left out of the image.
#[derive(Clone, Default)]
pub struct Rasterizer {
    font: Option<FontArc>,
}

impl Rasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(font: FontArc) -> Self {
        Self { font: Some(font) }
    }

    pub fn from_font_file(path: &Path) -> Result<Self, CanvasError> {
        let bytes = std::fs::read(path)?;
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| CanvasError::Font(format!("{}: {e}", path.display())))?;
        Ok(Self::with_font(font))
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn render(
        &self,
        snapshot: &CanvasSnapshot,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, CanvasError> {
        if width == 0 || height == 0 {
            return Err(CanvasError::EmptyCanvas);
        }
        let mut img = RgbaImage::from_pixel(width, height, snapshot.background.to_rgba());
        for object in &snapshot.objects {
            self.paint(&mut img, &object.drawable);
        }
        Ok(img)
    }

    pub fn rasterize(
        &self,
        snapshot: &CanvasSnapshot,
        width: u32,
        height: u32,
    ) -> Result<Raster, CanvasError> {
        let img = self.render(snapshot, width, height)?;
        let mut png = Vec::new();
        DynamicImage::ImageRgba8(img).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(Raster { width, height, png })
    }

    /// Opaque paint goes straight onto the image. Anything partly see-through
    /// is drawn on a clear layer first and composited over what is beneath.
    fn paint(&self, img: &mut RgbaImage, drawable: &Drawable) {
        if !is_translucent(drawable) {
            self.paint_direct(img, drawable);
            return;
        }
        let mut layer = RgbaImage::new(img.width(), img.height());
        self.paint_direct(&mut layer, drawable);
        imageops::overlay(img, &layer, 0, 0);
    }

    fn paint_direct(&self, img: &mut RgbaImage, drawable: &Drawable) {
        match drawable {
            Drawable::Stroke {
                points,
                color,
                width,
            } => paint_stroke(img, points, *color, *width),
            Drawable::Rectangle {
                left,
                top,
                width,
                height,
                stroke,
                fill,
                stroke_width,
            } => {
                if let Some(fill) = fill.filter(|c| !c.is_transparent()) {
                    fill_rect(img, *left, *top, *width, *height, fill.to_rgba());
                }
                if !stroke.is_transparent() && *stroke_width > 0.0 {
                    let c = stroke.to_rgba();
                    let w = *stroke_width;
                    let half = w / 2.0;
                    let (l, t) = (left - half, top - half);
                    fill_rect(img, l, t, width + w, w, c);
                    fill_rect(img, l, top + height - half, width + w, w, c);
                    fill_rect(img, l, t, w, height + w, c);
                    fill_rect(img, left + width - half, t, w, height + w, c);
                }
            }
            Drawable::Circle {
                left,
                top,
                radius,
                stroke,
                fill,
                stroke_width,
            } => {
                let center = ((left + radius).round() as i32, (top + radius).round() as i32);
                if let Some(fill) = fill.filter(|c| !c.is_transparent()) {
                    draw_filled_circle_mut(img, center, radius.round() as i32, fill.to_rgba());
                }
                if !stroke.is_transparent() && *stroke_width > 0.0 {
                    let outer = (radius + stroke_width / 2.0).round() as i32;
                    let rings = stroke_width.round().max(1.0) as i32;
                    for k in 0..rings {
                        let r = outer - k;
                        if r <= 0 {
                            break;
                        }
                        draw_hollow_circle_mut(img, center, r, stroke.to_rgba());
                    }
                }
            }
            Drawable::Text {
                left,
                top,
                content,
                font_size,
                fill,
            } => match &self.font {
                Some(font) if !fill.is_transparent() => {
                    draw_text_mut(
                        img,
                        fill.to_rgba(),
                        left.round() as i32,
                        top.round() as i32,
                        PxScale::from(*font_size),
                        font,
                        content,
                    );
                }
                Some(_) => {}
                None => debug!(content = %content, "No font configured, text left out of raster"),
            },
        }
    }
}

fn is_translucent(drawable: &Drawable) -> bool {
    let partial = |c: &Color| c.a != 0 && c.a != 255;
    match drawable {
        Drawable::Stroke { color, .. } => partial(color),
        Drawable::Rectangle { stroke, fill, .. } | Drawable::Circle { stroke, fill, .. } => {
            partial(stroke) || fill.as_ref().is_some_and(partial)
        }
        Drawable::Text { fill, .. } => partial(fill),
    }
}

fn fill_rect(img: &mut RgbaImage, left: f32, top: f32, width: f32, height: f32, color: Rgba<u8>) {
    let w = width.round();
    let h = height.round();
    if w < 1.0 || h < 1.0 {
        return;
    }
    let rect = Rect::at(left.round() as i32, top.round() as i32).of_size(w as u32, h as u32);
    draw_filled_rect_mut(img, rect, color);
}

/// Strokes are stamped as round dabs along each segment; hairlines use a plain line.
fn paint_stroke(img: &mut RgbaImage, points: &[Point], color: Color, width: f32) {
    if color.is_transparent() || points.is_empty() {
        return;
    }
    let c = color.to_rgba();
    let radius = width / 2.0;

    if width <= 1.5 {
        if let [only] = points {
            draw_filled_circle_mut(img, (only.x.round() as i32, only.y.round() as i32), 0, c);
        }
        for pair in points.windows(2) {
            draw_line_segment_mut(img, (pair[0].x, pair[0].y), (pair[1].x, pair[1].y), c);
        }
        return;
    }

    let r = radius.round() as i32;
    let dab = |img: &mut RgbaImage, p: Point| {
        draw_filled_circle_mut(img, (p.x.round() as i32, p.y.round() as i32), r, c);
    };

    dab(img, points[0]);
    let spacing = (radius * 0.5).max(0.5);
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let dist = ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt();
        let steps = (dist / spacing).ceil().max(1.0) as usize;
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            dab(img, Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawable::{CanvasObject, ObjectId};

    fn snapshot_with(drawable: Drawable) -> CanvasSnapshot {
        CanvasSnapshot {
            background: Color::WHITE,
            objects: vec![CanvasObject {
                id: ObjectId(0),
                drawable,
            }],
        }
    }

    #[test]
    fn test_empty_canvas_is_background() {
        let img = Rasterizer::new()
            .render(&CanvasSnapshot::empty(Color::rgb(10, 20, 30)), 8, 4)
            .unwrap();
        assert!(img.pixels().all(|p| *p == Rgba([10, 20, 30, 255])));
    }

    #[test]
    fn test_rectangle_outline_not_filled() {
        let img = Rasterizer::new()
            .render(
                &snapshot_with(Drawable::Rectangle {
                    left: 10.0,
                    top: 10.0,
                    width: 40.0,
                    height: 20.0,
                    stroke: Color::BLACK,
                    fill: None,
                    stroke_width: 2.0,
                }),
                64,
                64,
            )
            .unwrap();
        assert_eq!(*img.get_pixel(10, 10), Rgba([0, 0, 0, 255]));
        assert_eq!(*img.get_pixel(50, 30), Rgba([0, 0, 0, 255]));
        assert_eq!(*img.get_pixel(30, 20), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_thick_stroke_covers_path() {
        let img = Rasterizer::new()
            .render(
                &snapshot_with(Drawable::Stroke {
                    points: vec![Point::new(5.0, 16.0), Point::new(27.0, 16.0)],
                    color: Color::rgb(255, 0, 0),
                    width: 6.0,
                }),
                32,
                32,
            )
            .unwrap();
        for x in 5..=27 {
            assert_eq!(*img.get_pixel(x, 16), Rgba([255, 0, 0, 255]), "gap at x={x}");
        }
        assert_eq!(*img.get_pixel(16, 2), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_translucent_stroke_blends_over_background() {
        let img = Rasterizer::new()
            .render(
                &snapshot_with(Drawable::Stroke {
                    points: vec![Point::new(5.0, 16.0), Point::new(27.0, 16.0)],
                    color: Color { r: 255, g: 0, b: 0, a: 128 },
                    width: 6.0,
                }),
                32,
                32,
            )
            .unwrap();
        let Rgba([r, g, b, a]) = *img.get_pixel(16, 16);
        assert_eq!(a, 255);
        assert_eq!(r, 255);
        assert!((120..=135).contains(&g), "g = {g}");
        assert_eq!(g, b);
        assert!(img.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn test_translucent_fill_keeps_shape_beneath() {
        let snapshot = CanvasSnapshot {
            background: Color::WHITE,
            objects: vec![
                CanvasObject {
                    id: ObjectId(0),
                    drawable: Drawable::Rectangle {
                        left: 0.0,
                        top: 0.0,
                        width: 16.0,
                        height: 16.0,
                        stroke: Color::TRANSPARENT,
                        fill: Some(Color::BLACK),
                        stroke_width: 0.0,
                    },
                },
                CanvasObject {
                    id: ObjectId(1),
                    drawable: Drawable::Rectangle {
                        left: 0.0,
                        top: 0.0,
                        width: 16.0,
                        height: 16.0,
                        stroke: Color::TRANSPARENT,
                        fill: Some(Color { r: 255, g: 255, b: 255, a: 128 }),
                        stroke_width: 0.0,
                    },
                },
            ],
        };
        let img = Rasterizer::new().render(&snapshot, 16, 16).unwrap();
        let Rgba([r, _, _, a]) = *img.get_pixel(8, 8);
        assert_eq!(a, 255);
        assert!((120..=135).contains(&r), "r = {r}");
    }

    #[test]
    fn test_filled_circle_centre() {
        let img = Rasterizer::new()
            .render(
                &snapshot_with(Drawable::Circle {
                    left: 0.0,
                    top: 0.0,
                    radius: 10.0,
                    stroke: Color::BLACK,
                    fill: Some(Color::rgb(0, 0, 255)),
                    stroke_width: 1.0,
                }),
                24,
                24,
            )
            .unwrap();
        assert_eq!(*img.get_pixel(10, 10), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_text_without_font_is_skipped() {
        let img = Rasterizer::new()
            .render(
                &snapshot_with(Drawable::Text {
                    left: 0.0,
                    top: 0.0,
                    content: "Hello".into(),
                    font_size: 12.0,
                    fill: Color::BLACK,
                }),
                16,
                16,
            )
            .unwrap();
        assert!(img.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn test_rasterize_produces_png_data_uri() {
        let raster = Rasterizer::new()
            .rasterize(&CanvasSnapshot::empty(Color::WHITE), 20, 10)
            .unwrap();
        assert_eq!(&raster.png[..8], b"\x89PNG\r\n\x1a\n");
        let uri = raster.to_data_uri();
        assert_eq!(uri.mime_type(), "image/png");
        assert_eq!(uri.decode().unwrap(), raster.png);

        let decoded = image::load_from_memory(&raster.png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (20, 10));
    }

    #[test]
    fn test_zero_size_rejected() {
        let err = Rasterizer::new()
            .render(&CanvasSnapshot::empty(Color::WHITE), 0, 10)
            .unwrap_err();
        assert!(matches!(err, CanvasError::EmptyCanvas));
    }

    #[test]
    fn test_missing_font_file() {
        let err = Rasterizer::from_font_file(Path::new("/nonexistent/font.ttf")).err();
        assert!(matches!(err, Some(CanvasError::Io(_))));
    }
}
