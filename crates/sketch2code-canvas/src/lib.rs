//! Sketch canvas: a retained-mode vector surface with linear undo/redo.
//!
//! A [`DrawingSurface`] owns the live objects and their [`History`]. It renders
//! to PNG through [`Rasterizer`] and hands state to a [`FullscreenSession`] as
//! [`CanvasSnapshot`]s.

pub mod color;
pub mod drawable;
pub mod error;
pub mod history;
pub mod mirror;
pub mod raster;
pub mod snapshot;
pub mod surface;
pub mod tool;

pub use color::Color;
pub use drawable::{Bounds, CanvasObject, Drawable, ObjectId, Point};
pub use error::CanvasError;
pub use history::History;
pub use mirror::FullscreenSession;
pub use raster::{Raster, Rasterizer};
pub use snapshot::CanvasSnapshot;
pub use surface::{ChangeObserver, DrawingSurface};
pub use tool::{DEFAULT_TEXT, SurfaceProfile, Tool, ToolState};
