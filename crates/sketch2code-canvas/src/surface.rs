//! The drawing surface: live objects, tool state and snapshot history.
//!
//! Every edit funnels through [`DrawingSurface::record_mutation`], which is the
//! only writer into [`History`]. Paths that repopulate the live collection
//! programmatically (undo, redo, clear, import) hold a [`SuppressGuard`] so the
//! repopulation is never recorded as an edit of its own.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::color::Color;
use crate::drawable::{CanvasObject, Drawable, ObjectId, Point};
use crate::error::CanvasError;
use crate::history::History;
use crate::raster::{Raster, Rasterizer};
use crate::snapshot::CanvasSnapshot;
use crate::tool::{SurfaceProfile, Tool, ToolState};

/// Receives the current raster after each recorded change, undo, redo and clear.
pub type ChangeObserver = Box<dyn FnMut(&Raster)>;

/// Scoped suppression of history capture. Nesting is allowed; recording resumes
/// when the last guard drops, including when the guarded code panics.
struct SuppressGuard {
    depth: Rc<Cell<usize>>,
}

impl SuppressGuard {
    fn acquire(depth: &Rc<Cell<usize>>) -> Self {
        depth.set(depth.get() + 1);
        Self {
            depth: Rc::clone(depth),
        }
    }
}

impl Drop for SuppressGuard {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

pub struct DrawingSurface {
    profile: SurfaceProfile,
    background: Color,
    objects: Vec<CanvasObject>,
    next_id: u64,
    history: History,
    tool: ToolState,
    selected: Option<ObjectId>,
    pending_stroke: Option<Vec<Point>>,
    suppress_depth: Rc<Cell<usize>>,
    rasterizer: Rasterizer,
    observer: Option<ChangeObserver>,
}

impl DrawingSurface {
    /// A blank surface whose history holds the empty canvas.
    pub fn new(profile: SurfaceProfile) -> Self {
        let initial = CanvasSnapshot::empty(profile.background);
        Self::from_snapshot(profile, initial)
    }

    /// A surface seeded with `snapshot`, which becomes the first history entry.
    pub fn from_snapshot(profile: SurfaceProfile, snapshot: CanvasSnapshot) -> Self {
        let tool = profile.tool_state(Tool::default());
        let mut surface = Self {
            background: snapshot.background,
            objects: Vec::new(),
            next_id: 0,
            history: History::new(),
            tool,
            selected: None,
            pending_stroke: None,
            suppress_depth: Rc::new(Cell::new(0)),
            rasterizer: Rasterizer::new(),
            observer: None,
            profile,
        };
        surface.restore(&snapshot);
        surface.history = History::with_initial(snapshot);
        surface
    }

    pub fn with_rasterizer(mut self, rasterizer: Rasterizer) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    pub fn on_change(&mut self, observer: impl FnMut(&Raster) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    // --- Tool state ---

    /// Switch tools. Shape and text tools place their default object and select
    /// it; freehand tools just arm the brush.
    pub fn set_tool(&mut self, tool: Tool) -> Option<ObjectId> {
        self.tool = self.profile.tool_state(tool);
        self.pending_stroke = None;
        self.selected = None;
        let shape = self.profile.default_shape(tool)?;
        let id = self.insert(shape);
        self.selected = Some(id);
        debug!(tool = %tool, id = %id, "Placed default shape");
        Some(id)
    }

    /// Brush color for strokes drawn from now on.
    pub fn set_brush_color(&mut self, color: Color) {
        self.tool.brush_color = color;
    }

    pub fn set_brush_width(&mut self, width: f32) {
        self.tool.brush_width = width.max(0.0);
    }

    // --- Freehand strokes ---

    pub fn begin_stroke(&mut self, at: Point) -> bool {
        if !self.tool.tool.is_freehand() {
            return false;
        }
        self.pending_stroke = Some(vec![at]);
        true
    }

    pub fn extend_stroke(&mut self, to: Point) {
        if let Some(points) = self.pending_stroke.as_mut() {
            points.push(to);
        }
    }

    /// Commit the stroke in progress as a single object.
    pub fn end_stroke(&mut self) -> Option<ObjectId> {
        let points = self.pending_stroke.take()?;
        let id = self.insert(Drawable::Stroke {
            points,
            color: self.tool.brush_color,
            width: self.tool.brush_width,
        });
        Some(id)
    }

    // --- Selection and edits ---

    pub fn select(&mut self, id: ObjectId) -> bool {
        let found = self.objects.iter().any(|o| o.id == id);
        self.selected = found.then_some(id);
        found
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn move_selected(&mut self, dx: f32, dy: f32) -> bool {
        let Some(drawable) = self.selected_mut() else {
            return false;
        };
        drawable.translate(dx, dy);
        self.record_mutation();
        true
    }

    pub fn scale_selected(&mut self, sx: f32, sy: f32) -> bool {
        let Some(drawable) = self.selected_mut() else {
            return false;
        };
        drawable.scale(sx, sy);
        self.record_mutation();
        true
    }

    /// Replace the content of the selected text object.
    pub fn set_selected_text(&mut self, text: &str) -> bool {
        match self.selected_mut() {
            Some(Drawable::Text { content, .. }) => *content = text.to_string(),
            _ => return false,
        }
        self.record_mutation();
        true
    }

    pub fn remove_selected(&mut self) -> Option<CanvasObject> {
        let id = self.selected.take()?;
        let index = self.objects.iter().position(|o| o.id == id)?;
        let removed = self.objects.remove(index);
        self.record_mutation();
        Some(removed)
    }

    fn selected_mut(&mut self) -> Option<&mut Drawable> {
        let id = self.selected?;
        self.objects
            .iter_mut()
            .find(|o| o.id == id)
            .map(|o| &mut o.drawable)
    }

    fn insert(&mut self, drawable: Drawable) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.push(CanvasObject { id, drawable });
        self.record_mutation();
        id
    }

    // --- History ---

    /// Capture the live collection as a new history entry and notify the
    /// observer. Returns `false` while recording is suppressed.
    pub fn record_mutation(&mut self) -> bool {
        if self.suppress_depth.get() > 0 {
            trace!("History capture suppressed");
            return false;
        }
        let snapshot = self.export_snapshot();
        self.history.push(snapshot);
        debug!(
            cursor = self.history.cursor(),
            entries = self.history.len(),
            "Recorded canvas mutation"
        );
        self.emit();
        true
    }

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(&snapshot);
        debug!(cursor = self.history.cursor(), "Undo");
        self.emit();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(&snapshot);
        debug!(cursor = self.history.cursor(), "Redo");
        self.emit();
        true
    }

    /// Empty the canvas and restart history from the blank state.
    pub fn clear(&mut self) {
        {
            let _guard = SuppressGuard::acquire(&self.suppress_depth);
            self.objects.clear();
            self.selected = None;
            self.pending_stroke = None;
            self.background = self.profile.background;
            self.history
                .reset(CanvasSnapshot::empty(self.profile.background));
        }
        debug!("Cleared canvas");
        self.emit();
    }

    // --- Export / import ---

    pub fn export_snapshot(&self) -> CanvasSnapshot {
        CanvasSnapshot {
            background: self.background,
            objects: self.objects.clone(),
        }
    }

    /// Replace the live collection with `snapshot` without touching history.
    pub fn import_snapshot(&mut self, snapshot: &CanvasSnapshot) {
        self.restore(snapshot);
        debug!(objects = self.objects.len(), "Imported snapshot");
    }

    pub fn export_raster(&self) -> Result<Raster, CanvasError> {
        self.rasterizer.rasterize(
            &self.export_snapshot(),
            self.profile.width,
            self.profile.height,
        )
    }

    fn restore(&mut self, snapshot: &CanvasSnapshot) {
        let _guard = SuppressGuard::acquire(&self.suppress_depth);
        self.load(snapshot);
    }

    /// Repopulate through the normal insert path; callers hold the guard.
    fn load(&mut self, snapshot: &CanvasSnapshot) {
        self.objects.clear();
        self.pending_stroke = None;
        self.background = snapshot.background;
        for object in &snapshot.objects {
            self.objects.push(object.clone());
            self.record_mutation();
        }
        self.next_id = self.next_id.max(snapshot.next_id().0);
        if let Some(id) = self.selected {
            if snapshot.get(id).is_none() {
                self.selected = None;
            }
        }
    }

    fn emit(&mut self) {
        if self.observer.is_none() {
            return;
        }
        let raster = match self.export_raster() {
            Ok(raster) => raster,
            Err(e) => {
                warn!(error = %e, "Failed to rasterize canvas for observer");
                return;
            }
        };
        if let Some(observer) = self.observer.as_mut() {
            observer(&raster);
        }
    }

    // --- Accessors ---

    pub fn objects(&self) -> &[CanvasObject] {
        &self.objects
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn active_tool(&self) -> &ToolState {
        &self.tool
    }

    pub fn selected(&self) -> Option<ObjectId> {
        self.selected
    }

    pub fn profile(&self) -> &SurfaceProfile {
        &self.profile
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn rasterizer(&self) -> &Rasterizer {
        &self.rasterizer
    }

    pub fn is_recording(&self) -> bool {
        self.suppress_depth.get() == 0
    }
}
