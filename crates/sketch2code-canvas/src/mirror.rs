//! Fullscreen editing session mirrored from a primary surface.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::surface::DrawingSurface;
use crate::tool::SurfaceProfile;

/// A viewport-sized surface seeded from the primary one.
///
/// The session holds the primary mutably for its whole lifetime, so the primary
/// cannot receive edits while the mirror is live. [`save`](Self::save) merges the
/// mirror back as one undoable step; [`cancel`](Self::cancel) discards it.
pub struct FullscreenSession<'a> {
    primary: &'a mut DrawingSurface,
    mirror: DrawingSurface,
    opened_at: DateTime<Utc>,
}

impl<'a> FullscreenSession<'a> {
    pub fn open(primary: &'a mut DrawingSurface, viewport: (u32, u32)) -> Self {
        let (width, height) = viewport;
        let profile =
            SurfaceProfile::viewport(width, height).with_background(primary.profile().background);
        let seed = primary.export_snapshot();
        debug!(
            width,
            height,
            objects = seed.objects.len(),
            "Opening fullscreen session"
        );
        let mirror = DrawingSurface::from_snapshot(profile, seed)
            .with_rasterizer(primary.rasterizer().clone());
        Self {
            primary,
            mirror,
            opened_at: Utc::now(),
        }
    }

    /// The live surface receiving input.
    pub fn surface(&self) -> &DrawingSurface {
        &self.mirror
    }

    pub fn surface_mut(&mut self) -> &mut DrawingSurface {
        &mut self.mirror
    }

    /// Read-only view of the dormant primary.
    pub fn primary(&self) -> &DrawingSurface {
        &*self.primary
    }

    /// Merge the mirror into the primary as exactly one history entry.
    pub fn save(self) {
        let snapshot = self.mirror.export_snapshot();
        self.primary.import_snapshot(&snapshot);
        self.primary.record_mutation();
        info!(
            objects = snapshot.objects.len(),
            mirror_edits = self.mirror.history().len().saturating_sub(1),
            duration_ms = (Utc::now() - self.opened_at).num_milliseconds(),
            "Saved fullscreen drawing"
        );
    }

    pub fn cancel(self) {
        debug!(
            discarded_edits = self.mirror.history().len().saturating_sub(1),
            "Cancelled fullscreen session"
        );
    }
}
