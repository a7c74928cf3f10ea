//! Serializable canvas state.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::drawable::{CanvasObject, ObjectId};
use crate::error::CanvasError;

/// Everything needed to redraw a canvas: its background and objects in paint order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasSnapshot {
    pub background: Color,
    #[serde(default)]
    pub objects: Vec<CanvasObject>,
}

impl CanvasSnapshot {
    pub fn empty(background: Color) -> Self {
        Self {
            background,
            objects: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: ObjectId) -> Option<&CanvasObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Next free object id.
    pub fn next_id(&self) -> ObjectId {
        ObjectId(self.objects.iter().map(|o| o.id.0 + 1).max().unwrap_or(0))
    }

    pub fn to_json(&self) -> Result<String, CanvasError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, CanvasError> {
        Ok(serde_json::from_str(json)?)
    }
}
