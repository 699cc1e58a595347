use eframe::egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Distance in pixels within which a pointer grabs an edge handle.
pub const HANDLE_TOLERANCE: f32 = 8.0;
/// Smallest inner rectangle the drag rules allow.
pub const MIN_WIDTH: f32 = 120.0;
pub const MIN_HEIGHT: f32 = 120.0;

/// Insets of the editable text region from the note's edges,
/// persisted per theme as `[left, top, right, bottom]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Margins {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

pub const DEFAULT_MARGINS: Margins = Margins {
    left: 28.0,
    top: 32.0,
    right: 24.0,
    bottom: 24.0,
};

impl Default for Margins {
    fn default() -> Self {
        DEFAULT_MARGINS
    }
}

impl From<[f32; 4]> for Margins {
    fn from(v: [f32; 4]) -> Self {
        Self {
            left: v[0],
            top: v[1],
            right: v[2],
            bottom: v[3],
        }
    }
}

impl From<Margins> for [f32; 4] {
    fn from(m: Margins) -> Self {
        [m.left, m.top, m.right, m.bottom]
    }
}

impl Margins {
    /// Inner rectangle left inside a container of size `size`.
    pub fn inner_rect(&self, size: Vec2) -> Rect {
        Rect::from_min_max(
            Pos2::new(self.left, self.top),
            Pos2::new(size.x - self.right, size.y - self.bottom),
        )
    }
}

/// Edges currently grabbed by the pointer. A corner press activates
/// two edges at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeSet {
    pub left: bool,
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
}

impl EdgeSet {
    pub fn is_empty(self) -> bool {
        !(self.left || self.top || self.right || self.bottom)
    }
}

/// Hit-test a pointer position (in container coordinates) against the
/// four edges of the inner rectangle.
pub fn hit_edges(inner: Rect, pos: Pos2) -> EdgeSet {
    EdgeSet {
        left: (pos.x - inner.left()).abs() <= HANDLE_TOLERANCE,
        right: (pos.x - inner.right()).abs() <= HANDLE_TOLERANCE,
        top: (pos.y - inner.top()).abs() <= HANDLE_TOLERANCE,
        bottom: (pos.y - inner.bottom()).abs() <= HANDLE_TOLERANCE,
    }
}

/// Interactive editor for the margin rectangle.
///
/// Drives a press / move / release state machine over container-local
/// pointer events. Each move clamps only the grabbed edges so the
/// inner rectangle never drops below [`MIN_WIDTH`]×[`MIN_HEIGHT`] and
/// no margin goes negative. Margins are not re-clamped when the
/// container itself is later resized; only interactive drags enforce
/// the invariant.
#[derive(Debug, Default)]
pub struct MarginOverlay {
    active: EdgeSet,
}

impl MarginOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_edges(&self) -> EdgeSet {
        self.active
    }

    pub fn is_dragging(&self) -> bool {
        !self.active.is_empty()
    }

    /// Pointer press: grab whichever edges are within tolerance.
    /// Returns `true` when a drag starts.
    pub fn on_pointer_press(&mut self, size: Vec2, margins: Margins, pos: Pos2) -> bool {
        self.active = hit_edges(margins.inner_rect(size), pos);
        !self.active.is_empty()
    }

    /// Pointer move during a drag: produce the updated margin set.
    /// Edges outside the active set keep their prior value.
    pub fn on_pointer_move(&self, size: Vec2, margins: Margins, pos: Pos2) -> Margins {
        let mut m = margins;
        if self.active.left {
            m.left = pos.x.clamp(0.0, (size.x - m.right - MIN_WIDTH).max(0.0));
        }
        if self.active.right {
            m.right = (size.x - pos.x).clamp(0.0, (size.x - m.left - MIN_WIDTH).max(0.0));
        }
        if self.active.top {
            m.top = pos.y.clamp(0.0, (size.y - m.bottom - MIN_HEIGHT).max(0.0));
        }
        if self.active.bottom {
            m.bottom = (size.y - pos.y).clamp(0.0, (size.y - m.top - MIN_HEIGHT).max(0.0));
        }
        m
    }

    /// Pointer release: the drag ends and the caller commits the
    /// current margins for the active theme.
    pub fn on_pointer_release(&mut self) {
        self.active = EdgeSet::default();
    }
}
