//=========================================================================
// World Entities
//=========================================================================
//
// Each entity pairs one physics body with one drawable shape. The
// drawable mirrors the body once per frame (see `World::draw`).
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec2;

//=== Internal Dependencies ===============================================

use crate::core::physics::BodyId;
use crate::core::render::{Canvas, Color};

//=== EntityId ============================================================

/// Stable identifier of a box inside its world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub(crate) u64);

//=== BoxShape ============================================================

/// Drawable rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxShape {
    pub center: Vec2,
    pub size: Vec2,
    /// Radians, counter-clockwise.
    pub angle: f32,
    pub color: Color,
}

impl BoxShape {
    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.fill_box(self.center, self.size, self.angle, self.color);
    }
}

//=== BoxEntity ===========================================================

/// A dynamic box: physics body plus drawable.
#[derive(Debug, Clone)]
pub struct BoxEntity {
    pub(crate) id: EntityId,
    pub(crate) body: BodyId,
    pub(crate) shape: BoxShape,
}

impl BoxEntity {
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn body(&self) -> BodyId {
        self.body
    }

    pub fn shape(&self) -> &BoxShape {
        &self.shape
    }

    /// Copies the body's pose into the drawable.
    pub(crate) fn sync(&mut self, position: Vec2, angle: f32) {
        self.shape.center = position;
        self.shape.angle = angle;
    }

    /// True while the horizontal centre lies inside
    /// `(-width, world_width + width)`. Vertical position is not checked.
    pub fn in_viewport(&self, world_width: f32) -> bool {
        let x = self.shape.center.x;
        let w = self.shape.width();
        x > -w && x < world_width + w
    }
}

//=== Ground ==============================================================

/// Static segment the boxes land on.
#[derive(Debug, Clone)]
pub struct Ground {
    pub(crate) body: BodyId,
    pub from: Vec2,
    pub to: Vec2,
    pub color: Color,
}

impl Ground {
    pub fn body(&self) -> BodyId {
        self.body
    }

    /// Midpoint of the segment.
    pub fn center(&self) -> Vec2 {
        (self.from + self.to) * 0.5
    }

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_segment(self.from, self.to, self.color);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
