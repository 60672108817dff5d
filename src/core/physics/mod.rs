//=========================================================================
// Physics Collaborator
//=========================================================================
//
// Narrow rigid-body interface consumed by the world.
//
// Architecture:
//   World ──add_body(BodyDef)──> PhysicsSpace ──BodyId──> World
//     │                              │
//     ├─ set_position/angle/force    └─ step(dt)
//     └─ position/angle/force              └─ CollisionCallback (enter)
//
// The world only ever talks to `dyn PhysicsSpace`; `RapierSpace` backs it
// with the rapier2d pipeline.
//
//=========================================================================

//=== Module Declarations =================================================

mod rapier_space;

//=== External Dependencies ===============================================

use std::fmt;
use std::rc::Rc;

use glam::Vec2;

//=== Public API ==========================================================

pub use rapier_space::RapierSpace;

/// Downward gravity in pixels/s².
pub const GRAVITY: Vec2 = Vec2::new(0.0, -900.0);

//=== Identifiers =========================================================

/// Handle to a body living in a [`PhysicsSpace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub(crate) u32);

//=== Body Description ====================================================

/// Mass model of a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyKind {
    /// Simulated body; the moment of inertia follows from mass and shape.
    Dynamic { mass: f32 },

    /// Immovable body (ground).
    Static,
}

/// Collision shape attached to a body, in body-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Box { width: f32, height: f32 },
    Segment { a: Vec2, b: Vec2, radius: f32 },
}

/// Called once when two bodies start touching.
pub type CollisionCallback = Rc<dyn Fn(BodyId, BodyId)>;

/// Everything needed to create a body.
#[derive(Clone)]
pub struct BodyDef {
    pub kind: BodyKind,
    pub shape: Shape,
    pub elasticity: f32,
    pub position: Vec2,
    pub angle: f32,
    pub on_collision: Option<CollisionCallback>,
}

impl BodyDef {
    pub fn dynamic(mass: f32, shape: Shape) -> Self {
        Self {
            kind: BodyKind::Dynamic { mass },
            shape,
            elasticity: 0.0,
            position: Vec2::ZERO,
            angle: 0.0,
            on_collision: None,
        }
    }

    pub fn fixed(shape: Shape) -> Self {
        Self {
            kind: BodyKind::Static,
            shape,
            elasticity: 0.0,
            position: Vec2::ZERO,
            angle: 0.0,
            on_collision: None,
        }
    }

    pub fn with_elasticity(mut self, elasticity: f32) -> Self {
        self.elasticity = elasticity;
        self
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_collision_callback(mut self, callback: CollisionCallback) -> Self {
        self.on_collision = Some(callback);
        self
    }
}

impl fmt::Debug for BodyDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyDef")
            .field("kind", &self.kind)
            .field("shape", &self.shape)
            .field("elasticity", &self.elasticity)
            .field("position", &self.position)
            .field("angle", &self.angle)
            .field("on_collision", &self.on_collision.is_some())
            .finish()
    }
}

//=== PhysicsSpace ========================================================

/// Rigid-body simulation space.
///
/// Accessors return `None` (and setters do nothing) for unknown ids.
pub trait PhysicsSpace {
    /// Adds a body and returns its handle.
    fn add_body(&mut self, def: BodyDef) -> BodyId;

    /// Removes a body. Returns `false` if it was not in the space.
    fn remove_body(&mut self, id: BodyId) -> bool;

    fn contains(&self, id: BodyId) -> bool;

    fn body_count(&self) -> usize;

    fn position(&self, id: BodyId) -> Option<Vec2>;
    fn set_position(&mut self, id: BodyId, position: Vec2);

    /// Rotation in radians.
    fn angle(&self, id: BodyId) -> Option<f32>;
    fn set_angle(&mut self, id: BodyId, angle: f32);

    /// Force applied during the next step.
    fn force(&self, id: BodyId) -> Option<Vec2>;

    /// Replaces the pending force.
    fn set_force(&mut self, id: BodyId, force: Vec2);

    fn velocity(&self, id: BodyId) -> Option<Vec2>;
    fn set_velocity(&mut self, id: BodyId, velocity: Vec2);

    fn add_angular_velocity(&mut self, id: BodyId, delta: f32);

    /// Changes the mass (and derived moment) of a dynamic body.
    fn set_mass(&mut self, id: BodyId, mass: f32);

    /// Advances the simulation by `dt` seconds.
    fn step(&mut self, dt: f32);
}

//=========================================================================
// Unit Tests
//=========================================================================
