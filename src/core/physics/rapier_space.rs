//=========================================================================
// Rapier Space
//=========================================================================
//
// `PhysicsSpace` backed by the rapier2d rigid-body pipeline.
//
// Architecture:
//   BodyId ──entries──> (RigidBodyHandle, ColliderHandle, pending force)
//                              │
//   step(dt):                  ▼
//     1. pending forces → RigidBody::add_force
//     2. PhysicsPipeline::step (gravity, contacts, friction, restitution)
//     3. forces reset, pending forces cleared
//     4. CollisionEvent::Started → collision-enter callbacks
//
// The world works in pixels; `LENGTH_UNIT` tells rapier how big a typical
// object is so its tolerances scale accordingly. Removed bodies free
// their rapier slots; `BodyId`s themselves are never reused.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

use crossbeam_channel::{unbounded, Receiver};
use glam::Vec2;
use log::trace;
use rapier2d::na::{Point2, UnitComplex, Vector2};
use rapier2d::prelude::{
    ActiveEvents, CCDSolver, ChannelEventCollector, CoefficientCombineRule, ColliderBuilder,
    ColliderHandle, ColliderSet, CollisionEvent, ContactForceEvent, DefaultBroadPhase,
    ImpulseJointSet, IntegrationParameters, IslandManager, MultibodyJointSet, NarrowPhase,
    PhysicsPipeline, RigidBody, RigidBodyBuilder, RigidBodyHandle, RigidBodySet, SharedShape,
};

//=== Internal Dependencies ===============================================

use super::{BodyDef, BodyId, BodyKind, CollisionCallback, PhysicsSpace, Shape, GRAVITY};

//=== Tuning ==============================================================

/// Friction coefficient of every collider.
const FRICTION: f32 = 0.7;

/// Typical object size in pixels.
const LENGTH_UNIT: f32 = 20.0;

//=== Conversions =========================================================

fn to_vector(v: Vec2) -> Vector2<f32> {
    Vector2::new(v.x, v.y)
}

fn to_point(v: Vec2) -> Point2<f32> {
    Point2::new(v.x, v.y)
}

fn to_vec2(v: &Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

//=== Entry ===============================================================

struct Entry {
    body: RigidBodyHandle,
    collider: ColliderHandle,
    force: Vec2,
    on_collision: Option<CollisionCallback>,
}

//=== RapierSpace =========================================================

/// Default [`PhysicsSpace`] implementation.
pub struct RapierSpace {
    gravity: Vec2,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    events: ChannelEventCollector,
    collisions: Receiver<CollisionEvent>,
    _contact_forces: Receiver<ContactForceEvent>,
    entries: HashMap<BodyId, Entry>,
    next_id: u32,
}

impl RapierSpace {
    pub fn new() -> Self {
        Self::with_gravity(GRAVITY)
    }

    pub fn with_gravity(gravity: Vec2) -> Self {
        let (collision_tx, collisions) = unbounded();
        let (force_tx, contact_forces) = unbounded();

        let mut params = IntegrationParameters::default();
        params.length_unit = LENGTH_UNIT;

        Self {
            gravity,
            params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            events: ChannelEventCollector::new(collision_tx, force_tx),
            collisions,
            _contact_forces: contact_forces,
            entries: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    //--- Internal Helpers -------------------------------------------------

    fn rigid(&self, id: BodyId) -> Option<&RigidBody> {
        self.entries.get(&id).and_then(|e| self.bodies.get(e.body))
    }

    fn rigid_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        let handle = self.entries.get(&id)?.body;
        self.bodies.get_mut(handle)
    }

    /// Body owning a collider, recovered from the rigid body's user data.
    fn owner(&self, collider: ColliderHandle) -> Option<BodyId> {
        let parent = self.colliders.get(collider)?.parent()?;
        self.bodies.get(parent).map(|rb| BodyId(rb.user_data as u32))
    }

    fn fire_collisions(&mut self) {
        let mut pending: Vec<(CollisionCallback, BodyId, BodyId)> = Vec::new();

        while let Ok(event) = self.collisions.try_recv() {
            if !event.started() {
                continue;
            }
            let (Some(a), Some(b)) = (self.owner(event.collider1()), self.owner(event.collider2())) else {
                continue;
            };
            for id in [a, b] {
                if let Some(cb) = self.entries.get(&id).and_then(|e| e.on_collision.clone()) {
                    pending.push((cb, a, b));
                }
            }
        }

        for (cb, a, b) in pending {
            trace!(target: "physics", "Collision enter {:?} <-> {:?}", a, b);
            cb(a, b);
        }
    }
}

impl Default for RapierSpace {
    fn default() -> Self {
        Self::new()
    }
}

//=== PhysicsSpace Implementation =========================================

impl PhysicsSpace for RapierSpace {
    fn add_body(&mut self, def: BodyDef) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;

        let builder = match def.kind {
            BodyKind::Dynamic { .. } => RigidBodyBuilder::dynamic(),
            BodyKind::Static => RigidBodyBuilder::fixed(),
        };
        let body = self.bodies.insert(
            builder
                .translation(to_vector(def.position))
                .rotation(def.angle)
                .user_data(u128::from(id.0))
                .build(),
        );

        let shape = match def.shape {
            Shape::Box { width, height } => SharedShape::cuboid(width * 0.5, height * 0.5),
            Shape::Segment { a, b, radius } => SharedShape::capsule(to_point(a), to_point(b), radius),
        };
        let mut collider = ColliderBuilder::new(shape)
            .restitution(def.elasticity)
            .restitution_combine_rule(CoefficientCombineRule::Multiply)
            .friction(FRICTION)
            .active_events(ActiveEvents::COLLISION_EVENTS);
        if let BodyKind::Dynamic { mass } = def.kind {
            collider = collider.mass(mass);
        }
        let collider = self.colliders.insert_with_parent(collider, body, &mut self.bodies);

        self.entries.insert(
            id,
            Entry {
                body,
                collider,
                force: Vec2::ZERO,
                on_collision: def.on_collision,
            },
        );
        id
    }

    fn remove_body(&mut self, id: BodyId) -> bool {
        let Some(entry) = self.entries.remove(&id) else {
            return false;
        };

        self.bodies.remove(
            entry.body,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        true
    }

    fn contains(&self, id: BodyId) -> bool {
        self.entries.contains_key(&id)
    }

    fn body_count(&self) -> usize {
        self.entries.len()
    }

    fn position(&self, id: BodyId) -> Option<Vec2> {
        self.rigid(id).map(|rb| to_vec2(rb.translation()))
    }

    fn set_position(&mut self, id: BodyId, position: Vec2) {
        if let Some(rb) = self.rigid_mut(id) {
            rb.set_translation(to_vector(position), true);
        }
    }

    fn angle(&self, id: BodyId) -> Option<f32> {
        self.rigid(id).map(|rb| rb.rotation().angle())
    }

    fn set_angle(&mut self, id: BodyId, angle: f32) {
        if let Some(rb) = self.rigid_mut(id) {
            rb.set_rotation(UnitComplex::new(angle), true);
        }
    }

    fn force(&self, id: BodyId) -> Option<Vec2> {
        self.entries.get(&id).map(|e| e.force)
    }

    fn set_force(&mut self, id: BodyId, force: Vec2) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.force = force;
        }
    }

    fn velocity(&self, id: BodyId) -> Option<Vec2> {
        self.rigid(id).map(|rb| to_vec2(rb.linvel()))
    }

    fn set_velocity(&mut self, id: BodyId, velocity: Vec2) {
        if let Some(rb) = self.rigid_mut(id) {
            rb.set_linvel(to_vector(velocity), true);
        }
    }

    fn add_angular_velocity(&mut self, id: BodyId, delta: f32) {
        if let Some(rb) = self.rigid_mut(id) {
            let spin = rb.angvel() + delta;
            rb.set_angvel(spin, true);
        }
    }

    fn set_mass(&mut self, id: BodyId, mass: f32) {
        let Some(entry) = self.entries.get(&id) else {
            return;
        };
        let Some(rb) = self.bodies.get_mut(entry.body) else {
            return;
        };
        if !rb.is_dynamic() {
            return;
        }

        if let Some(collider) = self.colliders.get_mut(entry.collider) {
            collider.set_mass(mass);
        }
        rb.recompute_mass_properties_from_colliders(&self.colliders);
        rb.wake_up(true);
    }

    fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        for entry in self.entries.values().filter(|e| e.force != Vec2::ZERO) {
            if let Some(rb) = self.bodies.get_mut(entry.body) {
                rb.add_force(to_vector(entry.force), true);
            }
        }

        self.params.dt = dt;
        self.pipeline.step(
            &to_vector(self.gravity),
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &self.events,
        );

        for entry in self.entries.values_mut().filter(|e| e.force != Vec2::ZERO) {
            if let Some(rb) = self.bodies.get_mut(entry.body) {
                rb.reset_forces(false);
            }
            entry.force = Vec2::ZERO;
        }

        self.fire_collisions();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
