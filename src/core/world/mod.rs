//=========================================================================
// World
//=========================================================================
//
// Composition of physics bodies and drawable shapes for one render
// session.
//
// Architecture:
//   World
//     ├─ space: Box<dyn PhysicsSpace>   (simulation, opaque)
//     ├─ boxes: Vec<BoxEntity>          (body + drawable, lock-step)
//     ├─ ground: Option<Ground>         (static segment)
//     └─ audio: explosion / impact players + sound buffers
//
// Flow per frame (driven by the render loop):
//   step(dt) → draw(canvas) [sync, cull, draw] → present (caller)
//
// Coordinates are world space (origin bottom-left, y up) except for the
// tap-driven operations, which take screen coordinates (origin top-left)
// and flip y themselves.
//
//=========================================================================

//=== Module Declarations =================================================

mod entity;
mod grid;
mod loader;
mod svg;

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use log::{debug, trace};
use rand::Rng;

//=== Internal Dependencies ===============================================

use crate::core::assets::AssetError;
use crate::core::audio::{AudioPlayer, MuteAudio, SoundBuffer};
use crate::core::physics::{BodyDef, CollisionCallback, PhysicsSpace, RapierSpace, Shape};
use crate::core::render::{Canvas, Color};

//=== Public API ==========================================================

pub use entity::{BoxEntity, BoxShape, EntityId, Ground};
pub use grid::PYRAMID;
pub use loader::{SceneLoader, SceneSetup};

//=== Constants ===========================================================

pub const BOX_MASS: f32 = 5.0;
pub const BOX_ELASTICITY: f32 = 0.6;

/// Squared pick distance (px²) used by [`World::remove_at`].
pub const BOX_PICK_AREA: f32 = 50.0 * 50.0;

pub const GROUND_RADIUS: f32 = 1.0;

/// Ground height used when a grid scene is loaded into a world without
/// ground.
pub const DEFAULT_GROUND_Y: f32 = 10.0;

/// Scale of the tap explosion; force magnitude is this divided by the
/// normalised distance.
pub const EXPLOSION_STRENGTH: f32 = 1e5;

pub const DROP_BOX_SIZE: f32 = 20.0;
pub const DROP_BOX_MASS: f32 = 10.0;
pub const DROP_BOX_SPIN: f32 = 10.0;

pub const RANDOM_BOX_SIZE: f32 = 40.0;

//=== Viewport ============================================================

/// Visible pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Converts a screen point (origin top-left) to world space.
    pub fn to_world(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(x, self.height as f32 - y)
    }
}

//=== SceneDescription ====================================================

/// Initial box layout source.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneDescription {
    /// Character grid; every non-blank glyph is one box.
    Grid(Vec<String>),

    /// SVG-like XML document.
    Svg(String),
}

impl SceneDescription {
    /// Builds a grid description from multi-line text.
    ///
    /// Trailing empty lines are dropped; interior blank rows are kept.
    pub fn grid_from_text(text: &str) -> Self {
        let mut rows: Vec<String> = text.lines().map(str::to_owned).collect();
        while rows.last().is_some_and(|r| r.trim().is_empty()) {
            rows.pop();
        }
        Self::Grid(rows)
    }
}

//=== SceneError ==========================================================

/// Scene construction failures. All of them are fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    /// The grid contains no rows or no columns.
    EmptyGrid,

    /// The viewport leaves no room above the ground for a grid cell.
    ViewportTooSmall { width: u32, height: u32 },

    /// The scene file is not well-formed XML or has the wrong root.
    Svg(String),

    /// A numeric attribute is missing or unparseable.
    InvalidAttribute { element: String, attribute: String },

    /// A rectangle `transform` is not a `rotate(...)` expression.
    Transform(String),

    /// No `<line>` element defines the ground.
    MissingGround,

    /// A scene or sound file could not be loaded.
    Asset(AssetError),
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "Scene grid is empty"),
            Self::ViewportTooSmall { width, height } => {
                write!(f, "Viewport {}x{} has no room above the ground", width, height)
            }
            Self::Svg(e) => write!(f, "Invalid scene file: {}", e),
            Self::InvalidAttribute { element, attribute } => {
                write!(f, "Invalid or missing '{}' on <{}>", attribute, element)
            }
            Self::Transform(t) => write!(f, "Unsupported transform: {}", t),
            Self::MissingGround => write!(f, "Scene file has no <line> defining the ground"),
            Self::Asset(e) => write!(f, "Scene asset error: {}", e),
        }
    }
}

impl std::error::Error for SceneError {}

impl From<AssetError> for SceneError {
    fn from(e: AssetError) -> Self {
        Self::Asset(e)
    }
}

//=== BoxSpec =============================================================

/// Parameters for a new box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSpec {
    pub center: Vec2,
    pub size: Vec2,
    pub angle: f32,
    pub mass: f32,
    pub color: Color,
}

impl BoxSpec {
    /// Default-mass box with a random happy color.
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            size,
            angle: 0.0,
            mass: BOX_MASS,
            color: Color::happy(),
        }
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }
}

//=== Audio ===============================================================

type SharedPlayer = Rc<RefCell<Box<dyn AudioPlayer>>>;

/// Sound effects used by the world. Both are optional.
#[derive(Debug, Clone, Default)]
pub struct WorldSounds {
    pub explosion: Option<SoundBuffer>,
    pub impact: Option<SoundBuffer>,
}

//=== World ===============================================================

/// Physics space plus the boxes and ground living in it.
///
/// Only ever touched by the render thread.
pub struct World {
    viewport: Viewport,
    space: Box<dyn PhysicsSpace>,
    boxes: Vec<BoxEntity>,
    ground: Option<Ground>,
    next_entity: u64,
    sounds: WorldSounds,
    explosion_player: SharedPlayer,
    impact_player: SharedPlayer,
}

impl World {
    //--- Construction -----------------------------------------------------

    /// Creates an empty world backed by [`RapierSpace`] and muted audio.
    pub fn new(viewport: Viewport) -> Self {
        Self::with_space(viewport, Box::new(RapierSpace::new()))
    }

    /// Creates an empty world backed by the given physics space.
    pub fn with_space(viewport: Viewport, space: Box<dyn PhysicsSpace>) -> Self {
        Self {
            viewport,
            space,
            boxes: Vec::new(),
            ground: None,
            next_entity: 0,
            sounds: WorldSounds::default(),
            explosion_player: Rc::new(RefCell::new(Box::new(MuteAudio::new()))),
            impact_player: Rc::new(RefCell::new(Box::new(MuteAudio::new()))),
        }
    }

    /// Installs audio players and sound buffers.
    ///
    /// Boxes added afterwards play `impact` on collision.
    pub fn set_audio(
        &mut self,
        explosion_player: Box<dyn AudioPlayer>,
        impact_player: Box<dyn AudioPlayer>,
        sounds: WorldSounds,
    ) {
        self.explosion_player = Rc::new(RefCell::new(explosion_player));
        self.impact_player = Rc::new(RefCell::new(impact_player));
        self.sounds = sounds;
    }

    //--- Accessors --------------------------------------------------------

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Updates the viewport after a window resize.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn boxes(&self) -> &[BoxEntity] {
        &self.boxes
    }

    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    pub fn entity(&self, id: EntityId) -> Option<&BoxEntity> {
        self.boxes.iter().find(|b| b.id == id)
    }

    pub fn ground(&self) -> Option<&Ground> {
        self.ground.as_ref()
    }

    pub fn physics(&self) -> &dyn PhysicsSpace {
        self.space.as_ref()
    }

    /// Pending force on a box; reading does not consume it.
    pub fn force_on(&self, id: EntityId) -> Option<Vec2> {
        self.entity(id).and_then(|b| self.space.force(b.body))
    }

    //--- Entities ---------------------------------------------------------

    /// Creates a box, adds its body to the space and attaches the drawable
    /// to this world.
    pub fn add_box(&mut self, spec: BoxSpec) -> EntityId {
        let shape = Shape::Box { width: spec.size.x, height: spec.size.y };

        let mut def = BodyDef::dynamic(spec.mass, shape)
            .with_elasticity(BOX_ELASTICITY)
            .with_position(spec.center)
            .with_angle(spec.angle);
        if let Some(cb) = self.impact_callback() {
            def = def.with_collision_callback(cb);
        }

        let body = self.space.add_body(def);
        let id = EntityId(self.next_entity);
        self.next_entity += 1;

        self.boxes.push(BoxEntity {
            id,
            body,
            shape: BoxShape {
                center: spec.center,
                size: spec.size,
                angle: spec.angle,
                color: spec.color,
            },
        });

        trace!(target: "world", "Added box {:?} at {:?}", id, spec.center);
        id
    }

    /// Removes a box from both the space and the drawable set.
    pub fn remove_box(&mut self, id: EntityId) -> bool {
        match self.boxes.iter().position(|b| b.id == id) {
            Some(index) => {
                self.remove_index(index);
                true
            }
            None => false,
        }
    }

    /// Replaces the ground with a static segment from `from` to `to`.
    pub fn set_ground(&mut self, from: Vec2, to: Vec2) {
        if let Some(old) = self.ground.take() {
            self.space.remove_body(old.body);
        }

        let body = self.space.add_body(BodyDef::fixed(Shape::Segment {
            a: from,
            b: to,
            radius: GROUND_RADIUS,
        }));

        self.ground = Some(Ground {
            body,
            from,
            to,
            color: Color::WHITE,
        });
    }

    //--- Frame ------------------------------------------------------------

    /// Advances the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.space.step(dt);
    }

    /// Clears the canvas, draws every box still in the viewport, removes
    /// the rest, then draws the ground.
    ///
    /// Returns the number of boxes removed.
    pub fn draw<C: Canvas + ?Sized>(&mut self, canvas: &mut C) -> usize {
        canvas.clear(Color::BLACK);

        let world_width = self.viewport.width as f32;
        let mut culled = 0;
        let mut i = 0;

        while i < self.boxes.len() {
            let body = self.boxes[i].body;
            let position = self.space.position(body).unwrap_or(self.boxes[i].shape.center);
            let angle = self.space.angle(body).unwrap_or(self.boxes[i].shape.angle);
            self.boxes[i].sync(position, angle);

            if self.boxes[i].in_viewport(world_width) {
                self.boxes[i].shape.draw(canvas);
                i += 1;
            } else {
                self.remove_index(i);
                culled += 1;
            }
        }

        if let Some(ground) = &self.ground {
            ground.draw(canvas);
        }

        if culled > 0 {
            debug!(target: "world", "Removed {} boxes outside the viewport", culled);
        }
        culled
    }

    //--- Tap Actions ------------------------------------------------------

    /// Radial explosion centred on a screen point.
    ///
    /// Every box gets a force pointing away from the tap, with magnitude
    /// `EXPLOSION_STRENGTH / distance` where distance is measured in
    /// viewport-normalised coordinates. A box exactly at the tap point is
    /// left alone.
    pub fn apply_radial_force(&mut self, x: f32, y: f32) {
        if let Some(sound) = &self.sounds.explosion {
            self.explosion_player.borrow().play(sound);
        }

        let size = self.viewport.size();
        if size.x <= 0.0 || size.y <= 0.0 {
            return;
        }
        let tap = self.viewport.to_world(x, y) / size;

        for b in &self.boxes {
            let center = self.space.position(b.body).unwrap_or(b.shape.center);
            let offset = center / size - tap;
            let distance = offset.length();
            if distance <= f32::EPSILON {
                continue;
            }

            let force = offset / distance * (EXPLOSION_STRENGTH / distance);
            self.space.set_force(b.body, force);
        }

        debug!(target: "world", "Explosion at ({}, {}) on {} boxes", x, y, self.boxes.len());
    }

    /// Drops a small spinning box at a screen point.
    pub fn drop_box(&mut self, x: f32, y: f32) -> EntityId {
        let angle = rand::thread_rng().gen_range(0.0..std::f32::consts::TAU);
        let spec = BoxSpec::new(self.viewport.to_world(x, y), Vec2::splat(DROP_BOX_SIZE))
            .with_angle(angle)
            .with_mass(DROP_BOX_MASS);

        let id = self.add_box(spec);
        if let Some(b) = self.entity(id) {
            let body = b.body;
            self.space.add_angular_velocity(body, DROP_BOX_SPIN);
        }
        id
    }

    /// Removes the first box whose centre is close to a screen point.
    pub fn remove_at(&mut self, x: f32, y: f32) -> Option<EntityId> {
        let point = self.viewport.to_world(x, y);
        let index = self.boxes.iter().position(|b| {
            let center = self.space.position(b.body).unwrap_or(b.shape.center);
            (center - point).length_squared() < BOX_PICK_AREA
        })?;

        let id = self.boxes[index].id;
        self.remove_index(index);
        Some(id)
    }

    //--- Layouts ----------------------------------------------------------

    /// Populates the world from a grid or SVG description.
    ///
    /// Returns the number of boxes created.
    pub fn load_from_description(&mut self, description: &SceneDescription) -> Result<usize, SceneError> {
        match description {
            SceneDescription::Grid(rows) => grid::load(self, rows),
            SceneDescription::Svg(text) => svg::load(self, text),
        }
    }

    /// Ground at one third of the height and `count` boxes scattered along
    /// the top edge with random angles.
    pub fn populate_random(&mut self, count: usize) {
        let size = self.viewport.size();
        self.set_ground(Vec2::new(0.0, size.y / 3.0), Vec2::new(size.x, size.y / 3.0));

        let mut rng = rand::thread_rng();
        for _ in 0..count {
            let center = Vec2::new(rng.gen_range(0.0..=size.x), size.y);
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            self.add_box(BoxSpec::new(center, Vec2::splat(RANDOM_BOX_SIZE)).with_angle(angle));
        }
    }

    //--- Teardown ---------------------------------------------------------

    /// Releases audio players and removes every box.
    pub fn destroy(&mut self) {
        self.impact_player.borrow_mut().destroy();
        self.explosion_player.borrow_mut().destroy();

        while !self.boxes.is_empty() {
            self.remove_index(self.boxes.len() - 1);
        }
        debug!(target: "world", "World destroyed");
    }

    //--- Internal Helpers -------------------------------------------------

    fn remove_index(&mut self, index: usize) {
        let entity = self.boxes.remove(index);
        self.space.remove_body(entity.body);
    }

    fn impact_callback(&self) -> Option<CollisionCallback> {
        let sound = self.sounds.impact.clone()?;
        let player = Rc::clone(&self.impact_player);
        Some(Rc::new(move |_, _| player.borrow().play(&sound)))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::render::HeadlessCanvas;
    use std::cell::Cell;

    fn world(w: u32, h: u32) -> World {
        World::with_space(Viewport::new(w, h), Box::new(RapierSpace::with_gravity(Vec2::ZERO)))
    }

    /// Player that reports plays through a shared counter.
    struct CountingPlayer {
        plays: Rc<Cell<u32>>,
        destroyed: Rc<Cell<bool>>,
    }

    impl AudioPlayer for CountingPlayer {
        fn play(&self, _sound: &SoundBuffer) {
            self.plays.set(self.plays.get() + 1);
        }
        fn destroy(&mut self) {
            self.destroyed.set(true);
        }
        fn is_destroyed(&self) -> bool {
            self.destroyed.get()
        }
    }

    fn counting() -> (Box<dyn AudioPlayer>, Rc<Cell<u32>>, Rc<Cell<bool>>) {
        let plays = Rc::new(Cell::new(0));
        let destroyed = Rc::new(Cell::new(false));
        let player = CountingPlayer {
            plays: Rc::clone(&plays),
            destroyed: Rc::clone(&destroyed),
        };
        (Box::new(player), plays, destroyed)
    }

    //=====================================================================
    // Entity Bookkeeping
    //=====================================================================

    #[test]
    fn add_box_creates_body_and_drawable() {
        let mut w = world(100, 100);
        let id = w.add_box(BoxSpec::new(Vec2::new(50.0, 50.0), Vec2::splat(10.0)));

        assert_eq!(w.box_count(), 1);
        let body = w.entity(id).unwrap().body();
        assert!(w.physics().contains(body));
        assert_eq!(w.physics().position(body), Some(Vec2::new(50.0, 50.0)));
    }

    #[test]
    fn remove_box_detaches_both() {
        let mut w = world(100, 100);
        let id = w.add_box(BoxSpec::new(Vec2::new(50.0, 50.0), Vec2::splat(10.0)));
        let body = w.entity(id).unwrap().body();

        assert!(w.remove_box(id));
        assert!(!w.remove_box(id));
        assert_eq!(w.box_count(), 0);
        assert!(!w.physics().contains(body));
    }

    #[test]
    fn set_ground_replaces_previous_segment() {
        let mut w = world(100, 100);
        w.set_ground(Vec2::new(0.0, 10.0), Vec2::new(100.0, 10.0));
        let first = w.ground().unwrap().body();
        w.set_ground(Vec2::new(0.0, 20.0), Vec2::new(100.0, 20.0));

        assert!(!w.physics().contains(first));
        assert_eq!(w.physics().body_count(), 1);
        assert_eq!(w.ground().unwrap().center().y, 20.0);
    }

    //=====================================================================
    // Drawing and Culling
    //=====================================================================

    #[test]
    fn draw_mirrors_physics_pose() {
        let mut w = world(100, 100);
        let id = w.add_box(BoxSpec::new(Vec2::new(50.0, 50.0), Vec2::splat(10.0)));
        let body = w.entity(id).unwrap().body();
        w.space.set_position(body, Vec2::new(60.0, 40.0));
        w.space.set_angle(body, 0.5);

        let mut canvas = HeadlessCanvas::new(100, 100);
        w.draw(&mut canvas);

        let shape = w.entity(id).unwrap().shape();
        assert_eq!(shape.center, Vec2::new(60.0, 40.0));
        assert_eq!(shape.angle, 0.5);
    }

    #[test]
    fn draw_removes_boxes_outside_viewport_in_same_frame() {
        let mut w = world(100, 100);
        let inside = w.add_box(BoxSpec::new(Vec2::new(50.0, 50.0), Vec2::splat(10.0)));
        let left = w.add_box(BoxSpec::new(Vec2::new(-10.5, 50.0), Vec2::splat(10.0)));
        let right = w.add_box(BoxSpec::new(Vec2::new(111.0, 50.0), Vec2::splat(10.0)));
        let left_body = w.entity(left).unwrap().body();

        let mut canvas = HeadlessCanvas::new(100, 100);
        let culled = w.draw(&mut canvas);

        assert_eq!(culled, 2);
        assert!(w.entity(inside).is_some());
        assert!(w.entity(left).is_none());
        assert!(w.entity(right).is_none());
        assert!(!w.physics().contains(left_body));
        assert_eq!(w.physics().body_count(), 1);
    }

    #[test]
    fn boxes_below_the_screen_are_kept() {
        let mut w = world(100, 100);
        w.add_box(BoxSpec::new(Vec2::new(50.0, -500.0), Vec2::splat(10.0)));
        let mut canvas = HeadlessCanvas::new(100, 100);
        assert_eq!(w.draw(&mut canvas), 0);
        assert_eq!(w.box_count(), 1);
    }

    #[test]
    fn draw_paints_boxes_and_ground() {
        let mut w = world(100, 100);
        w.set_ground(Vec2::new(0.0, 10.5), Vec2::new(99.0, 10.5));
        let spec = BoxSpec {
            color: Color::rgb(255, 0, 0),
            ..BoxSpec::new(Vec2::new(50.0, 50.0), Vec2::splat(10.0))
        };
        w.add_box(spec);

        let mut canvas = HeadlessCanvas::new(100, 100);
        w.draw(&mut canvas);

        assert_eq!(canvas.pixel(50, 50), Some(Color::rgb(255, 0, 0)));
        assert_eq!(canvas.pixel(20, 10), Some(Color::WHITE));
        assert_eq!(canvas.pixel(5, 90), Some(Color::BLACK));
    }

    //=====================================================================
    // Radial Force
    //=====================================================================

    #[test]
    fn radial_force_points_away_from_tap() {
        let mut w = world(200, 200);
        // Tap at screen (100, 100) = world (100, 100)
        let right = w.add_box(BoxSpec::new(Vec2::new(150.0, 100.0), Vec2::splat(10.0)));
        let above = w.add_box(BoxSpec::new(Vec2::new(100.0, 180.0), Vec2::splat(10.0)));

        w.apply_radial_force(100.0, 100.0);

        let f_right = w.force_on(right).unwrap();
        let f_above = w.force_on(above).unwrap();
        assert!(f_right.x > 0.0 && f_right.y.abs() < 1e-3);
        assert!(f_above.y > 0.0 && f_above.x.abs() < 1e-3);
    }

    #[test]
    fn radial_force_flips_screen_y() {
        let mut w = world(200, 200);
        let id = w.add_box(BoxSpec::new(Vec2::new(100.0, 150.0), Vec2::splat(10.0)));

        // Screen y = 180 is world y = 20, below the box
        w.apply_radial_force(100.0, 180.0);

        assert!(w.force_on(id).unwrap().y > 0.0);
    }

    #[test]
    fn radial_force_falls_off_with_distance() {
        let mut w = world(100, 100);
        let near = w.add_box(BoxSpec::new(Vec2::new(60.0, 50.0), Vec2::splat(4.0)));
        let far = w.add_box(BoxSpec::new(Vec2::new(70.0, 50.0), Vec2::splat(4.0)));

        w.apply_radial_force(50.0, 50.0);

        let near_mag = w.force_on(near).unwrap().length();
        let far_mag = w.force_on(far).unwrap().length();

        // Normalised distances 0.1 and 0.2
        assert!((near_mag - EXPLOSION_STRENGTH / 0.1).abs() / near_mag < 1e-3);
        assert!((near_mag / far_mag - 2.0).abs() < 1e-3);
    }

    #[test]
    fn radial_force_reads_are_idempotent() {
        let mut w = world(100, 100);
        let id = w.add_box(BoxSpec::new(Vec2::new(80.0, 80.0), Vec2::splat(4.0)));
        w.apply_radial_force(10.0, 90.0);

        let first = w.force_on(id);
        let second = w.force_on(id);
        assert!(first.unwrap().length() > 0.0);
        assert_eq!(first, second);
    }

    #[test]
    fn box_at_tap_point_gets_no_force() {
        let mut w = world(100, 100);
        let id = w.add_box(BoxSpec::new(Vec2::new(50.0, 50.0), Vec2::splat(4.0)));
        w.apply_radial_force(50.0, 50.0);
        assert_eq!(w.force_on(id), Some(Vec2::ZERO));
    }

    #[test]
    fn explosion_plays_sound() {
        let mut w = world(100, 100);
        let (explosion, plays, _) = counting();
        let (impact, _, _) = counting();
        w.set_audio(
            explosion,
            impact,
            WorldSounds {
                explosion: Some(SoundBuffer::new("explosion", vec![0; 4])),
                impact: None,
            },
        );

        w.apply_radial_force(10.0, 10.0);
        assert_eq!(plays.get(), 1);
    }

    //=====================================================================
    // Other Tap Actions
    //=====================================================================

    #[test]
    fn drop_box_places_small_heavy_box_at_tap() {
        let mut w = world(100, 100);
        let id = w.drop_box(30.0, 20.0);

        let entity = w.entity(id).unwrap();
        assert_eq!(entity.shape().size, Vec2::splat(DROP_BOX_SIZE));
        assert_eq!(w.physics().position(entity.body()), Some(Vec2::new(30.0, 80.0)));
    }

    #[test]
    fn remove_at_picks_nearby_box() {
        let mut w = world(100, 100);
        let id = w.add_box(BoxSpec::new(Vec2::new(50.0, 50.0), Vec2::splat(10.0)));

        assert_eq!(w.remove_at(0.0, 0.0), None, "(0, 100) in world is too far");
        assert_eq!(w.remove_at(55.0, 45.0), Some(id));
        assert_eq!(w.box_count(), 0);
    }

    //=====================================================================
    // Layouts and Teardown
    //=====================================================================

    #[test]
    fn populate_random_adds_ground_and_boxes() {
        let mut w = world(300, 300);
        w.populate_random(7);

        assert_eq!(w.box_count(), 7);
        assert_eq!(w.ground().unwrap().center().y, 100.0);
        assert!(w.boxes().iter().all(|b| b.shape().center.y == 300.0));
    }

    #[test]
    fn destroy_releases_audio_and_boxes() {
        let mut w = world(100, 100);
        let (explosion, _, explosion_destroyed) = counting();
        let (impact, _, impact_destroyed) = counting();
        w.set_audio(explosion, impact, WorldSounds::default());
        w.add_box(BoxSpec::new(Vec2::new(10.0, 10.0), Vec2::splat(4.0)));
        w.add_box(BoxSpec::new(Vec2::new(20.0, 10.0), Vec2::splat(4.0)));

        w.destroy();

        assert_eq!(w.box_count(), 0);
        assert_eq!(w.physics().body_count(), 0);
        assert!(explosion_destroyed.get());
        assert!(impact_destroyed.get());
    }

    #[test]
    fn impact_sound_plays_on_collision() {
        let mut w = World::new(Viewport::new(100, 100));
        let (explosion, _, _) = counting();
        let (impact, plays, _) = counting();
        w.set_audio(
            explosion,
            impact,
            WorldSounds {
                explosion: None,
                impact: Some(SoundBuffer::new("impact", vec![0; 4])),
            },
        );
        w.set_ground(Vec2::new(0.0, 10.0), Vec2::new(100.0, 10.0));
        w.add_box(BoxSpec::new(Vec2::new(50.0, 40.0), Vec2::splat(10.0)));

        for _ in 0..60 {
            w.step(1.0 / 30.0);
        }

        assert!(plays.get() >= 1);
    }

    #[test]
    fn grid_from_text_drops_trailing_blank_lines() {
        let desc = SceneDescription::grid_from_text(" + \n+++\n\n  \n");
        assert_eq!(desc, SceneDescription::Grid(vec![" + ".into(), "+++".into()]));
    }

    #[test]
    fn scene_error_display() {
        let e = SceneError::InvalidAttribute {
            element: "rect".into(),
            attribute: "width".into(),
        };
        assert_eq!(e.to_string(), "Invalid or missing 'width' on <rect>");

        let e = SceneError::ViewportTooSmall { width: 320, height: 8 };
        assert_eq!(e.to_string(), "Viewport 320x8 has no room above the ground");
    }
}
