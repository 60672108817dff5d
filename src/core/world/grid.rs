//=========================================================================
// Grid Scenes
//=========================================================================
//
// Every non-blank glyph in a character grid becomes one square box.
//
//   row 0     "  +  "      ┐
//   row 1     " +++ "      │ rows * cell
//   row 2     "+++++"      ┘  (bottom row rests on the ground)
//   ──────────────────────── ground
//
// The cell is square: `min(width / columns, (height - ground) / rows)`,
// and the grid is centred horizontally.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec2;
use log::debug;

//=== Internal Dependencies ===============================================

use super::{BoxSpec, SceneError, World, DEFAULT_GROUND_Y};

//=== Built-in Layout =====================================================

/// Two pyramids side by side; the default scene.
pub const PYRAMID: &[&str] = &[
    "      +            +   ",
    "     +++          +++  ",
    "    +++++         +++  ",
    "   +++++++        +++  ",
    "  +++++++++       +++  ",
];

//=== Loader ==============================================================

pub(super) fn load<S: AsRef<str>>(world: &mut World, rows: &[S]) -> Result<usize, SceneError> {
    let columns = rows.iter().map(|r| r.as_ref().chars().count()).max().unwrap_or(0);
    if rows.is_empty() || columns == 0 {
        return Err(SceneError::EmptyGrid);
    }

    let size = world.viewport().size();
    let ground_y = match world.ground() {
        Some(ground) => ground.from.y.max(ground.to.y),
        None => {
            world.set_ground(Vec2::new(0.0, DEFAULT_GROUND_Y), Vec2::new(size.x, DEFAULT_GROUND_Y));
            DEFAULT_GROUND_Y
        }
    };

    let cell = (size.x / columns as f32).min((size.y - ground_y) / rows.len() as f32);
    if cell <= 0.0 {
        return Err(SceneError::ViewportTooSmall {
            width: world.viewport().width,
            height: world.viewport().height,
        });
    }
    let left = (size.x - cell * columns as f32) * 0.5;

    let mut created = 0;
    for (y, row) in rows.iter().enumerate() {
        let level = (rows.len() - 1 - y) as f32;
        for (x, glyph) in row.as_ref().chars().enumerate() {
            if glyph.is_whitespace() {
                continue;
            }
            let center = Vec2::new(left + (x as f32 + 0.5) * cell, ground_y + (level + 0.5) * cell);
            world.add_box(BoxSpec::new(center, Vec2::splat(cell)));
            created += 1;
        }
    }

    debug!(
        target: "world",
        "Loaded grid scene: {}x{} cells of {:.1}px, {} boxes",
        columns,
        rows.len(),
        cell,
        created
    );
    Ok(created)
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::physics::RapierSpace;
    use crate::core::render::HeadlessCanvas;
    use crate::core::world::{SceneDescription, Viewport};

    fn world(w: u32, h: u32) -> World {
        World::with_space(Viewport::new(w, h), Box::new(RapierSpace::with_gravity(Vec2::ZERO)))
    }

    fn grid(rows: &[&str]) -> SceneDescription {
        SceneDescription::Grid(rows.iter().map(|r| r.to_string()).collect())
    }

    //=====================================================================
    // Layout
    //=====================================================================

    #[test]
    fn single_glyph_fills_space_above_ground() {
        let mut w = world(200, 100);
        let created = w.load_from_description(&grid(&["+"])).unwrap();

        assert_eq!(created, 1);
        let shape = w.boxes()[0].shape();
        assert_eq!(shape.size, Vec2::splat(90.0));
        assert_eq!(shape.center, Vec2::new(100.0, 55.0));
    }

    #[test]
    fn missing_ground_is_created_at_default_height() {
        let mut w = world(200, 100);
        w.load_from_description(&grid(&["+"])).unwrap();

        let ground = w.ground().unwrap();
        assert_eq!(ground.from, Vec2::new(0.0, DEFAULT_GROUND_Y));
        assert_eq!(ground.to, Vec2::new(200.0, DEFAULT_GROUND_Y));
    }

    #[test]
    fn existing_ground_is_kept() {
        let mut w = world(100, 100);
        w.set_ground(Vec2::new(0.0, 40.0), Vec2::new(100.0, 40.0));
        w.load_from_description(&grid(&["+"])).unwrap();

        assert_eq!(w.ground().unwrap().from.y, 40.0);
        assert_eq!(w.boxes()[0].shape().size, Vec2::splat(60.0));
        assert_eq!(w.boxes()[0].shape().center.y, 70.0);
    }

    #[test]
    fn bottom_row_rests_on_ground_and_rows_stack_up() {
        let mut w = world(100, 110);
        w.load_from_description(&grid(&[" + ", "+++"])).unwrap();

        // columns = 3, rows = 2 → cell = min(33.3, 50) = 33.3
        let cell = 100.0 / 3.0;
        let mut ys: Vec<f32> = w.boxes().iter().map(|b| b.shape().center.y).collect();
        ys.sort_by(|a, b| a.partial_cmp(b).unwrap());

        assert_eq!(w.box_count(), 4);
        assert!((ys[0] - (10.0 + cell * 0.5)).abs() < 1e-3);
        assert!((ys[3] - (10.0 + cell * 1.5)).abs() < 1e-3);
    }

    #[test]
    fn any_non_blank_glyph_counts() {
        let mut w = world(100, 100);
        let created = w.load_from_description(&grid(&["a#.", " x "])).unwrap();
        assert_eq!(created, 4);
    }

    #[test]
    fn ragged_rows_use_longest_row() {
        let mut w = world(100, 100);
        w.load_from_description(&grid(&["+", "++++"])).unwrap();

        assert_eq!(w.boxes()[0].shape().size, Vec2::splat(25.0));
        assert_eq!(w.boxes()[0].shape().center.x, 12.5);
    }

    #[test]
    fn narrow_grid_is_centred() {
        let mut w = world(300, 110);
        w.load_from_description(&grid(&["+"])).unwrap();
        assert_eq!(w.boxes()[0].shape().center.x, 150.0);
    }

    #[test]
    fn pyramid_layout_loads() {
        let mut w = world(480, 320);
        let expected: usize = PYRAMID.iter().map(|r| r.chars().filter(|c| !c.is_whitespace()).count()).sum();

        assert_eq!(w.load_from_description(&grid(PYRAMID)).unwrap(), expected);
        // 23 columns limit the cell width
        let cell = 480.0 / 23.0;
        assert!(w.boxes().iter().all(|b| (b.shape().size.x - cell).abs() < 1e-3));
    }

    #[test]
    fn pyramid_holds_its_shape_under_gravity() {
        let mut w = World::new(Viewport::new(480, 320));
        w.load_from_description(&grid(PYRAMID)).unwrap();
        let cell = w.boxes()[0].shape().size.x;
        let start: Vec<Vec2> = w.boxes().iter().map(|b| b.shape().center).collect();
        let count = w.box_count();

        let mut canvas = HeadlessCanvas::new(480, 320);
        for _ in 0..90 {
            w.step(1.0 / 30.0);
            w.draw(&mut canvas);
        }

        assert_eq!(w.box_count(), count, "No box may leave the viewport");
        for (b, origin) in w.boxes().iter().zip(&start) {
            let moved = (b.shape().center - *origin).length();
            assert!(moved < cell * 0.5, "Box {:?} moved {:.1}px", b.id(), moved);
            assert!(b.shape().angle.abs() < 0.1, "Box {:?} tilted {:.2}rad", b.id(), b.shape().angle);
        }
    }

    //=====================================================================
    // Errors
    //=====================================================================

    #[test]
    fn empty_grid_is_rejected() {
        let mut w = world(100, 100);
        assert_eq!(w.load_from_description(&grid(&[])), Err(SceneError::EmptyGrid));
        assert_eq!(w.load_from_description(&grid(&["", ""])), Err(SceneError::EmptyGrid));
    }

    #[test]
    fn viewport_below_ground_is_rejected() {
        let mut w = world(100, 8);
        assert_eq!(
            w.load_from_description(&grid(&["+"])),
            Err(SceneError::ViewportTooSmall { width: 100, height: 8 })
        );

        let mut w = world(0, 100);
        assert_eq!(
            w.load_from_description(&grid(&["+"])),
            Err(SceneError::ViewportTooSmall { width: 0, height: 100 })
        );
    }

    #[test]
    fn blank_grid_creates_no_boxes() {
        let mut w = world(100, 100);
        assert_eq!(w.load_from_description(&grid(&["   "])), Ok(0));
    }
}
