//=========================================================================
// SVG Scenes
//=========================================================================
//
// A tiny XML dialect:
//
//   <svg width="W" height="H">
//     <g>
//       <rect x y width height [transform="rotate(a b,c)"]/>
//       ...
//       <line x1 y1 x2 y2/>          ground (first group only)
//     </g>
//   </svg>
//
// File coordinates (origin top-left) are scaled into the viewport and
// flipped so y points up.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use log::debug;
use roxmltree::{Document, Node};

//=== Internal Dependencies ===============================================

use super::{BoxSpec, SceneError, World};

//=== Loader ==============================================================

pub(super) fn load(world: &mut World, text: &str) -> Result<usize, SceneError> {
    let doc = Document::parse(text).map_err(|e| SceneError::Svg(e.to_string()))?;
    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(SceneError::Svg(format!(
            "expected <svg> root, found <{}>",
            root.tag_name().name()
        )));
    }

    let viewport = world.viewport().size();
    let file_size = Vec2::new(attr(root, "width")?, attr(root, "height")?);
    if file_size.x <= 0.0 || file_size.y <= 0.0 {
        return Err(SceneError::InvalidAttribute {
            element: "svg".into(),
            attribute: "width/height".into(),
        });
    }
    let scale = viewport / file_size;

    let groups: Vec<Node> = root.children().filter(|n| is(n, "g")).collect();

    let mut created = 0;
    for group in &groups {
        for rect in group.children().filter(|n| is(n, "rect")) {
            let origin = Vec2::new(attr(rect, "x")?, attr(rect, "y")?);
            let size = Vec2::new(attr(rect, "width")?, attr(rect, "height")?);

            let mid = (origin + size * 0.5) * scale;
            let center = Vec2::new(mid.x, viewport.y - mid.y);

            let mut spec = BoxSpec::new(center, size * scale);
            if let Some(transform) = rect.attribute("transform") {
                parse_rotate(transform)?;
                // Rotation values are validated but not applied
                spec = spec.with_angle(FRAC_PI_2);
            }

            world.add_box(spec);
            created += 1;
        }
    }

    let line = groups
        .first()
        .and_then(|g| g.children().find(|n| is(n, "line")))
        .ok_or(SceneError::MissingGround)?;
    let y1 = attr(line, "y1")? * scale.y;
    let y2 = attr(line, "y2")? * scale.y;
    world.set_ground(Vec2::new(0.0, viewport.y - y1), Vec2::new(viewport.x, viewport.y - y2));

    debug!(target: "world", "Loaded SVG scene: {} groups, {} boxes", groups.len(), created);
    Ok(created)
}

//=== Helpers =============================================================

fn is(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn attr(node: Node, name: &str) -> Result<f32, SceneError> {
    node.attribute(name)
        .and_then(|v| v.trim().parse::<f32>().ok())
        .ok_or_else(|| SceneError::InvalidAttribute {
            element: node.tag_name().name().to_owned(),
            attribute: name.to_owned(),
        })
}

/// Parses `rotate(a)`, `rotate(a b,c)` or `rotate(a,b,c)`.
///
/// Returns the angle in degrees and the optional rotation centre.
fn parse_rotate(transform: &str) -> Result<(f32, Option<Vec2>), SceneError> {
    let invalid = || SceneError::Transform(transform.to_owned());

    let args = transform
        .trim()
        .strip_prefix("rotate(")
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(invalid)?;

    let values = args
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f32>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;

    match values.as_slice() {
        [a] => Ok((*a, None)),
        [a, b, c] => Ok((*a, Some(Vec2::new(*b, *c)))),
        _ => Err(invalid()),
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
