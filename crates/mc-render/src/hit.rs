//! Block picking.
//!
//! Tolerances in [`EngineConfig`] are screen pixels and are divided by the
//! zoom before being compared against world-space geometry. Link picking
//! lives in [`crate::links::hit_test_link`].

use mc_core::config::{EngineConfig, Lod};
use mc_core::geometry::{BorderEdge, Point};
use mc_core::id::BlockId;
use mc_core::model::Block;
use mc_core::scene::Scene;

/// Which part of a block a point landed on, in dispatch priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockPart {
    /// The shape/color button.
    Button,
    /// Connector index: top, right, bottom, left.
    Connector(usize),
    Border(BorderEdge),
    Body,
}

/// The shape button and connectors are only drawn in the full tier, so
/// below it they are not hit either.
pub fn part_at(block: &Block, p: Point, config: &EngineConfig, zoom: f32) -> Option<BlockPart> {
    let shape = block.shape();
    let full = config.lod(zoom) == Lod::Full;
    let zoom = zoom.max(f32::EPSILON);
    if full && shape.hit_button(p, &config.shape_button) {
        return Some(BlockPart::Button);
    }
    if full && let Some(i) = shape.hit_connector(p, config.connector_hit_radius / zoom) {
        return Some(BlockPart::Connector(i));
    }
    if let Some(edge) = shape.border_edge(p, config.border_hit_width / zoom) {
        return Some(BlockPart::Border(edge));
    }
    shape.contains(p).then_some(BlockPart::Body)
}

/// Topmost block with any part under `p`.
pub fn pick(
    scene: &Scene,
    p: Point,
    config: &EngineConfig,
    zoom: f32,
) -> Option<(BlockId, BlockPart)> {
    let order: Vec<&Block> = scene.paint_order().collect();
    order
        .iter()
        .rev()
        .find_map(|b| part_at(b, p, config, zoom).map(|part| (b.id, part)))
}

/// Topmost block whose contour contains `p`.
pub fn block_at(scene: &Scene, p: Point) -> Option<BlockId> {
    blocks_at(scene, p).first().copied()
}

/// Every block whose contour contains `p`, topmost first.
pub fn blocks_at(scene: &Scene, p: Point) -> Vec<BlockId> {
    let mut hits: Vec<BlockId> = scene
        .paint_order()
        .filter(|b| b.shape().contains(p))
        .map(|b| b.id)
        .collect();
    hits.reverse();
    hits
}

/// The block after `current` among those under `p`, in reverse insertion
/// order, wrapping around. Selection doesn't affect the order, so repeated
/// calls visit every overlapping block.
pub fn next_block_below(scene: &Scene, p: Point, current: BlockId) -> Option<BlockId> {
    let stack: Vec<BlockId> = scene
        .blocks()
        .iter()
        .rev()
        .filter(|b| b.shape().contains(p))
        .map(|b| b.id)
        .collect();
    match stack.iter().position(|&id| id == current) {
        Some(i) => Some(stack[(i + 1) % stack.len()]).filter(|&id| id != current),
        None => stack.first().copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_core::model::{ShapeKind, Snapshot};
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> BlockId {
        BlockId::intern(s)
    }

    /// Three stacked boxes overlapping at (150, 150); `c` was inserted last.
    fn stacked() -> Scene {
        Scene::from_snapshot(Snapshot {
            blocks: vec![
                Block::new(id("hit-a"), 100.0, 100.0, 200.0, 120.0),
                Block::new(id("hit-b"), 120.0, 110.0, 200.0, 120.0),
                Block::new(id("hit-c"), 130.0, 120.0, 200.0, 120.0),
            ],
            links: Vec::new(),
        })
    }

    #[test]
    fn topmost_is_last_inserted_then_selected() {
        let mut scene = stacked();
        let p = Point::new(150.0, 150.0);
        assert_eq!(block_at(&scene, p), Some(id("hit-c")));
        scene.select(Some(id("hit-a")));
        assert_eq!(blocks_at(&scene, p), vec![id("hit-a"), id("hit-c"), id("hit-b")]);
    }

    #[test]
    fn cycling_visits_every_overlapping_block() {
        let scene = stacked();
        let p = Point::new(150.0, 150.0);
        let mut seen = vec![id("hit-c")];
        let mut cur = id("hit-c");
        for _ in 0..3 {
            cur = next_block_below(&scene, p, cur).unwrap();
            seen.push(cur);
        }
        assert_eq!(seen, vec![id("hit-c"), id("hit-b"), id("hit-a"), id("hit-c")]);
    }

    #[test]
    fn cycling_alone_goes_nowhere() {
        let scene = stacked();
        assert_eq!(next_block_below(&scene, Point::new(325.0, 235.0), id("hit-c")), None);
    }

    #[test]
    fn parts_follow_priority() {
        let cfg = EngineConfig::default();
        let b = Block::new(id("hit-p"), 0.0, 0.0, 200.0, 120.0)
            .with_shape(ShapeKind::RoundedRect);
        let at = |x, y| part_at(&b, Point::new(x, y), &cfg, 1.0);
        // Button sits 6px in from the top-right corner.
        assert_eq!(at(187.0, 13.0), Some(BlockPart::Button));
        assert_eq!(at(100.0, 2.0), Some(BlockPart::Connector(0)));
        assert_eq!(at(40.0, 1.0), Some(BlockPart::Border(BorderEdge::N)));
        assert_eq!(at(60.0, 60.0), Some(BlockPart::Body));
        assert_eq!(at(260.0, 60.0), None);
    }

    #[test]
    fn button_and_connectors_need_full_detail() {
        let cfg = EngineConfig::default();
        let b = Block::new(id("hit-l"), 0.0, 0.0, 200.0, 120.0)
            .with_shape(ShapeKind::RoundedRect);
        let button = Point::new(187.0, 13.0);
        assert_eq!(part_at(&b, button, &cfg, 0.7), Some(BlockPart::Button));
        assert_eq!(part_at(&b, button, &cfg, 0.5), Some(BlockPart::Body));
        // The wider band at constellation zoom reaches the corner.
        assert_eq!(part_at(&b, button, &cfg, 0.3), Some(BlockPart::Border(BorderEdge::NE)));
        let connector = Point::new(100.0, 12.0);
        assert_eq!(part_at(&b, connector, &cfg, 0.7), Some(BlockPart::Connector(0)));
        assert_eq!(part_at(&b, connector, &cfg, 0.5), Some(BlockPart::Body));
    }

    #[test]
    fn tolerances_scale_with_zoom() {
        let cfg = EngineConfig::default();
        let b = Block::new(id("hit-z"), 0.0, 0.0, 200.0, 120.0);
        let p = Point::new(40.0, 5.0);
        assert_eq!(part_at(&b, p, &cfg, 1.0), Some(BlockPart::Body));
        assert_eq!(part_at(&b, p, &cfg, 0.5), Some(BlockPart::Border(BorderEdge::N)));
    }
}
