//! Initial world population.
//!
//! Stands in for the external world-initialization collaborator: seeds
//! the item set and the static obstacle layout once at session start.

use rand::Rng;
use shared::{Item, ItemKind, Obstacle, ObstacleKind, Position, MAX_ITEMS, WORLD_HEIGHT, WORLD_WIDTH};

/// Scatters `count` items uniformly over the world, roughly 70% debris
/// and 30% valuables. Ids are `item-<n>`.
pub fn scatter_items(count: usize, rng: &mut impl Rng) -> Vec<Item> {
    let count = count.min(MAX_ITEMS);
    (0..count)
        .map(|n| Item {
            id: format!("item-{}", n),
            kind: if rng.gen_bool(0.7) {
                ItemKind::Debris
            } else {
                ItemKind::Valuable
            },
            position: Position {
                x: rng.gen_range(0.0..WORLD_WIDTH),
                y: rng.gen_range(0.0..WORLD_HEIGHT),
            },
            cleaned: false,
        })
        .collect()
}

/// Static obstacle layout for the single shared room.
pub fn default_obstacles() -> Vec<Obstacle> {
    vec![
        Obstacle {
            kind: ObstacleKind::Rock,
            position: Position { x: 150.0, y: 120.0 },
        },
        Obstacle {
            kind: ObstacleKind::Wreck,
            position: Position {
                x: WORLD_WIDTH / 2.0,
                y: WORLD_HEIGHT / 2.0,
            },
        },
        Obstacle {
            kind: ObstacleKind::Crater,
            position: Position { x: 620.0, y: 470.0 },
        },
    ]
}
