//! Placement strategies: ordered cards + area geometry -> per-card targets.
//!
//! These are pure functions. The area feeds their output to each card's
//! `move_to`/`rotate` setters.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Z offset between consecutive cards of a stack.
pub const STACK_Z_STEP: f32 = 0.01;
/// Gap between neighbouring cells of a grid, in both directions.
pub const GRID_SPACING: f32 = 0.1;
/// Angular spread contributed by each card of a fan.
pub const FAN_SPREAD_PER_CARD: f32 = PI / 40.0;
/// Widest a fan may open.
pub const FAN_MAX_SPREAD: f32 = FRAC_PI_4;
/// Z offset between consecutive cards of a fan.
pub const FAN_Z_STEP: f32 = 0.005;
/// Arc angle of the fan's middle card. Angles are measured clockwise from +x
/// (positions use `(cos, -sin)`), so this points straight up.
pub const FAN_CENTER_ANGLE: f32 = -FRAC_PI_2;

/// How an area arranges its member cards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementStrategy {
    #[default]
    Stack,
    Grid,
    Fan,
}

/// World position and footprint of the area being laid out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AreaFrame {
    pub position: Vec3,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardSize {
    pub width: f32,
    pub height: f32,
}

/// Target transform for one card.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slot {
    pub position: Vec3,
    /// In-plane rotation in radians.
    pub rotation: f32,
}

/// Compute one slot per card, in member order.
pub fn arrange(strategy: PlacementStrategy, frame: &AreaFrame, cards: &[CardSize]) -> Vec<Slot> {
    match strategy {
        PlacementStrategy::Stack => stack(frame, cards.len()),
        PlacementStrategy::Grid => grid(frame, cards),
        PlacementStrategy::Fan => fan(frame, cards.len()),
    }
}

/// Everything on the area centre; later cards sit higher.
pub fn stack(frame: &AreaFrame, count: usize) -> Vec<Slot> {
    (0..count)
        .map(|index| Slot {
            position: frame.position + Vec3::new(0.0, 0.0, index as f32 * STACK_Z_STEP),
            rotation: 0.0,
        })
        .collect()
}

/// Number of grid columns that fit across `area_width`.
///
/// Never less than one, so oversized cards still get a single column.
pub fn grid_columns(area_width: f32, card_width: f32) -> usize {
    let fit = ((area_width + GRID_SPACING) / (card_width + GRID_SPACING)).floor();
    if fit >= 1.0 {
        fit as usize
    } else {
        log::warn!("card width {card_width} exceeds area width {area_width}; using one column");
        1
    }
}

/// Row-major grid, full rows first, with the occupied bounding box centred on
/// the area. The first card's size stands in for every card.
pub fn grid(frame: &AreaFrame, cards: &[CardSize]) -> Vec<Slot> {
    let Some(first) = cards.first() else {
        return Vec::new();
    };

    let card_w = first.width;
    let card_h = first.height;
    let count = cards.len();
    let columns = grid_columns(frame.width, card_w);
    let used_columns = columns.min(count);
    let rows = count.div_ceil(columns);

    let grid_w = used_columns as f32 * card_w + (used_columns - 1) as f32 * GRID_SPACING;
    let grid_h = rows as f32 * card_h + (rows - 1) as f32 * GRID_SPACING;
    let left = frame.position.x - grid_w / 2.0 + card_w / 2.0;
    let top = frame.position.y + grid_h / 2.0 - card_h / 2.0;

    (0..count)
        .map(|index| {
            let row = index / columns;
            let column = index % columns;
            Slot {
                position: Vec3::new(
                    left + column as f32 * (card_w + GRID_SPACING),
                    top - row as f32 * (card_h + GRID_SPACING),
                    frame.position.z,
                ),
                rotation: 0.0,
            }
        })
        .collect()
}

/// Total angle a fan of `count` cards covers.
pub fn fan_spread(count: usize) -> f32 {
    (FAN_SPREAD_PER_CARD * count as f32).min(FAN_MAX_SPREAD)
}

/// Arc angle of the card at `index` in a fan of `count`.
pub fn fan_angle(index: usize, count: usize) -> f32 {
    if count <= 1 {
        return FAN_CENTER_ANGLE;
    }
    let spread = fan_spread(count);
    FAN_CENTER_ANGLE - spread / 2.0 + spread * index as f32 / (count - 1) as f32
}

/// Hand of cards along an arc whose radius is the area width. The pivot sits
/// one radius below the area centre, so the middle of the arc is the centre.
///
/// Arc angles run clockwise (`pivot + r(cos a, -sin a)`) while card rotation is
/// counter-clockwise, so each card turns by `-(a + π/2)` and leans outward.
pub fn fan(frame: &AreaFrame, count: usize) -> Vec<Slot> {
    let radius = frame.width;
    let pivot = frame.position - Vec3::new(0.0, radius, 0.0);

    (0..count)
        .map(|index| {
            let angle = fan_angle(index, count);
            Slot {
                position: pivot
                    + Vec3::new(
                        radius * angle.cos(),
                        -radius * angle.sin(),
                        index as f32 * FAN_Z_STEP,
                    ),
                rotation: -(angle + FRAC_PI_2),
            }
        })
        .collect()
}
