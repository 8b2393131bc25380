use engine::{InputAction, InputSnapshot};

use super::entity::ContactResponse;
use super::{Aabb, Character, Entity, EntityTag, PhysicsConfig, PlatformerWorld};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct MovementInput {
    pub(crate) left: bool,
    pub(crate) right: bool,
    pub(crate) jump: bool,
}

impl MovementInput {
    pub(crate) fn from_snapshot(input: &InputSnapshot) -> Self {
        Self {
            left: input.is_down(InputAction::MoveLeft),
            right: input.is_down(InputAction::MoveRight),
            jump: input.is_down(InputAction::Jump),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TickOutcome {
    pub(crate) jumped: bool,
    /// Index and kind of the solid/trampoline that resolved this tick, if any.
    pub(crate) landed_on: Option<(usize, EntityTag)>,
    pub(crate) stars_collected: u32,
    pub(crate) hit_ground_line: bool,
    pub(crate) fell_off: bool,
}

/// One simulation tick. The caller owns the reaction to `fell_off`.
pub(crate) fn step(
    world: &mut PlatformerWorld,
    input: MovementInput,
    config: &PhysicsConfig,
) -> TickOutcome {
    let (entities, character) = world.split_mut();
    let jumped = apply_movement_input(character, input, config);
    integrate(character, config.gravity);
    let (landed_on, stars_collected) = resolve_entity_collisions(entities, character);
    let hit_ground_line = clamp_to_ground_line(character, config.ground_line);
    clamp_horizontal(character, config.world_size.x);
    let fell_off = has_fallen_off(character, config);

    TickOutcome {
        jumped,
        landed_on,
        stars_collected,
        hit_ground_line,
        fell_off,
    }
}

/// Returns true when a jump was honored.
pub(crate) fn apply_movement_input(
    character: &mut Character,
    input: MovementInput,
    config: &PhysicsConfig,
) -> bool {
    if input.left {
        character.velocity.x = -character.speed();
    } else if input.right {
        character.velocity.x = character.speed();
    } else {
        character.velocity.x *= config.friction;
    }

    if input.jump && character.on_ground {
        character.velocity.y = config.jump_impulse;
        character.on_ground = false;
        return true;
    }
    false
}

fn integrate(character: &mut Character, gravity: f32) {
    character.velocity.y += gravity;
    character.position.x += character.velocity.x;
    character.position.y += character.velocity.y;
    // contacts and the ground clamp re-establish this every tick
    character.on_ground = false;
}

/// Landing test: horizontal overlap and the mover's bottom edge strictly inside the target's
/// vertical span. Passing beside or rising through from below never qualifies.
pub(crate) fn is_standing_on(mover: &Aabb, target: &Aabb) -> bool {
    mover.overlaps_horizontally(target)
        && mover.bottom() > target.top()
        && mover.bottom() < target.bottom()
}

/// Scans in sequence order. The first solid/trampoline hit ends the scan; stars never do.
fn resolve_entity_collisions(
    entities: &mut [Entity],
    character: &mut Character,
) -> (Option<(usize, EntityTag)>, u32) {
    let mut stars_collected = 0u32;
    for (index, entity) in entities.iter_mut().enumerate() {
        match entity.tag() {
            EntityTag::PlayerStart => continue,
            EntityTag::Star => {
                if character.bounds().intersects(&entity.bounds())
                    && entity.on_collision(character) == ContactResponse::Collect
                {
                    stars_collected += 1;
                }
            }
            tag @ (EntityTag::Solid | EntityTag::Trampoline) => {
                if character.velocity.y > 0.0
                    && is_standing_on(&character.bounds(), &entity.bounds())
                {
                    entity.on_collision(character);
                    return (Some((index, tag)), stars_collected);
                }
            }
        }
    }
    (None, stars_collected)
}

fn clamp_to_ground_line(character: &mut Character, ground_line: Option<f32>) -> bool {
    let Some(ground_y) = ground_line else {
        return false;
    };
    if character.bottom() < ground_y {
        return false;
    }
    character.rest_on(ground_y);
    character.velocity.y = 0.0;
    character.on_ground = true;
    true
}

fn clamp_horizontal(character: &mut Character, world_width: f32) {
    let max_x = (world_width - character.size().x).max(0.0);
    character.position.x = character.position.x.clamp(0.0, max_x);
}

fn has_fallen_off(character: &Character, config: &PhysicsConfig) -> bool {
    character.position.y > config.world_size.y + config.fall_margin
}
