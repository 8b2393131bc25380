mod character;
mod demo;
mod editor;
mod entity;
mod physics;
mod scene;
mod world;

use engine::Vec2;

pub(crate) use character::Character;
pub(crate) use demo::{demo_level, DEMO_START};
pub(crate) use editor::{EditOutcome, EditorState};
pub(crate) use entity::{Aabb, Entity, EntityKind, EntityTag, DEFAULT_BOUNCE_FORCE};
pub(crate) use physics::MovementInput;
pub(crate) use scene::PlatformerScene;
pub(crate) use world::PlatformerWorld;

pub(crate) const WORLD_SIZE: Vec2 = Vec2::new(800.0, 600.0);
pub(crate) const CHARACTER_SIZE: Vec2 = Vec2::new(32.0, 48.0);
const GRAVITY_PER_TICK: f32 = 0.5;
const JUMP_IMPULSE: f32 = -12.0;
const MOVE_SPEED: f32 = 5.0;
const HORIZONTAL_FRICTION: f32 = 0.8;
const FALL_OFF_MARGIN: f32 = 100.0;

/// Per-tick physics constants. Velocities are in world units per tick, y grows downward.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PhysicsConfig {
    pub(crate) gravity: f32,
    pub(crate) jump_impulse: f32,
    pub(crate) move_speed: f32,
    pub(crate) friction: f32,
    pub(crate) world_size: Vec2,
    /// Absolute floor for the character's bottom edge; `None` disables the clamp.
    pub(crate) ground_line: Option<f32>,
    pub(crate) fall_margin: f32,
    pub(crate) character_size: Vec2,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY_PER_TICK,
            jump_impulse: JUMP_IMPULSE,
            move_speed: MOVE_SPEED,
            friction: HORIZONTAL_FRICTION,
            world_size: WORLD_SIZE,
            ground_line: Some(WORLD_SIZE.y),
            fall_margin: FALL_OFF_MARGIN,
            character_size: CHARACTER_SIZE,
        }
    }
}

impl PhysicsConfig {
    pub(crate) fn spawn_character(&self, position: Vec2) -> Character {
        Character::new(position, self.move_speed, self.character_size)
    }
}
