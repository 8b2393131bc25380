use engine::Vec2;

use super::Aabb;

/// The single player-controlled body. Created once per session and only repositioned after that.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Character {
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) on_ground: bool,
    speed: f32,
    size: Vec2,
}

impl Character {
    pub(crate) fn new(position: Vec2, speed: f32, size: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            on_ground: false,
            speed,
            size,
        }
    }

    pub(crate) fn speed(&self) -> f32 {
        self.speed
    }

    pub(crate) fn size(&self) -> Vec2 {
        self.size
    }

    pub(crate) fn bounds(&self) -> Aabb {
        Aabb::new(self.position, self.size)
    }

    pub(crate) fn bottom(&self) -> f32 {
        self.position.y + self.size.y
    }

    /// Puts the bottom edge exactly on `surface_y`.
    pub(crate) fn rest_on(&mut self, surface_y: f32) {
        self.position.y = surface_y - self.size.y;
    }

    pub(crate) fn respawn(&mut self, position: Vec2) {
        self.position = position;
        self.velocity = Vec2::ZERO;
        self.on_ground = false;
    }
}
