use engine::Vec2;

use super::{Character, CHARACTER_SIZE};

pub(crate) const TRAMPOLINE_SIZE: Vec2 = Vec2::new(64.0, 16.0);
pub(crate) const STAR_SIZE: Vec2 = Vec2::new(24.0, 24.0);
pub(crate) const PLAYER_START_SIZE: Vec2 = CHARACTER_SIZE;
pub(crate) const DEFAULT_BOUNCE_FORCE: f32 = -18.0;
const COLLECTED_STAR_ALPHA: f32 = 0.3;
const SQUASH_SCALE: Vec2 = Vec2::new(1.2, 0.8);
const SQUASH_DURATION_SECONDS: f32 = 0.15;

/// Axis-aligned box in world coordinates; `position` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Aabb {
    pub(crate) position: Vec2,
    pub(crate) size: Vec2,
}

impl Aabb {
    pub(crate) fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    pub(crate) fn centered(center: Vec2, size: Vec2) -> Self {
        Self::new(center - size * 0.5, size)
    }

    pub(crate) fn left(&self) -> f32 {
        self.position.x
    }

    pub(crate) fn right(&self) -> f32 {
        self.position.x + self.size.x
    }

    pub(crate) fn top(&self) -> f32 {
        self.position.y
    }

    pub(crate) fn bottom(&self) -> f32 {
        self.position.y + self.size.y
    }

    pub(crate) fn overlaps_horizontally(&self, other: &Aabb) -> bool {
        self.left() < other.right() && self.right() > other.left()
    }

    pub(crate) fn intersects(&self, other: &Aabb) -> bool {
        self.overlaps_horizontally(other)
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

/// Wire discriminator for the closed set of placeable kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum EntityTag {
    Solid,
    Trampoline,
    Star,
    PlayerStart,
}

impl EntityTag {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            EntityTag::Solid => "solid",
            EntityTag::Trampoline => "trampoline",
            EntityTag::Star => "star",
            EntityTag::PlayerStart => "playerStart",
        }
    }

    pub(crate) fn parse(raw: &str) -> Option<Self> {
        match raw {
            "solid" => Some(EntityTag::Solid),
            "trampoline" => Some(EntityTag::Trampoline),
            "star" => Some(EntityTag::Star),
            "playerStart" => Some(EntityTag::PlayerStart),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EntityKind {
    Solid { width: f32, height: f32 },
    /// `bounce_force` is negative; its magnitude is the upward impulse.
    Trampoline { bounce_force: f32 },
    Star { collected: bool },
    PlayerStart,
}

impl EntityKind {
    pub(crate) fn tag(&self) -> EntityTag {
        match self {
            EntityKind::Solid { .. } => EntityTag::Solid,
            EntityKind::Trampoline { .. } => EntityTag::Trampoline,
            EntityKind::Star { .. } => EntityTag::Star,
            EntityKind::PlayerStart => EntityTag::PlayerStart,
        }
    }

    pub(crate) fn size(&self) -> Vec2 {
        match self {
            EntityKind::Solid { width, height } => Vec2::new(*width, *height),
            EntityKind::Trampoline { .. } => TRAMPOLINE_SIZE,
            EntityKind::Star { .. } => STAR_SIZE,
            EntityKind::PlayerStart => PLAYER_START_SIZE,
        }
    }
}

/// Cosmetic state only; nothing here feeds back into physics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EntityVisual {
    alpha: f32,
    squash_remaining_seconds: f32,
}

impl EntityVisual {
    fn for_kind(kind: &EntityKind) -> Self {
        let alpha = match kind {
            EntityKind::Star { collected: true } => COLLECTED_STAR_ALPHA,
            _ => 1.0,
        };
        Self {
            alpha,
            squash_remaining_seconds: 0.0,
        }
    }

    pub(crate) fn alpha(&self) -> f32 {
        self.alpha
    }

    pub(crate) fn scale(&self) -> Vec2 {
        if self.squash_remaining_seconds > 0.0 {
            SQUASH_SCALE
        } else {
            Vec2::new(1.0, 1.0)
        }
    }

    fn start_squash(&mut self) {
        self.squash_remaining_seconds = SQUASH_DURATION_SECONDS;
    }

    fn tick(&mut self, dt_seconds: f32) {
        self.squash_remaining_seconds = (self.squash_remaining_seconds - dt_seconds).max(0.0);
    }
}

/// What a contact does, decided from the entity kind and the character alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ContactResponse {
    Land { surface_y: f32 },
    Bounce { surface_y: f32, velocity_y: f32 },
    Collect,
    Ignore,
}

pub(crate) fn contact_response(kind: &EntityKind, bounds: Aabb) -> ContactResponse {
    match kind {
        EntityKind::Solid { .. } => ContactResponse::Land {
            surface_y: bounds.top(),
        },
        EntityKind::Trampoline { bounce_force } => ContactResponse::Bounce {
            surface_y: bounds.top(),
            velocity_y: *bounce_force,
        },
        EntityKind::Star { collected: false } => ContactResponse::Collect,
        EntityKind::Star { collected: true } | EntityKind::PlayerStart => ContactResponse::Ignore,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Entity {
    pub(crate) position: Vec2,
    kind: EntityKind,
    visual: EntityVisual,
}

impl Entity {
    pub(crate) fn new(position: Vec2, kind: EntityKind) -> Self {
        let visual = EntityVisual::for_kind(&kind);
        Self {
            position,
            kind,
            visual,
        }
    }

    pub(crate) fn solid(position: Vec2, width: f32, height: f32) -> Self {
        Self::new(position, EntityKind::Solid { width, height })
    }

    pub(crate) fn trampoline(position: Vec2, bounce_force: f32) -> Self {
        Self::new(position, EntityKind::Trampoline { bounce_force })
    }

    pub(crate) fn star(position: Vec2) -> Self {
        Self::new(position, EntityKind::Star { collected: false })
    }

    pub(crate) fn player_start(position: Vec2) -> Self {
        Self::new(position, EntityKind::PlayerStart)
    }

    pub(crate) fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub(crate) fn tag(&self) -> EntityTag {
        self.kind.tag()
    }

    pub(crate) fn bounds(&self) -> Aabb {
        Aabb::new(self.position, self.kind.size())
    }

    pub(crate) fn visual(&self) -> EntityVisual {
        self.visual
    }

    pub(crate) fn is_collected(&self) -> bool {
        matches!(self.kind, EntityKind::Star { collected: true })
    }

    /// Applies this entity's contact response to `character` and returns what happened.
    pub(crate) fn on_collision(&mut self, character: &mut Character) -> ContactResponse {
        let response = contact_response(&self.kind, self.bounds());
        match response {
            ContactResponse::Land { surface_y } => {
                character.velocity.y = 0.0;
                character.rest_on(surface_y);
                character.on_ground = true;
            }
            ContactResponse::Bounce {
                surface_y,
                velocity_y,
            } => {
                character.velocity.y = velocity_y;
                character.rest_on(surface_y);
                self.visual.start_squash();
            }
            ContactResponse::Collect => {
                self.kind = EntityKind::Star { collected: true };
                self.visual.alpha = COLLECTED_STAR_ALPHA;
            }
            ContactResponse::Ignore => {}
        }
        response
    }

    /// Restores a star to uncollected and opaque. Other kinds are untouched.
    pub(crate) fn reset_collectible(&mut self) {
        if let EntityKind::Star { collected } = &mut self.kind {
            *collected = false;
            self.visual.alpha = 1.0;
        }
    }

    pub(crate) fn tick_visual(&mut self, dt_seconds: f32) {
        self.visual.tick(dt_seconds);
    }
}
