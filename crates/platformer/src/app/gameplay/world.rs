use engine::Vec2;

use super::{Character, Entity, EntityTag};

/// Live entity sequence plus the character, owned in one place.
///
/// The sequence is only changed through the operations below. Order matters: physics resolves
/// contacts in sequence order and erase picks the most recently inserted hit.
#[derive(Debug, Clone)]
pub(crate) struct PlatformerWorld {
    entities: Vec<Entity>,
    character: Character,
    default_start: Vec2,
}

impl PlatformerWorld {
    pub(crate) fn new(character: Character, default_start: Vec2) -> Self {
        Self {
            entities: Vec::new(),
            character,
            default_start,
        }
    }

    pub(crate) fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub(crate) fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub(crate) fn character(&self) -> &Character {
        &self.character
    }

    pub(crate) fn character_mut(&mut self) -> &mut Character {
        &mut self.character
    }

    pub(super) fn split_mut(&mut self) -> (&mut [Entity], &mut Character) {
        (&mut self.entities, &mut self.character)
    }

    pub(crate) fn push(&mut self, entity: Entity) -> usize {
        self.entities.push(entity);
        self.entities.len() - 1
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> Option<Entity> {
        (index < self.entities.len()).then(|| self.entities.remove(index))
    }

    pub(crate) fn remove_last(&mut self) -> Option<Entity> {
        self.entities.pop()
    }

    /// Removes every entity matching `predicate`, returning how many were removed.
    pub(crate) fn remove_where(&mut self, predicate: impl Fn(&Entity) -> bool) -> usize {
        let before = self.entities.len();
        self.entities.retain(|entity| !predicate(entity));
        before - self.entities.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entities.clear();
    }

    /// Discards the whole live sequence and installs a loaded level.
    pub(crate) fn replace(&mut self, entities: Vec<Entity>, default_start: Vec2) {
        self.entities = entities;
        self.default_start = default_start;
    }

    pub(crate) fn default_start(&self) -> Vec2 {
        self.default_start
    }

    pub(crate) fn count_tag(&self, tag: EntityTag) -> usize {
        self.entities
            .iter()
            .filter(|entity| entity.tag() == tag)
            .count()
    }

    /// The player-start marker if one is placed, else the level's stored default.
    pub(crate) fn start_position(&self) -> Vec2 {
        self.entities
            .iter()
            .rev()
            .find(|entity| entity.tag() == EntityTag::PlayerStart)
            .map(|entity| entity.position)
            .unwrap_or(self.default_start)
    }

    pub(crate) fn respawn_character(&mut self) {
        let start = self.start_position();
        self.character.respawn(start);
    }

    /// Death/fall-off reset: character back to start, every star uncollected.
    pub(crate) fn reset_world(&mut self) {
        self.respawn_character();
        for entity in &mut self.entities {
            entity.reset_collectible();
        }
    }

    pub(crate) fn tick_visuals(&mut self, dt_seconds: f32) {
        for entity in &mut self.entities {
            entity.tick_visual(dt_seconds);
        }
    }
}
