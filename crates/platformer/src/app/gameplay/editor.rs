use engine::Vec2;

use super::entity::DEFAULT_BOUNCE_FORCE;
use super::{Aabb, Character, Entity, EntityTag, PlatformerWorld};

pub(crate) const DEFAULT_PLATFORM_SIZE: Vec2 = Vec2::new(120.0, 20.0);
const ERASE_PROBE_SIZE: Vec2 = Vec2::new(10.0, 10.0);
const QUICK_PLACE_GAP: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tool {
    Solid,
    Trampoline,
    Star,
    PlayerStart,
    Erase,
}

/// What a tool does with a click position.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ToolAction {
    Place(fn(Vec2) -> Entity),
    Erase,
}

impl Tool {
    pub(crate) const PALETTE: [Tool; 5] = [
        Tool::Solid,
        Tool::Trampoline,
        Tool::Star,
        Tool::PlayerStart,
        Tool::Erase,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            Tool::Solid => "platform",
            Tool::Trampoline => "trampoline",
            Tool::Star => "star",
            Tool::PlayerStart => "player start",
            Tool::Erase => "erase",
        }
    }

    pub(crate) fn action(self) -> ToolAction {
        match self {
            Tool::Solid => ToolAction::Place(default_platform),
            Tool::Trampoline => ToolAction::Place(default_trampoline),
            Tool::Star => ToolAction::Place(Entity::star),
            Tool::PlayerStart => ToolAction::Place(Entity::player_start),
            Tool::Erase => ToolAction::Erase,
        }
    }

    pub(crate) fn next(self) -> Self {
        let index = self.palette_index();
        Self::PALETTE[(index + 1) % Self::PALETTE.len()]
    }

    pub(crate) fn previous(self) -> Self {
        let index = self.palette_index();
        Self::PALETTE[(index + Self::PALETTE.len() - 1) % Self::PALETTE.len()]
    }

    fn palette_index(self) -> usize {
        Self::PALETTE
            .iter()
            .position(|tool| *tool == self)
            .unwrap_or(0)
    }
}

pub(crate) fn default_platform(position: Vec2) -> Entity {
    Entity::solid(position, DEFAULT_PLATFORM_SIZE.x, DEFAULT_PLATFORM_SIZE.y)
}

pub(crate) fn default_trampoline(position: Vec2) -> Entity {
    Entity::trampoline(position, DEFAULT_BOUNCE_FORCE)
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EditOutcome {
    Placed {
        index: usize,
        tag: EntityTag,
        /// Prior player-start markers removed to keep at most one.
        evicted: usize,
    },
    Erased {
        index: usize,
        entity: Entity,
    },
    Missed,
}

pub(crate) fn apply_tool(world: &mut PlatformerWorld, tool: Tool, position: Vec2) -> EditOutcome {
    match tool.action() {
        ToolAction::Place(construct) => place_entity(world, construct(position)),
        ToolAction::Erase => erase_at(world, position),
    }
}

/// Appends `entity`. A new player-start first evicts every existing one.
pub(crate) fn place_entity(world: &mut PlatformerWorld, entity: Entity) -> EditOutcome {
    let tag = entity.tag();
    let evicted = if tag == EntityTag::PlayerStart {
        world.remove_where(|existing| existing.tag() == EntityTag::PlayerStart)
    } else {
        0
    };
    let index = world.push(entity);
    EditOutcome::Placed {
        index,
        tag,
        evicted,
    }
}

/// Removes the most recently inserted entity under a small probe centered on `position`.
pub(crate) fn erase_at(world: &mut PlatformerWorld, position: Vec2) -> EditOutcome {
    let probe = Aabb::centered(position, ERASE_PROBE_SIZE);
    let hit = world
        .entities()
        .iter()
        .rposition(|entity| entity.bounds().intersects(&probe));
    match hit.and_then(|index| world.remove_at(index).map(|entity| (index, entity))) {
        Some((index, entity)) => EditOutcome::Erased { index, entity },
        None => EditOutcome::Missed,
    }
}

/// Keyboard placement spot: just ahead of the character, flush with its feet.
pub(crate) fn quick_place_position(character: &Character) -> Vec2 {
    let bounds = character.bounds();
    Vec2::new(bounds.right() + QUICK_PLACE_GAP, bounds.bottom())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EditorState {
    enabled: bool,
    active_tool: Tool,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            enabled: false,
            active_tool: Tool::Solid,
        }
    }
}

impl EditorState {
    pub(crate) fn enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn active_tool(&self) -> Tool {
        self.active_tool
    }

    pub(crate) fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    pub(crate) fn select_next_tool(&mut self) -> Tool {
        self.active_tool = self.active_tool.next();
        self.active_tool
    }

    pub(crate) fn select_previous_tool(&mut self) -> Tool {
        self.active_tool = self.active_tool.previous();
        self.active_tool
    }
}

#[cfg(test)]
mod tests {
    use super::super::{EntityKind, PhysicsConfig};
    use super::*;

    fn empty_world() -> PlatformerWorld {
        PlatformerWorld::new(
            PhysicsConfig::default().spawn_character(Vec2::new(100.0, 100.0)),
            Vec2::new(10.0, 10.0),
        )
    }

    #[test]
    fn second_player_start_evicts_first() {
        let mut world = empty_world();
        apply_tool(&mut world, Tool::Solid, Vec2::new(0.0, 0.0));
        apply_tool(&mut world, Tool::PlayerStart, Vec2::new(20.0, 30.0));
        apply_tool(&mut world, Tool::Star, Vec2::new(300.0, 30.0));

        let outcome = apply_tool(&mut world, Tool::PlayerStart, Vec2::new(50.0, 80.0));

        assert_eq!(
            outcome,
            EditOutcome::Placed {
                index: 2,
                tag: EntityTag::PlayerStart,
                evicted: 1,
            }
        );
        assert_eq!(world.count_tag(EntityTag::PlayerStart), 1);
        assert_eq!(world.start_position(), Vec2::new(50.0, 80.0));
        let tags: Vec<EntityTag> = world.entities().iter().map(Entity::tag).collect();
        assert_eq!(
            tags,
            vec![EntityTag::Solid, EntityTag::Star, EntityTag::PlayerStart]
        );
    }

    #[test]
    fn placement_uses_tool_defaults() {
        let mut world = empty_world();
        apply_tool(&mut world, Tool::Solid, Vec2::new(5.0, 6.0));
        apply_tool(&mut world, Tool::Trampoline, Vec2::new(7.0, 8.0));

        assert_eq!(
            world.entities()[0].kind(),
            &EntityKind::Solid {
                width: 120.0,
                height: 20.0,
            }
        );
        assert_eq!(
            world.entities()[1].kind(),
            &EntityKind::Trampoline {
                bounce_force: DEFAULT_BOUNCE_FORCE,
            }
        );
        assert_eq!(world.entities()[1].position, Vec2::new(7.0, 8.0));
    }

    #[test]
    fn erase_removes_only_most_recent_overlap() {
        let mut world = empty_world();
        world.push(Entity::solid(Vec2::new(0.0, 0.0), 100.0, 100.0));
        world.push(Entity::star(Vec2::new(40.0, 40.0)));
        world.push(Entity::star(Vec2::new(400.0, 400.0)));

        let outcome = erase_at(&mut world, Vec2::new(50.0, 50.0));

        match outcome {
            EditOutcome::Erased { index, entity } => {
                assert_eq!(index, 1);
                assert_eq!(entity.tag(), EntityTag::Star);
            }
            other => panic!("expected erase, got {other:?}"),
        }
        assert_eq!(world.entity_count(), 2);
        assert_eq!(world.entities()[0].tag(), EntityTag::Solid);
    }

    #[test]
    fn erase_on_empty_space_misses() {
        let mut world = empty_world();
        world.push(Entity::star(Vec2::new(400.0, 400.0)));

        assert_eq!(erase_at(&mut world, Vec2::new(10.0, 10.0)), EditOutcome::Missed);
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn erase_probe_catches_entity_just_beside_the_click() {
        let mut world = empty_world();
        world.push(Entity::star(Vec2::new(100.0, 100.0)));

        // click is left of the star; the probe spans 91..101 on x
        assert!(matches!(
            erase_at(&mut world, Vec2::new(96.0, 110.0)),
            EditOutcome::Erased { .. }
        ));
    }

    #[test]
    fn tool_cycle_wraps_both_directions() {
        assert_eq!(Tool::Erase.next(), Tool::Solid);
        assert_eq!(Tool::Solid.previous(), Tool::Erase);
        let mut tool = Tool::Solid;
        for _ in 0..Tool::PALETTE.len() {
            tool = tool.next();
        }
        assert_eq!(tool, Tool::Solid);
    }

    #[test]
    fn editor_state_toggles_and_cycles() {
        let mut editor = EditorState::default();
        assert!(!editor.enabled());
        assert!(editor.toggle());
        assert_eq!(editor.select_previous_tool(), Tool::Erase);
        assert_eq!(editor.select_next_tool(), Tool::Solid);
        assert!(!editor.toggle());
    }

    #[test]
    fn quick_place_sits_ahead_of_character_feet() {
        let character = PhysicsConfig::default().spawn_character(Vec2::new(100.0, 200.0));
        assert_eq!(quick_place_position(&character), Vec2::new(152.0, 248.0));
    }
}
