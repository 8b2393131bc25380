use engine::Vec2;

use super::entity::DEFAULT_BOUNCE_FORCE;
use super::Entity;

pub(crate) const DEMO_START: Vec2 = Vec2::new(140.0, 380.0);

/// Fixed arrangement used to seed an empty store: a floor, three rising ledges, two floor
/// trampolines and a star above each ledge plus one only reachable by bouncing.
pub(crate) fn demo_level() -> Vec<Entity> {
    vec![
        Entity::solid(Vec2::new(0.0, 560.0), 800.0, 40.0),
        Entity::solid(Vec2::new(120.0, 450.0), 150.0, 20.0),
        Entity::solid(Vec2::new(340.0, 360.0), 150.0, 20.0),
        Entity::solid(Vec2::new(560.0, 270.0), 150.0, 20.0),
        Entity::trampoline(Vec2::new(40.0, 544.0), DEFAULT_BOUNCE_FORCE),
        Entity::trampoline(Vec2::new(700.0, 544.0), DEFAULT_BOUNCE_FORCE),
        Entity::star(Vec2::new(185.0, 410.0)),
        Entity::star(Vec2::new(405.0, 320.0)),
        Entity::star(Vec2::new(625.0, 230.0)),
        Entity::star(Vec2::new(720.0, 120.0)),
    ]
}

#[cfg(test)]
mod tests {
    use super::super::{EntityTag, PhysicsConfig, PlatformerWorld, WORLD_SIZE};
    use super::*;

    #[test]
    fn demo_level_has_every_placeable_kind_except_start() {
        let mut world = PlatformerWorld::new(
            PhysicsConfig::default().spawn_character(DEMO_START),
            DEMO_START,
        );
        world.replace(demo_level(), DEMO_START);

        assert_eq!(world.count_tag(EntityTag::Solid), 4);
        assert_eq!(world.count_tag(EntityTag::Trampoline), 2);
        assert_eq!(world.count_tag(EntityTag::Star), 4);
        assert_eq!(world.count_tag(EntityTag::PlayerStart), 0);
        assert_eq!(world.start_position(), DEMO_START);
    }

    #[test]
    fn demo_entities_fit_inside_world() {
        for entity in demo_level() {
            let bounds = entity.bounds();
            assert!(bounds.left() >= 0.0 && bounds.right() <= WORLD_SIZE.x);
            assert!(bounds.top() >= 0.0 && bounds.bottom() <= WORLD_SIZE.y);
        }
    }
}
