use engine::Vec2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::app::gameplay::{Entity, EntityKind, EntityTag, DEFAULT_BOUNCE_FORCE};

/// Persisted shape of one level. Field names match the stored JSON (`startPosition`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LevelRecord {
    pub(crate) name: String,
    #[serde(deserialize_with = "lenient_entities")]
    pub(crate) entities: Vec<EntityRecord>,
    pub(crate) start_position: SavedVec2,
}

/// One stored entity. Fields decode leniently: a wrong-typed or missing value becomes `None`
/// and is rejected by [`EntityRecord::to_entity`], so one bad record cannot fail the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EntityRecord {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub(crate) kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) x: Option<f32>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) y: Option<f32>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub(crate) width: Option<f32>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub(crate) height: Option<f32>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub(crate) bounce_force: Option<f32>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub(crate) collected: Option<bool>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Entries that are not even objects become empty records and are skipped on load.
fn lenient_entities<'de, D>(deserializer: D) -> Result<Vec<EntityRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .map(|value| serde_json::from_value(value).unwrap_or_default())
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub(crate) struct SavedVec2 {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

impl From<Vec2> for SavedVec2 {
    fn from(value: Vec2) -> Self {
        Self {
            x: value.x,
            y: value.y,
        }
    }
}

impl From<SavedVec2> for Vec2 {
    fn from(value: SavedVec2) -> Self {
        Vec2::new(value.x, value.y)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub(crate) enum RecordError {
    #[error("unknown entity type '{0}'")]
    UnknownType(String),
    #[error("missing or invalid field '{field}' for {kind} entity")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },
    #[error("validation failed at {field}: expected {expected}, got {actual}")]
    InvalidValue {
        field: &'static str,
        expected: &'static str,
        actual: f32,
    },
}

impl EntityRecord {
    pub(crate) fn from_entity(entity: &Entity) -> Self {
        let mut record = Self {
            kind: Some(entity.tag().as_str().to_string()),
            x: Some(entity.position.x),
            y: Some(entity.position.y),
            width: None,
            height: None,
            bounce_force: None,
            collected: None,
        };
        match entity.kind() {
            EntityKind::Solid { width, height } => {
                record.width = Some(*width);
                record.height = Some(*height);
            }
            EntityKind::Trampoline { bounce_force } => record.bounce_force = Some(*bounce_force),
            EntityKind::Star { collected } => record.collected = Some(*collected),
            EntityKind::PlayerStart => {}
        }
        record
    }

    /// Rebuilds the typed entity. A trampoline without a stored force gets the default one and a
    /// star without a flag starts uncollected; a solid must carry both dimensions.
    pub(crate) fn to_entity(&self) -> Result<Entity, RecordError> {
        let kind = self.kind.as_deref().ok_or(RecordError::MissingField {
            kind: "untyped",
            field: "type",
        })?;
        let tag =
            EntityTag::parse(kind).ok_or_else(|| RecordError::UnknownType(kind.to_string()))?;
        let x = finite("x", required(tag, "x", self.x)?)?;
        let y = finite("y", required(tag, "y", self.y)?)?;
        let kind = match tag {
            EntityTag::Solid => {
                let width = required(tag, "width", self.width)?;
                let height = required(tag, "height", self.height)?;
                EntityKind::Solid {
                    width: positive("width", width)?,
                    height: positive("height", height)?,
                }
            }
            EntityTag::Trampoline => EntityKind::Trampoline {
                bounce_force: finite(
                    "bounceForce",
                    self.bounce_force.unwrap_or(DEFAULT_BOUNCE_FORCE),
                )?,
            },
            EntityTag::Star => EntityKind::Star {
                collected: self.collected.unwrap_or(false),
            },
            EntityTag::PlayerStart => EntityKind::PlayerStart,
        };
        Ok(Entity::new(Vec2::new(x, y), kind))
    }
}

fn required(tag: EntityTag, field: &'static str, value: Option<f32>) -> Result<f32, RecordError> {
    value.ok_or(RecordError::MissingField {
        kind: tag.as_str(),
        field,
    })
}

fn finite(field: &'static str, value: f32) -> Result<f32, RecordError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RecordError::InvalidValue {
            field,
            expected: "finite number",
            actual: value,
        })
    }
}

fn positive(field: &'static str, value: f32) -> Result<f32, RecordError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(RecordError::InvalidValue {
            field,
            expected: "positive number",
            actual: value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: &str) -> EntityRecord {
        EntityRecord {
            kind: Some(kind.to_string()),
            x: Some(10.0),
            y: Some(20.0),
            ..EntityRecord::default()
        }
    }

    #[test]
    fn json_uses_wire_field_names_and_omits_absent_fields() {
        let level = LevelRecord {
            name: "One".to_string(),
            entities: vec![
                EntityRecord::from_entity(&Entity::trampoline(Vec2::new(1.0, 2.0), -18.0)),
                EntityRecord::from_entity(&Entity::player_start(Vec2::new(3.0, 4.0))),
            ],
            start_position: Vec2::new(5.0, 6.0).into(),
        };

        let json = serde_json::to_value(&level).expect("encode");

        assert_eq!(json["startPosition"]["x"], 5.0);
        assert_eq!(json["entities"][0]["type"], "trampoline");
        assert_eq!(json["entities"][0]["bounceForce"], -18.0);
        assert_eq!(
            json["entities"][1],
            serde_json::json!({ "type": "playerStart", "x": 3.0, "y": 4.0 })
        );
    }

    #[test]
    fn every_kind_survives_record_conversion() {
        let entities = vec![
            Entity::solid(Vec2::new(0.0, 560.0), 800.0, 40.0),
            Entity::trampoline(Vec2::new(40.0, 544.0), -22.0),
            Entity::new(Vec2::new(5.0, 5.0), EntityKind::Star { collected: true }),
            Entity::player_start(Vec2::new(50.0, 80.0)),
        ];
        for entity in entities {
            let rebuilt = EntityRecord::from_entity(&entity)
                .to_entity()
                .expect("rebuild");
            assert_eq!(rebuilt.position, entity.position);
            assert_eq!(rebuilt.kind(), entity.kind());
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert_eq!(
            record("cloud").to_entity(),
            Err(RecordError::UnknownType("cloud".to_string()))
        );
    }

    #[test]
    fn solid_without_dimensions_is_rejected() {
        let mut solid = record("solid");
        solid.width = Some(40.0);
        assert_eq!(
            solid.to_entity(),
            Err(RecordError::MissingField {
                kind: "solid",
                field: "height",
            })
        );
    }

    #[test]
    fn non_positive_solid_size_is_rejected() {
        let mut solid = record("solid");
        solid.width = Some(0.0);
        solid.height = Some(10.0);
        assert!(matches!(
            solid.to_entity(),
            Err(RecordError::InvalidValue { field: "width", .. })
        ));
    }

    #[test]
    fn optional_fields_fall_back_to_defaults() {
        let trampoline = record("trampoline").to_entity().expect("trampoline");
        assert_eq!(
            trampoline.kind(),
            &EntityKind::Trampoline {
                bounce_force: DEFAULT_BOUNCE_FORCE,
            }
        );
        let star = record("star").to_entity().expect("star");
        assert!(!star.is_collected());
    }

    #[test]
    fn non_finite_position_is_rejected() {
        let mut star = record("star");
        star.y = Some(f32::NAN);
        assert!(matches!(
            star.to_entity(),
            Err(RecordError::InvalidValue { field: "y", .. })
        ));
    }

    #[test]
    fn malformed_entity_fields_decode_into_a_skippable_record() {
        let level: LevelRecord = serde_json::from_value(serde_json::json!({
            "name": "Bad",
            "entities": [
                { "type": "star", "x": 1.0, "y": 2.0 },
                { "type": "star", "x": null, "y": 2.0 },
                { "type": "solid", "x": "left", "y": 0.0, "width": 10.0, "height": 4.0 },
                { "type": 7, "x": 0.0, "y": 0.0 },
                42
            ],
            "startPosition": { "x": 0.0, "y": 0.0 }
        }))
        .expect("decode");

        assert_eq!(level.entities.len(), 5);
        assert!(level.entities[0].to_entity().is_ok());
        assert_eq!(
            level.entities[1].to_entity(),
            Err(RecordError::MissingField {
                kind: "star",
                field: "x",
            })
        );
        assert!(matches!(
            level.entities[2].to_entity(),
            Err(RecordError::MissingField { field: "x", .. })
        ));
        assert!(matches!(
            level.entities[3].to_entity(),
            Err(RecordError::MissingField { field: "type", .. })
        ));
        assert_eq!(level.entities[4], EntityRecord::default());
    }
}
