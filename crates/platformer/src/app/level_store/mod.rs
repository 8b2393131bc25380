mod record;
mod repository;

use engine::Vec2;
use thiserror::Error;
use tracing::{debug, warn};

use crate::app::gameplay::{Entity, PlatformerWorld};

pub(crate) use record::{EntityRecord, LevelRecord};
pub(crate) use repository::{
    FileLevelRepository, LevelRepository, MemoryLevelRepository, StorageError,
};

/// Reserved name for the level synthesized into an empty store.
pub(crate) const DEMO_LEVEL_NAME: &str = "Demo Level";

#[derive(Debug, Error)]
pub(crate) enum LevelStoreError {
    #[error("level '{name}' not found")]
    NotFound { name: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LoadReport {
    pub(crate) name: String,
    pub(crate) entity_count: usize,
    /// Stored records that could not be rebuilt and were left out.
    pub(crate) skipped: usize,
}

/// Level save/load on top of any [`LevelRepository`].
///
/// Failures never touch the live world: a load only replaces the entity sequence after the
/// record was found and rebuilt, and a failed save leaves the repository as it was.
pub(crate) struct LevelStore<R> {
    repository: R,
}

impl<R: LevelRepository> LevelStore<R> {
    pub(crate) fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Stores `entities` under `name`, overwriting any previous record, and marks it last used.
    pub(crate) fn save(
        &mut self,
        name: &str,
        entities: &[Entity],
        start_position: Vec2,
    ) -> Result<(), LevelStoreError> {
        let record = level_record(name, entities, start_position);
        self.repository.put_as_last_used(name, record)?;
        Ok(())
    }

    pub(crate) fn load(
        &mut self,
        name: &str,
        world: &mut PlatformerWorld,
    ) -> Result<LoadReport, LevelStoreError> {
        let record = self
            .repository
            .get(name)?
            .ok_or_else(|| LevelStoreError::NotFound {
                name: name.to_string(),
            })?;

        let mut entities = Vec::with_capacity(record.entities.len());
        let mut skipped = 0usize;
        for (index, entity_record) in record.entities.iter().enumerate() {
            match entity_record.to_entity() {
                Ok(entity) => entities.push(entity),
                Err(error) => {
                    skipped += 1;
                    warn!(
                        level = %name,
                        index,
                        error = %error,
                        "level_entity_skipped"
                    );
                }
            }
        }

        let start = Vec2::from(record.start_position);
        let start = if start.is_finite() {
            start
        } else {
            warn!(level = %name, "level_start_invalid");
            world.default_start()
        };
        let entity_count = entities.len();
        world.replace(entities, start);
        world.respawn_character();

        if let Err(error) = self.set_last_used(name) {
            warn!(level = %name, error = %error, "last_used_update_failed");
        }

        Ok(LoadReport {
            name: name.to_string(),
            entity_count,
            skipped,
        })
    }

    pub(crate) fn list(&self) -> Result<Vec<String>, LevelStoreError> {
        Ok(self.repository.list()?)
    }

    pub(crate) fn delete(&mut self, name: &str) -> Result<(), LevelStoreError> {
        if self.repository.delete(name)? {
            Ok(())
        } else {
            Err(LevelStoreError::NotFound {
                name: name.to_string(),
            })
        }
    }

    pub(crate) fn last_used(&self) -> Result<Option<String>, LevelStoreError> {
        Ok(self.repository.last_used()?)
    }

    pub(crate) fn set_last_used(&mut self, name: &str) -> Result<(), LevelStoreError> {
        Ok(self.repository.set_last_used(name)?)
    }

    /// Startup policy: resume the last used level, else the first stored one. An empty store
    /// first gets the demo level saved under [`DEMO_LEVEL_NAME`].
    pub(crate) fn bootstrap(
        &mut self,
        world: &mut PlatformerWorld,
        demo_entities: &[Entity],
        demo_start: Vec2,
    ) -> Result<LoadReport, LevelStoreError> {
        let names = self.list()?;
        if names.is_empty() {
            debug!(level = DEMO_LEVEL_NAME, "seeding_demo_level");
            let record = level_record(DEMO_LEVEL_NAME, demo_entities, demo_start);
            self.repository.put(DEMO_LEVEL_NAME, record)?;
            return self.load(DEMO_LEVEL_NAME, world);
        }

        let resume = self
            .last_used()?
            .filter(|name| names.iter().any(|stored| stored == name));
        let name = match resume {
            Some(name) => name,
            None => names[0].clone(),
        };
        self.load(&name, world)
    }
}

fn level_record(name: &str, entities: &[Entity], start_position: Vec2) -> LevelRecord {
    LevelRecord {
        name: name.to_string(),
        entities: entities.iter().map(EntityRecord::from_entity).collect(),
        start_position: start_position.into(),
    }
}
