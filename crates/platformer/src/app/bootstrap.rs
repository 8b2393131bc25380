use std::path::PathBuf;

use engine::{resolve_app_paths, LoopConfig, MetricsHandle, Scene};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::gameplay::{PhysicsConfig, PlatformerScene, WORLD_SIZE};
use super::level_store::{FileLevelRepository, LevelRepository, MemoryLevelRepository};

const LEVEL_DIR_ENV_VAR: &str = "PLATFORMER_LEVEL_DIR";
const TPS_ENV_VAR: &str = "PLATFORMER_TPS";
const MAX_TPS: u32 = 1000;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
    pub(crate) metrics: MetricsHandle,
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!("=== Platformer Startup ===");

    let mut config = LoopConfig {
        window_width: WORLD_SIZE.x as u32,
        window_height: WORLD_SIZE.y as u32,
        ..LoopConfig::default()
    };
    if let Some(target_tps) = tps_from_env() {
        config.target_tps = target_tps;
    }

    let metrics = MetricsHandle::default();
    let (repository, store_notice) = open_level_repository();
    let mut scene =
        PlatformerScene::new(repository, PhysicsConfig::default()).with_metrics(metrics.clone());
    if let Some(notice) = store_notice {
        scene = scene.with_store_notice(notice);
    }

    AppWiring {
        config,
        scene: Box::new(scene),
        metrics,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// File store in the level directory, or an in-memory store plus a notice for the player when
/// no directory can be used.
fn open_level_repository() -> (Box<dyn LevelRepository>, Option<String>) {
    let dir = match level_dir() {
        Some(dir) => dir,
        None => {
            return (
                Box::new(MemoryLevelRepository::default()),
                Some(memory_store_notice("no level directory")),
            )
        }
    };
    match FileLevelRepository::open(&dir) {
        Ok(repository) => {
            info!(path = %repository.path().display(), "level_store_opened");
            (Box::new(repository), None)
        }
        Err(error) => {
            warn!(error = %error, "level_store_unavailable_using_memory");
            (
                Box::new(MemoryLevelRepository::default()),
                Some(memory_store_notice(&error.to_string())),
            )
        }
    }
}

fn memory_store_notice(reason: &str) -> String {
    format!("levels are not saved to disk ({reason})")
}

fn level_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(LEVEL_DIR_ENV_VAR).filter(|raw| !raw.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    match resolve_app_paths() {
        Ok(paths) => Some(paths.data_dir),
        Err(error) => {
            warn!(error = %error, "app_paths_unresolved_using_memory");
            None
        }
    }
}

fn tps_from_env() -> Option<u32> {
    let raw = std::env::var(TPS_ENV_VAR).ok()?;
    let parsed = parse_tps(&raw);
    if parsed.is_none() {
        warn!(value = %raw, var = TPS_ENV_VAR, "invalid_tps_ignored");
    }
    parsed
}

fn parse_tps(raw: &str) -> Option<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|tps| (1..=MAX_TPS).contains(tps))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tps_accepts_positive_rates_in_range() {
        assert_eq!(parse_tps("120"), Some(120));
        assert_eq!(parse_tps(" 30 "), Some(30));
    }

    #[test]
    fn memory_store_notice_names_the_reason() {
        let notice = memory_store_notice("parse level store 'levels.json' at .: eof");
        assert!(notice.starts_with("levels are not saved to disk"));
        assert!(notice.contains("levels.json"));
    }

    #[test]
    fn parse_tps_rejects_zero_garbage_and_huge_values() {
        assert_eq!(parse_tps("0"), None);
        assert_eq!(parse_tps("fast"), None);
        assert_eq!(parse_tps("-5"), None);
        assert_eq!(parse_tps("5000"), None);
    }
}
