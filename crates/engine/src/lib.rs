use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod storage;

pub use app::{
    run_app, run_app_with_metrics, screen_to_world_px, world_to_screen_px, AppError,
    CommandStates, DrawList, DrawRect, InputAction, InputCommand, InputSnapshot,
    LoopConfig, LoopMetricsSnapshot, MetricsHandle, Renderer, Scene, SceneCommand, Vec2, Viewport,
};
pub use storage::{write_bytes_atomic, write_text_atomic};

pub const ROOT_ENV_VAR: &str = "PLATFORMER_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub data_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("read {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("resolve executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("create data directory '{path}': {source}")]
    CreateDataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("PLATFORMER_ROOT={path} has no Cargo.toml beside crates/ or assets/")]
    InvalidEnvRoot { path: PathBuf },
    #[error("no project root above {start_dir}; set PLATFORMER_ROOT to the checkout directory")]
    RootNotFound { start_dir: PathBuf },
}

/// Resolves the project root and makes sure `<root>/data` exists.
pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir).map_err(|source| StartupError::CreateDataDir {
        path: data_dir.clone(),
        source,
    })?;
    Ok(AppPaths { root, data_dir })
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var_os(ROOT_ENV_VAR) {
        Some(raw) => {
            let path = canonical_or_raw(Path::new(&raw));
            if is_project_root(&path) {
                Ok(path)
            } else {
                Err(StartupError::InvalidEnvRoot { path })
            }
        }
        None => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let start_dir = exe.parent().unwrap_or(&exe).to_path_buf();
            find_project_root(&start_dir).ok_or_else(|| StartupError::RootNotFound {
                start_dir: canonical_or_raw(&start_dir),
            })
        }
    }
}

/// Nearest ancestor of `start` (inclusive) that looks like the workspace checkout.
fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|candidate| is_project_root(candidate))
        .map(canonical_or_raw)
}

fn is_project_root(path: &Path) -> bool {
    path.join("Cargo.toml").is_file()
        && (path.join("crates").is_dir() || path.join("assets").is_dir())
}

fn canonical_or_raw(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
