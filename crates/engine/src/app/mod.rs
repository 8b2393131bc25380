mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::{CommandStates, InputAction, InputCommand};
pub use loop_runner::{run_app, run_app_with_metrics, AppError, LoopConfig};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use rendering::{screen_to_world_px, world_to_screen_px, Renderer, Viewport};
pub use scene::{DrawList, DrawRect, InputSnapshot, Scene, SceneCommand, Vec2};
