use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{debug, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::input::{ActionStates, CommandStates};
use super::metrics::MetricsAccumulator;
use super::scene::SceneRuntime;
use super::{
    DrawList, InputAction, InputCommand, InputSnapshot, MetricsHandle, Renderer, Scene,
    SceneCommand, Vec2,
};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Platformer".to_string(),
            window_width: 800,
            window_height: 600,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(config: LoopConfig, scene: Box<dyn Scene>) -> Result<(), AppError> {
    run_app_with_metrics(config, scene, MetricsHandle::default())
}

pub fn run_app_with_metrics(
    config: LoopConfig,
    scene: Box<dyn Scene>,
    metrics_handle: MetricsHandle,
) -> Result<(), AppError> {
    let mut scene = SceneRuntime::new(scene);

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window)).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();
    let size = window.inner_size();
    let mut input_collector = InputCollector::new(size.width, size.height);

    scene.load();
    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut last_applied_title: Option<String> = None;
    let mut draw_list = DrawList::default();

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    input_collector.set_window_size(new_size.width, new_size.height);
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    input_collector.set_cursor_position_px(position.x as f32, position.y as f32);
                }
                WindowEvent::CursorLeft { .. } => {
                    input_collector.clear_cursor_position();
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    input_collector.handle_mouse_input(button, state);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    let is_pressed = event.state == ElementState::Pressed;
                    input_collector.handle_physical_key(event.physical_key, is_pressed);
                    if input_collector.quit_requested {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                    accumulator = accumulator.saturating_add(clamped_frame_dt);

                    let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                    for _ in 0..step_plan.ticks_to_run {
                        let input_snapshot = input_collector.snapshot_for_tick();
                        let command = scene.update(fixed_dt_seconds, &input_snapshot);
                        metrics_accumulator.record_tick();
                        if command == SceneCommand::Quit {
                            info!(reason = "scene_command", "shutdown_requested");
                            window_target.exit();
                            break;
                        }
                    }
                    accumulator = step_plan.remaining_accumulator;
                    if step_plan.dropped_backlog > Duration::ZERO {
                        let dropped = (step_plan.dropped_backlog.as_nanos()
                            / fixed_dt.as_nanos().max(1)) as u32;
                        metrics_accumulator.record_dropped_ticks(dropped);
                        debug!(
                            dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                            dropped_ticks = dropped,
                            "sim_backlog_dropped"
                        );
                    }

                    scene.render(&mut draw_list);
                    if let Err(error) = renderer.render(&draw_list) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }

                    let next_title = scene.debug_title();
                    if next_title != last_applied_title {
                        match &next_title {
                            Some(title) => window.set_title(title),
                            None => window.set_title(&config.window_title),
                        }
                        last_applied_title = next_title;
                    }

                    metrics_accumulator.record_frame(raw_frame_dt);
                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        metrics_handle.publish(snapshot);
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            frame_time_ms = snapshot.frame_time_ms,
                            dropped_ticks = snapshot.dropped_ticks,
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                scene.shutdown();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    action_states: ActionStates,
    command_states: CommandStates,
    cursor_position_px: Option<Vec2>,
    left_mouse_is_down: bool,
    left_click_pressed_edge: bool,
    right_mouse_is_down: bool,
    right_click_pressed_edge: bool,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    fn handle_physical_key(&mut self, key: PhysicalKey, is_pressed: bool) {
        if let Some(action) = action_for_key(key) {
            self.action_states.set(action, is_pressed);
            if action == InputAction::Quit && is_pressed {
                self.quit_requested = true;
            }
        }
        if let Some(command) = command_for_key(key) {
            self.command_states.set_down(command, is_pressed);
        }
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.quit_requested,
            self.action_states,
            self.command_states.pressed_edges(),
            self.cursor_position_px,
            self.left_click_pressed_edge,
            self.right_click_pressed_edge,
            self.window_width,
            self.window_height,
        );
        self.left_click_pressed_edge = false;
        self.right_click_pressed_edge = false;
        snapshot
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    fn set_cursor_position_px(&mut self, x: f32, y: f32) {
        self.cursor_position_px = Some(Vec2 { x, y });
    }

    fn clear_cursor_position(&mut self) {
        self.cursor_position_px = None;
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        let (is_down, pressed_edge) = match button {
            MouseButton::Left => (
                &mut self.left_mouse_is_down,
                &mut self.left_click_pressed_edge,
            ),
            MouseButton::Right => (
                &mut self.right_mouse_is_down,
                &mut self.right_click_pressed_edge,
            ),
            _ => return,
        };
        match state {
            ElementState::Pressed => {
                if !*is_down {
                    *pressed_edge = true;
                }
                *is_down = true;
            }
            ElementState::Released => *is_down = false,
        }
    }
}

fn action_for_key(key: PhysicalKey) -> Option<InputAction> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    match code {
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(InputAction::MoveLeft),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(InputAction::MoveRight),
        KeyCode::KeyW | KeyCode::ArrowUp | KeyCode::Space => Some(InputAction::Jump),
        KeyCode::Escape => Some(InputAction::Quit),
        _ => None,
    }
}

fn command_for_key(key: PhysicalKey) -> Option<InputCommand> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    match code {
        KeyCode::KeyT => Some(InputCommand::AddTrampoline),
        KeyCode::KeyP => Some(InputCommand::AddPlatform),
        KeyCode::Backspace => Some(InputCommand::RemoveLast),
        KeyCode::Tab => Some(InputCommand::ToggleEditor),
        KeyCode::Delete => Some(InputCommand::ClearAll),
        KeyCode::KeyE => Some(InputCommand::NextTool),
        KeyCode::KeyQ => Some(InputCommand::PreviousTool),
        KeyCode::F5 => Some(InputCommand::SaveLevel),
        KeyCode::F6 => Some(InputCommand::SaveLevelAs),
        KeyCode::F9 => Some(InputCommand::ReloadLevel),
        KeyCode::KeyN => Some(InputCommand::NextLevel),
        KeyCode::F8 => Some(InputCommand::DeleteLevel),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;
    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::take(&mut accumulator)
    } else {
        Duration::ZERO
    };
    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        let raw_frame_dt = Duration::from_millis(600);
        assert_eq!(
            clamp_frame_delta(raw_frame_dt, max_frame_delta),
            max_frame_delta
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(50), fixed_dt, 5);
        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::from_millis(2));
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(120), fixed_dt, 3);
        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn zero_durations_fall_back() {
        assert_eq!(
            normalize_non_zero_duration(Duration::ZERO, Duration::from_secs(1)),
            Duration::from_secs(1)
        );
        assert_eq!(
            normalize_non_zero_duration(Duration::from_millis(5), Duration::from_secs(1)),
            Duration::from_millis(5)
        );
    }

    #[test]
    fn movement_keys_map_to_held_actions() {
        let mut input = InputCollector::default();
        input.handle_physical_key(PhysicalKey::Code(KeyCode::ArrowLeft), true);
        input.handle_physical_key(PhysicalKey::Code(KeyCode::Space), true);
        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(snapshot.is_down(InputAction::Jump));
        assert!(!snapshot.is_down(InputAction::MoveRight));
    }

    #[test]
    fn key_release_clears_action_state() {
        let mut input = InputCollector::default();
        input.handle_physical_key(PhysicalKey::Code(KeyCode::KeyD), true);
        input.handle_physical_key(PhysicalKey::Code(KeyCode::KeyD), false);
        let snapshot = input.snapshot_for_tick();
        assert!(!snapshot.is_down(InputAction::MoveRight));
    }

    #[test]
    fn escape_requests_quit() {
        let mut input = InputCollector::default();
        input.handle_physical_key(PhysicalKey::Code(KeyCode::Escape), true);
        assert!(input.quit_requested);
        assert!(input.snapshot_for_tick().quit_requested());
    }

    #[test]
    fn held_editor_key_fires_command_once() {
        let mut input = InputCollector::default();
        input.handle_physical_key(PhysicalKey::Code(KeyCode::Tab), true);
        let first = input.snapshot_for_tick();
        // key repeat delivers more pressed events while held
        input.handle_physical_key(PhysicalKey::Code(KeyCode::Tab), true);
        let second = input.snapshot_for_tick();
        input.handle_physical_key(PhysicalKey::Code(KeyCode::Tab), false);
        let released = input.snapshot_for_tick();
        input.handle_physical_key(PhysicalKey::Code(KeyCode::Tab), true);
        let third = input.snapshot_for_tick();

        assert!(first.pressed(InputCommand::ToggleEditor));
        assert!(!second.pressed(InputCommand::ToggleEditor));
        assert!(!released.pressed(InputCommand::ToggleEditor));
        assert!(third.pressed(InputCommand::ToggleEditor));
    }

    #[test]
    fn editor_command_keys_map_to_commands() {
        let cases = [
            (KeyCode::KeyT, InputCommand::AddTrampoline),
            (KeyCode::KeyP, InputCommand::AddPlatform),
            (KeyCode::Backspace, InputCommand::RemoveLast),
            (KeyCode::Delete, InputCommand::ClearAll),
            (KeyCode::F5, InputCommand::SaveLevel),
            (KeyCode::F6, InputCommand::SaveLevelAs),
            (KeyCode::F8, InputCommand::DeleteLevel),
            (KeyCode::F9, InputCommand::ReloadLevel),
        ];
        for (code, command) in cases {
            assert_eq!(command_for_key(PhysicalKey::Code(code)), Some(command));
        }
        assert_eq!(command_for_key(PhysicalKey::Code(KeyCode::KeyZ)), None);
    }

    #[test]
    fn left_click_is_edge_triggered_for_single_tick() {
        let mut input = InputCollector::new(800, 600);
        input.set_cursor_position_px(10.0, 20.0);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        let first = input.snapshot_for_tick();
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        let second = input.snapshot_for_tick();

        assert!(first.left_click_pressed());
        assert_eq!(first.cursor_position_px(), Some(Vec2::new(10.0, 20.0)));
        assert_eq!(first.window_size(), (800, 600));
        assert!(!second.left_click_pressed());
    }

    #[test]
    fn right_click_release_allows_next_press() {
        let mut input = InputCollector::default();
        input.handle_mouse_input(MouseButton::Right, ElementState::Pressed);
        let _ = input.snapshot_for_tick();
        input.handle_mouse_input(MouseButton::Right, ElementState::Released);
        input.handle_mouse_input(MouseButton::Right, ElementState::Pressed);
        assert!(input.snapshot_for_tick().right_click_pressed());
    }
}
