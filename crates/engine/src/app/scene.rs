use std::ops::{Add, Mul, Sub};

use super::input::{ActionStates, CommandEdges, InputAction, InputCommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    commands: CommandEdges,
    cursor_position_px: Option<Vec2>,
    left_click_pressed: bool,
    right_click_pressed: bool,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        commands: CommandEdges,
        cursor_position_px: Option<Vec2>,
        left_click_pressed: bool,
        right_click_pressed: bool,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            commands,
            cursor_position_px,
            left_click_pressed,
            right_click_pressed,
            window_width,
            window_height,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn pressed(&self, command: InputCommand) -> bool {
        self.commands.pressed(command)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_command_pressed(mut self, command: InputCommand, pressed: bool) -> Self {
        self.commands.set(command, pressed);
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<Vec2>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    pub fn with_left_click_pressed(mut self, left_click_pressed: bool) -> Self {
        self.left_click_pressed = left_click_pressed;
        self
    }

    pub fn with_right_click_pressed(mut self, right_click_pressed: bool) -> Self {
        self.right_click_pressed = right_click_pressed;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn left_click_pressed(&self) -> bool {
        self.left_click_pressed
    }

    pub fn right_click_pressed(&self) -> bool {
        self.right_click_pressed
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}

/// Axis-aligned filled rectangle in world units. `scale` stretches it around its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRect {
    pub position: Vec2,
    pub size: Vec2,
    pub color: [u8; 3],
    pub alpha: f32,
    pub scale: Vec2,
}

impl DrawRect {
    pub fn solid(position: Vec2, size: Vec2, color: [u8; 3]) -> Self {
        Self {
            position,
            size,
            color,
            alpha: 1.0,
            scale: Vec2::new(1.0, 1.0),
        }
    }
}

/// Rebuilt every frame; anything not pushed is not drawn.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    world_size: Vec2,
    clear_color: [u8; 3],
    rects: Vec<DrawRect>,
}

impl DrawList {
    pub fn begin(&mut self, world_size: Vec2, clear_color: [u8; 3]) {
        self.world_size = world_size;
        self.clear_color = clear_color;
        self.rects.clear();
    }

    pub fn push(&mut self, rect: DrawRect) {
        self.rects.push(rect);
    }

    pub fn world_size(&self) -> Vec2 {
        self.world_size
    }

    pub fn clear_color(&self) -> [u8; 3] {
        self.clear_color
    }

    pub fn rects(&self) -> &[DrawRect] {
        &self.rects
    }
}

pub trait Scene {
    fn load(&mut self);
    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand;
    fn render(&mut self, draw_list: &mut DrawList);
    fn unload(&mut self);
    fn debug_title(&self) -> Option<String> {
        None
    }
}

pub(crate) struct SceneRuntime {
    scene: Box<dyn Scene>,
    is_loaded: bool,
}

impl SceneRuntime {
    pub(crate) fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            is_loaded: false,
        }
    }

    pub(crate) fn load(&mut self) {
        if self.is_loaded {
            return;
        }
        self.scene.load();
        self.is_loaded = true;
    }

    pub(crate) fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        if !self.is_loaded {
            return SceneCommand::None;
        }
        self.scene.update(fixed_dt_seconds, input)
    }

    pub(crate) fn render(&mut self, draw_list: &mut DrawList) {
        if self.is_loaded {
            self.scene.render(draw_list);
        }
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.scene.debug_title()
    }

    pub(crate) fn shutdown(&mut self) {
        if self.is_loaded {
            self.scene.unload();
            self.is_loaded = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[derive(Default)]
    struct Counters {
        loads: Cell<u32>,
        updates: Cell<u32>,
        unloads: Cell<u32>,
    }

    struct CountingScene {
        counters: Rc<Counters>,
    }

    impl Scene for CountingScene {
        fn load(&mut self) {
            self.counters.loads.set(self.counters.loads.get() + 1);
        }

        fn update(&mut self, _fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
            self.counters.updates.set(self.counters.updates.get() + 1);
            if input.is_down(InputAction::Quit) {
                SceneCommand::Quit
            } else {
                SceneCommand::None
            }
        }

        fn render(&mut self, draw_list: &mut DrawList) {
            draw_list.begin(Vec2::new(10.0, 10.0), [0, 0, 0]);
            draw_list.push(DrawRect::solid(Vec2::ZERO, Vec2::new(1.0, 1.0), [255, 0, 0]));
        }

        fn unload(&mut self) {
            self.counters.unloads.set(self.counters.unloads.get() + 1);
        }
    }

    fn runtime() -> (SceneRuntime, Rc<Counters>) {
        let counters = Rc::new(Counters::default());
        let scene = CountingScene {
            counters: Rc::clone(&counters),
        };
        (SceneRuntime::new(Box::new(scene)), counters)
    }

    #[test]
    fn load_is_idempotent() {
        let (mut runtime, counters) = runtime();
        runtime.load();
        runtime.load();
        assert_eq!(counters.loads.get(), 1);
    }

    #[test]
    fn update_before_load_is_ignored() {
        let (mut runtime, counters) = runtime();
        let command = runtime.update(1.0 / 60.0, &InputSnapshot::empty());
        assert_eq!(command, SceneCommand::None);
        assert_eq!(counters.updates.get(), 0);
    }

    #[test]
    fn update_forwards_scene_command() {
        let (mut runtime, _) = runtime();
        runtime.load();
        let input = InputSnapshot::empty().with_action_down(InputAction::Quit, true);
        assert_eq!(runtime.update(1.0 / 60.0, &input), SceneCommand::Quit);
    }

    #[test]
    fn shutdown_unloads_once() {
        let (mut runtime, counters) = runtime();
        runtime.load();
        runtime.shutdown();
        runtime.shutdown();
        assert_eq!(counters.unloads.get(), 1);
    }

    #[test]
    fn draw_list_begin_discards_previous_frame() {
        let (mut runtime, _) = runtime();
        runtime.load();
        let mut draw_list = DrawList::default();
        draw_list.push(DrawRect::solid(Vec2::ZERO, Vec2::new(5.0, 5.0), [1, 2, 3]));

        runtime.render(&mut draw_list);

        assert_eq!(draw_list.rects().len(), 1);
        assert_eq!(draw_list.rects()[0].color, [255, 0, 0]);
        assert_eq!(draw_list.world_size(), Vec2::new(10.0, 10.0));
    }

    #[test]
    fn snapshot_builders_round_trip() {
        let snapshot = InputSnapshot::empty()
            .with_command_pressed(InputCommand::SaveLevel, true)
            .with_cursor_position_px(Some(Vec2::new(3.0, 4.0)))
            .with_left_click_pressed(true)
            .with_window_size((640, 480));

        assert!(snapshot.pressed(InputCommand::SaveLevel));
        assert!(!snapshot.pressed(InputCommand::ReloadLevel));
        assert_eq!(snapshot.cursor_position_px(), Some(Vec2::new(3.0, 4.0)));
        assert!(snapshot.left_click_pressed());
        assert!(!snapshot.right_click_pressed());
        assert_eq!(snapshot.window_size(), (640, 480));
    }
}
